// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Simulation records: entities, regions, intents and frame events.
//!
//! The tables here are owned by the stage pipeline and filled by the
//! physics lane. All storage is sized once at construction.

pub mod entity;
pub mod event;
pub mod ids;
pub mod intent;
pub mod table;

pub use entity::{Entity, Region, RegionKind, TriggerLogic, DEFAULT_DEPTH};
pub use event::{EventList, FrameEvent, FrameEventKind};
pub use ids::{CollisionMask, EntityId, IdAllocator, RegionId, RESERVED_ID};
pub use intent::{Intent, IntentQueue};
pub use table::{EntityTable, Identified, RegionTable, SlotTable};
