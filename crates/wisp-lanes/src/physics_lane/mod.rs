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

//! Physics Lane
//!
//! Movement is resolved in phases that the stage pipeline calls from three
//! different stages:
//!
//! 1. **Predict**: every active, non-kinematic entity proposes
//!    `projected = bounds + velocity`.
//! 2. **Detect and resolve**: overlaps are recorded as frame events, then
//!    every pair of intents whose projected boxes overlap is rejected.
//! 3. **Apply**: valid intents are committed. Rejected entities keep their
//!    position and lose their velocity.

mod intent_lane;

pub use intent_lane::IntentPhysicsLane;

use std::any::Any;
use wisp_core::physics::{EntityTable, EventList, Intent, RegionTable};

/// Outcome of the apply phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    /// Entities whose projected box was committed.
    pub moved: usize,
    /// Entities whose intent was rejected.
    pub blocked: usize,
}

/// A conflict-resolution strategy.
pub trait PhysicsLane {
    /// Name used in logs and telemetry.
    fn strategy_name(&self) -> &'static str;

    /// Rebuilds the intent table from the entity table.
    fn predict(&mut self, entities: &EntityTable);

    /// Appends entity-entity and entity-region overlap events.
    fn detect(&mut self, entities: &EntityTable, regions: &RegionTable, events: &mut EventList);

    /// Invalidates conflicting intents.
    fn resolve(&mut self);

    /// Commits valid intents and stops rejected movers.
    fn apply(&mut self, entities: &mut EntityTable) -> ApplyStats;

    /// This frame's intents.
    fn intents(&self) -> &[Intent];

    /// Most intents one frame can hold. Entities past this limit are not
    /// simulated, so it must cover the entity table.
    fn capacity(&self) -> usize;

    /// Downcasting hook for hosts that need the concrete lane.
    fn as_any(&self) -> &dyn Any;
}
