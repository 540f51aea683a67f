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

//! # Wisp SDK
//!
//! The public API of the Wisp frame runtime. A host builds a
//! [`LoopManager`] from a [`RuntimeConfig`](wisp_core::RuntimeConfig),
//! hands it its [`Collaborators`] once, and then calls
//! [`LoopManager::update`] from its outer loop.

#![warn(missing_docs)]

mod collaborators;
mod logic;
mod loop_manager;
pub mod pipeline;
mod telemetry;

pub use collaborators::{Collaborators, FrameDrivers};
pub use logic::{FrameContext, FrameLogic};
pub use loop_manager::{LoopError, LoopManager};
pub use pipeline::{DrawCommand, FrameReport, Stage, StagePipeline, STAGE_COUNT};

/// Re-exports for hosts that only depend on this crate.
pub mod prelude {
    pub use crate::{Collaborators, FrameContext, FrameLogic, LoopError, LoopManager, Stage};
    pub use wisp_control::{AdaptiveLoadingPolicy, LoadingPolicy};
    pub use wisp_core::math::{Rect, Velocity};
    pub use wisp_core::physics::{
        CollisionMask, Entity, EntityId, FrameEvent, FrameEventKind, Region, RegionId, RegionKind,
        TriggerLogic,
    };
    pub use wisp_core::platform::{AssetStreamer, AudioAdapter, Button, InputAdapter, Renderer};
    pub use wisp_core::time::{ManualClock, SystemClock, TimeSource};
    pub use wisp_core::RuntimeConfig;
    pub use wisp_lanes::physics_lane::{IntentPhysicsLane, PhysicsLane};
    pub use wisp_telemetry::TelemetryService;
}
