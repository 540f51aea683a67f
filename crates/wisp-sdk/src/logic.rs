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

//! The host application's hook into the frame.

use wisp_core::physics::{EntityTable, FrameEvent, RegionTable};
use wisp_core::platform::InputAdapter;

/// What the host may touch during the logic stage.
pub struct FrameContext<'a> {
    /// Number of the frame being run, starting at 1.
    pub frame: u64,
    /// Entity table. Entities spawned here join physics this same frame.
    pub entities: &'a mut EntityTable,
    /// Region table.
    pub regions: &'a mut RegionTable,
    /// Input sampled at the start of this frame.
    pub input: &'a dyn InputAdapter,
    /// Events produced by the previous frame.
    pub previous_events: &'a [FrameEvent],
}

/// Game logic driven by the pipeline.
pub trait FrameLogic {
    /// Called once per frame during the logic stage.
    fn update(&mut self, ctx: &mut FrameContext<'_>);

    /// Called during trigger processing for every trigger event the
    /// region's [`TriggerLogic`](wisp_core::physics::TriggerLogic) lets through.
    fn on_trigger(&mut self, _event: &FrameEvent) {}
}
