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

//! The fixed stage list.

use std::fmt;

/// Number of pipeline stages.
pub const STAGE_COUNT: usize = 11;

/// One step of a frame. Stages always run in [`Stage::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Polls the input adapter.
    InputCollection,
    /// Advances audio and clears last frame's events.
    Heartbeat,
    /// Runs the host's [`FrameLogic`](crate::FrameLogic).
    LogicUpdate,
    /// Builds the intent table.
    PhysicsPrediction,
    /// Records collision and trigger overlaps.
    CollisionDetection,
    /// Rejects conflicting intents and commits the rest.
    PhysicsResolution,
    /// Tracks trigger occupancy and dispatches trigger events.
    TriggerProcessing,
    /// Kept for a stable stage numbering. Audio advances during heartbeat.
    AudioUpdate,
    /// Sorts visible entities back to front.
    RenderPrepare,
    /// Submits the draw list to the renderer.
    RenderExecute,
    /// Hands the frame to the display.
    RenderPresent,
}

impl Stage {
    /// Every stage in execution order.
    pub const ALL: [Stage; STAGE_COUNT] = [
        Stage::InputCollection,
        Stage::Heartbeat,
        Stage::LogicUpdate,
        Stage::PhysicsPrediction,
        Stage::CollisionDetection,
        Stage::PhysicsResolution,
        Stage::TriggerProcessing,
        Stage::AudioUpdate,
        Stage::RenderPrepare,
        Stage::RenderExecute,
        Stage::RenderPresent,
    ];

    /// Position in [`Stage::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Snake-case name, used as a telemetry label.
    pub const fn name(self) -> &'static str {
        match self {
            Stage::InputCollection => "input_collection",
            Stage::Heartbeat => "heartbeat",
            Stage::LogicUpdate => "logic_update",
            Stage::PhysicsPrediction => "physics_prediction",
            Stage::CollisionDetection => "collision_detection",
            Stage::PhysicsResolution => "physics_resolution",
            Stage::TriggerProcessing => "trigger_processing",
            Stage::AudioUpdate => "audio_update",
            Stage::RenderPrepare => "render_prepare",
            Stage::RenderExecute => "render_execute",
            Stage::RenderPresent => "render_present",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_index_order() {
        for (i, stage) in Stage::ALL.iter().enumerate() {
            assert_eq!(stage.index(), i);
        }
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = Stage::ALL.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), STAGE_COUNT);
    }
}
