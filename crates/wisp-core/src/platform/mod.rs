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

//! Contracts for the collaborators the frame loop drives.
//!
//! Rasterization, audio mixing, input drivers and asset streaming live
//! outside the runtime. The loop only sees them through these traits.

use crate::physics::EntityId;

/// Receives the prepared scene once per frame.
pub trait Renderer {
    /// Clears the back buffer.
    fn clear(&mut self);

    /// Draws one sprite with its top-left corner at `(x, y)`.
    fn draw_entity(&mut self, entity: EntityId, sprite: u16, x: i32, y: i32, frame: u8);

    /// Hands the finished frame to the display.
    fn present(&mut self);
}

/// Advances audio state. Polled once per frame during heartbeat.
pub trait AudioAdapter {
    /// Advances mixing by one frame.
    fn update(&mut self);
}

/// Physical buttons of the handheld.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// D-pad up.
    Up,
    /// D-pad down.
    Down,
    /// D-pad left.
    Left,
    /// D-pad right.
    Right,
    /// Primary action.
    A,
    /// Secondary action.
    B,
    /// Select.
    Select,
    /// Start.
    Start,
}

/// Polls the input hardware.
pub trait InputAdapter {
    /// Samples every button. Called once per frame during input collection.
    fn update(&mut self);

    /// Returns `true` if `button` was held at the last sample.
    fn is_pressed(&self, button: Button) -> bool;
}

/// Streams assets in the background within a per-frame work budget.
pub trait AssetStreamer {
    /// Fraction of the streaming memory pool in use, `0.0..=1.0`.
    fn report_memory_pressure(&self) -> f32;

    /// Microseconds of streaming work allowed per frame.
    fn work_budget_us(&self) -> u64;

    /// Sets the per-frame work budget.
    fn set_work_budget_us(&mut self, budget_us: u64);

    /// Enables or disables speculative background prefetch.
    fn set_prefetch_enabled(&mut self, enabled: bool);
}
