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

//! Integer screen-space geometry used by the simulation.

use serde::{Deserialize, Serialize};

/// An axis-aligned box in integer screen coordinates.
///
/// Edges are inclusive: two boxes that share an edge are considered to
/// intersect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Right edge.
    pub right: i32,
    /// Bottom edge.
    pub bottom: i32,
}

impl Rect {
    /// Creates a box from its four edges.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a box from an origin and a size, `right = x + w`, `bottom = y + h`.
    pub const fn from_xywh(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    /// Width of the box.
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Height of the box.
    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Returns `true` if the boxes touch or overlap.
    pub const fn intersects(&self, other: &Rect) -> bool {
        !(self.right < other.left
            || self.left > other.right
            || self.bottom < other.top
            || self.top > other.bottom)
    }

    /// Returns the shared area of both boxes, or `None` if they do not intersect.
    pub fn overlap(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        ))
    }

    /// Returns the box moved by `velocity`.
    #[must_use]
    pub const fn translated(&self, velocity: Velocity) -> Rect {
        Rect::new(
            self.left + velocity.dx,
            self.top + velocity.dy,
            self.right + velocity.dx,
            self.bottom + velocity.dy,
        )
    }
}

/// Integer displacement applied once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Velocity {
    /// Horizontal displacement.
    pub dx: i32,
    /// Vertical displacement.
    pub dy: i32,
}

impl Velocity {
    /// No displacement.
    pub const ZERO: Velocity = Velocity { dx: 0, dy: 0 };

    /// Creates a velocity.
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Returns `true` if both components are zero.
    pub const fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}
