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

//! Time sources and the frame clock.
//!
//! Every time value in the runtime is a `u64` count of microseconds taken
//! from a [`TimeSource`]. Nothing reads a process-wide clock directly: the
//! [`Timekeeper`] owns the source and hands out references to it.

pub mod timekeeper;

pub use timekeeper::{Timekeeper, TimerId, MAX_TIMERS};

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A monotonic microsecond clock that can also block for a while.
pub trait TimeSource {
    /// Microseconds since an arbitrary, fixed origin.
    fn now_us(&self) -> u64;

    /// Blocks for `us` microseconds. This is the only yield point of a frame.
    fn sleep_us(&self, us: u64);
}

/// Wall-clock time backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }

    fn sleep_us(&self, us: u64) {
        std::thread::sleep(Duration::from_micros(us));
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give
/// another to a [`Timekeeper`]. Sleeping advances the clock.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    /// Creates a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `us`.
    pub fn advance(&self, us: u64) {
        self.now.set(self.now.get() + us);
    }

    /// Sets the absolute time.
    pub fn set(&self, us: u64) {
        self.now.set(us);
    }
}

impl TimeSource for ManualClock {
    fn now_us(&self) -> u64 {
        self.now.get()
    }

    fn sleep_us(&self, us: u64) {
        self.advance(us);
    }
}
