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

//! The frame gate and the deferred-callback table.

use super::TimeSource;
use std::fmt;

/// Number of timer slots.
pub const MAX_TIMERS: usize = 8;

/// Handle to an armed timer, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId {
    slot: usize,
    generation: u32,
}

struct TimerEntry {
    target_us: u64,
    generation: u32,
    callback: Box<dyn FnOnce()>,
}

/// Decides when a frame may start and runs deferred callbacks.
///
/// All operations are bounded by [`MAX_TIMERS`]; nothing allocates after
/// construction except the boxed callbacks themselves.
pub struct Timekeeper {
    clock: Box<dyn TimeSource>,
    timers: [Option<TimerEntry>; MAX_TIMERS],
    next_generation: u32,
    frame_duration_us: u64,
    last_admitted_us: Option<u64>,
    frame_start_us: u64,
}

impl Timekeeper {
    /// Creates a timekeeper that admits one frame every `frame_duration_us`.
    pub fn new(clock: Box<dyn TimeSource>, frame_duration_us: u64) -> Self {
        Self {
            clock,
            timers: std::array::from_fn(|_| None),
            next_generation: 0,
            frame_duration_us,
            last_admitted_us: None,
            frame_start_us: 0,
        }
    }

    /// The underlying time source.
    pub fn clock(&self) -> &dyn TimeSource {
        self.clock.as_ref()
    }

    /// Current time in microseconds.
    pub fn now_us(&self) -> u64 {
        self.clock.now_us()
    }

    /// Minimum spacing between admitted frames.
    pub fn frame_duration_us(&self) -> u64 {
        self.frame_duration_us
    }

    /// Changes the admission threshold for subsequent frames.
    pub fn set_frame_duration_us(&mut self, frame_duration_us: u64) {
        self.frame_duration_us = frame_duration_us;
    }

    // ── Frame gate ──────────────────────────────────────────────────────

    /// Returns `true` if a new frame may start now.
    ///
    /// The first call always admits a frame. When a frame is admitted the
    /// admission time becomes the reference for the next check.
    pub fn is_frame_due(&mut self) -> bool {
        let now = self.clock.now_us();
        let due = match self.last_admitted_us {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.frame_duration_us,
        };
        if due {
            self.last_admitted_us = Some(now);
        }
        due
    }

    /// Marks the start of a frame.
    pub fn on_frame_start(&mut self) {
        self.frame_start_us = self.clock.now_us();
    }

    /// Marks the end of a frame and returns its duration in microseconds.
    pub fn on_frame_end(&mut self) -> u64 {
        self.clock.now_us().saturating_sub(self.frame_start_us)
    }

    /// Timestamp recorded by the last [`on_frame_start`](Self::on_frame_start).
    pub fn frame_start_us(&self) -> u64 {
        self.frame_start_us
    }

    // ── Deferred callbacks ──────────────────────────────────────────────

    /// Arms a callback to run on the first [`tick`](Self::tick) at or after
    /// `now + delay_us`.
    ///
    /// Returns `None` if every slot is armed.
    pub fn schedule(
        &mut self,
        delay_us: u64,
        callback: impl FnOnce() + 'static,
    ) -> Option<TimerId> {
        let Some(slot) = self.timers.iter().position(Option::is_none) else {
            log::warn!("Timekeeper: All {MAX_TIMERS} timer slots are armed, schedule rejected");
            return None;
        };
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        self.timers[slot] = Some(TimerEntry {
            target_us: self.clock.now_us().saturating_add(delay_us),
            generation,
            callback: Box::new(callback),
        });
        Some(TimerId { slot, generation })
    }

    /// Disarms a timer that has not fired yet. Returns `false` if it already
    /// fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.timers.get_mut(id.slot) {
            Some(entry) if entry.as_ref().is_some_and(|e| e.generation == id.generation) => {
                *entry = None;
                true
            }
            _ => false,
        }
    }

    /// Fires every timer whose target time has passed and frees its slot.
    ///
    /// Returns the number of callbacks run.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now_us();
        let mut fired = 0;
        for slot in self.timers.iter_mut() {
            if slot.as_ref().is_some_and(|e| now >= e.target_us) {
                if let Some(entry) = slot.take() {
                    (entry.callback)();
                    fired += 1;
                }
            }
        }
        fired
    }

    /// Number of armed timers.
    pub fn armed_count(&self) -> usize {
        self.timers.iter().filter(|t| t.is_some()).count()
    }
}

impl fmt::Debug for Timekeeper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timekeeper")
            .field("frame_duration_us", &self.frame_duration_us)
            .field("last_admitted_us", &self.last_admitted_us)
            .field("armed_timers", &self.armed_count())
            .finish()
    }
}
