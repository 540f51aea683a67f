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

//! Contract types shared by the adaptive control layer.

use std::fmt;

/// One rung of the fixed frame-rate ladder.
///
/// Rungs are ordered from slowest to fastest. Adaptive scaling only ever
/// moves one rung at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrameRate {
    /// 8 frames per second.
    Fps8,
    /// 10 frames per second.
    Fps10,
    /// 12 frames per second.
    Fps12,
    /// 15 frames per second.
    Fps15,
    /// 20 frames per second.
    Fps20,
    /// 24 frames per second.
    Fps24,
    /// 30 frames per second.
    Fps30,
    /// 60 frames per second.
    Fps60,
}

impl FrameRate {
    /// Every rung, slowest first.
    pub const LADDER: [FrameRate; 8] = [
        FrameRate::Fps8,
        FrameRate::Fps10,
        FrameRate::Fps12,
        FrameRate::Fps15,
        FrameRate::Fps20,
        FrameRate::Fps24,
        FrameRate::Fps30,
        FrameRate::Fps60,
    ];

    /// The slowest rung.
    pub const LOWEST: FrameRate = FrameRate::Fps8;
    /// The fastest rung.
    pub const HIGHEST: FrameRate = FrameRate::Fps60;

    /// Frames per second.
    pub const fn fps(self) -> u32 {
        match self {
            FrameRate::Fps8 => 8,
            FrameRate::Fps10 => 10,
            FrameRate::Fps12 => 12,
            FrameRate::Fps15 => 15,
            FrameRate::Fps20 => 20,
            FrameRate::Fps24 => 24,
            FrameRate::Fps30 => 30,
            FrameRate::Fps60 => 60,
        }
    }

    /// Target frame duration in microseconds, truncated (30 FPS is 33 333 µs).
    pub const fn frame_duration_us(self) -> u64 {
        1_000_000 / self.fps() as u64
    }

    /// Position on the ladder, `0` being the slowest rung.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The next slower rung, if any.
    pub fn step_down(self) -> Option<FrameRate> {
        self.index()
            .checked_sub(1)
            .map(|i| FrameRate::LADDER[i])
    }

    /// The next faster rung, if any.
    pub fn step_up(self) -> Option<FrameRate> {
        FrameRate::LADDER.get(self.index() + 1).copied()
    }

    /// The fastest rung not above `fps`, or [`LOWEST`](Self::LOWEST) when
    /// `fps` is below the ladder.
    pub fn at_or_below(fps: u32) -> FrameRate {
        FrameRate::LADDER
            .iter()
            .rev()
            .copied()
            .find(|r| r.fps() <= fps)
            .unwrap_or(FrameRate::LOWEST)
    }

    /// The rung with exactly `fps` frames per second.
    pub fn from_fps(fps: u32) -> Option<FrameRate> {
        FrameRate::LADDER.iter().copied().find(|r| r.fps() == fps)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} FPS", self.fps())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ladder_is_strictly_ascending() {
        for pair in FrameRate::LADDER.windows(2) {
            assert!(pair[0].fps() < pair[1].fps());
            assert!(pair[0] < pair[1]);
        }
        for (i, rung) in FrameRate::LADDER.iter().enumerate() {
            assert_eq!(rung.index(), i);
        }
    }

    #[test]
    fn test_frame_duration() {
        assert_eq!(FrameRate::Fps30.frame_duration_us(), 33_333);
        assert_eq!(FrameRate::Fps60.frame_duration_us(), 16_666);
        assert_eq!(FrameRate::Fps8.frame_duration_us(), 125_000);
    }

    #[test]
    fn test_steps_move_one_rung() {
        assert_eq!(FrameRate::Fps30.step_down(), Some(FrameRate::Fps24));
        assert_eq!(FrameRate::Fps30.step_up(), Some(FrameRate::Fps60));
        assert_eq!(FrameRate::LOWEST.step_down(), None);
        assert_eq!(FrameRate::HIGHEST.step_up(), None);
    }

    #[test]
    fn test_at_or_below_clamps() {
        assert_eq!(FrameRate::at_or_below(25), FrameRate::Fps24);
        assert_eq!(FrameRate::at_or_below(24), FrameRate::Fps24);
        assert_eq!(FrameRate::at_or_below(1_000), FrameRate::Fps60);
        assert_eq!(FrameRate::at_or_below(0), FrameRate::Fps8);
        assert_eq!(FrameRate::from_fps(25), None);
        assert_eq!(FrameRate::from_fps(15), Some(FrameRate::Fps15));
    }
}
