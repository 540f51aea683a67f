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

//! Adaptive frame-rate control over the fixed rate ladder.
//!
//! The controller sees one duration per finished frame. A frame is *missed*
//! when it ran more than 20% over the target duration. Five misses in a row
//! drop the target one rung; a clean streak at every 120th frame raises it
//! one rung. After any change, a 60-frame cooldown blocks further changes.

use crate::metrics::RingBuffer;
use std::fmt::Write;
use wisp_core::control::FrameRate;

/// Number of frame durations kept for the rolling average.
pub const FRAME_HISTORY: usize = 16;
/// A frame is missed when `actual > target * MISS_TOLERANCE`.
const MISS_TOLERANCE: f64 = 1.2;
/// Consecutive misses that trigger a scale-down.
const MISSES_BEFORE_SCALE_DOWN: u32 = 5;
/// A scale-up is considered when the total frame count is a multiple of this.
const SCALE_UP_INTERVAL: u64 = 120;
/// Frames during which no further adjustment is allowed.
const ADJUSTMENT_COOLDOWN: u32 = 60;
/// The reported FPS is refreshed when the total frame count is a multiple of this.
const FPS_REFRESH_INTERVAL: u64 = 60;
/// `is_performance_good` needs fewer misses than this.
const GOOD_MISS_LIMIT: u32 = 3;
/// `is_performance_good` needs the average below `target * GOOD_AVERAGE_FACTOR`.
const GOOD_AVERAGE_FACTOR: f64 = 1.1;
/// `is_performance_poor` when the average is above `target * POOR_AVERAGE_FACTOR`.
const POOR_AVERAGE_FACTOR: f64 = 1.5;

/// A change of target rate made by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateChange {
    /// Rate before the change.
    pub from: FrameRate,
    /// Rate after the change.
    pub to: FrameRate,
}

/// Tracks frame durations and adapts the target rate.
#[derive(Debug, Clone)]
pub struct FrameRateController {
    target: FrameRate,
    floor: FrameRate,
    adaptive: bool,
    history: RingBuffer<u64, FRAME_HISTORY>,
    average_us: u64,
    consecutive_misses: u32,
    cooldown: u32,
    total_frames: u64,
    dropped_frames: u64,
    current_fps: f32,
}

impl FrameRateController {
    /// Creates a controller. Both rates are snapped onto the ladder and the
    /// target is raised to the floor if needed.
    pub fn new(target_fps: u32, minimum_fps: u32, adaptive: bool) -> Self {
        let floor = FrameRate::at_or_below(minimum_fps);
        let target = FrameRate::at_or_below(target_fps).max(floor);
        log::info!(
            "FrameRateController: Target {} (floor {}), adaptive scaling {}",
            target,
            floor,
            if adaptive { "on" } else { "off" }
        );
        Self {
            target,
            floor,
            adaptive,
            history: RingBuffer::new(),
            average_us: 0,
            consecutive_misses: 0,
            cooldown: 0,
            total_frames: 0,
            dropped_frames: 0,
            current_fps: 0.0,
        }
    }

    // ── Frame bracket ───────────────────────────────────────────────────

    /// Called when a frame starts. Returns the frame's time budget in µs.
    pub fn frame_start(&self) -> u64 {
        self.target.frame_duration_us()
    }

    /// Records a finished frame and adapts the target rate.
    ///
    /// Returns the change made, if any.
    pub fn frame_end(&mut self, actual_us: u64) -> Option<RateChange> {
        self.total_frames += 1;
        self.history.push(actual_us);
        self.average_us = self.history.average();

        let missed = actual_us as f64 > self.target.frame_duration_us() as f64 * MISS_TOLERANCE;
        if missed {
            self.consecutive_misses += 1;
            self.dropped_frames += 1;
        } else {
            self.consecutive_misses = 0;
        }

        let mut change = None;
        if self.adaptive && self.cooldown == 0 {
            if self.consecutive_misses >= MISSES_BEFORE_SCALE_DOWN {
                change = self.scale_down();
                self.consecutive_misses = 0;
                self.cooldown = ADJUSTMENT_COOLDOWN;
            } else if self.consecutive_misses == 0 && self.total_frames % SCALE_UP_INTERVAL == 0 {
                change = self.scale_up();
                if change.is_some() {
                    self.cooldown = ADJUSTMENT_COOLDOWN;
                }
            }
        }

        if self.total_frames % FPS_REFRESH_INTERVAL == 0 && self.average_us > 0 {
            self.current_fps = 1_000_000.0 / self.average_us as f32;
        }

        self.cooldown = self.cooldown.saturating_sub(1);
        change
    }

    fn scale_down(&mut self) -> Option<RateChange> {
        let from = self.target;
        match from.step_down().filter(|next| *next >= self.floor) {
            Some(to) => {
                self.target = to;
                log::info!("FrameRateController: Scaling down {from} -> {to}");
                Some(RateChange { from, to })
            }
            None => {
                log::warn!("FrameRateController: Missing frames at floor rate {from}");
                None
            }
        }
    }

    fn scale_up(&mut self) -> Option<RateChange> {
        let from = self.target;
        let to = from.step_up()?;
        self.target = to;
        log::info!("FrameRateController: Scaling up {from} -> {to}");
        Some(RateChange { from, to })
    }

    // ── Controls ────────────────────────────────────────────────────────

    /// Sets the target rate. The value snaps to the fastest rung not above
    /// it, and never below the floor. Returns the rate applied.
    pub fn set_target_fps(&mut self, fps: u32) -> FrameRate {
        let rate = FrameRate::at_or_below(fps).max(self.floor);
        if rate != self.target {
            log::info!(
                "FrameRateController: Target set to {rate} (requested {fps})"
            );
        }
        self.target = rate;
        rate
    }

    /// Sets the floor rate, raising the target if it is now below it.
    pub fn set_minimum_fps(&mut self, fps: u32) -> FrameRate {
        self.floor = FrameRate::at_or_below(fps);
        if self.target < self.floor {
            self.target = self.floor;
        }
        self.floor
    }

    /// Enables or disables automatic scaling.
    pub fn set_adaptive_scaling(&mut self, enabled: bool) {
        self.adaptive = enabled;
        log::info!(
            "FrameRateController: Adaptive scaling {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    /// Clears statistics and cooldown. The target and floor are kept.
    pub fn reset_stats(&mut self) {
        self.history.clear();
        self.average_us = 0;
        self.consecutive_misses = 0;
        self.cooldown = 0;
        self.total_frames = 0;
        self.dropped_frames = 0;
        self.current_fps = 0.0;
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Current target rung.
    pub fn target(&self) -> FrameRate {
        self.target
    }

    /// Current target in frames per second.
    pub fn target_fps(&self) -> u32 {
        self.target.fps()
    }

    /// Current target frame duration in µs.
    pub fn target_frame_duration_us(&self) -> u64 {
        self.target.frame_duration_us()
    }

    /// Floor rung.
    pub fn floor(&self) -> FrameRate {
        self.floor
    }

    /// Whether automatic scaling is enabled.
    pub fn is_adaptive(&self) -> bool {
        self.adaptive
    }

    /// Measured FPS. Refreshed every 60 frames only, `0.0` before the first refresh.
    pub fn current_fps(&self) -> f32 {
        self.current_fps
    }

    /// Rolling average frame duration in µs.
    pub fn average_frame_time_us(&self) -> u64 {
        self.average_us
    }

    /// Variance of the recent frame durations, in µs².
    pub fn frame_time_variance(&self) -> f64 {
        self.history.variance()
    }

    /// Standard deviation of the recent frame durations, in µs.
    pub fn frame_time_std_dev_us(&self) -> f64 {
        self.frame_time_variance().sqrt()
    }

    /// Frames recorded since creation or the last reset.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Missed frames since creation or the last reset.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    /// Missed frames as a percentage of all frames.
    pub fn frame_drop_percentage(&self) -> f32 {
        if self.total_frames == 0 {
            return 0.0;
        }
        self.dropped_frames as f32 / self.total_frames as f32 * 100.0
    }

    /// Current run of missed frames.
    pub fn consecutive_misses(&self) -> u32 {
        self.consecutive_misses
    }

    /// Frames left before another adjustment is allowed.
    pub fn cooldown_remaining(&self) -> u32 {
        self.cooldown
    }

    /// Few misses and an average comfortably within the target.
    pub fn is_performance_good(&self) -> bool {
        self.consecutive_misses < GOOD_MISS_LIMIT
            && (self.average_us as f64) < self.target_frame_duration_us() as f64 * GOOD_AVERAGE_FACTOR
    }

    /// A run of misses, or an average far above the target.
    pub fn is_performance_poor(&self) -> bool {
        self.consecutive_misses >= MISSES_BEFORE_SCALE_DOWN
            || self.average_us as f64 > self.target_frame_duration_us() as f64 * POOR_AVERAGE_FACTOR
    }

    /// A multi-line human-readable summary.
    pub fn performance_report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "--- Frame Rate Report ---");
        let _ = writeln!(
            out,
            "  Target: {} (floor {}), adaptive {}",
            self.target,
            self.floor,
            if self.adaptive { "on" } else { "off" }
        );
        let _ = writeln!(out, "  Current FPS: {:.1}", self.current_fps);
        let _ = writeln!(
            out,
            "  Frame time: avg {} us, target {} us, std dev {:.1} us",
            self.average_us,
            self.target_frame_duration_us(),
            self.frame_time_std_dev_us()
        );
        let _ = writeln!(
            out,
            "  Frames: {} total, {} dropped ({:.1}%)",
            self.total_frames,
            self.dropped_frames,
            self.frame_drop_percentage()
        );
        let status = if self.is_performance_poor() {
            "poor"
        } else if self.is_performance_good() {
            "good"
        } else {
            "fair"
        };
        let _ = write!(
            out,
            "  Status: {status}, {} consecutive misses, cooldown {}",
            self.consecutive_misses, self.cooldown
        );
        out
    }
}

impl Default for FrameRateController {
    fn default() -> Self {
        Self::new(24, 12, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLOW_US: u64 = 40_000;

    fn at_30() -> FrameRateController {
        FrameRateController::new(30, 8, true)
    }

    fn on_time(ctrl: &FrameRateController) -> u64 {
        ctrl.target_frame_duration_us()
    }

    // ── Construction ──

    #[test]
    fn test_new_snaps_and_respects_floor() {
        let ctrl = FrameRateController::new(25, 12, true);
        assert_eq!(ctrl.target(), FrameRate::Fps24);
        let ctrl = FrameRateController::new(10, 15, true);
        assert_eq!(ctrl.target(), FrameRate::Fps15);
        assert_eq!(ctrl.floor(), FrameRate::Fps15);
        assert_eq!(ctrl.frame_start(), FrameRate::Fps15.frame_duration_us());
    }

    // ── Drop detection ──

    #[test]
    fn test_miss_threshold_is_strictly_above_tolerance() {
        let mut ctrl = at_30();
        // 33_333 * 1.2 = 39_999.6
        ctrl.frame_end(39_999);
        assert_eq!(ctrl.consecutive_misses(), 0);
        ctrl.frame_end(40_000);
        assert_eq!(ctrl.consecutive_misses(), 1);
        assert_eq!(ctrl.dropped_frames(), 1);
    }

    #[test]
    fn test_non_miss_resets_streak() {
        let mut ctrl = at_30();
        for _ in 0..4 {
            ctrl.frame_end(SLOW_US);
        }
        ctrl.frame_end(10_000);
        assert_eq!(ctrl.consecutive_misses(), 0);
        for _ in 0..4 {
            ctrl.frame_end(SLOW_US);
        }
        assert_eq!(ctrl.target(), FrameRate::Fps30);
        assert_eq!(ctrl.dropped_frames(), 8);
    }

    // ── Scale down ──

    #[test]
    fn test_five_slow_frames_drop_one_rung_then_cooldown_holds() {
        let mut ctrl = at_30();
        for i in 1..=4 {
            assert_eq!(ctrl.frame_end(SLOW_US), None, "frame {i}");
        }
        let change = ctrl.frame_end(SLOW_US);
        assert_eq!(
            change,
            Some(RateChange {
                from: FrameRate::Fps30,
                to: FrameRate::Fps24
            })
        );
        assert_eq!(ctrl.target_fps(), 24);

        // Drop-triggering frames at the new rate (24 FPS: 41_666 * 1.2 = 50_000).
        for _ in 0..10 {
            assert_eq!(ctrl.frame_end(60_000), None);
        }
        assert_eq!(ctrl.target_fps(), 24);
    }

    #[test]
    fn test_scale_down_never_passes_floor() {
        let mut ctrl = FrameRateController::new(15, 15, true);
        for _ in 0..5 {
            ctrl.frame_end(1_000_000);
        }
        assert_eq!(ctrl.target(), FrameRate::Fps15);
        assert_eq!(ctrl.consecutive_misses(), 0);
        assert_eq!(ctrl.cooldown_remaining(), ADJUSTMENT_COOLDOWN - 1);
    }

    #[test]
    fn test_cooldown_blocks_59_frames_and_allows_the_60th() {
        let mut ctrl = at_30();
        for _ in 0..5 {
            ctrl.frame_end(SLOW_US);
        }
        assert_eq!(ctrl.target(), FrameRate::Fps24);

        let slow_at_24 = 60_000;
        for i in 1..=59 {
            assert_eq!(ctrl.frame_end(slow_at_24), None, "call {i} after adjustment");
        }
        assert_eq!(ctrl.cooldown_remaining(), 0);
        let change = ctrl.frame_end(slow_at_24);
        assert_eq!(change.map(|c| c.to), Some(FrameRate::Fps20));
    }

    #[test]
    fn test_ladder_moves_one_rung_per_adjustment() {
        let mut ctrl = FrameRateController::new(60, 8, true);
        let mut seen = vec![ctrl.target()];
        for _ in 0..2_000 {
            if let Some(change) = ctrl.frame_end(1_000_000) {
                assert_eq!(change.from.index() - change.to.index(), 1);
                seen.push(change.to);
            }
        }
        assert_eq!(seen, FrameRate::LADDER.iter().rev().copied().collect::<Vec<_>>());
    }

    // ── Scale up ──

    #[test]
    fn test_scale_up_on_120th_clean_frame() {
        let mut ctrl = FrameRateController::new(24, 8, true);
        for i in 1..120 {
            let d = on_time(&ctrl);
            assert_eq!(ctrl.frame_end(d), None, "frame {i}");
        }
        let d = on_time(&ctrl);
        let change = ctrl.frame_end(d);
        assert_eq!(change.map(|c| c.to), Some(FrameRate::Fps30));
        assert_eq!(ctrl.cooldown_remaining(), ADJUSTMENT_COOLDOWN - 1);
    }

    #[test]
    fn test_scale_up_requires_clean_streak() {
        let mut ctrl = FrameRateController::new(24, 8, true);
        for _ in 1..120 {
            let d = on_time(&ctrl);
            ctrl.frame_end(d);
        }
        ctrl.frame_end(60_000);
        assert_eq!(ctrl.target(), FrameRate::Fps24);
    }

    #[test]
    fn test_scale_up_stops_at_top() {
        let mut ctrl = FrameRateController::new(60, 8, true);
        for _ in 0..240 {
            ctrl.frame_end(1_000);
        }
        assert_eq!(ctrl.target(), FrameRate::Fps60);
        assert_eq!(ctrl.cooldown_remaining(), 0);
    }

    #[test]
    fn test_non_adaptive_never_changes_rate() {
        let mut ctrl = FrameRateController::new(30, 8, false);
        for _ in 0..500 {
            assert_eq!(ctrl.frame_end(SLOW_US), None);
        }
        assert_eq!(ctrl.target(), FrameRate::Fps30);
        assert_eq!(ctrl.dropped_frames(), 500);
    }

    // ── Statistics ──

    #[test]
    fn test_current_fps_refreshes_every_60_frames() {
        let mut ctrl = FrameRateController::new(30, 8, false);
        for _ in 0..59 {
            ctrl.frame_end(50_000);
        }
        assert_eq!(ctrl.current_fps(), 0.0);
        ctrl.frame_end(50_000);
        assert_eq!(ctrl.current_fps(), 20.0);

        for _ in 0..59 {
            ctrl.frame_end(25_000);
        }
        assert_eq!(ctrl.current_fps(), 20.0);
        ctrl.frame_end(25_000);
        assert_eq!(ctrl.current_fps(), 40.0);
    }

    #[test]
    fn test_drop_percentage_and_reset() {
        let mut ctrl = FrameRateController::new(30, 8, false);
        assert_eq!(ctrl.frame_drop_percentage(), 0.0);
        ctrl.frame_end(SLOW_US);
        ctrl.frame_end(10_000);
        ctrl.frame_end(10_000);
        ctrl.frame_end(10_000);
        assert_eq!(ctrl.frame_drop_percentage(), 25.0);

        ctrl.reset_stats();
        assert_eq!(ctrl.total_frames(), 0);
        assert_eq!(ctrl.average_frame_time_us(), 0);
        assert_eq!(ctrl.target(), FrameRate::Fps30);
    }

    #[test]
    fn test_performance_good_and_poor() {
        let mut ctrl = FrameRateController::new(30, 8, false);
        ctrl.frame_end(30_000);
        assert!(ctrl.is_performance_good());
        assert!(!ctrl.is_performance_poor());

        let mut ctrl = FrameRateController::new(30, 8, false);
        ctrl.frame_end(60_000);
        assert!(!ctrl.is_performance_good());
        assert!(ctrl.is_performance_poor());
    }

    // ── Controls ──

    #[test]
    fn test_manual_override_clamps() {
        let mut ctrl = FrameRateController::new(24, 12, true);
        assert_eq!(ctrl.set_target_fps(59), FrameRate::Fps30);
        assert_eq!(ctrl.set_target_fps(500), FrameRate::Fps60);
        assert_eq!(ctrl.set_target_fps(5), FrameRate::Fps12);
        assert_eq!(ctrl.target(), FrameRate::Fps12);
    }

    #[test]
    fn test_raising_floor_lifts_target() {
        let mut ctrl = FrameRateController::new(12, 8, true);
        ctrl.set_minimum_fps(20);
        assert_eq!(ctrl.target(), FrameRate::Fps20);
        assert_eq!(ctrl.floor(), FrameRate::Fps20);
    }

    #[test]
    fn test_frame_time_spread_in_microseconds() {
        let mut ctrl = FrameRateController::new(30, 8, false);
        ctrl.frame_end(10_000);
        ctrl.frame_end(30_000);
        assert_eq!(ctrl.frame_time_variance(), 100_000_000.0);
        assert_eq!(ctrl.frame_time_std_dev_us(), 10_000.0);
        assert!(ctrl
            .performance_report()
            .contains("std dev 10000.0 us"));
    }

    #[test]
    fn test_report_mentions_key_figures() {
        let mut ctrl = FrameRateController::new(30, 8, false);
        ctrl.frame_end(SLOW_US);
        let report = ctrl.performance_report();
        assert!(report.contains("30 FPS"));
        assert!(report.contains("1 dropped"));
    }
}
