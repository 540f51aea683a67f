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

//! Load-shedding policies toward the asset streamer.

/// Lowest per-frame streaming budget the adaptive policy will set.
pub const MIN_STREAMING_BUDGET_US: u64 = 2_000;
/// Highest per-frame streaming budget the adaptive policy will set.
pub const MAX_STREAMING_BUDGET_US: u64 = 12_000;
/// Budget handed to the streamer when the loop starts.
pub const INITIAL_STREAMING_BUDGET_US: u64 = 8_000;
/// Budget removed per frame while shedding.
const SHED_STEP_US: u64 = 1_000;
/// Budget added per frame while performance has headroom.
const RECOVER_STEP_US: u64 = 500;
/// Shed when the average frame time exceeds `target * SHED_FACTOR`.
const SHED_FACTOR: f64 = 1.2;
/// Recover when the average frame time is below `target * RECOVER_FACTOR`.
const RECOVER_FACTOR: f64 = 0.8;
/// Shed when the streamer's memory pressure exceeds this fraction.
const MEMORY_PRESSURE_LIMIT: f32 = 0.85;

/// Frame statistics the loop hands to a policy once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadSample {
    /// Rolling average frame duration.
    pub average_frame_time_us: u64,
    /// Target frame duration.
    pub target_frame_time_us: u64,
    /// Whether the frame-rate controller reports poor performance.
    pub performance_poor: bool,
    /// Streamer memory pressure, `0.0..=1.0`.
    pub memory_pressure: f32,
    /// Budget the streamer currently works with.
    pub current_budget_us: u64,
}

/// What the streamer should do from the next frame on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamingDirective {
    /// New per-frame work budget.
    pub budget_us: u64,
    /// Whether speculative prefetch is allowed.
    pub prefetch: bool,
}

/// Whether the adaptive policy is currently shedding load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadingMode {
    /// Full streaming.
    #[default]
    Normal,
    /// Reduced budget, no prefetch.
    Shedding,
}

/// Decides how much streaming work the frame budget can afford.
pub trait LoadingPolicy {
    /// Human-readable name for logs.
    fn name(&self) -> &'static str;

    /// Budget to apply before the first frame, if the policy has one.
    fn initial_budget_us(&self) -> Option<u64> {
        None
    }

    /// Looks at one frame's statistics. Returns `None` to leave the streamer as is.
    fn evaluate(&mut self, sample: &LoadSample) -> Option<StreamingDirective>;
}

/// Sheds streaming work under load and restores it once the frame budget
/// has headroom again.
///
/// Shedding starts when any of these holds: the average frame time is more
/// than 20% over target, the controller reports poor performance, or memory
/// pressure is above 85%. The budget in force at that moment is saved and
/// restored on recovery, i.e. when the average falls below 80% of target
/// and memory pressure is back under the limit.
#[derive(Debug, Clone, Default)]
pub struct AdaptiveLoadingPolicy {
    mode: LoadingMode,
    saved_budget_us: Option<u64>,
}

impl AdaptiveLoadingPolicy {
    /// Creates a policy in normal mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    pub fn mode(&self) -> LoadingMode {
        self.mode
    }

    fn should_shed(sample: &LoadSample) -> bool {
        sample.average_frame_time_us as f64 > sample.target_frame_time_us as f64 * SHED_FACTOR
            || sample.performance_poor
            || sample.memory_pressure > MEMORY_PRESSURE_LIMIT
    }

    fn has_headroom(sample: &LoadSample) -> bool {
        (sample.average_frame_time_us as f64) < sample.target_frame_time_us as f64 * RECOVER_FACTOR
            && sample.memory_pressure <= MEMORY_PRESSURE_LIMIT
    }

    fn shed(current_us: u64) -> StreamingDirective {
        StreamingDirective {
            budget_us: current_us
                .saturating_sub(SHED_STEP_US)
                .max(MIN_STREAMING_BUDGET_US),
            prefetch: false,
        }
    }
}

impl LoadingPolicy for AdaptiveLoadingPolicy {
    fn name(&self) -> &'static str {
        "AdaptiveLoading"
    }

    fn initial_budget_us(&self) -> Option<u64> {
        Some(INITIAL_STREAMING_BUDGET_US)
    }

    fn evaluate(&mut self, sample: &LoadSample) -> Option<StreamingDirective> {
        let current = sample.current_budget_us;
        match self.mode {
            LoadingMode::Normal if Self::should_shed(sample) => {
                log::warn!(
                    "AdaptiveLoadingPolicy: Shedding load (avg {} us / target {} us, memory {:.0}%)",
                    sample.average_frame_time_us,
                    sample.target_frame_time_us,
                    sample.memory_pressure * 100.0
                );
                self.mode = LoadingMode::Shedding;
                self.saved_budget_us = Some(current);
                Some(Self::shed(current))
            }
            LoadingMode::Normal if Self::has_headroom(sample) => {
                let budget_us = (current + RECOVER_STEP_US).min(MAX_STREAMING_BUDGET_US);
                (budget_us != current).then_some(StreamingDirective {
                    budget_us,
                    prefetch: true,
                })
            }
            LoadingMode::Normal => None,
            LoadingMode::Shedding if Self::has_headroom(sample) => {
                let budget_us = self.saved_budget_us.take().unwrap_or(current);
                log::debug!("AdaptiveLoadingPolicy: Recovered, restoring budget to {budget_us} us");
                self.mode = LoadingMode::Normal;
                Some(StreamingDirective {
                    budget_us,
                    prefetch: true,
                })
            }
            LoadingMode::Shedding if Self::should_shed(sample) => {
                let directive = Self::shed(current);
                (directive.budget_us != current).then_some(directive)
            }
            LoadingMode::Shedding => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: u64 = 33_333;

    fn sample(avg: u64, pressure: f32, budget: u64) -> LoadSample {
        LoadSample {
            average_frame_time_us: avg,
            target_frame_time_us: TARGET,
            performance_poor: false,
            memory_pressure: pressure,
            current_budget_us: budget,
        }
    }

    #[test]
    fn test_steady_state_leaves_streamer_alone() {
        let mut policy = AdaptiveLoadingPolicy::new();
        assert_eq!(policy.evaluate(&sample(TARGET, 0.5, 8_000)), None);
        assert_eq!(policy.mode(), LoadingMode::Normal);
    }

    #[test]
    fn test_slow_frames_shed_and_disable_prefetch() {
        let mut policy = AdaptiveLoadingPolicy::new();
        let d = policy.evaluate(&sample(45_000, 0.1, 8_000)).unwrap();
        assert_eq!(d, StreamingDirective { budget_us: 7_000, prefetch: false });
        assert_eq!(policy.mode(), LoadingMode::Shedding);

        let d = policy.evaluate(&sample(45_000, 0.1, 7_000)).unwrap();
        assert_eq!(d.budget_us, 6_000);
    }

    #[test]
    fn test_shedding_never_goes_below_minimum() {
        let mut policy = AdaptiveLoadingPolicy::new();
        let mut budget = 8_000;
        for _ in 0..20 {
            if let Some(d) = policy.evaluate(&sample(90_000, 0.1, budget)) {
                budget = d.budget_us;
            }
        }
        assert_eq!(budget, MIN_STREAMING_BUDGET_US);
        assert_eq!(policy.evaluate(&sample(90_000, 0.1, budget)), None);
    }

    #[test]
    fn test_memory_pressure_alone_sheds() {
        let mut policy = AdaptiveLoadingPolicy::new();
        assert!(policy.evaluate(&sample(10_000, 0.9, 8_000)).is_some());
        assert_eq!(policy.mode(), LoadingMode::Shedding);
    }

    #[test]
    fn test_poor_performance_flag_sheds() {
        let mut policy = AdaptiveLoadingPolicy::new();
        let mut s = sample(TARGET, 0.1, 8_000);
        s.performance_poor = true;
        assert!(policy.evaluate(&s).is_some());
    }

    #[test]
    fn test_recovery_restores_saved_budget_and_prefetch() {
        let mut policy = AdaptiveLoadingPolicy::new();
        policy.evaluate(&sample(45_000, 0.1, 9_000));
        policy.evaluate(&sample(45_000, 0.1, 8_000));

        // Neither slow nor fast: hold.
        assert_eq!(policy.evaluate(&sample(TARGET, 0.1, 7_000)), None);

        let d = policy.evaluate(&sample(20_000, 0.1, 7_000)).unwrap();
        assert_eq!(d, StreamingDirective { budget_us: 9_000, prefetch: true });
        assert_eq!(policy.mode(), LoadingMode::Normal);
    }

    #[test]
    fn test_headroom_creeps_budget_up_to_cap() {
        let mut policy = AdaptiveLoadingPolicy::new();
        let mut budget = INITIAL_STREAMING_BUDGET_US;
        for _ in 0..20 {
            if let Some(d) = policy.evaluate(&sample(10_000, 0.1, budget)) {
                assert!(d.prefetch);
                budget = d.budget_us;
            }
        }
        assert_eq!(budget, MAX_STREAMING_BUDGET_US);
    }

    #[test]
    fn test_high_pressure_blocks_recovery() {
        let mut policy = AdaptiveLoadingPolicy::new();
        policy.evaluate(&sample(10_000, 0.95, 8_000));
        let d = policy.evaluate(&sample(10_000, 0.95, 7_000)).unwrap();
        assert!(!d.prefetch);
        assert_eq!(policy.mode(), LoadingMode::Shedding);
    }
}
