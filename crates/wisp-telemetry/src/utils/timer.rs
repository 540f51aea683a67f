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

//! Scope timers that record into a histogram when dropped.

use crate::metrics::registry::HistogramHandle;
use wisp_core::time::TimeSource;

/// Measures the lifetime of a scope in microseconds, read from the runtime's
/// [`TimeSource`], and records it in a histogram on drop.
pub struct ScopedMetricTimer<'a> {
    clock: &'a dyn TimeSource,
    started_us: u64,
    histogram: &'a HistogramHandle,
}

impl<'a> ScopedMetricTimer<'a> {
    /// Starts timing now.
    pub fn new(clock: &'a dyn TimeSource, histogram: &'a HistogramHandle) -> Self {
        Self {
            clock,
            started_us: clock.now_us(),
            histogram,
        }
    }
}

impl Drop for ScopedMetricTimer<'_> {
    fn drop(&mut self) {
        let elapsed_us = self.clock.now_us().saturating_sub(self.started_us);
        if let Err(e) = self.histogram.observe(elapsed_us as f64) {
            log::warn!("ScopedMetricTimer: Failed to record {}: {e}", self.histogram.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MetricsRegistry;
    use wisp_core::time::ManualClock;

    #[test]
    fn test_records_scope_duration_on_drop() {
        let registry = MetricsRegistry::new();
        let h = registry
            .register_histogram("loop", "update_us", "", "us", vec![100.0, 1_000.0])
            .unwrap();
        let clock = ManualClock::new();
        {
            let _timer = ScopedMetricTimer::new(&clock, &h);
            clock.advance(250);
        }
        let metric = h.get_metric().unwrap();
        let summary = metric.value.as_histogram().unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.sum, 250.0);
        assert_eq!(summary.bucket_counts, vec![0, 1, 0]);
    }
}
