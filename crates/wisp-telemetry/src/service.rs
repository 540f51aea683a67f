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

//! Service that owns the metrics registry and logs periodic summaries.

use crate::metrics::registry::MetricsRegistry;
use serde::Serialize;
use wisp_core::telemetry::{Metric, MetricValue};

/// Namespaces included in the periodic summary, in print order.
const SUMMARY_NAMESPACES: [&str; 2] = ["loop", "pipeline"];

/// Flat, serializable view of one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSnapshot {
    /// Display form of the metric id, e.g. `loop:fps.current`.
    pub id: String,
    /// `"counter"`, `"gauge"` or `"histogram"`.
    pub kind: &'static str,
    /// Counter or gauge value; histogram mean.
    pub value: f64,
    /// Observation count for histograms, update count otherwise.
    pub samples: u64,
    /// Unit, possibly empty.
    pub unit: String,
}

impl From<&Metric> for MetricSnapshot {
    fn from(metric: &Metric) -> Self {
        let (kind, value, samples) = match &metric.value {
            MetricValue::Counter(v) => ("counter", *v as f64, metric.metadata.updates),
            MetricValue::Gauge(v) => ("gauge", *v, metric.metadata.updates),
            MetricValue::Histogram(h) => ("histogram", h.mean(), h.count),
        };
        Self {
            id: metric.metadata.id.to_string(),
            kind,
            value,
            samples,
            unit: metric.metadata.unit.clone(),
        }
    }
}

/// Service for managing runtime telemetry.
#[derive(Debug)]
pub struct TelemetryService {
    metrics: MetricsRegistry,
    interval_frames: u64,
    last_summary_frame: u64,
}

impl TelemetryService {
    /// Creates a service that summarizes every `interval_frames` frames.
    /// An interval of zero disables summaries.
    pub fn new(interval_frames: u64) -> Self {
        Self {
            metrics: MetricsRegistry::new(),
            interval_frames,
            last_summary_frame: 0,
        }
    }

    /// Called once per frame with the running frame count. Logs a summary
    /// when the interval has elapsed and returns whether it did.
    pub fn tick(&mut self, frame: u64) -> bool {
        if self.interval_frames == 0
            || frame.saturating_sub(self.last_summary_frame) < self.interval_frames
        {
            return false;
        }
        self.last_summary_frame = frame;
        log::info!("Telemetry summary at frame {frame}:");
        for namespace in SUMMARY_NAMESPACES {
            for metric in self.metrics.namespace_metrics(namespace) {
                let snap = MetricSnapshot::from(&metric);
                log::info!("  {} = {:.2} {}", snap.id, snap.value, snap.unit);
            }
        }
        true
    }

    /// Returns a reference to the metrics registry.
    pub fn metrics_registry(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Frames between summaries.
    pub fn interval_frames(&self) -> u64 {
        self.interval_frames
    }

    /// Every metric, sorted by id.
    pub fn snapshot(&self) -> Vec<MetricSnapshot> {
        self.metrics
            .all_metrics()
            .iter()
            .map(MetricSnapshot::from)
            .collect()
    }

    /// [`snapshot`](Self::snapshot) as pretty JSON.
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}

impl Default for TelemetryService {
    fn default() -> Self {
        Self::new(300)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_respects_interval() {
        let mut service = TelemetryService::new(10);
        assert!(!service.tick(1));
        assert!(!service.tick(9));
        assert!(service.tick(10));
        assert!(!service.tick(15));
        assert!(service.tick(20));
    }

    #[test]
    fn test_zero_interval_disables_summaries() {
        let mut service = TelemetryService::new(0);
        assert!(!service.tick(1_000));
    }

    #[test]
    fn test_snapshot_json() {
        let service = TelemetryService::default();
        let registry = service.metrics_registry();
        let frames = registry
            .register_counter("loop", "frames.total", "Frames run")
            .unwrap();
        frames.increment_by(3).unwrap();
        registry
            .register_gauge("loop", "fps.target", "Target rate", "fps")
            .unwrap()
            .set(24.0)
            .unwrap();

        let snapshot = service.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id, "loop:fps.target");
        assert_eq!(snapshot[0].value, 24.0);
        assert_eq!(snapshot[1].kind, "counter");
        assert_eq!(snapshot[1].value, 3.0);

        let json = service.snapshot_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[1]["id"], "loop:frames.total");
    }
}
