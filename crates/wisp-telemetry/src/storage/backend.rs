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

use std::fmt::Debug;
use wisp_core::telemetry::{Metric, MetricId, MetricType, MetricValue, MetricsError, MetricsResult};

/// Storage for metrics.
///
/// Backends only need to provide keyed storage; the update helpers are
/// written once on top of `get_metric`/`put_metric`.
pub trait MetricsBackend: Send + Sync + Debug + 'static {
    /// Stores or replaces a metric.
    fn put_metric(&self, metric: Metric) -> MetricsResult<()>;

    /// Reads a metric by id.
    fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric>;

    /// Returns `true` if a metric with this id is stored.
    fn contains_metric(&self, id: &MetricId) -> bool;

    /// Every stored metric.
    fn list_all_metrics(&self) -> Vec<Metric>;

    /// Removes every metric.
    fn clear_all(&self) -> MetricsResult<()>;

    /// Number of stored metrics.
    fn metric_count(&self) -> usize;

    /// Adds `delta` to a counter and returns the new value.
    fn increment_counter(&self, id: &MetricId, delta: u64) -> MetricsResult<u64> {
        let mut metric = self.get_metric(id)?;
        match metric.value {
            MetricValue::Counter(ref mut value) => {
                *value = value.saturating_add(delta);
                let result = *value;
                metric.metadata.updates += 1;
                self.put_metric(metric)?;
                Ok(result)
            }
            _ => Err(MetricsError::TypeMismatch {
                expected: MetricType::Counter,
                found: metric.value.metric_type(),
            }),
        }
    }

    /// Sets a gauge.
    fn set_gauge(&self, id: &MetricId, value: f64) -> MetricsResult<()> {
        let mut metric = self.get_metric(id)?;
        match metric.value {
            MetricValue::Gauge(ref mut current) => {
                *current = value;
                metric.metadata.updates += 1;
                self.put_metric(metric)
            }
            _ => Err(MetricsError::TypeMismatch {
                expected: MetricType::Gauge,
                found: metric.value.metric_type(),
            }),
        }
    }

    /// Adds an observation to a histogram.
    fn observe_histogram(&self, id: &MetricId, sample: f64) -> MetricsResult<()> {
        let mut metric = self.get_metric(id)?;
        match metric.value {
            MetricValue::Histogram(ref mut summary) => {
                summary.observe(sample);
                metric.metadata.updates += 1;
                self.put_metric(metric)
            }
            _ => Err(MetricsError::TypeMismatch {
                expected: MetricType::Histogram,
                found: metric.value.metric_type(),
            }),
        }
    }
}
