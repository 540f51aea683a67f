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

//! Abstract definitions for runtime metrics.

use std::fmt::{self, Display};

/// A structured metric identifier: namespace, name and sorted labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricId {
    /// Broad category, e.g. `"loop"` or `"pipeline"`.
    pub namespace: String,
    /// Metric name within the namespace, e.g. `"fps.current"`.
    pub name: String,
    /// Key-value labels, kept sorted by key.
    pub labels: Vec<(String, String)>,
}

impl MetricId {
    /// Creates an id without labels.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            labels: Vec::new(),
        }
    }

    /// Adds a label, keeping labels sorted by key.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push((key.into(), value.into()));
        self.labels.sort_by(|a, b| a.0.cmp(&b.0));
        self
    }
}

impl Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)?;
        if !self.labels.is_empty() {
            let labels = self
                .labels
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(",");
            write!(f, "[{labels}]")?;
        }
        Ok(())
    }
}

/// The kind of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    /// Only increases, or resets to zero.
    Counter,
    /// Goes up and down.
    Gauge,
    /// Distribution of observations over fixed buckets.
    Histogram,
}

/// Fixed-bucket summary of observations. Raw samples are not kept.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSummary {
    /// Upper bounds of the buckets, ascending.
    pub bucket_bounds: Vec<f64>,
    /// Observations per bucket. The last entry counts values above every bound.
    pub bucket_counts: Vec<u64>,
    /// Number of observations.
    pub count: u64,
    /// Sum of observations.
    pub sum: f64,
    /// Smallest observation, `f64::MAX` when empty.
    pub min: f64,
    /// Largest observation, `f64::MIN` when empty.
    pub max: f64,
}

impl HistogramSummary {
    /// Creates an empty summary over `bucket_bounds`.
    pub fn new(bucket_bounds: Vec<f64>) -> Self {
        let bucket_counts = vec![0; bucket_bounds.len() + 1];
        Self {
            bucket_bounds,
            bucket_counts,
            count: 0,
            sum: 0.0,
            min: f64::MAX,
            max: f64::MIN,
        }
    }

    /// Adds one observation.
    pub fn observe(&mut self, sample: f64) {
        let bucket = self
            .bucket_bounds
            .iter()
            .position(|&bound| sample <= bound)
            .unwrap_or(self.bucket_bounds.len());
        self.bucket_counts[bucket] += 1;
        self.count += 1;
        self.sum += sample;
        self.min = self.min.min(sample);
        self.max = self.max.max(sample);
    }

    /// Mean observation, `0.0` when empty.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// The current value of a metric.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// Counter value.
    Counter(u64),
    /// Gauge value.
    Gauge(f64),
    /// Histogram summary.
    Histogram(HistogramSummary),
}

impl MetricValue {
    /// The [`MetricType`] of this value.
    pub fn metric_type(&self) -> MetricType {
        match self {
            MetricValue::Counter(_) => MetricType::Counter,
            MetricValue::Gauge(_) => MetricType::Gauge,
            MetricValue::Histogram(_) => MetricType::Histogram,
        }
    }

    /// Counter or gauge value as `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Counter(v) => Some(*v as f64),
            MetricValue::Gauge(v) => Some(*v),
            MetricValue::Histogram(_) => None,
        }
    }

    /// Counter value.
    pub fn as_counter(&self) -> Option<u64> {
        match self {
            MetricValue::Counter(v) => Some(*v),
            _ => None,
        }
    }

    /// Gauge value.
    pub fn as_gauge(&self) -> Option<f64> {
        match self {
            MetricValue::Gauge(v) => Some(*v),
            _ => None,
        }
    }

    /// Histogram summary.
    pub fn as_histogram(&self) -> Option<&HistogramSummary> {
        match self {
            MetricValue::Histogram(h) => Some(h),
            _ => None,
        }
    }
}

/// Static description of a metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricMetadata {
    /// The metric's id.
    pub id: MetricId,
    /// The metric's kind.
    pub metric_type: MetricType,
    /// Human-readable description.
    pub description: String,
    /// Unit, e.g. `"us"` or `"fps"`.
    pub unit: String,
    /// Number of writes since registration.
    pub updates: u64,
}

/// A metric value with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    /// Metadata.
    pub metadata: MetricMetadata,
    /// Current value.
    pub value: MetricValue,
}

impl Metric {
    fn with_value(
        id: MetricId,
        description: impl Into<String>,
        unit: impl Into<String>,
        value: MetricValue,
    ) -> Self {
        Self {
            metadata: MetricMetadata {
                id,
                metric_type: value.metric_type(),
                description: description.into(),
                unit: unit.into(),
                updates: 0,
            },
            value,
        }
    }

    /// A new counter.
    pub fn new_counter(id: MetricId, description: impl Into<String>, initial: u64) -> Self {
        Self::with_value(id, description, "count", MetricValue::Counter(initial))
    }

    /// A new gauge.
    pub fn new_gauge(
        id: MetricId,
        description: impl Into<String>,
        unit: impl Into<String>,
        initial: f64,
    ) -> Self {
        Self::with_value(id, description, unit, MetricValue::Gauge(initial))
    }

    /// A new histogram over `bucket_bounds`.
    pub fn new_histogram(
        id: MetricId,
        description: impl Into<String>,
        unit: impl Into<String>,
        bucket_bounds: Vec<f64>,
    ) -> Self {
        let summary = HistogramSummary::new(bucket_bounds);
        Self::with_value(id, description, unit, MetricValue::Histogram(summary))
    }
}

/// Result type of metric operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Errors of the metrics system.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricsError {
    /// No metric with this id is registered.
    MetricNotFound(MetricId),
    /// The operation does not apply to the metric's kind.
    TypeMismatch {
        /// Kind the operation needs.
        expected: MetricType,
        /// Kind that was found.
        found: MetricType,
    },
    /// The backend failed.
    StorageError(String),
    /// Bad arguments, e.g. unsorted histogram bounds.
    InvalidOperation(String),
}

impl Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricsError::MetricNotFound(id) => write!(f, "Metric not found: {id}"),
            MetricsError::TypeMismatch { expected, found } => {
                write!(f, "Type mismatch: expected {expected:?}, found {found:?}")
            }
            MetricsError::StorageError(msg) => write!(f, "Storage error: {msg}"),
            MetricsError::InvalidOperation(msg) => write!(f, "Invalid operation: {msg}"),
        }
    }
}

impl std::error::Error for MetricsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_id_labels_sorted_and_displayed() {
        let id = MetricId::new("pipeline", "stage_time_us")
            .with_label("stage", "render_execute")
            .with_label("core", "0");
        assert_eq!(id.labels[0].0, "core");
        assert_eq!(
            id.to_string(),
            "pipeline:stage_time_us[core=0,stage=render_execute]"
        );
        assert_eq!(MetricId::new("loop", "fps.current").to_string(), "loop:fps.current");
    }

    #[test]
    fn test_histogram_buckets_and_overflow() {
        let mut h = HistogramSummary::new(vec![1_000.0, 10_000.0]);
        h.observe(500.0);
        h.observe(1_000.0);
        h.observe(5_000.0);
        h.observe(50_000.0);
        assert_eq!(h.bucket_counts, vec![2, 1, 1]);
        assert_eq!(h.count, 4);
        assert_eq!(h.min, 500.0);
        assert_eq!(h.max, 50_000.0);
        assert_eq!(h.mean(), 56_500.0 / 4.0);
    }

    #[test]
    fn test_value_accessors() {
        let c = MetricValue::Counter(3);
        assert_eq!(c.metric_type(), MetricType::Counter);
        assert_eq!(c.as_f64(), Some(3.0));
        assert_eq!(c.as_gauge(), None);

        let m = Metric::new_gauge(MetricId::new("loop", "fps.target"), "Target", "fps", 24.0);
        assert_eq!(m.metadata.metric_type, MetricType::Gauge);
        assert_eq!(m.value.as_gauge(), Some(24.0));
        assert_eq!(m.metadata.updates, 0);
    }

    #[test]
    fn test_error_display() {
        let err = MetricsError::TypeMismatch {
            expected: MetricType::Gauge,
            found: MetricType::Counter,
        };
        assert_eq!(err.to_string(), "Type mismatch: expected Gauge, found Counter");
    }
}
