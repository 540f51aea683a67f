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

//! Registry for runtime metrics.

use crate::storage::{backend::MetricsBackend, memory_backend::InMemoryBackend};
use std::sync::Arc;
use wisp_core::telemetry::{Metric, MetricId, MetricType, MetricsError, MetricsResult};

/// Entry point for registering and querying metrics.
///
/// Registration returns a typed handle that shares the backend, so hot
/// paths update a metric without looking it up by name.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    backend: Arc<dyn MetricsBackend>,
}

impl MetricsRegistry {
    /// Creates a registry over an [`InMemoryBackend`].
    pub fn new() -> Self {
        Self {
            backend: Arc::new(InMemoryBackend::new()),
        }
    }

    /// Creates a registry over a custom backend.
    pub fn with_backend(backend: Arc<dyn MetricsBackend>) -> Self {
        Self { backend }
    }

    /// Registers a counter starting at zero.
    pub fn register_counter(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> MetricsResult<CounterHandle> {
        let id = MetricId::new(namespace, name);
        self.backend
            .put_metric(Metric::new_counter(id.clone(), description, 0))?;
        Ok(CounterHandle {
            id,
            backend: self.backend.clone(),
        })
    }

    /// Registers a gauge starting at zero.
    pub fn register_gauge(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
    ) -> MetricsResult<GaugeHandle> {
        self.register_gauge_with_labels(namespace, name, description, unit, Vec::new())
    }

    /// Registers a labelled gauge starting at zero.
    pub fn register_gauge_with_labels(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
        labels: Vec<(String, String)>,
    ) -> MetricsResult<GaugeHandle> {
        let id = labels
            .into_iter()
            .fold(MetricId::new(namespace, name), |id, (k, v)| id.with_label(k, v));
        self.backend
            .put_metric(Metric::new_gauge(id.clone(), description, unit, 0.0))?;
        Ok(GaugeHandle {
            id,
            backend: self.backend.clone(),
        })
    }

    /// Registers a histogram over ascending `buckets`.
    pub fn register_histogram(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
        buckets: Vec<f64>,
    ) -> MetricsResult<HistogramHandle> {
        if buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(MetricsError::InvalidOperation(
                "histogram buckets must be strictly ascending".to_string(),
            ));
        }
        let id = MetricId::new(namespace, name);
        self.backend
            .put_metric(Metric::new_histogram(id.clone(), description, unit, buckets))?;
        Ok(HistogramHandle {
            id,
            backend: self.backend.clone(),
        })
    }

    /// Reads a metric.
    pub fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric> {
        self.backend.get_metric(id)
    }

    /// Returns `true` if the metric is registered.
    pub fn contains_metric(&self, id: &MetricId) -> bool {
        self.backend.contains_metric(id)
    }

    /// Every metric in `namespace`, sorted by id for stable output.
    pub fn namespace_metrics(&self, namespace: &str) -> Vec<Metric> {
        let mut metrics: Vec<Metric> = self
            .backend
            .list_all_metrics()
            .into_iter()
            .filter(|m| m.metadata.id.namespace == namespace)
            .collect();
        metrics.sort_by_key(|m| m.metadata.id.to_string());
        metrics
    }

    /// Every registered metric, sorted by id.
    pub fn all_metrics(&self) -> Vec<Metric> {
        let mut metrics = self.backend.list_all_metrics();
        metrics.sort_by_key(|m| m.metadata.id.to_string());
        metrics
    }

    /// Number of registered metrics.
    pub fn metric_count(&self) -> usize {
        self.backend.metric_count()
    }

    /// Drops every metric. Existing handles start failing with `MetricNotFound`.
    pub fn clear_all(&self) -> MetricsResult<()> {
        self.backend.clear_all()
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a counter.
#[derive(Debug, Clone)]
pub struct CounterHandle {
    id: MetricId,
    backend: Arc<dyn MetricsBackend>,
}

impl CounterHandle {
    /// Adds one.
    pub fn increment(&self) -> MetricsResult<u64> {
        self.backend.increment_counter(&self.id, 1)
    }

    /// Adds `amount`.
    pub fn increment_by(&self, amount: u64) -> MetricsResult<u64> {
        self.backend.increment_counter(&self.id, amount)
    }

    /// Current value.
    pub fn get(&self) -> MetricsResult<u64> {
        let metric = self.backend.get_metric(&self.id)?;
        metric
            .value
            .as_counter()
            .ok_or(MetricsError::TypeMismatch {
                expected: MetricType::Counter,
                found: metric.value.metric_type(),
            })
    }

    /// The metric id.
    pub fn id(&self) -> &MetricId {
        &self.id
    }
}

/// Handle to a gauge.
#[derive(Debug, Clone)]
pub struct GaugeHandle {
    id: MetricId,
    backend: Arc<dyn MetricsBackend>,
}

impl GaugeHandle {
    /// Sets the value.
    pub fn set(&self, value: f64) -> MetricsResult<()> {
        self.backend.set_gauge(&self.id, value)
    }

    /// Current value.
    pub fn get(&self) -> MetricsResult<f64> {
        let metric = self.backend.get_metric(&self.id)?;
        metric.value.as_gauge().ok_or(MetricsError::TypeMismatch {
            expected: MetricType::Gauge,
            found: metric.value.metric_type(),
        })
    }

    /// The metric id.
    pub fn id(&self) -> &MetricId {
        &self.id
    }
}

/// Handle to a histogram.
#[derive(Debug, Clone)]
pub struct HistogramHandle {
    id: MetricId,
    backend: Arc<dyn MetricsBackend>,
}

impl HistogramHandle {
    /// Records an observation.
    pub fn observe(&self, value: f64) -> MetricsResult<()> {
        self.backend.observe_histogram(&self.id, value)
    }

    /// The full metric.
    pub fn get_metric(&self) -> MetricsResult<Metric> {
        self.backend.get_metric(&self.id)
    }

    /// The metric id.
    pub fn id(&self) -> &MetricId {
        &self.id
    }
}
