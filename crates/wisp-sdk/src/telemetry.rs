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

//! Loop metrics published to the telemetry registry.

use crate::pipeline::{Stage, STAGE_COUNT};
use wisp_control::FrameRateController;
use wisp_core::telemetry::MetricsResult;
use wisp_telemetry::{CounterHandle, GaugeHandle, HistogramHandle, MetricsRegistry, TelemetryService};

/// Bucket bounds for frame work, in µs. Spans the ladder from 60 to 8 FPS.
const FRAME_WORK_BUCKETS_US: [f64; 8] = [
    5_000.0, 10_000.0, 16_666.0, 33_333.0, 41_666.0, 50_000.0, 83_333.0, 125_000.0,
];

/// Handles to every metric the loop publishes.
#[derive(Debug)]
pub(crate) struct LoopMetrics {
    fps_current: GaugeHandle,
    fps_target: GaugeHandle,
    frame_time_us: GaugeHandle,
    drop_percentage: GaugeHandle,
    frames_total: CounterHandle,
    stage_time_us: Vec<GaugeHandle>,
    pub(crate) frame_work_us: HistogramHandle,
}

impl LoopMetrics {
    pub(crate) fn register(registry: &MetricsRegistry) -> MetricsResult<Self> {
        let stage_time_us = Stage::ALL
            .iter()
            .map(|stage| {
                registry.register_gauge_with_labels(
                    "pipeline",
                    "stage_time_us",
                    "Duration of one pipeline stage",
                    "us",
                    vec![("stage".to_string(), stage.name().to_string())],
                )
            })
            .collect::<MetricsResult<Vec<_>>>()?;

        Ok(Self {
            fps_current: registry.register_gauge("loop", "fps.current", "Measured frame rate", "fps")?,
            fps_target: registry.register_gauge("loop", "fps.target", "Target frame rate", "fps")?,
            frame_time_us: registry.register_gauge("loop", "frame_time_us", "Work time of the last frame", "us")?,
            drop_percentage: registry.register_gauge("loop", "drop_percentage", "Share of missed frames", "%")?,
            frames_total: registry.register_counter("loop", "frames.total", "Frames run")?,
            stage_time_us,
            frame_work_us: registry.register_histogram(
                "loop",
                "frame_work_us",
                "Distribution of frame work time",
                "us",
                FRAME_WORK_BUCKETS_US.to_vec(),
            )?,
        })
    }

    pub(crate) fn publish(
        &self,
        controller: &FrameRateController,
        work_us: u64,
        stage_timings_us: &[u64; STAGE_COUNT],
    ) -> MetricsResult<()> {
        self.fps_current.set(f64::from(controller.current_fps()))?;
        self.fps_target.set(f64::from(controller.target_fps()))?;
        self.frame_time_us.set(work_us as f64)?;
        self.drop_percentage
            .set(f64::from(controller.frame_drop_percentage()))?;
        self.frames_total.increment()?;
        for (gauge, &us) in self.stage_time_us.iter().zip(stage_timings_us) {
            gauge.set(us as f64)?;
        }
        Ok(())
    }
}

/// The telemetry service and the loop's handles into it.
#[derive(Debug)]
pub(crate) struct LoopTelemetry {
    pub(crate) service: TelemetryService,
    pub(crate) metrics: LoopMetrics,
}
