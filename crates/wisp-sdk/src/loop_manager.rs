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

//! The top-level frame loop.

use crate::collaborators::{Collaborators, FrameDrivers, StreamingControl};
use crate::pipeline::{FrameReport, StagePipeline, STAGE_COUNT};
use crate::telemetry::{LoopMetrics, LoopTelemetry};
use std::fmt;
use thiserror::Error;
use wisp_control::{FrameRateController, LoadSample};
use wisp_core::config::RuntimeConfig;
use wisp_core::control::FrameRate;
use wisp_core::math::Rect;
use wisp_core::physics::{
    CollisionMask, Entity, EntityId, EntityTable, FrameEvent, Region, RegionId, RegionKind,
    RegionTable, TriggerLogic,
};
use wisp_core::telemetry::MetricsResult;
use wisp_core::time::{SystemClock, TimeSource, Timekeeper, TimerId};
use wisp_lanes::physics_lane::PhysicsLane;
use wisp_telemetry::{ScopedMetricTimer, TelemetryService};

/// Lifecycle misuse of a [`LoopManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoopError {
    /// A required collaborator was not supplied to `init`.
    #[error("required collaborator `{0}` is missing")]
    MissingCollaborator(&'static str),
    /// `init` was called twice.
    #[error("loop manager is already initialized")]
    AlreadyInitialized,
    /// `start` was called before `init`.
    #[error("loop manager is not initialized")]
    NotInitialized,
    /// The physics lane holds fewer intents than the entity table has slots.
    #[error("physics lane holds {lane} intents but the entity table has {entities} slots")]
    PhysicsCapacity {
        /// Intent capacity of the lane.
        lane: usize,
        /// Entity table capacity.
        entities: usize,
    },
}

/// Owns the clock, the frame-rate controller and the stage pipeline, and
/// runs one frame per [`update`](Self::update) whenever a frame is due.
///
/// ```text
/// update()
///   └─ is_frame_due? ── no ──> return
///        └─ yes: controller.frame_start
///                pipeline.run_frame      (11 stages)
///                controller.frame_end    (may change the target rate)
///                loading policy          (steers the asset streamer)
///                telemetry
///                frame limiter sleep
///                timers.tick
/// ```
pub struct LoopManager {
    config: RuntimeConfig,
    timekeeper: Timekeeper,
    controller: FrameRateController,
    pipeline: StagePipeline,
    drivers: Option<FrameDrivers>,
    streaming: StreamingControl,
    telemetry: Option<LoopTelemetry>,
    running: bool,
    last_report: Option<FrameReport>,
}

impl LoopManager {
    /// Builds a loop from a config and a time source. Rates are snapped onto
    /// the ladder; the tables are allocated here.
    pub fn new(config: RuntimeConfig, clock: Box<dyn TimeSource>) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("LoopManager: {e}, continuing with clamped values");
        }
        let config = config.sanitized();
        let controller = FrameRateController::new(
            config.target_fps,
            config.minimum_fps,
            config.adaptive_scaling,
        );
        let timekeeper = Timekeeper::new(clock, controller.target_frame_duration_us());
        let pipeline = StagePipeline::new(&config);
        Self {
            config,
            timekeeper,
            controller,
            pipeline,
            drivers: None,
            streaming: StreamingControl::default(),
            telemetry: None,
            running: false,
            last_report: None,
        }
    }

    /// Builds a loop on the wall clock.
    pub fn with_system_clock(config: RuntimeConfig) -> Self {
        Self::new(config, Box::new(SystemClock::new()))
    }

    /// Publishes loop and stage metrics into `service`'s registry and lets
    /// the loop tick it every frame.
    pub fn with_telemetry(mut self, service: TelemetryService) -> MetricsResult<Self> {
        let metrics = LoopMetrics::register(service.metrics_registry())?;
        self.telemetry = Some(LoopTelemetry { service, metrics });
        Ok(self)
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    /// Wires the collaborators. Fails if a required one is missing, if the
    /// physics lane cannot hold an intent per entity slot, or if the loop
    /// was already initialized.
    pub fn init(&mut self, collaborators: Collaborators) -> Result<(), LoopError> {
        if self.drivers.is_some() {
            return Err(LoopError::AlreadyInitialized);
        }
        let (drivers, mut streaming) = collaborators.into_parts()?;
        let entities = self.pipeline.entities().capacity();
        let lane = drivers.physics.capacity();
        if lane < entities {
            return Err(LoopError::PhysicsCapacity { lane, entities });
        }

        if let (Some(streamer), Some(policy)) =
            (streaming.streamer.as_mut(), streaming.policy.as_ref())
        {
            if let Some(budget_us) = policy.initial_budget_us() {
                streamer.set_work_budget_us(budget_us);
                streamer.set_prefetch_enabled(true);
            }
            log::info!("LoopManager: Asset streaming steered by {}", policy.name());
        }

        log::info!(
            "LoopManager: Initialized with {} physics at {}",
            drivers.physics.strategy_name(),
            self.controller.target()
        );
        self.drivers = Some(drivers);
        self.streaming = streaming;
        Ok(())
    }

    /// Allows [`update`](Self::update) to run frames. Returns `Ok(true)` if
    /// the loop was stopped before.
    pub fn start(&mut self) -> Result<bool, LoopError> {
        if self.drivers.is_none() {
            return Err(LoopError::NotInitialized);
        }
        if self.running {
            return Ok(false);
        }
        self.running = true;
        log::info!("LoopManager: Started at {}", self.controller.target());
        Ok(true)
    }

    /// Stops future frames. A frame in progress always completes.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            log::info!(
                "LoopManager: Stopped after {} frames",
                self.pipeline.frame_count()
            );
        }
    }

    /// Runs one frame if the loop is running and a frame is due. Returns
    /// whether a frame ran.
    pub fn update(&mut self) -> bool {
        if !self.running {
            return false;
        }
        let Some(drivers) = self.drivers.as_mut() else {
            return false;
        };
        if !self.timekeeper.is_frame_due() {
            return false;
        }

        let budget_us = self.controller.frame_start();
        self.timekeeper.on_frame_start();
        let report = {
            let _timer = self
                .telemetry
                .as_ref()
                .map(|t| ScopedMetricTimer::new(self.timekeeper.clock(), &t.metrics.frame_work_us));
            self.pipeline.run_frame(drivers, self.timekeeper.clock())
        };
        let work_us = self.timekeeper.on_frame_end();

        if let Some(change) = self.controller.frame_end(work_us) {
            self.timekeeper
                .set_frame_duration_us(change.to.frame_duration_us());
        }
        self.apply_loading_policy();
        self.publish_telemetry(work_us, report.frame);

        self.pipeline
            .limit_frame(self.timekeeper.clock(), budget_us, work_us);
        self.timekeeper.tick();
        self.last_report = Some(report);
        true
    }

    fn apply_loading_policy(&mut self) {
        let StreamingControl {
            streamer: Some(streamer),
            policy: Some(policy),
        } = &mut self.streaming
        else {
            return;
        };
        let sample = LoadSample {
            average_frame_time_us: self.controller.average_frame_time_us(),
            target_frame_time_us: self.controller.target_frame_duration_us(),
            performance_poor: self.controller.is_performance_poor(),
            memory_pressure: streamer.report_memory_pressure(),
            current_budget_us: streamer.work_budget_us(),
        };
        if let Some(directive) = policy.evaluate(&sample) {
            streamer.set_work_budget_us(directive.budget_us);
            streamer.set_prefetch_enabled(directive.prefetch);
        }
    }

    fn publish_telemetry(&mut self, work_us: u64, frame: u64) {
        let Some(telemetry) = self.telemetry.as_mut() else {
            return;
        };
        let timings = self.pipeline.stage_timings_us();
        if let Err(e) = telemetry.metrics.publish(&self.controller, work_us, &timings) {
            log::warn!("LoopManager: Failed to publish frame metrics: {e}");
        }
        telemetry.service.tick(frame);
    }

    /// `true` once [`init`](Self::init) succeeded.
    pub fn is_initialized(&self) -> bool {
        self.drivers.is_some()
    }

    /// `true` between [`start`](Self::start) and [`stop`](Self::stop).
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ── Entities and regions ────────────────────────────────────────────

    /// Creates an entity. Returns `None` when the table is full.
    pub fn spawn_entity(
        &mut self,
        bounds: Rect,
        collision_mask: CollisionMask,
        trigger_mask: CollisionMask,
    ) -> Option<EntityId> {
        self.pipeline
            .entities_mut()
            .spawn(bounds, collision_mask, trigger_mask)
    }

    /// Looks up an entity.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.pipeline.entities().get(id)
    }

    /// Looks up an entity for editing.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.pipeline.entities_mut().get_mut(id)
    }

    /// Removes an entity. Its id is never handed out again.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        self.pipeline.entities_mut().remove(id)
    }

    /// Creates a region. Returns `None` when the table is full.
    pub fn spawn_region(
        &mut self,
        bounds: Rect,
        kind: RegionKind,
        mask: CollisionMask,
        logic: TriggerLogic,
    ) -> Option<RegionId> {
        self.pipeline
            .regions_mut()
            .spawn(bounds, kind, mask, logic)
    }

    /// Looks up a region.
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.pipeline.regions().get(id)
    }

    /// Looks up a region for editing.
    pub fn region_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.pipeline.regions_mut().get_mut(id)
    }

    /// Removes a region. Its id is never handed out again.
    pub fn remove_region(&mut self, id: RegionId) -> Option<Region> {
        self.pipeline.regions_mut().remove(id)
    }

    /// The entity table.
    pub fn entities(&self) -> &EntityTable {
        self.pipeline.entities()
    }

    /// The region table.
    pub fn regions(&self) -> &RegionTable {
        self.pipeline.regions()
    }

    /// Events of the last frame.
    pub fn events(&self) -> &[FrameEvent] {
        self.pipeline.events()
    }

    // ── Frame rate ──────────────────────────────────────────────────────

    /// Measured rate, refreshed every 60 frames.
    pub fn current_fps(&self) -> f32 {
        self.controller.current_fps()
    }

    /// Current target rate.
    pub fn target_fps(&self) -> u32 {
        self.controller.target_fps()
    }

    /// Share of missed frames, in percent.
    pub fn frame_drop_percentage(&self) -> f32 {
        self.controller.frame_drop_percentage()
    }

    /// Overrides the target rate, clamped to the ladder and the floor.
    pub fn set_target_fps(&mut self, fps: u32) -> FrameRate {
        let rate = self.controller.set_target_fps(fps);
        self.timekeeper
            .set_frame_duration_us(rate.frame_duration_us());
        rate
    }

    /// Changes the floor rate. The target follows if it falls below.
    pub fn set_minimum_fps(&mut self, fps: u32) -> FrameRate {
        let floor = self.controller.set_minimum_fps(fps);
        self.timekeeper
            .set_frame_duration_us(self.controller.target_frame_duration_us());
        floor
    }

    /// Turns automatic rate scaling on or off.
    pub fn set_adaptive_scaling(&mut self, enabled: bool) {
        self.controller.set_adaptive_scaling(enabled);
    }

    /// The frame-rate controller.
    pub fn controller(&self) -> &FrameRateController {
        &self.controller
    }

    /// Logs the controller's performance report at `info`.
    pub fn log_performance_report(&self) {
        for line in self.controller.performance_report().lines() {
            log::info!("{line}");
        }
    }

    // ── Timers ──────────────────────────────────────────────────────────

    /// Runs `callback` after `delay_us`, checked once per frame. Returns
    /// `None` if every timer slot is armed.
    pub fn schedule(
        &mut self,
        delay_us: u64,
        callback: impl FnOnce() + 'static,
    ) -> Option<TimerId> {
        self.timekeeper.schedule(delay_us, callback)
    }

    /// Cancels a pending timer.
    pub fn cancel_timer(&mut self, id: TimerId) -> bool {
        self.timekeeper.cancel(id)
    }

    /// The frame clock.
    pub fn timekeeper(&self) -> &Timekeeper {
        &self.timekeeper
    }

    // ── Diagnostics ─────────────────────────────────────────────────────

    /// The stage pipeline.
    pub fn pipeline(&self) -> &StagePipeline {
        &self.pipeline
    }

    /// The stage pipeline, mutably.
    pub fn pipeline_mut(&mut self) -> &mut StagePipeline {
        &mut self.pipeline
    }

    /// Duration of each stage during the last frame.
    pub fn stage_timings_us(&self) -> [u64; STAGE_COUNT] {
        self.pipeline.stage_timings_us()
    }

    /// Stage indices in the order the last frame ran them.
    pub fn last_stage_trace(&self) -> &[usize] {
        self.pipeline.last_stage_trace()
    }

    /// Frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.pipeline.frame_count()
    }

    /// Summary of the last frame.
    pub fn last_report(&self) -> Option<FrameReport> {
        self.last_report
    }

    /// The physics lane, once initialized.
    pub fn physics_lane(&self) -> Option<&dyn PhysicsLane> {
        match &self.drivers {
            Some(drivers) => Some(drivers.physics.as_ref()),
            None => None,
        }
    }

    /// The telemetry service, if attached.
    pub fn telemetry(&self) -> Option<&TelemetryService> {
        self.telemetry.as_ref().map(|t| &t.service)
    }

    /// The sanitized configuration in force.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

impl fmt::Debug for LoopManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopManager")
            .field("running", &self.running)
            .field("target", &self.controller.target())
            .field("frames", &self.pipeline.frame_count())
            .field("timekeeper", &self.timekeeper)
            .field("drivers", &self.drivers)
            .finish_non_exhaustive()
    }
}

impl Drop for LoopManager {
    fn drop(&mut self) {
        log::info!(
            "LoopManager: Shutting down after {} frames ({:.1}% dropped)",
            self.pipeline.frame_count(),
            self.controller.frame_drop_percentage()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wisp_core::time::ManualClock;

    #[test]
    fn test_new_sanitizes_config() {
        let config = RuntimeConfig {
            target_fps: 27,
            minimum_fps: 11,
            ..RuntimeConfig::default()
        };
        let manager = LoopManager::new(config, Box::new(ManualClock::new()));
        assert_eq!(manager.config().target_fps, 24);
        assert_eq!(manager.config().minimum_fps, 10);
        assert_eq!(manager.timekeeper().frame_duration_us(), 41_666);
    }

    #[test]
    fn test_update_is_noop_before_start() {
        let mut manager = LoopManager::new(RuntimeConfig::default(), Box::new(ManualClock::new()));
        assert!(!manager.update());
        assert_eq!(manager.start(), Err(LoopError::NotInitialized));
        assert_eq!(manager.frame_count(), 0);
    }

    #[test]
    fn test_manual_override_moves_admission_threshold() {
        let mut manager = LoopManager::new(RuntimeConfig::default(), Box::new(ManualClock::new()));
        assert_eq!(manager.set_target_fps(45), FrameRate::Fps30);
        assert_eq!(manager.timekeeper().frame_duration_us(), 33_333);
        assert_eq!(manager.set_target_fps(1), FrameRate::Fps12);
    }
}
