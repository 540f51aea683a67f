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

//! The fixed-order frame pipeline.
//!
//! [`StagePipeline`] owns the simulation tables and runs the eleven
//! [`Stage`]s once per admitted frame. Stage order is fixed by
//! [`Stage::ALL`]; no stage is ever skipped, though some may find nothing
//! to do.

mod stage;
mod triggers;

pub use stage::{Stage, STAGE_COUNT};

use crate::collaborators::FrameDrivers;
use crate::logic::FrameContext;
use triggers::TriggerOccupancy;
use wisp_core::config::RuntimeConfig;
use wisp_core::physics::{EntityId, EntityTable, EventList, FrameEvent, FrameEventKind, RegionTable};
use wisp_core::time::TimeSource;
use wisp_lanes::physics_lane::ApplyStats;

/// One sprite submission prepared during render prepare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCommand {
    /// Source entity.
    pub entity: EntityId,
    /// Sprite reference.
    pub sprite: u16,
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Animation frame.
    pub frame: u8,
    /// Draw depth. Higher is further back.
    pub depth: u8,
}

/// Summary of one executed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame number, starting at 1.
    pub frame: u64,
    /// Time spent in the stages, excluding the limiter sleep.
    pub work_us: u64,
    /// Movement outcome of the resolution stage.
    pub physics: ApplyStats,
    /// Events recorded this frame.
    pub events: usize,
    /// Events dropped because the list was full.
    pub dropped_events: u32,
}

/// Owns the entity, region and event tables and runs the stages.
#[derive(Debug)]
pub struct StagePipeline {
    entities: EntityTable,
    regions: RegionTable,
    events: EventList,
    previous_events: EventList,
    occupancy: TriggerOccupancy,
    draw_list: Vec<DrawCommand>,
    stage_timings_us: [u64; STAGE_COUNT],
    trace: Vec<usize>,
    last_physics: ApplyStats,
    frame: u64,
    limiter: bool,
}

impl StagePipeline {
    /// Allocates every table at the sizes given by `config`.
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            entities: EntityTable::with_capacity(config.entity_capacity),
            regions: RegionTable::with_capacity(config.region_capacity),
            events: EventList::with_capacity(config.event_capacity),
            previous_events: EventList::with_capacity(config.event_capacity),
            occupancy: TriggerOccupancy::with_capacity(config.event_capacity),
            draw_list: Vec::with_capacity(config.entity_capacity),
            stage_timings_us: [0; STAGE_COUNT],
            trace: Vec::with_capacity(STAGE_COUNT),
            last_physics: ApplyStats::default(),
            frame: 0,
            limiter: config.frame_limiter,
        }
    }

    // ── Tables ──────────────────────────────────────────────────────────

    /// The entity table.
    pub fn entities(&self) -> &EntityTable {
        &self.entities
    }

    /// The entity table, mutably.
    pub fn entities_mut(&mut self) -> &mut EntityTable {
        &mut self.entities
    }

    /// The region table.
    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// The region table, mutably.
    pub fn regions_mut(&mut self) -> &mut RegionTable {
        &mut self.regions
    }

    /// Events of the last frame, in emission order.
    pub fn events(&self) -> &[FrameEvent] {
        self.events.as_slice()
    }

    /// Events dropped during the last frame.
    pub fn dropped_events(&self) -> u32 {
        self.events.dropped()
    }

    /// Draw list built by the last render prepare, back to front.
    pub fn draw_list(&self) -> &[DrawCommand] {
        &self.draw_list
    }

    /// Removes every entity, region and event. Ids already handed out stay
    /// retired.
    pub fn clear_world(&mut self) {
        self.entities.clear();
        self.regions.clear();
        self.events.clear();
        self.previous_events.clear();
        self.occupancy.clear();
        self.draw_list.clear();
    }

    // ── Diagnostics ─────────────────────────────────────────────────────

    /// Duration of each stage during the last frame, indexed by [`Stage::index`].
    pub fn stage_timings_us(&self) -> [u64; STAGE_COUNT] {
        self.stage_timings_us
    }

    /// Stage indices in the order the last frame ran them.
    pub fn last_stage_trace(&self) -> &[usize] {
        &self.trace
    }

    /// Frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Whether [`limit_frame`](Self::limit_frame) sleeps.
    pub fn frame_limiter(&self) -> bool {
        self.limiter
    }

    /// Turns the frame limiter on or off.
    pub fn set_frame_limiter(&mut self, enabled: bool) {
        self.limiter = enabled;
    }

    // ── Execution ───────────────────────────────────────────────────────

    /// Runs every stage once, in order.
    pub fn run_frame(&mut self, drivers: &mut FrameDrivers, clock: &dyn TimeSource) -> FrameReport {
        self.frame += 1;
        self.trace.clear();
        let frame_start = clock.now_us();

        for stage in Stage::ALL {
            let started = clock.now_us();
            self.run_stage(stage, drivers);
            self.stage_timings_us[stage.index()] = clock.now_us().saturating_sub(started);
            self.trace.push(stage.index());
        }

        let work_us = clock.now_us().saturating_sub(frame_start);
        log::trace!(
            "StagePipeline: Frame {} took {} us, stages {:?}",
            self.frame,
            work_us,
            self.stage_timings_us
        );

        FrameReport {
            frame: self.frame,
            work_us,
            physics: self.last_physics,
            events: self.events.len(),
            dropped_events: self.events.dropped(),
        }
    }

    /// Sleeps out whatever is left of `budget_us` after `elapsed_us` of
    /// work. Returns the time slept.
    pub fn limit_frame(&self, clock: &dyn TimeSource, budget_us: u64, elapsed_us: u64) -> u64 {
        if !self.limiter {
            return 0;
        }
        let remaining = budget_us.saturating_sub(elapsed_us);
        if remaining > 0 {
            clock.sleep_us(remaining);
        }
        remaining
    }

    fn run_stage(&mut self, stage: Stage, drivers: &mut FrameDrivers) {
        match stage {
            Stage::InputCollection => drivers.input.update(),
            Stage::Heartbeat => {
                drivers.audio.update();
                std::mem::swap(&mut self.events, &mut self.previous_events);
                self.events.clear();
            }
            Stage::LogicUpdate => {
                if let Some(logic) = drivers.logic.as_mut() {
                    let mut ctx = FrameContext {
                        frame: self.frame,
                        entities: &mut self.entities,
                        regions: &mut self.regions,
                        input: &*drivers.input,
                        previous_events: self.previous_events.as_slice(),
                    };
                    logic.update(&mut ctx);
                }
            }
            Stage::PhysicsPrediction => drivers.physics.predict(&self.entities),
            Stage::CollisionDetection => {
                drivers
                    .physics
                    .detect(&self.entities, &self.regions, &mut self.events)
            }
            Stage::PhysicsResolution => {
                drivers.physics.resolve();
                self.last_physics = drivers.physics.apply(&mut self.entities);
            }
            Stage::TriggerProcessing => self.process_events(drivers),
            Stage::AudioUpdate => {}
            Stage::RenderPrepare => self.prepare_draw_list(),
            Stage::RenderExecute => {
                drivers.renderer.clear();
                for cmd in &self.draw_list {
                    drivers
                        .renderer
                        .draw_entity(cmd.entity, cmd.sprite, cmd.x, cmd.y, cmd.frame);
                }
            }
            Stage::RenderPresent => drivers.renderer.present(),
        }
    }

    fn process_events(&mut self, drivers: &mut FrameDrivers) {
        self.occupancy.update(&mut self.events);

        for event in self.events.iter() {
            if event.kind == FrameEventKind::Collision {
                match (event.other, event.region) {
                    (Some(other), _) => {
                        log::debug!("StagePipeline: Collision {:?} <-> {:?}", event.entity, other)
                    }
                    (None, Some(region)) => {
                        log::debug!("StagePipeline: Collision {:?} <-> {:?}", event.entity, region)
                    }
                    (None, None) => {}
                }
                continue;
            }

            let Some(region) = event.region.and_then(|id| self.regions.get(id)) else {
                continue;
            };
            log::debug!(
                "StagePipeline: {:?} {:?} in {:?}",
                event.kind,
                event.entity,
                region.id()
            );
            if region.logic.dispatches(event.kind) {
                if let Some(logic) = drivers.logic.as_mut() {
                    logic.on_trigger(event);
                }
            }
        }
    }

    fn prepare_draw_list(&mut self) {
        self.draw_list.clear();
        self.draw_list.extend(
            self.entities
                .iter()
                .filter(|e| e.active)
                .filter_map(|e| {
                    e.sprite.map(|sprite| DrawCommand {
                        entity: e.id(),
                        sprite,
                        x: e.bounds.left,
                        y: e.bounds.top,
                        frame: e.frame,
                        depth: e.depth,
                    })
                }),
        );
        // Stable, so equal depths keep slot order.
        self.draw_list.sort_by(|a, b| b.depth.cmp(&a.depth));
    }
}
