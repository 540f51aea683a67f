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

//! Recording fakes shared by the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wisp_core::physics::{EntityId, FrameEvent};
use wisp_core::platform::{AssetStreamer, AudioAdapter, Button, InputAdapter, Renderer};
use wisp_core::time::ManualClock;
use wisp_core::RuntimeConfig;
use wisp_lanes::physics_lane::IntentPhysicsLane;
use wisp_sdk::{Collaborators, FrameContext, FrameLogic, LoopManager};

/// Shared log of collaborator calls, in call order.
pub type Journal = Rc<RefCell<Vec<&'static str>>>;

/// One `draw_entity` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    pub entity: EntityId,
    pub sprite: u16,
    pub x: i32,
    pub y: i32,
}

// --- Collaborator fakes ---

pub struct FakeRenderer {
    pub journal: Journal,
    pub draws: Rc<RefCell<Vec<Draw>>>,
    pub presents: Rc<Cell<u32>>,
    /// Simulated render cost, burned on the clock at present.
    pub cost_us: Rc<Cell<u64>>,
    pub clock: ManualClock,
}

impl Renderer for FakeRenderer {
    fn clear(&mut self) {
        self.journal.borrow_mut().push("clear");
        self.draws.borrow_mut().clear();
    }

    fn draw_entity(&mut self, entity: EntityId, sprite: u16, x: i32, y: i32, _frame: u8) {
        self.journal.borrow_mut().push("draw");
        self.draws.borrow_mut().push(Draw {
            entity,
            sprite,
            x,
            y,
        });
    }

    fn present(&mut self) {
        self.journal.borrow_mut().push("present");
        self.presents.set(self.presents.get() + 1);
        self.clock.advance(self.cost_us.get());
    }
}

pub struct FakeAudio {
    pub journal: Journal,
}

impl AudioAdapter for FakeAudio {
    fn update(&mut self) {
        self.journal.borrow_mut().push("audio");
    }
}

pub struct FakeInput {
    pub journal: Journal,
    pub held: Rc<RefCell<Vec<Button>>>,
}

impl InputAdapter for FakeInput {
    fn update(&mut self) {
        self.journal.borrow_mut().push("input");
    }

    fn is_pressed(&self, button: Button) -> bool {
        self.held.borrow().contains(&button)
    }
}

#[derive(Debug, Default)]
pub struct StreamerState {
    pub budget_us: u64,
    pub prefetch: bool,
    pub memory_pressure: f32,
    pub budget_history: Vec<u64>,
}

#[derive(Clone, Default)]
pub struct FakeStreamer {
    pub state: Rc<RefCell<StreamerState>>,
}

impl AssetStreamer for FakeStreamer {
    fn report_memory_pressure(&self) -> f32 {
        self.state.borrow().memory_pressure
    }

    fn work_budget_us(&self) -> u64 {
        self.state.borrow().budget_us
    }

    fn set_work_budget_us(&mut self, budget_us: u64) {
        let mut state = self.state.borrow_mut();
        state.budget_us = budget_us;
        state.budget_history.push(budget_us);
    }

    fn set_prefetch_enabled(&mut self, enabled: bool) {
        self.state.borrow_mut().prefetch = enabled;
    }
}

/// Host logic that records what it sees and runs an optional script.
#[derive(Default)]
pub struct RecordingLogic {
    pub journal: Option<Journal>,
    pub triggers: Rc<RefCell<Vec<FrameEvent>>>,
    pub previous_event_counts: Rc<RefCell<Vec<usize>>>,
    pub script: Option<Box<dyn FnMut(&mut FrameContext<'_>)>>,
}

impl FrameLogic for RecordingLogic {
    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        if let Some(journal) = &self.journal {
            journal.borrow_mut().push("logic");
        }
        self.previous_event_counts
            .borrow_mut()
            .push(ctx.previous_events.len());
        if let Some(script) = self.script.as_mut() {
            script(ctx);
        }
    }

    fn on_trigger(&mut self, event: &FrameEvent) {
        self.triggers.borrow_mut().push(*event);
    }
}

// --- Harness ---

/// Handles kept by a test after the fakes are moved into the loop.
pub struct Probes {
    pub clock: ManualClock,
    pub journal: Journal,
    pub draws: Rc<RefCell<Vec<Draw>>>,
    pub presents: Rc<Cell<u32>>,
    pub render_cost_us: Rc<Cell<u64>>,
    pub held: Rc<RefCell<Vec<Button>>>,
}

/// A config with the limiter off, so frames only run when the test moves
/// the clock.
pub fn unpaced_config() -> RuntimeConfig {
    RuntimeConfig {
        frame_limiter: false,
        ..RuntimeConfig::default()
    }
}

/// Builds the required collaborators around a fresh journal.
pub fn collaborators(config: &RuntimeConfig, clock: &ManualClock) -> (Collaborators, Probes) {
    let probes = Probes {
        clock: clock.clone(),
        journal: Journal::default(),
        draws: Rc::default(),
        presents: Rc::default(),
        render_cost_us: Rc::default(),
        held: Rc::default(),
    };
    let collaborators = Collaborators::new()
        .with_renderer(FakeRenderer {
            journal: probes.journal.clone(),
            draws: probes.draws.clone(),
            presents: probes.presents.clone(),
            cost_us: probes.render_cost_us.clone(),
            clock: clock.clone(),
        })
        .with_audio(FakeAudio {
            journal: probes.journal.clone(),
        })
        .with_input(FakeInput {
            journal: probes.journal.clone(),
            held: probes.held.clone(),
        })
        .with_physics(IntentPhysicsLane::new(config.entity_capacity));
    (collaborators, probes)
}

/// A loop on a manual clock, not yet initialized.
pub fn new_manager(config: RuntimeConfig) -> (LoopManager, ManualClock) {
    let clock = ManualClock::new();
    let manager = LoopManager::new(config, Box::new(clock.clone()));
    (manager, clock)
}

/// A started loop wired to the fakes, plus extra collaborators from `extend`.
pub fn running(
    config: RuntimeConfig,
    extend: impl FnOnce(Collaborators) -> Collaborators,
) -> (LoopManager, Probes) {
    let (mut manager, clock) = new_manager(config.clone());
    let (collaborators, probes) = collaborators(&config, &clock);
    manager.init(extend(collaborators)).unwrap();
    manager.start().unwrap();
    (manager, probes)
}

/// Runs `frames` frames, moving the clock one frame budget between them.
pub fn run_frames(manager: &mut LoopManager, clock: &ManualClock, frames: usize) {
    for _ in 0..frames {
        assert!(manager.update(), "frame was not admitted");
        clock.advance(manager.timekeeper().frame_duration_us());
    }
}
