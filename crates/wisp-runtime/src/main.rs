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

// Wisp Runtime
// Headless host: null devices, a tiny scene, a fixed number of frames.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Context, Result};
use wisp_sdk::prelude::*;

const DEFAULT_FRAMES: u64 = 240;

/// Renderer that only counts what it is asked to draw.
#[derive(Default)]
struct NullRenderer {
    draws: Rc<Cell<u64>>,
}

impl Renderer for NullRenderer {
    fn clear(&mut self) {}

    fn draw_entity(&mut self, _entity: EntityId, _sprite: u16, _x: i32, _y: i32, _frame: u8) {
        self.draws.set(self.draws.get() + 1);
    }

    fn present(&mut self) {}
}

struct NullAudio;

impl AudioAdapter for NullAudio {
    fn update(&mut self) {}
}

struct NullInput;

impl InputAdapter for NullInput {
    fn update(&mut self) {}

    fn is_pressed(&self, _button: Button) -> bool {
        false
    }
}

/// Streamer with a fixed memory footprint that just records the budget it is given.
struct NullStreamer {
    budget_us: u64,
    prefetch: bool,
}

impl AssetStreamer for NullStreamer {
    fn report_memory_pressure(&self) -> f32 {
        0.25
    }

    fn work_budget_us(&self) -> u64 {
        self.budget_us
    }

    fn set_work_budget_us(&mut self, budget_us: u64) {
        self.budget_us = budget_us;
    }

    fn set_prefetch_enabled(&mut self, enabled: bool) {
        if enabled != self.prefetch {
            log::debug!("NullStreamer: prefetch {}", if enabled { "on" } else { "off" });
        }
        self.prefetch = enabled;
    }
}

/// Stops the player in front of walls, turns the enemy around at the arena
/// edge and reports trigger traffic.
struct DemoLogic {
    player: EntityId,
    enemy: EntityId,
}

/// Returns `true` if `entity`'s next step would touch a collision region it
/// reacts to. Regions only report overlaps, so walls are enforced here.
fn next_step_hits_wall<'a>(
    entity: &Entity,
    mut regions: impl Iterator<Item = &'a Region>,
) -> bool {
    let next = entity.bounds.translated(entity.velocity);
    regions.any(|r| {
        r.kind == RegionKind::Collision && r.accepts(entity) && next.intersects(&r.bounds)
    })
}

impl FrameLogic for DemoLogic {
    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        if let Some(enemy) = ctx.entities.get_mut(self.enemy) {
            if enemy.bounds.right >= 160 || enemy.bounds.left <= 0 {
                let dx = -enemy.velocity.dx;
                enemy.set_velocity(dx, 0);
            }
        }
        if let Some(player) = ctx.entities.get_mut(self.player) {
            if !player.velocity.is_zero() && next_step_hits_wall(player, ctx.regions.iter()) {
                log::info!("Frame {}: player stopped at the wall", ctx.frame);
                player.set_velocity(0, 0);
            }
        }
    }

    fn on_trigger(&mut self, event: &FrameEvent) {
        log::info!("Trigger {:?}: {:?} in {:?}", event.kind, event.entity, event.region);
    }
}

/// Spawns the demo scene and returns the player and enemy ids.
fn spawn_scene(manager: &mut LoopManager) -> Result<(EntityId, EntityId)> {
    let player = manager
        .spawn_entity(
            Rect::from_xywh(8, 40, 12, 12),
            CollisionMask::PLAYER,
            CollisionMask::PLAYER,
        )
        .context("Entity table is full")?;
    if let Some(e) = manager.entity_mut(player) {
        e.set_velocity(2, 0).set_sprite(1, 2);
    }
    let enemy = manager
        .spawn_entity(
            Rect::from_xywh(40, 80, 10, 10),
            CollisionMask::ENEMY,
            CollisionMask::ENEMY,
        )
        .context("Entity table is full")?;
    if let Some(e) = manager.entity_mut(enemy) {
        e.set_velocity(3, 0).set_sprite(2, 4);
    }
    manager
        .spawn_region(
            Rect::from_xywh(120, 0, 8, 128),
            RegionKind::Collision,
            CollisionMask::PLAYER,
            TriggerLogic::OnEnter,
        )
        .context("Region table is full")?;
    manager
        .spawn_region(
            Rect::from_xywh(70, 70, 20, 30),
            RegionKind::Trigger,
            CollisionMask::ENEMY,
            TriggerLogic::OnOverlap,
        )
        .context("Region table is full")?;
    Ok((player, enemy))
}

/// Null devices plus the demo logic. Returns the shared draw counter.
fn demo_collaborators(
    config: &RuntimeConfig,
    player: EntityId,
    enemy: EntityId,
) -> (Collaborators, Rc<Cell<u64>>) {
    let renderer = NullRenderer::default();
    let draws = renderer.draws.clone();
    let collaborators = Collaborators::new()
        .with_renderer(renderer)
        .with_audio(NullAudio)
        .with_input(NullInput)
        .with_physics(IntentPhysicsLane::new(config.entity_capacity))
        .with_streamer(NullStreamer {
            budget_us: 0,
            prefetch: false,
        })
        .with_policy(AdaptiveLoadingPolicy::new())
        .with_logic(DemoLogic { player, enemy });
    (collaborators, draws)
}

fn load_config(path: Option<&str>) -> Result<RuntimeConfig> {
    match path {
        Some(path) => RuntimeConfig::from_file(path)
            .with_context(|| format!("Failed to load runtime config from {path}")),
        None => Ok(RuntimeConfig::default()),
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let config = load_config(args.get(1).map(String::as_str))?;
    let frames = match args.get(2) {
        Some(n) => n
            .parse::<u64>()
            .with_context(|| format!("Invalid frame count '{n}'"))?,
        None => DEFAULT_FRAMES,
    };

    let interval = u64::from(config.telemetry_interval_frames);
    let mut manager = LoopManager::with_system_clock(config.clone())
        .with_telemetry(TelemetryService::new(interval))
        .context("Failed to register loop metrics")?;

    let (player, enemy) = spawn_scene(&mut manager)?;
    let (collaborators, draws) = demo_collaborators(&config, player, enemy);
    manager.init(collaborators)?;
    manager.start()?;

    log::info!("Running {frames} frames");
    while manager.frame_count() < frames {
        if !manager.update() {
            std::thread::yield_now();
        }
    }
    manager.stop();

    manager.log_performance_report();
    println!("Frames: {}, draws: {}", manager.frame_count(), draws.get());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_stops_before_entering_wall() {
        let config = RuntimeConfig {
            frame_limiter: false,
            ..RuntimeConfig::default()
        };
        let clock = ManualClock::new();
        let mut manager = LoopManager::new(config.clone(), Box::new(clock.clone()));
        let (player, enemy) = spawn_scene(&mut manager).unwrap();
        let wall = manager
            .regions()
            .iter()
            .find(|r| r.kind == RegionKind::Collision)
            .map(|r| r.bounds)
            .unwrap();
        let (collaborators, draws) = demo_collaborators(&config, player, enemy);
        manager.init(collaborators).unwrap();
        manager.start().unwrap();

        for _ in 0..120 {
            assert!(manager.update());
            let bounds = manager.entity(player).unwrap().bounds;
            assert!(!bounds.intersects(&wall), "player entered the wall at {bounds:?}");
            assert!(manager
                .events()
                .iter()
                .all(|e| !(e.entity == player && e.region.is_some())));
            clock.advance(manager.timekeeper().frame_duration_us());
        }

        let stopped = manager.entity(player).unwrap();
        assert!(stopped.velocity.is_zero());
        assert_eq!(stopped.bounds.right, wall.left - 2);
        assert_eq!(draws.get(), 240);
    }
}
