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

use super::{ApplyStats, PhysicsLane};
use std::any::Any;
use wisp_core::math::{Rect, Velocity};
use wisp_core::physics::{
    Entity, EntityTable, EventList, FrameEvent, FrameEventKind, Intent, IntentQueue, RegionKind,
    RegionTable,
};

/// The default lane: naive all-pairs resolution over a bounded intent table.
///
/// Resolution is order independent. Every entity whose projected box overlaps
/// another projected box with a matching collision mask is rejected, not just
/// one side of the pair.
#[derive(Debug, Clone)]
pub struct IntentPhysicsLane {
    intents: IntentQueue,
}

impl IntentPhysicsLane {
    /// Creates a lane whose intent table holds `capacity` entries. Use the
    /// entity table capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            intents: IntentQueue::with_capacity(capacity),
        }
    }

    /// Box used for overlap tests: the projected box for entities with an
    /// intent, the current box otherwise.
    fn effective_bounds(&self, entity: &Entity) -> Rect {
        self.intents
            .get(entity.id())
            .map_or(entity.bounds, |intent| intent.projected)
    }
}

impl PhysicsLane for IntentPhysicsLane {
    fn strategy_name(&self) -> &'static str {
        "IntentPhysics"
    }

    fn predict(&mut self, entities: &EntityTable) {
        self.intents.clear();
        for entity in entities.iter().filter(|e| e.is_simulated()) {
            let projected = entity.bounds.translated(entity.velocity);
            if !self
                .intents
                .push(entity.id(), entity.bounds, projected, entity.collision_mask)
            {
                log::warn!(
                    "IntentPhysicsLane: Intent table full ({}), {:?} will not move this frame",
                    self.intents.capacity(),
                    entity.id()
                );
            }
        }
    }

    fn detect(&mut self, entities: &EntityTable, regions: &RegionTable, events: &mut EventList) {
        // Entity against entity.
        for (i, a) in entities.iter().enumerate().filter(|(_, e)| e.active) {
            let box_a = self.effective_bounds(a);
            for b in entities.iter().skip(i + 1).filter(|e| e.active) {
                if !a.collision_mask.intersects(b.collision_mask) {
                    continue;
                }
                if let Some(overlap) = box_a.overlap(&self.effective_bounds(b)) {
                    events.push(FrameEvent::collision(a.id(), b.id(), overlap));
                }
            }
        }

        // Entity against region.
        for entity in entities.iter().filter(|e| e.active) {
            let bounds = self.effective_bounds(entity);
            for region in regions.iter().filter(|r| r.accepts(entity)) {
                if let Some(overlap) = bounds.overlap(&region.bounds) {
                    let kind = match region.kind {
                        RegionKind::Collision => FrameEventKind::Collision,
                        RegionKind::Trigger => FrameEventKind::TriggerEnter,
                    };
                    events.push(FrameEvent::region(kind, entity.id(), region.id(), overlap));
                }
            }
        }
    }

    fn resolve(&mut self) {
        let intents = self.intents.as_mut_slice();
        for i in 0..intents.len() {
            for j in (i + 1)..intents.len() {
                let conflict = intents[i].mask.intersects(intents[j].mask)
                    && intents[i].projected.intersects(&intents[j].projected);
                if conflict {
                    intents[i].valid = false;
                    intents[j].valid = false;
                }
            }
        }
    }

    fn apply(&mut self, entities: &mut EntityTable) -> ApplyStats {
        let mut stats = ApplyStats::default();
        for intent in self.intents.as_slice() {
            let Some(entity) = entities.get_mut(intent.entity) else {
                continue;
            };
            if intent.valid {
                entity.bounds = intent.projected;
                stats.moved += 1;
            } else {
                entity.velocity = Velocity::ZERO;
                stats.blocked += 1;
            }
        }
        stats
    }

    fn intents(&self) -> &[Intent] {
        self.intents.as_slice()
    }

    fn capacity(&self) -> usize {
        self.intents.capacity()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
