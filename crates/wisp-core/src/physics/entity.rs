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

//! Entity and region records stored in the simulation tables.

use super::event::FrameEventKind;
use super::ids::{CollisionMask, EntityId, RegionId};
use crate::math::{Rect, Velocity};

/// Depth given to newly created entities. Higher values are drawn first.
pub const DEFAULT_DEPTH: u8 = 6;

/// A movable simulation object.
///
/// Everything except the id may be changed by application logic between
/// frames. The physics stages only touch `bounds` and `velocity`.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: EntityId,
    /// Current bounding box.
    pub bounds: Rect,
    /// Displacement proposed each frame.
    pub velocity: Velocity,
    /// Categories this entity collides with.
    pub collision_mask: CollisionMask,
    /// Categories of trigger regions this entity can set off.
    pub trigger_mask: CollisionMask,
    /// Inactive entities are skipped by every stage.
    pub active: bool,
    /// Kinematic entities are moved by the application only and never resolved against.
    pub kinematic: bool,
    /// Sprite to draw, if any.
    pub sprite: Option<u16>,
    /// Draw order. Higher values are drawn first.
    pub depth: u8,
    /// Animation frame passed to the renderer.
    pub frame: u8,
    /// Opaque slot for the application.
    pub user_data: u32,
}

impl Entity {
    pub(crate) fn new(
        id: EntityId,
        bounds: Rect,
        collision_mask: CollisionMask,
        trigger_mask: CollisionMask,
    ) -> Self {
        Self {
            id,
            bounds,
            velocity: Velocity::ZERO,
            collision_mask,
            trigger_mask,
            active: true,
            kinematic: false,
            sprite: None,
            depth: DEFAULT_DEPTH,
            frame: 0,
            user_data: 0,
        }
    }

    /// The entity's id.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Sets the per-frame velocity.
    pub fn set_velocity(&mut self, dx: i32, dy: i32) -> &mut Self {
        self.velocity = Velocity::new(dx, dy);
        self
    }

    /// Sets the sprite and its draw depth.
    pub fn set_sprite(&mut self, sprite: u16, depth: u8) -> &mut Self {
        self.sprite = Some(sprite);
        self.depth = depth;
        self
    }

    /// Sets the draw depth without touching the sprite.
    pub fn set_depth(&mut self, depth: u8) -> &mut Self {
        self.depth = depth;
        self
    }

    /// Marks the entity as kinematic or not.
    pub fn set_kinematic(&mut self, kinematic: bool) -> &mut Self {
        self.kinematic = kinematic;
        self
    }

    /// Enables or disables the entity.
    pub fn set_active(&mut self, active: bool) -> &mut Self {
        self.active = active;
        self
    }

    /// Returns `true` if the physics stages predict and resolve this entity.
    pub fn is_simulated(&self) -> bool {
        self.active && !self.kinematic
    }
}

/// How a region interacts with entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    /// Solid volume. Overlaps are reported as collisions.
    Collision,
    /// Sensor volume. Overlaps are reported as trigger events.
    Trigger,
}

/// Which trigger transitions reach the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriggerLogic {
    /// Only the first frame of an overlap.
    #[default]
    OnEnter,
    /// Only the frame an overlap ends.
    OnExit,
    /// Every frame an entity is inside, including the first.
    WhileInside,
    /// Every transition: enter, stay and exit.
    OnOverlap,
}

impl TriggerLogic {
    /// Returns `true` if events of `kind` are handed to the application.
    pub fn dispatches(self, kind: FrameEventKind) -> bool {
        matches!(
            (self, kind),
            (TriggerLogic::OnEnter, FrameEventKind::TriggerEnter)
                | (TriggerLogic::OnExit, FrameEventKind::TriggerExit)
                | (
                    TriggerLogic::WhileInside,
                    FrameEventKind::TriggerEnter | FrameEventKind::TriggerStay
                )
                | (
                    TriggerLogic::OnOverlap,
                    FrameEventKind::TriggerEnter
                        | FrameEventKind::TriggerStay
                        | FrameEventKind::TriggerExit
                )
        )
    }
}

/// A static spatial volume.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    id: RegionId,
    /// Extent of the region.
    pub bounds: Rect,
    /// Collision or trigger.
    pub kind: RegionKind,
    /// Entity categories this region reacts to.
    pub mask: CollisionMask,
    /// Which trigger transitions are dispatched.
    pub logic: TriggerLogic,
    /// Inactive regions are ignored.
    pub active: bool,
}

impl Region {
    pub(crate) fn new(
        id: RegionId,
        bounds: Rect,
        kind: RegionKind,
        mask: CollisionMask,
        logic: TriggerLogic,
    ) -> Self {
        Self {
            id,
            bounds,
            kind,
            mask,
            logic,
            active: true,
        }
    }

    /// The region's id.
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Returns `true` if `entity` should be tested against this region,
    /// using the entity mask that matches the region kind.
    pub fn accepts(&self, entity: &Entity) -> bool {
        let entity_mask = match self.kind {
            RegionKind::Collision => entity.collision_mask,
            RegionKind::Trigger => entity.trigger_mask,
        };
        self.active && self.mask.intersects(entity_mask)
    }
}
