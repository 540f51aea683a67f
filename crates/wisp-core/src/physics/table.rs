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

//! Fixed-capacity tables for entities and regions.

use super::entity::{Entity, Region, RegionKind, TriggerLogic};
use super::ids::{CollisionMask, EntityId, IdAllocator, RegionId};
use crate::math::Rect;

/// A record that can be stored in a [`SlotTable`].
pub trait Identified {
    /// Id type of the record.
    type Id: Copy + Eq + std::fmt::Debug;

    /// Returns the record's id.
    fn id(&self) -> Self::Id;
}

impl Identified for Entity {
    type Id = EntityId;

    fn id(&self) -> EntityId {
        Entity::id(self)
    }
}

impl Identified for Region {
    type Id = RegionId;

    fn id(&self) -> RegionId {
        Region::id(self)
    }
}

/// A table with a fixed number of slots, allocated once.
///
/// Freed slots are reused, ids are not.
#[derive(Debug, Clone)]
pub struct SlotTable<T> {
    slots: Vec<Option<T>>,
    ids: IdAllocator,
    len: usize,
}

/// The entity table owned by the stage pipeline.
pub type EntityTable = SlotTable<Entity>;
/// The region table owned by the stage pipeline.
pub type RegionTable = SlotTable<Region>;

impl<T: Identified> SlotTable<T> {
    /// Creates an empty table with `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            ids: IdAllocator::new(),
            len: 0,
        }
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Stores a record built from a freshly allocated raw id.
    ///
    /// Returns `None` without consuming an id when the table is full, or when
    /// the id space is exhausted.
    fn insert_with(&mut self, build: impl FnOnce(u16) -> Option<T>) -> Option<T::Id> {
        let slot = self.slots.iter().position(Option::is_none)?;
        let raw = self.ids.allocate()?;
        let record = build(raw)?;
        let id = record.id();
        self.slots[slot] = Some(record);
        self.len += 1;
        Some(id)
    }

    /// Looks a record up by id.
    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.iter().find(|r| r.id() == id)
    }

    /// Looks a record up by id for mutation.
    pub fn get_mut(&mut self, id: T::Id) -> Option<&mut T> {
        self.iter_mut().find(|r| r.id() == id)
    }

    /// Removes a record and frees its slot. The id is not handed out again.
    pub fn remove(&mut self, id: T::Id) -> Option<T> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.as_ref().is_some_and(|r| r.id() == id))?;
        self.len -= 1;
        slot.take()
    }

    /// Drops every record. Ids keep counting from where they were.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.len = 0;
    }

    /// Iterates occupied slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().flatten()
    }

    /// Iterates occupied slots in slot order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().flatten()
    }
}

impl SlotTable<Entity> {
    /// Creates an entity with default render attributes.
    ///
    /// Returns `None` if the table is full.
    pub fn spawn(
        &mut self,
        bounds: Rect,
        collision_mask: CollisionMask,
        trigger_mask: CollisionMask,
    ) -> Option<EntityId> {
        let id = self.insert_with(|raw| {
            EntityId::from_raw(raw).map(|id| Entity::new(id, bounds, collision_mask, trigger_mask))
        });
        if id.is_none() {
            log::warn!(
                "EntityTable: Cannot spawn entity, {} of {} slots in use",
                self.len(),
                self.capacity()
            );
        }
        id
    }
}

impl SlotTable<Region> {
    /// Creates a region. The mask is matched against the entity mask for `kind`.
    ///
    /// Returns `None` if the table is full.
    pub fn spawn(
        &mut self,
        bounds: Rect,
        kind: RegionKind,
        mask: CollisionMask,
        logic: TriggerLogic,
    ) -> Option<RegionId> {
        let id = self.insert_with(|raw| {
            RegionId::from_raw(raw).map(|id| Region::new(id, bounds, kind, mask, logic))
        });
        if id.is_none() {
            log::warn!(
                "RegionTable: Cannot create region, {} of {} slots in use",
                self.len(),
                self.capacity()
            );
        }
        id
    }
}
