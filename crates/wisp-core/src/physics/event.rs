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

//! Collision and trigger events produced during a frame.

use super::ids::{EntityId, RegionId};
use crate::math::Rect;

/// What kind of overlap an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameEventKind {
    /// Two entities, or an entity and a collision region, overlap.
    Collision,
    /// An entity started overlapping a trigger region.
    TriggerEnter,
    /// An entity is still inside a trigger region.
    TriggerStay,
    /// An entity left a trigger region.
    TriggerExit,
}

impl FrameEventKind {
    /// Returns `true` for the three trigger kinds.
    pub fn is_trigger(self) -> bool {
        !matches!(self, FrameEventKind::Collision)
    }
}

/// A single overlap observed this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEvent {
    /// Event kind.
    pub kind: FrameEventKind,
    /// The entity involved.
    pub entity: EntityId,
    /// The second entity of an entity-entity collision.
    pub other: Option<EntityId>,
    /// The region of an entity-region event.
    pub region: Option<RegionId>,
    /// Shared area. Empty for exit events.
    pub overlap: Rect,
}

impl FrameEvent {
    /// An entity-entity collision.
    pub fn collision(entity: EntityId, other: EntityId, overlap: Rect) -> Self {
        Self {
            kind: FrameEventKind::Collision,
            entity,
            other: Some(other),
            region: None,
            overlap,
        }
    }

    /// An entity-region event.
    pub fn region(kind: FrameEventKind, entity: EntityId, region: RegionId, overlap: Rect) -> Self {
        Self {
            kind,
            entity,
            other: None,
            region: Some(region),
            overlap,
        }
    }

    /// Returns `true` if `id` is one of the entities in the event.
    pub fn involves(&self, id: EntityId) -> bool {
        self.entity == id || self.other == Some(id)
    }
}

/// Bounded event list, cleared at the start of every frame.
#[derive(Debug, Clone)]
pub struct EventList {
    events: Vec<FrameEvent>,
    capacity: usize,
    dropped: u32,
}

impl EventList {
    /// Creates an empty list that holds at most `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Appends an event. Returns `false` and counts a drop if the list is full.
    pub fn push(&mut self, event: FrameEvent) -> bool {
        if self.events.len() >= self.capacity {
            if self.dropped == 0 {
                log::warn!(
                    "EventList: Capacity of {} reached, dropping further events this frame",
                    self.capacity
                );
            }
            self.dropped += 1;
            return false;
        }
        self.events.push(event);
        true
    }

    /// Removes every event and resets the drop counter.
    pub fn clear(&mut self) {
        self.events.clear();
        self.dropped = 0;
    }

    /// Events dropped since the last clear.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if there are no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The events in emission order.
    pub fn as_slice(&self) -> &[FrameEvent] {
        &self.events
    }

    /// The events in emission order, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [FrameEvent] {
        &mut self.events
    }

    /// Iterates the events in emission order.
    pub fn iter(&self) -> std::slice::Iter<'_, FrameEvent> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u16) -> EntityId {
        EntityId::from_raw(raw).unwrap()
    }

    #[test]
    fn test_push_drops_past_capacity() {
        let mut list = EventList::with_capacity(1);
        let e = FrameEvent::collision(id(1), id(2), Rect::default());
        assert!(list.push(e));
        assert!(!list.push(e));
        assert!(!list.push(e));
        assert_eq!(list.len(), 1);
        assert_eq!(list.dropped(), 2);

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.dropped(), 0);
    }

    #[test]
    fn test_involves() {
        let e = FrameEvent::collision(id(1), id(2), Rect::default());
        assert!(e.involves(id(1)));
        assert!(e.involves(id(2)));
        assert!(!e.involves(id(3)));
        assert!(!e.kind.is_trigger());

        let r = FrameEvent::region(
            FrameEventKind::TriggerEnter,
            id(4),
            RegionId::from_raw(1).unwrap(),
            Rect::default(),
        );
        assert!(r.kind.is_trigger());
        assert_eq!(r.other, None);
    }
}
