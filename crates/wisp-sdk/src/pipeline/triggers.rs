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

use wisp_core::math::Rect;
use wisp_core::physics::{EntityId, EventList, FrameEvent, FrameEventKind, RegionId};

/// Remembers which entities were inside which trigger regions last frame.
///
/// Detection only ever reports `TriggerEnter`. This turns repeat overlaps
/// into `TriggerStay` and adds a `TriggerExit` for every pair that stopped
/// overlapping.
#[derive(Debug, Clone, Default)]
pub(crate) struct TriggerOccupancy {
    inside: Vec<(EntityId, RegionId)>,
    scratch: Vec<(EntityId, RegionId)>,
}

impl TriggerOccupancy {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            inside: Vec::with_capacity(capacity),
            scratch: Vec::with_capacity(capacity),
        }
    }

    /// Rewrites this frame's trigger events in place and appends exits.
    pub(crate) fn update(&mut self, events: &mut EventList) {
        self.scratch.clear();
        for event in events.as_mut_slice() {
            let Some(region) = event.region else {
                continue;
            };
            if event.kind != FrameEventKind::TriggerEnter {
                continue;
            }
            let pair = (event.entity, region);
            if self.inside.contains(&pair) {
                event.kind = FrameEventKind::TriggerStay;
            }
            if !self.scratch.contains(&pair) {
                self.scratch.push(pair);
            }
        }

        // A full list may have dropped a pair's enter, so a missing pair only
        // counts as an exit when detection reported everything.
        let detection_complete = events.dropped() == 0;
        for &(entity, region) in &self.inside {
            if self.scratch.contains(&(entity, region)) {
                continue;
            }
            let exited = detection_complete
                && events.push(FrameEvent::region(
                    FrameEventKind::TriggerExit,
                    entity,
                    region,
                    Rect::default(),
                ));
            if !exited {
                self.scratch.push((entity, region));
            }
        }

        std::mem::swap(&mut self.inside, &mut self.scratch);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inside.len()
    }

    pub(crate) fn clear(&mut self) {
        self.inside.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enter(entity: u16, region: u16) -> FrameEvent {
        FrameEvent::region(
            FrameEventKind::TriggerEnter,
            EntityId::from_raw(entity).unwrap(),
            RegionId::from_raw(region).unwrap(),
            Rect::new(0, 0, 1, 1),
        )
    }

    fn kinds(events: &EventList) -> Vec<FrameEventKind> {
        events.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_enter_stay_exit_sequence() {
        let mut occupancy = TriggerOccupancy::with_capacity(4);
        let mut events = EventList::with_capacity(8);

        events.push(enter(1, 1));
        occupancy.update(&mut events);
        assert_eq!(kinds(&events), vec![FrameEventKind::TriggerEnter]);

        events.clear();
        events.push(enter(1, 1));
        occupancy.update(&mut events);
        assert_eq!(kinds(&events), vec![FrameEventKind::TriggerStay]);

        events.clear();
        occupancy.update(&mut events);
        assert_eq!(kinds(&events), vec![FrameEventKind::TriggerExit]);
        assert_eq!(occupancy.len(), 0);

        events.clear();
        occupancy.update(&mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn test_collisions_are_left_alone() {
        let mut occupancy = TriggerOccupancy::with_capacity(4);
        let mut events = EventList::with_capacity(8);
        let a = EntityId::from_raw(1).unwrap();
        let b = EntityId::from_raw(2).unwrap();
        events.push(FrameEvent::collision(a, b, Rect::new(0, 0, 1, 1)));
        occupancy.update(&mut events);
        occupancy.update(&mut events);
        assert_eq!(kinds(&events), vec![FrameEventKind::Collision]);
        assert_eq!(occupancy.len(), 0);
    }

    #[test]
    fn test_pair_survives_a_frame_with_dropped_events() {
        let mut occupancy = TriggerOccupancy::with_capacity(4);
        let mut events = EventList::with_capacity(1);
        events.push(enter(1, 1));
        occupancy.update(&mut events);

        // The list is full before the trigger overlap is reported.
        events.clear();
        let a = EntityId::from_raw(2).unwrap();
        let b = EntityId::from_raw(3).unwrap();
        events.push(FrameEvent::collision(a, b, Rect::new(0, 0, 1, 1)));
        events.push(enter(1, 1));
        occupancy.update(&mut events);
        assert_eq!(kinds(&events), vec![FrameEventKind::Collision]);
        assert_eq!(occupancy.len(), 1);

        events.clear();
        events.push(enter(1, 1));
        occupancy.update(&mut events);
        assert_eq!(kinds(&events), vec![FrameEventKind::TriggerStay]);
    }

    #[test]
    fn test_exit_is_retried_when_list_is_full() {
        let mut occupancy = TriggerOccupancy::with_capacity(4);
        let mut events = EventList::with_capacity(2);
        events.push(enter(1, 1));
        occupancy.update(&mut events);

        // Entity 1 has left, but the list is already full.
        events.clear();
        let a = EntityId::from_raw(3).unwrap();
        let b = EntityId::from_raw(4).unwrap();
        events.push(FrameEvent::collision(a, b, Rect::new(0, 0, 1, 1)));
        events.push(enter(2, 1));
        occupancy.update(&mut events);
        assert_eq!(
            kinds(&events),
            vec![FrameEventKind::Collision, FrameEventKind::TriggerEnter]
        );
        assert_eq!(occupancy.len(), 2);

        events.clear();
        events.push(enter(2, 1));
        occupancy.update(&mut events);
        assert_eq!(
            kinds(&events),
            vec![FrameEventKind::TriggerStay, FrameEventKind::TriggerExit]
        );
        assert_eq!(events.as_slice()[1].entity, EntityId::from_raw(1).unwrap());
        assert_eq!(occupancy.len(), 1);
    }

    #[test]
    fn test_pairs_are_tracked_independently() {
        let mut occupancy = TriggerOccupancy::with_capacity(4);
        let mut events = EventList::with_capacity(8);
        events.push(enter(1, 1));
        events.push(enter(2, 1));
        occupancy.update(&mut events);

        events.clear();
        events.push(enter(2, 1));
        occupancy.update(&mut events);
        let exit = events.iter().find(|e| e.kind == FrameEventKind::TriggerExit).unwrap();
        assert_eq!(exit.entity, EntityId::from_raw(1).unwrap());
        assert_eq!(events.as_slice()[0].kind, FrameEventKind::TriggerStay);
    }
}
