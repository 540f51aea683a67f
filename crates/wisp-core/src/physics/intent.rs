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

//! Per-frame movement proposals.

use super::ids::{CollisionMask, EntityId};
use crate::math::Rect;

/// A proposed move for one entity during the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intent {
    /// The entity that wants to move.
    pub entity: EntityId,
    /// Box the entity occupies now.
    pub current: Rect,
    /// Box the entity would occupy after applying its velocity.
    pub projected: Rect,
    /// Collision mask captured at prediction time.
    pub mask: CollisionMask,
    /// Cleared by conflict resolution when the move is rejected.
    pub valid: bool,
}

/// Bounded list of intents, rebuilt every frame.
#[derive(Debug, Clone)]
pub struct IntentQueue {
    intents: Vec<Intent>,
    capacity: usize,
}

impl IntentQueue {
    /// Creates an empty queue that holds at most `capacity` intents.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            intents: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of intents.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of queued intents.
    pub fn len(&self) -> usize {
        self.intents.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// Drops every intent.
    pub fn clear(&mut self) {
        self.intents.clear();
    }

    /// Queues a valid intent. Returns `false` if the queue is full.
    pub fn push(
        &mut self,
        entity: EntityId,
        current: Rect,
        projected: Rect,
        mask: CollisionMask,
    ) -> bool {
        if self.intents.len() >= self.capacity {
            return false;
        }
        self.intents.push(Intent {
            entity,
            current,
            projected,
            mask,
            valid: true,
        });
        true
    }

    /// Finds the intent of `entity`.
    pub fn get(&self, entity: EntityId) -> Option<&Intent> {
        self.intents.iter().find(|i| i.entity == entity)
    }

    /// All queued intents.
    pub fn as_slice(&self) -> &[Intent] {
        &self.intents
    }

    /// All queued intents, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [Intent] {
        &mut self.intents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_respects_capacity() {
        let mut q = IntentQueue::with_capacity(1);
        let id = EntityId::from_raw(1).unwrap();
        let r = Rect::from_xywh(0, 0, 1, 1);
        assert!(q.push(id, r, r, CollisionMask::ALL));
        assert!(!q.push(id, r, r, CollisionMask::ALL));
        assert_eq!(q.len(), 1);
        assert!(q.get(id).unwrap().valid);

        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.capacity(), 1);
    }
}
