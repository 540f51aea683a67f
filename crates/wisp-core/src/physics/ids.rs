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

//! Identifiers and category masks for simulated objects.

use crate::wisp_bitflags;
use std::fmt;

/// Raw value reserved as the "no such object" marker inside the tables.
pub const RESERVED_ID: u16 = 0xFFFF;

macro_rules! define_id {
    ($(#[$attr:meta])* $name:ident, $prefix:literal) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u16);

        impl $name {
            /// Wraps a raw id, rejecting `0` and the reserved marker.
            pub const fn from_raw(raw: u16) -> Option<Self> {
                if raw == 0 || raw == RESERVED_ID {
                    None
                } else {
                    Some(Self(raw))
                }
            }

            /// Returns the raw id.
            pub const fn raw(self) -> u16 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of an [`Entity`](super::Entity). Never `0` and never [`RESERVED_ID`].
    EntityId,
    "Entity"
);

define_id!(
    /// Identifier of a [`Region`](super::Region). Never `0` and never [`RESERVED_ID`].
    RegionId,
    "Region"
);

/// Hands out monotonically increasing raw ids for one session.
///
/// Ids start at `1` and are never reused. Once the counter reaches
/// [`RESERVED_ID`] the allocator is exhausted.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u16,
}

impl IdAllocator {
    /// Creates an allocator whose first id is `1`.
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns the next id, or `None` once the id space is used up.
    pub fn allocate(&mut self) -> Option<u16> {
        if self.next == RESERVED_ID {
            return None;
        }
        let id = self.next;
        self.next += 1;
        Some(id)
    }

    /// The id the next call to [`allocate`](Self::allocate) would return.
    pub fn peek(&self) -> Option<u16> {
        (self.next != RESERVED_ID).then_some(self.next)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

wisp_bitflags! {
    /// Categories an entity belongs to or reacts to.
    ///
    /// Collision and trigger filtering only consider the low four bits by
    /// default, but any bit may be used by an application.
    pub struct CollisionMask: u8 {
        /// The player character.
        const PLAYER = 0x01;
        /// Hostile actors.
        const ENEMY = 0x02;
        /// Bullets and other short-lived movers.
        const PROJECTILE = 0x04;
        /// Pick-ups.
        const ITEM = 0x08;
        /// Every built-in category.
        const ALL = 0x0F;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_rejects_reserved_values() {
        assert!(EntityId::from_raw(0).is_none());
        assert!(EntityId::from_raw(RESERVED_ID).is_none());
        assert_eq!(EntityId::from_raw(7).map(|id| id.raw()), Some(7));
        assert!(RegionId::from_raw(RESERVED_ID).is_none());
    }

    #[test]
    fn test_allocator_is_monotonic_and_exhausts() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(), Some(1));
        assert_eq!(ids.allocate(), Some(2));

        let mut ids = IdAllocator { next: RESERVED_ID - 1 };
        assert_eq!(ids.allocate(), Some(RESERVED_ID - 1));
        assert_eq!(ids.peek(), None);
        assert_eq!(ids.allocate(), None);
        assert_eq!(ids.allocate(), None);
    }

    #[test]
    fn test_mask_all_covers_categories() {
        for m in [
            CollisionMask::PLAYER,
            CollisionMask::ENEMY,
            CollisionMask::PROJECTILE,
            CollisionMask::ITEM,
        ] {
            assert!(CollisionMask::ALL.contains(m));
        }
        assert!(!CollisionMask::PLAYER.intersects(CollisionMask::ENEMY));
    }

    #[test]
    fn test_id_formatting() {
        let id = EntityId::from_raw(3).unwrap();
        assert_eq!(format!("{id:?}"), "Entity#3");
        assert_eq!(id.to_string(), "3");
    }
}
