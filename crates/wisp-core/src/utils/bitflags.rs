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

//! A macro that declares a category mask over a fixed set of named bits.

/// Declares a `Copy` mask type with named constants and the usual set operators.
///
/// The generated type keeps unknown bits as-is so masks coming from a host
/// application round-trip unchanged.
#[macro_export]
#[doc(hidden)]
macro_rules! wisp_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            /// A mask with no category set.
            pub const EMPTY: Self = Self { bits: 0 };

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// Builds a mask from raw bits, keeping unknown bits.
            pub const fn from_bits(bits: $ty) -> Self {
                Self { bits }
            }

            /// Returns the raw bits.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// Returns `true` if no bit is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// Returns `true` if every bit of `other` is set in `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// Returns `true` if `self` and `other` share at least one bit.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// Sets the bits of `other`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Clears the bits of `other`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }
        }

        impl core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, other: Self) -> Self {
                Self { bits: self.bits & other.bits }
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.bits |= other.bits;
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut rest = self.bits;
                let mut first = true;
                write!(f, "{}(", stringify!($name))?;
                $(
                    if ($flag_value != 0) && (rest & $flag_value) == $flag_value {
                        if !first {
                            write!(f, " | ")?;
                        }
                        write!(f, "{}", stringify!($flag_name))?;
                        rest &= !$flag_value;
                        first = false;
                    }
                )*
                if rest != 0 {
                    if !first {
                        write!(f, " | ")?;
                    }
                    write!(f, "{:#x}", rest)?;
                    first = false;
                }
                if first {
                    write!(f, "EMPTY")?;
                }
                write!(f, ")")
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::wisp_bitflags;

    wisp_bitflags! {
        /// Flags used only by these tests.
        pub struct Layers: u8 {
            const GROUND = 1 << 0;
            const AIR = 1 << 1;
            const WATER = 1 << 2;
        }
    }

    #[test]
    fn test_intersects_and_contains() {
        let both = Layers::GROUND | Layers::AIR;
        assert!(both.intersects(Layers::AIR));
        assert!(!both.intersects(Layers::WATER));
        assert!(both.contains(Layers::GROUND));
        assert!(!Layers::GROUND.contains(both));
    }

    #[test]
    fn test_insert_remove() {
        let mut m = Layers::EMPTY;
        assert!(m.is_empty());
        m.insert(Layers::WATER);
        assert_eq!(m.bits(), 0b100);
        m.remove(Layers::WATER);
        assert!(m.is_empty());
    }

    #[test]
    fn test_debug_lists_named_and_unknown_bits() {
        let m = Layers::GROUND | Layers::from_bits(0x80);
        assert_eq!(format!("{m:?}"), "Layers(GROUND | 0x80)");
        assert_eq!(format!("{:?}", Layers::EMPTY), "Layers(EMPTY)");
    }
}
