//! Entry event-type bits.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A set of entry event-type bits.
///
/// Every event carries exactly the bits the member raised, and every handler
/// declares the bits it wants. The values are shared with cluster members and
/// are combined freely; no combination is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EntryEventType(i32);

impl EntryEventType {
    /// The empty mask. An event of this type is never dispatched.
    pub const NOTHING: Self = Self(0);
    /// An entry was added.
    pub const ADDED: Self = Self(1);
    /// An entry was removed.
    pub const REMOVED: Self = Self(1 << 1);
    /// An entry's value was replaced.
    pub const UPDATED: Self = Self(1 << 2);
    /// An entry was evicted.
    pub const EVICTED: Self = Self(1 << 3);
    /// An entry expired.
    pub const EXPIRED: Self = Self(1 << 4);
    /// Every entry of the map was evicted.
    pub const EVICT_ALL: Self = Self(1 << 5);
    /// The map was cleared.
    pub const CLEAR_ALL: Self = Self(1 << 6);
    /// An entry was merged after a split-brain heal.
    pub const MERGED: Self = Self(1 << 7);
    /// A near-cache invalidation.
    pub const INVALIDATION: Self = Self(1 << 8);
    /// An entry was loaded from a map store.
    pub const LOADED: Self = Self(1 << 9);

    const NAMES: [(Self, &'static str); 10] = [
        (Self::ADDED, "ADDED"),
        (Self::REMOVED, "REMOVED"),
        (Self::UPDATED, "UPDATED"),
        (Self::EVICTED, "EVICTED"),
        (Self::EXPIRED, "EXPIRED"),
        (Self::EVICT_ALL, "EVICT_ALL"),
        (Self::CLEAR_ALL, "CLEAR_ALL"),
        (Self::MERGED, "MERGED"),
        (Self::INVALIDATION, "INVALIDATION"),
        (Self::LOADED, "LOADED"),
    ];

    /// Wraps raw bits as received from the wire.
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    pub const fn bits(self) -> i32 {
        self.0
    }

    /// Returns `true` for the empty mask.
    pub const fn is_nothing(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of both masks.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for EntryEventType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for EntryEventType {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Display for EntryEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nothing() {
            return f.write_str("NOTHING");
        }
        let mut remaining = self.0;
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                remaining &= !flag.0;
                first = false;
            }
        }
        if remaining != 0 {
            if !first {
                f.write_str("|")?;
            }
            write!(f, "{remaining:#x}")?;
        }
        Ok(())
    }
}
