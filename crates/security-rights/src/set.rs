//! # Right Sets
//!
//! A set of rights stored as one bit per registered ordinal.
//! Every operation is a handful of word operations and never allocates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, Sub};

use crate::error::{RightsError, RightsResult};
use crate::right::Right;

/// Maximum number of rights a registry (and a set) can hold.
pub const RIGHT_CAPACITY: usize = u64::BITS as usize;

/// A set of rights backed by a 64-bit vector.
///
/// Iteration yields ordinals in ascending order and can be restarted at will,
/// since the set is `Copy`.
///
/// # Example
///
/// ```
/// use security_rights::{standard, RightRegistry, RightSet};
///
/// let registry = RightRegistry::new();
/// let view = registry.resolve(standard::VIEW);
/// let edit = registry.resolve(standard::EDIT);
///
/// let mut set = RightSet::new();
/// set.add(&view);
/// set.add(&edit);
///
/// assert!(set.contains(&view));
/// assert_eq!(set.len(), 2);
/// assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 2]);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RightSet {
    bits: u64,
}

impl RightSet {
    /// Create a new empty set.
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    /// Create a set from its raw bit vector.
    pub const fn from_bits(bits: u64) -> Self {
        Self { bits }
    }

    /// Raw bit vector, bit `n` standing for ordinal `n`.
    pub const fn bits(&self) -> u64 {
        self.bits
    }

    /// Add a right to the set.
    ///
    /// Returns `true` if the right was not present. The illegal right has no
    /// ordinal and is never added.
    pub fn add(&mut self, right: &Right) -> bool {
        match right.ordinal() {
            Some(ordinal) => {
                let mask = 1u64 << ordinal;
                let absent = self.bits & mask == 0;
                self.bits |= mask;
                absent
            }
            None => false,
        }
    }

    /// Add a raw ordinal to the set.
    ///
    /// # Errors
    ///
    /// `CapacityOverflow` when the ordinal does not fit in the bit vector.
    pub fn insert(&mut self, ordinal: usize) -> RightsResult<bool> {
        if ordinal >= RIGHT_CAPACITY {
            return Err(RightsError::CapacityOverflow {
                ordinal,
                capacity: RIGHT_CAPACITY,
            });
        }
        let mask = 1u64 << ordinal;
        let absent = self.bits & mask == 0;
        self.bits |= mask;
        Ok(absent)
    }

    /// Remove a right from the set.
    ///
    /// Returns `true` if the right was present.
    pub fn remove(&mut self, right: &Right) -> bool {
        match right.ordinal() {
            Some(ordinal) => {
                let mask = 1u64 << ordinal;
                let present = self.bits & mask != 0;
                self.bits &= !mask;
                present
            }
            None => false,
        }
    }

    /// Check if the set contains a right.
    pub fn contains(&self, right: &Right) -> bool {
        right
            .ordinal()
            .map_or(false, |ordinal| self.contains_ordinal(ordinal))
    }

    /// Check if the set contains a raw ordinal.
    pub fn contains_ordinal(&self, ordinal: usize) -> bool {
        ordinal < RIGHT_CAPACITY && self.bits & (1u64 << ordinal) != 0
    }

    /// Rights present in either set.
    pub const fn union(&self, other: &RightSet) -> RightSet {
        RightSet::from_bits(self.bits | other.bits)
    }

    /// Rights present in both sets.
    pub const fn intersect(&self, other: &RightSet) -> RightSet {
        RightSet::from_bits(self.bits & other.bits)
    }

    /// Rights present in this set but not in `other`.
    pub const fn difference(&self, other: &RightSet) -> RightSet {
        RightSet::from_bits(self.bits & !other.bits)
    }

    /// Add every right of `other` to this set.
    ///
    /// Returns `true` if the set changed.
    pub fn add_all(&mut self, other: &RightSet) -> bool {
        let before = self.bits;
        self.bits |= other.bits;
        before != self.bits
    }

    /// Remove every right of `other` from this set.
    ///
    /// Returns `true` if the set changed.
    pub fn subtract_all(&mut self, other: &RightSet) -> bool {
        let before = self.bits;
        self.bits &= !other.bits;
        before != self.bits
    }

    /// Keep only the rights also present in `other`.
    ///
    /// Returns `true` if the set changed.
    pub fn retain_all(&mut self, other: &RightSet) -> bool {
        let before = self.bits;
        self.bits &= other.bits;
        before != self.bits
    }

    /// Check if this set contains every right of `other`.
    pub const fn contains_all(&self, other: &RightSet) -> bool {
        self.bits & other.bits == other.bits
    }

    /// Number of rights in the set.
    pub const fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Check if empty.
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Clear all rights.
    pub fn clear(&mut self) {
        self.bits = 0;
    }

    /// Iterate over the ordinals in the set, ascending.
    pub fn iter(&self) -> Ordinals {
        Ordinals { remaining: self.bits }
    }
}

impl fmt::Debug for RightSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl BitOr for RightSet {
    type Output = RightSet;

    fn bitor(self, rhs: RightSet) -> RightSet {
        self.union(&rhs)
    }
}

impl BitAnd for RightSet {
    type Output = RightSet;

    fn bitand(self, rhs: RightSet) -> RightSet {
        self.intersect(&rhs)
    }
}

impl Sub for RightSet {
    type Output = RightSet;

    fn sub(self, rhs: RightSet) -> RightSet {
        self.difference(&rhs)
    }
}

impl<'a> FromIterator<&'a Right> for RightSet {
    fn from_iter<T: IntoIterator<Item = &'a Right>>(iter: T) -> Self {
        let mut set = RightSet::new();
        for right in iter {
            set.add(right);
        }
        set
    }
}

impl FromIterator<Right> for RightSet {
    fn from_iter<T: IntoIterator<Item = Right>>(iter: T) -> Self {
        let mut set = RightSet::new();
        for right in iter {
            set.add(&right);
        }
        set
    }
}

impl IntoIterator for RightSet {
    type Item = usize;
    type IntoIter = Ordinals;

    fn into_iter(self) -> Ordinals {
        self.iter()
    }
}

impl IntoIterator for &RightSet {
    type Item = usize;
    type IntoIter = Ordinals;

    fn into_iter(self) -> Ordinals {
        self.iter()
    }
}

/// Ascending iterator over the ordinals of a [`RightSet`].
#[derive(Debug, Clone)]
pub struct Ordinals {
    remaining: u64,
}

impl Iterator for Ordinals {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let ordinal = self.remaining.trailing_zeros() as usize;
        // clear lowest set bit
        self.remaining &= self.remaining - 1;
        Some(ordinal)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.remaining.count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for Ordinals {}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(ordinals: &[usize]) -> RightSet {
        let mut set = RightSet::new();
        for &ordinal in ordinals {
            set.insert(ordinal).unwrap();
        }
        set
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set = RightSet::new();
        assert!(set.insert(0).unwrap());
        assert!(set.insert(63).unwrap());
        assert!(!set.insert(63).unwrap());

        assert!(set.contains_ordinal(0));
        assert!(set.contains_ordinal(63));
        assert!(!set.contains_ordinal(1));
        assert!(!set.contains_ordinal(64));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_insert_overflow() {
        let mut set = RightSet::new();
        let err = set.insert(64).unwrap_err();
        assert_eq!(
            err,
            RightsError::CapacityOverflow {
                ordinal: 64,
                capacity: 64
            }
        );
        assert!(set.is_empty());
    }

    #[test]
    fn test_set_algebra() {
        let a = set_of(&[1, 2, 3]);
        let b = set_of(&[3, 4]);

        assert_eq!(a.union(&b), set_of(&[1, 2, 3, 4]));
        assert_eq!(a.intersect(&b), set_of(&[3]));
        assert_eq!(a.difference(&b), set_of(&[1, 2]));
        assert_eq!(a | b, a.union(&b));
        assert_eq!(a & b, a.intersect(&b));
        assert_eq!(a - b, a.difference(&b));
    }

    #[test]
    fn test_subtract_all_reports_change() {
        let mut a = set_of(&[1, 2, 3]);
        assert!(a.subtract_all(&set_of(&[2, 9])));
        assert_eq!(a, set_of(&[1, 3]));
        assert!(!a.subtract_all(&set_of(&[9])));
    }

    #[test]
    fn test_iteration_is_ascending_and_restartable() {
        let set = set_of(&[40, 2, 17, 0]);
        let first: Vec<usize> = set.iter().collect();
        let second: Vec<usize> = set.iter().collect();
        assert_eq!(first, vec![0, 2, 17, 40]);
        assert_eq!(first, second);
        assert_eq!(set.iter().len(), 4);
    }

    #[test]
    fn test_contains_all() {
        let a = set_of(&[1, 2, 3]);
        assert!(a.contains_all(&set_of(&[1, 3])));
        assert!(!a.contains_all(&set_of(&[1, 4])));
        assert!(a.contains_all(&RightSet::new()));
    }

    #[test]
    fn test_debug_lists_ordinals() {
        assert_eq!(format!("{:?}", set_of(&[5, 1])), "{1, 5}");
    }
}
