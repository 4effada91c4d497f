//! Observation buffer: fixed-capacity slots with lazy growth.
//!
//! Entries are logically ordered by timestamp ascending when walked from
//! `(index + 1) % cardinality` (oldest) wrapping around to `index`
//! (newest). Uninitialized slots have `timestamp == 0` and are skipped by
//! the search. Old entries are silently overwritten once the buffer wraps,
//! which bounds history depth.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::math::Ray;

/// A single stored (timestamp, yield index) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// UNIX timestamp of the observation, in seconds; zero marks an
    /// uninitialized slot
    pub timestamp: u64,

    /// Cumulative yield index at `timestamp`
    pub index_value: Ray,
}

impl Observation {
    /// An empty slot
    pub const UNINITIALIZED: Self = Self {
        timestamp: 0,
        index_value: Ray::ZERO,
    };

    /// Create an observation
    pub fn new(timestamp: u64, index_value: Ray) -> Self {
        Self { timestamp, index_value }
    }

    /// Whether this slot holds a real observation
    pub fn is_initialized(&self) -> bool {
        self.timestamp != 0
    }
}

/// Bounded, growable circular buffer of observations addressed by a
/// `{index, cardinality, cardinality_next}` cursor triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationBuffer {
    slots: Vec<Observation>,
    index: u16,
    cardinality: u16,
    cardinality_next: u16,
}

impl ObservationBuffer {
    /// Create a buffer with a single seed observation
    pub fn initialize(timestamp: u64, index_value: Ray) -> Self {
        Self {
            slots: vec![Observation::new(timestamp, index_value)],
            index: 0,
            cardinality: 1,
            cardinality_next: 1,
        }
    }

    /// Slot most recently written
    pub fn index(&self) -> u16 {
        self.index
    }

    /// Number of populated slots
    pub fn cardinality(&self) -> u16 {
        self.cardinality
    }

    /// Target capacity to grow into at the next wrap
    pub fn cardinality_next(&self) -> u16 {
        self.cardinality_next
    }

    /// Request capacity growth. Slots are preallocated now; logical
    /// cardinality extends only when the write cursor is about to wrap.
    /// Shrinking is a no-op. Returns the effective `cardinality_next`.
    pub fn grow(&mut self, next: u16) -> u16 {
        if next <= self.cardinality_next {
            return self.cardinality_next;
        }
        self.slots.resize(next as usize, Observation::UNINITIALIZED);
        self.cardinality_next = next;
        self.cardinality_next
    }

    /// Append an observation. Ordering and throttling are the caller's
    /// responsibility; this only advances the cursors. Returns the new
    /// `(index, cardinality)`.
    pub fn write(&mut self, timestamp: u64, index_value: Ray) -> (u16, u16) {
        let mut cardinality = self.cardinality;
        if self.index == cardinality - 1 && self.cardinality_next > cardinality {
            cardinality = self.cardinality_next;
        }
        let next_index = (self.index + 1) % cardinality;
        self.slots[next_index as usize] = Observation::new(timestamp, index_value);
        self.index = next_index;
        self.cardinality = cardinality;
        (next_index, cardinality)
    }

    /// The most recently written observation
    pub fn newest(&self) -> Observation {
        self.slots[self.index as usize]
    }

    /// The oldest surviving observation
    pub fn oldest(&self) -> Observation {
        let candidate = self.slots[((self.index + 1) % self.cardinality) as usize];
        if candidate.is_initialized() {
            candidate
        } else {
            // buffer has not wrapped yet; slot 0 holds the seed
            self.slots[0]
        }
    }

    /// Locate the observations bracketing `target`.
    ///
    /// Returns `(before_or_at, None)` when `target` is at or after the
    /// newest observation (the caller brackets against a live reading), or
    /// `(before_or_at, Some(at_or_after))` otherwise. Fails with
    /// `InsufficientHistory` when `target` precedes the oldest stored
    /// observation.
    pub fn surrounding(&self, target: u64) -> Result<(Observation, Option<Observation>)> {
        let newest = self.newest();
        if target >= newest.timestamp {
            return Ok((newest, None));
        }

        let oldest = self.oldest();
        if target < oldest.timestamp {
            return Err(Error::InsufficientHistory {
                queried: target,
                oldest: oldest.timestamp,
            });
        }

        Ok(self.binary_search(target))
    }

    /// Binary search over the rotated oldest→newest ordering.
    ///
    /// Preconditions (enforced by `surrounding`): `oldest.timestamp <=
    /// target < newest.timestamp`. Uninitialized slots during early buffer
    /// life are skipped by advancing the left bound.
    fn binary_search(&self, target: u64) -> (Observation, Option<Observation>) {
        let cardinality = self.cardinality as usize;
        let mut lhs = (self.index as usize + 1) % cardinality;
        let mut rhs = lhs + cardinality - 1;

        loop {
            let mid = (lhs + rhs) / 2;
            let before = self.slots[mid % cardinality];
            if !before.is_initialized() {
                lhs = mid + 1;
                continue;
            }
            let after = self.slots[(mid + 1) % cardinality];

            if before.timestamp <= target && target <= after.timestamp {
                return (before, Some(after));
            }
            if before.timestamp > target {
                rhs = mid - 1;
            } else {
                lhs = mid + 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn ray(n: u64) -> Ray {
        Ray::new(Decimal::ONE + Decimal::from(n) / Decimal::from(1000u64))
    }

    fn ordered_timestamps(buffer: &ObservationBuffer) -> Vec<u64> {
        let cardinality = buffer.cardinality() as usize;
        let start = (buffer.index() as usize + 1) % cardinality;
        (0..cardinality)
            .map(|offset| buffer.slots[(start + offset) % cardinality])
            .filter(Observation::is_initialized)
            .map(|observation| observation.timestamp)
            .collect()
    }

    #[test]
    fn test_initialize_seeds_single_slot() {
        let buffer = ObservationBuffer::initialize(100, ray(0));
        assert_eq!(buffer.cardinality(), 1);
        assert_eq!(buffer.cardinality_next(), 1);
        assert_eq!(buffer.newest(), Observation::new(100, ray(0)));
        assert_eq!(buffer.oldest(), buffer.newest());
    }

    #[test]
    fn test_write_wraps_at_capacity() {
        let mut buffer = ObservationBuffer::initialize(100, ray(0));
        buffer.grow(3);
        for step in 1..=4u64 {
            buffer.write(100 + step * 10, ray(step));
        }
        // capacity 3, five writes total: 100 and 110 were overwritten
        assert_eq!(buffer.cardinality(), 3);
        assert_eq!(ordered_timestamps(&buffer), vec![120, 130, 140]);
        assert_eq!(buffer.oldest().timestamp, 120);
        assert_eq!(buffer.newest().timestamp, 140);
    }

    #[test]
    fn test_grow_is_lazy_and_monotonic() {
        let mut buffer = ObservationBuffer::initialize(100, ray(0));
        assert_eq!(buffer.grow(4), 4);
        // shrink requests are ignored
        assert_eq!(buffer.grow(2), 4);
        // cardinality unchanged until the cursor wraps
        assert_eq!(buffer.cardinality(), 1);
        buffer.write(110, ray(1));
        assert_eq!(buffer.cardinality(), 4);
    }

    #[test]
    fn test_surrounding_exact_and_between() {
        let mut buffer = ObservationBuffer::initialize(100, ray(0));
        buffer.grow(8);
        for step in 1..=5u64 {
            buffer.write(100 + step * 10, ray(step));
        }

        let (before, after) = buffer.surrounding(125).unwrap();
        assert_eq!(before.timestamp, 120);
        assert_eq!(after.unwrap().timestamp, 130);

        let (before, after) = buffer.surrounding(130).unwrap();
        assert!(before.timestamp == 130 || after.unwrap().timestamp == 130);

        // at or after the newest: bracket is open
        let (before, after) = buffer.surrounding(150).unwrap();
        assert_eq!(before.timestamp, 150);
        assert!(after.is_none());
        let (_, after) = buffer.surrounding(9_999).unwrap();
        assert!(after.is_none());
    }

    #[test]
    fn test_surrounding_skips_uninitialized_slots() {
        let mut buffer = ObservationBuffer::initialize(100, ray(0));
        buffer.grow(2);
        buffer.write(110, ray(1));
        buffer.grow(8);
        buffer.write(120, ray(2));
        buffer.write(130, ray(3));
        // slots 4..8 are still uninitialized

        let (before, after) = buffer.surrounding(115).unwrap();
        assert_eq!(before.timestamp, 110);
        assert_eq!(after.unwrap().timestamp, 120);
    }

    #[test]
    fn test_insufficient_history() {
        let mut buffer = ObservationBuffer::initialize(100, ray(0));
        buffer.grow(2);
        buffer.write(110, ray(1));
        buffer.write(120, ray(2)); // wraps; the seed at 100 is gone

        let err = buffer.surrounding(105).unwrap_err();
        assert_eq!(err, Error::InsufficientHistory { queried: 105, oldest: 110 });
    }

    proptest! {
        /// Walking oldest→newest yields non-decreasing timestamps after any
        /// interleaving of grows and ordered writes.
        #[test]
        fn prop_buffer_stays_ordered(
            grows in proptest::collection::vec(1u16..32, 0..4),
            steps in proptest::collection::vec(1u64..5_000, 1..64),
        ) {
            let mut buffer = ObservationBuffer::initialize(1, ray(0));
            let mut timestamp = 1u64;
            for (count, step) in steps.iter().enumerate() {
                if let Some(next) = grows.get(count % (grows.len().max(1))) {
                    buffer.grow(*next);
                }
                timestamp += step;
                buffer.write(timestamp, ray(count as u64));
            }

            let ordered = ordered_timestamps(&buffer);
            prop_assert!(ordered.windows(2).all(|pair| pair[0] <= pair[1]));
            prop_assert_eq!(*ordered.last().unwrap(), timestamp);
        }
    }
}
