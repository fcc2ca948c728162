//! Relative/absolute index arithmetic.
//!
//! A sequence of `total` pages is stored in slots addressed by a zero-based
//! *relative* index, while the outside world talks in *absolute* page numbers
//! offset by `first_index`. Everything here is pure and allocation free.

use crate::intent::{Direction, NavigationIntent};

/// Wrap an arbitrary (possibly negative) index into `[0, total)`.
///
/// Returns `None` when `total == 0`: there is no valid slot to wrap into and
/// callers are expected to short-circuit.
pub fn wrap(index: i64, total: usize) -> Option<usize> {
    if total == 0 {
        return None;
    }
    let total = i64::try_from(total).ok()?;
    usize::try_from(index.rem_euclid(total)).ok()
}

/// Move one slot from `current` in `direction`, wrapping at both ends.
pub fn step(current: usize, direction: Direction, total: usize) -> Option<usize> {
    let current = i64::try_from(current).ok()?;
    wrap(current + direction.delta(), total)
}

/// Infer which way a jump from `from` to `to` travels.
///
/// The jump is `Forward` when the upward cyclic distance is at most half the
/// sequence, otherwise `Backward`. An exact half-way distance resolves to
/// `Forward`.
pub fn infer_direction(from: usize, to: usize, total: usize) -> Direction {
    if total == 0 {
        return Direction::Forward;
    }
    let from = from % total;
    let to = to % total;
    let upward = (to + total - from) % total;

    if upward * 2 <= total {
        Direction::Forward
    } else {
        Direction::Backward
    }
}

/// Maps between relative slot indices and absolute page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexMapper {
    first_index: i64,
    total: usize,
}

impl IndexMapper {
    /// Create a mapper for `total` pages numbered from `first_index`.
    pub fn new(first_index: i64, total: usize) -> Self {
        Self { first_index, total }
    }

    /// Number of pages in the sequence.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Absolute number of the first page.
    pub fn first_index(&self) -> i64 {
        self.first_index
    }

    /// Whether the sequence has no pages.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Whether `relative` addresses an existing slot.
    pub fn contains(&self, relative: usize) -> bool {
        relative < self.total
    }

    /// Convert a relative slot index to its absolute page number.
    ///
    /// Saturates at `i64::MAX`; validated configs never get there.
    pub fn to_absolute(&self, relative: usize) -> i64 {
        i64::try_from(relative)
            .map_or(i64::MAX, |relative| self.first_index.saturating_add(relative))
    }

    /// Convert an absolute page number to a relative index.
    ///
    /// The result is not range checked and saturates at the `i64` bounds;
    /// use [`IndexMapper::wrap_absolute`] to land on a slot.
    pub fn to_relative(&self, absolute: i64) -> i64 {
        absolute.saturating_sub(self.first_index)
    }

    /// Convert any absolute page number to a relative slot, wrapping.
    pub fn wrap_absolute(&self, absolute: i64) -> Option<usize> {
        if self.total == 0 {
            return None;
        }
        let offset = i128::from(absolute) - i128::from(self.first_index);
        let total = i128::try_from(self.total).ok()?;
        usize::try_from(offset.rem_euclid(total)).ok()
    }

    /// Resolve a navigation intent against the current slot.
    ///
    /// Returns the target slot and the direction of travel: explicit for a
    /// step, inferred for an absolute jump.
    pub fn resolve(&self, intent: NavigationIntent, current: usize) -> Option<(usize, Direction)> {
        match intent {
            NavigationIntent::Step(direction) => {
                step(current, direction, self.total).map(|target| (target, direction))
            }
            NavigationIntent::Goto(absolute) => {
                let target = self.wrap_absolute(absolute)?;
                Some((target, infer_direction(current, target, self.total)))
            }
        }
    }
}
