//! Id allocation for locally created users.
//!
//! The store never generates ids. The create flow asks an [`IdAllocator`]
//! for one, passing the largest id currently held so the result cannot
//! collide with an existing record.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::types::UserId;

/// Strategy for synthesizing ids of new users.
pub trait IdAllocator: Send + Sync {
    /// Return an id greater than `floor` and than every id this allocator
    /// returned before.
    fn next_id(&self, floor: Option<UserId>) -> UserId;
}

/// Millisecond-timestamp ids, bumped forward when two requests land in the
/// same millisecond or the clock is behind the collection.
#[derive(Debug, Default)]
pub struct ClockIds {
    last: AtomicI64,
}

impl ClockIds {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }
}

impl IdAllocator for ClockIds {
    fn next_id(&self, floor: Option<UserId>) -> UserId {
        let now = chrono::Utc::now().timestamp_millis();
        let floor = floor.map_or(i64::MIN, |id| id.as_i64());
        let mut previous = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(previous.saturating_add(1)).max(floor.saturating_add(1));
            match self.last.compare_exchange_weak(
                previous,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return UserId::new(candidate),
                Err(actual) => previous = actual,
            }
        }
    }
}

/// Counter-based ids starting from a fixed value. Deterministic, which makes
/// it the allocator of choice in tests.
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicI64,
}

impl SequentialIds {
    /// The first id handed out is `start` (unless `floor` is higher).
    #[must_use]
    pub const fn starting_at(start: i64) -> Self {
        Self {
            next: AtomicI64::new(start),
        }
    }
}

impl IdAllocator for SequentialIds {
    fn next_id(&self, floor: Option<UserId>) -> UserId {
        let minimum = floor.map_or(i64::MIN, |id| id.as_i64().saturating_add(1));
        let mut current = self.next.load(Ordering::Relaxed);
        loop {
            let issued = current.max(minimum);
            match self.next.compare_exchange_weak(
                current,
                issued.saturating_add(1),
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return UserId::new(issued),
                Err(actual) => current = actual,
            }
        }
    }
}
