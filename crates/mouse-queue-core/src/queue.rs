//! Growable point queue shared between the window procedure and the poller.

use crate::error::{QueueError, QueueResult};
use crate::point::MousePoint;
use tracing::debug;

/// Default number of points reserved at installation.
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// Largest number of points a queue can hold.
pub const MAX_QUEUE_CAPACITY: usize = isize::MAX as usize / std::mem::size_of::<MousePoint>();

/// Append-only buffer of points observed since the last drain.
///
/// Capacity doubles whenever the queue is full and is only reset by
/// [`MovementQueue::reset`]. Growth past `limit` fails with
/// [`QueueError::OutOfMemory`].
#[derive(Debug)]
pub struct MovementQueue {
    points: Vec<MousePoint>,
    capacity: usize,
    limit: usize,
}

impl MovementQueue {
    /// Create an empty queue with no storage reserved.
    pub const fn new() -> Self {
        Self {
            points: Vec::new(),
            capacity: 0,
            limit: MAX_QUEUE_CAPACITY,
        }
    }

    /// Create a queue with `capacity` points reserved.
    pub fn with_capacity(capacity: usize) -> QueueResult<Self> {
        Self::with_limit(capacity, MAX_QUEUE_CAPACITY)
    }

    /// Create a queue with `capacity` points reserved that never holds more
    /// than `limit` points.
    pub fn with_limit(capacity: usize, limit: usize) -> QueueResult<Self> {
        let mut queue = Self::new();
        queue.limit = limit.clamp(1, MAX_QUEUE_CAPACITY);
        queue.reset(capacity)?;
        Ok(queue)
    }

    /// Drop all points and reallocate storage for `capacity` points.
    pub fn reset(&mut self, capacity: usize) -> QueueResult<()> {
        let capacity = capacity.clamp(1, self.limit);
        let mut points = Vec::new();
        points
            .try_reserve_exact(capacity)
            .map_err(|_| QueueError::OutOfMemory {
                requested: capacity,
            })?;
        self.points = points;
        self.capacity = capacity;
        Ok(())
    }

    /// Number of buffered points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Reserved capacity in points.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Maximum number of points the queue may hold.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Buffered points in queue order.
    pub fn as_slice(&self) -> &[MousePoint] {
        &self.points
    }

    /// Append a point, doubling capacity when full.
    pub fn push(&mut self, point: MousePoint) -> QueueResult<()> {
        self.reserve(1)?;
        self.points.push(point);
        Ok(())
    }

    /// Append every point in `batch`, or none of them if the queue cannot
    /// grow to fit.
    pub fn extend(&mut self, batch: &[MousePoint]) -> QueueResult<()> {
        self.reserve(batch.len())?;
        self.points.extend_from_slice(batch);
        Ok(())
    }

    /// Make room for `additional` more points, doubling capacity as needed.
    pub fn reserve(&mut self, additional: usize) -> QueueResult<()> {
        let len = self.points.len();
        let needed = len.saturating_add(additional);
        if needed <= self.capacity {
            return Ok(());
        }
        if needed > self.limit {
            return Err(QueueError::OutOfMemory { requested: needed });
        }

        let mut requested = self.capacity.max(1).saturating_mul(2);
        while requested < needed {
            requested = requested.saturating_mul(2);
        }
        let requested = requested.min(self.limit);
        self.points
            .try_reserve_exact(requested - len)
            .map_err(|_| QueueError::OutOfMemory { requested })?;
        debug!(from = self.capacity, to = requested, "Movement queue grown");
        self.capacity = requested;
        Ok(())
    }

    /// Copy every point into `dst` and clear the queue.
    ///
    /// Fails without touching the queue when `dst` cannot hold all points.
    pub fn drain_into(&mut self, dst: &mut [MousePoint]) -> QueueResult<usize> {
        let len = self.points.len();
        if dst.len() < len {
            return Err(QueueError::DestinationTooSmall {
                needed: len,
                provided: dst.len(),
            });
        }
        dst[..len].copy_from_slice(&self.points);
        self.points.clear();
        Ok(len)
    }

    /// Take every point as an owned vector and clear the queue.
    pub fn drain(&mut self) -> Vec<MousePoint> {
        let drained = self.points.to_vec();
        self.points.clear();
        drained
    }

    /// Discard every point, keeping capacity.
    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl Default for MovementQueue {
    fn default() -> Self {
        Self::new()
    }
}
