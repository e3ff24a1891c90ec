//! Queue configuration.

use crate::error::QueueResult;
use crate::point::ResolutionMode;
use crate::queue::{DEFAULT_INITIAL_CAPACITY, MAX_QUEUE_CAPACITY};
use serde::{Deserialize, Serialize};

/// Upper bound of points the platform keeps in its movement history.
pub const MAX_HISTORY_DEPTH: usize = 64;

/// Configuration applied at installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Points reserved when the queue is (re)initialized.
    pub initial_capacity: usize,
    /// Maximum history points requested per movement message.
    /// Clamped to `1..=64`.
    pub history_depth: usize,
    /// Coordinate convention for the history query.
    pub mode: ResolutionMode,
    /// Most points the queue may hold before growth fails.
    pub max_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            history_depth: MAX_HISTORY_DEPTH,
            mode: ResolutionMode::Display,
            max_capacity: MAX_QUEUE_CAPACITY,
        }
    }
}

impl QueueConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> QueueResult<Self> {
        let config: QueueConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Clamp fields into their supported ranges.
    pub fn sanitized(mut self) -> Self {
        self.initial_capacity = self.initial_capacity.clamp(1, MAX_QUEUE_CAPACITY);
        self.max_capacity = self
            .max_capacity
            .clamp(self.initial_capacity, MAX_QUEUE_CAPACITY);
        self.history_depth = self.history_depth.clamp(1, MAX_HISTORY_DEPTH);
        self
    }
}
