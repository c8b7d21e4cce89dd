//! Task identifiers
//!
//! ID Format:
//! - Task IDs are positive integers assigned by the task store (e.g., `7`)
//! - The text form accepts an optional `#` prefix (`#7`), as printed in listings
//!
//! IDs are never reused: the store always assigns one past the highest
//! existing id.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid task ID format: expected a positive integer like '7' or '#7', got '{0}'")]
    InvalidTaskId(String),
}

/// Task ID, unique within a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u32);

impl TaskId {
    /// Creates a task ID from its numeric value
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the numeric value
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the ID that follows this one, or `None` at the top of the range
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl From<u32> for TaskId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(IdError::InvalidTaskId(s.to_string()));
        }

        digits
            .parse::<u32>()
            .map(Self)
            .map_err(|_| IdError::InvalidTaskId(s.to_string()))
    }
}
