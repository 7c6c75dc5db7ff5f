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

//! Telemetry taps: independently opened, rate-limited sample streams.
//!
//! A tap samples its source on a fixed period and offers each sample to its
//! consumer without blocking. A consumer that is not waiting misses the
//! sample; nothing queues up and the producer never slows down.

mod registry;

pub use registry::TapRegistry;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Caller-chosen identifier of a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TapId(pub u32);

impl fmt::Display for TapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A specialized `Result` type for tap operations.
pub type TapResult<T> = Result<T, TapError>;

/// An error raised while opening, closing or querying a tap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapError {
    /// A tap with this identifier is open or still closing.
    AlreadyExists(TapId),
    /// No open tap has this identifier.
    NotFound(TapId),
    /// The requested period is shorter than the registry accepts.
    InvalidPeriod {
        /// The requested period.
        requested: Duration,
        /// The shortest accepted period.
        minimum: Duration,
    },
}

impl fmt::Display for TapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TapError::AlreadyExists(id) => write!(f, "Tap {id} already exists"),
            TapError::NotFound(id) => write!(f, "Tap {id} doesn't exist"),
            TapError::InvalidPeriod { requested, minimum } => write!(
                f,
                "Tap period {requested:?} is shorter than the minimum {minimum:?}"
            ),
        }
    }
}

impl std::error::Error for TapError {}

/// Delivery statistics of one tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapStats {
    /// Sampling period.
    pub period: Duration,
    /// Samples handed to the consumer.
    pub delivered: u64,
    /// Samples dropped because the consumer was not waiting.
    pub dropped: u64,
    /// Whether a close was requested and the tap's task is winding down.
    pub closing: bool,
}
