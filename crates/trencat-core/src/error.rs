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

//! Defines the error type shared by the track registry and the physics engine.

use crate::track::{Direction, TrackId};
use std::fmt;

/// A specialized `Result` type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// An error raised by the core engine.
///
/// Every variant is recoverable: the operation that produced it left the
/// engine state untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// The engine was built without a logging sink.
    MissingLogger,
    /// No segment with the given identifier is stored.
    TrackNotFound(TrackId),
    /// A positional lookup fell outside the stored route.
    TrackIndexOutOfBounds {
        /// The requested route position.
        index: usize,
        /// The number of stored segments.
        len: usize,
    },
    /// A segment references a stored neighbor that does not point back to it.
    AdjacencyMismatch {
        /// The segment being inserted.
        segment: TrackId,
        /// The stored neighbor named by `segment`.
        neighbor: TrackId,
        /// Which reference of `segment` names the neighbor.
        direction: Direction,
        /// The neighbor's reciprocal reference, if any.
        found: Option<TrackId>,
    },
    /// The train specification failed validation.
    InvalidTrain(String),
    /// A track segment failed validation.
    InvalidTrack {
        /// The offending segment.
        id: TrackId,
        /// Why it was rejected.
        reason: String,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::MissingLogger => write!(f, "No logging sink was provided"),
            CoreError::TrackNotFound(id) => write!(f, "Track {id} not found"),
            CoreError::TrackIndexOutOfBounds { index, len } => {
                write!(f, "Track position {index} out of bounds (route has {len} segments)")
            }
            CoreError::AdjacencyMismatch {
                segment,
                neighbor,
                direction,
                found,
            } => match found {
                Some(found) => write!(
                    f,
                    "Track {segment} names {neighbor} as its {direction} neighbor, \
                     but {neighbor} points back to {found}"
                ),
                None => write!(
                    f,
                    "Track {segment} names {neighbor} as its {direction} neighbor, \
                     but {neighbor} does not point back to it"
                ),
            },
            CoreError::InvalidTrain(reason) => write!(f, "Invalid train: {reason}"),
            CoreError::InvalidTrack { id, reason } => write!(f, "Invalid track {id}: {reason}"),
        }
    }
}

impl std::error::Error for CoreError {}
