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

//! Keyed, route-ordered storage of track segments.

use super::{Direction, TrackId, TrackSegment};
use crate::error::{CoreError, CoreResult};
use std::collections::HashMap;

/// Stores track segments by identifier while remembering the order in which
/// they form the route.
///
/// The registry upholds one invariant: whenever a segment names a stored
/// neighbor, that neighbor names the segment back through its opposite end.
#[derive(Debug, Clone, Default)]
pub struct TrackRegistry {
    route: Vec<TrackSegment>,
    positions: HashMap<TrackId, usize>,
}

impl TrackRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from an ordered set of segments.
    ///
    /// A later segment with an already-seen identifier replaces the earlier one
    /// in place. Adjacency is checked across the whole set once every segment
    /// is known, so the input order does not matter.
    pub fn from_segments(segments: impl IntoIterator<Item = TrackSegment>) -> CoreResult<Self> {
        let mut registry = Self::new();
        for segment in segments {
            segment.validate()?;
            registry.put(segment);
        }
        for segment in &registry.route {
            registry.check_adjacency(segment)?;
        }
        Ok(registry)
    }

    /// Returns the segment with the given identifier.
    pub fn get(&self, id: TrackId) -> CoreResult<&TrackSegment> {
        self.positions
            .get(&id)
            .map(|&index| &self.route[index])
            .ok_or(CoreError::TrackNotFound(id))
    }

    /// Returns the segment at the given route position.
    pub fn get_at(&self, index: usize) -> CoreResult<&TrackSegment> {
        self.route
            .get(index)
            .ok_or(CoreError::TrackIndexOutOfBounds {
                index,
                len: self.route.len(),
            })
    }

    /// Returns the route position of a segment.
    pub fn position(&self, id: TrackId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Returns the segment the train enters after leaving the one at `index`.
    ///
    /// An explicit forward reference wins; without one the next route
    /// position is used.
    pub fn following(&self, index: usize) -> CoreResult<(usize, &TrackSegment)> {
        let current = self.get_at(index)?;
        match current.forward {
            Some(next) => {
                let position = self.position(next).ok_or(CoreError::TrackNotFound(next))?;
                Ok((position, &self.route[position]))
            }
            None => Ok((index + 1, self.get_at(index + 1)?)),
        }
    }

    /// Inserts a segment, replacing any stored segment with the same identifier.
    ///
    /// Fails without touching the registry if the segment is invalid, one of
    /// its stored neighbors does not point back to it, or a stored segment
    /// names it as a neighbor and it does not point back.
    pub fn insert(&mut self, segment: TrackSegment) -> CoreResult<()> {
        segment.validate()?;
        self.check_adjacency(&segment)?;
        self.put(segment);
        Ok(())
    }

    /// Removes a segment, returning it if it was stored.
    pub fn delete(&mut self, id: TrackId) -> Option<TrackSegment> {
        let index = self.positions.remove(&id)?;
        let removed = self.route.remove(index);
        for position in self.positions.values_mut() {
            if *position > index {
                *position -= 1;
            }
        }
        Some(removed)
    }

    /// Swaps the whole content for a new set of segments.
    ///
    /// The new set is validated first; on error the registry is unchanged.
    pub fn replace_all(
        &mut self,
        segments: impl IntoIterator<Item = TrackSegment>,
    ) -> CoreResult<()> {
        *self = Self::from_segments(segments)?;
        Ok(())
    }

    /// Returns the number of stored segments.
    pub fn len(&self) -> usize {
        self.route.len()
    }

    /// Returns `true` if no segment is stored.
    pub fn is_empty(&self) -> bool {
        self.route.is_empty()
    }

    /// Iterates over the segments in route order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackSegment> {
        self.route.iter()
    }

    fn put(&mut self, segment: TrackSegment) {
        match self.positions.get(&segment.id) {
            Some(&index) => self.route[index] = segment,
            None => {
                self.positions.insert(segment.id, self.route.len());
                self.route.push(segment);
            }
        }
    }

    fn check_adjacency(&self, segment: &TrackSegment) -> CoreResult<()> {
        for direction in [Direction::Forward, Direction::Backward] {
            let Some(neighbor_id) = segment.neighbor(direction) else {
                continue;
            };
            let Ok(neighbor) = self.get(neighbor_id) else {
                continue;
            };
            let found = neighbor.neighbor(direction.reverse());
            if found != Some(segment.id) {
                return Err(CoreError::AdjacencyMismatch {
                    segment: segment.id,
                    neighbor: neighbor_id,
                    direction,
                    found,
                });
            }
        }
        for stored in self.route.iter().filter(|stored| stored.id != segment.id) {
            for direction in [Direction::Forward, Direction::Backward] {
                if stored.neighbor(direction) != Some(segment.id) {
                    continue;
                }
                let found = segment.neighbor(direction.reverse());
                if found != Some(stored.id) {
                    return Err(CoreError::AdjacencyMismatch {
                        segment: stored.id,
                        neighbor: segment.id,
                        direction,
                        found,
                    });
                }
            }
        }
        Ok(())
    }
}

impl PartialEq for TrackRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.route == other.route
    }
}
