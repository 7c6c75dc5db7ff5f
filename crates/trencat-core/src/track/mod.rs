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

//! Track segments and the registry that links them into a route.

mod registry;

pub use registry::TrackRegistry;

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifier of a track segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One of the two ends of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards increasing position.
    Forward,
    /// Towards decreasing position.
    Backward,
}

impl Direction {
    /// Returns the opposite end.
    pub fn reverse(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

/// A stretch of track with uniform physical properties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSegment {
    /// Identifier, unique within a registry.
    pub id: TrackId,
    /// The segment entered when leaving through the forward end.
    #[serde(default)]
    pub forward: Option<TrackId>,
    /// The segment entered when leaving through the backward end.
    #[serde(default)]
    pub backward: Option<TrackId>,
    /// Length in m.
    pub length: f64,
    /// Speed limit in m/s.
    pub max_velocity: f64,
    /// Inclination in radians, positive uphill.
    #[serde(default)]
    pub slope: f64,
    /// Bend radius in m. `f64::INFINITY` means straight track; stored as `null` in JSON.
    #[serde(default = "straight", with = "bend_radius")]
    pub bend_radius: f64,
    /// Whether the segment runs through a tunnel.
    #[serde(default)]
    pub tunnel: bool,
}

pub(crate) fn straight() -> f64 {
    f64::INFINITY
}

impl TrackSegment {
    /// Creates a straight, flat, open-air segment with no neighbors.
    pub fn new(id: TrackId, length: f64, max_velocity: f64) -> Self {
        Self {
            id,
            forward: None,
            backward: None,
            length,
            max_velocity,
            slope: 0.0,
            bend_radius: f64::INFINITY,
            tunnel: false,
        }
    }

    /// Returns the neighbor reference at the given end.
    pub fn neighbor(&self, direction: Direction) -> Option<TrackId> {
        match direction {
            Direction::Forward => self.forward,
            Direction::Backward => self.backward,
        }
    }

    /// Checks the segment's own properties, independent of any registry.
    pub fn validate(&self) -> CoreResult<()> {
        let invalid = |reason: String| CoreError::InvalidTrack {
            id: self.id,
            reason,
        };
        if !self.length.is_finite() || self.length <= 0.0 {
            return Err(invalid(format!("length must be positive, got {}", self.length)));
        }
        if self.max_velocity.is_nan() || self.max_velocity < 0.0 {
            return Err(invalid(format!(
                "max velocity must not be negative, got {}",
                self.max_velocity
            )));
        }
        if !self.slope.is_finite() {
            return Err(invalid(format!("slope is {}", self.slope)));
        }
        if self.bend_radius.is_nan() || self.bend_radius <= 0.0 {
            return Err(invalid(format!(
                "bend radius must be positive, got {}",
                self.bend_radius
            )));
        }
        if self.forward == Some(self.id) || self.backward == Some(self.id) {
            return Err(invalid("a segment cannot neighbor itself".to_string()));
        }
        Ok(())
    }
}

/// Maps the infinite "straight" bend radius to JSON `null` and back.
pub(crate) mod bend_radius {
    use super::*;

    pub fn serialize<S: Serializer>(radius: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if radius.is_infinite() {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(radius)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_segment_is_straight() {
        let track = TrackSegment::new(TrackId(1), 100.0, 10.0);
        assert!(track.bend_radius.is_infinite());
        assert!(track.validate().is_ok());
    }

    #[test]
    fn test_self_reference_is_rejected() {
        let track = TrackSegment {
            forward: Some(TrackId(1)),
            ..TrackSegment::new(TrackId(1), 100.0, 10.0)
        };
        assert!(matches!(
            track.validate(),
            Err(CoreError::InvalidTrack { id: TrackId(1), .. })
        ));
    }

    #[test]
    fn test_zero_length_is_rejected() {
        assert!(TrackSegment::new(TrackId(1), 0.0, 10.0).validate().is_err());
    }

    #[test]
    fn test_straight_track_json_roundtrip() {
        let track = TrackSegment::new(TrackId(3), 250.0, 14.0);
        let json = serde_json::to_string(&track).unwrap();
        assert!(json.contains("\"bendRadius\":null"));
        let back: TrackSegment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, track);
    }

    #[test]
    fn test_missing_optional_fields_take_defaults() {
        let track: TrackSegment =
            serde_json::from_str(r#"{"id": 7, "length": 500.0, "maxVelocity": 20.0}"#).unwrap();
        assert_eq!(track.forward, None);
        assert_eq!(track.slope, 0.0);
        assert!(track.bend_radius.is_infinite());
        assert!(!track.tunnel);
    }

    #[test]
    fn test_direction_reverse() {
        assert_eq!(Direction::Forward.reverse(), Direction::Backward);
        assert_eq!(Direction::Backward.reverse(), Direction::Forward);
    }
}
