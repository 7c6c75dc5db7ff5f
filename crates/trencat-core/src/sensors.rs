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

//! Sensor snapshots: the train's kinematic and force state at one instant.

use crate::track::TrackId;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Breakdown of the forces opposing motion, in N.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resistance {
    /// Rolling resistance of the train itself.
    pub basic: f64,
    /// Gravity component along an inclined segment.
    pub slope: f64,
    /// Extra resistance in curves.
    pub curve: f64,
    /// Aerodynamic penalty inside tunnels.
    pub tunnel: f64,
    /// `slope + curve + tunnel`.
    pub line: f64,
    /// `basic + line`.
    pub total: f64,
}

/// Conditions flagged while advancing. They never block movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyAlarms {
    /// Velocity reached or exceeded the segment's speed limit.
    pub overspeed: bool,
    /// The segment's bend radius is at or below the safe minimum.
    pub tight_curve: bool,
    /// The commanded acceleration was clamped to the traction envelope.
    pub traction_limited: bool,
    /// The commanded deceleration was clamped to the braking envelope.
    pub braking_limited: bool,
}

impl SafetyAlarms {
    /// Returns `true` if any alarm is raised.
    pub fn any(&self) -> bool {
        self.overspeed || self.tight_curve || self.traction_limited || self.braking_limited
    }
}

/// A full sample of the train's dynamic state. All values use SI units.
///
/// Snapshots are produced whole by the physics engine and never patched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensors {
    /// Wall-clock time the sample refers to.
    #[serde(default = "SystemTime::now")]
    pub time: SystemTime,
    /// The setpoint applied to produce this sample.
    #[serde(default)]
    pub setpoint: f64,
    /// Absolute position in m.
    #[serde(default)]
    pub position: f64,
    /// Velocity in m/s, never negative.
    #[serde(default)]
    pub velocity: f64,
    /// Acceleration in m/s².
    #[serde(default)]
    pub acceleration: f64,
    /// Traction force in N.
    #[serde(default)]
    pub traction_force: f64,
    /// Traction power in W.
    #[serde(default)]
    pub traction_power: f64,
    /// Braking force in N.
    #[serde(default)]
    pub braking_force: f64,
    /// Braking power in W.
    #[serde(default)]
    pub braking_power: f64,
    /// Train mass plus passengers, in kg.
    #[serde(default)]
    pub mass: f64,
    /// Number of passengers on board.
    #[serde(default)]
    pub passengers: u32,
    /// Route position of the current segment.
    #[serde(default)]
    pub track_index: usize,
    /// Identifier of the current segment.
    #[serde(default)]
    pub track_id: Option<TrackId>,
    /// Distance travelled since entering the current segment, in m.
    #[serde(default)]
    pub rel_position: f64,
    /// Slope of the current segment.
    #[serde(default)]
    pub slope: f64,
    /// Bend radius of the current segment.
    #[serde(default = "crate::track::straight", with = "crate::track::bend_radius")]
    pub bend_radius: f64,
    /// Whether the current segment is a tunnel.
    #[serde(default)]
    pub tunnel: bool,
    /// Forces opposing motion.
    #[serde(default)]
    pub resistance: Resistance,
    /// Conditions raised during the step that produced this sample.
    #[serde(default)]
    pub alarms: SafetyAlarms,
}

impl Sensors {
    /// Creates a train at rest at the start of the route, stamped with `time`.
    pub fn at_rest(time: SystemTime) -> Self {
        Self {
            time,
            setpoint: 0.0,
            position: 0.0,
            velocity: 0.0,
            acceleration: 0.0,
            traction_force: 0.0,
            traction_power: 0.0,
            braking_force: 0.0,
            braking_power: 0.0,
            mass: 0.0,
            passengers: 0,
            track_index: 0,
            track_id: None,
            rel_position: 0.0,
            slope: 0.0,
            bend_radius: f64::INFINITY,
            tunnel: false,
            resistance: Resistance::default(),
            alarms: SafetyAlarms::default(),
        }
    }

    /// Returns `true` if the train is standing still and not accelerating.
    pub fn is_stopped(&self) -> bool {
        self.velocity == 0.0 && self.acceleration == 0.0
    }
}

impl Default for Sensors {
    /// A train at rest, stamped with the current time.
    fn default() -> Self {
        Self::at_rest(SystemTime::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_at_rest_is_stopped() {
        let sensors = Sensors::at_rest(UNIX_EPOCH);
        assert!(sensors.is_stopped());
        assert!(!sensors.alarms.any());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let sensors: Sensors =
            serde_json::from_str(r#"{"velocity": 3.5, "trackId": 2, "passengers": 10}"#).unwrap();
        assert_eq!(sensors.velocity, 3.5);
        assert_eq!(sensors.track_id, Some(TrackId(2)));
        assert_eq!(sensors.passengers, 10);
        assert!(sensors.bend_radius.is_infinite());
    }

    #[test]
    fn test_time_roundtrips_through_json() {
        let sensors = Sensors::at_rest(UNIX_EPOCH + Duration::from_millis(1500));
        let json = serde_json::to_string(&sensors).unwrap();
        let back: Sensors = serde_json::from_str(&json).unwrap();
        assert_eq!(back.time, sensors.time);
    }
}
