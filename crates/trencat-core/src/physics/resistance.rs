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

//! Resistance components opposing the train's motion.

use super::{GRAVITY, MIN_SAFE_BEND_RADIUS};
use crate::sensors::Resistance;
use crate::track::TrackSegment;

/// Bend radius below which the tighter curve coefficient applies, in m.
const WIDE_BEND_RADIUS: f64 = 300.0;
/// Tunnel drag coefficient.
const TUNNEL_COEFFICIENT: f64 = 1.296e-9;

/// Rolling resistance: `mass * (lin + qua * v²)`.
pub fn basic(mass: f64, resistance_lin: f64, resistance_qua: f64, velocity: f64) -> f64 {
    mass * (resistance_lin + resistance_qua * velocity * velocity)
}

/// Gravity component along the slope (radians), positive uphill.
pub fn slope(mass: f64, slope: f64) -> f64 {
    mass * GRAVITY * slope.sin()
}

/// Curve resistance. Radii at or below [`MIN_SAFE_BEND_RADIUS`] are an alarm
/// condition and contribute nothing here.
pub fn curve(mass: f64, bend_radius: f64) -> f64 {
    if bend_radius <= MIN_SAFE_BEND_RADIUS {
        0.0
    } else if bend_radius < WIDE_BEND_RADIUS {
        4.91 * mass / (bend_radius - 55.0)
    } else {
        6.3 * mass / (bend_radius - 55.0)
    }
}

/// Tunnel drag, proportional to the tunnel length still ahead of the train.
pub fn tunnel(track: &TrackSegment, rel_position: f64, velocity: f64) -> f64 {
    if !track.tunnel {
        return 0.0;
    }
    TUNNEL_COEFFICIENT * (track.length - rel_position).max(0.0) * GRAVITY * velocity * velocity
}

/// Computes the full breakdown for a train of `mass` kg on `track`.
pub fn breakdown(
    mass: f64,
    resistance_lin: f64,
    resistance_qua: f64,
    track: &TrackSegment,
    rel_position: f64,
    velocity: f64,
) -> Resistance {
    let basic = basic(mass, resistance_lin, resistance_qua, velocity);
    let slope = slope(mass, track.slope);
    let curve = curve(mass, track.bend_radius);
    let tunnel = tunnel(track, rel_position, velocity);
    let line = slope + curve + tunnel;
    Resistance {
        basic,
        slope,
        curve,
        tunnel,
        line,
        total: basic + line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TrackId;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_curve_bands() {
        assert_eq!(curve(1000.0, 100.0), 0.0);
        assert_eq!(curve(1000.0, 50.0), 0.0);
        assert_abs_diff_eq!(curve(1000.0, 155.0), 49.1, epsilon = 1e-9);
        assert_abs_diff_eq!(curve(1000.0, 355.0), 21.0, epsilon = 1e-9);
        assert_eq!(curve(1000.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn test_slope_sign() {
        assert!(slope(1000.0, 0.01) > 0.0);
        assert!(slope(1000.0, -0.01) < 0.0);
        assert_eq!(slope(1000.0, 0.0), 0.0);
    }

    #[test]
    fn test_tunnel_only_inside_tunnels() {
        let mut track = TrackSegment::new(TrackId(1), 1000.0, 20.0);
        assert_eq!(tunnel(&track, 0.0, 10.0), 0.0);

        track.tunnel = true;
        assert_abs_diff_eq!(
            tunnel(&track, 200.0, 10.0),
            1.296e-9 * 800.0 * GRAVITY * 100.0,
            epsilon = 1e-15
        );
        // Past the tunnel end nothing is left ahead.
        assert_eq!(tunnel(&track, 1500.0, 10.0), 0.0);
    }

    #[test]
    fn test_breakdown_sums() {
        let track = TrackSegment {
            slope: 0.005,
            bend_radius: 250.0,
            tunnel: true,
            ..TrackSegment::new(TrackId(1), 1000.0, 20.0)
        };
        let r = breakdown(4e5, 1e-7, 1e-10, &track, 100.0, 12.0);
        assert_abs_diff_eq!(r.line, r.slope + r.curve + r.tunnel, epsilon = 1e-9);
        assert_abs_diff_eq!(r.total, r.basic + r.line, epsilon = 1e-9);
        assert!(r.curve > 0.0 && r.tunnel > 0.0);
    }
}
