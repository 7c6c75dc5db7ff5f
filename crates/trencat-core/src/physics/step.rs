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

//! The kinematic integration step, free of locking and logging.

use super::{resistance, MIN_SAFE_BEND_RADIUS, PASSENGER_MASS, STANDSTILL_VELOCITY};
use crate::sensors::{SafetyAlarms, Sensors};
use crate::track::TrackSegment;
use crate::train::Train;
use std::time::Duration;

/// The segment the step is computed on.
#[derive(Debug, Clone, Copy)]
pub struct StepTrack<'a> {
    /// The segment itself.
    pub segment: &'a TrackSegment,
    /// Its route position.
    pub index: usize,
    /// Whether the train entered it during this step.
    pub entered: bool,
}

/// Something worth reporting that happened during a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepEvent {
    /// The train moved onto a new segment.
    Transition {
        /// Route position left behind.
        from: usize,
        /// Route position entered.
        to: usize,
    },
    /// Velocity reached the segment's speed limit.
    Overspeed {
        /// Current velocity.
        velocity: f64,
        /// The segment's limit.
        limit: f64,
    },
    /// The segment's bend radius is unsafe.
    TightCurve {
        /// The segment's bend radius.
        bend_radius: f64,
    },
    /// The setpoint asked for more than the traction envelope allows.
    TractionClamped {
        /// Commanded acceleration.
        setpoint: f64,
        /// Applied acceleration.
        limit: f64,
    },
    /// The setpoint asked for more than the braking envelope allows.
    BrakingClamped {
        /// Commanded deceleration.
        setpoint: f64,
        /// Applied deceleration.
        limit: f64,
    },
}

/// Computes the snapshot following `prev` after `elapsed` under `setpoint`.
///
/// Velocity integrates the previous acceleration (explicit Euler) and position
/// the mean of previous and new velocity (trapezoidal rule). The new
/// acceleration is the setpoint clamped to what the train can physically do
/// against the current resistance; a braking setpoint at standstill yields
/// exactly zero acceleration and velocity.
pub fn step(
    prev: &Sensors,
    train: &Train,
    track: StepTrack<'_>,
    setpoint: f64,
    elapsed: Duration,
    events: &mut Vec<StepEvent>,
) -> Sensors {
    let segment = track.segment;
    let dt = elapsed.as_secs_f64();
    let mut alarms = SafetyAlarms::default();

    if track.entered {
        events.push(StepEvent::Transition {
            from: prev.track_index,
            to: track.index,
        });
    }

    let mass = train.mass + f64::from(prev.passengers) * PASSENGER_MASS;

    let mut velocity = (prev.velocity + dt * prev.acceleration).max(0.0);
    if velocity >= segment.max_velocity {
        alarms.overspeed = true;
        events.push(StepEvent::Overspeed {
            velocity,
            limit: segment.max_velocity,
        });
    }

    let travelled = 0.5 * (prev.velocity + velocity) * dt;
    let position = prev.position + travelled;
    let rel_position = if track.entered {
        travelled
    } else {
        prev.rel_position + travelled
    };

    if segment.bend_radius <= MIN_SAFE_BEND_RADIUS {
        alarms.tight_curve = true;
        events.push(StepEvent::TightCurve {
            bend_radius: segment.bend_radius,
        });
    }
    let resistance = resistance::breakdown(
        mass,
        train.resistance_lin,
        train.resistance_qua,
        segment,
        rel_position,
        velocity,
    );

    let inertia = mass * train.mass_factor;
    let max_acceleration = (train.max_force - resistance.total) / inertia;
    let max_deceleration = (-train.max_brake - resistance.total) / inertia;

    let acceleration = if setpoint > 0.0 && setpoint > max_acceleration {
        alarms.traction_limited = true;
        events.push(StepEvent::TractionClamped {
            setpoint,
            limit: max_acceleration,
        });
        max_acceleration
    } else if setpoint < 0.0 && velocity < STANDSTILL_VELOCITY {
        // No reverse gear, whatever the braking envelope says.
        velocity = 0.0;
        0.0
    } else if setpoint < 0.0 && setpoint < max_deceleration {
        alarms.braking_limited = true;
        events.push(StepEvent::BrakingClamped {
            setpoint,
            limit: max_deceleration,
        });
        max_deceleration
    } else {
        setpoint
    };

    let force = inertia * acceleration + resistance.total;
    let (traction_force, braking_force) = if force >= 0.0 {
        (force, 0.0)
    } else {
        (0.0, -force)
    };

    Sensors {
        time: prev.time + elapsed,
        setpoint,
        position,
        velocity,
        acceleration,
        traction_force,
        traction_power: traction_force * velocity,
        braking_force,
        braking_power: braking_force * velocity,
        mass,
        passengers: prev.passengers,
        track_index: track.index,
        track_id: Some(segment.id),
        rel_position,
        slope: segment.slope,
        bend_radius: segment.bend_radius,
        tunnel: segment.tunnel,
        resistance,
        alarms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TrackId;
    use approx::assert_abs_diff_eq;
    use std::time::UNIX_EPOCH;

    fn train() -> Train {
        Train {
            id: 1,
            mass: 5.07e5,
            mass_factor: 1.06,
            length: 75.0,
            max_force: 3e5,
            max_brake: 4.475e5,
            resistance_lin: 0.014 / 5.07e5,
            resistance_qua: 2.564e-5 / 5.07e5,
        }
    }

    fn on(segment: &TrackSegment) -> StepTrack<'_> {
        StepTrack {
            segment,
            index: 0,
            entered: false,
        }
    }

    #[test]
    fn test_integration_uses_previous_acceleration() {
        let track = TrackSegment::new(TrackId(1), 10_000.0, 14.0);
        let prev = Sensors {
            velocity: 2.0,
            acceleration: 0.5,
            ..Sensors::at_rest(UNIX_EPOCH)
        };
        let mut events = Vec::new();
        let next = step(&prev, &train(), on(&track), 0.2, Duration::from_secs(2), &mut events);

        assert_abs_diff_eq!(next.velocity, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(next.position, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(next.rel_position, 5.0, epsilon = 1e-12);
        assert_eq!(next.acceleration, 0.2);
        assert_eq!(next.time, UNIX_EPOCH + Duration::from_secs(2));
        assert!(events.is_empty());
    }

    #[test]
    fn test_velocity_never_negative() {
        let track = TrackSegment::new(TrackId(1), 10_000.0, 14.0);
        let prev = Sensors {
            velocity: 0.1,
            acceleration: -0.5,
            ..Sensors::at_rest(UNIX_EPOCH)
        };
        let next = step(&prev, &train(), on(&track), -0.5, Duration::from_secs(1), &mut Vec::new());
        assert_eq!(next.velocity, 0.0);
        assert_eq!(next.acceleration, 0.0);
    }

    #[test]
    fn test_braking_at_standstill_does_not_reverse() {
        let track = TrackSegment::new(TrackId(1), 10_000.0, 14.0);
        let prev = Sensors {
            velocity: 0.005,
            ..Sensors::at_rest(UNIX_EPOCH)
        };
        let next = step(
            &prev,
            &train(),
            on(&track),
            -0.3,
            Duration::from_millis(200),
            &mut Vec::new(),
        );
        assert_eq!(next.velocity, 0.0);
        assert_eq!(next.acceleration, 0.0);
    }

    #[test]
    fn test_traction_clamp() {
        let track = TrackSegment::new(TrackId(1), 10_000.0, 14.0);
        let prev = Sensors::at_rest(UNIX_EPOCH);
        let mut events = Vec::new();
        let next = step(&prev, &train(), on(&track), 5.0, Duration::from_millis(200), &mut events);

        let expected = (3e5 - next.resistance.total) / (5.07e5 * 1.06);
        assert_abs_diff_eq!(next.acceleration, expected, epsilon = 1e-12);
        assert_abs_diff_eq!(next.traction_force, 3e5, epsilon = 1e-6);
        assert!(next.alarms.traction_limited);
        assert!(matches!(events[..], [StepEvent::TractionClamped { .. }]));
    }

    #[test]
    fn test_standstill_wins_over_braking_clamp() {
        let track = TrackSegment::new(TrackId(1), 10_000.0, 14.0);
        let mut events = Vec::new();
        let next = step(
            &Sensors::at_rest(UNIX_EPOCH),
            &train(),
            on(&track),
            -5.0,
            Duration::from_millis(200),
            &mut events,
        );
        assert_eq!(next.acceleration, 0.0);
        assert_eq!(next.velocity, 0.0);
        assert!(!next.alarms.braking_limited);
        assert!(events.is_empty());
    }

    #[test]
    fn test_braking_clamp_reports_braking_force() {
        let track = TrackSegment::new(TrackId(1), 10_000.0, 14.0);
        let prev = Sensors {
            velocity: 10.0,
            ..Sensors::at_rest(UNIX_EPOCH)
        };
        let next = step(
            &prev,
            &train(),
            on(&track),
            -5.0,
            Duration::from_millis(200),
            &mut Vec::new(),
        );

        assert!(next.alarms.braking_limited);
        assert_eq!(next.traction_force, 0.0);
        assert_abs_diff_eq!(next.braking_force, 4.475e5, epsilon = 1e-6);
        assert_abs_diff_eq!(next.braking_power, next.braking_force * 10.0, epsilon = 1e-6);
    }

    #[test]
    fn test_overspeed_is_flagged_but_not_blocking() {
        let track = TrackSegment::new(TrackId(1), 10_000.0, 14.0);
        let prev = Sensors {
            velocity: 14.5,
            ..Sensors::at_rest(UNIX_EPOCH)
        };
        let mut events = Vec::new();
        let next = step(&prev, &train(), on(&track), 0.1, Duration::from_millis(200), &mut events);
        assert!(next.alarms.overspeed);
        assert_eq!(next.acceleration, 0.1);
        assert!(matches!(events[..], [StepEvent::Overspeed { .. }]));
    }

    #[test]
    fn test_entering_a_segment_resets_relative_position() {
        let first = TrackSegment::new(TrackId(1), 100.0, 14.0);
        let second = TrackSegment {
            slope: 0.01,
            ..TrackSegment::new(TrackId(2), 100.0, 14.0)
        };
        let prev = Sensors {
            velocity: 10.0,
            position: 101.0,
            rel_position: 101.0,
            track_id: Some(first.id),
            ..Sensors::at_rest(UNIX_EPOCH)
        };
        let mut events = Vec::new();
        let next = step(
            &prev,
            &train(),
            StepTrack {
                segment: &second,
                index: 1,
                entered: true,
            },
            0.0,
            Duration::from_millis(200),
            &mut events,
        );

        assert_abs_diff_eq!(next.rel_position, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(next.position, 103.0, epsilon = 1e-12);
        assert_eq!(next.track_index, 1);
        assert_eq!(next.track_id, Some(TrackId(2)));
        assert_eq!(next.slope, 0.01);
        assert_eq!(events[0], StepEvent::Transition { from: 0, to: 1 });
    }

    #[test]
    fn test_passengers_add_mass() {
        let track = TrackSegment::new(TrackId(1), 10_000.0, 14.0);
        let prev = Sensors {
            passengers: 100,
            ..Sensors::at_rest(UNIX_EPOCH)
        };
        let next = step(
            &prev,
            &train(),
            on(&track),
            0.0,
            Duration::from_millis(200),
            &mut Vec::new(),
        );
        assert_abs_diff_eq!(next.mass, 5.07e5 + 7000.0, epsilon = 1e-9);
        assert_eq!(next.passengers, 100);
    }

    #[test]
    fn test_tight_curve_alarm() {
        let track = TrackSegment {
            bend_radius: 80.0,
            ..TrackSegment::new(TrackId(1), 10_000.0, 14.0)
        };
        let next = step(
            &Sensors::at_rest(UNIX_EPOCH),
            &train(),
            on(&track),
            0.0,
            Duration::from_millis(200),
            &mut Vec::new(),
        );
        assert!(next.alarms.tight_curve);
        assert_eq!(next.resistance.curve, 0.0);
    }
}
