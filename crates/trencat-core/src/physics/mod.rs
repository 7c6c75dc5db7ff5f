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

//! # Physics Core
//!
//! Owns the train specification, the track registry and the latest sensor
//! snapshot, and advances the snapshot through time.
//!
//! Each state group sits behind its own reader/writer lock. Single accessors
//! are atomic. [`PhysicsCore::advance`] holds the sensor write lock for the
//! whole step and reads the train and the track table while holding it
//! (lock order: sensors, train, tracks), so concurrent advances serialize and
//! a step never mixes two trains or two track tables. Replacing the train
//! between two steps is still visible to the next one.

pub mod resistance;
mod step;

pub use step::{step, StepEvent, StepTrack};

use crate::diagnostics::LogSink;
use crate::error::{CoreError, CoreResult};
use crate::sensors::Sensors;
use crate::track::{TrackId, TrackRegistry, TrackSegment};
use crate::train::Train;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// Standard gravity in m/s².
pub const GRAVITY: f64 = 9.80665;
/// Average mass added per passenger, in kg.
pub const PASSENGER_MASS: f64 = 70.0;
/// Below this velocity (m/s) a braking setpoint stops the train outright.
pub const STANDSTILL_VELOCITY: f64 = 0.01;
/// Bend radii at or below this value (m) raise a tight-curve alarm.
pub const MIN_SAFE_BEND_RADIUS: f64 = 100.0;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// The physics and state engine of a single train.
#[derive(Debug)]
pub struct PhysicsCore {
    train: RwLock<Train>,
    tracks: RwLock<TrackRegistry>,
    sensors: RwLock<Sensors>,
    log: Arc<dyn LogSink>,
}

/// Builder for [`PhysicsCore`]. A logging sink is mandatory.
#[derive(Debug, Default)]
pub struct PhysicsCoreBuilder {
    log: Option<Arc<dyn LogSink>>,
}

impl PhysicsCoreBuilder {
    /// Sets the logging sink.
    pub fn logger(mut self, log: Arc<dyn LogSink>) -> Self {
        self.log = Some(log);
        self
    }

    /// Builds the engine, failing if no logging sink was given.
    pub fn build(self) -> CoreResult<PhysicsCore> {
        let log = self.log.ok_or(CoreError::MissingLogger)?;
        Ok(PhysicsCore::with_logger(log))
    }
}

impl PhysicsCore {
    /// Starts building an engine.
    pub fn builder() -> PhysicsCoreBuilder {
        PhysicsCoreBuilder::default()
    }

    /// Creates an engine with no train, no tracks, and a train at rest now.
    pub fn with_logger(log: Arc<dyn LogSink>) -> Self {
        log.info("New physics core initialised");
        Self {
            train: RwLock::new(Train::default()),
            tracks: RwLock::new(TrackRegistry::new()),
            sensors: RwLock::new(Sensors::default()),
            log,
        }
    }

    /// Returns the logging sink.
    pub fn log(&self) -> &Arc<dyn LogSink> {
        &self.log
    }

    /// Returns the train specification.
    pub fn get_train(&self) -> Train {
        *read(&self.train)
    }

    /// Replaces the train specification.
    pub fn set_train(&self, train: Train) -> CoreResult<()> {
        if let Err(e) = train.validate() {
            self.log.warn(&format!("Attempt to set train {}: {e}", train.id));
            return Err(e);
        }
        *write(&self.train) = train;
        self.log.info(&format!("Set {train:?}"));
        Ok(())
    }

    /// Returns the segment with the given identifier.
    pub fn get_track(&self, id: TrackId) -> CoreResult<TrackSegment> {
        read(&self.tracks)
            .get(id)
            .copied()
            .inspect_err(|e| self.log.warn(&format!("Attempt to get track: {e}")))
    }

    /// Returns the segment at the given route position.
    pub fn get_track_at(&self, index: usize) -> CoreResult<TrackSegment> {
        read(&self.tracks)
            .get_at(index)
            .copied()
            .inspect_err(|e| self.log.warn(&format!("Attempt to get track: {e}")))
    }

    /// Returns every stored segment in route order.
    pub fn tracks(&self) -> Vec<TrackSegment> {
        read(&self.tracks).iter().copied().collect()
    }

    /// Replaces the whole route. On error the stored route is unchanged.
    pub fn set_tracks(&self, segments: impl IntoIterator<Item = TrackSegment>) -> CoreResult<()> {
        let replaced = {
            let mut tracks = write(&self.tracks);
            tracks.replace_all(segments).map(|()| tracks.len())
        };
        let count =
            replaced.inspect_err(|e| self.log.warn(&format!("Attempt to set tracks: {e}")))?;
        self.log.info(&format!("Set {count} tracks"));
        Ok(())
    }

    /// Inserts or overwrites a single segment.
    pub fn insert_track(&self, segment: TrackSegment) -> CoreResult<()> {
        let inserted = write(&self.tracks).insert(segment);
        inserted.inspect_err(|e| self.log.warn(&format!("Attempt to insert track: {e}")))?;
        self.log.info(&format!("Inserted track {}", segment.id));
        Ok(())
    }

    /// Removes a segment. Removing an unknown segment only logs a warning.
    pub fn delete_track(&self, id: TrackId) -> Option<TrackSegment> {
        let removed = write(&self.tracks).delete(id);
        match removed {
            Some(_) => self.log.info(&format!("Deleted track {id}")),
            None => self
                .log
                .warn(&format!("Attempt to delete track {id}: not found")),
        }
        removed
    }

    /// Returns the latest sensor snapshot.
    pub fn get_sensors(&self) -> Sensors {
        *read(&self.sensors)
    }

    /// Overwrites the sensor snapshot, typically to seed initial conditions.
    pub fn set_sensors(&self, sensors: Sensors) {
        *write(&self.sensors) = sensors;
        self.log.debug(&format!("Set {sensors:?}"));
    }

    /// Advances the train by `elapsed` under the acceleration `setpoint`, stores
    /// the resulting snapshot and returns it.
    ///
    /// Fails, leaving the stored snapshot untouched, if the train is invalid or
    /// the current or following segment cannot be resolved.
    pub fn advance(&self, setpoint: f64, elapsed: Duration) -> CoreResult<Sensors> {
        let outcome = {
            let mut sensors = write(&self.sensors);
            let train = *read(&self.train);
            let tracks = read(&self.tracks);
            let outcome = compute(&sensors, &train, &tracks, setpoint, elapsed);
            if let Ok((next, _, _)) = &outcome {
                *sensors = *next;
            }
            outcome
        };

        // No lock is held past this point; sinks may call back into the engine.
        let (next, segment, events) =
            outcome.inspect_err(|e| self.log.warn(&format!("Attempt to advance: {e}")))?;
        for event in events {
            self.log_event(segment, event);
        }
        Ok(next)
    }

    fn log_event(&self, segment: TrackId, event: StepEvent) {
        match event {
            StepEvent::Transition { from, to } => self.log.info(&format!(
                "Entered track {segment} (position {to}, left position {from})"
            )),
            StepEvent::Overspeed { velocity, limit } => self.log.warn(&format!(
                "Current velocity {velocity}m/s exceeds maximum velocity {limit}m/s"
            )),
            StepEvent::TightCurve { bend_radius } => self.log.warn(&format!(
                "Track {segment} bend radius {bend_radius}m is below the safe minimum"
            )),
            StepEvent::TractionClamped { setpoint, limit } => self.log.warn(&format!(
                "Acceleration setpoint {setpoint}m/s2 exceeds maximum acceleration {limit}m/s2"
            )),
            StepEvent::BrakingClamped { setpoint, limit } => self.log.warn(&format!(
                "Deceleration setpoint {setpoint}m/s2 exceeds maximum deceleration {limit}m/s2"
            )),
        }
    }
}

/// Resolves the segment under the train and runs one step.
///
/// The current segment is looked up by identifier when the snapshot carries
/// one, so deleting an upstream segment does not move the train.
fn compute(
    prev: &Sensors,
    train: &Train,
    tracks: &TrackRegistry,
    setpoint: f64,
    elapsed: Duration,
) -> CoreResult<(Sensors, TrackId, Vec<StepEvent>)> {
    train.validate()?;

    let current_index = match prev.track_id {
        Some(id) => tracks.position(id).ok_or(CoreError::TrackNotFound(id))?,
        None => prev.track_index,
    };
    let current = tracks.get_at(current_index)?;
    let (index, segment, entered) = if prev.rel_position > current.length {
        let (index, segment) = tracks.following(current_index)?;
        (index, segment, true)
    } else {
        (current_index, current, false)
    };

    let prev = Sensors {
        track_index: current_index,
        ..*prev
    };
    let mut events = Vec::new();
    let next = step(
        &prev,
        train,
        StepTrack {
            segment,
            index,
            entered,
        },
        setpoint,
        elapsed,
        &mut events,
    );
    Ok((next, segment.id, events))
}
