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

//! The ATP facade.

use crate::config::AtpConfig;
use crate::error::AtpResult;
use crate::intake::Intake;
use crate::movement::MovementHandle;
use crossbeam_channel::{Receiver, Sender};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use trencat_core::{
    CoreError, LogSink, PhysicsCore, Sensors, Setpoint, TrackId, TrackSegment, Train,
};
use trencat_telemetry::{TapId, TapRegistry, TapStats};

/// Builder for [`Atp`]. A logging sink is mandatory.
#[derive(Debug, Default)]
pub struct AtpBuilder {
    log: Option<Arc<dyn LogSink>>,
    config: AtpConfig,
}

impl AtpBuilder {
    /// Sets the logging sink shared by the facade and its physics core.
    pub fn logger(mut self, log: Arc<dyn LogSink>) -> Self {
        self.log = Some(log);
        self
    }

    /// Overrides the default configuration.
    pub fn config(mut self, config: AtpConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the facade, failing if no logging sink was given.
    pub fn build(self) -> AtpResult<Atp> {
        let log = self.log.ok_or(CoreError::MissingLogger)?;
        Ok(Atp::with_config(log, self.config))
    }
}

/// Automatic Train Protection: the command and telemetry surface of one
/// simulated train.
///
/// Setpoints arrive through the intake, the movement driver turns the latest
/// one into motion, and taps publish sensor snapshots to any number of
/// consumers. Dropping the facade closes every tap and the intake.
pub struct Atp {
    core: Arc<PhysicsCore>,
    setpoint: Arc<RwLock<Setpoint>>,
    intake: Intake,
    taps: TapRegistry<Sensors>,
    config: AtpConfig,
}

impl Atp {
    /// Starts building a facade.
    pub fn builder() -> AtpBuilder {
        AtpBuilder::default()
    }

    /// Creates a facade with the default configuration.
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        Self::with_config(log, AtpConfig::default())
    }

    fn with_config(log: Arc<dyn LogSink>, config: AtpConfig) -> Self {
        let setpoint = Arc::new(RwLock::new(Setpoint::default()));
        let atp = Self {
            core: Arc::new(PhysicsCore::with_logger(Arc::clone(&log))),
            intake: Intake::new(Arc::clone(&setpoint), Arc::clone(&log)),
            taps: TapRegistry::new(Arc::clone(&log), config.min_tap_period),
            setpoint,
            config,
        };
        log.info("New ATP initialised");
        atp
    }

    /// Returns the physics engine driven by this facade.
    pub fn core(&self) -> &Arc<PhysicsCore> {
        &self.core
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &AtpConfig {
        &self.config
    }

    /// Returns the train specification.
    pub fn get_train(&self) -> Train {
        self.core.get_train()
    }

    /// Replaces the train specification.
    pub fn set_train(&self, train: Train) -> AtpResult<()> {
        Ok(self.core.set_train(train)?)
    }

    /// Returns the segment with the given identifier.
    pub fn get_track(&self, id: TrackId) -> AtpResult<TrackSegment> {
        Ok(self.core.get_track(id)?)
    }

    /// Returns the segment at the given route position.
    pub fn get_track_at(&self, index: usize) -> AtpResult<TrackSegment> {
        Ok(self.core.get_track_at(index)?)
    }

    /// Returns every segment in route order.
    pub fn tracks(&self) -> Vec<TrackSegment> {
        self.core.tracks()
    }

    /// Replaces the whole route.
    pub fn set_tracks(&self, segments: impl IntoIterator<Item = TrackSegment>) -> AtpResult<()> {
        Ok(self.core.set_tracks(segments)?)
    }

    /// Inserts or overwrites one segment.
    pub fn insert_track(&self, segment: TrackSegment) -> AtpResult<()> {
        Ok(self.core.insert_track(segment)?)
    }

    /// Removes a segment, returning it if it was stored.
    pub fn delete_track(&self, id: TrackId) -> Option<TrackSegment> {
        self.core.delete_track(id)
    }

    /// Returns the latest sensor snapshot.
    pub fn get_sensors(&self) -> Sensors {
        self.core.get_sensors()
    }

    /// Overwrites the sensor snapshot.
    pub fn set_sensors(&self, sensors: Sensors) {
        self.core.set_sensors(sensors)
    }

    /// Returns the last setpoint received by the intake.
    pub fn setpoint(&self) -> Setpoint {
        *self.setpoint.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens the setpoint intake.
    ///
    /// Returns the handle on which to send setpoints and the channel that
    /// receives one message once the intake has fully closed.
    pub fn open_intake(&self) -> AtpResult<(Sender<Setpoint>, Receiver<()>)> {
        self.intake.open()
    }

    /// Requests closure of the setpoint intake.
    pub fn close_intake(&self) -> AtpResult<()> {
        self.intake.close()
    }

    /// Opens a tap publishing a sensor snapshot every `period`.
    pub fn open_tap(&self, id: TapId, period: Duration) -> AtpResult<Receiver<Sensors>> {
        let core = Arc::clone(&self.core);
        Ok(self.taps.open(id, period, move || core.get_sensors())?)
    }

    /// Closes a tap. Its consumer sees the channel disconnect.
    pub fn close_tap(&self, id: TapId) -> AtpResult<()> {
        Ok(self.taps.close(id)?)
    }

    /// Returns delivery statistics of an open tap.
    pub fn tap_stats(&self, id: TapId) -> AtpResult<TapStats> {
        Ok(self.taps.stats(id)?)
    }

    /// Returns the identifiers of open taps.
    pub fn tap_ids(&self) -> Vec<TapId> {
        self.taps.ids()
    }

    /// Starts advancing the train every `movement_period` under the latest
    /// setpoint.
    pub fn start_movement(&self) -> MovementHandle {
        MovementHandle::start(
            Arc::clone(&self.core),
            Arc::clone(&self.setpoint),
            self.config.movement_period,
        )
    }
}

impl Drop for Atp {
    fn drop(&mut self) {
        self.taps.close_all();
        if self.intake.is_open() {
            self.core.log().info("Closing setpoint intake on shutdown");
        }
        self.intake.shutdown();
    }
}
