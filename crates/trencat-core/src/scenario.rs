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

//! JSON scenarios: a train, its route and the initial conditions.

use crate::error::CoreResult;
use crate::physics::PhysicsCore;
use crate::sensors::Sensors;
use crate::track::TrackSegment;
use crate::train::Train;
use serde::{Deserialize, Serialize};

/// Everything needed to put a train on a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// The train specification.
    pub train: Train,
    /// The route, in order.
    pub tracks: Vec<TrackSegment>,
    /// Initial conditions. Missing fields default to a train at rest.
    #[serde(default)]
    pub initial: Sensors,
}

impl Scenario {
    /// Parses a scenario from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serializes the scenario to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Loads the scenario into an engine: train, then tracks, then sensors.
    pub fn apply(&self, core: &PhysicsCore) -> CoreResult<()> {
        core.set_train(self.train)?;
        core.set_tracks(self.tracks.iter().copied())?;
        core.set_sensors(self.initial);
        Ok(())
    }
}
