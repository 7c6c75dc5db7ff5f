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

//! # Trencat Core
//!
//! Foundational crate holding the train, track and sensor types together with
//! the physics engine that moves a train along its route.

#![warn(missing_docs)]

pub mod diagnostics;
pub mod error;
#[cfg(feature = "factory")]
pub mod factory;
pub mod physics;
pub mod scenario;
pub mod sensors;
pub mod setpoint;
pub mod track;
pub mod train;

pub use diagnostics::{LogCrateSink, LogSink};
pub use error::{CoreError, CoreResult};
pub use physics::PhysicsCore;
pub use scenario::Scenario;
pub use sensors::{Resistance, SafetyAlarms, Sensors};
pub use setpoint::Setpoint;
pub use track::{Direction, TrackId, TrackRegistry, TrackSegment};
pub use train::Train;
