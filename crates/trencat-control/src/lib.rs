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

//! # Trencat Control
//!
//! The Automatic Train Protection facade. It wires a [`PhysicsCore`] to a
//! setpoint intake, a set of telemetry taps publishing sensor snapshots, and a
//! periodic movement driver.
//!
//! [`PhysicsCore`]: trencat_core::PhysicsCore

#![warn(missing_docs)]

mod atp;
mod config;
mod error;
mod intake;
mod movement;

pub use atp::{Atp, AtpBuilder};
pub use config::AtpConfig;
pub use error::{AtpError, AtpResult};
pub use movement::MovementHandle;
