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

//! Acceleration commands.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A commanded acceleration in m/s² and the time it was issued.
///
/// Positive values accelerate, negative values brake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Setpoint {
    /// Desired acceleration in m/s².
    pub value: f64,
    /// When the command was issued.
    pub time: SystemTime,
}

impl Setpoint {
    /// Creates a setpoint issued now.
    pub fn now(value: f64) -> Self {
        Self {
            value,
            time: SystemTime::now(),
        }
    }
}

impl Default for Setpoint {
    /// Coasting, issued at the Unix epoch.
    fn default() -> Self {
        Self {
            value: 0.0,
            time: UNIX_EPOCH,
        }
    }
}
