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

use std::time::Duration;

/// Configuration for the [`Atp`](crate::Atp) facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtpConfig {
    /// Cadence of the movement driver.
    pub movement_period: Duration,
    /// Shortest accepted tap period. Shorter requests are rejected.
    pub min_tap_period: Duration,
}

impl Default for AtpConfig {
    fn default() -> Self {
        Self {
            movement_period: Duration::from_millis(200),
            min_tap_period: Duration::from_millis(1),
        }
    }
}
