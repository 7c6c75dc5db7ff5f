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

//! Error types for the ATP facade.

use std::fmt;
use trencat_core::CoreError;
use trencat_telemetry::TapError;

/// A specialized `Result` type for ATP operations.
pub type AtpResult<T> = Result<T, AtpError>;

/// An error raised by the ATP facade.
#[derive(Debug, Clone, PartialEq)]
pub enum AtpError {
    /// The setpoint intake is already open, or its close is still pending.
    IntakeAlreadyOpen,
    /// The setpoint intake is not open.
    IntakeNotOpen,
    /// A telemetry tap operation failed.
    Tap(TapError),
    /// The physics engine rejected the operation.
    Core(CoreError),
}

impl fmt::Display for AtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtpError::IntakeAlreadyOpen => write!(f, "Setpoint intake already open"),
            AtpError::IntakeNotOpen => write!(f, "Setpoint intake not open"),
            AtpError::Tap(e) => write!(f, "Tap error: {e}"),
            AtpError::Core(e) => write!(f, "Physics core error: {e}"),
        }
    }
}

impl std::error::Error for AtpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AtpError::Tap(e) => Some(e),
            AtpError::Core(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TapError> for AtpError {
    fn from(e: TapError) -> Self {
        AtpError::Tap(e)
    }
}

impl From<CoreError> for AtpError {
    fn from(e: CoreError) -> Self {
        AtpError::Core(e)
    }
}
