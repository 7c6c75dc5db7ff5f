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

//! The logging contract injected into the engine.
//!
//! The engine never reaches for a global logger. It is handed a [`LogSink`] at
//! construction time and every lifecycle event, warning, and validation failure
//! goes through it.

use log::Level;
use std::fmt::Debug;

/// Receives leveled diagnostic messages from the engine.
pub trait LogSink: Send + Sync + Debug {
    /// Records a message at the given level.
    fn log(&self, level: Level, message: &str);

    /// Records an informational message.
    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    /// Records a warning.
    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    /// Records a debug message.
    fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }
}

/// A [`LogSink`] that forwards every record to the `log` facade.
#[derive(Debug, Clone)]
pub struct LogCrateSink {
    target: &'static str,
}

impl LogCrateSink {
    /// Creates a sink that logs under the given target.
    pub fn new(target: &'static str) -> Self {
        Self { target }
    }

    /// Returns the target records are emitted under.
    pub fn target(&self) -> &'static str {
        self.target
    }
}

impl Default for LogCrateSink {
    fn default() -> Self {
        Self::new("trencat")
    }
}

impl LogSink for LogCrateSink {
    fn log(&self, level: Level, message: &str) {
        log::log!(target: self.target, level, "{message}");
    }
}
