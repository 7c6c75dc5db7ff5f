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

//! A log sink that keeps every record in memory.

use log::Level;
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;
use trencat_core::{LogCrateSink, LogSink};

/// A single recorded message.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// When the message was recorded.
    pub time: SystemTime,
    /// Severity.
    pub level: Level,
    /// The message text.
    pub message: String,
}

/// Thread-safe in-memory sink, optionally echoing to the `log` facade.
///
/// Reads take the lock shared, so inspecting records never stalls writers
/// for long.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: RwLock<Vec<LogRecord>>,
    echo: Option<LogCrateSink>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty sink that also forwards every record to `echo`.
    pub fn echoing(echo: LogCrateSink) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            echo: Some(echo),
        }
    }

    /// Returns a copy of every record, oldest first.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the messages recorded at `level`.
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|record| record.level == level)
            .map(|record| record.message.clone())
            .collect()
    }

    /// Returns `true` if any record at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|record| record.level == level && record.message.contains(needle))
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every stored record.
    pub fn clear(&self) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: Level, message: &str) {
        if let Some(echo) = &self.echo {
            echo.log(level, message);
        }
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogRecord {
                time: SystemTime::now(),
                level,
                message: message.to_string(),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_records_in_order() {
        let sink = MemorySink::new();
        sink.info("first");
        sink.warn("second");

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "first");
        assert_eq!(records[1].level, Level::Warn);
        assert!(records[0].time <= records[1].time);
    }

    #[test]
    fn test_filter_by_level() {
        let sink = MemorySink::echoing(LogCrateSink::new("memory-sink-test"));
        sink.info("opened");
        sink.warn("velocity exceeds maximum");
        sink.debug("tick");

        assert_eq!(sink.messages_at(Level::Warn), vec!["velocity exceeds maximum"]);
        assert!(sink.contains(Level::Warn, "exceeds"));
        assert!(!sink.contains(Level::Info, "exceeds"));
    }

    #[test]
    fn test_clear() {
        let sink = MemorySink::new();
        sink.info("x");
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_concurrent_writers() {
        let sink = Arc::new(MemorySink::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for i in 0..50 {
                        sink.info(&format!("{t}-{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(sink.len(), 200);
    }
}
