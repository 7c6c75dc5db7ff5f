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

//! Registry of open taps, keyed by caller-chosen identifier.

use super::{TapError, TapId, TapResult, TapStats};
use crossbeam_channel::{select, Receiver, Sender, TrySendError};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;
use std::time::Duration;
use trencat_core::LogSink;

#[derive(Debug, Default)]
struct Counters {
    delivered: AtomicU64,
    dropped: AtomicU64,
}

struct TapEntry {
    period: Duration,
    /// Dropping the sender is the stop signal. `None` once closing.
    stop: Option<Sender<()>>,
    counters: Arc<Counters>,
}

type Taps = Arc<RwLock<HashMap<TapId, TapEntry>>>;

/// Manages the lifecycle of every open tap.
///
/// Each tap owns a background thread that wakes once per period, takes one
/// sample and tries to hand it to the consumer. Taps go through
/// `Open -> Closing -> Closed`: [`close`](Self::close) only signals the
/// thread, which closes the consumer's channel and removes the entry on its
/// way out. Until then the identifier stays taken.
pub struct TapRegistry<T> {
    taps: Taps,
    min_period: Duration,
    log: Arc<dyn LogSink>,
    _sample: PhantomData<fn() -> T>,
}

impl<T: Send + 'static> TapRegistry<T> {
    /// Creates an empty registry that rejects periods below `min_period`.
    pub fn new(log: Arc<dyn LogSink>, min_period: Duration) -> Self {
        Self {
            taps: Arc::new(RwLock::new(HashMap::new())),
            min_period,
            log,
            _sample: PhantomData,
        }
    }

    /// Opens a tap that calls `sample` every `period` and offers the result
    /// to the returned receiver.
    pub fn open<F>(&self, id: TapId, period: Duration, sample: F) -> TapResult<Receiver<T>>
    where
        F: Fn() -> T + Send + 'static,
    {
        if period < self.min_period {
            let err = TapError::InvalidPeriod {
                requested: period,
                minimum: self.min_period,
            };
            self.log.warn(&format!("Attempt to open tap {id}: {err}"));
            return Err(err);
        }

        let mut taps = self.taps.write().unwrap_or_else(PoisonError::into_inner);
        if taps.contains_key(&id) {
            drop(taps);
            let err = TapError::AlreadyExists(id);
            self.log
                .warn(&format!("Attempt to open tap (ID {id}, period {period:?}): {err}"));
            return Err(err);
        }

        // Zero capacity: a send only succeeds if the consumer is waiting.
        let (output, receiver) = crossbeam_channel::bounded(0);
        let (stop, stop_rx) = crossbeam_channel::bounded::<()>(0);
        let counters = Arc::new(Counters::default());
        taps.insert(
            id,
            TapEntry {
                period,
                stop: Some(stop),
                counters: Arc::clone(&counters),
            },
        );
        drop(taps);

        let taps = Arc::clone(&self.taps);
        let log = Arc::clone(&self.log);
        thread::spawn(move || {
            run_tap(id, period, sample, output, stop_rx, &counters, log.as_ref());
            let mut taps = taps.write().unwrap_or_else(PoisonError::into_inner);
            if taps
                .get(&id)
                .is_some_and(|entry| Arc::ptr_eq(&entry.counters, &counters))
            {
                taps.remove(&id);
            }
            drop(taps);
            log.info(&format!("Closed tap (ID {id})"));
        });

        self.log
            .info(&format!("New tap (ID {id}, period {period:?})"));
        Ok(receiver)
    }

    /// Signals the tap's thread to stop. The consumer sees its channel
    /// disconnect shortly after.
    pub fn close(&self, id: TapId) -> TapResult<()> {
        let stop = self
            .taps
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&id)
            .and_then(|entry| entry.stop.take());
        match stop {
            Some(stop) => {
                drop(stop);
                self.log
                    .info(&format!("Closing tap (ID {id}) signal sent"));
                Ok(())
            }
            None => {
                let err = TapError::NotFound(id);
                self.log.warn(&format!("Attempt to close tap: {err}"));
                Err(err)
            }
        }
    }

    /// Signals every open tap to stop.
    pub fn close_all(&self) {
        let mut taps = self.taps.write().unwrap_or_else(PoisonError::into_inner);
        let mut closed = 0;
        for entry in taps.values_mut() {
            if entry.stop.take().is_some() {
                closed += 1;
            }
        }
        drop(taps);
        if closed > 0 {
            self.log.info(&format!("Closing {closed} taps"));
        }
    }

    /// Returns the delivery statistics of a tap that is open or closing.
    pub fn stats(&self, id: TapId) -> TapResult<TapStats> {
        let taps = self.taps.read().unwrap_or_else(PoisonError::into_inner);
        let entry = taps.get(&id).ok_or(TapError::NotFound(id))?;
        Ok(TapStats {
            period: entry.period,
            delivered: entry.counters.delivered.load(Ordering::Relaxed),
            dropped: entry.counters.dropped.load(Ordering::Relaxed),
            closing: entry.stop.is_none(),
        })
    }

    /// Returns `true` if the identifier is taken by an open or closing tap.
    pub fn contains(&self, id: TapId) -> bool {
        self.taps
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }

    /// Returns the identifiers of every open or closing tap, sorted.
    pub fn ids(&self) -> Vec<TapId> {
        let mut ids: Vec<_> = self
            .taps
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        ids.sort();
        ids
    }

    /// Returns the number of open or closing taps.
    pub fn len(&self) -> usize {
        self.taps.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if no tap is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Drop for TapRegistry<T> {
    fn drop(&mut self) {
        let mut taps = self.taps.write().unwrap_or_else(PoisonError::into_inner);
        for entry in taps.values_mut() {
            entry.stop.take();
        }
    }
}

fn run_tap<T, F>(
    id: TapId,
    period: Duration,
    sample: F,
    output: Sender<T>,
    stop: Receiver<()>,
    counters: &Counters,
    log: &dyn LogSink,
) where
    F: Fn() -> T,
{
    let ticker = crossbeam_channel::tick(period);
    loop {
        select! {
            recv(ticker) -> _ => match output.try_send(sample()) {
                Ok(()) => {
                    counters.delivered.fetch_add(1, Ordering::Relaxed);
                }
                Err(TrySendError::Full(_)) => {
                    counters.dropped.fetch_add(1, Ordering::Relaxed);
                }
                Err(TrySendError::Disconnected(_)) => {
                    log.info(&format!("Tap (ID {id}) consumer went away"));
                    break;
                }
            },
            recv(stop) -> _ => {
                log.info(&format!("Closing tap (ID {id}) gracefully"));
                break;
            }
        }
    }
}
