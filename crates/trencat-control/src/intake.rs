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

//! The setpoint intake: the single channel through which acceleration
//! commands reach the train.

use crate::error::{AtpError, AtpResult};
use crossbeam_channel::{select, Receiver, Sender};
use std::mem;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread;
use trencat_core::{LogSink, Setpoint};

#[derive(Debug)]
enum IntakeState {
    Closed,
    /// Dropping `stop` asks the listener to shut down.
    Open { stop: Sender<()> },
    /// Close requested, listener not yet gone.
    Closing,
}

enum Event {
    Received(Setpoint),
    ProducerGone,
    Stop,
}

/// Listens for setpoints and keeps the latest one.
#[derive(Debug)]
pub(crate) struct Intake {
    state: Arc<Mutex<IntakeState>>,
    setpoint: Arc<RwLock<Setpoint>>,
    log: Arc<dyn LogSink>,
}

impl Intake {
    pub(crate) fn new(setpoint: Arc<RwLock<Setpoint>>, log: Arc<dyn LogSink>) -> Self {
        Self {
            state: Arc::new(Mutex::new(IntakeState::Closed)),
            setpoint,
            log,
        }
    }

    /// Opens the intake, returning the producer's handle and the channel on
    /// which the close acknowledgment arrives.
    pub(crate) fn open(&self) -> AtpResult<(Sender<Setpoint>, Receiver<()>)> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !matches!(*state, IntakeState::Closed) {
            drop(state);
            self.log
                .warn(&format!("Attempt to open intake: {}", AtpError::IntakeAlreadyOpen));
            return Err(AtpError::IntakeAlreadyOpen);
        }

        let (input, data) = crossbeam_channel::bounded(0);
        let (stop, stop_rx) = crossbeam_channel::bounded::<()>(0);
        let (ack_tx, ack) = crossbeam_channel::bounded(1);
        *state = IntakeState::Open { stop };
        drop(state);

        let shared_state = Arc::clone(&self.state);
        let setpoint = Arc::clone(&self.setpoint);
        let log = Arc::clone(&self.log);
        thread::spawn(move || {
            listen(&data, &stop_rx, &setpoint, log.as_ref());
            *shared_state.lock().unwrap_or_else(PoisonError::into_inner) = IntakeState::Closed;
            log.info("Closed setpoint intake");
            let _ = ack_tx.send(());
        });

        self.log.info("Opened setpoint intake");
        Ok((input, ack))
    }

    /// Asks the listener to stop. The producer's handle is left alone; it
    /// sees a disconnected channel once the listener is gone.
    pub(crate) fn close(&self) -> AtpResult<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match mem::replace(&mut *state, IntakeState::Closing) {
            IntakeState::Open { stop } => {
                drop(state);
                drop(stop);
                self.log.info("Closing setpoint intake");
                Ok(())
            }
            previous => {
                *state = previous;
                drop(state);
                self.log
                    .warn(&format!("Attempt to close intake: {}", AtpError::IntakeNotOpen));
                Err(AtpError::IntakeNotOpen)
            }
        }
    }

    /// Requests closure if the intake is open. Does nothing otherwise.
    pub(crate) fn shutdown(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let IntakeState::Open { .. } = *state {
            *state = IntakeState::Closing;
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        matches!(
            *self.state.lock().unwrap_or_else(PoisonError::into_inner),
            IntakeState::Open { .. }
        )
    }
}

fn listen(
    data: &Receiver<Setpoint>,
    stop: &Receiver<()>,
    setpoint: &RwLock<Setpoint>,
    log: &dyn LogSink,
) {
    let idle = crossbeam_channel::never();
    let mut source = data;
    loop {
        let event = select! {
            recv(source) -> msg => msg.map_or(Event::ProducerGone, Event::Received),
            recv(stop) -> _ => Event::Stop,
        };
        match event {
            Event::Received(next) => {
                *setpoint.write().unwrap_or_else(PoisonError::into_inner) = next;
                log.debug(&format!("New setpoint {} m/s2", next.value));
            }
            Event::ProducerGone => {
                // Keep the last setpoint and wait for the close signal.
                log.info("Setpoint producer disconnected");
                source = &idle;
            }
            Event::Stop => return,
        }
    }
}
