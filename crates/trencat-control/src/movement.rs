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

//! The movement driver: advances the physics on a fixed cadence using the
//! latest setpoint.

use crossbeam_channel::{select, Receiver, Sender, TryRecvError};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};
use trencat_core::{LogSink, PhysicsCore, Setpoint};

/// Handle to a running movement driver.
///
/// Stopping is final: once [`stop`](Self::stop) returns, the driver has exited
/// and no further advance happens. Dropping the handle stops the driver.
#[derive(Debug)]
pub struct MovementHandle {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl MovementHandle {
    pub(crate) fn start(
        core: Arc<PhysicsCore>,
        setpoint: Arc<RwLock<Setpoint>>,
        period: Duration,
    ) -> Self {
        let (stop, stop_rx) = crossbeam_channel::bounded(0);
        core.log()
            .info(&format!("Starting movement (period {period:?})"));
        let handle = thread::spawn(move || {
            drive(&core, &setpoint, period, &stop_rx);
            core.log().info("Movement stopped");
        });
        Self {
            stop: Some(stop),
            handle: Some(handle),
        }
    }

    /// Signals the driver to stop and waits for it to exit.
    pub fn stop(&mut self) {
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Returns `true` until the driver has been stopped.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for MovementHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn drive(core: &PhysicsCore, setpoint: &RwLock<Setpoint>, period: Duration, stop: &Receiver<()>) {
    let ticker = crossbeam_channel::tick(period);
    loop {
        select! {
            recv(ticker) -> _ => {
                // Both may be ready at once; stopping wins.
                if !matches!(stop.try_recv(), Err(TryRecvError::Empty)) {
                    return;
                }
                let value = setpoint.read().unwrap_or_else(PoisonError::into_inner).value;
                let elapsed = SystemTime::now()
                    .duration_since(core.get_sensors().time)
                    .unwrap_or_default();
                // Failures are already logged by the core. Keep driving.
                let _ = core.advance(value, elapsed);
            },
            recv(stop) -> _ => return,
        }
    }
}
