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

//! Drives a scenario in real time: accelerate, coast, then brake to a stop,
//! logging a sensor snapshot every second.
//!
//! Usage: `trencat-sandbox [scenario.json]`. Without an argument the bundled
//! reference scenario is used.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime};
use trencat_control::Atp;
use trencat_core::{LogCrateSink, Scenario, Sensors, Setpoint};
use trencat_telemetry::{logging, TapId};

const REFERENCE: &str =
    include_str!("../../crates/trencat-core/tests/data/reference_scenario.json");

fn load_scenario() -> Result<Scenario> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            Scenario::from_json(&json).with_context(|| format!("parsing {path}"))
        }
        None => Scenario::from_json(REFERENCE).context("parsing the reference scenario"),
    }
}

fn report(sensors: &Sensors) {
    log::info!(
        "pos {:8.2} m  v {:6.2} m/s  a {:5.2} m/s2  traction {:9.0} N  braking {:9.0} N",
        sensors.position,
        sensors.velocity,
        sensors.acceleration,
        sensors.traction_force,
        sensors.braking_force
    );
}

fn main() -> Result<()> {
    logging::init_logging();

    let scenario = load_scenario()?;
    let atp = Atp::builder()
        .logger(Arc::new(LogCrateSink::default()))
        .build()?;
    scenario.apply(atp.core())?;
    atp.set_sensors(Sensors {
        time: SystemTime::now(),
        ..scenario.initial
    });

    let telemetry = atp.open_tap(TapId(1), Duration::from_secs(1))?;
    let (input, ack) = atp.open_intake()?;
    let _movement = atp.start_movement();

    let profile = [(0.5, Duration::from_secs(5)), (0.0, Duration::from_secs(10))];
    for (value, hold) in profile {
        input.send(Setpoint::now(value))?;
        let until = Instant::now() + hold;
        while let Ok(sensors) = telemetry.recv_deadline(until) {
            report(&sensors);
        }
    }

    input.send(Setpoint::now(-0.5))?;
    let deadline = Instant::now() + Duration::from_secs(60);
    while Instant::now() < deadline {
        let sensors = telemetry.recv_timeout(Duration::from_secs(2))?;
        report(&sensors);
        if sensors.is_stopped() {
            break;
        }
    }
    thread::sleep(atp.config().movement_period);
    log::info!("Stopped at {:.2} m", atp.get_sensors().position);

    atp.close_intake()?;
    ack.recv_timeout(Duration::from_secs(1))?;
    Ok(())
}
