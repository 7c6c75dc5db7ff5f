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

//! Seeded generation of random but plausible trains and routes.

use crate::track::{TrackId, TrackSegment};
use crate::train::Train;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Which optional track features a generated route may contain.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteFeatures {
    /// Allow slopes in `[-0.01, 0.01]` rad.
    pub slope: bool,
    /// Allow bends with radius in `[60, 1000]` m.
    pub bend: bool,
    /// Allow tunnels.
    pub tunnel: bool,
}

/// Produces random trains and routes from a seed.
#[derive(Debug, Clone)]
pub struct Factory {
    rng: ChaCha8Rng,
}

impl Factory {
    /// Creates a factory with a fixed seed, so results are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generates a train.
    pub fn train(&mut self) -> Train {
        let rng = &mut self.rng;
        Train {
            id: rng.gen(),
            length: rng.gen_range(50.0..=150.0),
            mass: rng.gen_range(3e5..=7e5),
            mass_factor: rng.gen_range(1.0..=1.2),
            max_force: rng.gen_range(2e5..=6e5),
            max_brake: rng.gen_range(2e5..=6e5),
            resistance_lin: rng.gen_range(1e-9..=1e-6),
            resistance_qua: rng.gen_range(3e-11..=1e-9),
        }
    }

    /// Generates `count` consecutive segments linked forward and backward.
    ///
    /// Segment identifiers are `first_id`, `first_id + 1`, and so on.
    pub fn route(
        &mut self,
        first_id: u32,
        count: usize,
        min_length: f64,
        max_length: f64,
        features: RouteFeatures,
    ) -> Vec<TrackSegment> {
        let rng = &mut self.rng;
        let mut route: Vec<TrackSegment> = Vec::with_capacity(count);
        for offset in 0..count {
            let id = TrackId(first_id + offset as u32);
            let mut segment = TrackSegment::new(
                id,
                rng.gen_range(min_length..=max_length),
                rng.gen_range(5.0..=30.0),
            );
            if features.slope && rng.gen_bool(0.5) {
                segment.slope = rng.gen_range(-0.01..=0.01);
            }
            if features.bend && rng.gen_bool(0.5) {
                segment.bend_radius = rng.gen_range(60.0..=1000.0);
            }
            if features.tunnel && rng.gen_bool(0.5) {
                segment.tunnel = true;
            }
            if let Some(previous) = route.last_mut() {
                previous.forward = Some(id);
                segment.backward = Some(previous.id);
            }
            route.push(segment);
        }
        route
    }
}
