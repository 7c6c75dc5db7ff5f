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

//! Train specifications.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Static specification of a train. All values use SI units.
///
/// A `Train` is replaced as a whole through
/// [`PhysicsCore::set_train`](crate::physics::PhysicsCore::set_train); it is
/// never mutated field by field.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Train {
    /// Operator-assigned identifier.
    pub id: u32,
    /// Empty mass in kg.
    pub mass: f64,
    /// Multiplier on mass accounting for rotating inertia (wheels, axles, motors).
    pub mass_factor: f64,
    /// Length in m.
    pub length: f64,
    /// Maximum traction force in N.
    pub max_force: f64,
    /// Maximum braking force in N.
    pub max_brake: f64,
    /// Linear rolling-resistance coefficient (per kg).
    pub resistance_lin: f64,
    /// Quadratic rolling-resistance coefficient (per kg, per (m/s)²).
    pub resistance_qua: f64,
}

impl Train {
    /// Checks that the specification describes a physically meaningful train.
    pub fn validate(&self) -> CoreResult<()> {
        let finite = [
            ("mass", self.mass),
            ("mass factor", self.mass_factor),
            ("length", self.length),
            ("max force", self.max_force),
            ("max brake", self.max_brake),
            ("linear resistance", self.resistance_lin),
            ("quadratic resistance", self.resistance_qua),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(CoreError::InvalidTrain(format!("{name} is {value}")));
        }
        if self.mass <= 0.0 {
            return Err(CoreError::InvalidTrain(format!(
                "mass must be positive, got {}",
                self.mass
            )));
        }
        if self.mass_factor < 1.0 {
            return Err(CoreError::InvalidTrain(format!(
                "mass factor must be at least 1, got {}",
                self.mass_factor
            )));
        }
        if self.length < 0.0 {
            return Err(CoreError::InvalidTrain(format!(
                "length must not be negative, got {}",
                self.length
            )));
        }
        if self.max_force < 0.0 || self.max_brake < 0.0 {
            return Err(CoreError::InvalidTrain(format!(
                "force limits must not be negative, got traction {} and brake {}",
                self.max_force, self.max_brake
            )));
        }
        if self.resistance_lin < 0.0 || self.resistance_qua < 0.0 {
            return Err(CoreError::InvalidTrain(
                "resistance coefficients must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_train() -> Train {
        Train {
            id: 1,
            mass: 5.07e5,
            mass_factor: 1.06,
            length: 75.0,
            max_force: 3e5,
            max_brake: 4.475e5,
            resistance_lin: 0.014 / 5.07e5,
            resistance_qua: 2.564e-5 / 5.07e5,
        }
    }

    #[test]
    fn test_reference_train_is_valid() {
        assert!(reference_train().validate().is_ok());
    }

    #[test]
    fn test_default_train_is_rejected() {
        assert!(matches!(
            Train::default().validate(),
            Err(CoreError::InvalidTrain(_))
        ));
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let train = Train {
            max_force: f64::NAN,
            ..reference_train()
        };
        assert!(train.validate().is_err());
    }

    #[test]
    fn test_mass_factor_below_one_is_rejected() {
        let train = Train {
            mass_factor: 0.9,
            ..reference_train()
        };
        assert!(train.validate().is_err());
    }

    #[test]
    fn test_json_uses_camel_case() {
        let json = serde_json::to_value(reference_train()).unwrap();
        assert_eq!(json["massFactor"], 1.06);
        assert_eq!(json["maxBrake"], 4.475e5);
    }
}
