//! Data Validator for Range Checking

use crate::error::ValidationError;
use feature_engine::{
    SensorReadings, AIR_TEMPERATURE, PROCESS_TEMPERATURE, ROTATIONAL_SPEED, TOOL_WEAR, TORQUE,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inclusive value range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether a value lies within the range
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Air temperature valid range (K)
    pub air_temperature: Range,
    /// Process temperature valid range (K)
    pub process_temperature: Range,
    /// Rotational speed valid range (rpm)
    pub rotational_speed: Range,
    /// Torque valid range (Nm)
    pub torque: Range,
    /// Tool wear valid range (min)
    pub tool_wear: Range,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            air_temperature: Range::new(200.0, 400.0),
            process_temperature: Range::new(200.0, 450.0),
            rotational_speed: Range::new(0.0, 5000.0),
            torque: Range::new(0.0, 200.0),
            tool_wear: Range::new(0.0, 500.0),
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Convert into the first error, if any
    pub fn into_result(self) -> Result<(), ValidationError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Range validator for machine readings
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: Range,
    ) -> Result<(), ValidationError> {
        if range.contains(value) {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.min,
                max: range.max,
            })
        }
    }

    /// Check every reading, collecting all violations
    pub fn validate(&self, readings: &SensorReadings) -> ValidationResult {
        let checks = [
            (AIR_TEMPERATURE, readings.air_temperature, self.config.air_temperature),
            (PROCESS_TEMPERATURE, readings.process_temperature, self.config.process_temperature),
            (ROTATIONAL_SPEED, readings.rotational_speed as f64, self.config.rotational_speed),
            (TORQUE, readings.torque, self.config.torque),
            (TOOL_WEAR, readings.tool_wear as f64, self.config.tool_wear),
        ];

        let errors: Vec<ValidationError> = checks
            .iter()
            .filter_map(|&(field, value, range)| self.validate_range(field, value, range).err())
            .collect();

        if !errors.is_empty() {
            debug!("{} reading(s) out of range", errors.len());
        }

        ValidationResult {
            valid: errors.is_empty(),
            errors,
            fields_checked: checks.len(),
        }
    }

    /// Get the configured ranges
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn readings() -> SensorReadings {
        SensorReadings {
            air_temperature: 300.0,
            process_temperature: 310.0,
            rotational_speed: 1500,
            torque: 50.0,
            tool_wear: 200,
        }
    }

    #[test]
    fn test_valid_readings() {
        let result = Validator::default().validate(&readings());
        assert!(result.valid);
        assert_eq!(result.fields_checked, 5);
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let validator = Validator::default();
        let edge = SensorReadings {
            air_temperature: 200.0,
            process_temperature: 450.0,
            rotational_speed: 0,
            torque: 200.0,
            tool_wear: 500,
        };
        assert!(validator.validate(&edge).valid);
    }

    #[test]
    fn test_collects_every_violation() {
        let bad = SensorReadings {
            rotational_speed: 9000,
            tool_wear: -1,
            ..readings()
        };
        let result = Validator::default().validate(&bad);

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(
            result.into_result().unwrap_err(),
            ValidationError::OutOfRange {
                field: ROTATIONAL_SPEED,
                value: 9000.0,
                min: 0.0,
                max: 5000.0,
            }
        );
    }

    proptest! {
        #[test]
        fn prop_torque_range(torque in -500.0f64..500.0) {
            let result = Validator::default().validate(&SensorReadings { torque, ..readings() });
            prop_assert_eq!(result.valid, (0.0..=200.0).contains(&torque));
        }
    }
}
