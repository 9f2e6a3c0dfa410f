//! Raw Observations and Typed Readings

use crate::error::EncodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Training column for air temperature
pub const AIR_TEMPERATURE: &str = "Air temperature [K]";
/// Training column for process temperature
pub const PROCESS_TEMPERATURE: &str = "Process temperature [K]";
/// Training column for rotational speed
pub const ROTATIONAL_SPEED: &str = "Rotational speed [rpm]";
/// Training column for torque
pub const TORQUE: &str = "Torque [Nm]";
/// Training column for tool wear
pub const TOOL_WEAR: &str = "Tool wear [min]";

/// Machine quality variant of the monitored equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineType {
    /// Low quality variant
    L,
    /// Medium quality variant
    M,
    /// High quality variant, the baseline with no indicator column
    H,
}

impl MachineType {
    /// All codes, in selector order
    pub const ALL: [MachineType; 3] = [MachineType::L, MachineType::M, MachineType::H];

    /// Parse a user supplied code (trimmed, case-insensitive)
    pub fn parse(input: &str) -> Result<Self, EncodeError> {
        match input.trim().to_uppercase().as_str() {
            "L" => Ok(MachineType::L),
            "M" => Ok(MachineType::M),
            "H" => Ok(MachineType::H),
            _ => Err(EncodeError::InvalidCategory(input.to_string())),
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineType::L => "L",
            MachineType::M => "M",
            MachineType::H => "H",
        }
    }

    /// Value of the `Type_L` indicator
    pub fn type_l(&self) -> f64 {
        if *self == MachineType::L { 1.0 } else { 0.0 }
    }

    /// Value of the `Type_M` indicator
    pub fn type_m(&self) -> f64 {
        if *self == MachineType::M { 1.0 } else { 0.0 }
    }
}

impl fmt::Display for MachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loosely typed reading as it arrives from a form or JSON body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Int(i64),
    Float(f64),
    Text(String),
    /// Any other JSON value (null, bool, array, object); never numeric
    Other(serde_json::Value),
}

impl Default for RawValue {
    /// An absent reading
    fn default() -> Self {
        RawValue::Other(serde_json::Value::Null)
    }
}

impl RawValue {
    /// Coerce to a float
    pub fn to_f64(&self, field: &'static str) -> Result<f64, EncodeError> {
        let value = match self {
            RawValue::Int(v) => *v as f64,
            RawValue::Float(v) => *v,
            RawValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| self.invalid(field, "must be a number"))?,
            RawValue::Other(_) => return Err(self.invalid(field, "must be a number")),
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.invalid(field, "must be finite"))
        }
    }

    /// Coerce to an integer; finite floats truncate toward zero
    pub fn to_i64(&self, field: &'static str) -> Result<i64, EncodeError> {
        match self {
            RawValue::Int(v) => Ok(*v),
            RawValue::Float(v) if v.is_finite() && v.abs() < i64::MAX as f64 => Ok(v.trunc() as i64),
            RawValue::Float(_) => Err(self.invalid(field, "must be a finite integer")),
            RawValue::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| self.invalid(field, "must be an integer")),
            RawValue::Other(_) => Err(self.invalid(field, "must be an integer")),
        }
    }

    fn invalid(&self, field: &'static str, reason: &'static str) -> EncodeError {
        EncodeError::InvalidNumericInput {
            field,
            value: self.to_string(),
            reason,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Int(v) => write!(f, "{}", v),
            RawValue::Float(v) => write!(f, "{}", v),
            RawValue::Text(s) => f.write_str(s),
            RawValue::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Int(v)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Float(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

/// The six values a user submits for one prediction.
///
/// Absent fields deserialize to empty values so they fail on encode with
/// the field named, like any other bad input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawObservation {
    /// Machine type code, validated on encode
    pub machine_type: String,
    /// Air temperature (K)
    pub air_temperature: RawValue,
    /// Process temperature (K)
    pub process_temperature: RawValue,
    /// Rotational speed (rpm), integer valued
    pub rotational_speed: RawValue,
    /// Torque (Nm)
    pub torque: RawValue,
    /// Cumulative tool wear (min), integer valued
    pub tool_wear: RawValue,
}

impl Default for RawObservation {
    fn default() -> Self {
        Self {
            machine_type: String::new(),
            air_temperature: RawValue::default(),
            process_temperature: RawValue::default(),
            rotational_speed: RawValue::default(),
            torque: RawValue::default(),
            tool_wear: RawValue::default(),
        }
    }
}

impl RawObservation {
    /// Create an observation from values
    pub fn new(
        machine_type: impl Into<String>,
        air_temperature: impl Into<RawValue>,
        process_temperature: impl Into<RawValue>,
        rotational_speed: impl Into<RawValue>,
        torque: impl Into<RawValue>,
        tool_wear: impl Into<RawValue>,
    ) -> Self {
        Self {
            machine_type: machine_type.into(),
            air_temperature: air_temperature.into(),
            process_temperature: process_temperature.into(),
            rotational_speed: rotational_speed.into(),
            torque: torque.into(),
            tool_wear: tool_wear.into(),
        }
    }

    /// Validate the machine type
    pub fn machine_type(&self) -> Result<MachineType, EncodeError> {
        MachineType::parse(&self.machine_type)
    }

    /// Coerce the five readings to their numeric types
    pub fn readings(&self) -> Result<SensorReadings, EncodeError> {
        Ok(SensorReadings {
            air_temperature: self.air_temperature.to_f64(AIR_TEMPERATURE)?,
            process_temperature: self.process_temperature.to_f64(PROCESS_TEMPERATURE)?,
            rotational_speed: self.rotational_speed.to_i64(ROTATIONAL_SPEED)?,
            torque: self.torque.to_f64(TORQUE)?,
            tool_wear: self.tool_wear.to_i64(TOOL_WEAR)?,
        })
    }
}

/// The five readings after numeric coercion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReadings {
    pub air_temperature: f64,
    pub process_temperature: f64,
    pub rotational_speed: i64,
    pub torque: f64,
    pub tool_wear: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_type_normalization() {
        assert_eq!(MachineType::parse("l").unwrap(), MachineType::L);
        assert_eq!(MachineType::parse("  m ").unwrap(), MachineType::M);
        assert_eq!(MachineType::parse("H").unwrap(), MachineType::H);
    }

    #[test]
    fn test_machine_type_rejects_unknown() {
        let err = MachineType::parse("X").unwrap_err();
        assert_eq!(err, EncodeError::InvalidCategory("X".to_string()));
        assert!(MachineType::parse("").is_err());
        assert!(MachineType::parse("LM").is_err());
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(RawValue::Int(300).to_f64(AIR_TEMPERATURE).unwrap(), 300.0);
        assert_eq!(RawValue::from(" 310.5 ").to_f64(AIR_TEMPERATURE).unwrap(), 310.5);
        assert!(RawValue::Float(f64::NAN).to_f64(AIR_TEMPERATURE).is_err());
        assert!(RawValue::from("warm").to_f64(AIR_TEMPERATURE).is_err());
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(RawValue::Float(1500.9).to_i64(ROTATIONAL_SPEED).unwrap(), 1500);
        assert_eq!(RawValue::from("200").to_i64(TOOL_WEAR).unwrap(), 200);
        assert!(RawValue::from("200.5").to_i64(TOOL_WEAR).is_err());
        assert!(RawValue::Float(f64::INFINITY).to_i64(TOOL_WEAR).is_err());
    }

    #[test]
    fn test_invalid_numeric_names_field() {
        let obs = RawObservation::new("L", 300.0, 310.0, 1500, 50.0, "lots");
        match obs.readings().unwrap_err() {
            EncodeError::InvalidNumericInput { field, value, .. } => {
                assert_eq!(field, TOOL_WEAR);
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_raw_value_from_json() {
        let obs: RawObservation = serde_json::from_str(
            r#"{"machine_type":"m","air_temperature":300,"process_temperature":310.2,
                "rotational_speed":"1500","torque":42.5,"tool_wear":10}"#,
        )
        .unwrap();

        assert_eq!(obs.air_temperature, RawValue::Int(300));
        assert_eq!(obs.rotational_speed, RawValue::Text("1500".to_string()));
        let readings = obs.readings().unwrap();
        assert_eq!(readings.rotational_speed, 1500);
        assert_eq!(readings.process_temperature, 310.2);
    }

    #[test]
    fn test_non_numeric_json_reading_names_field() {
        let obs: RawObservation = serde_json::from_str(
            r#"{"machine_type":"L","air_temperature":true,"process_temperature":310.0,
                "rotational_speed":1500,"torque":50.0,"tool_wear":null}"#,
        )
        .unwrap();

        assert_eq!(obs.tool_wear, RawValue::Other(serde_json::Value::Null));
        match obs.readings().unwrap_err() {
            EncodeError::InvalidNumericInput { field, value, .. } => {
                assert_eq!(field, AIR_TEMPERATURE);
                assert_eq!(value, "true");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(obs.tool_wear.to_i64(TOOL_WEAR).is_err());
    }

    #[test]
    fn test_missing_json_fields_fail_on_coercion() {
        let obs: RawObservation = serde_json::from_str(
            r#"{"machine_type":"H","air_temperature":300,"process_temperature":310,
                "rotational_speed":1500,"torque":50}"#,
        )
        .unwrap();
        assert_eq!(obs.readings().unwrap_err().field(), TOOL_WEAR);

        let empty: RawObservation = serde_json::from_str("{}").unwrap();
        assert!(matches!(empty.machine_type(), Err(EncodeError::InvalidCategory(_))));
    }
}
