//! Feature Encoder
//!
//! Maps a raw observation onto the schema the failure models were trained
//! with. The machine type is one-hot encoded with `H` as the implicit
//! baseline: only `Type_L` and `Type_M` exist as columns.

use crate::error::EncodeError;
use crate::observation::{
    RawObservation, AIR_TEMPERATURE, PROCESS_TEMPERATURE, ROTATIONAL_SPEED, TOOL_WEAR, TORQUE,
};
use crate::schema::{FeatureVector, Schema};
use tracing::trace;

/// Indicator column for machine type L
pub const TYPE_L: &str = "Type_L";
/// Indicator column for machine type M
pub const TYPE_M: &str = "Type_M";

/// Every column the encoder produces, in training order
pub const ENCODED_COLUMNS: [&str; 7] = [
    AIR_TEMPERATURE,
    PROCESS_TEMPERATURE,
    ROTATIONAL_SPEED,
    TORQUE,
    TOOL_WEAR,
    TYPE_L,
    TYPE_M,
];

/// Encode a raw observation against a schema.
///
/// The output has exactly the schema's names in the schema's order. Schema
/// names the encoder does not produce are zero; produced names the schema
/// lacks are dropped.
pub fn encode(observation: &RawObservation, schema: &Schema) -> Result<FeatureVector, EncodeError> {
    let machine_type = observation.machine_type()?;
    let readings = observation.readings()?;

    let row: [(&str, f64); 7] = [
        (AIR_TEMPERATURE, readings.air_temperature),
        (PROCESS_TEMPERATURE, readings.process_temperature),
        (ROTATIONAL_SPEED, readings.rotational_speed as f64),
        (TORQUE, readings.torque),
        (TOOL_WEAR, readings.tool_wear as f64),
        (TYPE_L, machine_type.type_l()),
        (TYPE_M, machine_type.type_m()),
    ];

    let mut vector = FeatureVector::zeros(schema);
    for (name, value) in row {
        if !vector.set(name, value) {
            trace!("Column '{}' not in schema, dropped", name);
        }
    }

    Ok(vector)
}
