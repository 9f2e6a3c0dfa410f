//! Feature Engineering Engine
//!
//! Turns the six user supplied values (machine type plus five sensor
//! readings) into the ordered feature vector the failure models expect.

mod encoder;
mod error;
mod observation;
mod schema;

pub use encoder::{encode, ENCODED_COLUMNS, TYPE_L, TYPE_M};
pub use error::EncodeError;
pub use observation::{
    MachineType, RawObservation, RawValue, SensorReadings, AIR_TEMPERATURE, PROCESS_TEMPERATURE,
    ROTATIONAL_SPEED, TOOL_WEAR, TORQUE,
};
pub use schema::{FeatureVector, Schema};
