use serde_json::Value;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Missing field: {field}")]
    MissingField { field: &'static str },
    #[error("Field {field} has unexpected value {value}")]
    InvalidField { field: &'static str, value: Value },
    #[error("Flow record is not a json object")]
    NotAnObject,
    #[error("Serde json conversion error: {0:?}")]
    SerdeJson(#[from] serde_json::Error),
}
