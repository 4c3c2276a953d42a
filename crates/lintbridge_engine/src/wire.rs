//! MessagePack payloads exchanged with engine exports.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Input of the `process` export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRequest {
    /// Absolute paths of the files to check.
    pub files: Vec<String>,
}

/// Input of the class path binding export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassPathRequest {
    pub class_path: Vec<String>,
}

/// Encodes a payload with named fields.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, String> {
    rmp_serde::to_vec_named(value).map_err(|e| e.to_string())
}

/// Decodes a payload.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, String> {
    rmp_serde::from_slice(bytes).map_err(|e| e.to_string())
}
