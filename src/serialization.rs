//! Persistence of parameters and calibrated components.
//!
//! With the `serde` feature every params struct, every feature filter and
//! the spike coders implement `Serialize` and `Deserialize`, and through the
//! blanket [`Serializable`] trait can be written as JSON or bincode.
//!
//! # Example
//!
//! ```rust
//! use resin::prelude::*;
//!
//! let params = InputEncoderParams {
//!     fields: vec![FieldParams::external("x").routed()],
//!     ..Default::default()
//! };
//! let json = params.to_json().unwrap();
//! let restored = InputEncoderParams::from_json(&json).unwrap();
//! assert_eq!(restored, params);
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{ResinError, Result};
use crate::input::InputEncoderParams;

/// On-disk representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerializableFormat {
    /// Compact bincode encoding.
    #[default]
    Binary,
    /// Pretty printed JSON, suited for hand-edited configuration.
    Json,
}

impl SerializableFormat {
    /// Picks the format from a file extension: `json` (any case) selects
    /// JSON, everything else binary.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SerializableFormat::Json,
            _ => SerializableFormat::Binary,
        }
    }
}

impl std::fmt::Display for SerializableFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerializableFormat::Binary => write!(f, "binary"),
            SerializableFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for SerializableFormat {
    type Err = ResinError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "binary" | "bin" | "bincode" => Ok(SerializableFormat::Binary),
            "json" => Ok(SerializableFormat::Json),
            _ => Err(ResinError::Configuration {
                name: "format",
                message: format!("Unknown format '{s}', expected binary or json"),
            }),
        }
    }
}

fn serialization_error(action: &str, format: SerializableFormat, err: impl std::fmt::Display) -> ResinError {
    ResinError::Serialization {
        message: format!("{format} {action} failed: {err}"),
    }
}

/// Save/load interface implemented for every serde type.
pub trait Serializable: Serialize + DeserializeOwned + Sized {
    /// Encodes into a byte vector.
    fn to_bytes(&self, format: SerializableFormat) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.save(&mut bytes, format)?;
        Ok(bytes)
    }

    /// Decodes from a byte slice.
    fn from_bytes(bytes: &[u8], format: SerializableFormat) -> Result<Self> {
        Self::load(bytes, format)
    }

    /// Encodes as a JSON string.
    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| serialization_error("encoding", SerializableFormat::Json, e))
    }

    /// Decodes from a JSON string.
    fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| serialization_error("decoding", SerializableFormat::Json, e))
    }

    /// Writes into a writer.
    fn save<W: Write>(&self, writer: W, format: SerializableFormat) -> Result<()> {
        let mut writer = BufWriter::new(writer);
        match format {
            SerializableFormat::Binary => bincode::serialize_into(&mut writer, self)
                .map_err(|e| serialization_error("encoding", format, e))?,
            SerializableFormat::Json => serde_json::to_writer_pretty(&mut writer, self)
                .map_err(|e| serialization_error("encoding", format, e))?,
        }
        writer.flush().map_err(|e| ResinError::Io {
            message: format!("Failed to flush output: {e}"),
        })
    }

    /// Reads from a reader.
    fn load<R: Read>(reader: R, format: SerializableFormat) -> Result<Self> {
        let reader = BufReader::new(reader);
        match format {
            SerializableFormat::Binary => bincode::deserialize_from(reader)
                .map_err(|e| serialization_error("decoding", format, e)),
            SerializableFormat::Json => serde_json::from_reader(reader)
                .map_err(|e| serialization_error("decoding", format, e)),
        }
    }

    /// Writes into a file; the format follows the file extension.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| ResinError::Io {
            message: format!("Failed to create {}: {e}", path.display()),
        })?;
        self.save(file, SerializableFormat::from_path(path))
    }

    /// Reads from a file; the format follows the file extension.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ResinError::Io {
            message: format!("Failed to open {}: {e}", path.display()),
        })?;
        Self::load(file, SerializableFormat::from_path(path))
    }
}

impl<T> Serializable for T where T: Serialize + DeserializeOwned + Sized {}

impl InputEncoderParams {
    /// Loads encoder parameters from a file and validates them.
    ///
    /// Content that does not decode into valid parameters, such as an
    /// inverted interval, is reported as a configuration error.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self> {
        let params = Self::load_from_file(path).map_err(|e| match e {
            ResinError::Serialization { message } => ResinError::Configuration {
                name: "params",
                message,
            },
            other => other,
        })?;
        params.validate()?;
        Ok(params)
    }
}
