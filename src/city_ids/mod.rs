//! Stable, human-readable city identifiers.
//!
//! A city id looks like `city_<normalized name>_<4 digit code>`. The code comes
//! from SHA-256 of the original name, so it is the same on every machine and
//! every run.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

pub const CITY_ID_FIELD: &str = "cityId";
pub const NAME_FIELD: &str = "name";

#[derive(Debug, Error)]
pub enum CityIdError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path:?}: {source}")]
    Json {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("City collection must be a JSON array of objects")]
    NotAnArray,

    #[error("City record {index} has no string \"name\" field")]
    MissingName { index: usize },
}

/// Lowercases and replaces spaces and hyphens with underscores.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace([' ', '-'], "_")
}

/// Four digit code derived from the first 8 bytes of SHA-256(name), big endian, mod 10000.
pub fn name_code(name: &str) -> u16 {
    let digest = Sha256::digest(name.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(prefix) % 10_000) as u16
}

pub fn derive_city_id(name: &str) -> String {
    format!("city_{}_{:04}", normalize_name(name), name_code(name))
}

/// Sets `cityId` on every record. All records are checked before any is touched,
/// so a malformed collection is left exactly as it was.
///
/// Returns the `(name, cityId)` pairs in collection order.
pub fn assign_city_ids(records: &mut [Value]) -> Result<Vec<(String, String)>, CityIdError> {
    let mut names = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let name = record
            .get(NAME_FIELD)
            .and_then(Value::as_str)
            .ok_or(CityIdError::MissingName { index })?;
        names.push(name.to_string());
    }

    let mut assigned = Vec::with_capacity(records.len());
    for (record, name) in records.iter_mut().zip(names) {
        let city_id = derive_city_id(&name);
        // checked above: every record is an object with a name
        if let Value::Object(fields) = record {
            fields.insert(CITY_ID_FIELD.to_string(), Value::String(city_id.clone()));
        }
        assigned.push((name, city_id));
    }
    Ok(assigned)
}

/// Reads the city collection at `path`, assigns ids and rewrites the file in place.
///
/// The file is replaced atomically: the new content goes to a temporary file in
/// the same directory which is then renamed over the original.
pub fn assign_city_ids_in_file(path: &Path) -> Result<Vec<(String, String)>, CityIdError> {
    let io_error = |source| CityIdError::Io {
        path: path.to_path_buf(),
        source,
    };

    let content = std::fs::read_to_string(path).map_err(io_error)?;
    let document: Value = serde_json::from_str(&content).map_err(|source| CityIdError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let Value::Array(mut records) = document else {
        return Err(CityIdError::NotAnArray);
    };

    let assigned = assign_city_ids(&mut records)?;

    let output = serde_json::to_string_pretty(&records).map_err(|source| CityIdError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_error)?;
    tmp.write_all(output.as_bytes()).map_err(io_error)?;
    tmp.persist(path).map_err(|e| io_error(e.error))?;

    Ok(assigned)
}

/// Minimal view of a city record, as read by consumers of the collection.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CityRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "cityId", default)]
    pub city_id: Option<String>,
}

impl CityRef {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.city_id.as_deref())
            .unwrap_or("<unnamed>")
    }
}

pub fn load_city_refs(path: &Path) -> Result<Vec<CityRef>, CityIdError> {
    let content = std::fs::read_to_string(path).map_err(|source| CityIdError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CityIdError::Json {
        path: path.to_path_buf(),
        source,
    })
}
