//! File header configuration read from the environment.

use crate::error::{NachError, Result};
use crate::file::FileOptions;
use std::env;

pub const ENV_IMMEDIATE_DESTINATION: &str = "NACH_IMMEDIATE_DESTINATION";
pub const ENV_IMMEDIATE_ORIGIN: &str = "NACH_IMMEDIATE_ORIGIN";
pub const ENV_DESTINATION_NAME: &str = "NACH_DESTINATION_NAME";
pub const ENV_ORIGIN_NAME: &str = "NACH_ORIGIN_NAME";
pub const ENV_REFERENCE_CODE: &str = "NACH_REFERENCE_CODE";
pub const ENV_FILE_ID_MODIFIER: &str = "NACH_FILE_ID_MODIFIER";
pub const ENV_BATCH_SEQUENCE_START: &str = "NACH_BATCH_SEQUENCE_START";

/// Settings for the file header of a generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
    pub immediate_destination: String,
    pub immediate_origin: String,
    pub destination_name: Option<String>,
    pub origin_name: Option<String>,
    pub reference_code: Option<String>,
    pub file_id_modifier: Option<String>,
    pub batch_sequence_start: Option<u64>,
}

impl FileConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required =
            |key: &str| optional(key).ok_or_else(|| NachError::MissingConfig(key.to_string()));

        let batch_sequence_start = match optional(ENV_BATCH_SEQUENCE_START) {
            Some(value) => Some(value.parse().map_err(|_| NachError::InvalidConfig {
                key: ENV_BATCH_SEQUENCE_START.to_string(),
                value,
            })?),
            None => None,
        };

        Ok(FileConfig {
            immediate_destination: required(ENV_IMMEDIATE_DESTINATION)?,
            immediate_origin: required(ENV_IMMEDIATE_ORIGIN)?,
            destination_name: optional(ENV_DESTINATION_NAME),
            origin_name: optional(ENV_ORIGIN_NAME),
            reference_code: optional(ENV_REFERENCE_CODE),
            file_id_modifier: optional(ENV_FILE_ID_MODIFIER),
            batch_sequence_start,
        })
    }

    /// File construction options carrying these settings.
    pub fn file_options(&self) -> FileOptions {
        FileOptions {
            immediate_destination: Some(self.immediate_destination.clone()),
            immediate_origin: Some(self.immediate_origin.clone()),
            immediate_destination_name: self.destination_name.clone(),
            immediate_origin_name: self.origin_name.clone(),
            reference_code: self.reference_code.clone(),
            file_id_modifier: self.file_id_modifier.clone(),
            batch_sequence_number: self.batch_sequence_start,
            ..Default::default()
        }
    }
}
