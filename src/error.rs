//! Error types for NACH file generation and parsing.

use thiserror::Error;

/// Result type alias for NACH operations
pub type Result<T> = std::result::Result<T, NachError>;

/// Errors that can occur while building, generating or parsing a NACH file.
#[derive(Error, Debug)]
pub enum NachError {
    /// A required field has no value
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Addenda type code outside the accepted set
    #[error("Invalid addenda type code: '{code}'")]
    InvalidAddendaTypeCode { code: String },

    /// Entry transaction code outside the accepted set
    #[error("Invalid transaction code: '{code}'")]
    InvalidTransactionCode { code: String },

    /// Batch service class code outside the accepted set
    #[error("Invalid service class code: '{code}'")]
    InvalidServiceClassCode { code: String },

    /// Batch standard entry class code outside the accepted set
    #[error("Invalid standard entry class code: '{code}'")]
    InvalidStandardEntryClass { code: String },

    /// Routing number whose check digit does not match
    #[error("Invalid routing number: '{routing}'")]
    InvalidRoutingNumber { routing: String },

    /// Field value wider than its column window
    #[error("Field {field} is {length} characters, maximum is {width}")]
    FieldTooLong {
        field: String,
        width: usize,
        length: usize,
    },

    /// Field value does not match its declared data type
    #[error("Field {field} has invalid value '{value}' for its type")]
    InvalidFieldType { field: String, value: String },

    /// Field name not part of the record layout
    #[error("Unknown field '{field}' for {record}")]
    UnknownField { record: String, field: String },

    /// Structural parse failure
    #[error("Parse error: {0}")]
    Parse(String),

    /// A parsed record could not be rebuilt into an entity
    #[error("Invalid record at line {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// Failed to read or write a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Monetary amount that cannot be expressed in whole minor units
    #[error("Invalid amount: '{0}'")]
    InvalidAmount(String),

    /// Required configuration value is not set
    #[error("Missing configuration: {0} is not set")]
    MissingConfig(String),

    /// Configuration value that cannot be interpreted
    #[error("Invalid configuration: {key}='{value}'")]
    InvalidConfig { key: String, value: String },

    /// Missing command-line argument
    #[error("Missing argument. Usage: nach-file <generate|parse> <input>")]
    MissingArgument,

    /// Unrecognised CLI command
    #[error("Unknown command '{0}'. Expected 'generate' or 'parse'")]
    UnknownCommand(String),
}

impl NachError {
    /// Returns `true` for failures raised while parsing file text.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, NachError::Parse(_) | NachError::InvalidRecord { .. })
    }
}
