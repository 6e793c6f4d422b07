use thiserror::Error;

use crate::types::DimensionType;

/// Convenience result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Error type returned when building, deriving, or loading a dimensions spec.
///
/// This is a single error enum shared by the model types and the config loaders.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A type name is not one of the supported [`DimensionType`]s.
    #[error("unknown dimension type '{name}'")]
    UnknownType { name: String },

    /// A value could not be coerced into the requested [`DimensionType`].
    #[error("cannot coerce value to {dimension_type}: {message} (raw='{raw}')")]
    TypeCoercion {
        dimension_type: DimensionType,
        raw: String,
        message: String,
    },

    /// One or more names are declared both as dimensions and as exclusions.
    #[error("dimensions and dimension exclusions cannot overlap: {}", names.join(", "))]
    SchemaConflict { names: Vec<String> },

    /// A collection of field names contains an empty or duplicated name.
    #[error("invalid field name: {message}")]
    InvalidFieldName { message: String },

    /// Underlying I/O error while reading a config file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The config text is not valid JSON or does not have the expected shape.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
