//! JSON parsing for dimensions specs.
//!
//! Accepted shape (every key optional):
//!
//! ```json
//! {
//!   "dimensions": [{"name": "page", "type": "string"}, {"name": "price", "type": "float"}, "user"],
//!   "dimensionExclusions": ["timestamp"],
//!   "spatialDimensions": [{"dimName": "coord", "dims": ["lat", "lon"]}]
//! }
//! ```
//!
//! A dimension given as a bare string is a string dimension.

use std::fs;
use std::path::Path;

use crate::error::{SchemaError, SchemaResult};
use crate::spec::{DimensionsSpec, RawDimensionsSpec};

/// Parse a dimensions spec from a JSON file.
pub fn parse_dimensions_spec_from_path(
    path: impl AsRef<Path>,
    reject_unknown_types: bool,
) -> SchemaResult<DimensionsSpec> {
    let text = fs::read_to_string(path)?;
    parse_dimensions_spec_from_str(&text, reject_unknown_types)
}

/// Parse a dimensions spec from JSON text.
///
/// Structural problems surface as [`SchemaError::Json`]; validation problems keep their own
/// variants ([`SchemaError::SchemaConflict`], [`SchemaError::InvalidFieldName`]). When
/// `reject_unknown_types` is set, a dimension with an unrecognized type fails with
/// [`SchemaError::UnknownType`] instead of being left untyped.
pub fn parse_dimensions_spec_from_str(
    input: &str,
    reject_unknown_types: bool,
) -> SchemaResult<DimensionsSpec> {
    let raw: RawDimensionsSpec = serde_json::from_str(input)?;

    if reject_unknown_types {
        if let Some(rejected) = raw.dimensions.iter().find_map(|d| d.rejected_type()) {
            return Err(SchemaError::UnknownType {
                name: rejected.to_string(),
            });
        }
    }

    DimensionsSpec::try_from(raw)
}
