//! `dimensions-spec` describes which fields of an ingested record are dimensions, what type each
//! dimension has, and which fields are excluded, and turns raw keyed records into rows with a
//! resolved dimension order.
//!
//! The central type is [`spec::DimensionsSpec`], a validated and immutable schema descriptor.
//! Specs are built programmatically or loaded from JSON with [`config::load_dimensions_spec_from_str`]
//! / [`config::load_dimensions_spec_from_path`], and derived into new specs with the `with_*`
//! methods. Each raw record is then wrapped into a [`row::InputRow`].
//!
//! ## Dimension types
//!
//! - [`types::DimensionType::String`]: any value, coerced to its textual form
//! - [`types::DimensionType::Float`]: numeric values only, narrowed to `f32`
//!
//! A dimension declared with an unknown type name is kept with no type (see
//! [`types::DimensionSchema::rejected_type`]) unless [`config::LoadOptions::reject_unknown_types`]
//! is set.
//!
//! ## Example
//!
//! ```rust
//! use dimensions_spec::row::InputRow;
//! use dimensions_spec::spec::DimensionsSpec;
//! use dimensions_spec::types::{DimensionSchema, DimensionValue};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), dimensions_spec::SchemaError> {
//! let spec = DimensionsSpec::new(
//!     vec![
//!         DimensionSchema::new("page", "string"),
//!         DimensionSchema::new("latency", "float"),
//!     ],
//!     ["request_id"],
//!     vec![],
//! )?;
//!
//! let event = json!({"page": "/home", "latency": 12.5, "request_id": "r-1"});
//! let row = InputRow::from_spec(1_700_000_000_000_i64, &spec, event.as_object().cloned().unwrap_or_default());
//!
//! assert_eq!(row.dimensions(), ["page", "latency"]);
//! let values = row.coerced_dimensions()?;
//! assert_eq!(values[1].1, Some(DimensionValue::Float(12.5)));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: dimension types, dimension and spatial dimension declarations
//! - [`spec`]: the validated [`spec::DimensionsSpec`] and field-name validation
//! - [`row`]: row normalization
//! - [`config`]: JSON loading with observer hooks
//! - [`error`]: error type shared across the crate

pub mod config;
pub mod error;
pub mod row;
pub mod spec;
pub mod types;

pub use error::{SchemaError, SchemaResult};
