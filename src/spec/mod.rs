//! The validated schema descriptor for a whole record.
//!
//! A [`DimensionsSpec`] is immutable once built. Every construction path, including the
//! `with_*` derivations, copies its inputs, sorts the dimensions by name, and re-runs
//! validation, so a spec that exists is always a valid one:
//!
//! - no name is both a dimension and an exclusion
//! - names within each collection are non-empty and unique
//! - dimensions are in ascending name order
//!
//! ```rust
//! use dimensions_spec::spec::DimensionsSpec;
//! use dimensions_spec::types::DimensionSchema;
//!
//! # fn main() -> Result<(), dimensions_spec::SchemaError> {
//! let spec = DimensionsSpec::new(
//!     vec![
//!         DimensionSchema::new("zeta", "string"),
//!         DimensionSchema::new("alpha", "float"),
//!     ],
//!     ["beta"],
//!     vec![],
//! )?;
//! let names: Vec<&str> = spec.dimension_names().collect();
//! assert_eq!(names, ["alpha", "zeta"]);
//!
//! let wider = spec.with_dimension_exclusions(["gamma"])?;
//! assert!(wider.is_excluded("beta") && wider.is_excluded("gamma"));
//! assert!(!spec.is_excluded("gamma"));
//! # Ok(())
//! # }
//! ```

pub mod fields;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};
use crate::types::{DimensionSchema, DimensionType, SpatialDimensionSchema};

pub use fields::validate_fields;

/// Dimensions, exclusions, and spatial dimensions of an ingested record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDimensionsSpec", rename_all = "camelCase")]
pub struct DimensionsSpec {
    dimensions: Vec<DimensionSchema>,
    dimension_exclusions: BTreeSet<String>,
    spatial_dimensions: Vec<SpatialDimensionSchema>,
}

impl DimensionsSpec {
    /// Build and validate a spec.
    ///
    /// Dimensions are sorted by name (stable) and exclusions are deduplicated before validation.
    pub fn new<E, S>(
        dimensions: Vec<DimensionSchema>,
        dimension_exclusions: E,
        spatial_dimensions: Vec<SpatialDimensionSchema>,
    ) -> SchemaResult<Self>
    where
        E: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut dimensions = dimensions;
        dimensions.sort_by(|a, b| a.name().cmp(b.name()));

        let spec = Self {
            dimensions,
            dimension_exclusions: dimension_exclusions.into_iter().map(Into::into).collect(),
            spatial_dimensions,
        };
        spec.verify()?;
        Ok(spec)
    }

    /// A spec with only declared dimensions.
    pub fn from_dimensions(dimensions: Vec<DimensionSchema>) -> SchemaResult<Self> {
        Self::new(dimensions, Vec::<String>::new(), Vec::new())
    }

    fn verify(&self) -> SchemaResult<()> {
        let overlap: BTreeSet<&str> = self
            .dimension_names()
            .filter(|name| self.dimension_exclusions.contains(*name))
            .collect();
        if !overlap.is_empty() {
            return Err(SchemaError::SchemaConflict {
                names: overlap.into_iter().map(str::to_string).collect(),
            });
        }

        validate_fields("dimensions", self.dimension_names())?;
        validate_fields("dimension exclusions", &self.dimension_exclusions)?;
        validate_fields(
            "spatial dimensions",
            self.spatial_dimensions.iter().map(|s| s.dim_name.as_str()),
        )?;
        Ok(())
    }

    /// Declared dimensions, sorted by name.
    pub fn dimensions(&self) -> &[DimensionSchema] {
        &self.dimensions
    }

    pub fn dimension_exclusions(&self) -> &BTreeSet<String> {
        &self.dimension_exclusions
    }

    pub fn spatial_dimensions(&self) -> &[SpatialDimensionSchema] {
        &self.spatial_dimensions
    }

    /// Returns `true` if any dimensions were declared.
    ///
    /// When this is `false`, row construction falls back to discovering dimensions from the
    /// event itself.
    pub fn has_custom_dimensions(&self) -> bool {
        !self.dimensions.is_empty()
    }

    /// Iterate declared dimension names in order.
    pub fn dimension_names(&self) -> impl Iterator<Item = &str> {
        self.dimensions.iter().map(|d| d.name())
    }

    /// Returns the declared dimension with this name, if present.
    pub fn dimension_schema(&self, name: &str) -> Option<&DimensionSchema> {
        self.dimensions
            .binary_search_by(|d| d.name().cmp(name))
            .ok()
            .map(|idx| &self.dimensions[idx])
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.dimension_exclusions.contains(name)
    }

    /// Names of dimensions treated as strings: those typed `string` and those with no type.
    pub fn string_dimension_names(&self) -> Vec<String> {
        self.dimensions
            .iter()
            .filter(|d| matches!(d.dimension_type(), Some(DimensionType::String) | None))
            .map(|d| d.name().to_string())
            .collect()
    }

    /// Names of dimensions typed `float`.
    pub fn float_dimension_names(&self) -> Vec<String> {
        self.dimensions
            .iter()
            .filter(|d| d.dimension_type() == Some(DimensionType::Float))
            .map(|d| d.name().to_string())
            .collect()
    }

    /// Returns a new spec with `dimensions` replacing the current ones.
    pub fn with_dimensions(&self, dimensions: Vec<DimensionSchema>) -> SchemaResult<Self> {
        tracing::debug!(count = dimensions.len(), "deriving dimensions spec with new dimensions");
        Self::new(
            dimensions,
            self.dimension_exclusions.iter().cloned(),
            self.spatial_dimensions.clone(),
        )
    }

    /// Returns a new spec whose exclusions are the union of the current ones and `exclusions`.
    ///
    /// Exclusions only ever grow; there is no way to remove one.
    pub fn with_dimension_exclusions<E, S>(&self, exclusions: E) -> SchemaResult<Self>
    where
        E: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let merged: Vec<String> = self
            .dimension_exclusions
            .iter()
            .cloned()
            .chain(exclusions.into_iter().map(Into::into))
            .collect();
        tracing::debug!(count = merged.len(), "deriving dimensions spec with merged exclusions");
        Self::new(self.dimensions.clone(), merged, self.spatial_dimensions.clone())
    }

    /// Returns a new spec with `spatial_dimensions` replacing the current ones.
    pub fn with_spatial_dimensions(
        &self,
        spatial_dimensions: Vec<SpatialDimensionSchema>,
    ) -> SchemaResult<Self> {
        tracing::debug!(
            count = spatial_dimensions.len(),
            "deriving dimensions spec with new spatial dimensions"
        );
        Self::new(
            self.dimensions.clone(),
            self.dimension_exclusions.iter().cloned(),
            spatial_dimensions,
        )
    }
}

/// Wire shape of a [`DimensionsSpec`] before validation. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawDimensionsSpec {
    pub(crate) dimensions: Vec<DimensionSchema>,
    pub(crate) dimension_exclusions: Vec<String>,
    pub(crate) spatial_dimensions: Vec<SpatialDimensionSchema>,
}

impl TryFrom<RawDimensionsSpec> for DimensionsSpec {
    type Error = SchemaError;

    fn try_from(raw: RawDimensionsSpec) -> Result<Self, Self::Error> {
        Self::new(raw.dimensions, raw.dimension_exclusions, raw.spatial_dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dims(names: &[&str]) -> Vec<DimensionSchema> {
        names.iter().map(|n| DimensionSchema::new(*n, "string")).collect()
    }

    #[test]
    fn sorts_dimensions_on_construction() {
        let spec = DimensionsSpec::from_dimensions(dims(&["c", "a", "b"])).unwrap();
        assert_eq!(spec.dimension_names().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert!(spec.has_custom_dimensions());
    }

    #[test]
    fn default_spec_is_empty_and_valid() {
        let spec = DimensionsSpec::default();
        assert!(!spec.has_custom_dimensions());
        assert!(spec.dimension_exclusions().is_empty());
        assert!(spec.spatial_dimensions().is_empty());
        assert_eq!(spec, DimensionsSpec::new(vec![], Vec::<String>::new(), vec![]).unwrap());
    }

    #[test]
    fn conflict_lists_every_overlapping_name() {
        let err = DimensionsSpec::new(dims(&["a", "b", "c"]), ["c", "a", "z"], vec![]).unwrap_err();
        match err {
            SchemaError::SchemaConflict { names } => assert_eq!(names, ["a", "c"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_exclusions_collapse_into_a_set() {
        let spec = DimensionsSpec::new(vec![], ["x", "x", "y"], vec![]).unwrap();
        assert_eq!(spec.dimension_exclusions().len(), 2);
    }

    #[test]
    fn duplicate_dimensions_are_rejected() {
        let err = DimensionsSpec::from_dimensions(vec![
            DimensionSchema::new("a", "string"),
            DimensionSchema::new("a", "float"),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidFieldName { .. }));
    }

    #[test]
    fn duplicate_spatial_dimensions_are_rejected() {
        let err = DimensionsSpec::new(
            vec![],
            Vec::<String>::new(),
            vec![
                SpatialDimensionSchema::new("geo", ["lat", "lon"]),
                SpatialDimensionSchema::new("geo", ["x", "y"]),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate spatial dimensions entries"));
    }

    #[test]
    fn spatial_names_may_repeat_dimension_names() {
        let spec = DimensionsSpec::new(
            dims(&["geo"]),
            Vec::<String>::new(),
            vec![SpatialDimensionSchema::new("geo", ["lat", "lon"])],
        )
        .unwrap();
        assert_eq!(spec.spatial_dimensions().len(), 1);
    }

    #[test]
    fn empty_names_sort_first_and_are_rejected() {
        let mut input = dims(&["b", "a"]);
        input.push(DimensionSchema::new("", "string"));
        let err = DimensionsSpec::from_dimensions(input).unwrap_err();
        assert!(err.to_string().contains("dimensions entry 0 has an empty name"));
    }

    #[test]
    fn with_dimensions_resorts_and_keeps_the_rest() {
        let spec = DimensionsSpec::new(
            dims(&["a"]),
            ["ex"],
            vec![SpatialDimensionSchema::new("geo", ["lat", "lon"])],
        )
        .unwrap();
        let next = spec.with_dimensions(dims(&["z", "m"])).unwrap();
        assert_eq!(next.dimension_names().collect::<Vec<_>>(), ["m", "z"]);
        assert_eq!(next.dimension_exclusions(), spec.dimension_exclusions());
        assert_eq!(next.spatial_dimensions(), spec.spatial_dimensions());
        assert_eq!(spec.dimension_names().collect::<Vec<_>>(), ["a"]);
    }

    #[test]
    fn with_dimensions_revalidates() {
        let spec = DimensionsSpec::new(dims(&["a"]), ["ex"], vec![]).unwrap();
        let err = spec.with_dimensions(dims(&["ex"])).unwrap_err();
        assert!(matches!(err, SchemaError::SchemaConflict { .. }));
    }

    #[test]
    fn with_dimension_exclusions_is_monotonic_and_idempotent() {
        let spec = DimensionsSpec::new(dims(&["a"]), ["x"], vec![]).unwrap();
        let once = spec.with_dimension_exclusions(["y", "z"]).unwrap();
        let twice = once.with_dimension_exclusions(["y", "z"]).unwrap();

        for name in spec.dimension_exclusions().iter().map(String::as_str).chain(["y", "z"]) {
            assert!(once.is_excluded(name), "missing exclusion {name}");
        }
        assert_eq!(once, twice);
        assert_eq!(spec.dimension_exclusions().len(), 1);
    }

    #[test]
    fn with_dimension_exclusions_rejects_overlap_with_dimensions() {
        let spec = DimensionsSpec::from_dimensions(dims(&["a"])).unwrap();
        let err = spec.with_dimension_exclusions(["a"]).unwrap_err();
        assert!(matches!(err, SchemaError::SchemaConflict { ref names } if names == &["a"]));
    }

    #[test]
    fn with_spatial_dimensions_replaces_them() {
        let spec = DimensionsSpec::new(
            dims(&["a"]),
            Vec::<String>::new(),
            vec![SpatialDimensionSchema::new("geo", ["lat", "lon"])],
        )
        .unwrap();
        let next = spec
            .with_spatial_dimensions(vec![SpatialDimensionSchema::new("pos", ["x", "y"])])
            .unwrap();
        assert_eq!(next.spatial_dimensions()[0].dim_name, "pos");
        assert_eq!(spec.spatial_dimensions()[0].dim_name, "geo");
    }

    #[test]
    fn resolves_string_and_float_dimension_lists() {
        let spec = DimensionsSpec::from_dimensions(vec![
            DimensionSchema::new("price", "float"),
            DimensionSchema::new("page", "string"),
            DimensionSchema::new("country", "bogus"),
        ])
        .unwrap();
        assert_eq!(spec.string_dimension_names(), ["country", "page"]);
        assert_eq!(spec.float_dimension_names(), ["price"]);
        assert_eq!(
            spec.dimension_schema("price").and_then(|d| d.dimension_type()),
            Some(DimensionType::Float)
        );
        assert!(spec.dimension_schema("missing").is_none());
    }

    #[test]
    fn deserialization_runs_validation() {
        let ok: DimensionsSpec = serde_json::from_value(json!({
            "dimensions": [{"name": "b", "type": "string"}, {"name": "a", "type": "float"}],
            "dimensionExclusions": ["c"]
        }))
        .unwrap();
        assert_eq!(ok.dimension_names().collect::<Vec<_>>(), ["a", "b"]);

        let err = serde_json::from_value::<DimensionsSpec>(json!({
            "dimensions": ["a"],
            "dimensionExclusions": ["a"]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("cannot overlap"));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let spec = DimensionsSpec::new(
            dims(&["a"]),
            ["x"],
            vec![SpatialDimensionSchema::new("geo", ["lat", "lon"])],
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({
                "dimensions": [{"name": "a", "type": "string"}],
                "dimensionExclusions": ["x"],
                "spatialDimensions": [{"dimName": "geo", "dims": ["lat", "lon"]}]
            })
        );
    }
}
