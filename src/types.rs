//! Core data model types for dimension declarations.
//!
//! A [`crate::spec::DimensionsSpec`] is built out of [`DimensionSchema`]s (a name plus an
//! optional [`DimensionType`]) and [`SpatialDimensionSchema`]s.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{SchemaError, SchemaResult};

/// Logical value type of a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DimensionType {
    /// UTF-8 string.
    String,
    /// 32-bit floating point number.
    Float,
}

impl DimensionType {
    /// All supported types, in declaration order.
    pub const ALL: [DimensionType; 2] = [DimensionType::String, DimensionType::Float];

    /// Look up a type by name (case-insensitive).
    pub fn from_name(name: &str) -> SchemaResult<Self> {
        match name.to_ascii_uppercase().as_str() {
            "STRING" => Ok(Self::String),
            "FLOAT" => Ok(Self::Float),
            _ => Err(SchemaError::UnknownType {
                name: name.to_string(),
            }),
        }
    }

    /// Returns `true` if `name` resolves via [`Self::from_name`].
    pub fn is_valid(name: &str) -> bool {
        Self::from_name(name).is_ok()
    }

    /// Canonical (serialized) name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Float => "float",
        }
    }

    /// Coerce a raw event value into this type's representation.
    ///
    /// - [`DimensionType::String`] never fails: JSON strings keep their content, `null` becomes
    ///   `"null"`, anything else becomes its JSON text.
    /// - [`DimensionType::Float`] accepts JSON numbers only and narrows them to `f32`.
    pub fn coerce(&self, value: &serde_json::Value) -> SchemaResult<DimensionValue> {
        match self {
            Self::String => Ok(DimensionValue::String(stringify_value(value))),
            Self::Float => match value {
                serde_json::Value::Number(n) => n
                    .as_f64()
                    .map(|v| DimensionValue::Float(v as f32))
                    .ok_or_else(|| SchemaError::TypeCoercion {
                        dimension_type: *self,
                        raw: value.to_string(),
                        message: "number is not representable as f64".to_string(),
                    }),
                other => Err(SchemaError::TypeCoercion {
                    dimension_type: *self,
                    raw: other.to_string(),
                    message: "expected number".to_string(),
                }),
            },
        }
    }
}

/// Textual form of a raw value, as used for string dimensions.
pub(crate) fn stringify_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for DimensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DimensionType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl Serialize for DimensionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for DimensionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name).map_err(serde::de::Error::custom)
    }
}

/// A dimension value after coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum DimensionValue {
    /// Value of a string dimension.
    String(String),
    /// Value of a float dimension.
    Float(f32),
}

impl DimensionValue {
    /// The type this value was coerced to.
    pub fn dimension_type(&self) -> DimensionType {
        match self {
            Self::String(_) => DimensionType::String,
            Self::Float(_) => DimensionType::Float,
        }
    }
}

impl fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

/// A single declared dimension.
///
/// The type is `None` when the declaration did not name a supported type. Consumers treat such
/// dimensions as "unspecified" rather than failing. The rejected type name is kept for
/// diagnostics and does not take part in equality or hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawDimensionSchema")]
pub struct DimensionSchema {
    name: String,
    #[serde(rename = "type")]
    dimension_type: Option<DimensionType>,
    #[serde(skip)]
    rejected_type: Option<String>,
}

impl DimensionSchema {
    /// Create a dimension from a name and a type name.
    ///
    /// An unrecognized type name leaves the type unset instead of failing.
    pub fn new(name: impl Into<String>, type_name: &str) -> Self {
        let name = name.into();
        match DimensionType::from_name(type_name) {
            Ok(t) => Self::typed(name, t),
            Err(_) => {
                tracing::warn!(
                    dimension = %name,
                    rejected_type = type_name,
                    "unknown dimension type, leaving type unset"
                );
                Self {
                    name,
                    dimension_type: None,
                    rejected_type: Some(type_name.to_string()),
                }
            }
        }
    }

    /// Create a dimension with a known type.
    pub fn typed(name: impl Into<String>, dimension_type: DimensionType) -> Self {
        Self {
            name: name.into(),
            dimension_type: Some(dimension_type),
            rejected_type: None,
        }
    }

    /// Create a dimension whose type is left for later inference.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dimension_type: None,
            rejected_type: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimension_type(&self) -> Option<DimensionType> {
        self.dimension_type
    }

    /// The declared type name that failed to resolve, if any.
    pub fn rejected_type(&self) -> Option<&str> {
        self.rejected_type.as_deref()
    }
}

impl PartialEq for DimensionSchema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.dimension_type == other.dimension_type
    }
}

impl Eq for DimensionSchema {}

impl Hash for DimensionSchema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.dimension_type.hash(state);
    }
}

impl fmt::Display for DimensionSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dimension_type {
            Some(t) => write!(f, "{}:{}", self.name, t),
            None => write!(f, "{}:undefined", self.name),
        }
    }
}

/// Wire shape of a dimension: either a bare name (a string dimension) or an object.
enum RawDimensionSchema {
    Name(String),
    Object {
        name: String,
        dimension_type: Option<String>,
    },
}

impl<'de> Deserialize<'de> for RawDimensionSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawDimensionSchemaVisitor)
    }
}

struct RawDimensionSchemaVisitor;

impl<'de> Visitor<'de> for RawDimensionSchemaVisitor {
    type Value = RawDimensionSchema;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a dimension name or an object with a \"name\" and an optional \"type\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(RawDimensionSchema::Name(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(RawDimensionSchema::Name(v))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut name = None;
        let mut dimension_type = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "name" => {
                    if name.is_some() {
                        return Err(de::Error::duplicate_field("name"));
                    }
                    name = Some(string_field("name", map.next_value()?)?);
                }
                "type" => {
                    if dimension_type.is_some() {
                        return Err(de::Error::duplicate_field("type"));
                    }
                    // explicit null reads as a missing type
                    dimension_type = Some(match map.next_value::<serde_json::Value>()? {
                        serde_json::Value::Null => None,
                        other => Some(string_field("type", other)?),
                    });
                }
                _ => {
                    map.next_value::<de::IgnoredAny>()?;
                }
            }
        }
        let name = name.ok_or_else(|| de::Error::missing_field("name"))?;
        Ok(RawDimensionSchema::Object {
            name,
            dimension_type: dimension_type.flatten(),
        })
    }
}

fn string_field<E: de::Error>(field: &str, value: serde_json::Value) -> Result<String, E> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        other => Err(E::custom(format!(
            "dimension \"{field}\" must be a string, got {other}"
        ))),
    }
}

impl From<RawDimensionSchema> for DimensionSchema {
    fn from(raw: RawDimensionSchema) -> Self {
        match raw {
            RawDimensionSchema::Name(name) => Self::typed(name, DimensionType::String),
            RawDimensionSchema::Object {
                name,
                dimension_type: Some(t),
            } => Self::new(name, &t),
            RawDimensionSchema::Object {
                name,
                dimension_type: None,
            } => Self::untyped(name),
        }
    }
}

/// A spatial dimension: a named dimension built from one or more coordinate fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialDimensionSchema {
    /// Name of the spatial dimension.
    pub dim_name: String,
    /// Coordinate fields the spatial value is assembled from.
    #[serde(default)]
    pub dims: Vec<String>,
}

impl SpatialDimensionSchema {
    /// Create a new spatial dimension.
    pub fn new<I, S>(dim_name: impl Into<String>, dims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dim_name: dim_name.into(),
            dims: dims.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_name_is_case_insensitive() {
        for name in ["STRING", "string", "String", "sTrInG"] {
            assert_eq!(DimensionType::from_name(name).unwrap(), DimensionType::String);
        }
        assert_eq!(DimensionType::from_name("Float").unwrap(), DimensionType::Float);
    }

    #[test]
    fn from_name_rejects_unknown_names() {
        let err = DimensionType::from_name("bogus").unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { ref name } if name == "bogus"));
        assert!(!DimensionType::is_valid("bogus"));
        assert!(!DimensionType::is_valid(""));
    }

    #[test]
    fn canonical_names_are_lowercase_and_round_trip() {
        for t in DimensionType::ALL {
            assert_eq!(t.name(), t.to_string());
            assert_eq!(t.name(), t.name().to_lowercase());
            assert_eq!(t.name().parse::<DimensionType>().unwrap(), t);
        }
        assert_eq!(serde_json::to_string(&DimensionType::Float).unwrap(), r#""float""#);
        let t: DimensionType = serde_json::from_str(r#""FLOAT""#).unwrap();
        assert_eq!(t, DimensionType::Float);
    }

    #[test]
    fn every_type_has_a_coercion_rule() {
        for t in DimensionType::ALL {
            let out = t.coerce(&json!(1.5)).unwrap();
            assert_eq!(out.dimension_type(), t);
        }
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn float_coercion_narrows_to_f32() {
        let out = DimensionType::Float.coerce(&json!(3.14_f64)).unwrap();
        assert_eq!(out, DimensionValue::Float(3.14_f32));
        assert_eq!(
            DimensionType::Float.coerce(&json!(42)).unwrap(),
            DimensionValue::Float(42.0)
        );
    }

    #[test]
    fn float_coercion_rejects_non_numeric_values() {
        for v in [json!("3.14"), json!(null), json!(true), json!([1.0]), json!({"x": 1})] {
            let err = DimensionType::Float.coerce(&v).unwrap_err();
            assert!(matches!(
                err,
                SchemaError::TypeCoercion {
                    dimension_type: DimensionType::Float,
                    ..
                }
            ));
        }
    }

    #[test]
    fn string_coercion_is_total() {
        let cases = [
            (json!("abc"), "abc"),
            (json!(null), "null"),
            (json!(12), "12"),
            (json!(true), "true"),
            (json!(["a", "b"]), r#"["a","b"]"#),
        ];
        for (v, expected) in cases {
            assert_eq!(
                DimensionType::String.coerce(&v).unwrap(),
                DimensionValue::String(expected.to_string())
            );
        }
    }

    #[test]
    fn invalid_type_name_leaves_type_unset() {
        let d = DimensionSchema::new("page", "varchar");
        assert_eq!(d.dimension_type(), None);
        assert_eq!(d.rejected_type(), Some("varchar"));
        assert_eq!(d.to_string(), "page:undefined");
    }

    #[test]
    fn equality_ignores_rejected_type_but_not_type() {
        assert_eq!(DimensionSchema::new("a", "nope"), DimensionSchema::untyped("a"));
        assert_ne!(DimensionSchema::untyped("a"), DimensionSchema::new("a", "string"));
        assert_eq!(
            DimensionSchema::new("a", "STRING"),
            DimensionSchema::typed("a", DimensionType::String)
        );
        assert_eq!(DimensionSchema::new("a", "float").to_string(), "a:float");
    }

    #[test]
    fn dimension_schema_accepts_object_and_bare_name() {
        let dims: Vec<DimensionSchema> = serde_json::from_value(json!([
            {"name": "a", "type": "Float"},
            {"name": "b"},
            {"name": "c", "type": "long"},
            "d"
        ]))
        .unwrap();
        assert_eq!(dims[0], DimensionSchema::typed("a", DimensionType::Float));
        assert_eq!(dims[1], DimensionSchema::untyped("b"));
        assert_eq!(dims[2].rejected_type(), Some("long"));
        assert_eq!(dims[3], DimensionSchema::typed("d", DimensionType::String));

        let out = serde_json::to_value(&dims[0]).unwrap();
        assert_eq!(out, json!({"name": "a", "type": "float"}));
    }

    #[test]
    fn wrong_typed_fields_name_the_field() {
        let err = serde_json::from_value::<DimensionSchema>(json!({"name": "a", "type": 5})).unwrap_err();
        assert!(err.to_string().contains(r#"dimension "type" must be a string, got 5"#), "{err}");

        let err = serde_json::from_value::<DimensionSchema>(json!({"name": 7})).unwrap_err();
        assert!(err.to_string().contains(r#"dimension "name" must be a string, got 7"#), "{err}");

        let err = serde_json::from_value::<DimensionSchema>(json!({"type": "float"})).unwrap_err();
        assert!(err.to_string().contains("missing field `name`"), "{err}");

        let err = serde_json::from_value::<DimensionSchema>(json!(5)).unwrap_err();
        assert!(err.to_string().contains("expected a dimension name or an object"), "{err}");
    }

    #[test]
    fn null_type_and_unknown_keys_are_tolerated() {
        let d: DimensionSchema =
            serde_json::from_value(json!({"name": "a", "type": null, "comment": [1, 2]})).unwrap();
        assert_eq!(d, DimensionSchema::untyped("a"));
        assert_eq!(d.rejected_type(), None);
    }

    #[test]
    fn spatial_dimension_uses_camel_case_keys() {
        let s: SpatialDimensionSchema =
            serde_json::from_value(json!({"dimName": "coord", "dims": ["lat", "lon"]})).unwrap();
        assert_eq!(s, SpatialDimensionSchema::new("coord", ["lat", "lon"]));
    }
}
