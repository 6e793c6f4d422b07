//! Normalized rows.
//!
//! An [`InputRow`] carries one ingested event together with the dimension lists resolved for
//! it. The row does not validate anything against a [`DimensionsSpec`]; callers resolve the
//! lists (or use [`InputRow::from_spec`]) and the row just carries them.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, TimeZone, Utc};

use crate::error::SchemaResult;
use crate::spec::DimensionsSpec;
use crate::types::{DimensionType, DimensionValue, stringify_value};

/// Raw event fields keyed by name.
pub type Event = serde_json::Map<String, serde_json::Value>;

/// A timestamp in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpochMillis(pub i64);

impl From<i64> for EpochMillis {
    fn from(millis: i64) -> Self {
        Self(millis)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for EpochMillis {
    fn from(ts: DateTime<Tz>) -> Self {
        Self(ts.timestamp_millis())
    }
}

impl From<SystemTime> for EpochMillis {
    fn from(ts: SystemTime) -> Self {
        match ts.duration_since(UNIX_EPOCH) {
            Ok(after) => Self(i64::try_from(after.as_millis()).unwrap_or(i64::MAX)),
            Err(before) => Self(
                i64::try_from(before.duration().as_millis())
                    .map(|ms| -ms)
                    .unwrap_or(i64::MIN),
            ),
        }
    }
}

/// One ingested event with its resolved string and float dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRow {
    timestamp: i64,
    dimensions: Vec<String>,
    float_dimensions: Vec<String>,
    event: Event,
}

impl InputRow {
    /// Create a row from already-resolved dimension lists.
    pub fn new(
        timestamp: impl Into<EpochMillis>,
        dimensions: Vec<String>,
        float_dimensions: Vec<String>,
        event: Event,
    ) -> Self {
        Self {
            timestamp: timestamp.into().0,
            dimensions,
            float_dimensions,
            event,
        }
    }

    /// Create a row, resolving dimension lists from `spec`.
    ///
    /// With declared dimensions, string and untyped dimensions go to the string list and float
    /// dimensions to the float list. Without declared dimensions, every event field that is not
    /// excluded becomes a string dimension, in event key order.
    pub fn from_spec(timestamp: impl Into<EpochMillis>, spec: &DimensionsSpec, event: Event) -> Self {
        let (dimensions, float_dimensions) = if spec.has_custom_dimensions() {
            (spec.string_dimension_names(), spec.float_dimension_names())
        } else {
            let discovered = event
                .keys()
                .filter(|k| !spec.is_excluded(k))
                .cloned()
                .collect();
            (discovered, Vec::new())
        };
        Self::new(timestamp, dimensions, float_dimensions, event)
    }

    /// Effective dimension order: string dimensions followed by float dimensions.
    ///
    /// Returns a fresh vector on every call. Names present in both lists appear twice.
    pub fn dimensions(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.dimensions.len() + self.float_dimensions.len());
        out.extend(self.dimensions.iter().cloned());
        out.extend(self.float_dimensions.iter().cloned());
        out
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn timestamp_from_epoch(&self) -> i64 {
        self.timestamp
    }

    /// Row timestamp as a UTC datetime, or `None` when the millis fall outside chrono's range.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.timestamp)
    }

    /// Values of one dimension as strings.
    ///
    /// Arrays are multi-value dimensions (one string per element); `null` and missing fields
    /// yield no values.
    pub fn dimension(&self, name: &str) -> Vec<String> {
        match self.event.get(name) {
            None | Some(serde_json::Value::Null) => Vec::new(),
            Some(serde_json::Value::Array(items)) => items.iter().map(stringify_value).collect(),
            Some(v) => vec![stringify_value(v)],
        }
    }

    /// Coerce every effective dimension, in [`Self::dimensions`] order.
    ///
    /// Missing and `null` fields produce `None`; a float dimension holding a non-numeric value
    /// fails.
    pub fn coerced_dimensions(&self) -> SchemaResult<Vec<(String, Option<DimensionValue>)>> {
        let typed = self
            .dimensions
            .iter()
            .map(|n| (n, DimensionType::String))
            .chain(self.float_dimensions.iter().map(|n| (n, DimensionType::Float)));

        let mut out = Vec::with_capacity(self.dimensions.len() + self.float_dimensions.len());
        for (name, dimension_type) in typed {
            let value = match self.event.get(name) {
                None | Some(serde_json::Value::Null) => None,
                Some(v) => Some(dimension_type.coerce(v)?),
            };
            out.push((name.clone(), value));
        }
        Ok(out)
    }
}

impl fmt::Display for InputRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timestamp = match self.timestamp() {
            Some(ts) => ts.to_rfc3339(),
            None => format!("{}ms", self.timestamp),
        };
        write!(
            f,
            "InputRow{{timestamp={}, event={}, dimensions={:?}, floatDimensions={:?}}}",
            timestamp,
            serde_json::Value::Object(self.event.clone()),
            self.dimensions,
            self.float_dimensions
        )
    }
}
