//! Loading dimensions specs from configuration.
//!
//! Most callers should use [`load_dimensions_spec_from_path`] or
//! [`load_dimensions_spec_from_str`], which:
//!
//! - parse the JSON config into a validated [`DimensionsSpec`]
//! - optionally fail on unknown dimension types instead of leaving them untyped
//! - optionally report success/warnings/failure/alerts to a [`LoadObserver`]
//!
//! The format-specific parser lives in [`json`].

pub mod json;
pub mod observability;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::SchemaResult;
use crate::spec::DimensionsSpec;

pub use observability::{
    CompositeObserver, FileObserver, LoadContext, LoadObserver, LoadSeverity, LoadSource, LoadStats,
    TracingObserver,
};

/// Options controlling spec loading.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct LoadOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LoadSeverity,
    /// Fail on an unrecognized dimension type instead of leaving the dimension untyped.
    pub reject_unknown_types: bool,
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .field("reject_unknown_types", &self.reject_unknown_types)
            .finish()
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
            reject_unknown_types: false,
        }
    }
}

/// Load a dimensions spec from a JSON config file.
///
/// When an observer is configured, this function reports:
///
/// - `on_warning` for every dimension whose declared type was not recognized
/// - `on_success` on success, with [`LoadStats`]
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the severity is >= `options.alert_at_or_above`
///
/// ```no_run
/// use dimensions_spec::config::{load_dimensions_spec_from_path, LoadOptions};
///
/// # fn main() -> Result<(), dimensions_spec::SchemaError> {
/// let spec = load_dimensions_spec_from_path("dimensions.json", &LoadOptions::default())?;
/// println!("dimensions={}", spec.dimensions().len());
/// # Ok(())
/// # }
/// ```
pub fn load_dimensions_spec_from_path(
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> SchemaResult<DimensionsSpec> {
    let path = path.as_ref();
    let ctx = LoadContext {
        source: LoadSource::Path(path.to_path_buf()),
    };
    let result = json::parse_dimensions_spec_from_path(path, options.reject_unknown_types);
    report(&ctx, options, result)
}

/// Load a dimensions spec from JSON text. Reports to the observer like
/// [`load_dimensions_spec_from_path`].
///
/// ```rust
/// use dimensions_spec::config::{load_dimensions_spec_from_str, LoadOptions};
///
/// let spec = load_dimensions_spec_from_str(
///     r#"{"dimensions": [{"name": "zeta", "type": "string"}, {"name": "alpha", "type": "float"}],
///         "dimensionExclusions": ["beta"]}"#,
///     &LoadOptions::default(),
/// )
/// .unwrap();
/// let dims: Vec<String> = spec.dimensions().iter().map(|d| d.to_string()).collect();
/// assert_eq!(dims, ["alpha:float", "zeta:string"]);
/// ```
pub fn load_dimensions_spec_from_str(
    input: &str,
    options: &LoadOptions,
) -> SchemaResult<DimensionsSpec> {
    let ctx = LoadContext {
        source: LoadSource::Inline,
    };
    let result = json::parse_dimensions_spec_from_str(input, options.reject_unknown_types);
    report(&ctx, options, result)
}

fn report(
    ctx: &LoadContext,
    options: &LoadOptions,
    result: SchemaResult<DimensionsSpec>,
) -> SchemaResult<DimensionsSpec> {
    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(spec) => {
                for d in spec.dimensions() {
                    if let Some(rejected) = d.rejected_type() {
                        obs.on_warning(
                            ctx,
                            &format!(
                                "dimension '{}' declares unknown type '{rejected}'; type left unset",
                                d.name()
                            ),
                        );
                    }
                }
                obs.on_success(ctx, stats_for(spec));
            }
            Err(e) => {
                let sev = LoadSeverity::for_error(e);
                obs.on_failure(ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(ctx, sev, e);
                }
            }
        }
    }

    result
}

fn stats_for(spec: &DimensionsSpec) -> LoadStats {
    LoadStats {
        dimensions: spec.dimensions().len(),
        float_dimensions: spec.float_dimension_names().len(),
        untyped_dimensions: spec
            .dimensions()
            .iter()
            .filter(|d| d.dimension_type().is_none())
            .count(),
        dimension_exclusions: spec.dimension_exclusions().len(),
        spatial_dimensions: spec.spatial_dimensions().len(),
    }
}
