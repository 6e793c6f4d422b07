use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::error::SchemaError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal, e.g. an unknown dimension type was left unset).
    Warning,
    /// Error-level event (the spec was rejected).
    Error,
    /// Critical error (the config could not be read at all).
    Critical,
}

impl LoadSeverity {
    /// Severity of a failed load.
    pub fn for_error(e: &SchemaError) -> Self {
        match e {
            SchemaError::Io(_) => Self::Critical,
            SchemaError::Json(_)
            | SchemaError::UnknownType { .. }
            | SchemaError::TypeCoercion { .. }
            | SchemaError::SchemaConflict { .. }
            | SchemaError::InvalidFieldName { .. } => Self::Error,
        }
    }
}

/// Where a spec was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    /// A config file.
    Path(PathBuf),
    /// Config text passed in directly.
    Inline,
}

impl fmt::Display for LoadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Inline => f.write_str("<inline>"),
        }
    }
}

/// Context about a load attempt.
#[derive(Debug, Clone)]
pub struct LoadContext {
    pub source: LoadSource,
}

/// Shape of a successfully loaded spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub dimensions: usize,
    pub float_dimensions: usize,
    pub untyped_dimensions: usize,
    pub dimension_exclusions: usize,
    pub spatial_dimensions: usize,
}

/// Observer interface for spec loading outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait LoadObserver: Send + Sync {
    /// Called when a spec loads successfully.
    fn on_success(&self, _ctx: &LoadContext, _stats: LoadStats) {}

    /// Called for non-fatal problems found in a spec that still loaded.
    fn on_warning(&self, _ctx: &LoadContext, _message: &str) {}

    /// Called when loading fails.
    fn on_failure(&self, _ctx: &LoadContext, _severity: LoadSeverity, _error: &SchemaError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &SchemaError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn LoadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl LoadObserver for CompositeObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_warning(&self, ctx: &LoadContext, message: &str) {
        for o in &self.observers {
            o.on_warning(ctx, message);
        }
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &SchemaError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &SchemaError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits load events through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl LoadObserver for TracingObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        tracing::info!(
            source = %ctx.source,
            dimensions = stats.dimensions,
            float_dimensions = stats.float_dimensions,
            exclusions = stats.dimension_exclusions,
            spatial_dimensions = stats.spatial_dimensions,
            "dimensions spec loaded"
        );
    }

    fn on_warning(&self, ctx: &LoadContext, message: &str) {
        tracing::warn!(source = %ctx.source, "{message}");
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &SchemaError) {
        tracing::error!(source = %ctx.source, ?severity, %error, "dimensions spec rejected");
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &SchemaError) {
        tracing::error!(source = %ctx.source, ?severity, %error, alert = true, "dimensions spec rejected");
    }
}

/// Appends load events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{} {line}", Utc::now().to_rfc3339());
        }
    }
}

impl LoadObserver for FileObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.append_line(&format!(
            "ok source={} dimensions={} float_dimensions={} exclusions={} spatial={}",
            ctx.source,
            stats.dimensions,
            stats.float_dimensions,
            stats.dimension_exclusions,
            stats.spatial_dimensions
        ));
    }

    fn on_warning(&self, ctx: &LoadContext, message: &str) {
        self.append_line(&format!("warn source={} msg={message}", ctx.source));
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &SchemaError) {
        self.append_line(&format!(
            "fail severity={severity:?} source={} err={error}",
            ctx.source
        ));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &SchemaError) {
        self.append_line(&format!(
            "ALERT severity={severity:?} source={} err={error}",
            ctx.source
        ));
    }
}
