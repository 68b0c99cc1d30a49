//! Metrics sources (C2, C3): supply a named numeric metric on demand.

mod builtin;

pub use builtin::BuiltinMetricsSource;

use std::collections::HashSet;
use std::time::{Duration, SystemTime};

use shared::{ConfigError, TypedConfig};

use crate::error::MetricError;

/// The window over which an external metrics source should scope its query
/// (spec §4.2). Sources with no notion of time may ignore it.
#[derive(Debug, Clone, Copy)]
pub struct MetricWindow {
    pub start: SystemTime,
    pub duration: Duration,
}

/// A metrics source plugin instance (C2).
pub trait MetricsSource: Send + Sync {
    /// Fetches `name`, optionally scoped to `window`. Implementations that do
    /// not support time-windowed retrieval must fail with
    /// [`MetricError::unimplemented`] when `window` is required by the caller
    /// and they cannot honor it; the built-in source always ignores it.
    fn get_metric(&self, name: &str, window: Option<MetricWindow>) -> Result<f64, MetricError>;

    fn supported_metric_names(&self) -> HashSet<String>;
}

pub type MetricsSourcePtr = Box<dyn MetricsSource>;

/// Factory for an external metrics source plugin, resolved by name from the
/// registry (C5). The built-in source (C3) is constructed directly by the
/// metric evaluator per iteration and is never registered here (it needs the
/// current benchmark artifact, not a static config).
pub trait MetricsSourceFactory: Send + Sync {
    fn name(&self) -> &'static str;
    fn create(&self, typed_config: &TypedConfig) -> Result<MetricsSourcePtr, ConfigError>;
    fn validate(&self, typed_config: &TypedConfig) -> Result<(), ConfigError> {
        self.create(typed_config).map(|_| ())
    }
}

pub type MetricsSourceFactoryPtr = Box<dyn MetricsSourceFactory>;
