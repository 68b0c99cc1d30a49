//! Adaptive load controller core: plugin contracts (C1, C2, C4), the
//! built-in metrics source (C3), the plugin registry (C5), the metric
//! evaluator (C6), and the session driver (C7).
//!
//! The load-generator client (C8) lives one layer up, in `shared` (the
//! contract) and `load-client` (a concrete gRPC implementation) — this crate
//! only consumes `shared::LoadGeneratorClient`, it never implements one.

pub mod driver;
pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod registry;
pub mod scoring;
pub mod step_controller;
pub mod time_source;

pub use driver::SessionDriver;
pub use error::{MetricError, SessionError};
pub use evaluator::MetricEvaluator;
pub use registry::{register_builtin_plugins, PluginRegistry};
pub use time_source::{FakeIncrementingTimeSource, SystemTimeSource, TimeSource};
