//! Data model shared between the adaptive load controller's core engine and
//! its load-generator client adapter.
//!
//! These types play the role the source tree's protobuf messages played
//! (`nighthawk::client::Output`, `nighthawk::adaptive_rps::BenchmarkResult`,
//! ...): a plain, serializable, language-native shape that every other crate
//! in the workspace agrees on.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub mod client;
pub mod testutil;

pub use client::{LoadGeneratorClient, LoadGeneratorError};

/// Opaque typed-config envelope, standing in for the source tree's
/// `google.protobuf.Any`. `type_url` identifies the expected concrete config
/// type; `value` carries it as a `serde_yaml::Value` so factories can decode
/// it with `serde_yaml::from_value`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypedConfig {
    pub type_url: String,
    pub value: serde_yaml::Value,
}

impl TypedConfig {
    pub fn new(type_url: impl Into<String>, value: impl Serialize) -> Self {
        Self {
            type_url: type_url.into(),
            // Config literals built in-process are always representable as YAML.
            value: serde_yaml::to_value(value).expect("config value is not representable as YAML"),
        }
    }
}

/// Base options sent to the load generator for every benchmark call. `duration`
/// is overridden by the caller on each `perform_benchmark` invocation (§4.8);
/// `requests_per_second` is set by the step controller's current RPS before
/// each adjusting-stage call.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BenchmarkOptions {
    pub requests_per_second: u32,
    pub duration_seconds: u32,
    pub concurrency: u32,
}

/// A named counter from one benchmark artifact, e.g. `upstream_rq_total`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    pub name: String,
    pub value: u64,
}

/// A latency-style statistic, all fields in nanoseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistic {
    pub id: String,
    pub min_ns: f64,
    pub mean_ns: f64,
    pub max_ns: f64,
    pub pstdev_ns: f64,
}

/// One named result within a benchmark artifact. With a single worker only
/// the `"global"` result is present; with multiple workers there is one
/// per-worker result plus an aggregate `"global"` result (§4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSection {
    pub name: String,
    pub execution_duration_seconds: f64,
    pub counters: Vec<Counter>,
    pub statistics: Vec<Statistic>,
}

/// The raw artifact a single `perform_benchmark` call returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkArtifact {
    pub options: BenchmarkOptions,
    pub results: Vec<ResultSection>,
}

impl BenchmarkArtifact {
    pub fn global_result(&self) -> Option<&ResultSection> {
        self.results.iter().find(|r| r.name == "global")
    }

    /// Number of independent workers that produced this artifact (§4.3): 1 if
    /// there is only the `"global"` result, otherwise one fewer than the total
    /// result count (the aggregate is excluded).
    pub fn worker_count(&self) -> u32 {
        if self.results.len() <= 1 {
            1
        } else {
            (self.results.len() - 1) as u32
        }
    }
}

/// `simple_status` half of a `ThresholdCheckResult` (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimpleStatus {
    Within,
    Outside,
    Unknown,
}

/// Config for a scoring function plugin (C1): a plugin name plus its typed config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringFunctionConfig {
    pub name: String,
    pub typed_config: TypedConfig,
}

/// Config for a metrics source plugin (C2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSourceConfig {
    pub name: String,
    pub typed_config: TypedConfig,
}

/// Config for a step controller plugin (C4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepControllerConfig {
    pub name: String,
    pub typed_config: TypedConfig,
}

/// A threshold attached to a `MetricSpec`: a scoring function plus an optional
/// weight. Per §3, weights are set on all thresholded specs or none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdSpec {
    pub scoring_function: ScoringFunctionConfig,
    pub weight: Option<f64>,
}

/// One metric the evaluator should fetch and (optionally) score each iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSpec {
    pub metric_name: String,
    /// `None` means the built-in source (§4.2).
    pub metrics_source_name: Option<String>,
    /// `None` means the metric is informational/display-only (§3).
    pub threshold: Option<ThresholdSpec>,
}

/// Immutable session input (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSpec {
    pub base_benchmark_options: BenchmarkOptions,
    pub adjusting_stage_duration_seconds: u32,
    pub testing_stage_duration_seconds: u32,
    pub convergence_deadline_seconds: u64,
    pub metric_specs: Vec<MetricSpec>,
    pub metrics_sources: Vec<MetricsSourceConfig>,
    pub step_controller: StepControllerConfig,
}

/// Result of one threshold comparison for one metric in one iteration (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdCheckResult {
    pub simple_status: SimpleStatus,
    pub threshold_score: f64,
}

/// One metric's observed value and (if thresholded) scored verdict for one
/// iteration (§3). `threshold` is carried by reference-equivalent clone so the
/// step controller can read the weight without re-resolving the MetricSpec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricEvaluation {
    pub metric_name: String,
    /// `NaN` if the metric could not be fetched (§4.2).
    pub value: f64,
    pub threshold: Option<ThresholdSpec>,
    pub threshold_check_result: Option<ThresholdCheckResult>,
    /// Present only when `value` is NaN because the source failed.
    pub error: Option<String>,
}

/// Outcome of a single benchmark call plus its evaluated metrics (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BenchmarkStatus {
    Ok,
    LoadGeneratorError,
    MetricError,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub requested_rps: u32,
    pub artifact: Option<BenchmarkArtifact>,
    pub metric_evaluations: Vec<MetricEvaluation>,
    pub status: BenchmarkStatus,
}

/// Terminal outcome of a session (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Converged,
    DeadlineExceeded,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOutput {
    pub adjusting_stage_results: Vec<BenchmarkResult>,
    pub converged_rps: u32,
    pub testing_stage_result: Option<BenchmarkResult>,
    pub status: SessionStatus,
    pub message: String,
}

/// Weighted score fusing a `BenchmarkResult`'s thresholded metric evaluations
/// into a single value in `[-1, 1]` (§4.4). Evaluations without both a
/// threshold and a check result are display-only and skipped. An empty or
/// zero-weight set of thresholded evaluations scores `0.0` (treated healthy,
/// per the Open Questions resolution in DESIGN.md).
pub fn total_weighted_score(result: &BenchmarkResult) -> f64 {
    let mut score = 0.0;
    let mut total_weight = 0.0;
    for evaluation in &result.metric_evaluations {
        let (Some(threshold), Some(check)) =
            (&evaluation.threshold, &evaluation.threshold_check_result)
        else {
            continue;
        };
        let weight = threshold.weight.unwrap_or(1.0);
        let signed = match check.simple_status {
            SimpleStatus::Within => 1.0,
            SimpleStatus::Outside => -1.0,
            SimpleStatus::Unknown => {
                if check.threshold_score.is_nan() {
                    0.0
                } else {
                    check.threshold_score
                }
            }
        };
        score += weight * signed;
        total_weight += weight;
    }
    if total_weight == 0.0 {
        0.0
    } else {
        score / total_weight
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown {category} plugin '{name}'")]
    UnknownPlugin { category: &'static str, name: String },
    #[error("typed config type URL mismatch: expected '{expected}', got '{actual}'")]
    TypeUrlMismatch { expected: String, actual: String },
    #[error("invalid {category} plugin config for '{name}': {message}")]
    InvalidArgument {
        category: &'static str,
        name: String,
        message: String,
    },
    #[error("{0}")]
    InvalidSpec(String),
}
