//! Metric evaluator (C6): for each configured metric, fetches the value, runs
//! its scoring function, compares to a threshold, and emits a
//! `MetricEvaluation`. Ordering matches `SessionSpec.metric_specs` regardless
//! of fetch order (spec §5).

use std::collections::{HashMap, HashSet};

use shared::{
    BenchmarkArtifact, ConfigError, MetricEvaluation, MetricSpec, SessionSpec, SimpleStatus,
    ThresholdCheckResult,
};

use crate::metrics::{BuiltinMetricsSource, MetricWindow, MetricsSourcePtr};
use crate::registry::PluginRegistry;
use crate::scoring::ScoringFunctionPtr;

/// One metric spec paired with its already-resolved scoring function plugin,
/// if it has a threshold. Plugins are instantiated once per session at start
/// (spec §3, Lifecycle).
struct ResolvedMetricSpec {
    spec: MetricSpec,
    scoring_function: Option<ScoringFunctionPtr>,
}

pub struct MetricEvaluator {
    resolved: Vec<ResolvedMetricSpec>,
    external_sources: HashMap<String, MetricsSourcePtr>,
}

impl MetricEvaluator {
    /// Resolves every `MetricSpec`'s metrics source and scoring function
    /// against the registry. Returns a `ConfigError` if any name is unknown
    /// or any plugin-specific config is invalid — this happens once, before
    /// the first iteration (spec §7).
    pub fn new(registry: &PluginRegistry, spec: &SessionSpec) -> Result<Self, ConfigError> {
        if spec.metric_specs.is_empty() {
            return Err(ConfigError::InvalidArgument {
                category: "session_spec",
                name: "metric_specs".to_string(),
                message: "metric_specs must not be empty".to_string(),
            });
        }
        let mut seen_names = HashSet::with_capacity(spec.metric_specs.len());
        for metric_spec in &spec.metric_specs {
            if !seen_names.insert(metric_spec.metric_name.as_str()) {
                return Err(ConfigError::InvalidArgument {
                    category: "session_spec",
                    name: "metric_specs".to_string(),
                    message: format!("duplicate metric name '{}'", metric_spec.metric_name),
                });
            }
        }

        let mut external_sources = HashMap::new();
        for source_config in &spec.metrics_sources {
            let source = registry.load_metrics_source(source_config)?;
            external_sources.insert(source_config.name.clone(), source);
        }

        let mut resolved = Vec::with_capacity(spec.metric_specs.len());
        for metric_spec in &spec.metric_specs {
            if let Some(source_name) = &metric_spec.metrics_source_name {
                if !external_sources.contains_key(source_name) {
                    return Err(ConfigError::InvalidSpec(format!(
                        "metric '{}' references undeclared metrics source '{}'",
                        metric_spec.metric_name, source_name
                    )));
                }
            }
            let scoring_function = match &metric_spec.threshold {
                Some(threshold) => Some(registry.load_scoring_function(&threshold.scoring_function)?),
                None => None,
            };
            resolved.push(ResolvedMetricSpec {
                spec: metric_spec.clone(),
                scoring_function,
            });
        }

        Ok(Self {
            resolved,
            external_sources,
        })
    }

    /// Evaluates every configured metric against one iteration's artifact
    /// (C6). `window` is passed through to external metrics sources only; the
    /// built-in source ignores it (it has no notion of time beyond the
    /// artifact it was built from).
    pub fn evaluate(
        &self,
        artifact: &BenchmarkArtifact,
        window: Option<MetricWindow>,
    ) -> Vec<MetricEvaluation> {
        let builtin = BuiltinMetricsSource::new(artifact);

        self.resolved
            .iter()
            .map(|resolved| {
                let value_result = match &resolved.spec.metrics_source_name {
                    None => builtin.get_metric(&resolved.spec.metric_name, None),
                    Some(name) => {
                        // Resolution in `new` guarantees this source exists.
                        self.external_sources[name].get_metric(&resolved.spec.metric_name, window)
                    }
                };

                match value_result {
                    Ok(value) => self.score(resolved, value),
                    // A fetch failure omits `threshold_check_result` entirely (not merely
                    // `Unknown`) so `total_weighted_score`'s guard excludes this metric from
                    // both the numerator and the denominator (spec §4.2) rather than
                    // contributing a weight with no signed score to show for it.
                    Err(err) => MetricEvaluation {
                        metric_name: resolved.spec.metric_name.clone(),
                        value: f64::NAN,
                        threshold: resolved.spec.threshold.clone(),
                        threshold_check_result: None,
                        error: Some(err.0),
                    },
                }
            })
            .collect()
    }

    fn score(&self, resolved: &ResolvedMetricSpec, value: f64) -> MetricEvaluation {
        match (&resolved.spec.threshold, &resolved.scoring_function) {
            (Some(threshold), Some(scoring_function)) => {
                let score = scoring_function.evaluate(value);
                let simple_status = if score >= 0.0 {
                    SimpleStatus::Within
                } else {
                    SimpleStatus::Outside
                };
                MetricEvaluation {
                    metric_name: resolved.spec.metric_name.clone(),
                    value,
                    threshold: Some(threshold.clone()),
                    threshold_check_result: Some(ThresholdCheckResult {
                        simple_status,
                        threshold_score: score,
                    }),
                    error: None,
                }
            }
            _ => MetricEvaluation {
                metric_name: resolved.spec.metric_name.clone(),
                value,
                threshold: None,
                threshold_check_result: None,
                error: None,
            },
        }
    }
}
