//! Built-in metrics source (C3): derives achieved-RPS, send-rate,
//! success-rate, and latency statistics from a single benchmark artifact
//! without external I/O. Ported from `NighthawkStatsEmulatedMetricsPlugin`
//! (`source/adaptive_load/metrics_plugin_impl.cc`).

use std::collections::{HashMap, HashSet};

use shared::{BenchmarkArtifact, ResultSection};

use super::{MetricWindow, MetricsSource};
use crate::error::MetricError;

const SUPPORTED_NAMES: &[&str] = &[
    "achieved-rps",
    "attempted-rps",
    "send-rate",
    "success-rate",
    "latency-ns-min",
    "latency-ns-mean",
    "latency-ns-max",
    "latency-ns-pstdev",
    "latency-ns-mean-plus-1stdev",
    "latency-ns-mean-plus-2stdev",
    "latency-ns-mean-plus-3stdev",
];

const LATENCY_NAMES: &[&str] = &[
    "latency-ns-min",
    "latency-ns-mean",
    "latency-ns-max",
    "latency-ns-pstdev",
    "latency-ns-mean-plus-1stdev",
    "latency-ns-mean-plus-2stdev",
    "latency-ns-mean-plus-3stdev",
];

pub struct BuiltinMetricsSource {
    values: HashMap<String, f64>,
    errors: HashMap<String, String>,
}

fn find_counter(result: &ResultSection, name: &str) -> Option<u64> {
    result.counters.iter().find(|c| c.name == name).map(|c| c.value)
}

impl BuiltinMetricsSource {
    /// Constructs the source from a single iteration's artifact (C6 step 1).
    pub fn new(artifact: &BenchmarkArtifact) -> Self {
        let mut values = HashMap::new();
        let mut errors = HashMap::new();

        match artifact.global_result() {
            None => {
                for name in SUPPORTED_NAMES {
                    errors.insert(
                        (*name).to_string(),
                        "Result 'global' was not found in the benchmark artifact.".to_string(),
                    );
                }
            }
            Some(global) => {
                extract_counters(artifact, global, &mut values, &mut errors);
                extract_statistics(global, &mut values, &mut errors);
            }
        }

        Self { values, errors }
    }
}

fn extract_counters(
    artifact: &BenchmarkArtifact,
    global: &ResultSection,
    values: &mut HashMap<String, f64>,
    errors: &mut HashMap<String, String>,
) {
    let duration = global.execution_duration_seconds;
    let workers = artifact.worker_count() as f64;
    let rps = artifact.options.requests_per_second as f64;
    let total_specified = rps * duration * workers;

    let total_sent = find_counter(global, "upstream_rq_total");
    let total_2xx = find_counter(global, "benchmark.http_2xx");

    if duration <= 0.0 {
        let message = "Benchmark artifact reported zero execution duration.".to_string();
        errors.insert("attempted-rps".to_string(), message.clone());
        errors.insert("achieved-rps".to_string(), message);
    } else {
        values.insert("attempted-rps".to_string(), total_specified / duration);
        match total_sent {
            Some(sent) => {
                values.insert("achieved-rps".to_string(), sent as f64 / duration);
            }
            None => {
                errors.insert(
                    "achieved-rps".to_string(),
                    "Counter 'upstream_rq_total' was not found in benchmark artifact.".to_string(),
                );
            }
        }
    }

    if total_specified == 0.0 {
        values.insert("send-rate".to_string(), 0.0);
    } else {
        match total_sent {
            Some(sent) => {
                values.insert("send-rate".to_string(), sent as f64 / total_specified);
            }
            None => {
                errors.insert(
                    "send-rate".to_string(),
                    "Counter 'upstream_rq_total' was not found in benchmark artifact.".to_string(),
                );
            }
        }
    }

    match total_sent {
        Some(0) => {
            values.insert("success-rate".to_string(), 0.0);
        }
        Some(sent) => match total_2xx {
            Some(ok) => {
                values.insert("success-rate".to_string(), ok as f64 / sent as f64);
            }
            None => {
                errors.insert(
                    "success-rate".to_string(),
                    "Counter 'benchmark.http_2xx' was not found in benchmark artifact.".to_string(),
                );
            }
        },
        None => {
            errors.insert(
                "success-rate".to_string(),
                "Counter 'upstream_rq_total' was not found in benchmark artifact.".to_string(),
            );
        }
    }
}

fn extract_statistics(
    global: &ResultSection,
    values: &mut HashMap<String, f64>,
    errors: &mut HashMap<String, String>,
) {
    match global
        .statistics
        .iter()
        .find(|s| s.id == "benchmark_http_client.request_to_response")
    {
        Some(statistic) => {
            values.insert("latency-ns-min".to_string(), statistic.min_ns);
            values.insert("latency-ns-mean".to_string(), statistic.mean_ns);
            values.insert("latency-ns-max".to_string(), statistic.max_ns);
            values.insert("latency-ns-pstdev".to_string(), statistic.pstdev_ns);
            values.insert(
                "latency-ns-mean-plus-1stdev".to_string(),
                statistic.mean_ns + statistic.pstdev_ns,
            );
            values.insert(
                "latency-ns-mean-plus-2stdev".to_string(),
                statistic.mean_ns + 2.0 * statistic.pstdev_ns,
            );
            values.insert(
                "latency-ns-mean-plus-3stdev".to_string(),
                statistic.mean_ns + 3.0 * statistic.pstdev_ns,
            );
        }
        None => {
            for name in LATENCY_NAMES {
                errors.insert(
                    (*name).to_string(),
                    "Statistic 'benchmark_http_client.request_to_response' was not found in benchmark artifact."
                        .to_string(),
                );
            }
        }
    }
}

impl MetricsSource for BuiltinMetricsSource {
    fn get_metric(&self, name: &str, _window: Option<MetricWindow>) -> Result<f64, MetricError> {
        if !SUPPORTED_NAMES.contains(&name) {
            return Err(MetricError(format!(
                "Metric '{name}' was not computed by the 'builtin' source."
            )));
        }
        if let Some(value) = self.values.get(name) {
            return Ok(*value);
        }
        if let Some(message) = self.errors.get(name) {
            return Err(MetricError(message.clone()));
        }
        unreachable!("supported metric name '{name}' has neither a value nor an error recorded")
    }

    fn supported_metric_names(&self) -> HashSet<String> {
        SUPPORTED_NAMES.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::testutil::{benchmark_artifact_fixture, SimpleArtifactSpec};

    #[test]
    fn computes_expected_derived_metrics() {
        let artifact = benchmark_artifact_fixture(SimpleArtifactSpec {
            requests_per_second: 100,
            actual_duration_seconds: 10.0,
            upstream_rq_total: 950,
            response_count_2xx: 940,
            ..Default::default()
        });
        let source = BuiltinMetricsSource::new(&artifact);

        assert_eq!(source.get_metric("attempted-rps", None).unwrap(), 100.0);
        assert_eq!(source.get_metric("achieved-rps", None).unwrap(), 95.0);
        assert_eq!(source.get_metric("send-rate", None).unwrap(), 0.95);
        assert!((source.get_metric("success-rate", None).unwrap() - 940.0 / 950.0).abs() < 1e-9);
    }

    #[test]
    fn zero_duration_fails_rps_metrics_but_not_others() {
        let artifact = benchmark_artifact_fixture(SimpleArtifactSpec {
            actual_duration_seconds: 0.0,
            ..Default::default()
        });
        let source = BuiltinMetricsSource::new(&artifact);

        assert!(source.get_metric("attempted-rps", None).is_err());
        assert!(source.get_metric("achieved-rps", None).is_err());
        assert_eq!(source.get_metric("send-rate", None).unwrap(), 0.0);
        assert!(source.get_metric("success-rate", None).is_ok());
    }

    #[test]
    fn unsupported_name_is_internal_error() {
        let artifact = benchmark_artifact_fixture(SimpleArtifactSpec::default());
        let source = BuiltinMetricsSource::new(&artifact);
        let err = source.get_metric("not-a-real-metric", None).unwrap_err();
        assert!(err.0.contains("was not computed by the 'builtin' source"));
    }

    #[test]
    fn latency_statistics_match_fixture() {
        let artifact = benchmark_artifact_fixture(SimpleArtifactSpec {
            min_ns: 100.0,
            mean_ns: 1000.0,
            max_ns: 5000.0,
            pstdev_ns: 200.0,
            ..Default::default()
        });
        let source = BuiltinMetricsSource::new(&artifact);
        assert_eq!(source.get_metric("latency-ns-min", None).unwrap(), 100.0);
        assert_eq!(source.get_metric("latency-ns-mean", None).unwrap(), 1000.0);
        assert_eq!(source.get_metric("latency-ns-max", None).unwrap(), 5000.0);
        assert_eq!(source.get_metric("latency-ns-pstdev", None).unwrap(), 200.0);
        assert_eq!(
            source.get_metric("latency-ns-mean-plus-1stdev", None).unwrap(),
            1200.0
        );
        assert_eq!(
            source.get_metric("latency-ns-mean-plus-2stdev", None).unwrap(),
            1400.0
        );
        assert_eq!(
            source.get_metric("latency-ns-mean-plus-3stdev", None).unwrap(),
            1600.0
        );
    }

    #[test]
    fn supported_metric_names_matches_the_fixed_set() {
        let artifact = benchmark_artifact_fixture(SimpleArtifactSpec::default());
        let source = BuiltinMetricsSource::new(&artifact);
        assert_eq!(source.supported_metric_names().len(), SUPPORTED_NAMES.len());
    }
}
