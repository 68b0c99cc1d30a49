use controller::registry::{register_builtin_plugins, PluginRegistry};
use controller::evaluator::MetricEvaluator;
use controller::scoring::LinearScoringFunctionConfig;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shared::testutil::{benchmark_artifact_fixture, SimpleArtifactSpec};
use shared::{MetricSpec, ScoringFunctionConfig, SessionSpec, StepControllerConfig, ThresholdSpec, TypedConfig};

fn session_spec(metric_count: usize) -> SessionSpec {
    let metric_names = [
        "achieved-rps",
        "send-rate",
        "success-rate",
        "latency-ns-mean",
        "latency-ns-pstdev",
        "latency-ns-mean-plus-2stdev",
    ];

    let metric_specs = (0..metric_count)
        .map(|i| MetricSpec {
            metric_name: metric_names[i % metric_names.len()].to_string(),
            metrics_source_name: None,
            threshold: Some(ThresholdSpec {
                scoring_function: ScoringFunctionConfig {
                    name: "linear".to_string(),
                    typed_config: TypedConfig::new(
                        "linear",
                        LinearScoringFunctionConfig {
                            threshold: 1.0,
                            k: -1.0,
                        },
                    ),
                },
                weight: None,
            }),
        })
        .collect();

    SessionSpec {
        base_benchmark_options: shared::BenchmarkOptions::default(),
        adjusting_stage_duration_seconds: 5,
        testing_stage_duration_seconds: 30,
        convergence_deadline_seconds: 60,
        metric_specs,
        metrics_sources: vec![],
        step_controller: StepControllerConfig {
            name: "binary-search".to_string(),
            typed_config: TypedConfig::new(
                "binary-search",
                controller::step_controller::BinarySearchStepControllerConfig {
                    minimum_rps: 0,
                    maximum_rps: 1024,
                },
            ),
        },
    }
}

/// Scores a single iteration's artifact against a growing number of
/// thresholded metrics, all drawn from the built-in source only.
fn benchmark_evaluate_scaling(c: &mut Criterion) {
    let mut registry = PluginRegistry::new();
    register_builtin_plugins(&mut registry);
    let artifact = benchmark_artifact_fixture(SimpleArtifactSpec::default());

    let mut group = c.benchmark_group("evaluate_scaling");
    for metric_count in [1, 3, 6, 12].iter() {
        let spec = session_spec(*metric_count);
        let evaluator = MetricEvaluator::new(&registry, &spec).unwrap();

        group.bench_with_input(
            BenchmarkId::new("metrics", metric_count),
            metric_count,
            |b, _| {
                b.iter(|| evaluator.evaluate(black_box(&artifact), None));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, benchmark_evaluate_scaling);
criterion_main!(benches);
