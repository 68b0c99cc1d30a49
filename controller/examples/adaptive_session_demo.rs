//! Runs one adaptive load session against an in-process fake load generator
//! so the driver's Adjusting/Testing state machine can be observed without a
//! real benchmarking client. Not a user-facing entry point: wiring a real
//! transport in is `load-client`'s job.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use controller::registry::{register_builtin_plugins, PluginRegistry};
use controller::scoring::LinearScoringFunctionConfig;
use controller::step_controller::BinarySearchStepControllerConfig;
use controller::time_source::SystemTimeSource;
use controller::SessionDriver;
use shared::testutil::{benchmark_artifact_fixture, SimpleArtifactSpec};
use shared::{
    BenchmarkArtifact, BenchmarkOptions, LoadGeneratorClient, LoadGeneratorError, MetricSpec,
    ScoringFunctionConfig, SessionSpec, StepControllerConfig, ThresholdSpec, TypedConfig,
};

/// Pretends the service it is load-testing falls over above 600 RPS.
struct FlakyAboveCeiling {
    ceiling_rps: u32,
    call_count: AtomicU32,
}

#[async_trait]
impl LoadGeneratorClient for FlakyAboveCeiling {
    async fn perform_benchmark(
        &self,
        base_options: &BenchmarkOptions,
        _duration: Duration,
    ) -> Result<BenchmarkArtifact, LoadGeneratorError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let total = 1000u64;
        let success_rate = if base_options.requests_per_second > self.ceiling_rps {
            0.75
        } else {
            0.999
        };
        Ok(benchmark_artifact_fixture(SimpleArtifactSpec {
            requests_per_second: base_options.requests_per_second,
            actual_duration_seconds: 5.0,
            upstream_rq_total: total,
            response_count_2xx: (total as f64 * success_rate) as u64,
            ..Default::default()
        }))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut registry = PluginRegistry::new();
    register_builtin_plugins(&mut registry);

    let spec = SessionSpec {
        base_benchmark_options: BenchmarkOptions {
            requests_per_second: 0,
            duration_seconds: 5,
            concurrency: 4,
        },
        adjusting_stage_duration_seconds: 5,
        testing_stage_duration_seconds: 30,
        convergence_deadline_seconds: 300,
        metric_specs: vec![MetricSpec {
            metric_name: "success-rate".to_string(),
            metrics_source_name: None,
            threshold: Some(ThresholdSpec {
                scoring_function: ScoringFunctionConfig {
                    name: "linear".to_string(),
                    typed_config: TypedConfig::new(
                        "linear",
                        LinearScoringFunctionConfig {
                            threshold: 0.95,
                            k: -10.0,
                        },
                    ),
                },
                weight: None,
            }),
        }],
        metrics_sources: vec![],
        step_controller: StepControllerConfig {
            name: "binary-search".to_string(),
            typed_config: TypedConfig::new(
                "binary-search",
                BinarySearchStepControllerConfig {
                    minimum_rps: 0,
                    maximum_rps: 2048,
                },
            ),
        },
    };

    let client = Box::new(FlakyAboveCeiling {
        ceiling_rps: 600,
        call_count: AtomicU32::new(0),
    });
    let driver = SessionDriver::new(&registry, spec, client, Box::new(SystemTimeSource::new()))
        .map_err(anyhow::Error::from)?;

    let output = driver.run().await;
    println!("session status: {:?}", output.status);
    println!("converged rps: {}", output.converged_rps);
    println!("adjusting iterations: {}", output.adjusting_stage_results.len());
    if let Some(testing_result) = &output.testing_stage_result {
        println!("testing stage status: {:?}", testing_result.status);
    }

    Ok(())
}
