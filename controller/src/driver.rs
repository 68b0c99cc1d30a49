//! Session driver (C7): orchestrates the Adjusting and Testing stages, owns
//! the deadline, and emits the session output.
//!
//! ```text
//!   [Init] --validate--> [Adjusting] --converged--> [Testing] --> [Done:Converged]
//!                          |  |
//!                          |  +-- deadline --> [Done:DeadlineExceeded]
//!                          +----- fatal -----> [Done:Error]
//! ```

use std::time::Duration;

use shared::{
    total_weighted_score, BenchmarkArtifact, BenchmarkResult, BenchmarkStatus, LoadGeneratorClient,
    SessionOutput, SessionSpec, SessionStatus,
};
use tracing::info;

use crate::error::SessionError;
use crate::evaluator::MetricEvaluator;
use crate::registry::PluginRegistry;
use crate::step_controller::StepControllerPtr;
use crate::time_source::TimeSource;

/// Runs one adaptive load session end to end.
pub struct SessionDriver {
    spec: SessionSpec,
    step_controller: StepControllerPtr,
    evaluator: MetricEvaluator,
    client: Box<dyn LoadGeneratorClient>,
    time_source: Box<dyn TimeSource>,
}

impl SessionDriver {
    /// Resolves every configured plugin against `registry` (the `[Init]`
    /// state's validation, spec §7) and returns a driver ready to `run`.
    pub fn new(
        registry: &PluginRegistry,
        spec: SessionSpec,
        client: Box<dyn LoadGeneratorClient>,
        time_source: Box<dyn TimeSource>,
    ) -> Result<Self, SessionError> {
        let step_controller = registry.load_step_controller(&spec.step_controller)?;
        let evaluator = MetricEvaluator::new(registry, &spec)?;
        Ok(Self {
            spec,
            step_controller,
            evaluator,
            client,
            time_source,
        })
    }

    /// Runs the Adjusting Stage to convergence or deadline, then the Testing
    /// Stage (spec §4.7). Never panics on driver-reachable failures; every
    /// terminal state is expressed in the returned `SessionOutput`.
    pub async fn run(mut self) -> SessionOutput {
        let start = self.time_source.now();
        let deadline = start + Duration::from_secs(self.spec.convergence_deadline_seconds);
        let mut trail = Vec::new();

        loop {
            let rps = self.step_controller.current_rps();
            let mut options = self.spec.base_benchmark_options.clone();
            options.requests_per_second = rps;

            let artifact = match self
                .client
                .perform_benchmark(
                    &options,
                    Duration::from_secs(self.spec.adjusting_stage_duration_seconds as u64),
                )
                .await
            {
                Ok(artifact) => artifact,
                Err(err) => {
                    trail.push(BenchmarkResult {
                        requested_rps: rps,
                        artifact: None,
                        metric_evaluations: Vec::new(),
                        status: BenchmarkStatus::LoadGeneratorError,
                    });
                    return SessionOutput {
                        adjusting_stage_results: trail,
                        converged_rps: rps,
                        testing_stage_result: None,
                        status: SessionStatus::Error,
                        message: err.to_string(),
                    };
                }
            };

            let result = self.evaluate_iteration(rps, artifact);
            self.step_controller.update(&result);
            let score = total_weighted_score(&result);
            let converged = self.step_controller.is_converged();
            let now = self.time_source.now();
            let elapsed = now.saturating_sub(start);

            info!(
                iteration = trail.len(),
                rps,
                score,
                converged,
                elapsed = elapsed.as_secs_f64(),
                "adjusting iteration"
            );

            trail.push(result);

            if converged {
                break;
            }
            if now >= deadline {
                return SessionOutput {
                    adjusting_stage_results: trail,
                    converged_rps: self.step_controller.current_rps(),
                    testing_stage_result: None,
                    status: SessionStatus::DeadlineExceeded,
                    message: "convergence deadline exceeded".to_string(),
                };
            }
        }

        let converged_rps = self.step_controller.current_rps();
        let mut options = self.spec.base_benchmark_options.clone();
        options.requests_per_second = converged_rps;

        match self
            .client
            .perform_benchmark(
                &options,
                Duration::from_secs(self.spec.testing_stage_duration_seconds as u64),
            )
            .await
        {
            Ok(artifact) => {
                let result = self.evaluate_iteration(converged_rps, artifact);
                SessionOutput {
                    adjusting_stage_results: trail,
                    converged_rps,
                    testing_stage_result: Some(result),
                    status: SessionStatus::Converged,
                    message: "converged".to_string(),
                }
            }
            Err(err) => SessionOutput {
                adjusting_stage_results: trail,
                converged_rps,
                testing_stage_result: None,
                status: SessionStatus::Error,
                message: err.to_string(),
            },
        }
    }

    fn evaluate_iteration(&self, requested_rps: u32, artifact: BenchmarkArtifact) -> BenchmarkResult {
        let evaluations = self.evaluator.evaluate(&artifact, None);
        let status = if evaluations.iter().any(|evaluation| evaluation.error.is_some()) {
            BenchmarkStatus::MetricError
        } else {
            BenchmarkStatus::Ok
        };
        BenchmarkResult {
            requested_rps,
            artifact: Some(artifact),
            metric_evaluations: evaluations,
            status,
        }
    }
}
