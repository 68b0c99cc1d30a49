use serde::{Deserialize, Serialize};
use shared::{total_weighted_score, BenchmarkResult, ConfigError, TypedConfig};

use super::{clamp_u32, StepController, StepControllerFactory, StepControllerPtr};

pub const TYPE_URL: &str = "binary-search";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinarySearchStepControllerConfig {
    pub minimum_rps: u32,
    pub maximum_rps: u32,
}

/// Binary-searches for the highest RPS that keeps metrics within thresholds.
/// Converges when the interval has collapsed to a fixed point (spec §4.4,
/// ported from `BinarySearchStepController`). Known to be able to send an
/// overwhelming RPS early on; see DESIGN.md.
pub struct BinarySearchStepController {
    config: BinarySearchStepControllerConfig,
    bottom_rps: u32,
    top_rps: u32,
    previous_rps: u32,
    current_rps: u32,
}

impl BinarySearchStepController {
    pub fn new(config: BinarySearchStepControllerConfig) -> Self {
        let bottom_rps = config.minimum_rps;
        let top_rps = config.maximum_rps;
        let current_rps = (top_rps + bottom_rps) / 2;
        Self {
            config,
            bottom_rps,
            top_rps,
            previous_rps: 0,
            current_rps,
        }
    }
}

impl StepController for BinarySearchStepController {
    fn current_rps(&self) -> u32 {
        self.current_rps
    }

    fn is_converged(&self) -> bool {
        self.previous_rps == self.current_rps
    }

    fn update(&mut self, result: &BenchmarkResult) {
        let score = total_weighted_score(result);
        if score < 0.0 {
            self.top_rps = self.current_rps;
        } else {
            self.bottom_rps = self.current_rps;
        }
        self.previous_rps = self.current_rps;
        self.current_rps = (self.bottom_rps + self.top_rps) / 2;
        self.current_rps = clamp_u32(self.current_rps, self.config.minimum_rps, self.config.maximum_rps);
    }
}

#[derive(Default)]
pub struct BinarySearchStepControllerFactory;

impl StepControllerFactory for BinarySearchStepControllerFactory {
    fn name(&self) -> &'static str {
        "binary-search"
    }

    fn create(&self, typed_config: &TypedConfig) -> Result<StepControllerPtr, ConfigError> {
        if typed_config.type_url != TYPE_URL {
            return Err(ConfigError::TypeUrlMismatch {
                expected: TYPE_URL.to_string(),
                actual: typed_config.type_url.clone(),
            });
        }
        let config: BinarySearchStepControllerConfig =
            serde_yaml::from_value(typed_config.value.clone()).map_err(|e| {
                ConfigError::InvalidArgument {
                    category: "step_controller",
                    name: self.name().to_string(),
                    message: e.to_string(),
                }
            })?;
        if config.minimum_rps > config.maximum_rps {
            return Err(ConfigError::InvalidArgument {
                category: "step_controller",
                name: self.name().to_string(),
                message: format!(
                    "minimum_rps ({}) must not exceed maximum_rps ({})",
                    config.minimum_rps, config.maximum_rps
                ),
            });
        }
        Ok(Box::new(BinarySearchStepController::new(config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{BenchmarkStatus, MetricEvaluation, ScoringFunctionConfig, SimpleStatus, ThresholdCheckResult, ThresholdSpec};

    fn result_with_status(status: SimpleStatus) -> BenchmarkResult {
        BenchmarkResult {
            requested_rps: 0,
            artifact: None,
            metric_evaluations: vec![MetricEvaluation {
                metric_name: "success-rate".into(),
                value: 1.0,
                threshold: Some(ThresholdSpec {
                    scoring_function: ScoringFunctionConfig {
                        name: "linear".into(),
                        typed_config: shared::TypedConfig::new("linear", serde_yaml::Mapping::new()),
                    },
                    weight: None,
                }),
                threshold_check_result: Some(ThresholdCheckResult {
                    simple_status: status,
                    threshold_score: if status == SimpleStatus::Within { 1.0 } else { -1.0 },
                }),
                error: None,
            }],
            status: BenchmarkStatus::Ok,
        }
    }

    #[test]
    fn starts_at_the_midpoint() {
        let controller = BinarySearchStepController::new(BinarySearchStepControllerConfig {
            minimum_rps: 0,
            maximum_rps: 1024,
        });
        assert_eq!(controller.current_rps(), 512);
    }

    #[test]
    fn interval_never_widens_and_stays_in_bounds() {
        let mut controller = BinarySearchStepController::new(BinarySearchStepControllerConfig {
            minimum_rps: 0,
            maximum_rps: 1024,
        });
        let mut previous_width = u32::MAX;
        for i in 0..20 {
            let status = if i % 2 == 0 {
                SimpleStatus::Within
            } else {
                SimpleStatus::Outside
            };
            controller.update(&result_with_status(status));
            assert!(controller.current_rps() <= 1024);
            let width = controller.top_rps.saturating_sub(controller.bottom_rps);
            assert!(width <= previous_width);
            previous_width = width;
        }
    }

    #[test]
    fn converges_once_the_interval_collapses() {
        let mut controller = BinarySearchStepController::new(BinarySearchStepControllerConfig {
            minimum_rps: 0,
            maximum_rps: 1024,
        });
        // ceiling at 700: healthy below, unhealthy above.
        for _ in 0..20 {
            if controller.is_converged() {
                break;
            }
            let status = if controller.current_rps() <= 700 {
                SimpleStatus::Within
            } else {
                SimpleStatus::Outside
            };
            controller.update(&result_with_status(status));
        }
        assert!(controller.is_converged());
        assert!(controller.current_rps() == 700 || controller.current_rps() == 701);
    }

    #[test]
    fn convergence_is_a_fixed_point() {
        let mut controller = BinarySearchStepController::new(BinarySearchStepControllerConfig {
            minimum_rps: 0,
            maximum_rps: 1024,
        });
        while !controller.is_converged() {
            let status = if controller.current_rps() <= 700 {
                SimpleStatus::Within
            } else {
                SimpleStatus::Outside
            };
            controller.update(&result_with_status(status));
        }
        let converged_rps = controller.current_rps();
        let status = if converged_rps <= 700 {
            SimpleStatus::Within
        } else {
            SimpleStatus::Outside
        };
        controller.update(&result_with_status(status));
        assert!(controller.is_converged());
        assert_eq!(controller.current_rps(), converged_rps);
    }
}
