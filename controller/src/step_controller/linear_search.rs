use serde::{Deserialize, Serialize};
use shared::{total_weighted_score, BenchmarkResult, ConfigError, TypedConfig};

use super::{clamp_f64, StepController, StepControllerFactory, StepControllerPtr};

pub const TYPE_URL: &str = "linear-search";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSearchStepControllerConfig {
    pub rps_step: u32,
    pub minimum_rps: u32,
    pub maximum_rps: u32,
}

/// Increases RPS by a fixed step until metrics go out of threshold, then
/// backs off one step. Converges once it has seen an unhealthy ceiling and
/// backed off to a healthy rate again (spec §4.4, ported from
/// `LinearSearchStepController`).
pub struct LinearSearchStepController {
    config: LinearSearchStepControllerConfig,
    current_rps: u32,
    latest_cycle_healthy: bool,
    reached_unhealthy_rps: bool,
}

impl LinearSearchStepController {
    pub fn new(config: LinearSearchStepControllerConfig) -> Self {
        let current_rps = config.minimum_rps;
        Self {
            config,
            current_rps,
            latest_cycle_healthy: false,
            reached_unhealthy_rps: false,
        }
    }
}

impl StepController for LinearSearchStepController {
    fn current_rps(&self) -> u32 {
        self.current_rps
    }

    fn is_converged(&self) -> bool {
        self.latest_cycle_healthy && self.reached_unhealthy_rps
    }

    fn update(&mut self, result: &BenchmarkResult) {
        let score = total_weighted_score(result);
        if score < 0.0 {
            self.latest_cycle_healthy = false;
            self.reached_unhealthy_rps = true;
        } else {
            self.latest_cycle_healthy = true;
        }
        let updated = self.current_rps as f64 + self.config.rps_step as f64 * score;
        let clamped = clamp_f64(
            updated,
            self.config.minimum_rps as f64,
            self.config.maximum_rps as f64,
        );
        self.current_rps = clamped.max(0.0) as u32;
    }
}

#[derive(Default)]
pub struct LinearSearchStepControllerFactory;

impl StepControllerFactory for LinearSearchStepControllerFactory {
    fn name(&self) -> &'static str {
        "linear-search"
    }

    fn create(&self, typed_config: &TypedConfig) -> Result<StepControllerPtr, ConfigError> {
        if typed_config.type_url != TYPE_URL {
            return Err(ConfigError::TypeUrlMismatch {
                expected: TYPE_URL.to_string(),
                actual: typed_config.type_url.clone(),
            });
        }
        let config: LinearSearchStepControllerConfig =
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
        Ok(Box::new(LinearSearchStepController::new(config)))
    }
}
