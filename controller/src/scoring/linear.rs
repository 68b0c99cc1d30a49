use serde::{Deserialize, Serialize};
use shared::{ConfigError, TypedConfig};

use super::{clamp, ScoringFunction, ScoringFunctionFactory, ScoringFunctionPtr};

pub const TYPE_URL: &str = "linear";

/// Config for [`LinearScoringFunction`]: a target value and a scaling constant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearScoringFunctionConfig {
    pub threshold: f64,
    pub k: f64,
}

/// Scores a metric as `clamp(k * (threshold - value), -1, 1)` — zero at
/// threshold, positive below it, negative above it, proportional to the
/// distance from threshold until it saturates (spec §4.1, ported from
/// `LinearScoringFunction::EvaluateMetric`).
pub struct LinearScoringFunction {
    threshold: f64,
    k: f64,
}

impl LinearScoringFunction {
    pub fn new(config: LinearScoringFunctionConfig) -> Self {
        Self {
            threshold: config.threshold,
            k: config.k,
        }
    }
}

impl ScoringFunction for LinearScoringFunction {
    fn evaluate(&self, value: f64) -> f64 {
        clamp(self.k * (self.threshold - value), -1.0, 1.0)
    }
}

#[derive(Default)]
pub struct LinearScoringFunctionFactory;

impl ScoringFunctionFactory for LinearScoringFunctionFactory {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn create(&self, typed_config: &TypedConfig) -> Result<ScoringFunctionPtr, ConfigError> {
        if typed_config.type_url != TYPE_URL {
            return Err(ConfigError::TypeUrlMismatch {
                expected: TYPE_URL.to_string(),
                actual: typed_config.type_url.clone(),
            });
        }
        let config: LinearScoringFunctionConfig =
            serde_yaml::from_value(typed_config.value.clone()).map_err(|e| {
                ConfigError::InvalidArgument {
                    category: "scoring_function",
                    name: self.name().to_string(),
                    message: e.to_string(),
                }
            })?;
        Ok(Box::new(LinearScoringFunction::new(config)))
    }
}
