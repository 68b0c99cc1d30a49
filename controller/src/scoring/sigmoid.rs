use serde::{Deserialize, Serialize};
use shared::{ConfigError, TypedConfig};

use super::{ScoringFunction, ScoringFunctionFactory, ScoringFunctionPtr};

pub const TYPE_URL: &str = "sigmoid";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigmoidScoringFunctionConfig {
    pub threshold: f64,
    /// Tuning constant; `k ~= 1/threshold` is the recommended starting point.
    pub k: f64,
}

/// Scores a metric as `1 - 2 / (1 + exp(-k * (value - threshold)))`: an
/// upside-down sigmoid centered on `threshold`, asymptoting to `+1` far below
/// it and `-1` far above it (spec §4.1, ported from
/// `SigmoidScoringFunction::EvaluateMetric`). Already bounded to `[-1, 1]` by
/// construction, no clamp needed.
pub struct SigmoidScoringFunction {
    threshold: f64,
    k: f64,
}

impl SigmoidScoringFunction {
    pub fn new(config: SigmoidScoringFunctionConfig) -> Self {
        Self {
            threshold: config.threshold,
            k: config.k,
        }
    }
}

impl ScoringFunction for SigmoidScoringFunction {
    fn evaluate(&self, value: f64) -> f64 {
        1.0 - 2.0 / (1.0 + (-self.k * (value - self.threshold)).exp())
    }
}

#[derive(Default)]
pub struct SigmoidScoringFunctionFactory;

impl ScoringFunctionFactory for SigmoidScoringFunctionFactory {
    fn name(&self) -> &'static str {
        "sigmoid"
    }

    fn create(&self, typed_config: &TypedConfig) -> Result<ScoringFunctionPtr, ConfigError> {
        if typed_config.type_url != TYPE_URL {
            return Err(ConfigError::TypeUrlMismatch {
                expected: TYPE_URL.to_string(),
                actual: typed_config.type_url.clone(),
            });
        }
        let config: SigmoidScoringFunctionConfig = serde_yaml::from_value(typed_config.value.clone())
            .map_err(|e| ConfigError::InvalidArgument {
                category: "scoring_function",
                name: self.name().to_string(),
                message: e.to_string(),
            })?;
        Ok(Box::new(SigmoidScoringFunction::new(config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_at_threshold() {
        let f = SigmoidScoringFunction::new(SigmoidScoringFunctionConfig {
            threshold: 0.95,
            k: 10.0,
        });
        assert!((f.evaluate(0.95) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn asymptotes_stay_within_unit_interval() {
        let f = SigmoidScoringFunction::new(SigmoidScoringFunctionConfig {
            threshold: 0.95,
            k: 10.0,
        });
        assert!(f.evaluate(-1000.0) <= 1.0 && f.evaluate(-1000.0) > 0.99);
        assert!(f.evaluate(1000.0) >= -1.0 && f.evaluate(1000.0) < -0.99);
    }

    #[test]
    fn polarity_matches_contract() {
        let f = SigmoidScoringFunction::new(SigmoidScoringFunctionConfig {
            threshold: 0.95,
            k: 10.0,
        });
        assert!(f.evaluate(0.5) > 0.0);
        assert!(f.evaluate(0.99) < 0.0);
    }
}
