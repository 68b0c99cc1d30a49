//! Plugin registry (C5): resolves a `(category, name, typed-config)` triple
//! to an instantiated plugin. Write-once-read-many, process-wide, and the
//! only process-wide state in the system (spec §9, "Avoid shared mutable
//! globals").

use std::collections::HashMap;

use shared::{ConfigError, MetricsSourceConfig, ScoringFunctionConfig, StepControllerConfig};

use crate::metrics::{MetricsSourceFactoryPtr, MetricsSourcePtr};
use crate::scoring::{
    LinearScoringFunctionFactory, ScoringFunctionFactoryPtr, ScoringFunctionPtr,
    SigmoidScoringFunctionFactory,
};
use crate::step_controller::{
    BinarySearchStepControllerFactory, LinearSearchStepControllerFactory, StepControllerFactoryPtr,
    StepControllerPtr,
};

/// Registers a plugin factory under a unique `(category, name)` key.
/// Collisions at registration are fatal at process start (spec §4.5).
#[derive(Default)]
pub struct PluginRegistry {
    scoring_functions: HashMap<String, ScoringFunctionFactoryPtr>,
    metrics_sources: HashMap<String, MetricsSourceFactoryPtr>,
    step_controllers: HashMap<String, StepControllerFactoryPtr>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a scoring function factory. Panics on name collision: per
    /// spec §4.5 this is a fatal process-start error, not a recoverable one.
    pub fn register_scoring_function(&mut self, factory: ScoringFunctionFactoryPtr) {
        let name = factory.name().to_string();
        if self.scoring_functions.insert(name.clone(), factory).is_some() {
            panic!("duplicate scoring_function plugin registration for '{name}'");
        }
    }

    pub fn register_metrics_source(&mut self, factory: MetricsSourceFactoryPtr) {
        let name = factory.name().to_string();
        if self.metrics_sources.insert(name.clone(), factory).is_some() {
            panic!("duplicate metrics_source plugin registration for '{name}'");
        }
    }

    pub fn register_step_controller(&mut self, factory: StepControllerFactoryPtr) {
        let name = factory.name().to_string();
        if self.step_controllers.insert(name.clone(), factory).is_some() {
            panic!("duplicate step_controller plugin registration for '{name}'");
        }
    }

    pub fn load_scoring_function(
        &self,
        config: &ScoringFunctionConfig,
    ) -> Result<ScoringFunctionPtr, ConfigError> {
        let factory = self.scoring_functions.get(&config.name).ok_or_else(|| {
            ConfigError::UnknownPlugin {
                category: "scoring_function",
                name: config.name.clone(),
            }
        })?;
        factory.create(&config.typed_config)
    }

    pub fn load_metrics_source(
        &self,
        config: &MetricsSourceConfig,
    ) -> Result<MetricsSourcePtr, ConfigError> {
        let factory = self.metrics_sources.get(&config.name).ok_or_else(|| {
            ConfigError::UnknownPlugin {
                category: "metrics_source",
                name: config.name.clone(),
            }
        })?;
        factory.create(&config.typed_config)
    }

    pub fn load_step_controller(
        &self,
        config: &StepControllerConfig,
    ) -> Result<StepControllerPtr, ConfigError> {
        let factory = self.step_controllers.get(&config.name).ok_or_else(|| {
            ConfigError::UnknownPlugin {
                category: "step_controller",
                name: config.name.clone(),
            }
        })?;
        factory.create(&config.typed_config)
    }
}

/// Registers the built-in scoring function and step controller plugins.
/// Called once, explicitly, at process start (spec §4.5, §9 — preferred over
/// implicit static-init ordering). No built-in metrics sources are
/// registered here: the only shipped metrics source is the built-in one
/// (C3), which is constructed directly by the evaluator per iteration rather
/// than resolved through the registry.
pub fn register_builtin_plugins(registry: &mut PluginRegistry) {
    registry.register_scoring_function(Box::new(LinearScoringFunctionFactory));
    registry.register_scoring_function(Box::new(SigmoidScoringFunctionFactory));
    registry.register_step_controller(Box::new(LinearSearchStepControllerFactory));
    registry.register_step_controller(Box::new(BinarySearchStepControllerFactory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::TypedConfig;

    #[test]
    fn resolves_registered_scoring_function_by_name() {
        let mut registry = PluginRegistry::new();
        register_builtin_plugins(&mut registry);
        let config = ScoringFunctionConfig {
            name: "linear".to_string(),
            typed_config: TypedConfig::new(
                "linear",
                crate::scoring::LinearScoringFunctionConfig {
                    threshold: 100.0,
                    k: 0.01,
                },
            ),
        };
        let scoring_function = registry.load_scoring_function(&config).unwrap();
        assert_eq!(scoring_function.evaluate(100.0), 0.0);
    }

    #[test]
    fn unknown_plugin_name_is_a_structured_error() {
        let registry = PluginRegistry::new();
        let config = ScoringFunctionConfig {
            name: "nonexistent".to_string(),
            typed_config: TypedConfig::new("nonexistent", serde_yaml::Mapping::new()),
        };
        let err = registry.load_scoring_function(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownPlugin {
                category: "scoring_function",
                ..
            }
        ));
    }

    #[test]
    #[should_panic(expected = "duplicate scoring_function plugin registration")]
    fn duplicate_registration_panics() {
        let mut registry = PluginRegistry::new();
        registry.register_scoring_function(Box::new(LinearScoringFunctionFactory));
        registry.register_scoring_function(Box::new(LinearScoringFunctionFactory));
    }
}
