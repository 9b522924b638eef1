use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::domain::instance::InstanceData;
use crate::domain::schedule::Objective;
use crate::domain::solution::Solution;
use crate::error::Result;
use crate::fitness::calculator::FitnessCalculator;
use crate::fitness::factory::build_fitness;
use crate::fitness::multi::EvaluationHistory;
use crate::loader::parser::parse_json_file;
use crate::loader::units::parse_units;
use crate::localsearch::evaluator::LocalSearchEvaluator;
use crate::scheduling::context::SchedulingContext;

fn default_fitness() -> String {
    "simple".to_string()
}

fn default_reference_flops() -> String {
    "1Gf".to_string()
}

/// Engine settings as read from a JSON file. Every field has a default.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Fitness name resolved through the factory, e.g. `"heft"` or `"multi-energy"`.
    #[serde(default = "default_fitness")]
    pub fitness: String,

    /// Speed of the machine the task runtimes were measured on.
    #[serde(default = "default_reference_flops")]
    pub reference_flops: String,

    /// Forces a `multi*` ensemble onto a single objective (`"makespan"` or `"energy"`).
    #[serde(default)]
    pub objective_override: Option<String>,

    /// Keep every ensemble evaluation in a shared history.
    #[serde(default)]
    pub record_history: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig { fitness: default_fitness(), reference_flops: default_reference_flops(), objective_override: None, record_history: false }
    }
}

impl EngineConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config: EngineConfig = parse_json_file(path)?;
        log::debug!("Engine configuration loaded: {:?}", config);
        Ok(config)
    }

    pub fn reference_flops(&self) -> Result<u64> {
        parse_units(&self.reference_flops)
    }

    /// # Errors
    /// `Error::UnsupportedArbiter` if the override names no known objective.
    pub fn objective_override(&self) -> Result<Option<Objective>> {
        self.objective_override.as_deref().map(str::parse).transpose()
    }
}

/// One instance wired with its configured calculator and the incremental evaluator.
///
/// All parts share the same `SchedulingContext`, so the precomputed matrices are built once.
pub struct Engine {
    ctx: Arc<SchedulingContext>,
    calculator: Box<dyn FitnessCalculator>,
    evaluator: LocalSearchEvaluator,
    history: Option<EvaluationHistory>,
}

impl Engine {
    pub fn new(instance: Arc<InstanceData>, config: &EngineConfig) -> Result<Self> {
        let objective_override = config.objective_override()?;
        let ctx = Arc::new(SchedulingContext::new(instance));
        let history: Option<EvaluationHistory> = config.record_history.then(EvaluationHistory::default);

        let calculator = build_fitness(&config.fitness, Arc::clone(&ctx), history.clone(), objective_override)?;
        let evaluator = LocalSearchEvaluator::new(Arc::clone(&ctx));

        log::info!(
            "Engine ready: fitness '{}' on {} tasks and {} hosts.",
            calculator.fitness_name(),
            ctx.instance().task_count(),
            ctx.instance().host_count()
        );

        Ok(Engine { ctx, calculator, evaluator, history })
    }

    pub fn context(&self) -> &Arc<SchedulingContext> {
        &self.ctx
    }

    pub fn calculator(&self) -> &dyn FitnessCalculator {
        self.calculator.as_ref()
    }

    pub fn evaluator(&self) -> &LocalSearchEvaluator {
        &self.evaluator
    }

    pub fn history(&self) -> Option<&EvaluationHistory> {
        self.history.as_ref()
    }

    /// Evaluates `solution` with the configured calculator and stores the result in it.
    pub fn evaluate(&self, solution: &mut Solution) -> Result<()> {
        let evaluation = self.calculator.calculate_fitness(solution)?;
        solution.apply(evaluation);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::loader::parser::parse_json_str;

    #[test]
    fn test_config_defaults() {
        let config: EngineConfig = parse_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.reference_flops().unwrap(), 1_000_000_000);
        assert_eq!(config.objective_override().unwrap(), None);
    }

    #[test]
    fn test_config_objective_override() {
        let config: EngineConfig = parse_json_str(r#"{ "fitness": "multi", "objectiveOverride": "energy" }"#).unwrap();
        assert_eq!(config.objective_override().unwrap(), Some(Objective::Energy));

        let config: EngineConfig = parse_json_str(r#"{ "objectiveOverride": "latency" }"#).unwrap();
        assert!(matches!(config.objective_override(), Err(Error::UnsupportedArbiter(_))));
    }
}
