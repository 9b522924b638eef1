use std::sync::{Arc, Mutex};

use crate::domain::schedule::{MultiResult, Objective};
use crate::domain::solution::{Evaluation, Solution};
use crate::error::{Error, Result};
use crate::fitness::calculator::FitnessCalculator;
use crate::scheduling::context::SchedulingContext;

/// Append-only record of which ensemble member won each evaluation.
pub type EvaluationHistory = Arc<Mutex<Vec<MultiResult>>>;

/// Ensemble calculator.
///
/// The objective is the override when one is configured, otherwise the solution's arbiter. Every member of the
/// matching pool scores the solution and the result with the lowest value for that objective is returned.
pub struct MultiFitness {
    ctx: Arc<SchedulingContext>,
    makespan_pool: Vec<Box<dyn FitnessCalculator>>,
    energy_pool: Vec<Box<dyn FitnessCalculator>>,
    objective_override: Option<Objective>,
    history: Option<EvaluationHistory>,
}

impl MultiFitness {
    pub fn new(
        ctx: Arc<SchedulingContext>,
        makespan_pool: Vec<Box<dyn FitnessCalculator>>,
        energy_pool: Vec<Box<dyn FitnessCalculator>>,
        objective_override: Option<Objective>,
        history: Option<EvaluationHistory>,
    ) -> Self {
        MultiFitness { ctx, makespan_pool, energy_pool, objective_override, history }
    }

    pub fn objective_override(&self) -> Option<Objective> {
        self.objective_override
    }

    fn pool(&self, objective: Objective) -> &[Box<dyn FitnessCalculator>] {
        match objective {
            Objective::Makespan => &self.makespan_pool,
            Objective::Energy => &self.energy_pool,
        }
    }

    fn record(&self, result: &MultiResult) {
        let Some(history) = &self.history else {
            return;
        };
        match history.lock() {
            Ok(mut entries) => entries.push(result.clone()),
            Err(poisoned) => {
                log::warn!("Evaluation history lock was poisoned, recording anyway.");
                poisoned.into_inner().push(result.clone());
            }
        }
    }
}

impl FitnessCalculator for MultiFitness {
    fn calculate_fitness(&self, solution: &Solution) -> Result<Evaluation> {
        let objective = match self.objective_override {
            Some(objective) => objective,
            None => solution.arbiter.parse::<Objective>()?,
        };

        let mut best: Option<Evaluation> = None;
        for calculator in self.pool(objective) {
            let evaluation = calculator.calculate_fitness(solution)?;
            let is_better = best.as_ref().is_none_or(|current| evaluation.fitness.get(objective) < current.fitness.get(objective));
            if is_better {
                best = Some(evaluation);
            }
        }

        let mut best = best.ok_or_else(|| Error::EmptyCalculatorPool(objective.name().to_string()))?;

        let result = MultiResult {
            makespan: best.fitness.makespan(),
            energy: best.fitness.energy(),
            fitness_function: best.fitness.fitness_function.clone(),
            arbiter: solution.arbiter.clone(),
        };
        log::debug!("multi ({}): '{}' won with {:.4}.", objective, result.fitness_function, best.fitness.get(objective));

        self.record(&result);
        best.multi_result = Some(result);
        Ok(best)
    }

    fn fitness_name(&self) -> &'static str {
        "multi"
    }

    fn context(&self) -> &Arc<SchedulingContext> {
        &self.ctx
    }
}
