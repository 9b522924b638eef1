use std::sync::Arc;

use crate::domain::plan::{Plan, PlanPair};
use crate::domain::solution::{Evaluation, Solution};
use crate::error::Result;
use crate::fitness::calculator::FitnessCalculator;
use crate::fitness::insertion::InsertionFitness;
use crate::fitness::simple::SimpleFitness;
use crate::scheduling::context::SchedulingContext;

/// Replaces the task order of `plan` with the HEFT ranking, keeping the host found at every position.
fn ranked_plan(ctx: &SchedulingContext, plan: &Plan) -> Plan {
    ctx.ranking().iter().zip(plan.iter()).map(|((task, _), pair)| PlanPair::new(*task, pair.host)).collect()
}

/// Scores the solution's hosts in HEFT rank order with semi-active scheduling.
pub struct RankFitness {
    simple: SimpleFitness,
}

impl RankFitness {
    pub fn new(ctx: Arc<SchedulingContext>) -> Self {
        RankFitness { simple: SimpleFitness::new(ctx) }
    }
}

impl FitnessCalculator for RankFitness {
    fn calculate_fitness(&self, solution: &Solution) -> Result<Evaluation> {
        let plan = ranked_plan(self.context(), &solution.plan);
        let fitness = self.simple.schedule(&plan, self.fitness_name());
        Ok(Evaluation::new(plan, fitness))
    }

    fn fitness_name(&self) -> &'static str {
        "rank"
    }

    fn context(&self) -> &Arc<SchedulingContext> {
        self.simple.context()
    }
}

/// Classic HEFT: rank order plus earliest-finish host selection. The incoming plan is ignored.
pub struct HeuristicFitness {
    heft: InsertionFitness,
}

impl HeuristicFitness {
    pub fn new(ctx: Arc<SchedulingContext>) -> Self {
        HeuristicFitness { heft: InsertionFitness::heft(ctx) }
    }
}

impl FitnessCalculator for HeuristicFitness {
    fn calculate_fitness(&self, solution: &Solution) -> Result<Evaluation> {
        let order = ranked_plan(self.context(), &solution.plan);
        let (plan, fitness) = self.heft.schedule(order.tasks(), self.fitness_name());
        Ok(Evaluation::new(plan, fitness))
    }

    fn fitness_name(&self) -> &'static str {
        "heuristic"
    }

    fn context(&self) -> &Arc<SchedulingContext> {
        self.heft.context()
    }
}
