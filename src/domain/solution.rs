use crate::domain::plan::Plan;
use crate::domain::schedule::{FitnessInfo, MultiResult, Objective};

/// What a fitness calculator hands back: the plan it actually scored, which may differ from the one it
/// received, plus the resulting fitness.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub plan: Plan,
    pub fitness: FitnessInfo,
    pub multi_result: Option<MultiResult>,
}

impl Evaluation {
    pub fn new(plan: Plan, fitness: FitnessInfo) -> Self {
        Evaluation { plan, fitness, multi_result: None }
    }
}

/// A candidate schedule as optimizers see it.
///
/// `arbiter` names the objective the solution is being judged on (`"makespan"` or `"energy"`); ensemble
/// calculators use it to pick their pool. `objectives` is ordered `[makespan, energy]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub plan: Plan,
    pub fitness: Option<FitnessInfo>,
    pub arbiter: String,
    pub objectives: [f64; 2],
    pub multi_result: Option<MultiResult>,
}

impl Solution {
    pub fn new(plan: Plan) -> Self {
        Self::with_arbiter(plan, Objective::Makespan.name())
    }

    pub fn with_arbiter(plan: Plan, arbiter: impl Into<String>) -> Self {
        Solution { plan, fitness: None, arbiter: arbiter.into(), objectives: [f64::INFINITY; 2], multi_result: None }
    }

    /// Copies an evaluation onto this solution, replacing the plan with the one that was scored.
    pub fn apply(&mut self, evaluation: Evaluation) {
        self.objectives = [evaluation.fitness.makespan(), evaluation.fitness.energy()];
        self.plan = evaluation.plan;
        self.fitness = Some(evaluation.fitness);
        self.multi_result = evaluation.multi_result;
    }

    pub fn evaluated(mut self, evaluation: Evaluation) -> Self {
        self.apply(evaluation);
        self
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    pub fn makespan(&self) -> Option<f64> {
        self.fitness.as_ref().map(FitnessInfo::makespan)
    }

    pub fn energy(&self) -> Option<f64> {
        self.fitness.as_ref().map(FitnessInfo::energy)
    }

    /// `true` when `self` is no worse on both objectives and strictly better on one.
    pub fn dominates(&self, other: &Solution) -> bool {
        let no_worse = self.objectives.iter().zip(other.objectives.iter()).all(|(a, b)| a <= b);
        let better = self.objectives.iter().zip(other.objectives.iter()).any(|(a, b)| a < b);
        no_worse && better
    }
}
