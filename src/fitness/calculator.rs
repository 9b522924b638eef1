use std::sync::Arc;

use crate::domain::solution::{Evaluation, Solution};
use crate::error::Result;
use crate::scheduling::context::SchedulingContext;

/// Turns a candidate solution into objective values by simulating its execution.
///
/// Calculators are read-only after construction, so one instance may be shared by many worker threads. Every
/// call allocates its own `Evaluation`; the caller's solution is never touched. Calculators that reorder or
/// replace the plan return the plan they actually scored in `Evaluation::plan`.
pub trait FitnessCalculator: Send + Sync {
    fn calculate_fitness(&self, solution: &Solution) -> Result<Evaluation>;

    fn fitness_name(&self) -> &'static str;

    /// Matrices and ranking this calculator works with.
    fn context(&self) -> &Arc<SchedulingContext>;
}
