use std::sync::Arc;

use crate::domain::plan::Plan;
use crate::domain::schedule::{FitnessInfo, TaskSchedule};
use crate::domain::solution::{Evaluation, Solution};
use crate::error::Result;
use crate::fitness::calculator::FitnessCalculator;
use crate::scheduling::context::SchedulingContext;
use crate::scheduling::timeline::{SchedulingMode, Timeline};

/// Semi-active scheduling: tasks run strictly in plan order on the host the plan names.
pub struct SimpleFitness {
    ctx: Arc<SchedulingContext>,
}

impl SimpleFitness {
    pub fn new(ctx: Arc<SchedulingContext>) -> Self {
        SimpleFitness { ctx }
    }

    /// Simulates `plan` and returns its fitness, labelled with `fitness_function`.
    pub(crate) fn schedule(&self, plan: &Plan, fitness_function: &str) -> FitnessInfo {
        let instance = self.ctx.instance();
        let mut timeline = Timeline::new(SchedulingMode::SemiActive, instance.host_count());
        let mut placed: Vec<Option<TaskSchedule>> = vec![None; instance.task_count()];
        let mut schedule = Vec::with_capacity(plan.len());
        let mut makespan = 0.0_f64;
        let mut active_energy = 0.0;

        for pair in plan.iter() {
            let costs = self.ctx.task_costs(pair.task, pair.host, &placed);
            let duration = costs.duration();
            let ast = timeline.find_start(pair.host, costs.ready, duration);
            let eft = ast + duration;

            timeline.commit(pair.host, ast, eft);
            let task_schedule = TaskSchedule::new(pair.task, ast, eft, pair.host);
            placed[pair.task.0] = Some(task_schedule);
            schedule.push(task_schedule);

            makespan = makespan.max(eft);
            active_energy += self.ctx.active_energy(pair.host, duration);
        }

        let energy = active_energy + self.ctx.standby_energy(makespan);
        log::debug!("{}: makespan {:.4}, energy {:.4}.", fitness_function, makespan, energy);

        FitnessInfo::new(makespan, energy, schedule, fitness_function)
    }
}

impl FitnessCalculator for SimpleFitness {
    fn calculate_fitness(&self, solution: &Solution) -> Result<Evaluation> {
        let fitness = self.schedule(&solution.plan, self.fitness_name());
        Ok(Evaluation::new(solution.plan.clone(), fitness))
    }

    fn fitness_name(&self) -> &'static str {
        "simple"
    }

    fn context(&self) -> &Arc<SchedulingContext> {
        &self.ctx
    }
}
