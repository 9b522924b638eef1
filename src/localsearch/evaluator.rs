use std::sync::Arc;

use crate::domain::ids::TaskIdx;
use crate::domain::plan::Plan;
use crate::domain::schedule::{FitnessInfo, TaskSchedule};
use crate::domain::solution::Solution;
use crate::error::{Error, Result};
use crate::localsearch::movement::Movement;
use crate::localsearch::neighborhood::{children_positions, parents_positions};
use crate::scheduling::context::SchedulingContext;

pub const INCREMENTAL_FITNESS_NAME: &str = "incremental evaluator";

/// Scores a neighbour from the baseline's schedule instead of simulating it from scratch.
///
/// The baseline must have been evaluated with semi-active scheduling (`SimpleFitness`). The neighbour must
/// differ from the baseline's plan by exactly the given movement. Under those conditions the result matches a
/// full semi-active simulation of the neighbour within floating point tolerance.
pub struct LocalSearchEvaluator {
    ctx: Arc<SchedulingContext>,
}

impl LocalSearchEvaluator {
    pub fn new(ctx: Arc<SchedulingContext>) -> Self {
        LocalSearchEvaluator { ctx }
    }

    pub fn context(&self) -> &Arc<SchedulingContext> {
        &self.ctx
    }

    /// Fitness of `neighbor`, obtained from `baseline` and the `movement` between them.
    ///
    /// Works in two phases:
    /// 1. **Patch**: tasks whose host changed get their duration recomputed on the new host, and each of their
    ///    direct children has its eft shifted by the difference in communication time with that parent.
    /// 2. **Resimulate**: the neighbour plan is replayed. Positions before the first changed one keep the
    ///    (patched) baseline times; from there on every task starts at `max(host free, max parent eft)` and
    ///    keeps its (patched) baseline duration.
    ///
    /// # Errors
    /// `Error::UnevaluatedBaseline` if `baseline` carries no fitness, `Error::MissingBaselineTask` if a task of
    /// `neighbor` has no entry in the baseline schedule.
    pub fn evaluate(&self, baseline: &Solution, neighbor: &Plan, movement: &Movement) -> Result<FitnessInfo> {
        let fitness = baseline.fitness.as_ref().ok_or(Error::UnevaluatedBaseline)?;

        let mut times = self.baseline_times(fitness);
        let changed = movement.changed_host_positions();
        if !changed.is_empty() {
            self.patch_durations(&mut times, neighbor, &changed)?;
        }

        self.resimulate(&times, neighbor, movement.first_change_position())
    }

    /// `baseline makespan - neighbour makespan`, positive when the neighbour is faster.
    ///
    /// # Errors
    /// `Error::UnevaluatedBaseline` if `baseline` carries no fitness.
    pub fn compute_makespan_enhancement(&self, baseline: &Solution, neighbor: &Plan, movement: &Movement) -> Result<f64> {
        let neighbor_fitness = self.evaluate(baseline, neighbor, movement)?;
        let baseline_makespan = baseline.makespan().ok_or(Error::UnevaluatedBaseline)?;
        Ok(baseline_makespan - neighbor_fitness.makespan())
    }

    /// Baseline schedule indexed by task.
    fn baseline_times(&self, fitness: &FitnessInfo) -> Vec<Option<TaskSchedule>> {
        let mut times = vec![None; self.ctx.instance().task_count()];
        for ts in &fitness.schedule {
            times[ts.task.0] = Some(*ts);
        }
        times
    }

    fn missing(&self, task: TaskIdx) -> Error {
        let id = self.ctx.instance().task_id(task);
        log::error!("Task {} is missing from the baseline schedule.", id);
        Error::MissingBaselineTask(id.to_string())
    }

    fn patch_durations(&self, times: &mut [Option<TaskSchedule>], plan: &Plan, changed: &[usize]) -> Result<()> {
        for &position in changed {
            let task = plan[position].task;
            let original = times[task.0].ok_or_else(|| self.missing(task))?;

            let parents = parents_positions(self.ctx.instance(), plan, position);
            let new_eft = original.ast + self.duration_in_plan(plan, position, &parents);
            times[task.0] = Some(TaskSchedule::new(task, original.ast, new_eft, original.host));

            for child_position in children_positions(self.ctx.instance(), plan, position) {
                let child = plan[child_position];
                let child_schedule = times[child.task.0].ok_or_else(|| self.missing(child.task))?;

                let old_communication = self.ctx.communication_time(child.task, child_schedule.host, task, original.host);
                let new_communication = self.ctx.communication_time(child.task, child.host, task, plan[position].host);
                let child_eft = child_schedule.eft - old_communication + new_communication;

                times[child.task.0] = Some(TaskSchedule::new(child.task, child_schedule.ast, child_eft, child_schedule.host));
            }
        }
        Ok(())
    }

    /// Full duration of the task at `position` with the hosts the plan gives it and its parents.
    fn duration_in_plan(&self, plan: &Plan, position: usize, parents: &[usize]) -> f64 {
        let (task, host) = (plan[position].task, plan[position].host);
        let instance = self.ctx.instance();
        let disk_speed = instance.host(host).disk_speed as f64;

        let staging = self.ctx.network().staging(task) as f64 / disk_speed;
        let write = instance.task(task).output.size_in_bits() as f64 / disk_speed;
        let computation = self.ctx.computation().get(task, host);
        let communications: f64 = parents.iter().map(|&p| self.ctx.communication_time(task, host, plan[p].task, plan[p].host)).sum();

        staging + write + computation + communications
    }

    fn resimulate(&self, times: &[Option<TaskSchedule>], plan: &Plan, first_change: usize) -> Result<FitnessInfo> {
        let instance = self.ctx.instance();
        let mut available = vec![0.0_f64; instance.host_count()];
        let mut placed: Vec<Option<TaskSchedule>> = vec![None; instance.task_count()];
        let mut schedule = Vec::with_capacity(plan.len());
        let mut makespan = 0.0_f64;
        let mut active_energy = 0.0;

        for (position, pair) in plan.iter().enumerate() {
            let original = times[pair.task.0].ok_or_else(|| self.missing(pair.task))?;
            let duration = original.duration();

            let (ast, eft) = if position >= first_change {
                let parents_max_eft =
                    instance.task(pair.task).parents.iter().filter_map(|p| placed[p.0]).map(|ts| ts.eft).fold(0.0, f64::max);
                let ast = available[pair.host.0].max(parents_max_eft);
                (ast, ast + duration)
            } else {
                (original.ast, original.eft)
            };

            available[pair.host.0] = eft;
            let task_schedule = TaskSchedule::new(pair.task, ast, eft, pair.host);
            placed[pair.task.0] = Some(task_schedule);
            schedule.push(task_schedule);

            makespan = makespan.max(eft);
            active_energy += self.ctx.active_energy(pair.host, duration);
        }

        let energy = active_energy + self.ctx.standby_energy(makespan);
        Ok(FitnessInfo::new(makespan, energy, schedule, INCREMENTAL_FITNESS_NAME))
    }
}
