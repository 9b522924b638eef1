use std::sync::Arc;

use crate::domain::ids::{HostIdx, TaskIdx};
use crate::domain::plan::{Plan, PlanPair};
use crate::domain::schedule::{FitnessInfo, TaskSchedule};
use crate::domain::solution::{Evaluation, Solution};
use crate::error::Result;
use crate::fitness::calculator::FitnessCalculator;
use crate::scheduling::context::SchedulingContext;
use crate::scheduling::timeline::{SchedulingMode, Timeline};

/// Rule used to choose a host for each task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostPolicy {
    /// Host giving the smallest eft.
    EarliestFinish,

    /// Host adding the least energy: the task's active energy plus the standby energy of the makespan growth.
    EnergyDelta,

    /// Host with the smallest active energy for the task.
    MinEnergy,

    /// Tasks longer than the mean runtime get the earliest finishing host, the others the cheapest one.
    FastForLarge,
}

/// List scheduler that keeps the plan's task order but chooses the host of every task itself.
///
/// With `SchedulingMode::Active` each host keeps a list of idle gaps and a task may be inserted before work
/// that was committed earlier. Ties between hosts go to the first host in instance order.
pub struct InsertionFitness {
    ctx: Arc<SchedulingContext>,
    policy: HostPolicy,
    mode: SchedulingMode,
}

struct Candidate {
    host: HostIdx,
    ast: f64,
    eft: f64,
    score: f64,
}

impl InsertionFitness {
    pub fn new(ctx: Arc<SchedulingContext>, policy: HostPolicy, mode: SchedulingMode) -> Self {
        InsertionFitness { ctx, policy, mode }
    }

    /// Plain HEFT host selection with gap insertion.
    pub fn heft(ctx: Arc<SchedulingContext>) -> Self {
        Self::new(ctx, HostPolicy::EarliestFinish, SchedulingMode::Active)
    }

    pub fn heft_energy(ctx: Arc<SchedulingContext>, mode: SchedulingMode) -> Self {
        Self::new(ctx, HostPolicy::EnergyDelta, mode)
    }

    pub fn min_energy_um(ctx: Arc<SchedulingContext>, mode: SchedulingMode) -> Self {
        Self::new(ctx, HostPolicy::MinEnergy, mode)
    }

    pub fn fast_for_large_tasks(ctx: Arc<SchedulingContext>, mode: SchedulingMode) -> Self {
        Self::new(ctx, HostPolicy::FastForLarge, mode)
    }

    pub fn policy(&self) -> HostPolicy {
        self.policy
    }

    pub fn mode(&self) -> SchedulingMode {
        self.mode
    }

    /// Schedules the tasks in the order given and returns the plan with the chosen hosts.
    pub(crate) fn schedule(&self, order: impl Iterator<Item = TaskIdx>, fitness_function: &str) -> (Plan, FitnessInfo) {
        let instance = self.ctx.instance();
        let mut timeline = Timeline::new(self.mode, instance.host_count());
        let mut placed: Vec<Option<TaskSchedule>> = vec![None; instance.task_count()];
        let mut plan = Vec::with_capacity(instance.task_count());
        let mut schedule = Vec::with_capacity(instance.task_count());
        let mut makespan = 0.0_f64;
        let mut active_energy = 0.0;

        for task in order {
            let policy = self.effective_policy(task);
            let mut best: Option<Candidate> = None;

            for host in instance.host_indices() {
                let costs = self.ctx.task_costs(task, host, &placed);
                let duration = costs.duration();
                let ast = timeline.find_start(host, costs.ready, duration);
                let eft = ast + duration;
                let score = match policy {
                    HostPolicy::EarliestFinish | HostPolicy::FastForLarge => eft,
                    HostPolicy::MinEnergy => self.ctx.active_energy(host, duration),
                    HostPolicy::EnergyDelta => {
                        self.ctx.active_energy(host, duration) + self.ctx.standby_energy((eft - makespan).max(0.0))
                    }
                };

                let candidate = Candidate { host, ast, eft, score };
                let is_better = match &best {
                    None => true,
                    Some(current) => candidate.score < current.score || (candidate.score == current.score && candidate.eft < current.eft),
                };
                if is_better {
                    best = Some(candidate);
                }
            }

            let Some(chosen) = best else {
                log::error!("No host available for task {}.", instance.task_id(task));
                continue;
            };

            timeline.commit(chosen.host, chosen.ast, chosen.eft);
            let task_schedule = TaskSchedule::new(task, chosen.ast, chosen.eft, chosen.host);
            placed[task.0] = Some(task_schedule);
            schedule.push(task_schedule);
            plan.push(PlanPair::new(task, chosen.host));

            makespan = makespan.max(chosen.eft);
            active_energy += self.ctx.active_energy(chosen.host, chosen.eft - chosen.ast);
        }

        let energy = active_energy + self.ctx.standby_energy(makespan);
        log::debug!("{}: makespan {:.4}, energy {:.4}.", fitness_function, makespan, energy);

        (Plan::new(plan), FitnessInfo::new(makespan, energy, schedule, fitness_function))
    }

    fn effective_policy(&self, task: TaskIdx) -> HostPolicy {
        match self.policy {
            HostPolicy::FastForLarge if self.ctx.instance().task(task).runtime <= self.ctx.mean_runtime() => HostPolicy::MinEnergy,
            other => other,
        }
    }
}

impl FitnessCalculator for InsertionFitness {
    fn calculate_fitness(&self, solution: &Solution) -> Result<Evaluation> {
        let (plan, fitness) = self.schedule(solution.plan.tasks(), self.fitness_name());
        Ok(Evaluation::new(plan, fitness))
    }

    fn fitness_name(&self) -> &'static str {
        match (self.policy, self.mode) {
            (HostPolicy::EarliestFinish, SchedulingMode::Active) => "heft",
            (HostPolicy::EarliestFinish, SchedulingMode::SemiActive) => "heft-semi-active",
            (HostPolicy::EnergyDelta, SchedulingMode::Active) => "heft-energy-active",
            (HostPolicy::EnergyDelta, SchedulingMode::SemiActive) => "heft-energy-semi-active",
            (HostPolicy::MinEnergy, SchedulingMode::Active) => "min-energy-UM-active",
            (HostPolicy::MinEnergy, SchedulingMode::SemiActive) => "min-energy-UM-semi-active",
            (HostPolicy::FastForLarge, SchedulingMode::Active) => "fvlt-me-active",
            (HostPolicy::FastForLarge, SchedulingMode::SemiActive) => "fvlt-me-semi-active",
        }
    }

    fn context(&self) -> &Arc<SchedulingContext> {
        &self.ctx
    }
}
