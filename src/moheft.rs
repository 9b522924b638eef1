use std::sync::Arc;

use crate::domain::instance::InstanceData;
use crate::domain::plan::{Plan, PlanPair};
use crate::domain::schedule::{FitnessInfo, TaskSchedule};
use crate::domain::solution::{Evaluation, Solution};
use crate::scheduling::context::SchedulingContext;
use crate::scheduling::timeline::{SchedulingMode, Timeline};

pub const MOHEFT_FITNESS_NAME: &str = "MOHEFT";

/// Multi-objective HEFT.
///
/// Tasks are taken in HEFT rank order. Every kept partial schedule is extended with the next task on every
/// host (insertion scheduling), then only the first non-dominated front of (makespan, energy) survives,
/// trimmed to the `k` most spread out members by crowding distance.
pub struct MoHeft {
    ctx: Arc<SchedulingContext>,
}

#[derive(Clone)]
struct PartialSchedule {
    plan: Vec<PlanPair>,
    placed: Vec<Option<TaskSchedule>>,
    timeline: Timeline,
    makespan: f64,
    active_energy: f64,
}

impl PartialSchedule {
    fn empty(instance: &InstanceData) -> Self {
        PartialSchedule {
            plan: Vec::with_capacity(instance.task_count()),
            placed: vec![None; instance.task_count()],
            timeline: Timeline::new(SchedulingMode::Active, instance.host_count()),
            makespan: 0.0,
            active_energy: 0.0,
        }
    }

    fn objectives(&self, ctx: &SchedulingContext) -> [f64; 2] {
        [self.makespan, self.active_energy + ctx.standby_energy(self.makespan)]
    }

    fn into_solution(self, ctx: &SchedulingContext) -> Solution {
        let [makespan, energy] = self.objectives(ctx);
        let schedule: Vec<TaskSchedule> = self.placed.into_iter().flatten().collect();
        let fitness = FitnessInfo::new(makespan, energy, schedule, MOHEFT_FITNESS_NAME);
        let plan = Plan::new(self.plan);
        Solution::with_arbiter(plan.clone(), "energy").evaluated(Evaluation::new(plan, fitness))
    }
}

impl MoHeft {
    pub fn new(ctx: Arc<SchedulingContext>) -> Self {
        MoHeft { ctx }
    }

    pub fn from_instance(instance: Arc<InstanceData>) -> Self {
        Self::new(Arc::new(SchedulingContext::new(instance)))
    }

    /// Runs the algorithm and returns at most `k` pairwise non-dominated evaluated solutions.
    pub fn calculate(&self, k: usize) -> Vec<Solution> {
        if k == 0 {
            return Vec::new();
        }

        let instance = self.ctx.instance();
        let mut partials = vec![PartialSchedule::empty(instance)];

        for (task, _) in self.ctx.ranking() {
            let mut extended = Vec::with_capacity(partials.len() * instance.host_count());

            for partial in &partials {
                for host in instance.host_indices() {
                    let mut next = partial.clone();
                    let costs = self.ctx.task_costs(*task, host, &next.placed);
                    let duration = costs.duration();
                    let ast = next.timeline.find_start(host, costs.ready, duration);
                    let eft = ast + duration;

                    next.timeline.commit(host, ast, eft);
                    next.placed[task.0] = Some(TaskSchedule::new(*task, ast, eft, host));
                    next.plan.push(PlanPair::new(*task, host));
                    next.makespan = next.makespan.max(eft);
                    next.active_energy += self.ctx.active_energy(host, duration);

                    extended.push(next);
                }
            }

            partials = self.prune(extended, k);
        }

        log::info!("MOHEFT kept {} solutions.", partials.len());
        partials.into_iter().map(|p| p.into_solution(&self.ctx)).collect()
    }

    fn prune(&self, candidates: Vec<PartialSchedule>, k: usize) -> Vec<PartialSchedule> {
        let points: Vec<[f64; 2]> = candidates.iter().map(|c| c.objectives(&self.ctx)).collect();
        let front = first_front(&points);
        let distances = crowding_distance(&points, &front);

        let mut order: Vec<usize> = (0..front.len()).collect();
        order.sort_by(|a, b| distances[*b].total_cmp(&distances[*a]));
        order.truncate(k);

        let mut slots: Vec<Option<PartialSchedule>> = candidates.into_iter().map(Some).collect();
        order.into_iter().filter_map(|i| slots[front[i]].take()).collect()
    }
}

fn dominates(a: &[f64; 2], b: &[f64; 2]) -> bool {
    a.iter().zip(b).all(|(x, y)| x <= y) && a.iter().zip(b).any(|(x, y)| x < y)
}

/// Indices of the points no other point dominates, in input order.
pub(crate) fn first_front(points: &[[f64; 2]]) -> Vec<usize> {
    (0..points.len()).filter(|&i| !points.iter().any(|other| dominates(other, &points[i]))).collect()
}

/// Crowding distance of every member of `front`, in `front` order.
///
/// Boundary points of each objective get `f64::INFINITY`. Inner points accumulate the normalized distance
/// between their neighbours, objectives without spread contribute nothing.
pub(crate) fn crowding_distance(points: &[[f64; 2]], front: &[usize]) -> Vec<f64> {
    let mut distances = vec![0.0; front.len()];
    if front.len() <= 2 {
        return vec![f64::INFINITY; front.len()];
    }

    let objective_count = points[front[0]].len();
    for objective in 0..objective_count {
        let mut sorted: Vec<usize> = (0..front.len()).collect();
        sorted.sort_by(|a, b| points[front[*a]][objective].total_cmp(&points[front[*b]][objective]));

        let first = sorted[0];
        let last = sorted[sorted.len() - 1];
        distances[first] = f64::INFINITY;
        distances[last] = f64::INFINITY;

        let spread = (points[front[last]][objective] - points[front[first]][objective]).abs();
        if spread > 0.0 {
            let norm = 1.0 / (spread * objective_count as f64);
            for i in 1..sorted.len() - 1 {
                let distance = (points[front[sorted[i + 1]]][objective] - points[front[sorted[i - 1]]][objective]).abs();
                distances[sorted[i]] += distance * norm;
            }
        }
    }

    distances
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_front_keeps_ties() {
        let points = [[1.0, 5.0], [2.0, 2.0], [3.0, 3.0], [2.0, 2.0], [5.0, 1.0]];
        assert_eq!(first_front(&points), vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_crowding_distance_boundaries_are_infinite() {
        let points = [[0.0, 4.0], [1.0, 3.0], [3.0, 1.0], [4.0, 0.0]];
        let front = [0, 1, 2, 3];
        let distances = crowding_distance(&points, &front);

        assert_eq!(distances[0], f64::INFINITY);
        assert_eq!(distances[3], f64::INFINITY);
        // (3 - 0) / (4 * 2) for each objective
        assert!((distances[1] - 0.75).abs() < 1e-12);
        assert!((distances[2] - 0.75).abs() < 1e-12);
    }
}
