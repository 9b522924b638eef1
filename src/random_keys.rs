use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Arc;

use crate::domain::ids::{HostIdx, TaskIdx};
use crate::domain::instance::InstanceData;
use crate::domain::plan::{Plan, PlanPair};
use crate::error::{Error, Result};

const SNAP_TOLERANCE: f64 = 1e-9;

/// Maps plans to vectors of `2k` reals and back, for optimizers that search a continuous space.
///
/// Slot `t` holds the relative position of task `t` in the plan, slot `k + t` the relative index of its host.
/// Decoding always yields a topological order whatever the values are.
pub struct RandomKeysCoder {
    instance: Arc<InstanceData>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ReadyTask {
    priority: f64,
    task: TaskIdx,
}

impl Eq for ReadyTask {}

impl Ord for ReadyTask {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority.total_cmp(&other.priority).then(self.task.cmp(&other.task))
    }
}

impl PartialOrd for ReadyTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl RandomKeysCoder {
    pub fn new(instance: Arc<InstanceData>) -> Self {
        RandomKeysCoder { instance }
    }

    pub fn key_count(&self) -> usize {
        2 * self.instance.task_count()
    }

    pub fn encode(&self, plan: &Plan) -> Vec<f64> {
        let k = self.instance.task_count();
        let host_count = self.instance.host_count() as f64;
        let mut keys = vec![0.0; 2 * k];

        for (position, pair) in plan.iter().enumerate() {
            keys[pair.task.0] = position as f64 / k as f64;
            keys[k + pair.task.0] = pair.host.0 as f64 / host_count;
        }

        keys
    }

    /// Rebuilds a plan by repeatedly taking the ready task with the smallest key. Ties go to the lower task
    /// index.
    ///
    /// # Errors
    /// `Error::InvalidEncoding` if `keys` does not hold exactly `2k` values.
    pub fn decode(&self, keys: &[f64]) -> Result<Plan> {
        let k = self.instance.task_count();
        if keys.len() != 2 * k {
            return Err(Error::InvalidEncoding { expected: 2 * k, actual: keys.len() });
        }

        let mut missing_parents: Vec<usize> = self.instance.tasks().iter().map(|t| t.parents.len()).collect();
        let mut ready: BinaryHeap<Reverse<ReadyTask>> = self
            .instance
            .task_indices()
            .filter(|t| missing_parents[t.0] == 0)
            .map(|task| Reverse(ReadyTask { priority: keys[task.0], task }))
            .collect();

        let mut pairs = Vec::with_capacity(k);
        while let Some(Reverse(ReadyTask { task, .. })) = ready.pop() {
            pairs.push(PlanPair::new(task, self.host_for(keys[k + task.0])));

            for child in &self.instance.task(task).children {
                missing_parents[child.0] -= 1;
                if missing_parents[child.0] == 0 {
                    ready.push(Reverse(ReadyTask { priority: keys[child.0], task: *child }));
                }
            }
        }

        Ok(Plan::new(pairs))
    }

    fn host_for(&self, key: f64) -> HostIdx {
        let host_count = self.instance.host_count();
        let mut scaled = key * host_count as f64;
        if (scaled - scaled.round()).abs() < SNAP_TOLERANCE {
            scaled = scaled.round();
        }
        let clamped = scaled.min((host_count - 1) as f64).max(0.0);
        HostIdx(clamped.floor() as usize)
    }
}
