use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use std::ops::Deref;

use crate::domain::ids::{HostIdx, TaskIdx};
use crate::domain::instance::InstanceData;
use crate::error::{Error, Result};

/// One assignment: `task` runs on `host`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PlanPair {
    pub task: TaskIdx,
    pub host: HostIdx,
}

impl PlanPair {
    pub fn new(task: TaskIdx, host: HostIdx) -> Self {
        PlanPair { task, host }
    }
}

/// Ordered sequence of assignments, one per task.
///
/// The order must be a topological order of the workflow. Producers establish it and the evaluation code
/// trusts it without checking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Plan {
    pairs: Vec<PlanPair>,
}

impl Plan {
    pub fn new(pairs: Vec<PlanPair>) -> Self {
        Plan { pairs }
    }

    /// Builds a plan from `(task id, host id)` pairs.
    pub fn from_ids(instance: &InstanceData, pairs: &[(&str, &str)]) -> Result<Self> {
        let mut plan = Vec::with_capacity(pairs.len());
        for (task_id, host_id) in pairs {
            let task = instance
                .task_idx(task_id)
                .ok_or_else(|| Error::ModelConstructionError(format!("Plan references unknown task '{}'.", task_id)))?;
            let host = instance
                .host_idx(host_id)
                .ok_or_else(|| Error::ModelConstructionError(format!("Plan references unknown host '{}'.", host_id)))?;
            plan.push(PlanPair::new(task, host));
        }
        Ok(Plan::new(plan))
    }

    /// A random topological order of the workflow with uniformly random hosts.
    ///
    /// At every step one of the tasks whose parents are all placed is picked at random.
    pub fn random<R: Rng>(instance: &InstanceData, rng: &mut R) -> Self {
        let hosts: Vec<HostIdx> = instance.host_indices().collect();
        let mut missing_parents: Vec<usize> = instance.tasks().iter().map(|t| t.parents.len()).collect();
        let mut ready: Vec<TaskIdx> = instance.task_indices().filter(|t| missing_parents[t.0] == 0).collect();
        let mut pairs = Vec::with_capacity(instance.task_count());

        while !ready.is_empty() {
            let picked = rng.random_range(0..ready.len());
            let task = ready.swap_remove(picked);
            let Some(host) = hosts.choose(rng) else {
                break;
            };
            pairs.push(PlanPair::new(task, *host));

            for child in &instance.task(task).children {
                missing_parents[child.0] -= 1;
                if missing_parents[child.0] == 0 {
                    ready.push(*child);
                }
            }
        }

        Plan::new(pairs)
    }

    pub fn pairs(&self) -> &[PlanPair] {
        &self.pairs
    }

    pub fn set(&mut self, position: usize, pair: PlanPair) {
        self.pairs[position] = pair;
    }

    pub fn position_of(&self, task: TaskIdx) -> Option<usize> {
        self.pairs.iter().position(|p| p.task == task)
    }

    /// Task order only, hosts dropped.
    pub fn tasks(&self) -> impl Iterator<Item = TaskIdx> + '_ {
        self.pairs.iter().map(|p| p.task)
    }

    /// True when every task appears after all of its parents and exactly once.
    pub fn is_topological(&self, instance: &InstanceData) -> bool {
        if self.pairs.len() != instance.task_count() {
            return false;
        }
        let mut placed = vec![false; instance.task_count()];
        for pair in &self.pairs {
            if placed[pair.task.0] || instance.task(pair.task).parents.iter().any(|p| !placed[p.0]) {
                return false;
            }
            placed[pair.task.0] = true;
        }
        true
    }
}

impl Deref for Plan {
    type Target = [PlanPair];

    fn deref(&self) -> &Self::Target {
        &self.pairs
    }
}

impl From<Vec<PlanPair>> for Plan {
    fn from(pairs: Vec<PlanPair>) -> Self {
        Plan::new(pairs)
    }
}

impl FromIterator<PlanPair> for Plan {
    fn from_iter<I: IntoIterator<Item = PlanPair>>(iter: I) -> Self {
        Plan::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instance::{Host, InstanceBuilder};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn diamond() -> InstanceData {
        let mut builder = InstanceBuilder::new();
        for name in ["a", "b", "c", "d"] {
            builder.add_task(name, 1.0, vec![], vec![]);
        }
        builder.add_dependency("a", "b").add_dependency("a", "c").add_dependency("b", "d").add_dependency("c", "d");
        builder.add_host(Host::new("h1", 1, 1, 1, 1.0, 0.0)).add_host(Host::new("h2", 1, 1, 1, 1.0, 0.0));
        builder.build(1).unwrap()
    }

    #[test]
    fn test_random_plans_are_topological() {
        let instance = diamond();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let plan = Plan::random(&instance, &mut rng);
            assert!(plan.is_topological(&instance));
        }
    }

    #[test]
    fn test_from_ids_and_topology_check() {
        let instance = diamond();
        let plan = Plan::from_ids(&instance, &[("a", "h1"), ("c", "h2"), ("b", "h1"), ("d", "h2")]).unwrap();
        assert!(plan.is_topological(&instance));
        assert_eq!(plan.position_of(instance.task_idx("b").unwrap()), Some(2));

        let broken = Plan::from_ids(&instance, &[("b", "h1"), ("a", "h2"), ("c", "h1"), ("d", "h2")]).unwrap();
        assert!(!broken.is_topological(&instance));

        assert!(Plan::from_ids(&instance, &[("a", "nowhere")]).is_err());
    }
}
