use crate::domain::ids::TaskIdx;
use crate::domain::instance::InstanceData;
use crate::scheduling::matrices::ComputationMatrix;

/// Computes the HEFT upward rank of every task.
///
/// The upward rank is the estimated length of the critical path from a task to the end of the workflow:
/// `avg computation + input / ref_read + output / ref_write + max(rank(child))`.
///
/// Tasks are processed from the sinks towards the sources. A task enters the worklist once every one of its
/// children has a rank.
///
/// # Returns
/// `(task, rank)` for every task, ordered by rank in **descending** order. Ties keep the worklist order.
pub fn heft_ranking(instance: &InstanceData, computation: &ComputationMatrix, ref_read: f64, ref_write: f64) -> Vec<(TaskIdx, f64)> {
    let mut ranks: Vec<Option<f64>> = vec![None; instance.task_count()];
    let mut pending_children: Vec<usize> = instance.tasks().iter().map(|t| t.children.len()).collect();
    let mut worklist: Vec<TaskIdx> = Vec::with_capacity(instance.task_count());

    // 1. Seed the worklist with the sinks
    worklist.extend(instance.task_indices().filter(|t| instance.task(*t).is_exit()));

    // 2. Rank tasks in worklist order, releasing parents once all their children are ranked
    let mut next = 0;
    while next < worklist.len() {
        let task_idx = worklist[next];
        next += 1;

        let task = instance.task(task_idx);
        let max_child = task.children.iter().filter_map(|c| ranks[c.0]).fold(0.0, f64::max);

        let rank = computation.average(task_idx)
            + task.input.size_in_bits() as f64 / ref_read
            + task.output.size_in_bits() as f64 / ref_write
            + max_child;
        ranks[task_idx.0] = Some(rank);

        for parent in &task.parents {
            pending_children[parent.0] -= 1;
            if pending_children[parent.0] == 0 {
                worklist.push(*parent);
            }
        }
    }

    if worklist.len() != instance.task_count() {
        log::error!("HEFT ranking reached {} of {} tasks, the workflow is not a DAG.", worklist.len(), instance.task_count());
    }

    // 3. Sort by rank, stable so equal ranks stay in worklist order
    let mut ranking: Vec<(TaskIdx, f64)> = worklist.into_iter().filter_map(|t| ranks[t.0].map(|r| (t, r))).collect();
    ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instance::{Host, InstanceBuilder};
    use crate::scheduling::matrices::computation_matrix;

    #[test]
    fn test_rank_includes_longest_child_path() {
        let mut builder = InstanceBuilder::new();
        builder.add_task("a", 2.0, vec![], vec![]).add_task("b", 10.0, vec![], vec![]).add_task("c", 1.0, vec![], vec![]);
        builder.add_dependency("a", "b").add_dependency("a", "c");
        builder.add_host(Host::new("h1", 1, 1, 1, 1.0, 0.0)).add_host(Host::new("h2", 2, 1, 1, 1.0, 0.0));
        let instance = builder.build(2).unwrap();

        let computation = computation_matrix(&instance, instance.reference_flops());
        let ranking = heft_ranking(&instance, &computation, 1.0, 1.0);

        let order: Vec<&str> = ranking.iter().map(|(t, _)| instance.task_id(*t).as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);

        // avg of runtime * 2 / 1 and runtime * 2 / 2
        assert_eq!(ranking[1].1, 15.0);
        assert_eq!(ranking[2].1, 1.5);
        assert_eq!(ranking[0].1, 3.0 + 15.0);
    }
}
