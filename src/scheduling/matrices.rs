use crate::domain::ids::{HostIdx, TaskIdx};
use crate::domain::instance::{Host, InstanceData};

/// Execution time of every task on every host, `runtime * reference_flops / host.flops`.
///
/// Stored row-major (one row per task, one column per host).
#[derive(Debug, Clone)]
pub struct ComputationMatrix {
    host_count: usize,
    values: Vec<f64>,
}

impl ComputationMatrix {
    pub fn get(&self, task: TaskIdx, host: HostIdx) -> f64 {
        self.values[task.0 * self.host_count + host.0]
    }

    pub fn row(&self, task: TaskIdx) -> &[f64] {
        let start = task.0 * self.host_count;
        &self.values[start..start + self.host_count]
    }

    /// Mean execution time of `task` over all hosts.
    pub fn average(&self, task: TaskIdx) -> f64 {
        let row = self.row(task);
        if row.is_empty() {
            return 0.0;
        }
        row.iter().sum::<f64>() / row.len() as f64
    }
}

pub fn computation_matrix(instance: &InstanceData, reference_flops: u64) -> ComputationMatrix {
    let host_count = instance.host_count();
    let mut values = Vec::with_capacity(instance.task_count() * host_count);

    for task in instance.tasks() {
        for host in instance.hosts() {
            values.push(task.runtime * (reference_flops as f64 / host.flops as f64));
        }
    }

    ComputationMatrix { host_count, values }
}

/// Bits each task receives from each of its producers.
///
/// The producers of a task are its direct parents plus the task itself: the self entry holds the bits that
/// are staged from external storage, i.e. the input size minus what the parents already deliver.
#[derive(Debug, Clone)]
pub struct NetworkMatrix {
    from_parents: Vec<Vec<(TaskIdx, u64)>>,
    staging: Vec<u64>,
}

impl NetworkMatrix {
    pub fn bits(&self, task: TaskIdx, producer: TaskIdx) -> u64 {
        if task == producer {
            return self.staging[task.0];
        }
        self.from_parents[task.0].iter().find(|(parent, _)| *parent == producer).map(|(_, bits)| *bits).unwrap_or(0)
    }

    pub fn staging(&self, task: TaskIdx) -> u64 {
        self.staging[task.0]
    }

    /// `(parent, bits)` for every direct parent of `task`, in the task's parent order.
    pub fn parents(&self, task: TaskIdx) -> &[(TaskIdx, u64)] {
        &self.from_parents[task.0]
    }
}

pub fn network_matrix(instance: &InstanceData) -> NetworkMatrix {
    let mut from_parents = Vec::with_capacity(instance.task_count());
    let mut staging = Vec::with_capacity(instance.task_count());

    for task in instance.tasks() {
        let comms: Vec<(TaskIdx, u64)> = task
            .parents
            .iter()
            .map(|parent_idx| {
                let parent = instance.task(*parent_idx);
                let bits = parent.output.files.iter().filter(|f| task.input.contains(&f.name)).map(|f| f.size).sum();
                (*parent_idx, bits)
            })
            .collect();

        let from_parents_bits: u64 = comms.iter().map(|(_, bits)| bits).sum();
        let input_bits = task.input.size_in_bits();
        if from_parents_bits > input_bits {
            log::warn!(
                "Task '{}' receives {} bits from its parents but only declares {} input bits. Staging set to 0.",
                task.id,
                from_parents_bits,
                input_bits
            );
        }

        staging.push(input_bits.saturating_sub(from_parents_bits));
        from_parents.push(comms);
    }

    NetworkMatrix { from_parents, staging }
}

/// Mean over all hosts of `min(network, disk)`.
pub fn reference_speed_read(instance: &InstanceData) -> f64 {
    mean(instance.hosts().iter().map(|h| h.network_speed.min(h.disk_speed) as f64))
}

/// Mean over all hosts of the disk speed.
pub fn reference_speed_write(instance: &InstanceData) -> f64 {
    mean(instance.hosts().iter().map(|h| h.disk_speed as f64))
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let count = values.len();
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}

/// Speed of the link used to move data from `parent_host` to `host`.
///
/// On the same host the data is a local disk copy. Otherwise the slowest of both network cards and the
/// source disk bounds the transfer.
pub fn find_host_speed(host: &Host, parent_host: &Host) -> u64 {
    if host.id == parent_host.id {
        return host.disk_speed;
    }

    let bandwidth = host.network_speed.min(parent_host.network_speed);
    bandwidth.min(parent_host.disk_speed)
}

/// Latest finish among a task's parents plus the time needed to receive their data.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParentsInfo {
    pub max_eft: f64,
    pub communications: f64,
}

/// Cost breakdown of running one task on one host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskCosts {
    pub disk_read_staging: f64,
    pub disk_write: f64,
    pub computation: f64,
    pub communications: f64,

    /// Earliest time the task may start, the max parent eft.
    pub ready: f64,
}

impl TaskCosts {
    pub fn duration(&self) -> f64 {
        self.disk_read_staging + self.disk_write + self.computation + self.communications
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instance::{InstanceBuilder, TaskFile};

    #[test]
    fn test_find_host_speed() {
        let a = Host::new("A", 1, 100, 100, 1.0, 0.0);
        let b = Host::new("B", 1, 50, 25, 1.0, 0.0);
        let c = Host::new("C", 1, 25, 100, 1.0, 0.0);

        assert_eq!(find_host_speed(&a, &a), 100);
        assert_eq!(find_host_speed(&a, &b), 25);
        assert_eq!(find_host_speed(&b, &a), 25);
        assert_eq!(find_host_speed(&a, &c), 25);
    }

    #[test]
    fn test_staging_saturates_at_zero() {
        let mut builder = InstanceBuilder::new();
        builder.add_task("p", 1.0, vec![], vec![TaskFile::new("f", 100)]);
        builder.add_task("c", 1.0, vec![TaskFile::new("f", 40)], vec![]);
        builder.add_dependency("p", "c");
        builder.add_host(Host::new("h", 1, 1, 1, 1.0, 0.0));
        let instance = builder.build(1).unwrap();

        let network = network_matrix(&instance);
        let p = instance.task_idx("p").unwrap();
        let c = instance.task_idx("c").unwrap();
        assert_eq!(network.bits(c, p), 100);
        assert_eq!(network.staging(c), 0);
        assert_eq!(network.bits(p, c), 0);
    }
}
