use bimap::BiMap;
use std::collections::VecDeque;

use crate::domain::ids::{HostId, HostIdx, TaskId, TaskIdx};
use crate::error::{Error, Result};

/// A file read or written by a task. `size` is expressed in bits.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFile {
    pub name: String,
    pub size: u64,
}

impl TaskFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        TaskFile { name: name.into(), size }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSet {
    pub files: Vec<TaskFile>,
}

impl FileSet {
    pub fn new(files: Vec<TaskFile>) -> Self {
        FileSet { files }
    }

    pub fn size_in_bits(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f.name == name)
    }
}

/// One node of the workflow DAG.
///
/// `parents` and `children` are kept in both directions so the scheduler can walk the graph either way
/// without a lookup.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,

    /// Seconds on the reference machine.
    pub runtime: f64,

    pub input: FileSet,
    pub output: FileSet,

    pub parents: Vec<TaskIdx>,
    pub children: Vec<TaskIdx>,
}

impl Task {
    pub fn is_entry(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_exit(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Host {
    pub id: HostId,
    pub flops: u64,

    /// Bits per second.
    pub disk_speed: u64,

    /// Bits per second.
    pub network_speed: u64,

    /// Energy units per second while running a task.
    pub energy_cost: f64,

    /// Energy units per second while the schedule is running.
    pub energy_cost_standby: f64,
}

impl Host {
    pub fn new(
        id: impl Into<String>,
        flops: u64,
        disk_speed: u64,
        network_speed: u64,
        energy_cost: f64,
        energy_cost_standby: f64,
    ) -> Self {
        Host { id: HostId::new(id), flops, disk_speed, network_speed, energy_cost, energy_cost_standby }
    }
}

/// The immutable problem instance: workflow, hosts and the flops of the machine the runtimes were measured on.
///
/// Tasks and hosts keep their insertion order; `TaskIdx`/`HostIdx` are positions in that order.
#[derive(Debug, Clone)]
pub struct InstanceData {
    tasks: Vec<Task>,
    hosts: Vec<Host>,
    task_index: BiMap<TaskId, TaskIdx>,
    host_index: BiMap<HostId, HostIdx>,
    reference_flops: u64,
}

impl InstanceData {
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn task(&self, idx: TaskIdx) -> &Task {
        &self.tasks[idx.0]
    }

    pub fn host(&self, idx: HostIdx) -> &Host {
        &self.hosts[idx.0]
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    pub fn reference_flops(&self) -> u64 {
        self.reference_flops
    }

    pub fn task_idx(&self, id: &str) -> Option<TaskIdx> {
        self.task_index.get_by_left(&TaskId::new(id)).copied()
    }

    pub fn host_idx(&self, id: &str) -> Option<HostIdx> {
        self.host_index.get_by_left(&HostId::new(id)).copied()
    }

    pub fn task_id(&self, idx: TaskIdx) -> &TaskId {
        &self.tasks[idx.0].id
    }

    pub fn host_id(&self, idx: HostIdx) -> &HostId {
        &self.hosts[idx.0].id
    }

    pub fn task_indices(&self) -> impl Iterator<Item = TaskIdx> + '_ {
        (0..self.tasks.len()).map(TaskIdx)
    }

    pub fn host_indices(&self) -> impl Iterator<Item = HostIdx> + '_ {
        (0..self.hosts.len()).map(HostIdx)
    }

    /// Sum of the standby cost of every host, i.e. the energy burnt per second of makespan.
    pub fn standby_cost_per_second(&self) -> f64 {
        self.hosts.iter().map(|h| h.energy_cost_standby).sum()
    }

    pub fn mean_runtime(&self) -> f64 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        self.tasks.iter().map(|t| t.runtime).sum::<f64>() / self.tasks.len() as f64
    }
}

struct PendingTask {
    id: TaskId,
    runtime: f64,
    input: FileSet,
    output: FileSet,
    parents: Vec<TaskId>,
}

/// Collects tasks, dependencies and hosts and validates them into an `InstanceData`.
///
/// Construction happens in three phases: register tasks and hosts, resolve the parent references into
/// index edges (both directions) and reject graphs that are not acyclic.
#[derive(Default)]
pub struct InstanceBuilder {
    tasks: Vec<PendingTask>,
    hosts: Vec<Host>,
}

impl InstanceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_task(&mut self, id: impl Into<String>, runtime: f64, input: Vec<TaskFile>, output: Vec<TaskFile>) -> &mut Self {
        let id = TaskId::new(id);
        if let Some(placeholder) = self.tasks.iter_mut().find(|t| t.id == id && t.runtime.is_nan()) {
            placeholder.runtime = runtime;
            placeholder.input = FileSet::new(input);
            placeholder.output = FileSet::new(output);
            return self;
        }
        self.tasks.push(PendingTask {
            id,
            runtime,
            input: FileSet::new(input),
            output: FileSet::new(output),
            parents: Vec::new(),
        });
        self
    }

    /// Registers `parent -> child`. Both tasks may be added before or after this call.
    pub fn add_dependency(&mut self, parent: impl Into<String>, child: impl Into<String>) -> &mut Self {
        let child = TaskId::new(child);
        let parent = TaskId::new(parent);
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == child) {
            task.parents.push(parent);
        } else {
            // Resolved on build: an unknown child is reported there.
            self.tasks.push(PendingTask {
                id: child,
                runtime: f64::NAN,
                input: FileSet::default(),
                output: FileSet::default(),
                parents: vec![parent],
            });
        }
        self
    }

    pub fn add_host(&mut self, host: Host) -> &mut Self {
        self.hosts.push(host);
        self
    }

    pub fn build(self, reference_flops: u64) -> Result<InstanceData> {
        // Phase 1: index tasks and hosts
        let mut task_index: BiMap<TaskId, TaskIdx> = BiMap::new();
        for (idx, pending) in self.tasks.iter().enumerate() {
            if pending.runtime.is_nan() {
                return Err(Error::ModelConstructionError(format!("Task '{}' is referenced by a dependency but never defined.", pending.id)));
            }
            if task_index.insert_no_overwrite(pending.id.clone(), TaskIdx(idx)).is_err() {
                return Err(Error::ModelConstructionError(format!("Duplicate task id '{}'.", pending.id)));
            }
        }

        if self.hosts.is_empty() {
            return Err(Error::ModelConstructionError("An instance needs at least one host.".to_string()));
        }

        let mut host_index: BiMap<HostId, HostIdx> = BiMap::new();
        for (idx, host) in self.hosts.iter().enumerate() {
            if host.flops == 0 {
                return Err(Error::ModelConstructionError(format!("Host '{}' has zero flops.", host.id)));
            }
            if host.disk_speed == 0 || host.network_speed == 0 {
                log::warn!("Host '{}' has a zero disk or network speed, transfers through it will take forever.", host.id);
            }
            if host_index.insert_no_overwrite(host.id.clone(), HostIdx(idx)).is_err() {
                return Err(Error::ModelConstructionError(format!("Duplicate host id '{}'.", host.id)));
            }
        }

        // Phase 2: resolve edges in both directions
        let mut children: Vec<Vec<TaskIdx>> = vec![Vec::new(); self.tasks.len()];
        let mut parents: Vec<Vec<TaskIdx>> = Vec::with_capacity(self.tasks.len());

        for (idx, pending) in self.tasks.iter().enumerate() {
            let mut resolved = Vec::with_capacity(pending.parents.len());
            for parent_id in &pending.parents {
                let parent = *task_index.get_by_left(parent_id).ok_or_else(|| {
                    Error::ModelConstructionError(format!("Task '{}' depends on unknown task '{}'.", pending.id, parent_id))
                })?;
                if parent.0 == idx {
                    return Err(Error::ModelConstructionError(format!("Task '{}' depends on itself.", pending.id)));
                }
                if resolved.contains(&parent) {
                    continue;
                }
                resolved.push(parent);
                children[parent.0].push(TaskIdx(idx));
            }
            parents.push(resolved);
        }

        // Phase 3: reject cycles (Kahn)
        let mut missing_parents: Vec<usize> = parents.iter().map(Vec::len).collect();
        let mut ready: VecDeque<usize> = missing_parents.iter().enumerate().filter(|(_, n)| **n == 0).map(|(i, _)| i).collect();
        let mut visited = 0;
        while let Some(idx) = ready.pop_front() {
            visited += 1;
            for child in &children[idx] {
                missing_parents[child.0] -= 1;
                if missing_parents[child.0] == 0 {
                    ready.push_back(child.0);
                }
            }
        }
        if visited != self.tasks.len() {
            return Err(Error::ModelConstructionError("The workflow contains a cycle.".to_string()));
        }

        let tasks: Vec<Task> = self
            .tasks
            .into_iter()
            .zip(parents)
            .zip(children)
            .map(|((pending, parents), children)| Task {
                id: pending.id,
                runtime: pending.runtime,
                input: pending.input,
                output: pending.output,
                parents,
                children,
            })
            .collect();

        log::debug!("Instance built with {} tasks and {} hosts.", tasks.len(), self.hosts.len());

        Ok(InstanceData { tasks, hosts: self.hosts, task_index, host_index, reference_flops })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(name: &str) -> Host {
        Host::new(name, 1_000, 100, 100, 1.0, 0.1)
    }

    #[test]
    fn test_build_resolves_edges_in_both_directions() {
        let mut builder = InstanceBuilder::new();
        builder.add_task("a", 1.0, vec![], vec![]).add_task("b", 2.0, vec![], vec![]).add_task("c", 3.0, vec![], vec![]);
        builder.add_dependency("a", "b").add_dependency("a", "c").add_dependency("b", "c");
        builder.add_host(host("h"));

        let instance = builder.build(1_000).unwrap();
        let a = instance.task_idx("a").unwrap();
        let b = instance.task_idx("b").unwrap();
        let c = instance.task_idx("c").unwrap();

        assert_eq!(instance.task(a).children, vec![b, c]);
        assert_eq!(instance.task(c).parents, vec![a, b]);
        assert!(instance.task(a).is_entry());
        assert!(instance.task(c).is_exit());
        assert_eq!(instance.task_id(b).as_str(), "b");
    }

    #[test]
    fn test_build_rejects_cycle() {
        let mut builder = InstanceBuilder::new();
        builder.add_task("a", 1.0, vec![], vec![]).add_task("b", 1.0, vec![], vec![]);
        builder.add_dependency("a", "b").add_dependency("b", "a");
        builder.add_host(host("h"));

        assert!(matches!(builder.build(1), Err(Error::ModelConstructionError(_))));
    }

    #[test]
    fn test_build_rejects_unknown_and_duplicate_tasks() {
        let mut builder = InstanceBuilder::new();
        builder.add_task("a", 1.0, vec![], vec![]);
        builder.add_dependency("a", "ghost");
        builder.add_host(host("h"));
        assert!(builder.build(1).is_err());

        let mut builder = InstanceBuilder::new();
        builder.add_task("a", 1.0, vec![], vec![]).add_task("a", 1.0, vec![], vec![]);
        builder.add_host(host("h"));
        assert!(builder.build(1).is_err());
    }

    #[test]
    fn test_build_requires_hosts() {
        let mut builder = InstanceBuilder::new();
        builder.add_task("a", 1.0, vec![], vec![]);
        assert!(builder.build(1).is_err());
    }

    #[test]
    fn test_file_set_size() {
        let files = FileSet::new(vec![TaskFile::new("x", 8), TaskFile::new("y", 16)]);
        assert_eq!(files.size_in_bits(), 24);
        assert!(files.contains("y"));
        assert!(!files.contains("z"));
    }
}
