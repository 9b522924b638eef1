use std::sync::Arc;

use crate::domain::ids::{HostIdx, TaskIdx};
use crate::domain::instance::InstanceData;
use crate::domain::schedule::TaskSchedule;
use crate::scheduling::matrices::{
    ComputationMatrix, NetworkMatrix, ParentsInfo, TaskCosts, computation_matrix, find_host_speed, network_matrix, reference_speed_read,
    reference_speed_write,
};
use crate::scheduling::ranking::heft_ranking;

/// Everything derived once from an instance and shared read-only by calculators and evaluators.
#[derive(Debug)]
pub struct SchedulingContext {
    instance: Arc<InstanceData>,
    computation: ComputationMatrix,
    network: NetworkMatrix,
    reference_speed_read: f64,
    reference_speed_write: f64,
    ranking: Vec<(TaskIdx, f64)>,
    mean_runtime: f64,
}

impl SchedulingContext {
    pub fn new(instance: Arc<InstanceData>) -> Self {
        let computation = computation_matrix(&instance, instance.reference_flops());
        let network = network_matrix(&instance);
        let reference_speed_read = reference_speed_read(&instance);
        let reference_speed_write = reference_speed_write(&instance);
        let ranking = heft_ranking(&instance, &computation, reference_speed_read, reference_speed_write);
        let mean_runtime = instance.mean_runtime();

        log::debug!(
            "Scheduling context ready for {} tasks on {} hosts (ref read {:.3e}, ref write {:.3e}).",
            instance.task_count(),
            instance.host_count(),
            reference_speed_read,
            reference_speed_write
        );

        SchedulingContext { instance, computation, network, reference_speed_read, reference_speed_write, ranking, mean_runtime }
    }

    pub fn instance(&self) -> &InstanceData {
        &self.instance
    }

    pub fn computation(&self) -> &ComputationMatrix {
        &self.computation
    }

    pub fn network(&self) -> &NetworkMatrix {
        &self.network
    }

    pub fn reference_speed_read(&self) -> f64 {
        self.reference_speed_read
    }

    pub fn reference_speed_write(&self) -> f64 {
        self.reference_speed_write
    }

    /// Tasks in descending HEFT upward rank.
    pub fn ranking(&self) -> &[(TaskIdx, f64)] {
        &self.ranking
    }

    pub fn mean_runtime(&self) -> f64 {
        self.mean_runtime
    }

    /// Time to move the data `task` needs from `parent` when they run on `host` and `parent_host`.
    pub fn communication_time(&self, task: TaskIdx, host: HostIdx, parent: TaskIdx, parent_host: HostIdx) -> f64 {
        let speed = find_host_speed(self.instance.host(host), self.instance.host(parent_host));
        self.network.bits(task, parent) as f64 / speed as f64
    }

    /// Sum of the transfer times from every placed parent of `task` and the latest parent finish.
    ///
    /// `placed` is indexed by task. Parents that are not placed yet are skipped; that only happens for plans
    /// that are not topologically ordered.
    pub fn task_communications(&self, task: TaskIdx, host: HostIdx, placed: &[Option<TaskSchedule>]) -> ParentsInfo {
        let mut info = ParentsInfo::default();
        for (parent, _) in self.network.parents(task) {
            let Some(parent_schedule) = placed[parent.0] else {
                continue;
            };
            info.communications += self.communication_time(task, host, *parent, parent_schedule.host);
            info.max_eft = info.max_eft.max(parent_schedule.eft);
        }
        info
    }

    /// Full cost breakdown of running `task` on `host` given the parents already placed.
    pub fn task_costs(&self, task: TaskIdx, host: HostIdx, placed: &[Option<TaskSchedule>]) -> TaskCosts {
        let parents = self.task_communications(task, host, placed);
        let disk_speed = self.instance.host(host).disk_speed as f64;

        TaskCosts {
            disk_read_staging: self.network.staging(task) as f64 / disk_speed,
            disk_write: self.instance.task(task).output.size_in_bits() as f64 / disk_speed,
            computation: self.computation.get(task, host),
            communications: parents.communications,
            ready: parents.max_eft,
        }
    }

    /// Active energy spent running a task of `duration` seconds on `host`.
    pub fn active_energy(&self, host: HostIdx, duration: f64) -> f64 {
        duration * self.instance.host(host).energy_cost
    }

    /// Energy burnt by all hosts in standby over `makespan` seconds.
    pub fn standby_energy(&self, makespan: f64) -> f64 {
        self.instance.standby_cost_per_second() * makespan
    }
}
