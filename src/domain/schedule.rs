use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::ids::{HostIdx, TaskIdx};
use crate::error::Error;

/// Simulated start and finish of one task. `eft >= ast` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaskSchedule {
    pub task: TaskIdx,
    pub ast: f64,
    pub eft: f64,
    pub host: HostIdx,
}

impl TaskSchedule {
    pub fn new(task: TaskIdx, ast: f64, eft: f64, host: HostIdx) -> Self {
        TaskSchedule { task, ast, eft, host }
    }

    pub fn duration(&self) -> f64 {
        self.eft - self.ast
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    Makespan,
    Energy,
}

impl Objective {
    pub fn name(&self) -> &'static str {
        match self {
            Objective::Makespan => "makespan",
            Objective::Energy => "energy",
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Objective {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "makespan" => Ok(Objective::Makespan),
            "energy" => Ok(Objective::Energy),
            other => Err(Error::UnsupportedArbiter(other.to_string())),
        }
    }
}

/// Result of scoring one plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitnessInfo {
    pub fitness: BTreeMap<Objective, f64>,

    /// Sorted ascending by `ast`.
    pub schedule: Vec<TaskSchedule>,

    pub fitness_function: String,
}

impl FitnessInfo {
    /// Sorts `schedule` by start time. The sort is stable, tasks starting together keep their order.
    pub fn new(makespan: f64, energy: f64, mut schedule: Vec<TaskSchedule>, fitness_function: impl Into<String>) -> Self {
        schedule.sort_by(|a, b| a.ast.total_cmp(&b.ast));
        let fitness = BTreeMap::from([(Objective::Makespan, makespan), (Objective::Energy, energy)]);
        FitnessInfo { fitness, schedule, fitness_function: fitness_function.into() }
    }

    pub fn get(&self, objective: Objective) -> f64 {
        self.fitness.get(&objective).copied().unwrap_or(f64::INFINITY)
    }

    pub fn makespan(&self) -> f64 {
        self.get(Objective::Makespan)
    }

    pub fn energy(&self) -> f64 {
        self.get(Objective::Energy)
    }

    pub fn task_schedule(&self, task: TaskIdx) -> Option<&TaskSchedule> {
        self.schedule.iter().find(|ts| ts.task == task)
    }
}

/// Idle interval `[start, end)` on a host timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScheduleGap {
    pub start: f64,
    pub end: f64,
}

impl ScheduleGap {
    pub fn new(start: f64, end: f64) -> Self {
        ScheduleGap { start, end }
    }

    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, start: f64, end: f64) -> bool {
        self.start <= start && end <= self.end
    }
}

/// Which member of an ensemble won an evaluation, kept for history analytics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiResult {
    pub makespan: f64,
    pub energy: f64,
    pub fitness_function: String,
    pub arbiter: String,
}
