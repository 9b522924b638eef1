use crate::domain::ids::HostIdx;
use crate::domain::schedule::ScheduleGap;

/// How tasks are placed on a host's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulingMode {
    /// Tasks may be inserted into idle gaps left between earlier tasks.
    Active,
    /// Tasks are appended after the last task of the host.
    SemiActive,
}

impl SchedulingMode {
    pub fn name(&self) -> &'static str {
        match self {
            SchedulingMode::Active => "active",
            SchedulingMode::SemiActive => "semi-active",
        }
    }
}

/// Per-host bookkeeping of committed work during one simulation.
#[derive(Debug, Clone)]
pub enum Timeline {
    /// Time at which each host becomes free. Non-decreasing per host.
    SemiActive(Vec<f64>),

    /// Idle gaps of each host. Every host starts with the single gap `[0, f64::MAX)`.
    Active(Vec<Vec<ScheduleGap>>),
}

impl Timeline {
    pub fn new(mode: SchedulingMode, host_count: usize) -> Self {
        match mode {
            SchedulingMode::SemiActive => Timeline::SemiActive(vec![0.0; host_count]),
            SchedulingMode::Active => Timeline::Active(vec![vec![ScheduleGap::new(0.0, f64::MAX)]; host_count]),
        }
    }

    /// Start time for a task of length `duration` that cannot start before `ready`.
    ///
    /// In active mode this is the start of the earliest gap that begins at or after `ready` and is long enough
    /// to hold the task. Without such a gap the task starts at `ready`.
    pub fn find_start(&self, host: HostIdx, ready: f64, duration: f64) -> f64 {
        match self {
            Timeline::SemiActive(available) => available[host.0].max(ready),
            Timeline::Active(gaps) => gaps[host.0]
                .iter()
                .filter(|gap| gap.start >= ready && duration <= gap.len())
                .map(|gap| gap.start)
                .min_by(f64::total_cmp)
                .unwrap_or(ready),
        }
    }

    /// Records that `host` is busy during `[ast, eft)`.
    ///
    /// In active mode the gap holding the interval is split into the parts before `ast` and after `eft`,
    /// empty parts are dropped.
    pub fn commit(&mut self, host: HostIdx, ast: f64, eft: f64) {
        match self {
            Timeline::SemiActive(available) => available[host.0] = eft,
            Timeline::Active(gaps) => {
                let host_gaps = &mut gaps[host.0];
                let Some(position) = host_gaps.iter().position(|gap| gap.contains(ast, eft)) else {
                    log::error!("No idle gap on host {} holds [{}, {}], the timeline was not updated.", host, ast, eft);
                    return;
                };

                let used = host_gaps.remove(position);
                for part in [ScheduleGap::new(used.start, ast), ScheduleGap::new(eft, used.end)] {
                    if part.start != part.end {
                        host_gaps.push(part);
                    }
                }
            }
        }
    }
}
