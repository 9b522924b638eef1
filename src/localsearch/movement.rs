use serde::Serialize;

use crate::domain::ids::HostIdx;
use crate::domain::plan::{Plan, PlanPair};

/// Minimal description of the edit that turned a plan into one of its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Movement {
    /// Pairs at both positions exchanged, every task keeps its host.
    Swap { first: usize, second: usize },

    /// The pair at `from` was removed and reinserted at `to`, shifting the pairs in between.
    Insertion { from: usize, to: usize },

    /// The host at `position` was replaced by `host`.
    ChangeHost { position: usize, host: HostIdx },

    /// Hosts at both positions exchanged, tasks stay in place.
    SwapHost { first: usize, second: usize },
}

impl Movement {
    /// Lowest plan index whose pair differs from the original plan.
    pub fn first_change_position(&self) -> usize {
        match *self {
            Movement::Swap { first, second } | Movement::SwapHost { first, second } => first.min(second),
            Movement::Insertion { from, to } => from.min(to),
            Movement::ChangeHost { position, .. } => position,
        }
    }

    /// Positions whose task now runs on a different host. Reordering movements report none.
    pub fn changed_host_positions(&self) -> Vec<usize> {
        match *self {
            Movement::Swap { .. } | Movement::Insertion { .. } => Vec::new(),
            Movement::ChangeHost { position, .. } => vec![position],
            Movement::SwapHost { first, second } => vec![first, second],
        }
    }

    /// Builds the plan this movement describes, starting from `plan`.
    pub fn apply_to(&self, plan: &Plan) -> Plan {
        match *self {
            Movement::Swap { first, second } => {
                let mut pairs = plan.pairs().to_vec();
                pairs.swap(first, second);
                Plan::new(pairs)
            }
            Movement::Insertion { from, to } => {
                let mut pairs = plan.pairs().to_vec();
                let moved = pairs.remove(from);
                pairs.insert(to, moved);
                Plan::new(pairs)
            }
            Movement::ChangeHost { position, host } => {
                let mut neighbor = plan.clone();
                neighbor.set(position, PlanPair::new(plan[position].task, host));
                neighbor
            }
            Movement::SwapHost { first, second } => {
                let mut neighbor = plan.clone();
                neighbor.set(first, PlanPair::new(plan[first].task, plan[second].host));
                neighbor.set(second, PlanPair::new(plan[second].task, plan[first].host));
                neighbor
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Movement::Swap { .. } => "swap",
            Movement::Insertion { .. } => "insertion",
            Movement::ChangeHost { .. } => "change-host",
            Movement::SwapHost { .. } => "swap-host",
        }
    }
}
