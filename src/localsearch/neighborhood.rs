use crate::domain::ids::HostIdx;
use crate::domain::instance::InstanceData;
use crate::domain::plan::Plan;
use crate::error::{Error, Result};
use crate::localsearch::movement::Movement;

/// A neighbour plan together with the movements that produced it from the original plan.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedNeighbor {
    pub plan: Plan,
    pub movements: Vec<Movement>,
}

/// Positions a task may move to without breaking a direct dependency.
///
/// Scans left from `position` to the nearest direct parent and right to the nearest direct child; the window
/// is everything strictly between them (it includes `position` itself). Only direct edges are checked, the
/// plan is assumed to be topologically ordered already.
pub fn valid_window(instance: &InstanceData, plan: &Plan, position: usize) -> std::ops::Range<usize> {
    let task = instance.task(plan[position].task);

    let left = (0..position).rev().find(|&p| task.parents.contains(&plan[p].task)).map_or(0, |p| p + 1);
    let right = (position + 1..plan.len()).find(|&p| task.children.contains(&plan[p].task)).unwrap_or(plan.len());

    left..right
}

/// Plan positions of the direct parents of the task at `position`, ascending.
pub fn parents_positions(instance: &InstanceData, plan: &Plan, position: usize) -> Vec<usize> {
    let parents = &instance.task(plan[position].task).parents;
    (0..plan.len()).filter(|&p| parents.contains(&plan[p].task)).collect()
}

/// Plan positions of the direct children of the task at `position`, ascending.
pub fn children_positions(instance: &InstanceData, plan: &Plan, position: usize) -> Vec<usize> {
    let children = &instance.task(plan[position].task).children;
    (0..plan.len()).filter(|&p| children.contains(&plan[p].task)).collect()
}

/// Generates precedence-preserving neighbours of a plan.
///
/// Implementors only describe which movements exist at a position. The positional, global and lazy generation
/// modes are derived from that and therefore always enumerate the same neighbours in the same order.
pub trait NeighborhoodOperator: Send + Sync {
    /// Matches `Movement::name` of the movements this operator generates.
    fn name(&self) -> &'static str;

    /// Movements available at `position`, in generation order.
    fn movements_at(&self, plan: &Plan, position: usize) -> Vec<Movement>;

    /// Builds the neighbour described by `movement`.
    ///
    /// # Errors
    /// `Error::MismatchedMovement` if `movement` belongs to another operator.
    fn apply(&self, plan: &Plan, movement: &Movement) -> Result<Plan> {
        if movement.name() != self.name() {
            return Err(Error::MismatchedMovement { operator: self.name(), movement: movement.name() });
        }
        Ok(movement.apply_to(plan))
    }

    fn positional(&self, plan: &Plan, position: usize) -> Vec<GeneratedNeighbor> {
        self.movements_at(plan, position)
            .into_iter()
            .map(|movement| GeneratedNeighbor { plan: movement.apply_to(plan), movements: vec![movement] })
            .collect()
    }

    fn global(&self, plan: &Plan) -> Vec<GeneratedNeighbor> {
        (0..plan.len()).flat_map(|position| self.positional(plan, position)).collect()
    }

    fn lazy<'a>(&'a self, plan: &'a Plan) -> LazyNeighbors<'a>
    where
        Self: Sized,
    {
        LazyNeighbors::new(self, plan)
    }
}

/// On-demand version of `NeighborhoodOperator::global`.
///
/// Neighbour plans are only built when requested. Cloning yields an independent cursor, `restart` rewinds to
/// the first neighbour.
#[derive(Clone)]
pub struct LazyNeighbors<'a> {
    operator: &'a dyn NeighborhoodOperator,
    plan: &'a Plan,
    next_position: usize,
    pending: std::vec::IntoIter<Movement>,
}

impl<'a> LazyNeighbors<'a> {
    pub fn new(operator: &'a dyn NeighborhoodOperator, plan: &'a Plan) -> Self {
        LazyNeighbors { operator, plan, next_position: 0, pending: Vec::new().into_iter() }
    }

    pub fn restart(&mut self) {
        self.next_position = 0;
        self.pending = Vec::new().into_iter();
    }
}

impl Iterator for LazyNeighbors<'_> {
    type Item = GeneratedNeighbor;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(movement) = self.pending.next() {
                return Some(GeneratedNeighbor { plan: movement.apply_to(self.plan), movements: vec![movement] });
            }
            if self.next_position >= self.plan.len() {
                return None;
            }
            self.pending = self.operator.movements_at(self.plan, self.next_position).into_iter();
            self.next_position += 1;
        }
    }
}

/// Applies `operator` at `position` on top of already generated neighbours, chaining the movements.
pub fn compose_positional(neighbors: &[GeneratedNeighbor], operator: &dyn NeighborhoodOperator, position: usize) -> Vec<GeneratedNeighbor> {
    neighbors.iter().flat_map(|base| chain(base, operator.positional(&base.plan, position))).collect()
}

/// Applies `operator` everywhere on top of already generated neighbours, chaining the movements.
pub fn compose_global(neighbors: &[GeneratedNeighbor], operator: &dyn NeighborhoodOperator) -> Vec<GeneratedNeighbor> {
    neighbors.iter().flat_map(|base| chain(base, operator.global(&base.plan))).collect()
}

fn chain(base: &GeneratedNeighbor, generated: Vec<GeneratedNeighbor>) -> Vec<GeneratedNeighbor> {
    generated
        .into_iter()
        .map(|neighbor| {
            let mut movements = base.movements.clone();
            movements.extend(neighbor.movements);
            GeneratedNeighbor { plan: neighbor.plan, movements }
        })
        .collect()
}

/// Exchanges the pairs at two positions of the same window. Each task keeps its host, only the order changes.
pub struct SwapOperator<'i> {
    instance: &'i InstanceData,
}

impl<'i> SwapOperator<'i> {
    pub fn new(instance: &'i InstanceData) -> Self {
        SwapOperator { instance }
    }
}

impl NeighborhoodOperator for SwapOperator<'_> {
    fn name(&self) -> &'static str {
        "swap"
    }

    fn movements_at(&self, plan: &Plan, position: usize) -> Vec<Movement> {
        valid_window(self.instance, plan, position)
            .filter(|&other| other != position)
            .map(|other| Movement::Swap { first: position, second: other })
            .collect()
    }
}

/// Moves one task anywhere inside its window, shifting the pairs in between.
pub struct InsertionOperator<'i> {
    instance: &'i InstanceData,
}

impl<'i> InsertionOperator<'i> {
    pub fn new(instance: &'i InstanceData) -> Self {
        InsertionOperator { instance }
    }
}

impl NeighborhoodOperator for InsertionOperator<'_> {
    fn name(&self) -> &'static str {
        "insertion"
    }

    fn movements_at(&self, plan: &Plan, position: usize) -> Vec<Movement> {
        valid_window(self.instance, plan, position)
            .filter(|&other| other != position)
            .map(|other| Movement::Insertion { from: position, to: other })
            .collect()
    }
}

/// Gives one position every other host of the instance, in instance order.
pub struct ChangeHostOperator {
    hosts: Vec<HostIdx>,
}

impl ChangeHostOperator {
    pub fn new(instance: &InstanceData) -> Self {
        ChangeHostOperator { hosts: instance.host_indices().collect() }
    }
}

impl NeighborhoodOperator for ChangeHostOperator {
    fn name(&self) -> &'static str {
        "change-host"
    }

    fn movements_at(&self, plan: &Plan, position: usize) -> Vec<Movement> {
        let current = plan[position].host;
        self.hosts.iter().filter(|&&host| host != current).map(|&host| Movement::ChangeHost { position, host }).collect()
    }
}

/// Exchanges the hosts at two positions of the same window.
pub struct SwapHostOperator<'i> {
    instance: &'i InstanceData,
}

impl<'i> SwapHostOperator<'i> {
    pub fn new(instance: &'i InstanceData) -> Self {
        SwapHostOperator { instance }
    }
}

impl NeighborhoodOperator for SwapHostOperator<'_> {
    fn name(&self) -> &'static str {
        "swap-host"
    }

    fn movements_at(&self, plan: &Plan, position: usize) -> Vec<Movement> {
        valid_window(self.instance, plan, position)
            .filter(|&other| other != position)
            .map(|other| Movement::SwapHost { first: position, second: other })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instance::{Host, InstanceBuilder};
    use crate::domain::plan::PlanPair;

    /// a -> c, b independent, c -> d
    fn chain_instance() -> InstanceData {
        let mut builder = InstanceBuilder::new();
        for name in ["a", "b", "c", "d"] {
            builder.add_task(name, 1.0, vec![], vec![]);
        }
        builder.add_dependency("a", "c").add_dependency("c", "d");
        builder.add_host(Host::new("h1", 1, 1, 1, 1.0, 0.0)).add_host(Host::new("h2", 1, 1, 1, 1.0, 0.0));
        builder.build(1).unwrap()
    }

    fn plan(instance: &InstanceData) -> Plan {
        Plan::from_ids(instance, &[("a", "h1"), ("b", "h2"), ("c", "h1"), ("d", "h2")]).unwrap()
    }

    #[test]
    fn test_valid_window_uses_direct_edges() {
        let instance = chain_instance();
        let plan = plan(&instance);

        assert_eq!(valid_window(&instance, &plan, 0), 0..2);
        assert_eq!(valid_window(&instance, &plan, 1), 0..4);
        assert_eq!(valid_window(&instance, &plan, 2), 1..3);
        assert_eq!(valid_window(&instance, &plan, 3), 3..4);

        assert_eq!(parents_positions(&instance, &plan, 2), vec![0]);
        assert_eq!(children_positions(&instance, &plan, 2), vec![3]);
    }

    #[test]
    fn test_insertion_shifts_pairs() {
        let instance = chain_instance();
        let plan = plan(&instance);
        let operator = InsertionOperator::new(&instance);

        let moved = operator.apply(&plan, &Movement::Insertion { from: 1, to: 3 }).unwrap();
        let order: Vec<&str> = moved.iter().map(|p| instance.task_id(p.task).as_str()).collect();
        assert_eq!(order, vec!["a", "c", "d", "b"]);
        assert_eq!(moved[3].host, plan[1].host);

        let moved = operator.apply(&plan, &Movement::Insertion { from: 1, to: 0 }).unwrap();
        let order: Vec<&str> = moved.iter().map(|p| instance.task_id(p.task).as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_apply_rejects_movement_of_other_operator() {
        let instance = chain_instance();
        let plan = plan(&instance);

        let result = SwapOperator::new(&instance).apply(&plan, &Movement::SwapHost { first: 0, second: 1 });
        assert!(matches!(result, Err(Error::MismatchedMovement { operator: "swap", movement: "swap-host" })));

        let result = ChangeHostOperator::new(&instance).apply(&plan, &Movement::Insertion { from: 1, to: 3 });
        assert!(matches!(result, Err(Error::MismatchedMovement { operator: "change-host", movement: "insertion" })));

        let swapped = SwapOperator::new(&instance).apply(&plan, &Movement::Swap { first: 0, second: 1 }).unwrap();
        assert_eq!(swapped[0], plan[1]);
        assert_eq!(swapped[1], plan[0]);
    }

    #[test]
    fn test_swap_host_keeps_tasks() {
        let instance = chain_instance();
        let plan = plan(&instance);
        let neighbors = SwapHostOperator::new(&instance).positional(&plan, 0);

        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].movements, vec![Movement::SwapHost { first: 0, second: 1 }]);
        assert_eq!(neighbors[0].plan[0], PlanPair::new(plan[0].task, plan[1].host));
        assert_eq!(neighbors[0].plan[1], PlanPair::new(plan[1].task, plan[0].host));
    }

    #[test]
    fn test_change_host_skips_current_host() {
        let instance = chain_instance();
        let plan = plan(&instance);
        let neighbors = ChangeHostOperator::new(&instance).global(&plan);

        assert_eq!(neighbors.len(), 4);
        for (position, neighbor) in neighbors.iter().enumerate() {
            assert_ne!(neighbor.plan[position].host, plan[position].host);
        }
    }

    #[test]
    fn test_lazy_restart_and_compose() {
        let instance = chain_instance();
        let plan = plan(&instance);
        let swap = SwapOperator::new(&instance);

        let mut lazy = swap.lazy(&plan);
        let first = lazy.next().unwrap();
        lazy.next();
        lazy.restart();
        assert_eq!(lazy.next().unwrap(), first);

        let change_host = ChangeHostOperator::new(&instance);
        let composed = compose_positional(&swap.positional(&plan, 0), &change_host, 0);
        assert_eq!(composed.len(), 1);
        assert_eq!(composed[0].movements.len(), 2);
    }
}
