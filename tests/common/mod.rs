#![allow(dead_code)]

use std::sync::Arc;

use workflow_fitness::domain::instance::{Host, InstanceBuilder, InstanceData, TaskFile};
use workflow_fitness::domain::plan::Plan;
use workflow_fitness::scheduling::context::SchedulingContext;

pub const TOLERANCE: f64 = 1e-9;

pub fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < TOLERANCE, "expected {}, got {}", expected, actual);
}

fn file(name: &str, bits: u64) -> TaskFile {
    TaskFile::new(name, bits)
}

/// Fork-join workflow on three hosts.
///
/// `t1` stages 200 bits and sends 100 bits to each of `t2`, `t3` and `t4`, which send 50 bits each to `t5`.
///
/// | host | flops | disk | net | cost | standby |
/// |------|-------|------|-----|------|---------|
/// | A    | 1G    | 100  | 50  | 1.0  | 0.1     |
/// | B    | 2G    | 100  | 50  | 2.0  | 0.2     |
/// | C    | 2.5G  | 200  | 100 | 3.0  | 0.3     |
pub fn fork_join_instance() -> InstanceData {
    let mut builder = InstanceBuilder::new();
    builder
        .add_task("t1", 10.0, vec![file("raw", 200)], vec![file("d12", 100), file("d13", 100), file("d14", 100)])
        .add_task("t2", 15.0, vec![file("d12", 100)], vec![file("d25", 50)])
        .add_task("t3", 5.0, vec![file("d13", 100)], vec![file("d35", 50)])
        .add_task("t4", 20.0, vec![file("d14", 100)], vec![file("d45", 50)])
        .add_task("t5", 8.0, vec![file("d25", 50), file("d35", 50), file("d45", 50)], vec![]);

    for child in ["t2", "t3", "t4"] {
        builder.add_dependency("t1", child).add_dependency(child, "t5");
    }

    builder
        .add_host(Host::new("A", 1_000_000_000, 100, 50, 1.0, 0.1))
        .add_host(Host::new("B", 2_000_000_000, 100, 50, 2.0, 0.2))
        .add_host(Host::new("C", 2_500_000_000, 200, 100, 3.0, 0.3));

    builder.build(1_000_000_000).unwrap()
}

/// Ten tasks in four levels with shared children, so several tasks have more than one parent.
pub fn layered_instance() -> InstanceData {
    let edges = [(0, 1), (0, 2), (0, 3), (1, 4), (2, 4), (2, 5), (3, 5), (3, 6), (4, 7), (5, 7), (5, 8), (6, 8), (7, 9), (8, 9)];

    let mut builder = InstanceBuilder::new();
    for task in 0..10 {
        let mut input: Vec<TaskFile> = edges.iter().filter(|(_, c)| *c == task).map(|(p, _)| file(&format!("o{}", p), (*p as u64 + 1) * 40)).collect();
        if task == 0 {
            input.push(file("raw", 120));
        }
        if task == 5 {
            // partially staged from storage
            input.push(file("extra", 64));
        }
        let output = vec![file(&format!("o{}", task), (task as u64 + 1) * 40)];
        builder.add_task(format!("t{}", task), 3.0 + (task * 7 % 5) as f64, input, output);
    }
    for (parent, child) in edges {
        builder.add_dependency(format!("t{}", parent), format!("t{}", child));
    }

    builder
        .add_host(Host::new("slow", 1_000_000_000, 80, 40, 0.5, 0.05))
        .add_host(Host::new("mid", 2_000_000_000, 160, 120, 1.5, 0.1))
        .add_host(Host::new("fast", 4_000_000_000, 320, 200, 4.0, 0.4));

    builder.build(1_000_000_000).unwrap()
}

pub fn context(instance: InstanceData) -> Arc<SchedulingContext> {
    Arc::new(SchedulingContext::new(Arc::new(instance)))
}

pub fn plan(instance: &InstanceData, pairs: &[(&str, &str)]) -> Plan {
    Plan::from_ids(instance, pairs).unwrap()
}

/// Every task on `A`, in declaration order.
pub fn all_on_a(instance: &InstanceData) -> Plan {
    plan(instance, &[("t1", "A"), ("t2", "A"), ("t3", "A"), ("t4", "A"), ("t5", "A")])
}

pub fn mixed_hosts(instance: &InstanceData) -> Plan {
    plan(instance, &[("t1", "C"), ("t2", "B"), ("t3", "C"), ("t4", "A"), ("t5", "C")])
}

pub fn host_names(instance: &InstanceData, plan: &Plan) -> Vec<String> {
    plan.iter().map(|p| instance.host_id(p.host).to_string()).collect()
}

pub fn task_names(instance: &InstanceData, plan: &Plan) -> Vec<String> {
    plan.iter().map(|p| instance.task_id(p.task).to_string()).collect()
}
