use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use workflow_fitness::config::{Engine, EngineConfig};
use workflow_fitness::domain::plan::Plan;
use workflow_fitness::domain::solution::Solution;
use workflow_fitness::error::Error;
use workflow_fitness::{build_engine, load_instance};

const WORKFLOW: &str = r#"{
    "name": "pipeline",
    "workflow": {
        "tasks": [
            { "name": "fetch", "runtime": 4.0, "parents": [],
              "files": [ { "link": "input", "name": "source", "sizeInBytes": 100 },
                         { "link": "output", "name": "blob", "sizeInBytes": 50 } ] },
            { "name": "split", "runtime": 2.0, "parents": ["fetch"],
              "files": [ { "link": "input", "name": "blob", "sizeInBytes": 50 },
                         { "link": "output", "name": "left", "sizeInBytes": 25 },
                         { "link": "output", "name": "right", "sizeInBytes": 25 } ] },
            { "name": "map-left", "runtime": 6.0, "parents": ["split"],
              "files": [ { "link": "input", "name": "left", "sizeInBytes": 25 } ] },
            { "name": "map-right", "runtime": 6.0, "parents": ["split"],
              "files": [ { "link": "input", "name": "right", "sizeInBytes": 25 } ] }
        ]
    }
}"#;

const HOSTS: &str = r#"{
    "hosts": [
        { "name": "edge", "flops": "1Gf", "diskSpeed": "100Bps", "networkSpeed": "400bps",
          "energyCost": 1.0, "energyCostStandBy": 0.1 },
        { "name": "cloud", "flops": "4Gf", "diskSpeed": "200Bps", "networkSpeed": "800bps",
          "energyCost": 5.0, "energyCostStandBy": 0.5 }
    ]
}"#;

/// Writes the fixture files into a fresh directory under the system temp dir.
fn fixture_dir(name: &str, config: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("workflow_fitness_{}_{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("workflow.json"), WORKFLOW).unwrap();
    fs::write(dir.join("hosts.json"), HOSTS).unwrap();
    fs::write(dir.join("config.json"), config).unwrap();
    dir
}

#[test]
fn test_load_instance_from_files() {
    let dir = fixture_dir("load", "{}");
    let instance = load_instance(dir.join("workflow.json"), dir.join("hosts.json"), "1Gf").unwrap();

    assert_eq!(instance.task_count(), 4);
    assert_eq!(instance.host_count(), 2);
    assert_eq!(instance.reference_flops(), 1_000_000_000);

    let split = instance.task_idx("split").unwrap();
    assert_eq!(instance.task(split).children.len(), 2);
    assert_eq!(instance.task(split).output.size_in_bits(), 400);

    let cloud = instance.host_idx("cloud").unwrap();
    assert_eq!(instance.host(cloud).disk_speed, 1_600);
    assert_eq!(instance.host(cloud).network_speed, 800);
}

#[test]
fn test_build_engine_evaluates_with_configured_fitness() {
    let dir = fixture_dir("engine", r#"{ "fitness": "simple", "referenceFlops": "1Gf" }"#);
    let engine = build_engine(dir.join("workflow.json"), dir.join("hosts.json"), dir.join("config.json")).unwrap();
    assert_eq!(engine.calculator().fitness_name(), "simple");

    let instance = engine.context().instance();
    let plan = Plan::from_ids(instance, &[("fetch", "edge"), ("split", "edge"), ("map-left", "edge"), ("map-right", "edge")]).unwrap();
    let mut solution = Solution::new(plan);
    engine.evaluate(&mut solution).unwrap();

    // edge disk is 800 bit/s: fetch 1 + 0.5 + 4, split 0.5 + 0.5 + 2, each map 0.25 + 6
    let makespan = solution.makespan().unwrap();
    assert!((makespan - (5.5 + 3.0 + 6.25 + 6.25)).abs() < 1e-9, "{}", makespan);
    assert_eq!(solution.objectives[0], makespan);
}

#[test]
fn test_engine_records_history_for_ensembles() {
    let dir = fixture_dir("history", r#"{ "fitness": "multi-makespan", "recordHistory": true }"#);
    let config = EngineConfig::from_file(dir.join("config.json")).unwrap();
    let instance = load_instance(dir.join("workflow.json"), dir.join("hosts.json"), &config.reference_flops).unwrap();
    let engine = Engine::new(Arc::new(instance), &config).unwrap();

    let plan = Plan::random(engine.context().instance(), &mut StdRng::seed_from_u64(23));
    let mut solution = Solution::with_arbiter(plan, "energy");
    engine.evaluate(&mut solution).unwrap();

    // multi-makespan always judges on makespan
    assert!(solution.multi_result.is_some());
    let history = engine.history().unwrap().lock().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].arbiter, "energy");
}

#[test]
fn test_engine_rejects_bad_configuration() {
    let dir = fixture_dir("bad", r#"{ "fitness": "does-not-exist" }"#);
    let result = build_engine(dir.join("workflow.json"), dir.join("hosts.json"), dir.join("config.json"));
    assert!(matches!(result, Err(Error::UnsupportedFitness(_))));

    let result = build_engine(dir.join("missing.json"), dir.join("hosts.json"), dir.join("config.json"));
    assert!(matches!(result, Err(Error::IoError(_))));

    fs::write(dir.join("broken.json"), "{ not json").unwrap();
    let result = load_instance(dir.join("broken.json"), dir.join("hosts.json"), "1Gf");
    assert!(matches!(result, Err(Error::DeserializationError(_))));

    let result = load_instance(dir.join("missing.json"), dir.join("hosts.json"), "1Gf");
    assert!(matches!(result, Err(Error::IoError(_))));

    let result = load_instance(dir.join("workflow.json"), dir.join("hosts.json"), "fast");
    assert!(matches!(result, Err(Error::InvalidUnit(_))));
}
