use std::path::Path;
use std::sync::Arc;

use crate::config::{Engine, EngineConfig};
use crate::domain::instance::InstanceData;
use crate::error::Result;

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod fitness;
pub mod loader;
pub mod localsearch;
pub mod logger;
pub mod moheft;
pub mod random_keys;
pub mod scheduling;

pub use crate::loader::instance_loader::load_instance;

/// Loads a workflow, its hosts and an engine configuration and wires them into an `Engine`.
pub fn build_engine(workflow_path: impl AsRef<Path>, hosts_path: impl AsRef<Path>, config_path: impl AsRef<Path>) -> Result<Engine> {
    logger::init();
    log::info!("Logger initialized. Starting engine construction.");

    let config = EngineConfig::from_file(config_path)?;
    let instance: InstanceData = load_instance(workflow_path, hosts_path, &config.reference_flops)?;
    log::info!("Instance constructed successfully.");

    Engine::new(Arc::new(instance), &config)
}
