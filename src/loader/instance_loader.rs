use std::path::Path;

use crate::api::instance_dto::{FileLinkDto, HostsFileDto, TaskDto, WorkflowFileDto};
use crate::domain::instance::{Host, InstanceBuilder, InstanceData, TaskFile};
use crate::error::Result;
use crate::loader::parser::parse_json_file;
use crate::loader::units::parse_units;

impl InstanceData {
    /// Builds the instance from its deserialized workflow and host files.
    ///
    /// File sizes are given in bytes and stored in bits. Host speeds are unit strings, see `parse_units`.
    ///
    /// # Errors
    /// `Error::InvalidUnit` for a malformed host speed and `Error::ModelConstructionError` for an invalid graph.
    pub fn from_dto(workflow: WorkflowFileDto, hosts: HostsFileDto, reference_flops: u64) -> Result<Self> {
        let mut builder = InstanceBuilder::new();

        for task in &workflow.workflow.tasks {
            let (input, output) = split_files(task);
            builder.add_task(task.name.clone(), task.runtime, input, output);
        }

        for task in &workflow.workflow.tasks {
            for parent in &task.parents {
                builder.add_dependency(parent.clone(), task.name.clone());
            }
        }

        for host in hosts.hosts {
            let flops = parse_units(&host.flops)?;
            let disk_speed = parse_units(&host.disk_speed)?;
            let network_speed = parse_units(&host.network_speed)?;
            builder.add_host(Host::new(host.name, flops, disk_speed, network_speed, host.energy_cost, host.energy_cost_standby));
        }

        let instance = builder.build(reference_flops)?;
        log::info!(
            "Workflow '{}' loaded with {} tasks on {} hosts.",
            workflow.name,
            instance.task_count(),
            instance.host_count()
        );
        Ok(instance)
    }
}

fn split_files(task: &TaskDto) -> (Vec<TaskFile>, Vec<TaskFile>) {
    let mut input = Vec::new();
    let mut output = Vec::new();
    for file in &task.files {
        let converted = TaskFile::new(file.name.clone(), file.size_in_bytes.saturating_mul(8));
        match file.link {
            FileLinkDto::Input => input.push(converted),
            FileLinkDto::Output => output.push(converted),
        }
    }
    (input, output)
}

/// Reads a workflow file and a host file and builds the instance.
///
/// `reference_flops` is a unit string such as `"1Gf"`: the speed of the machine the task runtimes were measured on.
pub fn load_instance(workflow_path: impl AsRef<Path>, hosts_path: impl AsRef<Path>, reference_flops: &str) -> Result<InstanceData> {
    let reference_flops = parse_units(reference_flops)?;

    let workflow: WorkflowFileDto = parse_json_file(workflow_path)?;
    let hosts: HostsFileDto = parse_json_file(hosts_path)?;
    log::debug!("Workflow and host files parsed successfully.");

    InstanceData::from_dto(workflow, hosts, reference_flops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::loader::parser::parse_json_str;

    const WORKFLOW: &str = r#"{
        "name": "diamond",
        "workflow": {
            "tasks": [
                { "name": "a", "runtime": 2.0, "parents": [],
                  "files": [ { "link": "output", "name": "x", "sizeInBytes": 10 } ] },
                { "name": "b", "runtime": 4.0, "parents": ["a"],
                  "files": [ { "link": "input", "name": "x", "sizeInBytes": 10 },
                             { "link": "input", "name": "raw", "sizeInBytes": 5 } ] }
            ]
        }
    }"#;

    const HOSTS: &str = r#"{
        "hosts": [
            { "name": "h1", "flops": "2Gf", "diskSpeed": "100MBps", "networkSpeed": "1Gbps",
              "energyCost": 3.0, "energyCostStandBy": 0.5 }
        ]
    }"#;

    #[test]
    fn test_from_dto_converts_units() {
        let workflow: WorkflowFileDto = parse_json_str(WORKFLOW).unwrap();
        let hosts: HostsFileDto = parse_json_str(HOSTS).unwrap();
        let instance = InstanceData::from_dto(workflow, hosts, 1_000_000_000).unwrap();

        let b = instance.task_idx("b").unwrap();
        assert_eq!(instance.task(b).input.size_in_bits(), 120);
        assert_eq!(instance.task(b).parents, vec![instance.task_idx("a").unwrap()]);

        let host = &instance.hosts()[0];
        assert_eq!(host.flops, 2_000_000_000);
        assert_eq!(host.disk_speed, 800_000_000);
        assert_eq!(host.network_speed, 1_000_000_000);
        assert_eq!(host.energy_cost_standby, 0.5);
    }

    #[test]
    fn test_from_dto_rejects_bad_unit() {
        let workflow: WorkflowFileDto = parse_json_str(WORKFLOW).unwrap();
        let mut hosts: HostsFileDto = parse_json_str(HOSTS).unwrap();
        hosts.hosts[0].flops = "fast".to_string();

        assert!(matches!(InstanceData::from_dto(workflow, hosts, 1), Err(Error::InvalidUnit(_))));
    }
}
