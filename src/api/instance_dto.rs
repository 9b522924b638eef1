use serde::{Deserialize, Serialize};

/// Root of a WfCommons-style workflow file.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowFileDto {
    #[serde(default)]
    pub name: String,

    pub workflow: WorkflowDto,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDto {
    pub tasks: Vec<TaskDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub name: String,

    /// Seconds on the reference machine.
    pub runtime: f64,

    #[serde(default)]
    pub parents: Vec<String>,

    #[serde(default)]
    pub files: Vec<FileDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileLinkDto {
    Input,
    Output,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FileDto {
    pub link: FileLinkDto,
    pub name: String,
    pub size_in_bytes: u64,
}

/// Root of a host file.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HostsFileDto {
    pub hosts: Vec<HostDto>,
}

/// Speeds are unit strings such as `"441Gf"` or `"100MBps"`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HostDto {
    pub name: String,
    pub flops: String,
    pub disk_speed: String,
    pub network_speed: String,
    pub energy_cost: f64,

    #[serde(rename = "energyCostStandBy")]
    pub energy_cost_standby: f64,
}
