pub mod ids;
pub mod instance;
pub mod plan;
pub mod schedule;
pub mod solution;
