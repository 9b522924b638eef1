pub mod instance_loader;
pub mod parser;
pub mod units;
