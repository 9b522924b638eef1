pub mod context;
pub mod matrices;
pub mod ranking;
pub mod timeline;
