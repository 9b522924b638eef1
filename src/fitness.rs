pub mod calculator;
pub mod factory;
pub mod insertion;
pub mod multi;
pub mod rank;
pub mod simple;
