pub mod evaluator;
pub mod movement;
pub mod neighborhood;
