pub mod message;
pub mod simulation;
