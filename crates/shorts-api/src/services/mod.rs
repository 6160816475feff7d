//! Business logic services.

pub mod generator;
pub mod scheduler;

pub use generator::ScriptGenerator;
pub use scheduler::Scheduler;
