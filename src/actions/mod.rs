//! Simulated action execution

pub mod executor;
pub mod id_gen;

pub use executor::ActionExecutor;
pub use id_gen::{IdGenerator, SequentialIdGenerator, UuidGenerator};
