//! Plan execution engine

pub mod engine;
pub mod guard;
pub mod runner;

pub use engine::{EventHandler, ExecutionEngine, ExecutionEvent};
pub use guard::GuardVerdict;
pub use runner::{CommandOutput, CommandRunner, HostRunner, RecordingRunner};
