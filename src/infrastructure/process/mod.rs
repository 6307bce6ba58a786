//! External command execution.
//!
//! Every tool the job pipelines shell out to goes through [`CommandRunner`],
//! so tests can swap in a recording fake and assert exact argument lists.

mod runner;

pub use runner::{CommandOutput, CommandRunner, Invocation, RunnerError, TokioCommandRunner};
