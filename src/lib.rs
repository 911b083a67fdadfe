//! Local testing of packaged tool images. A session starts a container from
//! the tool image, copies settings documents into it, runs the tool
//! entrypoint, and then tears the container down.

pub mod aggregate;
mod command;
mod config;
mod container;
mod defaults;
mod misc;
mod orchestrate;
mod paths;
mod prompt;
mod runner;
mod session;
mod teardown;
mod validate;

pub use command::*;
pub use config::*;
pub use container::*;
pub use defaults::*;
pub use misc::*;
pub use orchestrate::{launch_and_run, launch_command, RunStatus, ToolRun};
pub use paths::*;
pub use prompt::*;
pub use runner::*;
pub use session::*;
pub use teardown::*;
pub use validate::*;
/// This reexport helps with dependency wrangling
pub use stacked_errors;
