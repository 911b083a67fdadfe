use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use stacked_errors::{Result, StackableErr};
use tracing::warn;

use crate::{acquire_dir_path, dir_is_empty, Prompter, TestConfig};

/// The ways an invocation can be rejected before anything is launched
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    #[error("Error: Input folder does not exist")]
    MissingInputs,
    #[error("Error: Output folder does not exist")]
    MissingOutputs,
    #[error("Error: Resources folder does not exist")]
    MissingResources,
    #[error("Error: Entering a custom settings file requires a settings values file")]
    SettingsWithoutValues,
}

/// Canonical versions of the directories of a `TestConfig`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPaths {
    pub inputs: PathBuf,
    pub outputs: PathBuf,
    pub resources: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Accepted(ValidatedPaths),
    Rejected(PreconditionError),
    /// The operator did not want to risk overwriting the output folder
    Aborted,
}

pub const CONTINUE_QUESTION: &str = "Do you want to continue?";

/// Checks the preconditions of `config` in order, asking whether to continue
/// if the output folder already has something in it. The returned error is
/// only for I/O failures.
pub async fn validate<R: BufRead, W: Write>(
    config: &TestConfig,
    prompter: &mut Prompter<R, W>,
) -> Result<Validation> {
    let Ok(inputs) = acquire_dir_path(&config.inputs).await else {
        return Ok(Validation::Rejected(PreconditionError::MissingInputs))
    };
    let Ok(outputs) = acquire_dir_path(&config.outputs).await else {
        return Ok(Validation::Rejected(PreconditionError::MissingOutputs))
    };
    if !dir_is_empty(&outputs).await.stack_err("validate")? {
        warn!("Warning: Output folder is not empty (files could be overwritten).");
        if !prompter.confirm(CONTINUE_QUESTION).stack_err("validate")? {
            return Ok(Validation::Aborted)
        }
    }
    let resources = match &config.resources {
        Some(resources) => match acquire_dir_path(resources).await {
            Ok(resources) => Some(resources),
            Err(_) => return Ok(Validation::Rejected(PreconditionError::MissingResources)),
        },
        None => None,
    };
    if config.settings.is_some() && config.values.is_none() {
        return Ok(Validation::Rejected(
            PreconditionError::SettingsWithoutValues,
        ))
    }
    Ok(Validation::Accepted(ValidatedPaths {
        inputs,
        outputs,
        resources,
    }))
}
