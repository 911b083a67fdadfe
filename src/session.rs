use std::io::{BufRead, Write};

use stacked_errors::{Result, StackableErr};
use tracing::{error, info};

use crate::{
    launch_and_run, resolve_documents, teardown, validate, Client, ContainerHandle,
    PreconditionError, ProcessRunner, Prompter, RunStatus, TestConfig, Validation,
};

/// How a test session ended
#[derive(Debug)]
pub enum SessionEnd {
    /// A precondition failed, nothing was launched
    Rejected(PreconditionError),
    /// The operator chose not to continue, nothing was launched
    Aborted,
    /// The tool was run and the container torn down
    Finished(RunStatus),
}

impl SessionEnd {
    /// The exit code for the process running the session
    pub fn exit_code(&self) -> i32 {
        match self {
            SessionEnd::Rejected(_) | SessionEnd::Aborted => 1,
            SessionEnd::Finished(status) => status.exit_code(),
        }
    }
}

/// Validates `config`, generates missing settings documents, runs the tool in
/// a fresh container, and then tears the container down as the `prompter`
/// decides.
///
/// The returned error is for failures of this process (writing the generated
/// documents, reading answers), not of the tool or the runtime client.
pub async fn run_session<R: ProcessRunner, I: BufRead, O: Write>(
    config: &TestConfig,
    runner: &mut R,
    prompter: &mut Prompter<I, O>,
) -> Result<SessionEnd> {
    if prompter.non_interactive() {
        info!("Non-interactive mode.");
    }
    let paths = match validate(config, prompter).await.stack()? {
        Validation::Accepted(paths) => paths,
        Validation::Rejected(e) => {
            error!("{e}");
            return Ok(SessionEnd::Rejected(e))
        }
        Validation::Aborted => return Ok(SessionEnd::Aborted),
    };
    let documents = resolve_documents(config, &paths.inputs)
        .await
        .stack_err("run_session -> could not resolve the settings documents")?;

    let client = Client::new(&config.client);
    let run = launch_and_run(
        runner,
        &client,
        config,
        &paths,
        &documents,
        ContainerHandle::generate(),
    )
    .await;
    if let RunStatus::LaunchFailed(e) = &run.status {
        error!("{e:?}");
    }

    teardown(runner, &client, &run.container, prompter)
        .await
        .stack_err_with(|| format!("run_session -> teardown of container {}", run.container))?;

    info!("Analysis exit code: {}", run.status.exit_code());
    Ok(SessionEnd::Finished(run.status))
}
