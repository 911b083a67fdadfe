use stacked_errors::{Error, StackableErr};
use tracing::{info, warn};

use crate::{
    Client, Command, ContainerHandle, ProcessRunner, ResolvedDocuments, TestConfig,
    ValidatedPaths, CONTAINER_INPUT_PATH, CONTAINER_OUTPUT_PATH, CONTAINER_RESOURCES_PATH,
    CONTAINER_SETTINGS_PATH, CONTAINER_SHELL, CONTAINER_VALUES_PATH,
};

/// How the tool run inside the container ended
#[derive(Debug)]
pub enum RunStatus {
    Exited(i32),
    /// The run process ended without an exit code
    Signaled,
    /// The run process could not be executed at all
    LaunchFailed(Error),
}

impl RunStatus {
    /// The exit code the session reports, 1 if the run did not produce one
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Exited(code) => *code,
            RunStatus::Signaled | RunStatus::LaunchFailed(_) => 1,
        }
    }
}

#[derive(Debug)]
pub struct ToolRun {
    pub container: ContainerHandle,
    pub status: RunStatus,
}

/// Runs a step that is not the tool run itself. Failures are reported but
/// never stop the steps after it.
pub(crate) async fn step<R: ProcessRunner>(runner: &mut R, command: Command) {
    match runner.run(command).await {
        Ok(comres) => {
            if !comres.successful() {
                warn!(
                    "`{}` was unsuccessful with exit code {:?}",
                    comres.command.get_unified_command(),
                    comres.exit_code
                );
            }
        }
        Err(e) => warn!("{e:?}"),
    }
}

/// The command that executes the tool entrypoint inside the container
pub fn launch_command(
    client: &Client,
    config: &TestConfig,
    container: &ContainerHandle,
    with_resources: bool,
) -> Command {
    let tool_path = format!("{}:run", config.tool);
    let mut args = vec![
        CONTAINER_SHELL,
        config.entrypoint.as_str(),
        CONTAINER_SETTINGS_PATH,
        CONTAINER_VALUES_PATH,
        CONTAINER_INPUT_PATH,
        CONTAINER_OUTPUT_PATH,
        "--tool-path",
        tool_path.as_str(),
    ];
    if with_resources {
        args.extend(["--res-folder", CONTAINER_RESOURCES_PATH]);
    }
    client.exec(container, args).echo(true).debug(true)
}

/// Starts the container, copies the settings documents and resources into it,
/// patches the entrypoint, and runs the tool
pub async fn launch_and_run<R: ProcessRunner>(
    runner: &mut R,
    client: &Client,
    config: &TestConfig,
    paths: &ValidatedPaths,
    documents: &ResolvedDocuments,
    container: ContainerHandle,
) -> ToolRun {
    info!("Starting container {container}...");
    step(
        runner,
        client
            .run_detached(
                &container,
                &config.image,
                &paths.inputs,
                &paths.outputs,
                &config.volumes,
            )
            .echo(true)
            .debug(true),
    )
    .await;

    step(
        runner,
        client
            .copy_into(&container, &documents.settings, CONTAINER_SETTINGS_PATH)
            .debug(true),
    )
    .await;
    step(
        runner,
        client
            .copy_into(&container, &documents.values, CONTAINER_VALUES_PATH)
            .debug(true),
    )
    .await;

    step(
        runner,
        client
            .patch_entrypoint(&container, &config.entrypoint)
            .echo(true)
            .debug(true),
    )
    .await;

    if let Some(resources) = &paths.resources {
        step(
            runner,
            client
                .copy_into(&container, resources, CONTAINER_RESOURCES_PATH)
                .debug(true),
        )
        .await;
    }

    info!("Running {}.py:run()...", config.tool);
    let command = launch_command(client, config, &container, paths.resources.is_some());
    let status = match runner
        .run(command)
        .await
        .stack_err("launch_and_run -> could not execute the tool entrypoint")
    {
        Ok(comres) => match comres.exit_code {
            Some(code) => RunStatus::Exited(code),
            None => RunStatus::Signaled,
        },
        Err(e) => RunStatus::LaunchFailed(e),
    };
    ToolRun { container, status }
}
