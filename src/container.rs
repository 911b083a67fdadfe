use core::fmt;
use std::{fmt::Display, path::Path};

use uuid::Uuid;

use crate::{path_arg, Command};

pub const CONTAINER_NAME_PREFIX: &str = "local_test_";
const CONTAINER_SUFFIX_LEN: usize = 5;

// In-container paths
pub const CONTAINER_SETTINGS_PATH: &str = "/root/local_exec_settings.json";
pub const CONTAINER_VALUES_PATH: &str = "/root/local_exec_settings_values.json";
pub const CONTAINER_INPUT_PATH: &str = "/root/local_exec_input/";
pub const CONTAINER_OUTPUT_PATH: &str = "/root/local_exec_output/";
pub const CONTAINER_RESOURCES_PATH: &str = "/root/local_exec_resources/";

/// Shell used as the container entrypoint and for running the tool entrypoint
pub const CONTAINER_SHELL: &str = "/bin/bash";
/// The package the entrypoint imports the executor from, rewritten to its local
/// variant
pub const SDK_PACKAGE: &str = "qmenta.sdk";

/// The name of the container of one test session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerHandle {
    name: String,
}

impl ContainerHandle {
    /// `CONTAINER_NAME_PREFIX` followed by random uppercase letters
    pub fn generate() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Derives the random suffix from the bytes of `uuid`
    pub fn from_uuid(uuid: Uuid) -> Self {
        let mut name = CONTAINER_NAME_PREFIX.to_owned();
        name.extend(
            uuid.as_bytes()
                .iter()
                .take(CONTAINER_SUFFIX_LEN)
                .map(|byte| char::from(b'A' + (byte % 26))),
        );
        Self { name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Builds the commands of the container runtime client. Only the argument
/// forms of the docker CLI are used, so podman and other compatible clients
/// work too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    program: String,
}

impl Client {
    /// `program` is split by whitespace like in [Command::new]
    pub fn new(program: impl AsRef<str>) -> Self {
        Self {
            program: program.as_ref().to_owned(),
        }
    }

    fn command(&self) -> Command {
        Command::new(&self.program)
    }

    /// `run -dit` with `/bin/bash` overriding the image entrypoint, so that the
    /// container idles until commands are executed in it
    pub fn run_detached(
        &self,
        container: &ContainerHandle,
        image: &str,
        inputs: &Path,
        outputs: &Path,
        volumes: &[String],
    ) -> Command {
        let mut command = self
            .command()
            .args(["run", "-dit", "-v"])
            .arg(format!("{}:{CONTAINER_INPUT_PATH}", path_arg(inputs)))
            .arg("-v")
            .arg(format!("{}:{CONTAINER_OUTPUT_PATH}", path_arg(outputs)));
        for volume in volumes {
            command = command.arg("-v").arg(volume);
        }
        command
            .arg(format!("--entrypoint={CONTAINER_SHELL}"))
            .arg(format!("--name={container}"))
            .arg(image)
    }

    /// Copies a local file or directory to `container_path`
    pub fn copy_into(
        &self,
        container: &ContainerHandle,
        local: &Path,
        container_path: &str,
    ) -> Command {
        self.command()
            .arg("cp")
            .arg(path_arg(local))
            .arg(format!("{container}:{container_path}"))
    }

    pub fn exec<I, S>(&self, container: &ContainerHandle, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.command()
            .arg("exec")
            .arg(container.name())
            .args(args.into_iter().map(|s| s.as_ref().to_owned()))
    }

    /// Rewrites `SDK_PACKAGE` to its local variant in the entrypoint script,
    /// keeping a ".bak" of the original
    pub fn patch_entrypoint(&self, container: &ContainerHandle, entrypoint: &str) -> Command {
        let sed = format!(r"sed -i.bak 's/\<{SDK_PACKAGE}\>/&.local/' {entrypoint}");
        self.exec(container, [CONTAINER_SHELL, "-c", sed.as_str()])
    }

    pub fn stop(&self, container: &ContainerHandle) -> Command {
        self.command().arg("stop").arg(container.name())
    }

    pub fn remove(&self, container: &ContainerHandle) -> Command {
        self.command().arg("rm").arg(container.name())
    }

    /// Attaching hands over the terminal
    pub fn attach(&self, container: &ContainerHandle) -> Command {
        self.command()
            .arg("attach")
            .arg(container.name())
            .inherit_stdio(true)
    }
}
