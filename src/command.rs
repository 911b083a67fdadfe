use core::fmt;
use std::{
    borrow::Cow,
    ffi::{OsStr, OsString},
    fmt::{Debug, Display},
    process::Stdio,
    sync::Arc,
};

use owo_colors::OwoColorize;
use stacked_errors::{bail_locationless, Result, StackableErr};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader},
    process,
    sync::Mutex,
    task::{self, JoinHandle},
};
use tracing::info;

use crate::next_terminal_color;

/// An OS Command, this is `tokio::process::Command` wrapped with the little
/// bit of helping functionality needed for driving a container runtime client.
#[derive(Clone, Default)]
pub struct Command {
    /// The program to run.
    pub program: OsString,
    /// All the arguments that will be passed to the program
    pub args: Vec<OsString>,
    /// If set, the unified command line is logged before the program starts
    pub echo: bool,
    /// Forward the combined stdout and stderr of the program to the stdout of
    /// this process while it is being recorded
    pub debug: bool,
    /// Hands the terminal to the program. The standard streams are inherited
    /// and nothing is recorded.
    pub inherit_stdio: bool,
}

impl Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "Command {{ program: {:?},",
            self.get_unified_command()
        ))?;
        if self.echo {
            f.write_str(" echo: true,")?;
        }
        if self.debug {
            f.write_str(" debug: true,")?;
        }
        if self.inherit_stdio {
            f.write_str(" inherit_stdio: true,")?;
        }
        f.write_str(" }")
    }
}

impl Command {
    /// Creates a `Command` that only sets the `program` and `args` and leaves
    /// other things as their default values. `program_with_args` is separated
    /// by whitespace, the first part becomes the progam, and the the others
    /// are inserted as args.
    ///
    /// In case an argument has spaces, it should be added with [Command::arg]
    /// as an unbroken `&str`.
    pub fn new(program_with_args: impl AsRef<str>) -> Self {
        let mut parts = program_with_args.as_ref().split_whitespace();
        let program = parts.next().unwrap_or_default();
        Self {
            program: program.into(),
            args: parts.map(OsString::from).collect(),
            ..Default::default()
        }
    }

    /// Adds an argument
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().into());
        self
    }

    /// Adds arguments to be passed to the program
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(args.into_iter().map(|s| s.as_ref().into()));
        self
    }

    /// Sets `echo`
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Sets `debug`
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets `inherit_stdio`
    pub fn inherit_stdio(mut self, inherit_stdio: bool) -> Self {
        self.inherit_stdio = inherit_stdio;
        self
    }

    /// Gets the program and args interspersed with spaces
    pub fn get_unified_command(&self) -> String {
        let mut command = self.program.to_string_lossy().into_owned();
        for arg in &self.args {
            command.push(' ');
            command.push_str(&arg.to_string_lossy());
        }
        command
    }

    /// Runs the command and waits for it to exit. The returned error is only
    /// for failures to spawn or wait on the process, the exit code has to be
    /// checked on the `CommandResult`.
    pub async fn run_to_completion(self) -> Result<CommandResult> {
        if self.echo {
            info!("{}", self.get_unified_command());
        }
        let mut cmd = process::Command::new(&self.program);
        cmd.args(&self.args).kill_on_drop(true);
        if self.inherit_stdio {
            let status = cmd
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .await
                .stack_err_with_locationless(|| {
                    format!("{self:?}.run_to_completion() -> failed to run child process")
                })?;
            return Ok(CommandResult {
                command: self,
                exit_code: status.code(),
                output: vec![],
            })
        }
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .stack_err_with_locationless(|| {
                format!("{self:?}.run_to_completion() -> failed to spawn child process")
            })?;
        let prefix = if self.debug {
            let program_name = self.program.to_string_lossy();
            let child_id = child.id().unwrap_or_default();
            Some(
                format!("{program_name} {child_id} | ")
                    .color(next_terminal_color())
                    .to_string(),
            )
        } else {
            None
        };
        // stdout and stderr go into the same record in the order lines arrive
        let record = Arc::new(Mutex::new(Vec::<u8>::new()));
        let mut handles: Vec<JoinHandle<Result<()>>> = vec![];
        if let Some(stdout) = child.stdout.take() {
            handles.push(task::spawn(recorder(
                BufReader::new(stdout),
                Arc::clone(&record),
                prefix.clone(),
            )));
        }
        if let Some(stderr) = child.stderr.take() {
            handles.push(task::spawn(recorder(
                BufReader::new(stderr),
                Arc::clone(&record),
                prefix,
            )));
        }
        let status = child.wait().await.stack_err_with_locationless(|| {
            format!("{self:?}.run_to_completion() -> failed to wait on child process")
        })?;
        for handle in handles {
            handle
                .await
                .stack_err_locationless("Command::run_to_completion -> recorder task panicked")?
                .stack_err_locationless("Command::run_to_completion -> recorder failed")?;
        }
        let output = record.lock().await.clone();
        Ok(CommandResult {
            command: self,
            exit_code: status.code(),
            output,
        })
    }
}

/// Copies lines from `reader` into `record`, and to stdout when a `prefix` is
/// set
async fn recorder<R: AsyncRead + Unpin>(
    reader: BufReader<R>,
    record: Arc<Mutex<Vec<u8>>>,
    prefix: Option<String>,
) -> Result<()> {
    let mut lines = reader.split(b'\n');
    let mut stdout = tokio::io::stdout();
    while let Some(mut line) = lines.next_segment().await.stack()? {
        line.push(b'\n');
        record.lock().await.extend_from_slice(&line);
        if let Some(prefix) = &prefix {
            // one write per line so that the two streams do not tear lines
            let mut forwarded = prefix.as_bytes().to_vec();
            forwarded.extend_from_slice(&line);
            stdout.write_all(&forwarded).await.stack()?;
            stdout.flush().await.stack()?;
        }
    }
    Ok(())
}

#[must_use]
#[derive(Clone)]
pub struct CommandResult {
    // this information is kept around for failures
    pub command: Command,
    /// `None` if the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// The combined stdout and stderr
    pub output: Vec<u8>,
}

impl Debug for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandResult")
            .field("command", &self.command)
            .field("exit_code", &self.exit_code)
            .field("output", &self.output_as_utf8_lossy())
            .finish()
    }
}

impl Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:#?}", self))
    }
}

impl CommandResult {
    /// Returns if the command exited with a zero exit code
    pub fn successful(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Returns a formatted error with relevant information if the command was
    /// not successful
    pub fn assert_success(&self) -> Result<()> {
        match self.exit_code {
            Some(0) => Ok(()),
            Some(_) => bail_locationless!("{self:#?}.assert_success() -> unsuccessful"),
            None => bail_locationless!(
                "{self:#?}.assert_success() -> terminated by a signal before completion"
            ),
        }
    }

    /// Returns `String::from_utf8_lossy(&self.output)`
    pub fn output_as_utf8_lossy(&self) -> Cow<str> {
        String::from_utf8_lossy(&self.output)
    }
}
