use std::io::{BufRead, Write};

use stacked_errors::{Result, StackableErr};

use crate::{orchestrate::step, Client, ContainerHandle, ProcessRunner, Prompter};

pub const STOP_QUESTION: &str = "Do you want to stop the container?";
pub const REMOVE_QUESTION: &str = "Do you want to delete the container?";
pub const ATTACH_QUESTION: &str = "Do you want to attach to the container?";

/// Where the post run questioning is at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownState {
    AskStop,
    /// The container has been stopped
    AskRemove,
    /// The container is still running
    AskAttach,
    Done,
}

impl TeardownState {
    pub fn question(self) -> Option<&'static str> {
        match self {
            TeardownState::AskStop => Some(STOP_QUESTION),
            TeardownState::AskRemove => Some(REMOVE_QUESTION),
            TeardownState::AskAttach => Some(ATTACH_QUESTION),
            TeardownState::Done => None,
        }
    }

    /// The state after answering the question of `self`
    pub fn next(self, yes: bool) -> Self {
        match (self, yes) {
            (TeardownState::AskStop, true) => TeardownState::AskRemove,
            (TeardownState::AskStop, false) => TeardownState::AskAttach,
            _ => TeardownState::Done,
        }
    }
}

/// What was done to the container
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TeardownOutcome {
    pub stopped: bool,
    pub removed: bool,
    pub attached: bool,
}

/// Asks whether to stop and then remove the container, or to attach to it if
/// it is left running. With a non-interactive prompter the container is
/// stopped and removed.
pub async fn teardown<R: ProcessRunner, I: BufRead, O: Write>(
    runner: &mut R,
    client: &Client,
    container: &ContainerHandle,
    prompter: &mut Prompter<I, O>,
) -> Result<TeardownOutcome> {
    let mut outcome = TeardownOutcome::default();
    let mut state = TeardownState::AskStop;
    while let Some(question) = state.question() {
        let yes = prompter.confirm(question).stack_err("teardown")?;
        if yes {
            match state {
                TeardownState::AskStop => {
                    step(runner, client.stop(container).echo(true).debug(true)).await;
                    outcome.stopped = true;
                }
                TeardownState::AskRemove => {
                    step(runner, client.remove(container).echo(true).debug(true)).await;
                    outcome.removed = true;
                }
                TeardownState::AskAttach => {
                    step(runner, client.attach(container).echo(true)).await;
                    outcome.attached = true;
                }
                TeardownState::Done => (),
            }
        }
        state = state.next(yes);
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::{Command, CommandResult};

    #[derive(Default)]
    struct Recorder {
        commands: Vec<String>,
    }

    impl ProcessRunner for Recorder {
        async fn run(&mut self, command: Command) -> Result<CommandResult> {
            self.commands.push(command.get_unified_command());
            Ok(CommandResult {
                command,
                exit_code: Some(0),
                output: vec![],
            })
        }
    }

    #[test]
    fn transitions() {
        use TeardownState::*;
        assert_eq!(AskStop.next(true), AskRemove);
        assert_eq!(AskStop.next(false), AskAttach);
        for state in [AskRemove, AskAttach] {
            assert_eq!(state.next(true), Done);
            assert_eq!(state.next(false), Done);
        }
        assert_eq!(Done.question(), None);
    }

    async fn run(answers: &str, non_interactive: bool) -> (TeardownOutcome, Vec<String>, String) {
        let mut runner = Recorder::default();
        let mut prompter =
            Prompter::new(Cursor::new(answers.to_owned()), Vec::<u8>::new(), non_interactive);
        let container = ContainerHandle::from_uuid(uuid::Uuid::nil());
        let outcome = teardown(&mut runner, &Client::new("docker"), &container, &mut prompter)
            .await
            .unwrap();
        let asked = String::from_utf8(prompter.into_output()).unwrap();
        (outcome, runner.commands, asked)
    }

    #[tokio::test]
    async fn stop_and_remove() {
        let (outcome, commands, asked) = run("y\nyes\n", false).await;
        assert_eq!(outcome, TeardownOutcome {
            stopped: true,
            removed: true,
            attached: false
        });
        assert_eq!(commands, [
            "docker stop local_test_AAAAA",
            "docker rm local_test_AAAAA"
        ]);
        assert!(!asked.contains(ATTACH_QUESTION));
    }

    #[tokio::test]
    async fn stop_and_keep() {
        let (outcome, commands, _) = run("Y\nN\n", false).await;
        assert!(outcome.stopped && !outcome.removed);
        assert_eq!(commands, ["docker stop local_test_AAAAA"]);
    }

    #[tokio::test]
    async fn keep_running_and_attach() {
        let (outcome, commands, asked) = run("sure\nn\ny\n", false).await;
        assert_eq!(outcome, TeardownOutcome {
            stopped: false,
            removed: false,
            attached: true
        });
        assert_eq!(commands, ["docker attach local_test_AAAAA"]);
        assert_eq!(asked.matches(STOP_QUESTION).count(), 2);
        assert!(!asked.contains(REMOVE_QUESTION));
    }

    #[tokio::test]
    async fn non_interactive_stops_and_removes() {
        let (outcome, commands, asked) = run("", true).await;
        assert!(outcome.stopped && outcome.removed && !outcome.attached);
        assert_eq!(commands.len(), 2);
        assert!(asked.is_empty());
    }
}
