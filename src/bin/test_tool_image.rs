use std::{io, path::PathBuf};

use clap::Parser;
use stacked_errors::{Result, StackableErr};
use tool_tester::{
    run_session, OsRunner, Prompter, SessionEnd, TestConfig, DEFAULT_CLIENT, DEFAULT_ENTRYPOINT,
    DEFAULT_TOOL,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Local execution of a tool image test
///
/// e.x. `test_tool_image image:tag inputs/ outputs/ --settings settings.json
/// --values values.json --tool package.tool -v /host/path:/container/path`
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// The name of the tool image (name:tag)
    image: String,
    /// A folder which will be used as input container
    inputs: PathBuf,
    /// A folder which will be used as output container
    outputs: PathBuf,
    /// Mount a directory inside the container, can be repeated
    #[arg(short = 'v', value_name = "VOLUME")]
    volumes: Vec<String>,
    /// The settings.json file
    #[arg(long)]
    settings: Option<PathBuf>,
    /// The values for the settings file
    #[arg(long)]
    values: Option<PathBuf>,
    /// The python module with the run method
    #[arg(long, default_value = DEFAULT_TOOL)]
    tool: String,
    /// The path of the entrypoint script inside the tool image
    #[arg(long, default_value = DEFAULT_ENTRYPOINT)]
    entrypoint: String,
    /// Skip user interaction, stopping and removing the container at the end
    #[arg(long, default_value_t = false)]
    no_interactive: bool,
    #[arg(long, hide = true)]
    resources: Option<PathBuf>,
    /// The container runtime client
    #[arg(long, env = "TOOL_TESTER_CLIENT", default_value = DEFAULT_CLIENT)]
    client: String,
    /// Where the generic settings files are written when not supplied
    #[arg(long, default_value = ".")]
    generated_dir: PathBuf,
}

impl Args {
    fn into_config(self) -> TestConfig {
        let mut config = TestConfig::new(self.image, self.inputs, self.outputs)
            .settings(self.settings)
            .values(self.values)
            .tool(self.tool)
            .entrypoint(self.entrypoint)
            .resources(self.resources)
            .client(self.client)
            .generated_dir(self.generated_dir);
        for volume in self.volumes {
            config = config.volume(volume);
        }
        config
    }
}

async fn session(args: Args) -> Result<SessionEnd> {
    let non_interactive = args.no_interactive;
    let config = args.into_config();
    let mut prompter = Prompter::new(io::stdin().lock(), io::stdout(), non_interactive);
    run_session(&config, &mut OsRunner, &mut prompter)
        .await
        .stack()
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let code = match session(Args::parse()).await {
        Ok(end) => end.exit_code(),
        Err(e) => {
            error!("{e:?}");
            1
        }
    };
    std::process::exit(code)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn arguments() {
        Args::command().debug_assert();
        let args = Args::try_parse_from([
            "test_tool_image",
            "tool:1.0",
            "in",
            "out",
            "-v",
            "/a:/b",
            "-v",
            "/c:/d",
            "--no-interactive",
        ])
        .unwrap();
        assert!(args.no_interactive);
        let config = args.into_config();
        assert_eq!(config.volumes, ["/a:/b", "/c:/d"]);
        assert_eq!(config.tool, DEFAULT_TOOL);
        assert_eq!(config.entrypoint, DEFAULT_ENTRYPOINT);
    }

    #[tokio::test]
    async fn internal_errors_are_returned() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("in")).unwrap();
        std::fs::create_dir(dir.path().join("out")).unwrap();
        let path = |name: &str| dir.path().join(name).to_string_lossy().into_owned();
        // the `input` subfolder is missing, so generating the values fails
        let args = Args::try_parse_from([
            "test_tool_image".to_owned(),
            "tool:1.0".to_owned(),
            path("in"),
            path("out"),
            "--no-interactive".to_owned(),
            "--generated-dir".to_owned(),
            path(""),
        ])
        .unwrap();
        assert!(session(args).await.is_err());
    }
}
