use std::path::{Path, PathBuf};

/// Entrypoint script inside tool images
pub const DEFAULT_ENTRYPOINT: &str = "/root/entrypoint.sh";
/// Module whose `run` routine the entrypoint invokes
pub const DEFAULT_TOOL: &str = "tool";
/// Container runtime client program
pub const DEFAULT_CLIENT: &str = "docker";

/// Everything a local test session needs, resolved from the command line.
/// This is passed around explicitly, nothing reads process globals. Whether
/// questions are asked is up to the `Prompter` of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestConfig {
    /// The tool image in the format "name:tag"
    pub image: String,
    /// Host directory mounted as the input container
    pub inputs: PathBuf,
    /// Host directory mounted as the output container
    pub outputs: PathBuf,
    /// Extra volume specifications passed verbatim as `-v` arguments
    pub volumes: Vec<String>,
    /// Settings document, generated if `None`
    pub settings: Option<PathBuf>,
    /// Settings values document, generated if `None`
    pub values: Option<PathBuf>,
    pub tool: String,
    pub entrypoint: String,
    /// Resources directory copied into the container
    pub resources: Option<PathBuf>,
    /// The container runtime client, may include prefixed arguments such as
    /// "sudo docker"
    pub client: String,
    /// Where generated settings documents are written
    pub generated_dir: PathBuf,
}

impl TestConfig {
    /// Creates a config with the defaults for everything but the required
    /// arguments
    pub fn new(
        image: impl AsRef<str>,
        inputs: impl AsRef<Path>,
        outputs: impl AsRef<Path>,
    ) -> Self {
        Self {
            image: image.as_ref().to_owned(),
            inputs: inputs.as_ref().to_owned(),
            outputs: outputs.as_ref().to_owned(),
            volumes: vec![],
            settings: None,
            values: None,
            tool: DEFAULT_TOOL.to_owned(),
            entrypoint: DEFAULT_ENTRYPOINT.to_owned(),
            resources: None,
            client: DEFAULT_CLIENT.to_owned(),
            generated_dir: PathBuf::from("."),
        }
    }

    /// Adds an extra volume specification
    pub fn volume(mut self, volume: impl AsRef<str>) -> Self {
        self.volumes.push(volume.as_ref().to_owned());
        self
    }

    pub fn settings(mut self, settings: Option<PathBuf>) -> Self {
        self.settings = settings;
        self
    }

    pub fn values(mut self, values: Option<PathBuf>) -> Self {
        self.values = values;
        self
    }

    pub fn tool(mut self, tool: impl AsRef<str>) -> Self {
        self.tool = tool.as_ref().to_owned();
        self
    }

    pub fn entrypoint(mut self, entrypoint: impl AsRef<str>) -> Self {
        self.entrypoint = entrypoint.as_ref().to_owned();
        self
    }

    pub fn resources(mut self, resources: Option<PathBuf>) -> Self {
        self.resources = resources;
        self
    }

    pub fn client(mut self, client: impl AsRef<str>) -> Self {
        self.client = client.as_ref().to_owned();
        self
    }

    pub fn generated_dir(mut self, generated_dir: impl AsRef<Path>) -> Self {
        self.generated_dir = generated_dir.as_ref().to_owned();
        self
    }
}
