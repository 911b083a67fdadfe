//! Generic settings documents for when the caller does not provide them

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stacked_errors::{Result, StackableErr};
use tokio::fs;
use tracing::info;

use crate::{acquire_file_path, TestConfig};

pub const GENERATED_SETTINGS_FILE: &str = "generic_settings.json";
pub const GENERATED_VALUES_FILE: &str = "generic_values.json";
/// Subfolder of the input folder whose files are listed in generated values
pub const INPUT_SUBFOLDER: &str = "input";

/// One input group descriptor of a settings document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputGroup {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub id: String,
    pub mandatory: u8,
    pub batch: u8,
    pub file_filter: String,
    pub in_filter: Vec<String>,
    pub out_filter: Vec<String>,
    pub anchor: u8,
}

impl InputGroup {
    /// The mandatory, batch enabled container that the generated values refer
    /// to
    pub fn example_container() -> Self {
        Self {
            kind: "container".to_owned(),
            title: "Example Container".to_owned(),
            id: INPUT_SUBFOLDER.to_owned(),
            mandatory: 1,
            batch: 1,
            file_filter: "c_files[1,*]<'', [], '.*'>".to_owned(),
            in_filter: vec!["mri_brain_data".to_owned()],
            out_filter: vec![],
            anchor: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFile {
    pub path: String,
}

/// The values document, keyed by the id of the input group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsValues {
    pub input: Vec<InputFile>,
}

/// The settings documents that get copied into the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDocuments {
    pub settings: PathBuf,
    pub values: PathBuf,
}

/// Writes the generic settings document into `generated_dir`
pub async fn write_default_settings(generated_dir: &Path) -> Result<PathBuf> {
    let path = generated_dir.join(GENERATED_SETTINGS_FILE);
    let contents = serde_json::to_string_pretty(&[InputGroup::example_container()]).stack()?;
    fs::write(&path, contents)
        .await
        .stack_err_with(|| format!("write_default_settings -> could not write {path:?}"))?;
    Ok(path)
}

/// Lists the names of the non-directory entries directly in the input
/// subfolder of `inputs`, sorted
pub async fn list_input_files(inputs: &Path) -> Result<Vec<String>> {
    let input_dir = inputs.join(INPUT_SUBFOLDER);
    let mut entries = fs::read_dir(&input_dir)
        .await
        .stack_err_with(|| format!("list_input_files -> could not read {input_dir:?}"))?;
    let mut names = vec![];
    while let Some(entry) = entries.next_entry().await.stack()? {
        // follows symlinks, broken links count as files
        let is_dir = fs::metadata(entry.path())
            .await
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false);
        if !is_dir {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Writes a values document listing every input file into `generated_dir`
pub async fn write_default_values(inputs: &Path, generated_dir: &Path) -> Result<PathBuf> {
    let values = SettingsValues {
        input: list_input_files(inputs)
            .await
            .stack_err("write_default_values")?
            .into_iter()
            .map(|path| InputFile { path })
            .collect(),
    };
    let path = generated_dir.join(GENERATED_VALUES_FILE);
    let contents = serde_json::to_string_pretty(&values).stack()?;
    fs::write(&path, contents)
        .await
        .stack_err_with(|| format!("write_default_values -> could not write {path:?}"))?;
    Ok(path)
}

/// Uses the documents from `config` when given, generating the missing ones.
/// `inputs` should be the validated input folder.
pub async fn resolve_documents(config: &TestConfig, inputs: &Path) -> Result<ResolvedDocuments> {
    let settings = match &config.settings {
        Some(settings) => settings.clone(),
        None => {
            let path = write_default_settings(&config.generated_dir).await?;
            info!("Using generated settings {path:?}");
            path
        }
    };
    let values = match &config.values {
        Some(values) => values.clone(),
        None => {
            let path = write_default_values(inputs, &config.generated_dir).await?;
            info!("Using generated settings values {path:?}");
            path
        }
    };
    Ok(ResolvedDocuments {
        settings: acquire_file_path(settings)
            .await
            .stack_err("resolve_documents -> settings")?,
        values: acquire_file_path(values)
            .await
            .stack_err("resolve_documents -> settings values")?,
    })
}

#[cfg(test)]
mod tests {
    use std::fs as std_fs;

    use super::*;

    #[tokio::test]
    async fn generated_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_default_settings(dir.path()).await.unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std_fs::read_to_string(&path).unwrap()).unwrap();
        let groups = raw.as_array().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0]["type"], "container");
        assert_eq!(groups[0]["mandatory"], 1);
        assert_eq!(groups[0]["batch"], 1);
        assert_eq!(groups[0]["anchor"], 1);
        assert_eq!(groups[0]["in_filter"][0], "mri_brain_data");
    }

    #[tokio::test]
    async fn generated_values_skip_directories() {
        let inputs = tempfile::tempdir().unwrap();
        let input_dir = inputs.path().join(INPUT_SUBFOLDER);
        std_fs::create_dir(&input_dir).unwrap();
        std_fs::write(input_dir.join("b.nii"), "").unwrap();
        std_fs::write(input_dir.join("a.nii"), "").unwrap();
        std_fs::create_dir(input_dir.join("nested")).unwrap();
        std_fs::write(input_dir.join("nested").join("deep.nii"), "").unwrap();

        let out = tempfile::tempdir().unwrap();
        let path = write_default_values(inputs.path(), out.path()).await.unwrap();
        let values: SettingsValues =
            serde_json::from_str(&std_fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(values.input, vec![
            InputFile {
                path: "a.nii".to_owned()
            },
            InputFile {
                path: "b.nii".to_owned()
            },
        ]);
    }

    #[tokio::test]
    async fn missing_input_subfolder() {
        let inputs = tempfile::tempdir().unwrap();
        assert!(list_input_files(inputs.path()).await.is_err());
    }

    #[tokio::test]
    async fn supplied_documents_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("s.json");
        let values = dir.path().join("v.json");
        std_fs::write(&settings, "[]").unwrap();
        std_fs::write(&values, "{}").unwrap();
        let config = TestConfig::new("img", dir.path(), dir.path())
            .settings(Some(settings))
            .values(Some(values))
            .generated_dir(dir.path());
        let documents = resolve_documents(&config, dir.path()).await.unwrap();
        assert!(documents.settings.ends_with("s.json"));
        assert!(documents.values.ends_with("v.json"));
        assert!(!dir.path().join(GENERATED_SETTINGS_FILE).exists());
    }
}
