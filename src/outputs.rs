use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, instrument};

use crate::error::{Error, Result};

pub const RAW_DIFF: &str = "raw-diff";
pub const RAW_DIFF_PATH: &str = "raw-diff-path";
pub const JSON_DIFF: &str = "json-diff";
pub const JSON_DIFF_PATH: &str = "json-diff-path";

/// Sink for named step outputs.
pub trait ActionOutputs {
    /// Publish `value` under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be recorded.
    fn set_output(&mut self, name: &str, value: &str) -> Result<()>;
}

/// Outputs for a GitHub Actions runner.
///
/// Appends to the file named by `GITHUB_OUTPUT` when the runner provides one,
/// and falls back to the `::set-output` workflow command otherwise.
#[derive(Debug, Default)]
pub struct GithubOutputs {
    output_file: Option<PathBuf>,
}

impl GithubOutputs {
    #[must_use]
    pub const fn new(output_file: Option<PathBuf>) -> Self {
        Self { output_file }
    }

    /// Reads the output file location from the `GITHUB_OUTPUT` environment variable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(
            std::env::var_os("GITHUB_OUTPUT")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        )
    }
}

impl ActionOutputs for GithubOutputs {
    #[instrument(skip(self, value), fields(value_length = value.len()))]
    fn set_output(&mut self, name: &str, value: &str) -> Result<()> {
        let Some(path) = &self.output_file else {
            println!("::set-output name={name}::{}", escape_data(value));
            return Ok(());
        };

        let entry = file_command_entry(name, value, &uuid::Uuid::new_v4().to_string())?;
        let mut file = OpenOptions::new().append(true).create(true).open(path)?;
        file.write_all(entry.as_bytes())?;

        debug!(output_file = %path.display(), "Output written");
        Ok(())
    }
}

/// Outputs collected in memory, for embedding the action in another program.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryOutputs {
    values: BTreeMap<String, String>,
}

impl MemoryOutputs {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl ActionOutputs for MemoryOutputs {
    fn set_output(&mut self, name: &str, value: &str) -> Result<()> {
        self.values.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

/// Marks the step as failed by emitting an `::error::` workflow command.
///
/// The caller is responsible for exiting with a non-zero status.
pub fn set_failed(message: &str) {
    println!("::error::{}", escape_data(message));
}

/// Heredoc-style entry for a runner file command.
fn file_command_entry(name: &str, value: &str, uuid: &str) -> Result<String> {
    let delimiter = format!("ghadelimiter_{uuid}");
    if name.contains(&delimiter) || value.contains(&delimiter) {
        return Err(Error::OutputError {
            name: name.to_string(),
            reason: format!("value must not contain the delimiter \"{delimiter}\""),
        });
    }
    Ok(format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"))
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
