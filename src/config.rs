use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Cap on captured process output when `max_buffer_size` is absent or invalid.
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 1_000_000;

/// A source of named, string-typed step inputs.
pub trait InputSource {
    /// Returns the raw value of the named input, if one was supplied.
    fn input(&self, name: &str) -> Option<String>;
}

impl InputSource for HashMap<String, String> {
    fn input(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl InputSource for HashMap<&str, &str> {
    fn input(&self, name: &str) -> Option<String> {
        self.get(name).map(|value| (*value).to_string())
    }
}

/// Configuration for a single diff invocation, resolved once up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffConfig {
    pub base_branch: String,
    pub search_path: String,
    pub max_buffer_size: usize,
    pub file_output_only: bool,
    pub git_options: Vec<String>,
    pub raw_diff_file_output: Option<PathBuf>,
    pub json_diff_file_output: Option<PathBuf>,
}

impl DiffConfig {
    /// Creates a configuration with the required inputs and defaults for everything else.
    #[must_use]
    pub fn new(base_branch: impl Into<String>, search_path: impl Into<String>) -> Self {
        Self {
            base_branch: base_branch.into(),
            search_path: search_path.into(),
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            file_output_only: false,
            git_options: Vec::new(),
            raw_diff_file_output: None,
            json_diff_file_output: None,
        }
    }

    /// Reads every recognised input from `source` and coerces it.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_branch` or `search_path` is missing, or if
    /// `git_options` cannot be split into arguments.
    pub fn from_inputs(source: &impl InputSource) -> Result<Self> {
        let read = |name: &str| {
            source
                .input(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let base_branch = read("base_branch").ok_or(Error::MissingInput("base_branch"))?;
        debug!(base_branch = %base_branch, "base_branch");
        let search_path = read("search_path").ok_or(Error::MissingInput("search_path"))?;
        debug!(search_path = %search_path, "search_path");

        let max_buffer_size = parse_max_buffer_size(read("max_buffer_size").as_deref());
        debug!(max_buffer_size, "max_buffer_size");

        let file_output_only = read("file_output_only").as_deref() == Some("true");
        let git_options = parse_git_options(read("git_options").as_deref().unwrap_or_default())?;

        Ok(Self {
            base_branch,
            search_path,
            max_buffer_size,
            file_output_only,
            git_options,
            raw_diff_file_output: read("raw_diff_file_output").map(PathBuf::from),
            json_diff_file_output: read("json_diff_file_output").map(PathBuf::from),
        })
    }

    /// Argument vector handed to `git`, in invocation order.
    #[must_use]
    pub fn diff_args(&self) -> Vec<&str> {
        let mut args = Vec::with_capacity(self.git_options.len() + 4);
        args.extend(["--no-pager", "diff"]);
        args.extend(self.git_options.iter().map(String::as_str));
        args.push(&self.base_branch);
        args.push(&self.search_path);
        args
    }
}

/// Coerces the `max_buffer_size` input, falling back to the default for
/// anything that is not a positive integer.
#[must_use]
pub fn parse_max_buffer_size(value: Option<&str>) -> usize {
    match value.and_then(|v| v.trim().parse::<usize>().ok()) {
        Some(size) if size > 0 => size,
        _ => {
            info!("max_buffer_size is not defined, using default of {DEFAULT_MAX_BUFFER_SIZE}");
            DEFAULT_MAX_BUFFER_SIZE
        }
    }
}

fn parse_git_options(value: &str) -> Result<Vec<String>> {
    shell_words::split(value).map_err(|e| Error::InvalidInput {
        name: "git_options",
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(pairs: &[(&'static str, &'static str)]) -> HashMap<&'static str, &'static str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_defaults_for_optional_inputs() {
        let config =
            DiffConfig::from_inputs(&inputs(&[("base_branch", "main"), ("search_path", ".")]))
                .expect("config should resolve");

        assert_eq!(config, DiffConfig::new("main", "."));
    }

    #[test]
    fn test_missing_required_inputs() {
        let err = DiffConfig::from_inputs(&inputs(&[("search_path", ".")])).unwrap_err();
        assert!(matches!(err, Error::MissingInput("base_branch")));

        let err =
            DiffConfig::from_inputs(&inputs(&[("base_branch", "main"), ("search_path", "  ")]))
                .unwrap_err();
        assert!(matches!(err, Error::MissingInput("search_path")));
    }

    #[test]
    fn test_max_buffer_size_falls_back_to_default() {
        let cases = [
            None,
            Some(""),
            Some("abc"),
            Some("-5"),
            Some("0"),
            Some("1.5e3"),
            Some("12abc"),
        ];
        for value in cases {
            assert_eq!(parse_max_buffer_size(value), DEFAULT_MAX_BUFFER_SIZE, "{value:?}");
        }
    }

    #[test]
    fn test_max_buffer_size_uses_valid_integers() {
        for size in [1_usize, 512, 1_000_000, 50_000_000] {
            assert_eq!(parse_max_buffer_size(Some(size.to_string().as_str())), size);
        }
        assert_eq!(parse_max_buffer_size(Some(" 2048 ")), 2048);
    }

    #[test]
    fn test_file_output_only_requires_literal_true() {
        let cases = [("true", true), ("True", false), ("yes", false), ("false", false)];
        for (value, expected) in cases {
            let config = DiffConfig::from_inputs(&inputs(&[
                ("base_branch", "main"),
                ("search_path", "."),
                ("file_output_only", value),
            ]))
            .expect("config should resolve");
            assert_eq!(config.file_output_only, expected, "{value}");
        }
    }

    #[test]
    fn test_diff_args_keep_inputs_as_single_arguments() {
        let config = DiffConfig::from_inputs(&inputs(&[
            ("base_branch", "origin/main; rm -rf /"),
            ("search_path", "src dir"),
            ("git_options", "--diff-filter=M --unified='5'"),
            ("raw_diff_file_output", "diff.txt"),
        ]))
        .expect("config should resolve");

        assert_eq!(
            config.diff_args(),
            vec![
                "--no-pager",
                "diff",
                "--diff-filter=M",
                "--unified=5",
                "origin/main; rm -rf /",
                "src dir",
            ]
        );
        assert_eq!(config.raw_diff_file_output, Some(PathBuf::from("diff.txt")));
        assert_eq!(config.json_diff_file_output, None);
    }

    #[test]
    fn test_unbalanced_git_options_are_rejected() {
        let err = DiffConfig::from_inputs(&inputs(&[
            ("base_branch", "main"),
            ("search_path", "."),
            ("git_options", "--stat \"oops"),
        ]))
        .unwrap_err();

        assert!(matches!(err, Error::InvalidInput { name: "git_options", .. }));
    }
}
