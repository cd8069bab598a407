use crate::config::DiffConfig;
use crate::diff::{count_raw_files, parse_diff, GitDiff};
use crate::error::{Error, Result};
use crate::git::{Git, GitCli};
use crate::outputs::{ActionOutputs, JSON_DIFF, JSON_DIFF_PATH, RAW_DIFF, RAW_DIFF_PATH};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct DiffOutcome {
    /// Unparsed `git diff` output.
    pub raw: String,
    /// Parsed form of `raw`.
    pub diff: GitDiff,
    /// Occurrences of `diff --git` in `raw`. May overcount.
    pub raw_files_changed: usize,
    /// Number of entries in `diff.files`.
    pub json_files_changed: usize,
}

/// Runs `git diff`, parses the result and routes it to outputs and files.
pub struct GitDiffAction<G = GitCli> {
    git: G,
    config: DiffConfig,
}

impl GitDiffAction<GitCli> {
    /// Create an action running git inside a local repository
    #[instrument(skip(config))]
    pub fn new_from_local(repo_path: &Path, config: DiffConfig) -> Self {
        debug!(repo_path = %repo_path.display(), "Creating action for local repository");
        Self::with_git(GitCli::new(repo_path.to_path_buf()), config)
    }
}

impl<G: Git> GitDiffAction<G> {
    /// Create an action on top of any [`Git`] implementation
    pub const fn with_git(git: G, config: DiffConfig) -> Self {
        Self { git, config }
    }

    /// Runs the diff and publishes its results.
    ///
    /// Direct `raw-diff` / `json-diff` outputs are skipped when
    /// `file_output_only` is set; configured files are always written and
    /// their paths always reported.
    ///
    /// # Errors
    ///
    /// Returns an error if git fails, writes anything to stderr, exceeds the
    /// output buffer, or if an output or file cannot be written. Nothing is
    /// published when git fails.
    #[instrument(
        skip(self, outputs),
        fields(base_branch = %self.config.base_branch, search_path = %self.config.search_path)
    )]
    pub async fn run(&self, outputs: &mut impl ActionOutputs) -> Result<DiffOutcome> {
        let config = &self.config;

        let output = self
            .git
            .run_git_command(&config.diff_args(), config.max_buffer_size)
            .await?;
        if !output.stderr.is_empty() {
            return Err(Error::GitStderr(output.stderr));
        }
        let raw = output.stdout;

        let raw_files_changed = count_raw_files(&raw);
        info!("total files changed (raw diff): {raw_files_changed}");
        debug!("raw git diff: {raw}");

        if !config.file_output_only {
            outputs.set_output(RAW_DIFF, &raw)?;
        }
        if let Some(path) = &config.raw_diff_file_output {
            debug!("writing raw diff to {}", path.display());
            write_output_file(path, &raw)?;
            outputs.set_output(RAW_DIFF_PATH, &path_value(path))?;
        }

        let diff = parse_diff(&raw);
        let json_diff = diff.to_json()?;
        let json_files_changed = diff.files.len();
        info!("total files changed (json diff): {json_files_changed}");
        debug!("jsonDiff: {json_diff}");

        if !config.file_output_only {
            outputs.set_output(JSON_DIFF, &json_diff)?;
        }
        if let Some(path) = &config.json_diff_file_output {
            debug!("writing json diff to {}", path.display());
            write_output_file(path, &json_diff)?;
            outputs.set_output(JSON_DIFF_PATH, &path_value(path))?;
        }

        Ok(DiffOutcome {
            raw,
            diff,
            raw_files_changed,
            json_files_changed,
        })
    }
}

/// Creates or overwrites `path` with `content`.
fn write_output_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            debug!(parent_dir = %parent_dir.display(), "Creating parent directory");
            fs::create_dir_all(parent_dir)?;
        }
    }
    fs_extra::file::write_all(path, content)?;
    Ok(())
}

fn path_value(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
