pub use action::{DiffOutcome, GitDiffAction};
pub use config::{DiffConfig, InputSource, DEFAULT_MAX_BUFFER_SIZE};
pub use diff::GitDiff;
pub use error::{Error, Result};
pub use outputs::{ActionOutputs, GithubOutputs, MemoryOutputs};

use std::path::Path;

pub mod action;
mod config;
pub mod diff;
mod error;
pub mod git;
pub mod outputs;

/// Creates a `GitDiffAction` for a local repository from step inputs.
///
/// # Arguments
///
/// * `repo_path`: The working tree `git diff` runs in.
/// * `inputs`: Named step inputs (`base_branch`, `search_path`, ...).
///
/// # Errors
///
/// Returns an error if a required input is missing or an input is malformed.
pub fn new_from_inputs(repo_path: &Path, inputs: &impl InputSource) -> Result<GitDiffAction> {
    let config = DiffConfig::from_inputs(inputs)?;
    Ok(GitDiffAction::new_from_local(repo_path, config))
}

/// Runs the diff for `repo_path` and publishes the results to `outputs`.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the run fails; see
/// [`GitDiffAction::run`].
pub async fn git_diff(
    repo_path: &Path,
    inputs: &impl InputSource,
    outputs: &mut impl ActionOutputs,
) -> Result<GitDiff> {
    let action = new_from_inputs(repo_path, inputs)?;
    Ok(action.run(outputs).await?.diff)
}
