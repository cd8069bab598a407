use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::error::{Error, Result};

/// Captured text of a finished git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Trait defining the Git operations required by the action
#[allow(async_fn_in_trait)]
pub trait Git {
    /// Run a Git command with the given arguments, capturing at most
    /// `max_buffer_size` bytes from each of stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned, exits unsuccessfully,
    /// or writes more than `max_buffer_size` bytes to either stream.
    async fn run_git_command(&self, args: &[&str], max_buffer_size: usize) -> Result<GitOutput>;
}

/// Implementation of Git operations using the local Git CLI
pub struct GitCli {
    repo_path: PathBuf,
}

impl GitCli {
    /// Creates a new `GitCli` instance running commands inside `repo_path`
    #[must_use]
    pub const fn new(repo_path: PathBuf) -> Self {
        Self { repo_path }
    }
}

impl Git for GitCli {
    #[instrument(skip(self), fields(repo_path = %self.repo_path.display()))]
    async fn run_git_command(&self, args: &[&str], max_buffer_size: usize) -> Result<GitOutput> {
        let mut child = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::GitCommandError(e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::GitCommandError("stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::GitCommandError("stderr was not captured".to_string()))?;

        let captured = tokio::try_join!(
            read_bounded(stdout, max_buffer_size, "stdout"),
            read_bounded(stderr, max_buffer_size, "stderr"),
        );
        let (stdout, stderr) = match captured {
            Ok(streams) => streams,
            Err(e) => {
                debug!(error = %e, "Output limit exceeded, killing git");
                child.kill().await?;
                return Err(e);
            }
        };

        let status = child.wait().await?;
        let stdout = String::from_utf8_lossy(&stdout).into_owned();
        let stderr = String::from_utf8_lossy(&stderr).into_owned();

        if !status.success() {
            debug!(status = %status, error = %stderr, "Git command failed");
            return Err(Error::GitCommandError(format!(
                "git {} exited with {status}\n{stderr}",
                args.join(" ")
            )));
        }

        debug!(
            stdout_length = stdout.len(),
            stderr_length = stderr.len(),
            "Git command completed"
        );
        Ok(GitOutput { stdout, stderr })
    }
}

/// Reads `reader` to the end, failing once more than `limit` bytes arrive.
async fn read_bounded<R>(reader: R, limit: usize, stream: &'static str) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    reader.take(cap).read_to_end(&mut buf).await?;

    if buf.len() > limit {
        return Err(Error::MaxBufferExceeded { stream, limit });
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_bounded_within_limit() {
        let data: &[u8] = b"diff --git a/x b/x\n";
        let buf = read_bounded(data, data.len(), "stdout").await.unwrap();
        assert_eq!(buf, data);
    }

    #[tokio::test]
    async fn test_read_bounded_over_limit() {
        let data: &[u8] = b"0123456789";
        let err = read_bounded(data, 9, "stdout").await.unwrap_err();
        assert!(matches!(
            err,
            Error::MaxBufferExceeded {
                stream: "stdout",
                limit: 9
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_repo_directory_fails() {
        let git = GitCli::new(PathBuf::from("/definitely/not/a/real/dir"));
        let err = git
            .run_git_command(&["--no-pager", "diff"], 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::GitCommandError(_)));
    }
}
