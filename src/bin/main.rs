use clap::Parser;
use git_diff_action::outputs::set_failed;
use git_diff_action::{DiffConfig, GitDiffAction, GithubOutputs, InputSource};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, level_filters::LevelFilter};
use tracing_subscriber::{fmt, EnvFilter};

// Every flag falls back to the matching `INPUT_*` variable the runner sets
// for the step's `with:` block.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Branch, tag or commit to diff against
    #[arg(long, env = "INPUT_BASE_BRANCH")]
    base_branch: Option<String>,

    /// Path filter restricting the diff
    #[arg(long, env = "INPUT_SEARCH_PATH")]
    search_path: Option<String>,

    /// Maximum bytes captured from git's stdout or stderr (default 1000000)
    #[arg(long, env = "INPUT_MAX_BUFFER_SIZE")]
    max_buffer_size: Option<String>,

    /// Only write files; skip the raw-diff and json-diff outputs ("true" to enable)
    #[arg(long, env = "INPUT_FILE_OUTPUT_ONLY")]
    file_output_only: Option<String>,

    /// Extra options passed to `git diff`
    #[arg(long, env = "INPUT_GIT_OPTIONS", allow_hyphen_values = true)]
    git_options: Option<String>,

    /// File to write the raw diff to
    #[arg(long, env = "INPUT_RAW_DIFF_FILE_OUTPUT")]
    raw_diff_file_output: Option<String>,

    /// File to write the JSON diff to
    #[arg(long, env = "INPUT_JSON_DIFF_FILE_OUTPUT")]
    json_diff_file_output: Option<String>,

    /// Repository working tree
    #[arg(short, long, env = "GITHUB_WORKSPACE", default_value = ".")]
    repo: PathBuf,

    /// Log level (defaults to debug when RUNNER_DEBUG=1, info otherwise)
    #[arg(global = true, short, long)]
    log: Option<LevelFilter>,
}

impl InputSource for Cli {
    fn input(&self, name: &str) -> Option<String> {
        let value = match name {
            "base_branch" => &self.base_branch,
            "search_path" => &self.search_path,
            "max_buffer_size" => &self.max_buffer_size,
            "file_output_only" => &self.file_output_only,
            "git_options" => &self.git_options,
            "raw_diff_file_output" => &self.raw_diff_file_output,
            "json_diff_file_output" => &self.json_diff_file_output,
            _ => return None,
        };
        value.clone()
    }
}

fn default_level() -> LevelFilter {
    if std::env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1") {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let level = cli.log.unwrap_or_else(default_level);
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(true)
        .init();

    let config = match DiffConfig::from_inputs(&cli) {
        Ok(config) => config,
        Err(e) => {
            set_failed(&e.failure_message());
            return ExitCode::FAILURE;
        }
    };

    debug!(repo = %cli.repo.display(), "Running git diff");
    let action = GitDiffAction::new_from_local(&cli.repo, config);
    let mut outputs = GithubOutputs::from_env();

    match action.run(&mut outputs).await {
        Ok(outcome) => {
            debug!(files = outcome.json_files_changed, "git diff completed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            set_failed(&e.failure_message());
            ExitCode::FAILURE
        }
    }
}
