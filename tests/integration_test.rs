use git_diff_action::diff::{Chunk, FileChange};
use git_diff_action::outputs::{JSON_DIFF, JSON_DIFF_PATH, RAW_DIFF, RAW_DIFF_PATH};
use git_diff_action::{self, DiffConfig, Error, GitDiff, GitDiffAction, MemoryOutputs};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::process::Command;
use tree_fs::{Tree, TreeBuilder};

fn git(repo: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn setup_test_repo() -> Tree {
    // Create a temporary workspace for the test repository
    let tree = TreeBuilder::default()
        .add_file("file1.txt", "one\ntwo\nthree\n")
        .add_file("dir1/file2.txt", "file 2 content\n")
        .create()
        .expect("Failed to create test repo tree");

    git(&tree.root, &["init", "--quiet"]);
    git(&tree.root, &["config", "user.name", "Test User"]);
    git(&tree.root, &["config", "user.email", "test@example.com"]);
    git(&tree.root, &["config", "commit.gpgsign", "false"]);
    git(&tree.root, &["add", "."]);
    git(&tree.root, &["commit", "--quiet", "-m", "Initial commit"]);
    git(&tree.root, &["branch", "-M", "main"]);

    tree
}

fn modify_file1(tree: &Tree) {
    fs::write(tree.root.join("file1.txt"), "one\nTWO\nthree\n")
        .expect("Failed to modify file1.txt");
}

fn inputs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[tokio::test]
async fn test_single_modified_file() {
    let tree = setup_test_repo();
    modify_file1(&tree);

    let action = git_diff_action::new_from_inputs(
        &tree.root,
        &inputs(&[
            ("base_branch", "main"),
            ("search_path", "."),
            ("file_output_only", "false"),
        ]),
    )
    .expect("Failed to create action");
    let mut outputs = MemoryOutputs::default();

    let outcome = action.run(&mut outputs).await.expect("git diff should succeed");

    assert_eq!(outcome.raw.matches("diff --git").count(), 1);
    assert_eq!(outcome.raw_files_changed, 1);
    assert_eq!(outcome.json_files_changed, 1);
    assert_eq!(outputs.get(RAW_DIFF), Some(outcome.raw.as_str()));
    assert!(outputs.get(JSON_DIFF).is_some());
    assert_eq!(outputs.get(RAW_DIFF_PATH), None);
    assert_eq!(outputs.get(JSON_DIFF_PATH), None);

    let file = &outcome.diff.files[0];
    assert!(matches!(file, FileChange::ChangedFile(_)));
    assert_eq!(file.path(), "file1.txt");
    let Chunk::Chunk(hunk) = &file.chunks()[0] else {
        panic!("expected a text hunk");
    };
    assert_eq!(hunk.from_file_range.lines, 3);
    assert_eq!(hunk.to_file_range.lines, 3);
    assert_eq!(hunk.changes.len(), 4);
}

#[tokio::test]
async fn test_clean_repository() {
    let tree = setup_test_repo();
    let action = GitDiffAction::new_from_local(&tree.root, DiffConfig::new("main", "."));
    let mut outputs = MemoryOutputs::default();

    let outcome = action.run(&mut outputs).await.expect("git diff should succeed");

    assert_eq!(outcome.raw, "");
    assert_eq!(outcome.raw_files_changed, 0);
    assert_eq!(outcome.json_files_changed, 0);
    assert_eq!(outputs.get(RAW_DIFF), Some(""));
    assert_eq!(outputs.get(JSON_DIFF), Some(r#"{"type":"GitDiff","files":[]}"#));
}

#[tokio::test]
async fn test_file_output_only() {
    let tree = setup_test_repo();
    modify_file1(&tree);
    let output_tree = TreeBuilder::default()
        .create()
        .expect("Failed to create output tree");
    let raw_path = output_tree.root.join("git-diff.txt");
    let json_path = output_tree.root.join("git-diff.json");

    let action = git_diff_action::new_from_inputs(
        &tree.root,
        &inputs(&[
            ("base_branch", "main"),
            ("search_path", "."),
            ("file_output_only", "true"),
            ("raw_diff_file_output", raw_path.to_str().unwrap()),
            ("json_diff_file_output", json_path.to_str().unwrap()),
        ]),
    )
    .expect("Failed to create action");
    let mut outputs = MemoryOutputs::default();

    let outcome = action.run(&mut outputs).await.expect("git diff should succeed");

    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs.get(RAW_DIFF), None);
    assert_eq!(outputs.get(JSON_DIFF), None);
    assert_eq!(outputs.get(RAW_DIFF_PATH), raw_path.to_str());
    assert_eq!(outputs.get(JSON_DIFF_PATH), json_path.to_str());

    assert_eq!(
        fs::read_to_string(&raw_path).expect("Failed to read raw diff"),
        outcome.raw
    );
    let json = fs::read_to_string(&json_path).expect("Failed to read json diff");
    assert_eq!(json, outcome.diff.to_json().unwrap());
}

#[tokio::test]
async fn test_written_files_match_outputs() {
    let tree = setup_test_repo();
    modify_file1(&tree);
    let raw_path = tree.root.join("artifacts/raw.diff");
    let json_path = tree.root.join("artifacts/diff.json");

    let mut config = DiffConfig::new("main", "file1.txt");
    config.raw_diff_file_output = Some(raw_path.clone());
    config.json_diff_file_output = Some(json_path.clone());
    let action = GitDiffAction::new_from_local(&tree.root, config);
    let mut outputs = MemoryOutputs::default();

    action.run(&mut outputs).await.expect("git diff should succeed");

    assert_eq!(outputs.len(), 4);
    assert_eq!(
        outputs.get(RAW_DIFF),
        Some(fs::read_to_string(&raw_path).unwrap().as_str())
    );
    assert_eq!(
        outputs.get(JSON_DIFF),
        Some(fs::read_to_string(&json_path).unwrap().as_str())
    );
}

#[tokio::test]
async fn test_json_output_reads_back() {
    let tree = setup_test_repo();
    modify_file1(&tree);
    fs::write(tree.root.join("dir1/file2.txt"), "changed\n").expect("Failed to modify file2.txt");

    let action = GitDiffAction::new_from_local(&tree.root, DiffConfig::new("main", "."));
    let mut outputs = MemoryOutputs::default();
    let outcome = action.run(&mut outputs).await.expect("git diff should succeed");

    let parsed: GitDiff =
        serde_json::from_str(outputs.get(JSON_DIFF).unwrap()).expect("json-diff should parse");
    assert_eq!(parsed.files.len(), outcome.json_files_changed);
    assert_eq!(parsed.files.len(), 2);
}

#[tokio::test]
async fn test_search_path_filters_files() {
    let tree = setup_test_repo();
    modify_file1(&tree);
    fs::write(tree.root.join("dir1/file2.txt"), "changed\n").expect("Failed to modify file2.txt");

    let action = GitDiffAction::new_from_local(&tree.root, DiffConfig::new("main", "dir1"));
    let outcome = action
        .run(&mut MemoryOutputs::default())
        .await
        .expect("git diff should succeed");

    assert_eq!(outcome.json_files_changed, 1);
    assert_eq!(outcome.diff.files[0].path(), "dir1/file2.txt");
}

#[tokio::test]
async fn test_git_options_are_forwarded() {
    let tree = setup_test_repo();
    modify_file1(&tree);

    let mut config = DiffConfig::new("main", ".");
    config.git_options = vec!["--name-only".to_string()];
    let action = GitDiffAction::new_from_local(&tree.root, config);
    let outcome = action
        .run(&mut MemoryOutputs::default())
        .await
        .expect("git diff should succeed");

    assert_eq!(outcome.raw, "file1.txt\n");
    assert_eq!(outcome.raw_files_changed, 0);
    assert_eq!(outcome.json_files_changed, 0);
}

#[tokio::test]
async fn test_unknown_base_branch_fails() {
    let tree = setup_test_repo();
    let action = GitDiffAction::new_from_local(&tree.root, DiffConfig::new("does-not-exist", "."));
    let mut outputs = MemoryOutputs::default();

    let err = action.run(&mut outputs).await.unwrap_err();

    assert!(matches!(err, Error::GitCommandError(_)));
    assert!(err.failure_message().starts_with("error getting git diff: "));
    assert!(outputs.is_empty());
}

#[tokio::test]
async fn test_buffer_limit_exceeded() {
    let tree = setup_test_repo();
    modify_file1(&tree);

    let mut config = DiffConfig::new("main", ".");
    config.max_buffer_size = 16;
    let action = GitDiffAction::new_from_local(&tree.root, config);
    let mut outputs = MemoryOutputs::default();

    let err = action.run(&mut outputs).await.unwrap_err();

    assert!(matches!(
        err,
        Error::MaxBufferExceeded {
            stream: "stdout",
            limit: 16
        }
    ));
    assert!(outputs.is_empty());
}

#[tokio::test]
async fn test_git_diff_entry_point() {
    let tree = setup_test_repo();
    modify_file1(&tree);
    let mut outputs = MemoryOutputs::default();

    let diff = git_diff_action::git_diff(
        &tree.root,
        &inputs(&[("base_branch", "main"), ("search_path", "."), ("max_buffer_size", "abc")]),
        &mut outputs,
    )
    .await
    .expect("git diff should succeed");

    assert_eq!(diff.files.len(), 1);
    assert!(outputs.get(RAW_DIFF).is_some());
}
