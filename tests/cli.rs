//! End-to-end tests driving the merge-numbered binary

mod common;

use common::write_letter_pdf;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_merge-numbered");

fn run_in(dir: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(BIN)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start merge-numbered");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("Failed to write stdin");

    child.wait_with_output().expect("Failed to wait for merge-numbered")
}

#[test]
fn test_cli_merges_folder_argument() {
    let temp_dir = TempDir::new().unwrap();
    let pdfs = temp_dir.path().join("pdfs");
    std::fs::create_dir(&pdfs).unwrap();
    write_letter_pdf(&pdfs.join("1.pdf"), &["one", "two"]);
    write_letter_pdf(&pdfs.join("2.pdf"), &["three"]);

    let output = run_in(temp_dir.path(), &["pdfs"], "");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Files found: 2"));
    assert!(stdout.contains("Total pages to process: 3"));
    assert!(pdfs.join("merged_numbered.pdf").exists());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Processing: 1.pdf"));
}

#[test]
fn test_cli_missing_folder_exits_with_1() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_in(temp_dir.path(), &["nowhere"], "");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Folder not found"));
}

#[test]
fn test_cli_folder_without_pdfs_exits_with_1() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("readme.txt"), b"hi").unwrap();

    let output = run_in(temp_dir.path(), &["."], "");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No PDF files"));
    assert!(!temp_dir.path().join("merged_numbered.pdf").exists());
}

#[test]
fn test_cli_declining_default_folder_cancels() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_in(temp_dir.path(), &[], "n\n");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(y/N)"));
    assert!(stdout.contains("Cancelled."));
}

#[test]
fn test_cli_closed_stdin_declines_default_folder() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_in(temp_dir.path(), &[""], "");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Cancelled."));
}

#[cfg(not(windows))]
#[test]
fn test_cli_confirming_default_folder_proceeds() {
    let temp_dir = TempDir::new().unwrap();
    let default_dir = temp_dir.path().join(merge_numbered::DEFAULT_FOLDER);
    std::fs::create_dir(&default_dir).unwrap();
    write_letter_pdf(&default_dir.join("only.pdf"), &["x"]);

    let output = run_in(temp_dir.path(), &[], "y\n");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(default_dir.join("merged_numbered.pdf").exists());
}

#[cfg(not(windows))]
#[test]
fn test_cli_accepts_s_for_default_folder() {
    let temp_dir = TempDir::new().unwrap();
    let default_dir = temp_dir.path().join(merge_numbered::DEFAULT_FOLDER);
    std::fs::create_dir(&default_dir).unwrap();
    write_letter_pdf(&default_dir.join("only.pdf"), &["x"]);

    let output = run_in(temp_dir.path(), &[], "s\n");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(default_dir.join("merged_numbered.pdf").exists());
}

#[test]
fn test_cli_missing_folder_message_has_no_context_chain() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_in(temp_dir.path(), &["nowhere"], "");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: Folder not found: nowhere"));
    assert!(!stderr.contains("Failed to list PDFs"));
}
