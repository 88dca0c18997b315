//! Folder resolution, the default-folder guard and PDF discovery

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::debug;

use crate::error::{Error, Result};
use crate::pdf::{merge_numbered, MergeOptions, MergeReport, NumberingOptions};

/// Folder used when no argument is given
#[cfg(windows)]
pub const DEFAULT_FOLDER: &str = r"C:\juntaPdf";

/// Folder used when no argument is given
#[cfg(not(windows))]
pub const DEFAULT_FOLDER: &str = "juntaPdf";

/// Name of the merged file written inside the input folder
pub const OUTPUT_FILENAME: &str = "merged_numbered.pdf";

const PDF_PATTERN: &str = "*.pdf";

/// Pick the folder to work on: the argument if it is non-blank, else the default
pub fn resolve_folder(arg: Option<&str>) -> PathBuf {
    match arg {
        Some(folder) if !folder.trim().is_empty() => PathBuf::from(folder),
        _ => PathBuf::from(DEFAULT_FOLDER),
    }
}

/// Whether the folder is the unmodified default and must be confirmed first
pub fn needs_confirmation(folder: &Path) -> bool {
    folder == Path::new(DEFAULT_FOLDER)
}

/// Ask the user whether to go ahead with the default folder
///
/// Writes a warning and a yes/no question to `output`, then reads one line
/// from `input`. `y`, `yes`, `s` and `sim` (any case) are affirmative;
/// anything else, including end of input, declines.
pub fn confirm_default_folder<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<bool> {
    writeln!(
        output,
        "WARNING: the default folder {} is in use.",
        DEFAULT_FOLDER
    )?;
    writeln!(output, "Pass the folder as an argument, e.g.: merge-numbered \"/path/to/pdfs\"")?;
    write!(output, "Continue with the default folder? (y/N): ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "s" | "sim"
    )
}

/// List the PDF files directly inside `folder`, sorted by name
///
/// Matches `*.pdf` regardless of extension case and keeps regular files
/// only. A previous merge result (`OUTPUT_FILENAME`) is skipped so reruns do
/// not merge it back in.
pub fn find_pdf_files(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.exists() {
        return Err(Error::FolderNotFound(folder.to_path_buf()));
    }
    if !folder.is_dir() {
        return Err(Error::NotADirectory(folder.to_path_buf()));
    }

    // Match on file names only, so the folder path never has to be valid UTF-8
    let pattern = Pattern::new(PDF_PATTERN).map_err(|e| Error::InvalidGlob(e.to_string()))?;
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(folder)? {
        let path = entry?.path();
        let matched = path
            .file_name()
            .map(|name| pattern.matches_with(&name.to_string_lossy(), options))
            .unwrap_or(false);
        if !matched || !path.is_file() {
            continue;
        }
        if is_previous_output(&path) {
            debug!("skipping previous output {}", path.display());
            continue;
        }
        paths.push(path);
    }

    if paths.is_empty() {
        return Err(Error::NoPdfFiles(folder.to_path_buf()));
    }

    // Sort paths for consistent ordering
    paths.sort();

    Ok(paths)
}

fn is_previous_output(path: &Path) -> bool {
    path.file_name()
        .map(|name| name == OUTPUT_FILENAME)
        .unwrap_or(false)
}

/// Merge every PDF in `folder` into `<folder>/merged_numbered.pdf`
///
/// An existing output file is overwritten without asking.
pub fn merge_folder(folder: &Path, numbering: &NumberingOptions) -> Result<MergeReport> {
    let input_paths = find_pdf_files(folder)?;

    let options = MergeOptions {
        input_paths,
        output_path: folder.join(OUTPUT_FILENAME),
        numbering: numbering.clone(),
    };

    merge_numbered(&options)
}
