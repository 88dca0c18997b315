//! Page counting for the pre-merge summary

use std::path::{Path, PathBuf};

use lopdf::Document;

use crate::error::{Error, Result};

/// Count the number of pages in a PDF file
///
/// Walks the page tree the same way the merge does, so indirect `Count`
/// values and empty trees are handled alike. An empty tree counts as zero.
pub fn count_pages(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    Ok(doc.get_pages().len())
}

/// Count pages of every file, returning each count alongside its path
pub fn count_all_pages(paths: &[PathBuf]) -> Result<Vec<(PathBuf, usize)>> {
    paths
        .iter()
        .map(|path| Ok((path.clone(), count_pages(path)?)))
        .collect()
}
