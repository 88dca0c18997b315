//! Merge Numbered Library
//!
//! Concatenates every PDF in a folder into one document and stamps a
//! running page number on each page. This library provides functionality to:
//! - Find the PDF files in a folder, sorted by name
//! - Guard against running on the unmodified default folder
//! - Generate single-page number overlays
//! - Merge the inputs, stamping each page as it goes
//!
//! # Example
//!
//! ```no_run
//! use merge_numbered::folder::merge_folder;
//! use merge_numbered::pdf::NumberingOptions;
//! use std::path::Path;
//!
//! let report = merge_folder(Path::new("handouts"), &NumberingOptions::default())
//!     .expect("Failed to merge PDFs");
//! println!("Wrote {} pages to {}", report.total_pages, report.output_path.display());
//! ```

pub mod error;
pub mod folder;
pub mod layout;
pub mod pdf;

// Re-export commonly used items
pub use error::{Error, Result};
pub use folder::{merge_folder, DEFAULT_FOLDER, OUTPUT_FILENAME};
