//! PDF manipulation module

pub mod fonts;
pub mod merge;
pub mod metadata;
pub mod overlay;

// Re-export commonly used items
pub use merge::{merge_numbered, page_box, stamp_page, FileSummary, MergeOptions, MergeReport};
pub use metadata::{count_all_pages, count_pages};
pub use overlay::{create_page_number_overlay, NumberingOptions, PAGE_NUMBER_FORMAT};
