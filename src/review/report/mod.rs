mod export;
mod summary;
pub mod views;

pub use export::{write_review_sheet, REVIEW_SHEET_HEADERS};
pub use summary::{ReviewReport, ReviewSummary};
