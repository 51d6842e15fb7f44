pub mod domain;
pub mod evaluation;
pub mod import;
pub mod report;

#[cfg(test)]
mod tests;

pub use domain::{AdRecord, ReasonCode, Stage, StageParseError};
pub use evaluation::{
    evaluate, CatalogError, CeilingComparison, EvaluationEngine, RecommendationCatalog,
    ThresholdConfig, ThresholdError, ThresholdOverrides, Verdict,
};
pub use import::{AdDatasetImporter, CellCoercion, CtrUnit, ImportError, ImportOptions};
pub use report::{ReviewReport, ReviewSummary};

use chrono::NaiveDate;
use std::io::Read;
use tracing::{info, warn};

/// Result of reviewing one uploaded export.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub report: ReviewReport,
    pub coercions: Vec<CellCoercion>,
}

/// Imports `reader`, evaluates every ad with `engine`, and assembles the review sheet.
pub fn review_export<R: Read>(
    reader: R,
    options: &ImportOptions,
    engine: &EvaluationEngine,
    report_date: NaiveDate,
) -> Result<ReviewOutcome, ImportError> {
    let dataset = AdDatasetImporter::from_reader(reader, options)?;
    if !dataset.coercions.is_empty() {
        warn!(
            cells = dataset.coercions.len(),
            "unreadable cells were treated as missing"
        );
    }

    let verdicts = engine.evaluate_batch(&dataset.records);
    let report = ReviewReport::assemble(report_date, dataset.records.iter().zip(&verdicts));

    info!(
        stage = engine.stage().label(),
        total = report.summary.total,
        flagged = report.summary.flagged,
        "ad review completed"
    );

    Ok(ReviewOutcome {
        report,
        coercions: dataset.coercions,
    })
}
