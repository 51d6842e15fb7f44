use super::summary::ReviewReport;
use std::io::Write;

pub const REVIEW_SHEET_HEADERS: [&str; 12] = [
    "Date of Report",
    "Ad Name",
    "Amount Spent (USD)",
    "CTR (%)",
    "Link Clicks",
    "CPC (USD)",
    "ROAS",
    "Kill Criteria Met? (Y/N)",
    "Reason",
    "Action",
    "Recommendation",
    "Notes",
];

/// Writes the review sheet as CSV, one line per ad.
pub fn write_review_sheet<W: Write>(writer: W, report: &ReviewReport) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(REVIEW_SHEET_HEADERS)?;

    for row in &report.rows {
        let report_date = row.report_date.format("%Y-%m-%d").to_string();
        csv_writer.write_record([
            report_date.as_str(),
            row.ad_name.as_str(),
            row.spend.as_str(),
            row.ctr.as_str(),
            row.link_clicks.as_str(),
            row.cpc.as_str(),
            row.roas.as_str(),
            row.flagged,
            row.reason_label,
            row.action.as_str(),
            row.recommendation.as_str(),
            row.notes.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}
