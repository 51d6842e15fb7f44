use super::super::domain::{finite, AdRecord, ReasonCode};
use super::super::evaluation::Verdict;
use super::views::{format_currency, format_percent, ReviewRow};
use chrono::NaiveDate;
use serde::Serialize;

/// Aggregate counts for one review run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReviewSummary {
    pub total: usize,
    pub flagged: usize,
    /// Not flagged: kept plus insufficient data.
    pub passed: usize,
    pub kept: usize,
    pub insufficient_data: usize,
    pub flagged_spend: f64,
    /// Mean CTR over flagged ads that reported one; `None` when there are none to average.
    pub flagged_average_ctr: Option<f64>,
}

impl ReviewSummary {
    pub fn flagged_spend_label(&self) -> String {
        format_currency(Some(self.flagged_spend))
    }

    pub fn flagged_average_ctr_label(&self) -> String {
        format_percent(self.flagged_average_ctr)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewReport {
    pub report_date: NaiveDate,
    pub rows: Vec<ReviewRow>,
    pub summary: ReviewSummary,
}

impl ReviewReport {
    pub fn assemble<'a, I>(report_date: NaiveDate, entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a AdRecord, &'a Verdict)>,
    {
        let mut rows = Vec::new();
        let mut summary = ReviewSummary::default();
        let mut flagged_ctr_total = 0.0;
        let mut flagged_ctr_count = 0usize;

        for (record, verdict) in entries {
            summary.total += 1;
            if verdict.flagged {
                summary.flagged += 1;
                summary.flagged_spend += record.spend_or_zero();
                if let Some(ctr) = finite(record.ctr) {
                    flagged_ctr_total += ctr;
                    flagged_ctr_count += 1;
                }
            } else {
                summary.passed += 1;
                match verdict.reason {
                    ReasonCode::InsufficientData => summary.insufficient_data += 1,
                    _ => summary.kept += 1,
                }
            }

            rows.push(ReviewRow::new(report_date, record, verdict));
        }

        if flagged_ctr_count > 0 {
            summary.flagged_average_ctr = Some(flagged_ctr_total / flagged_ctr_count as f64);
        }

        Self {
            report_date,
            rows,
            summary,
        }
    }

    pub fn flagged_rows(&self) -> impl Iterator<Item = &ReviewRow> {
        self.rows.iter().filter(|row| row.reason.is_flagged())
    }
}
