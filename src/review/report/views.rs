use super::super::domain::{finite, AdRecord, ReasonCode};
use super::super::evaluation::Verdict;
use chrono::NaiveDate;
use serde::Serialize;

pub const NOT_AVAILABLE: &str = "N/A";

/// Row tone an exporter keys its conditional formatting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowHighlight {
    /// Hard fail.
    Red,
    Green,
    /// Not enough spend to judge.
    Blue,
    /// Converting but needs optimizing.
    Yellow,
}

impl RowHighlight {
    pub const fn for_reason(reason: ReasonCode) -> Self {
        match reason {
            ReasonCode::Keep => Self::Green,
            ReasonCode::InsufficientData => Self::Blue,
            ReasonCode::HighCpcConverting => Self::Yellow,
            ReasonCode::NoEngagement
            | ReasonCode::LowCtr
            | ReasonCode::HighCpc
            | ReasonCode::NoConversions => Self::Red,
        }
    }
}

/// One line of the weekly review sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRow {
    pub report_date: NaiveDate,
    pub ad_name: String,
    pub spend: String,
    pub ctr: String,
    pub link_clicks: String,
    pub cpc: String,
    pub roas: String,
    pub flagged: &'static str,
    pub reason: ReasonCode,
    pub reason_label: &'static str,
    pub action: String,
    pub recommendation: String,
    /// Left empty for reviewers.
    pub notes: String,
    pub highlight: RowHighlight,
}

impl ReviewRow {
    pub fn new(report_date: NaiveDate, record: &AdRecord, verdict: &Verdict) -> Self {
        Self {
            report_date,
            ad_name: record.name.clone(),
            spend: format_currency(record.spend),
            ctr: format_percent(record.ctr),
            link_clicks: record
                .clicks
                .map_or_else(|| NOT_AVAILABLE.to_string(), |clicks| clicks.to_string()),
            cpc: format_currency(record.cpc),
            roas: format_multiple(record.roas),
            flagged: verdict.flag_label(),
            reason: verdict.reason,
            reason_label: verdict.reason.label(),
            action: verdict.action.clone(),
            recommendation: verdict.recommendation.clone(),
            notes: String::new(),
            highlight: RowHighlight::for_reason(verdict.reason),
        }
    }
}

pub fn format_currency(value: Option<f64>) -> String {
    finite(value).map_or_else(|| NOT_AVAILABLE.to_string(), |amount| format!("${amount:.2}"))
}

/// Renders a CTR fraction as a percentage.
pub fn format_percent(value: Option<f64>) -> String {
    finite(value).map_or_else(
        || NOT_AVAILABLE.to_string(),
        |fraction| format!("{:.2}%", fraction * 100.0),
    )
}

pub fn format_multiple(value: Option<f64>) -> String {
    finite(value).map_or_else(|| NOT_AVAILABLE.to_string(), |multiple| format!("{multiple:.2}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_metrics_render_as_not_available() {
        assert_eq!(format_currency(None), "N/A");
        assert_eq!(format_percent(Some(f64::NAN)), "N/A");
        assert_eq!(format_multiple(None), "N/A");
    }

    #[test]
    fn metrics_render_for_humans() {
        assert_eq!(format_currency(Some(10.0)), "$10.00");
        assert_eq!(format_percent(Some(0.0075)), "0.75%");
        assert_eq!(format_multiple(Some(0.0)), "0.00");
    }

    #[test]
    fn highlight_tracks_reason() {
        assert_eq!(RowHighlight::for_reason(ReasonCode::Keep), RowHighlight::Green);
        assert_eq!(
            RowHighlight::for_reason(ReasonCode::HighCpcConverting),
            RowHighlight::Yellow
        );
        assert_eq!(RowHighlight::for_reason(ReasonCode::LowCtr), RowHighlight::Red);
    }
}
