use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Campaign phase selecting which rule subset and spend threshold apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    EarlyStage,
    MidStage,
    ScaleStage,
}

impl Stage {
    pub const fn ordered() -> [Self; 3] {
        [Self::EarlyStage, Self::MidStage, Self::ScaleStage]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::EarlyStage => "Mockup",
            Self::MidStage => "Cycle 1",
            Self::ScaleStage => "Cycle 2",
        }
    }

    /// Scale-stage ads are judged on conversions before engagement.
    pub const fn judges_conversions(self) -> bool {
        matches!(self, Self::ScaleStage)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stage '{0}' (expected one of: mockup, cycle1, cycle2, early, mid, scale)")]
pub struct StageParseError(pub String);

impl FromStr for Stage {
    type Err = StageParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|ch| !matches!(ch, ' ' | '_' | '-'))
            .collect();

        match normalized.as_str() {
            "mockup" | "early" | "earlystage" => Ok(Self::EarlyStage),
            "cycle1" | "mid" | "midstage" => Ok(Self::MidStage),
            "cycle2" | "scale" | "scalestage" => Ok(Self::ScaleStage),
            _ => Err(StageParseError(value.to_string())),
        }
    }
}

/// Closed set of outcomes the rule evaluator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    InsufficientData,
    NoEngagement,
    LowCtr,
    HighCpc,
    NoConversions,
    HighCpcConverting,
    Keep,
}

impl ReasonCode {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::InsufficientData,
            Self::NoEngagement,
            Self::LowCtr,
            Self::HighCpc,
            Self::NoConversions,
            Self::HighCpcConverting,
            Self::Keep,
        ]
    }

    /// Stable key used by the recommendation catalog.
    pub const fn code(self) -> &'static str {
        match self {
            Self::InsufficientData => "insufficient_data",
            Self::NoEngagement => "no_engagement",
            Self::LowCtr => "low_ctr",
            Self::HighCpc => "high_cpc",
            Self::NoConversions => "no_conversions",
            Self::HighCpcConverting => "high_cpc_converting",
            Self::Keep => "keep",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::InsufficientData => "Insufficient Data",
            Self::NoEngagement => "No Engagement",
            Self::LowCtr => "Low CTR",
            Self::HighCpc => "High CPC",
            Self::NoConversions => "No Conversions",
            Self::HighCpcConverting => "High CPC (Converting)",
            Self::Keep => "Keep",
        }
    }

    pub const fn is_flagged(self) -> bool {
        !matches!(self, Self::InsufficientData | Self::Keep)
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of ad performance data.
///
/// Metrics are `None` when the export had no value or the cell could not be read. A missing
/// metric is never the same thing as zero: the rules treat it as failing whichever check reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdRecord {
    pub name: String,
    /// USD. `None` only when the source cell was unreadable; evaluated as zero spend.
    pub spend: Option<f64>,
    /// Fraction of impressions that clicked, `0.0075` for 0.75%.
    pub ctr: Option<f64>,
    pub cpc: Option<f64>,
    pub clicks: Option<u64>,
    pub roas: Option<f64>,
}

impl AdRecord {
    pub fn new(name: impl Into<String>, spend: f64) -> Self {
        Self {
            name: name.into(),
            spend: Some(spend),
            ctr: None,
            cpc: None,
            clicks: None,
            roas: None,
        }
    }

    pub fn with_ctr(mut self, ctr: f64) -> Self {
        self.ctr = Some(ctr);
        self
    }

    pub fn with_cpc(mut self, cpc: f64) -> Self {
        self.cpc = Some(cpc);
        self
    }

    pub fn with_clicks(mut self, clicks: u64) -> Self {
        self.clicks = Some(clicks);
        self
    }

    pub fn with_roas(mut self, roas: f64) -> Self {
        self.roas = Some(roas);
        self
    }

    pub(crate) fn spend_or_zero(&self) -> f64 {
        finite(self.spend).unwrap_or(0.0)
    }
}

/// Non-finite metrics are treated the same as missing ones.
pub(crate) fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|metric| metric.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_parses_domain_and_engine_names() {
        assert_eq!("Mockup".parse::<Stage>(), Ok(Stage::EarlyStage));
        assert_eq!("cycle 1".parse::<Stage>(), Ok(Stage::MidStage));
        assert_eq!("Cycle-2".parse::<Stage>(), Ok(Stage::ScaleStage));
        assert_eq!("scale_stage".parse::<Stage>(), Ok(Stage::ScaleStage));
    }

    #[test]
    fn stage_rejects_unknown_names() {
        let error = "cycle3".parse::<Stage>().expect_err("unknown stage");
        assert_eq!(error, StageParseError("cycle3".to_string()));
        assert!(error.to_string().contains("cycle3"));
    }

    #[test]
    fn only_failing_reasons_are_flagged() {
        let flagged: Vec<_> = ReasonCode::ordered()
            .into_iter()
            .filter(|reason| reason.is_flagged())
            .collect();
        assert_eq!(
            flagged,
            vec![
                ReasonCode::NoEngagement,
                ReasonCode::LowCtr,
                ReasonCode::HighCpc,
                ReasonCode::NoConversions,
                ReasonCode::HighCpcConverting,
            ]
        );
    }

    #[test]
    fn non_finite_spend_counts_as_zero() {
        let mut record = AdRecord::new("nan", f64::NAN);
        assert_eq!(record.spend_or_zero(), 0.0);
        record.spend = None;
        assert_eq!(record.spend_or_zero(), 0.0);
    }
}
