use crate::review::domain::{AdRecord, Stage};
use crate::review::evaluation::{EvaluationEngine, ThresholdConfig};

pub(super) fn thresholds() -> ThresholdConfig {
    ThresholdConfig {
        cpc_ceiling: 1.00,
        ctr_floor: 0.0075,
        min_spend_stage_a: 5.0,
        min_spend_stage_b: 15.0,
        min_clicks_for_engagement: 1,
        ..ThresholdConfig::default()
    }
}

pub(super) fn engine(stage: Stage) -> EvaluationEngine {
    EvaluationEngine::new(thresholds(), stage)
}

/// An ad that clears every early and mid stage check.
pub(super) fn healthy_mockup() -> AdRecord {
    AdRecord::new("healthy", 10.0)
        .with_clicks(8)
        .with_ctr(0.02)
        .with_cpc(0.80)
}

/// An ad that clears every scale stage check.
pub(super) fn healthy_scaler() -> AdRecord {
    AdRecord::new("scaler", 20.0)
        .with_roas(2.5)
        .with_ctr(0.02)
        .with_cpc(0.50)
}

pub(super) fn missing_everything(name: &str, spend: Option<f64>) -> AdRecord {
    AdRecord {
        name: name.to_string(),
        spend,
        ctr: None,
        cpc: None,
        clicks: None,
        roas: None,
    }
}
