use super::super::domain::{finite, AdRecord, ReasonCode, Stage};
use super::config::ThresholdConfig;

/// Walks the kill criteria for `stage` top to bottom; the first failing check decides.
pub(crate) fn classify(record: &AdRecord, config: &ThresholdConfig, stage: Stage) -> ReasonCode {
    if record.spend_or_zero() < config.min_spend_for(stage) {
        return ReasonCode::InsufficientData;
    }

    if stage.judges_conversions() {
        classify_converting(record, config)
    } else {
        classify_engagement(record, config)
    }
}

fn classify_engagement(record: &AdRecord, config: &ThresholdConfig) -> ReasonCode {
    if record
        .clicks
        .map_or(true, |clicks| clicks < config.min_clicks_for_engagement)
    {
        return ReasonCode::NoEngagement;
    }

    if ctr_below_floor(record, config) {
        return ReasonCode::LowCtr;
    }

    if cpc_over_ceiling(record, config) {
        return ReasonCode::HighCpc;
    }

    ReasonCode::Keep
}

fn classify_converting(record: &AdRecord, config: &ThresholdConfig) -> ReasonCode {
    if finite(record.roas).map_or(true, |roas| roas <= 0.0) {
        return ReasonCode::NoConversions;
    }

    if ctr_below_floor(record, config) {
        return ReasonCode::LowCtr;
    }

    if cpc_over_ceiling(record, config) {
        return ReasonCode::HighCpcConverting;
    }

    ReasonCode::Keep
}

fn ctr_below_floor(record: &AdRecord, config: &ThresholdConfig) -> bool {
    finite(record.ctr).map_or(true, |ctr| ctr < config.ctr_floor)
}

fn cpc_over_ceiling(record: &AdRecord, config: &ThresholdConfig) -> bool {
    finite(record.cpc).map_or(true, |cpc| config.cpc_exceeds_ceiling(cpc))
}
