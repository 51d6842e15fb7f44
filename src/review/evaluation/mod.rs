mod catalog;
mod config;
mod rules;

pub use catalog::{CatalogError, RecommendationCatalog, FALLBACK_ACTION, FALLBACK_RECOMMENDATION};
pub use config::{CeilingComparison, ThresholdConfig, ThresholdError, ThresholdOverrides};

use super::domain::{AdRecord, ReasonCode, Stage};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static STANDARD_CATALOG: OnceLock<RecommendationCatalog> = OnceLock::new();

/// Evaluates `record` with the standard recommendation wording.
pub fn evaluate(record: &AdRecord, config: &ThresholdConfig, stage: Stage) -> Verdict {
    let catalog = STANDARD_CATALOG.get_or_init(RecommendationCatalog::standard);
    Verdict::resolve(rules::classify(record, config, stage), stage, catalog)
}

/// Stateless evaluator bundling the thresholds, stage, and wording for one review run.
#[derive(Debug, Clone)]
pub struct EvaluationEngine {
    config: ThresholdConfig,
    stage: Stage,
    catalog: RecommendationCatalog,
}

impl EvaluationEngine {
    pub fn new(config: ThresholdConfig, stage: Stage) -> Self {
        Self {
            config,
            stage,
            catalog: RecommendationCatalog::standard(),
        }
    }

    pub fn with_catalog(mut self, catalog: RecommendationCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn evaluate(&self, record: &AdRecord) -> Verdict {
        let reason = rules::classify(record, &self.config, self.stage);
        Verdict::resolve(reason, self.stage, &self.catalog)
    }

    pub fn evaluate_batch(&self, records: &[AdRecord]) -> Vec<Verdict> {
        records.iter().map(|record| self.evaluate(record)).collect()
    }
}

/// Outcome of judging one ad under one configuration and stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub flagged: bool,
    pub reason: ReasonCode,
    pub recommendation: String,
    pub action: String,
}

impl Verdict {
    fn resolve(reason: ReasonCode, stage: Stage, catalog: &RecommendationCatalog) -> Self {
        Self {
            flagged: reason.is_flagged(),
            reason,
            recommendation: catalog.recommendation_for(stage, reason.code()).to_string(),
            action: catalog.action_for(reason.code()).to_string(),
        }
    }

    pub fn flag_label(&self) -> &'static str {
        if self.flagged {
            "Y"
        } else {
            "N"
        }
    }
}
