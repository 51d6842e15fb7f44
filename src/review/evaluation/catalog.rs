use super::super::domain::{ReasonCode, Stage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

pub const FALLBACK_ACTION: &str = "Review Manually";
pub const FALLBACK_RECOMMENDATION: &str =
    "No guidance configured for this outcome; review the ad manually.";

/// Wording attached to evaluator outcomes.
///
/// Entries are keyed by reason-code strings rather than [`ReasonCode`] so a catalog file can
/// reword, add, or drop outcomes without touching the rules. Lookups never fail: anything not
/// in the table resolves to the fallback text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationCatalog {
    #[serde(default)]
    actions: HashMap<String, String>,
    #[serde(default)]
    recommendations: HashMap<Stage, HashMap<String, String>>,
}

impl RecommendationCatalog {
    pub fn empty() -> Self {
        Self {
            actions: HashMap::new(),
            recommendations: HashMap::new(),
        }
    }

    pub fn standard() -> Self {
        use ReasonCode::*;

        let mut catalog = Self::empty();
        for (reason, action) in [
            (InsufficientData, "Keep Running (Monitor)"),
            (NoEngagement, "Pause/Kill"),
            (LowCtr, "Pause/Review"),
            (HighCpc, "Pause/Review"),
            (NoConversions, "Pause/Kill"),
            (HighCpcConverting, "Optimize/Review"),
            (Keep, "Keep Running"),
        ] {
            catalog = catalog.with_action(reason.code(), action);
        }

        const RECOMMENDATIONS: &[(Stage, ReasonCode, &str)] = &[
            (
                Stage::EarlyStage,
                InsufficientData,
                "Not enough spend to judge this mockup yet; let it keep running.",
            ),
            (
                Stage::EarlyStage,
                NoEngagement,
                "Pause ad, no engagement. Replace the mockup before retesting.",
            ),
            (
                Stage::EarlyStage,
                LowCtr,
                "Low CTR, rework the creative or hook.",
            ),
            (
                Stage::EarlyStage,
                HighCpc,
                "High CPC, revise targeting or test a new angle.",
            ),
            (
                Stage::EarlyStage,
                Keep,
                "Mockup is earning clicks at an acceptable cost; keep it running.",
            ),
            (
                Stage::MidStage,
                InsufficientData,
                "Spend is still below the cycle 1 threshold; check again next review.",
            ),
            (
                Stage::MidStage,
                NoEngagement,
                "Low clicks, pause or test a new variation.",
            ),
            (
                Stage::MidStage,
                LowCtr,
                "CTR is under the floor; swap the thumbnail or opening copy.",
            ),
            (
                Stage::MidStage,
                HighCpc,
                "Clicks are too expensive; narrow the audience or revise targeting.",
            ),
            (
                Stage::MidStage,
                Keep,
                "Variation is holding up; keep running into cycle 2.",
            ),
            (
                Stage::ScaleStage,
                InsufficientData,
                "Spend is below the cycle 2 threshold; wait for more data before judging.",
            ),
            (
                Stage::ScaleStage,
                NoConversions,
                "No conversions, review the funnel and landing page.",
            ),
            (
                Stage::ScaleStage,
                LowCtr,
                "Converting traffic is thin; refresh the creative before scaling further.",
            ),
            (
                Stage::ScaleStage,
                HighCpcConverting,
                "Ad converts but clicks are expensive; optimize bids and audience before scaling.",
            ),
            (
                Stage::ScaleStage,
                Keep,
                "Converting at an acceptable cost; keep scaling and monitor ROAS.",
            ),
        ];

        for (stage, reason, text) in RECOMMENDATIONS {
            catalog = catalog.with_recommendation(*stage, reason.code(), *text);
        }

        catalog
    }

    /// Reads a JSON catalog and layers it over the standard wording.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let overlay: Self = serde_json::from_reader(reader)?;
        Ok(Self::standard().merge(overlay))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn with_action(mut self, code: impl Into<String>, action: impl Into<String>) -> Self {
        self.actions.insert(code.into(), action.into());
        self
    }

    pub fn with_recommendation(
        mut self,
        stage: Stage,
        code: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.recommendations
            .entry(stage)
            .or_default()
            .insert(code.into(), text.into());
        self
    }

    /// Entries in `overlay` win over existing ones.
    pub fn merge(mut self, overlay: Self) -> Self {
        self.actions.extend(overlay.actions);
        for (stage, entries) in overlay.recommendations {
            self.recommendations.entry(stage).or_default().extend(entries);
        }
        self
    }

    pub fn action_for(&self, code: &str) -> &str {
        self.actions
            .get(code)
            .map(String::as_str)
            .unwrap_or(FALLBACK_ACTION)
    }

    pub fn recommendation_for(&self, stage: Stage, code: &str) -> &str {
        self.recommendations
            .get(&stage)
            .and_then(|entries| entries.get(code))
            .map(String::as_str)
            .unwrap_or(FALLBACK_RECOMMENDATION)
    }
}

impl Default for RecommendationCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read recommendation catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid recommendation catalog: {0}")]
    Json(#[from] serde_json::Error),
}
