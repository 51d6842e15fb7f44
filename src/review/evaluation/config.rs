use super::super::domain::Stage;
use serde::{Deserialize, Serialize};

/// How a CPC value is compared against the ceiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CeilingComparison {
    /// CPC at or above the ceiling fails.
    #[default]
    AtOrAbove,
    /// Only CPC strictly above the ceiling fails.
    Above,
}

impl CeilingComparison {
    pub fn exceeds(self, value: f64, ceiling: f64) -> bool {
        match self {
            Self::AtOrAbove => value >= ceiling,
            Self::Above => value > ceiling,
        }
    }
}

/// Kill-criteria thresholds for a single review run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub cpc_ceiling: f64,
    pub ctr_floor: f64,
    /// Minimum spend before early and mid stage ads are judged.
    pub min_spend_stage_a: f64,
    /// Minimum spend before scale stage ads are judged.
    pub min_spend_stage_b: f64,
    pub min_clicks_for_engagement: u64,
    #[serde(default)]
    pub cpc_comparison: CeilingComparison,
}

impl ThresholdConfig {
    /// CPC ceilings offered by the weekly review sheet.
    pub const CPC_CEILING_PRESETS: [f64; 3] = [1.00, 1.25, 1.50];

    pub fn min_spend_for(&self, stage: Stage) -> f64 {
        match stage {
            Stage::EarlyStage | Stage::MidStage => self.min_spend_stage_a,
            Stage::ScaleStage => self.min_spend_stage_b,
        }
    }

    pub fn cpc_exceeds_ceiling(&self, cpc: f64) -> bool {
        self.cpc_comparison.exceeds(cpc, self.cpc_ceiling)
    }

    pub fn validate(&self) -> Result<(), ThresholdError> {
        if !self.cpc_ceiling.is_finite() || self.cpc_ceiling <= 0.0 {
            return Err(ThresholdError::CpcCeiling(self.cpc_ceiling));
        }
        if !(0.0..=1.0).contains(&self.ctr_floor) {
            return Err(ThresholdError::CtrFloor(self.ctr_floor));
        }
        for (field, value) in [
            ("min_spend_stage_a", self.min_spend_stage_a),
            ("min_spend_stage_b", self.min_spend_stage_b),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ThresholdError::MinSpend { field, value });
            }
        }
        Ok(())
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            cpc_ceiling: 1.00,
            ctr_floor: 0.0075,
            min_spend_stage_a: 5.0,
            min_spend_stage_b: 15.0,
            min_clicks_for_engagement: 1,
            cpc_comparison: CeilingComparison::AtOrAbove,
        }
    }
}

/// Per-run overrides layered on top of a base configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOverrides {
    #[serde(default)]
    pub cpc_ceiling: Option<f64>,
    #[serde(default)]
    pub ctr_floor: Option<f64>,
    #[serde(default)]
    pub min_spend_stage_a: Option<f64>,
    #[serde(default)]
    pub min_spend_stage_b: Option<f64>,
    #[serde(default)]
    pub min_clicks_for_engagement: Option<u64>,
    #[serde(default)]
    pub cpc_comparison: Option<CeilingComparison>,
}

impl ThresholdOverrides {
    /// Applies the overrides and validates the result.
    pub fn apply(&self, base: &ThresholdConfig) -> Result<ThresholdConfig, ThresholdError> {
        let config = ThresholdConfig {
            cpc_ceiling: self.cpc_ceiling.unwrap_or(base.cpc_ceiling),
            ctr_floor: self.ctr_floor.unwrap_or(base.ctr_floor),
            min_spend_stage_a: self.min_spend_stage_a.unwrap_or(base.min_spend_stage_a),
            min_spend_stage_b: self.min_spend_stage_b.unwrap_or(base.min_spend_stage_b),
            min_clicks_for_engagement: self
                .min_clicks_for_engagement
                .unwrap_or(base.min_clicks_for_engagement),
            cpc_comparison: self.cpc_comparison.unwrap_or(base.cpc_comparison),
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThresholdError {
    #[error("CPC ceiling must be a positive amount, got {0}")]
    CpcCeiling(f64),
    #[error("CTR floor must be a fraction between 0 and 1, got {0}")]
    CtrFloor(f64),
    #[error("{field} must be a non-negative amount, got {value}")]
    MinSpend { field: &'static str, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_weekly_review_sheet() {
        let config = ThresholdConfig::default();
        assert_eq!(config.cpc_ceiling, ThresholdConfig::CPC_CEILING_PRESETS[0]);
        assert_eq!(config.min_spend_for(Stage::EarlyStage), 5.0);
        assert_eq!(config.min_spend_for(Stage::MidStage), 5.0);
        assert_eq!(config.min_spend_for(Stage::ScaleStage), 15.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn ceiling_comparison_modes_differ_only_at_the_boundary() {
        assert!(CeilingComparison::AtOrAbove.exceeds(1.0, 1.0));
        assert!(!CeilingComparison::Above.exceeds(1.0, 1.0));
        assert!(CeilingComparison::Above.exceeds(1.01, 1.0));
        assert!(!CeilingComparison::AtOrAbove.exceeds(0.99, 1.0));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut config = ThresholdConfig {
            cpc_ceiling: 0.0,
            ..ThresholdConfig::default()
        };
        assert_eq!(config.validate(), Err(ThresholdError::CpcCeiling(0.0)));

        config.cpc_ceiling = 2.0;
        config.ctr_floor = 1.5;
        assert_eq!(config.validate(), Err(ThresholdError::CtrFloor(1.5)));

        config.ctr_floor = 0.01;
        config.min_spend_stage_b = -1.0;
        assert_eq!(
            config.validate(),
            Err(ThresholdError::MinSpend {
                field: "min_spend_stage_b",
                value: -1.0
            })
        );
    }

    #[test]
    fn overrides_replace_only_supplied_fields() {
        let overrides = ThresholdOverrides {
            cpc_ceiling: Some(1.25),
            cpc_comparison: Some(CeilingComparison::Above),
            ..ThresholdOverrides::default()
        };

        let config = overrides
            .apply(&ThresholdConfig::default())
            .expect("valid overrides");
        assert_eq!(config.cpc_ceiling, 1.25);
        assert_eq!(config.cpc_comparison, CeilingComparison::Above);
        assert_eq!(config.ctr_floor, 0.0075);
    }

    #[test]
    fn overrides_are_validated() {
        let overrides = ThresholdOverrides {
            cpc_ceiling: Some(-3.0),
            ..ThresholdOverrides::default()
        };
        assert!(overrides.apply(&ThresholdConfig::default()).is_err());
    }
}
