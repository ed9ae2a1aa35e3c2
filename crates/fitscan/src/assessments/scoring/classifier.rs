use serde::{Deserialize, Serialize};

use super::super::domain::RiskTier;

/// Strategy mapping a percentage in `[0, 100]` to a tier.
///
/// Implementations receive already-clamped input from [`classify`].
pub trait RiskThresholdPolicy {
    fn tier_for(&self, percentage: f64) -> RiskTier;
}

/// Lower bounds (inclusive) of the Moderate and High tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub moderate_from: f64,
    pub high_from: f64,
}

impl RiskThresholds {
    pub const STANDARD: RiskThresholds = RiskThresholds {
        moderate_from: 40.0,
        high_from: 70.0,
    };

    pub fn is_valid(&self) -> bool {
        self.moderate_from.is_finite()
            && self.high_from.is_finite()
            && (0.0..=100.0).contains(&self.moderate_from)
            && (0.0..=100.0).contains(&self.high_from)
            && self.moderate_from <= self.high_from
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl RiskThresholdPolicy for RiskThresholds {
    fn tier_for(&self, percentage: f64) -> RiskTier {
        if percentage >= self.high_from {
            RiskTier::High
        } else if percentage >= self.moderate_from {
            RiskTier::Moderate
        } else {
            RiskTier::Low
        }
    }
}

/// Classify a percentage, using [`RiskThresholds::STANDARD`] when no policy is given.
///
/// Total over every `f64`: values outside `[0, 100]` are clamped and NaN counts as zero.
pub fn classify(percentage: f64, policy: Option<&dyn RiskThresholdPolicy>) -> RiskTier {
    let percentage = clamp_percentage(percentage);
    match policy {
        Some(policy) => policy.tier_for(percentage),
        None => RiskThresholds::STANDARD.tier_for(percentage),
    }
}

fn clamp_percentage(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}
