//! Economy configuration.
//!
//! Every cap, rate, and price the orchestrators consult lives here and
//! is passed in explicitly; there is no global economy state. The
//! compiled-in default matches the current league handbook; a JSON
//! file can override it wholesale.

use crate::error::PortalResult;
use crate::types::{Money, Season, Tpe};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingTier {
    pub tpe: Tpe,
    pub cost_standard: Money,
    pub cost_rookie: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachingConfig {
    pub cost_per_tpe_standard: Money,
    pub cost_per_tpe_rookie: Money,
    /// Maximum coaching TPE purchasable per season.
    pub season_cap_standard: Tpe,
    pub season_cap_rookie: Tpe,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Lowest balance any funded operation may leave behind. The
    /// default policy of 0 means no debt.
    pub overdraft_floor: Money,

    /// Seasonal ceiling on redistributed TPE per player.
    pub max_redistribution_tpe: Tpe,

    /// Largest refund a single regression submission may take beyond
    /// the amount the deficit requires.
    pub excessive_regression_threshold: Tpe,

    /// Bank cost per redistributed TPE unit.
    pub redistribution_rate_standard: f64,
    pub redistribution_rate_rookie: f64,

    /// TPE granted by a weekly activity check.
    pub activity_check_tpe: Tpe,

    /// Training-camp grant by seasons since draft: index 0 covers the
    /// draft season and earlier, index 5 covers the fifth season on.
    pub training_camp_grants: [Tpe; 6],

    pub training_tiers: Vec<TrainingTier>,
    pub coaching: CoachingConfig,

    /// A player counts as a rookie through this many seasons past
    /// their draft season.
    pub rookie_window: Season,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            overdraft_floor: 0,
            max_redistribution_tpe: 150,
            excessive_regression_threshold: 50,
            redistribution_rate_standard: 1.0,
            redistribution_rate_rookie: 0.5,
            activity_check_tpe: 6,
            training_camp_grants: [30, 24, 18, 12, 8, 4],
            training_tiers: vec![
                TrainingTier {
                    tpe: 1,
                    cost_standard: 250_000,
                    cost_rookie: 100_000,
                },
                TrainingTier {
                    tpe: 3,
                    cost_standard: 750_000,
                    cost_rookie: 300_000,
                },
                TrainingTier {
                    tpe: 5,
                    cost_standard: 1_500_000,
                    cost_rookie: 600_000,
                },
            ],
            coaching: CoachingConfig {
                cost_per_tpe_standard: 100_000,
                cost_per_tpe_rookie: 50_000,
                season_cap_standard: 10,
                season_cap_rookie: 20,
            },
            rookie_window: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct EconomyConfigFile {
    economy: EconomyConfig,
}

impl EconomyConfig {
    /// Load from a JSON file of the shape `{"economy": {...}}`.
    pub fn load(path: &Path) -> PortalResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let file: EconomyConfigFile = serde_json::from_str(&raw)?;
        Ok(file.economy)
    }

    pub fn training_tier(&self, tpe: Tpe) -> Option<&TrainingTier> {
        self.training_tiers.iter().find(|t| t.tpe == tpe)
    }

    pub fn training_camp_grant(&self, seasons_since_draft: Season) -> Tpe {
        let idx = seasons_since_draft.clamp(0, 5) as usize;
        self.training_camp_grants[idx]
    }

    pub fn redistribution_fee(&self, delta: Tpe, rookie: bool) -> Money {
        let rate = if rookie {
            self.redistribution_rate_rookie
        } else {
            self.redistribution_rate_standard
        };
        (delta as f64 * rate).ceil() as Money
    }
}
