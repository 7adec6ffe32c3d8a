//! Shared primitive types used across the whole portal core.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Forum account identifier. One user may own several players over a
/// career, but exactly one bank account.
pub type UserId = i64;

/// Player record identifier.
pub type PlayerId = i64;

/// Ledger row identifier (SQLite rowid).
pub type BankId = i64;

/// League currency, in whole dollars. Signed: debits are negative.
pub type Money = i64;

/// Progression currency ("TPE"). Signed in deltas, non-negative in
/// stored totals.
pub type Tpe = i64;

/// League season number.
pub type Season = i64;

/// The season/period context every orchestrated operation runs under.
/// Passed explicitly into each call; the core holds no global season
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonContext {
    pub season: Season,
    /// Week within the season; labels period-scoped grants.
    pub week: i64,
}

impl SeasonContext {
    pub fn new(season: Season, week: i64) -> Self {
        Self { season, week }
    }
}

/// Player record lifecycle state. Only `Active` players may spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    Active,
    Suspended,
    Retired,
}

impl PlayerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerStatus::Active => "active",
            PlayerStatus::Suspended => "suspended",
            PlayerStatus::Retired => "retired",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "active" => Ok(PlayerStatus::Active),
            "suspended" => Ok(PlayerStatus::Suspended),
            "retired" => Ok(PlayerStatus::Retired),
            other => Err(ValidationError::UnknownPlayerStatus(other.to_string())),
        }
    }
}
