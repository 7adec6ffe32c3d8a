use crate::auth::Capability;
use crate::types::{Money, PlayerId, Tpe, UserId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("actor {actor} lacks the {capability} capability")]
    Unauthorized { actor: UserId, capability: Capability },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// The store aborted the enclosing transaction (SQLITE_BUSY /
    /// SQLITE_LOCKED). Callers retry once, then surface.
    #[error("storage conflict, transaction rolled back: {0}")]
    Concurrency(String),

    #[error("database error: {0}")]
    Database(rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PortalError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        PortalError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

// SQLITE_BUSY / SQLITE_LOCKED are the retryable class; everything else
// is a plain database failure.
impl From<rusqlite::Error> for PortalError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if matches!(
                    e.code,
                    ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
                ) =>
            {
                PortalError::Concurrency(err.to_string())
            }
            _ => PortalError::Database(err),
        }
    }
}

pub type PortalResult<T> = Result<T, PortalError>;

/// A business rule was violated. Every variant names the rule and the
/// numbers that bound it, so the caller can render an actionable
/// message. Values are never silently clamped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("insufficient funds: balance {balance} cannot cover {required} (floor {floor})")]
    InsufficientFunds {
        balance: Money,
        required: Money,
        floor: Money,
    },

    #[error("build is over budget: available TPE is {available}")]
    InsufficientTpe { available: Tpe },

    #[error("create build must spend the full allowance, {remaining} TPE left unspent")]
    UnbalancedCreate { remaining: Tpe },

    #[error("{attribute} rating {rating} outside allowed range [{min}, {max}]")]
    RatingOutOfBounds {
        attribute: &'static str,
        rating: u8,
        min: u8,
        max: u8,
    },

    #[error("{attribute} below its committed value ({current} -> {requested}) in {mode} mode")]
    RatingBelowFloor {
        attribute: &'static str,
        current: u8,
        requested: u8,
        mode: &'static str,
    },

    #[error("{attribute} above its committed value ({current} -> {requested}) in {mode} mode")]
    RatingAboveCeiling {
        attribute: &'static str,
        current: u8,
        requested: u8,
        mode: &'static str,
    },

    #[error("attribute {attribute} does not belong to the {position} rating set")]
    ForeignAttribute {
        position: &'static str,
        attribute: &'static str,
    },

    #[error("attribute {attribute} missing from the {position} rating set")]
    MissingAttribute {
        position: &'static str,
        attribute: &'static str,
    },

    #[error(
        "seasonal redistribution limit exceeded: {used} already used, \
         this change would bring the total to {attempted} (cap {cap})"
    )]
    RedistributionCapExceeded { used: Tpe, attempted: Tpe, cap: Tpe },

    #[error("no attribute ratings were changed")]
    NoRatingsChanged,

    #[error("regression not required: available TPE is {available}")]
    RegressionNotRequired { available: Tpe },

    #[error("regression incomplete: available TPE would still be {remaining}")]
    RegressionIncomplete { remaining: Tpe },

    #[error(
        "excessive regression: refund {refund} exceeds the required {required} \
         by more than the {threshold} threshold"
    )]
    ExcessiveRegression {
        refund: Tpe,
        required: Tpe,
        threshold: Tpe,
    },

    #[error("{action} already claimed for the current period")]
    AlreadyClaimed { action: &'static str },

    #[error(
        "coaching cap exceeded: {purchased} TPE already purchased, \
         requested {requested} more (cap {cap})"
    )]
    CoachingCapExceeded {
        purchased: Tpe,
        requested: Tpe,
        cap: Tpe,
    },

    #[error("no training tier grants {tpe} TPE")]
    UnknownTrainingTier { tpe: Tpe },

    #[error("purchase amount must be positive, got {amount}")]
    NonPositivePurchase { amount: Tpe },

    #[error("player {player_id} is {status}, not active")]
    PlayerNotActive {
        player_id: PlayerId,
        status: String,
    },

    #[error("transaction group has no lines")]
    EmptyTransactionGroup,

    #[error("transfer line for account {uid} must be positive, got {amount}")]
    NonPositiveTransferAmount { uid: UserId, amount: Money },

    #[error("cannot {action} a {status} transaction")]
    InvalidStatusTransition { status: String, action: String },

    #[error("unknown edit mode '{0}'")]
    UnknownEditMode(String),

    #[error("unknown transaction type '{0}'")]
    UnknownTransactionType(String),

    #[error("unknown transaction status '{0}'")]
    UnknownTransactionStatus(String),

    #[error("unknown position '{0}'")]
    UnknownPosition(String),

    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),

    #[error("unknown player status '{0}'")]
    UnknownPlayerStatus(String),
}
