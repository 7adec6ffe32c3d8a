//! Available-TPE calculator and the four attribute edit modes.
//!
//! The balance formula never varies: available = total - applied.
//! What each mode changes is the *legal range* of a rating during an
//! edit, and the condition under which the edited sheet may be
//! committed.

use crate::attributes::{
    bounds, diff_sheets, validate_sheet, Attribute, Position, RatingChange, RatingSheet,
};
use crate::costs;
use crate::error::ValidationError;
use crate::types::Tpe;

/// Sum of the cumulative cost of every rating in the sheet. The sheet
/// must cover the position's attribute set exactly.
pub fn applied_tpe(position: Position, sheet: &RatingSheet) -> Result<Tpe, ValidationError> {
    validate_sheet(position, sheet)?;
    let class = position.class();
    Ok(sheet
        .values()
        .map(|&rating| costs::total_cost(class, rating))
        .sum())
}

/// Spendable remainder: granted TPE minus the cost of the current
/// ratings. Negative when an external ceiling reduction has left the
/// player over-applied.
pub fn available_tpe(
    position: Position,
    total_tpe: Tpe,
    sheet: &RatingSheet,
) -> Result<Tpe, ValidationError> {
    Ok(total_tpe - applied_tpe(position, sheet)?)
}

/// The mutually exclusive editing modes. Constructed only through
/// `parse` or the variants themselves; an unrecognised mode string is
/// rejected at the edge rather than falling through to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Create,
    Update,
    Redistribute,
    Regress,
}

impl EditMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditMode::Create => "create",
            EditMode::Update => "update",
            EditMode::Redistribute => "redistribute",
            EditMode::Regress => "regress",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "create" => Ok(EditMode::Create),
            "update" => Ok(EditMode::Update),
            "redistribute" => Ok(EditMode::Redistribute),
            "regress" => Ok(EditMode::Regress),
            other => Err(ValidationError::UnknownEditMode(other.to_string())),
        }
    }

    /// Lowest rating the editor may set for one attribute.
    pub fn floor(&self, position: Position, attribute: Attribute, current: u8, available: Tpe) -> u8 {
        let (min, _) = bounds(position, attribute);
        match self {
            EditMode::Create | EditMode::Redistribute => min,
            EditMode::Update => current,
            // Reduction is only open while the allowance is in deficit;
            // once covered, the floor snaps back to the committed value.
            EditMode::Regress => {
                if available < 0 {
                    min
                } else {
                    current
                }
            }
        }
    }

    /// Highest rating the editor may set for one attribute, given the
    /// remaining balance.
    pub fn ceiling(&self, position: Position, attribute: Attribute, current: u8, available: Tpe) -> u8 {
        let (min, max) = bounds(position, attribute);
        match self {
            EditMode::Create | EditMode::Update => {
                let class = position.class();
                let mut rating = current.max(min);
                while rating < max
                    && costs::transition_cost(class, current, rating + 1) <= available
                {
                    rating += 1;
                }
                rating
            }
            EditMode::Redistribute | EditMode::Regress => current,
        }
    }
}

/// Validate an edited sheet against its mode's range rules and
/// finalisation condition. Returns the per-attribute change records
/// on success. Regression's deficit/excess guards need the player's
/// stored state and live in the redistribution engine; this check
/// covers the rating-range and balance rules shared by all callers.
pub fn validate_submission(
    mode: EditMode,
    position: Position,
    total_tpe: Tpe,
    old: &RatingSheet,
    new: &RatingSheet,
) -> Result<Vec<RatingChange>, ValidationError> {
    validate_sheet(position, new)?;

    let changes = diff_sheets(old, new);
    for change in &changes {
        match mode {
            // Any in-bounds rating is reachable from a fresh sheet.
            EditMode::Create => {}
            EditMode::Update => {
                if change.new_rating < change.old_rating {
                    return Err(ValidationError::RatingBelowFloor {
                        attribute: change.attribute.as_str(),
                        current: change.old_rating,
                        requested: change.new_rating,
                        mode: mode.as_str(),
                    });
                }
            }
            EditMode::Redistribute | EditMode::Regress => {
                if change.new_rating > change.old_rating {
                    return Err(ValidationError::RatingAboveCeiling {
                        attribute: change.attribute.as_str(),
                        current: change.old_rating,
                        requested: change.new_rating,
                        mode: mode.as_str(),
                    });
                }
            }
        }
    }

    let available = available_tpe(position, total_tpe, new)?;
    match mode {
        EditMode::Create => {
            if available < 0 {
                return Err(ValidationError::InsufficientTpe { available });
            }
            if available != 0 {
                return Err(ValidationError::UnbalancedCreate {
                    remaining: available,
                });
            }
        }
        EditMode::Update | EditMode::Redistribute => {
            if available < 0 {
                return Err(ValidationError::InsufficientTpe { available });
            }
        }
        EditMode::Regress => {
            if available < 0 {
                return Err(ValidationError::RegressionIncomplete {
                    remaining: available,
                });
            }
        }
    }

    Ok(changes)
}
