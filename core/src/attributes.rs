//! Player positions, attribute sets, and rating sheets.
//!
//! Skater and goalkeeper attribute sets are disjoint as sets, though a
//! few attribute names (passing, puck handling, positioning) exist in
//! both. Evaluating a sheet against the wrong position's set is a
//! defect, so every entry point validates set membership first.

use crate::costs::{MAX_RATING, MIN_RATING};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cost-table selector: goalkeepers price differently from skaters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionClass {
    Skater,
    Goalkeeper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Center,
    LeftWing,
    RightWing,
    Defense,
    Goalie,
}

impl Position {
    pub fn class(&self) -> PositionClass {
        match self {
            Position::Goalie => PositionClass::Goalkeeper,
            _ => PositionClass::Skater,
        }
    }

    pub fn attribute_set(&self) -> &'static [Attribute] {
        match self.class() {
            PositionClass::Skater => SKATER_ATTRIBUTES,
            PositionClass::Goalkeeper => GOALIE_ATTRIBUTES,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Center => "center",
            Position::LeftWing => "left_wing",
            Position::RightWing => "right_wing",
            Position::Defense => "defense",
            Position::Goalie => "goalie",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "center" => Ok(Position::Center),
            "left_wing" => Ok(Position::LeftWing),
            "right_wing" => Ok(Position::RightWing),
            "defense" => Ok(Position::Defense),
            "goalie" => Ok(Position::Goalie),
            other => Err(ValidationError::UnknownPosition(other.to_string())),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    // Skater
    Screening,
    GettingOpen,
    Passing,
    PuckHandling,
    ShootingAccuracy,
    ShootingRange,
    OffensiveRead,
    Checking,
    Hitting,
    Positioning,
    StickChecking,
    ShotBlocking,
    Faceoffs,
    DefensiveRead,
    Acceleration,
    Agility,
    Balance,
    Speed,
    Stamina,
    Strength,
    Fighting,
    // Goalkeeper
    Blocker,
    Glove,
    LowShots,
    Reflexes,
    Skating,
    PokeCheck,
    Rebound,
    Recovery,
    HandSpeed,
    MentalToughness,
}

pub static SKATER_ATTRIBUTES: &[Attribute] = &[
    Attribute::Screening,
    Attribute::GettingOpen,
    Attribute::Passing,
    Attribute::PuckHandling,
    Attribute::ShootingAccuracy,
    Attribute::ShootingRange,
    Attribute::OffensiveRead,
    Attribute::Checking,
    Attribute::Hitting,
    Attribute::Positioning,
    Attribute::StickChecking,
    Attribute::ShotBlocking,
    Attribute::Faceoffs,
    Attribute::DefensiveRead,
    Attribute::Acceleration,
    Attribute::Agility,
    Attribute::Balance,
    Attribute::Speed,
    Attribute::Stamina,
    Attribute::Strength,
    Attribute::Fighting,
];

pub static GOALIE_ATTRIBUTES: &[Attribute] = &[
    Attribute::Blocker,
    Attribute::Glove,
    Attribute::LowShots,
    Attribute::Reflexes,
    Attribute::Skating,
    Attribute::PokeCheck,
    Attribute::Positioning,
    Attribute::Passing,
    Attribute::PuckHandling,
    Attribute::Rebound,
    Attribute::Recovery,
    Attribute::HandSpeed,
    Attribute::MentalToughness,
];

impl Attribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Screening => "screening",
            Attribute::GettingOpen => "getting_open",
            Attribute::Passing => "passing",
            Attribute::PuckHandling => "puck_handling",
            Attribute::ShootingAccuracy => "shooting_accuracy",
            Attribute::ShootingRange => "shooting_range",
            Attribute::OffensiveRead => "offensive_read",
            Attribute::Checking => "checking",
            Attribute::Hitting => "hitting",
            Attribute::Positioning => "positioning",
            Attribute::StickChecking => "stick_checking",
            Attribute::ShotBlocking => "shot_blocking",
            Attribute::Faceoffs => "faceoffs",
            Attribute::DefensiveRead => "defensive_read",
            Attribute::Acceleration => "acceleration",
            Attribute::Agility => "agility",
            Attribute::Balance => "balance",
            Attribute::Speed => "speed",
            Attribute::Stamina => "stamina",
            Attribute::Strength => "strength",
            Attribute::Fighting => "fighting",
            Attribute::Blocker => "blocker",
            Attribute::Glove => "glove",
            Attribute::LowShots => "low_shots",
            Attribute::Reflexes => "reflexes",
            Attribute::Skating => "skating",
            Attribute::PokeCheck => "poke_check",
            Attribute::Rebound => "rebound",
            Attribute::Recovery => "recovery",
            Attribute::HandSpeed => "hand_speed",
            Attribute::MentalToughness => "mental_toughness",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        SKATER_ATTRIBUTES
            .iter()
            .chain(GOALIE_ATTRIBUTES.iter())
            .find(|a| a.as_str() == value)
            .copied()
            .ok_or_else(|| ValidationError::UnknownAttribute(value.to_string()))
    }

    /// The one display-subsidised attribute.
    pub fn is_subsidised(&self) -> bool {
        matches!(self, Attribute::Stamina)
    }
}

/// Position-specific `[min, max]` overrides, consulted before the
/// global `[5, 20]` range.
pub fn bounds(position: Position, attribute: Attribute) -> (u8, u8) {
    match (position, attribute) {
        (Position::Defense, Attribute::ShootingRange) => (MIN_RATING, 13),
        (Position::LeftWing | Position::RightWing, Attribute::Faceoffs) => (MIN_RATING, 16),
        _ => (MIN_RATING, MAX_RATING),
    }
}

/// A full set of ratings for one player, keyed by attribute.
pub type RatingSheet = BTreeMap<Attribute, u8>;

/// One attribute's before/after values, the unit written to the audit
/// trail by every committed edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingChange {
    pub attribute: Attribute,
    pub old_rating: u8,
    pub new_rating: u8,
}

/// Check that `sheet` covers the position's attribute set exactly and
/// that every rating sits inside its (possibly overridden) bounds.
pub fn validate_sheet(position: Position, sheet: &RatingSheet) -> Result<(), ValidationError> {
    let set = position.attribute_set();
    for attribute in sheet.keys() {
        if !set.contains(attribute) {
            return Err(ValidationError::ForeignAttribute {
                position: position.as_str(),
                attribute: attribute.as_str(),
            });
        }
    }
    for attribute in set {
        let Some(&rating) = sheet.get(attribute) else {
            return Err(ValidationError::MissingAttribute {
                position: position.as_str(),
                attribute: attribute.as_str(),
            });
        };
        let (min, max) = bounds(position, *attribute);
        if !(min..=max).contains(&rating) {
            return Err(ValidationError::RatingOutOfBounds {
                attribute: attribute.as_str(),
                rating,
                min,
                max,
            });
        }
    }
    Ok(())
}

/// Set-difference between a before and after sheet. Both sheets must
/// already be validated against the same position.
pub fn diff_sheets(old: &RatingSheet, new: &RatingSheet) -> Vec<RatingChange> {
    old.iter()
        .filter_map(|(attribute, &old_rating)| {
            let new_rating = *new.get(attribute)?;
            (new_rating != old_rating).then_some(RatingChange {
                attribute: *attribute,
                old_rating,
                new_rating,
            })
        })
        .collect()
}

/// A fresh sheet with every attribute at the position's floor.
pub fn base_sheet(position: Position) -> RatingSheet {
    position
        .attribute_set()
        .iter()
        .map(|a| (*a, bounds(position, *a).0))
        .collect()
}
