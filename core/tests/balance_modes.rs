//! Available-balance calculator and edit-mode range rules.

use leaguedesk_core::attributes::{base_sheet, Attribute, Position};
use leaguedesk_core::balance::{available_tpe, validate_submission, EditMode};
use leaguedesk_core::ValidationError;

// ─────────────────────────────────────────────────────────────────────────────
// Balance formula
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn base_sheet_costs_nothing() {
    let sheet = base_sheet(Position::Center);
    assert_eq!(available_tpe(Position::Center, 40, &sheet).unwrap(), 40);
}

#[test]
fn wrong_attribute_set_is_rejected() {
    let goalie_sheet = base_sheet(Position::Goalie);
    let err = available_tpe(Position::Center, 40, &goalie_sheet).unwrap_err();
    assert!(
        matches!(
            err,
            ValidationError::ForeignAttribute { .. } | ValidationError::MissingAttribute { .. }
        ),
        "evaluating a goalie sheet against a skater position must fail, got {err:?}"
    );
}

#[test]
fn positional_override_caps_defense_shooting_range() {
    let mut sheet = base_sheet(Position::Defense);
    sheet.insert(Attribute::ShootingRange, 14);
    let err = available_tpe(Position::Defense, 200, &sheet).unwrap_err();
    assert_eq!(
        err,
        ValidationError::RatingOutOfBounds {
            attribute: "shooting_range",
            rating: 14,
            min: 5,
            max: 13,
        }
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Create mode: exact-zero finalisation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn create_commits_only_at_exactly_zero() {
    let old = base_sheet(Position::Center);
    let mut new = base_sheet(Position::Center);
    new.insert(Attribute::Passing, 10); // costs 16

    let changes =
        validate_submission(EditMode::Create, Position::Center, 16, &old, &new).unwrap();
    assert_eq!(changes.len(), 1);

    let err = validate_submission(EditMode::Create, Position::Center, 17, &old, &new).unwrap_err();
    assert_eq!(err, ValidationError::UnbalancedCreate { remaining: 1 });

    let err = validate_submission(EditMode::Create, Position::Center, 15, &old, &new).unwrap_err();
    assert_eq!(err, ValidationError::InsufficientTpe { available: -1 });
}

// ─────────────────────────────────────────────────────────────────────────────
// Update mode: no regression through this path, remainder allowed
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn update_accepts_remainder_but_rejects_lowering() {
    let mut old = base_sheet(Position::Center);
    old.insert(Attribute::Passing, 10);
    let mut new = old.clone();
    new.insert(Attribute::Speed, 8); // +8 on top of passing's 16

    let changes =
        validate_submission(EditMode::Update, Position::Center, 30, &old, &new).unwrap();
    assert_eq!(changes.len(), 1, "only speed changed");

    let mut lowered = old.clone();
    lowered.insert(Attribute::Passing, 9);
    let err =
        validate_submission(EditMode::Update, Position::Center, 30, &old, &lowered).unwrap_err();
    assert_eq!(
        err,
        ValidationError::RatingBelowFloor {
            attribute: "passing",
            current: 10,
            requested: 9,
            mode: "update",
        }
    );
}

#[test]
fn update_over_budget_is_rejected_with_the_shortfall() {
    let old = base_sheet(Position::Center);
    let mut new = old.clone();
    new.insert(Attribute::Passing, 10); // 16 > 12
    let err = validate_submission(EditMode::Update, Position::Center, 12, &old, &new).unwrap_err();
    assert_eq!(err, ValidationError::InsufficientTpe { available: -4 });
}

// ─────────────────────────────────────────────────────────────────────────────
// Slider bounds per mode
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn update_ceiling_stops_where_the_next_increment_is_unaffordable() {
    // From 5 with 16 available: 10 is reachable (16), 11 (22) is not.
    let ceiling = EditMode::Update.ceiling(Position::Center, Attribute::Passing, 5, 16);
    assert_eq!(ceiling, 10);
    // One short of the 5 -> 10 total leaves the ceiling at 9.
    let ceiling = EditMode::Update.ceiling(Position::Center, Attribute::Passing, 5, 15);
    assert_eq!(ceiling, 9);
}

#[test]
fn redistribute_bounds_allow_only_decreases() {
    assert_eq!(
        EditMode::Redistribute.ceiling(Position::Center, Attribute::Passing, 12, 100),
        12
    );
    assert_eq!(
        EditMode::Redistribute.floor(Position::Center, Attribute::Passing, 12, 100),
        5
    );
}

#[test]
fn regress_floor_releases_only_while_in_deficit() {
    assert_eq!(
        EditMode::Regress.floor(Position::Center, Attribute::Passing, 12, -10),
        5,
        "negative allowance forces the floor open"
    );
    assert_eq!(
        EditMode::Regress.floor(Position::Center, Attribute::Passing, 12, 0),
        12,
        "covered deficit snaps the floor back to the committed value"
    );
    assert_eq!(
        EditMode::Regress.ceiling(Position::Center, Attribute::Passing, 12, -10),
        12
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Mode parsing rejects the unknown fifth case at the edge
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn unknown_mode_strings_are_rejected_at_parse_time() {
    assert_eq!(EditMode::parse("regress").unwrap(), EditMode::Regress);
    let err = EditMode::parse("recalibrate").unwrap_err();
    assert_eq!(err, ValidationError::UnknownEditMode("recalibrate".into()));
}
