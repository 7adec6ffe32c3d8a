//! Committed attribute edits: create/update builds, paid
//! redistribution under the seasonal cap, and forced regression.

use leaguedesk_core::attributes::{base_sheet, Attribute, Position, RatingSheet};
use leaguedesk_core::auth::{Capability, RoleTable};
use leaguedesk_core::balance::EditMode;
use leaguedesk_core::bank::{StatusAction, TransactionLine, TransactionType, TxTarget};
use leaguedesk_core::config::EconomyConfig;
use leaguedesk_core::types::SeasonContext;
use leaguedesk_core::{LeaguePortal, PortalError, ValidationError};

const ADMIN: i64 = 1;
const OWNER: i64 = 7;

fn build(config: EconomyConfig) -> LeaguePortal<RoleTable> {
    let mut roles = RoleTable::new();
    roles
        .grant(ADMIN, Capability::ApproveTransactions)
        .grant(ADMIN, Capability::ManageLedger)
        .grant(ADMIN, Capability::ManagePlayers);
    LeaguePortal::in_memory(config, roles).expect("in-memory portal")
}

fn fund(portal: &mut LeaguePortal<RoleTable>, uid: i64, amount: i64) {
    let group = portal
        .create_transaction_group(
            ADMIN,
            TransactionType::JobPay,
            "payroll",
            &[TransactionLine {
                uid,
                amount,
                description: "seed funds".to_string(),
            }],
        )
        .expect("seed group");
    portal
        .set_transaction_status(
            ADMIN,
            &TxTarget::Group(group.group_id.clone()),
            StatusAction::Approve,
        )
        .expect("seed approval");
}

/// Player with checking and hitting committed at 14 (applied 92).
fn player_with_two_fourteens(
    portal: &mut LeaguePortal<RoleTable>,
    draft_season: i64,
    ctx: &SeasonContext,
) -> i64 {
    let player = portal
        .store_mut()
        .create_player(OWNER, "Test Player", Position::Center, draft_season)
        .unwrap();
    portal
        .store_mut()
        .grant_tpe(player, 92, "seed", "career earnings")
        .unwrap();
    let mut sheet = base_sheet(Position::Center);
    sheet.insert(Attribute::Checking, 14);
    sheet.insert(Attribute::Hitting, 14);
    portal
        .validate_and_commit_build(ctx, OWNER, player, EditMode::Create, &sheet)
        .unwrap();
    player
}

fn lowered_to_tens(portal: &LeaguePortal<RoleTable>, player: i64) -> RatingSheet {
    let mut sheet = portal.store().ratings(player).unwrap();
    sheet.insert(Attribute::Checking, 10);
    sheet.insert(Attribute::Hitting, 10);
    sheet
}

// ─────────────────────────────────────────────────────────────────────────────
// Create and update builds
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn create_build_commits_at_exact_zero_and_records_the_audit_trail() {
    let mut portal = build(EconomyConfig::default());
    let ctx = SeasonContext::new(12, 1);
    let player = player_with_two_fourteens(&mut portal, 12, &ctx);

    let progression = portal.store().progression(player).unwrap();
    assert_eq!(progression.applied_tpe, 92);
    assert_eq!(progression.banked_tpe, 0);

    let audit = portal.store().attribute_changes_for(player).unwrap();
    assert_eq!(audit.len(), 2);
    assert!(audit.iter().all(|c| c.kind == "create"));
}

#[test]
fn create_build_rejects_an_unspent_remainder() {
    let mut portal = build(EconomyConfig::default());
    let ctx = SeasonContext::new(12, 1);
    let player = portal
        .store_mut()
        .create_player(OWNER, "Test Player", Position::Center, 12)
        .unwrap();
    portal
        .store_mut()
        .grant_tpe(player, 20, "seed", "career earnings")
        .unwrap();

    let mut sheet = base_sheet(Position::Center);
    sheet.insert(Attribute::Passing, 10); // 16 of 20
    let err = portal
        .validate_and_commit_build(&ctx, OWNER, player, EditMode::Create, &sheet)
        .unwrap_err();
    assert!(matches!(
        err,
        PortalError::Validation(ValidationError::UnbalancedCreate { remaining: 4 })
    ));
}

#[test]
fn update_banks_the_remainder() {
    let mut portal = build(EconomyConfig::default());
    let ctx = SeasonContext::new(12, 1);
    let player = portal
        .store_mut()
        .create_player(OWNER, "Test Player", Position::Center, 12)
        .unwrap();
    portal
        .store_mut()
        .grant_tpe(player, 20, "seed", "career earnings")
        .unwrap();

    let mut sheet = base_sheet(Position::Center);
    sheet.insert(Attribute::Passing, 10); // 16 of 20
    let changes = portal
        .validate_and_commit_build(&ctx, OWNER, player, EditMode::Update, &sheet)
        .unwrap();
    assert_eq!(changes.len(), 1);

    let progression = portal.store().progression(player).unwrap();
    assert_eq!(progression.applied_tpe, 16);
    assert_eq!(progression.banked_tpe, 4, "positive remainder is banked");
}

// ─────────────────────────────────────────────────────────────────────────────
// Redistribution: worked rookie scenario
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn rookie_redistribution_charges_half_rate_and_burns_allowance() {
    let mut portal = build(EconomyConfig::default());
    let ctx = SeasonContext::new(12, 1);
    let player = player_with_two_fourteens(&mut portal, 12, &ctx);
    fund(&mut portal, OWNER, 100);

    // Two attributes 14 -> 10: refund 30 each, delta 60, rookie fee 30.
    let sheet = lowered_to_tens(&portal, player);
    let changes = portal
        .validate_and_commit_redistribution(&ctx, OWNER, player, &sheet)
        .unwrap();
    assert_eq!(changes.len(), 2);

    assert_eq!(portal.balance_of(OWNER).unwrap(), 70, "fee of 30 debited");
    let progression = portal.store().progression(player).unwrap();
    assert_eq!(progression.used_redistribution, 60);
    assert_eq!(progression.applied_tpe, 32);
    assert_eq!(progression.banked_tpe, 60, "freed TPE returns to the pool");

    let audit = portal.store().attribute_changes_for(player).unwrap();
    let redistributions: Vec<_> =
        audit.iter().filter(|c| c.kind == "redistribution").collect();
    assert_eq!(redistributions.len(), 2);
    assert!(redistributions
        .iter()
        .all(|c| c.old_rating == 14 && c.new_rating == 10));
}

#[test]
fn veteran_redistribution_pays_the_full_rate() {
    let mut portal = build(EconomyConfig::default());
    let ctx = SeasonContext::new(12, 1);
    let player = player_with_two_fourteens(&mut portal, 10, &ctx);
    fund(&mut portal, OWNER, 100);

    let sheet = lowered_to_tens(&portal, player);
    portal
        .validate_and_commit_redistribution(&ctx, OWNER, player, &sheet)
        .unwrap();
    assert_eq!(portal.balance_of(OWNER).unwrap(), 40, "fee of 60 at full rate");
}

#[test]
fn redistribution_over_the_seasonal_cap_reports_both_bounds() {
    let config = EconomyConfig {
        max_redistribution_tpe: 50,
        ..EconomyConfig::default()
    };
    let mut portal = build(config);
    let ctx = SeasonContext::new(12, 1);
    let player = player_with_two_fourteens(&mut portal, 12, &ctx);
    fund(&mut portal, OWNER, 100);

    let sheet = lowered_to_tens(&portal, player);
    let err = portal
        .validate_and_commit_redistribution(&ctx, OWNER, player, &sheet)
        .unwrap_err();
    assert!(
        matches!(
            err,
            PortalError::Validation(ValidationError::RedistributionCapExceeded {
                used: 0,
                attempted: 60,
                cap: 50,
            })
        ),
        "cap rejection must report used and attempted, got {err:?}"
    );
    assert_eq!(
        portal.store().progression(player).unwrap().used_redistribution,
        0,
        "nothing burned on rejection"
    );
    assert_eq!(portal.balance_of(OWNER).unwrap(), 100);
}

#[test]
fn redistribution_without_fee_funding_is_rejected() {
    let mut portal = build(EconomyConfig::default());
    let ctx = SeasonContext::new(12, 1);
    let player = player_with_two_fourteens(&mut portal, 12, &ctx);

    let sheet = lowered_to_tens(&portal, player);
    let err = portal
        .validate_and_commit_redistribution(&ctx, OWNER, player, &sheet)
        .unwrap_err();
    assert!(matches!(
        err,
        PortalError::Validation(ValidationError::InsufficientFunds {
            balance: 0,
            required: 30,
            floor: 0,
        })
    ));
}

#[test]
fn redistribution_cannot_raise_a_rating() {
    let mut portal = build(EconomyConfig::default());
    let ctx = SeasonContext::new(12, 1);
    let player = player_with_two_fourteens(&mut portal, 12, &ctx);
    fund(&mut portal, OWNER, 100);

    let mut sheet = portal.store().ratings(player).unwrap();
    sheet.insert(Attribute::Checking, 15);
    let err = portal
        .validate_and_commit_redistribution(&ctx, OWNER, player, &sheet)
        .unwrap_err();
    assert!(matches!(
        err,
        PortalError::Validation(ValidationError::RatingAboveCeiling { .. })
    ));
}

#[test]
fn allowance_accumulates_across_submissions() {
    let mut portal = build(EconomyConfig::default());
    let ctx = SeasonContext::new(12, 1);
    let player = player_with_two_fourteens(&mut portal, 12, &ctx);
    fund(&mut portal, OWNER, 200);

    let mut sheet = portal.store().ratings(player).unwrap();
    sheet.insert(Attribute::Checking, 10); // delta 30
    portal
        .validate_and_commit_redistribution(&ctx, OWNER, player, &sheet)
        .unwrap();
    sheet.insert(Attribute::Hitting, 10); // another 30
    portal
        .validate_and_commit_redistribution(&ctx, OWNER, player, &sheet)
        .unwrap();
    assert_eq!(
        portal.store().progression(player).unwrap().used_redistribution,
        60
    );

    // Season rollover hands the allowance back.
    portal.store_mut().season_rollover().unwrap();
    assert_eq!(
        portal.store().progression(player).unwrap().used_redistribution,
        0
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Regression: forced, unpaid, bounded
// ─────────────────────────────────────────────────────────────────────────────

/// Player applied at 46 whose ceiling then drops by 20.
fn over_applied_player(portal: &mut LeaguePortal<RoleTable>, ctx: &SeasonContext) -> i64 {
    let player = portal
        .store_mut()
        .create_player(OWNER, "Test Player", Position::Center, 10)
        .unwrap();
    portal
        .store_mut()
        .grant_tpe(player, 46, "seed", "career earnings")
        .unwrap();
    let mut sheet = base_sheet(Position::Center);
    sheet.insert(Attribute::Checking, 14);
    portal
        .validate_and_commit_build(ctx, OWNER, player, EditMode::Create, &sheet)
        .unwrap();
    portal
        .store_mut()
        .grant_tpe(player, -20, "seasonal_decay", "TPE ceiling reduction")
        .unwrap();
    player
}

#[test]
fn regression_restores_a_non_negative_allowance_without_moving_money() {
    let mut portal = build(EconomyConfig::default());
    let ctx = SeasonContext::new(13, 1);
    let player = over_applied_player(&mut portal, &ctx);

    let statement_before = portal.store().account_statement(OWNER).unwrap().len();

    let mut sheet = portal.store().ratings(player).unwrap();
    sheet.insert(Attribute::Checking, 10); // refund 30 against a 20 deficit
    let changes = portal
        .validate_and_commit_regression(&ctx, OWNER, player, &sheet)
        .unwrap();
    assert_eq!(changes.len(), 1);

    let progression = portal.store().progression(player).unwrap();
    assert_eq!(progression.applied_tpe, 16);
    assert_eq!(progression.banked_tpe, 10);

    assert_eq!(
        portal.store().account_statement(OWNER).unwrap().len(),
        statement_before,
        "pure regression never writes a ledger line"
    );
    let audit = portal.store().attribute_changes_for(player).unwrap();
    assert!(audit.iter().any(|c| c.kind == "regression"));
}

#[test]
fn regression_is_rejected_when_not_in_deficit() {
    let mut portal = build(EconomyConfig::default());
    let ctx = SeasonContext::new(12, 1);
    let player = player_with_two_fourteens(&mut portal, 12, &ctx);

    let sheet = lowered_to_tens(&portal, player);
    let err = portal
        .validate_and_commit_regression(&ctx, OWNER, player, &sheet)
        .unwrap_err();
    assert!(matches!(
        err,
        PortalError::Validation(ValidationError::RegressionNotRequired { available: 0 })
    ));
}

#[test]
fn partial_regression_reports_the_remaining_deficit() {
    let mut portal = build(EconomyConfig::default());
    let ctx = SeasonContext::new(13, 1);
    let player = over_applied_player(&mut portal, &ctx);

    let mut sheet = portal.store().ratings(player).unwrap();
    sheet.insert(Attribute::Checking, 13); // refund 8 of the 20 needed
    let err = portal
        .validate_and_commit_regression(&ctx, OWNER, player, &sheet)
        .unwrap_err();
    assert!(matches!(
        err,
        PortalError::Validation(ValidationError::RegressionIncomplete { remaining: -12 })
    ));
}

#[test]
fn regression_far_beyond_the_deficit_is_rejected() {
    let config = EconomyConfig {
        excessive_regression_threshold: 5,
        ..EconomyConfig::default()
    };
    let mut portal = build(config);
    let ctx = SeasonContext::new(13, 1);
    let player = over_applied_player(&mut portal, &ctx);

    let mut sheet = portal.store().ratings(player).unwrap();
    sheet.insert(Attribute::Checking, 10); // refund 30, 10 over the deficit
    let err = portal
        .validate_and_commit_regression(&ctx, OWNER, player, &sheet)
        .unwrap_err();
    assert!(matches!(
        err,
        PortalError::Validation(ValidationError::ExcessiveRegression {
            refund: 30,
            required: 20,
            threshold: 5,
        })
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Facade balance calculator
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn facade_exposes_the_available_tpe_calculator() {
    let mut sheet = base_sheet(Position::Center);
    sheet.insert(Attribute::Passing, 10);
    let available =
        LeaguePortal::<RoleTable>::compute_available_tpe(Position::Center, 40, &sheet).unwrap();
    assert_eq!(available, 24);
}
