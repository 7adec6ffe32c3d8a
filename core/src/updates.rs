//! Attribute edit commits: create/update builds, paid redistribution,
//! and forced regression.
//!
//! Each commit validates the edited sheet against its mode's range
//! rules, then writes ratings, the applied/banked split, and one
//! audit row per changed attribute inside a single transaction.
//! Redistribution additionally debits the bank and burns seasonal
//! allowance; regression moves no currency at all.

use crate::attributes::{base_sheet, RatingChange, RatingSheet};
use crate::balance::{self, EditMode};
use crate::bank::{TransactionStatus, TransactionType};
use crate::config::EconomyConfig;
use crate::error::{PortalResult, ValidationError};
use crate::store::{
    self, bank as bank_store, progression as prog_store, NewBankTransaction, PlayerRow,
    ProgressionRow,
};
use crate::types::{PlayerId, PlayerStatus, Season, SeasonContext, Tpe, UserId};
use rusqlite::Transaction;

fn load_active_player(
    tx: &Transaction<'_>,
    player_id: PlayerId,
) -> PortalResult<(PlayerRow, ProgressionRow, RatingSheet)> {
    let player = prog_store::get_player(tx, player_id)?;
    if player.status != PlayerStatus::Active {
        return Err(ValidationError::PlayerNotActive {
            player_id,
            status: player.status.as_str().to_string(),
        }
        .into());
    }
    let progression = prog_store::get_progression(tx, player_id)?;
    let ratings = prog_store::get_ratings(tx, player_id)?;
    Ok((player, progression, ratings))
}

fn write_sheet(
    tx: &Transaction<'_>,
    player_id: PlayerId,
    season: Season,
    kind: &str,
    new_sheet: &RatingSheet,
    changes: &[RatingChange],
    applied: Tpe,
) -> PortalResult<()> {
    prog_store::set_ratings(tx, player_id, new_sheet)?;
    for change in changes {
        prog_store::insert_attribute_change(tx, player_id, season, kind, change)?;
    }
    prog_store::set_applied_tpe(tx, player_id, applied)?;
    Ok(())
}

/// Commit a create- or update-mode submission. Create demands the
/// allowance be spent exactly; update banks any positive remainder.
pub fn apply_build(
    store: &mut store::LeagueStore,
    _config: &EconomyConfig,
    ctx: &SeasonContext,
    _actor: UserId,
    player_id: PlayerId,
    mode: EditMode,
    new_sheet: &RatingSheet,
) -> PortalResult<Vec<RatingChange>> {
    debug_assert!(
        matches!(mode, EditMode::Create | EditMode::Update),
        "apply_build only commits create/update submissions"
    );
    let season = ctx.season;

    store.with_tx(|tx| {
        let (player, progression, stored) = load_active_player(tx, player_id)?;
        let old = if stored.is_empty() {
            base_sheet(player.position)
        } else {
            stored
        };

        let changes = balance::validate_submission(
            mode,
            player.position,
            progression.total_tpe,
            &old,
            new_sheet,
        )?;
        if changes.is_empty() && mode == EditMode::Update {
            return Err(ValidationError::NoRatingsChanged.into());
        }

        let applied = balance::applied_tpe(player.position, new_sheet)?;
        write_sheet(tx, player_id, season, mode.as_str(), new_sheet, &changes, applied)?;

        log::info!(
            "player {player_id}: {} committed, {} change(s), applied {applied}/{}",
            mode.as_str(),
            changes.len(),
            progression.total_tpe
        );
        Ok(changes)
    })
}

/// Commit a redistribution: lowered ratings only, freed TPE back to
/// the available pool, a bank fee on the moved amount, and seasonal
/// allowance burned one way until rollover.
pub fn redistribute(
    store: &mut store::LeagueStore,
    config: &EconomyConfig,
    ctx: &SeasonContext,
    actor: UserId,
    player_id: PlayerId,
    new_sheet: &RatingSheet,
) -> PortalResult<Vec<RatingChange>> {
    let season = ctx.season;

    store.with_tx(|tx| {
        let (player, progression, old) = load_active_player(tx, player_id)?;

        let changes = balance::validate_submission(
            EditMode::Redistribute,
            player.position,
            progression.total_tpe,
            &old,
            new_sheet,
        )?;
        if changes.is_empty() {
            return Err(ValidationError::NoRatingsChanged.into());
        }

        let applied_old = balance::applied_tpe(player.position, &old)?;
        let applied_new = balance::applied_tpe(player.position, new_sheet)?;
        let delta = applied_old - applied_new;

        let cap = config.max_redistribution_tpe;
        let attempted = progression.used_redistribution + delta;
        if attempted > cap {
            return Err(ValidationError::RedistributionCapExceeded {
                used: progression.used_redistribution,
                attempted,
                cap,
            }
            .into());
        }

        let rookie = player.is_rookie(season, config.rookie_window);
        let fee = config.redistribution_fee(delta, rookie);
        let balance = bank_store::balance_of(tx, player.user_id)?;
        if balance - fee < config.overdraft_floor {
            return Err(ValidationError::InsufficientFunds {
                balance,
                required: fee,
                floor: config.overdraft_floor,
            }
            .into());
        }

        let description = format!("S{season} attribute redistribution ({delta} TPE)");
        bank_store::insert(
            tx,
            &NewBankTransaction {
                uid: player.user_id,
                amount: -fee,
                kind: TransactionType::Other,
                description: &description,
                group_name: None,
                group_id: None,
                status: TransactionStatus::Completed,
                submit_by: actor,
                approved_by: Some(actor),
            },
        )?;

        write_sheet(
            tx,
            player_id,
            season,
            "redistribution",
            new_sheet,
            &changes,
            applied_new,
        )?;
        prog_store::add_used_redistribution(tx, player_id, delta)?;

        log::info!(
            "player {player_id}: redistributed {delta} TPE for {fee} (seasonal total {attempted}/{cap})"
        );
        Ok(changes)
    })
}

/// Commit a regression: permitted only while the player is applied
/// over their ceiling, must restore a non-negative allowance, and may
/// not refund far beyond what the deficit requires. No money moves.
pub fn regress(
    store: &mut store::LeagueStore,
    config: &EconomyConfig,
    ctx: &SeasonContext,
    _actor: UserId,
    player_id: PlayerId,
    new_sheet: &RatingSheet,
) -> PortalResult<Vec<RatingChange>> {
    let season = ctx.season;

    store.with_tx(|tx| {
        let (player, progression, old) = load_active_player(tx, player_id)?;

        let applied_old = balance::applied_tpe(player.position, &old)?;
        let available_old = progression.total_tpe - applied_old;
        if available_old >= 0 {
            return Err(ValidationError::RegressionNotRequired {
                available: available_old,
            }
            .into());
        }

        let changes = balance::validate_submission(
            EditMode::Regress,
            player.position,
            progression.total_tpe,
            &old,
            new_sheet,
        )?;
        if changes.is_empty() {
            return Err(ValidationError::NoRatingsChanged.into());
        }

        let applied_new = balance::applied_tpe(player.position, new_sheet)?;
        let refund = applied_old - applied_new;
        let required = -available_old;
        let threshold = config.excessive_regression_threshold;
        if refund - required > threshold {
            return Err(ValidationError::ExcessiveRegression {
                refund,
                required,
                threshold,
            }
            .into());
        }

        write_sheet(
            tx,
            player_id,
            season,
            "regression",
            new_sheet,
            &changes,
            applied_new,
        )?;

        log::info!(
            "player {player_id}: regression refunded {refund} TPE against a {required} deficit"
        );
        Ok(changes)
    })
}
