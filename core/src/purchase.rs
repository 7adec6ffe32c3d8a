//! Purchase orchestrator: activity check, training, coaching, and
//! training camp.
//!
//! Every purchase runs as one database transaction. The period flag
//! is claimed by a guarded UPDATE inside that transaction, so two
//! concurrent requests for the same period can never both grant. When
//! a purchase costs money the debit row is inserted first and its id
//! becomes the progression event's `bank_id`.

use crate::bank::{TransactionStatus, TransactionType};
use crate::config::EconomyConfig;
use crate::error::{PortalResult, ValidationError};
use crate::store::{
    self, bank as bank_store, progression as prog_store, NewBankTransaction, NewTpeEvent,
    PeriodFlag,
};
use crate::types::{BankId, Money, PlayerId, PlayerStatus, SeasonContext, Tpe, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseAction {
    ActivityCheck,
    TrainingCamp,
    Training { tpe: Tpe },
    Coaching { tpe: Tpe },
}

impl PurchaseAction {
    pub fn task_type(&self) -> &'static str {
        match self {
            PurchaseAction::ActivityCheck => "activity_check",
            PurchaseAction::TrainingCamp => "training_camp",
            PurchaseAction::Training { .. } => "training",
            PurchaseAction::Coaching { .. } => "coaching",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub granted_tpe: Tpe,
    pub cost: Money,
    /// Ledger line that funded the grant; None for free actions.
    pub bank_id: Option<BankId>,
}

pub fn execute(
    store: &mut store::LeagueStore,
    config: &EconomyConfig,
    ctx: &SeasonContext,
    actor: UserId,
    player_id: PlayerId,
    action: PurchaseAction,
) -> PortalResult<PurchaseReceipt> {
    let season = ctx.season;
    let week = ctx.week;

    store.with_tx(|tx| {
        let player = prog_store::get_player(tx, player_id)?;
        if player.status != PlayerStatus::Active {
            return Err(ValidationError::PlayerNotActive {
                player_id,
                status: player.status.as_str().to_string(),
            }
            .into());
        }
        let progression = prog_store::get_progression(tx, player_id)?;
        let rookie = player.is_rookie(season, config.rookie_window);

        // Eligibility gate + cost computation. Flag claims happen here,
        // inside the transaction; a later failure rolls them back.
        let (grant, cost): (Tpe, Money) = match action {
            PurchaseAction::ActivityCheck => {
                if !prog_store::try_claim_flag(tx, player_id, PeriodFlag::ActivityCheck)? {
                    return Err(ValidationError::AlreadyClaimed {
                        action: "activity check",
                    }
                    .into());
                }
                (config.activity_check_tpe, 0)
            }
            PurchaseAction::TrainingCamp => {
                if !prog_store::try_claim_flag(tx, player_id, PeriodFlag::TrainingCamp)? {
                    return Err(ValidationError::AlreadyClaimed {
                        action: "training camp",
                    }
                    .into());
                }
                let grant = config.training_camp_grant(player.seasons_since_draft(season));
                (grant, 0)
            }
            PurchaseAction::Training { tpe } => {
                if tpe <= 0 {
                    return Err(ValidationError::NonPositivePurchase { amount: tpe }.into());
                }
                let tier = config
                    .training_tier(tpe)
                    .ok_or(ValidationError::UnknownTrainingTier { tpe })?;
                if !prog_store::try_claim_flag(tx, player_id, PeriodFlag::Training)? {
                    return Err(ValidationError::AlreadyClaimed { action: "training" }.into());
                }
                let cost = if rookie {
                    tier.cost_rookie
                } else {
                    tier.cost_standard
                };
                (tpe, cost)
            }
            PurchaseAction::Coaching { tpe } => {
                if tpe <= 0 {
                    return Err(ValidationError::NonPositivePurchase { amount: tpe }.into());
                }
                let cap = if rookie {
                    config.coaching.season_cap_rookie
                } else {
                    config.coaching.season_cap_standard
                };
                if progression.coaching_purchased + tpe > cap {
                    return Err(ValidationError::CoachingCapExceeded {
                        purchased: progression.coaching_purchased,
                        requested: tpe,
                        cap,
                    }
                    .into());
                }
                let per_tpe = if rookie {
                    config.coaching.cost_per_tpe_rookie
                } else {
                    config.coaching.cost_per_tpe_standard
                };
                (tpe, per_tpe * tpe)
            }
        };

        // Funding check for costed actions.
        if cost > 0 {
            let balance = bank_store::balance_of(tx, player.user_id)?;
            if balance - cost < config.overdraft_floor {
                return Err(ValidationError::InsufficientFunds {
                    balance,
                    required: cost,
                    floor: config.overdraft_floor,
                }
                .into());
            }
        }

        let description = format!("S{season} W{week} {}", action.task_type());

        // Debit first; the generated id funds the grant event.
        let bank_id = if cost > 0 {
            Some(bank_store::insert(
                tx,
                &NewBankTransaction {
                    uid: player.user_id,
                    amount: -cost,
                    kind: TransactionType::Training,
                    description: &description,
                    group_name: None,
                    group_id: None,
                    status: TransactionStatus::Completed,
                    submit_by: actor,
                    approved_by: Some(actor),
                },
            )?)
        } else {
            None
        };

        prog_store::insert_tpe_event(
            tx,
            &NewTpeEvent {
                user_id: player.user_id,
                player_id,
                tpe_change: grant,
                task_type: action.task_type(),
                task_description: &description,
                bank_id,
            },
        )?;
        prog_store::add_total_tpe(tx, player_id, grant)?;

        if let PurchaseAction::Coaching { tpe } = action {
            prog_store::add_coaching_purchased(tx, player_id, tpe)?;
        }

        log::info!(
            "player {player_id}: {} granted {grant} TPE (cost {cost})",
            action.task_type()
        );
        Ok(PurchaseReceipt {
            granted_tpe: grant,
            cost,
            bank_id,
        })
    })
}
