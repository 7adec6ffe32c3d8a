//! The portal facade: the surface UI/API collaborators call.
//!
//! Owns the store, the economy configuration, and the capability
//! check. Each operation authorizes, then runs its orchestrator;
//! a storage conflict is retried exactly once before surfacing.

use crate::attributes::{Position, RatingChange, RatingSheet};
use crate::auth::{Authorizer, Capability};
use crate::balance::{self, EditMode};
use crate::bank::{self, StatusAction, TransactionGroup, TransactionLine, TransactionStatus,
                  TransactionType, TxTarget};
use crate::config::EconomyConfig;
use crate::error::{PortalError, PortalResult};
use crate::purchase::{self, PurchaseAction, PurchaseReceipt};
use crate::store::{LeagueStore, PlayerRow};
use crate::types::{Money, PlayerId, SeasonContext, Tpe, UserId};
use crate::updates;

pub struct LeaguePortal<A: Authorizer> {
    store: LeagueStore,
    config: EconomyConfig,
    authorizer: A,
}

impl<A: Authorizer> LeaguePortal<A> {
    pub fn open(path: &str, config: EconomyConfig, authorizer: A) -> PortalResult<Self> {
        let store = LeagueStore::open(path)?;
        store.migrate()?;
        Ok(Self {
            store,
            config,
            authorizer,
        })
    }

    /// In-memory portal (used in tests).
    pub fn in_memory(config: EconomyConfig, authorizer: A) -> PortalResult<Self> {
        let store = LeagueStore::in_memory()?;
        store.migrate()?;
        Ok(Self {
            store,
            config,
            authorizer,
        })
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn store(&self) -> &LeagueStore {
        &self.store
    }

    /// Administrative access to the store (player creation, period
    /// resets). The orchestrated operations below are the only paths
    /// that touch balances or ratings.
    pub fn store_mut(&mut self) -> &mut LeagueStore {
        &mut self.store
    }

    // ── Authorization helpers ───────────────────────────────────────

    fn require(&self, actor: UserId, capability: Capability) -> PortalResult<()> {
        if self.authorizer.has_capability(actor, capability) {
            Ok(())
        } else {
            Err(PortalError::Unauthorized { actor, capability })
        }
    }

    /// Owners act on their own players; anyone else needs the
    /// manage-players capability.
    fn require_player_access(&self, actor: UserId, player: &PlayerRow) -> PortalResult<()> {
        if player.user_id == actor {
            Ok(())
        } else {
            self.require(actor, Capability::ManagePlayers)
        }
    }

    fn with_retry<T>(
        &mut self,
        mut op: impl FnMut(&mut Self) -> PortalResult<T>,
    ) -> PortalResult<T> {
        match op(self) {
            Err(PortalError::Concurrency(reason)) => {
                log::warn!("retrying after storage conflict: {reason}");
                op(self)
            }
            other => other,
        }
    }

    // ── Balance calculator ──────────────────────────────────────────

    pub fn compute_available_tpe(
        position: Position,
        total_tpe: Tpe,
        ratings: &RatingSheet,
    ) -> PortalResult<Tpe> {
        Ok(balance::available_tpe(position, total_tpe, ratings)?)
    }

    // ── Orchestrated operations ─────────────────────────────────────

    pub fn validate_and_commit_purchase(
        &mut self,
        ctx: &SeasonContext,
        actor: UserId,
        player_id: PlayerId,
        action: PurchaseAction,
    ) -> PortalResult<PurchaseReceipt> {
        let player = self.store.player(player_id)?;
        self.require_player_access(actor, &player)?;
        let ctx = *ctx;
        self.with_retry(|p| {
            purchase::execute(&mut p.store, &p.config, &ctx, actor, player_id, action)
        })
    }

    /// Commit an attribute edit under its mode. The four modes are
    /// the whole universe; dispatch is exhaustive by construction.
    pub fn commit_attribute_edit(
        &mut self,
        ctx: &SeasonContext,
        actor: UserId,
        player_id: PlayerId,
        mode: EditMode,
        ratings: &RatingSheet,
    ) -> PortalResult<Vec<RatingChange>> {
        let player = self.store.player(player_id)?;
        self.require_player_access(actor, &player)?;
        let ctx = *ctx;
        self.with_retry(|p| match mode {
            EditMode::Create | EditMode::Update => updates::apply_build(
                &mut p.store,
                &p.config,
                &ctx,
                actor,
                player_id,
                mode,
                ratings,
            ),
            EditMode::Redistribute => updates::redistribute(
                &mut p.store,
                &p.config,
                &ctx,
                actor,
                player_id,
                ratings,
            ),
            EditMode::Regress => {
                updates::regress(&mut p.store, &p.config, &ctx, actor, player_id, ratings)
            }
        })
    }

    pub fn validate_and_commit_build(
        &mut self,
        ctx: &SeasonContext,
        actor: UserId,
        player_id: PlayerId,
        mode: EditMode,
        ratings: &RatingSheet,
    ) -> PortalResult<Vec<RatingChange>> {
        self.commit_attribute_edit(ctx, actor, player_id, mode, ratings)
    }

    pub fn validate_and_commit_redistribution(
        &mut self,
        ctx: &SeasonContext,
        actor: UserId,
        player_id: PlayerId,
        ratings: &RatingSheet,
    ) -> PortalResult<Vec<RatingChange>> {
        self.commit_attribute_edit(ctx, actor, player_id, EditMode::Redistribute, ratings)
    }

    pub fn validate_and_commit_regression(
        &mut self,
        ctx: &SeasonContext,
        actor: UserId,
        player_id: PlayerId,
        ratings: &RatingSheet,
    ) -> PortalResult<Vec<RatingChange>> {
        self.commit_attribute_edit(ctx, actor, player_id, EditMode::Regress, ratings)
    }

    /// Submit a correlated group of ledger lines. Transfers move the
    /// actor's own funds; every other type disburses league money and
    /// needs the manage-ledger capability.
    pub fn create_transaction_group(
        &mut self,
        actor: UserId,
        kind: TransactionType,
        group_name: &str,
        lines: &[TransactionLine],
    ) -> PortalResult<TransactionGroup> {
        if kind != TransactionType::Transfer {
            self.require(actor, Capability::ManageLedger)?;
        }
        let lines = lines.to_vec();
        self.with_retry(|p| bank::create_group(&mut p.store, &p.config, actor, kind, group_name, &lines))
    }

    pub fn set_transaction_status(
        &mut self,
        actor: UserId,
        target: &TxTarget,
        action: StatusAction,
    ) -> PortalResult<TransactionStatus> {
        self.require(actor, Capability::ApproveTransactions)?;
        let target = target.clone();
        self.with_retry(|p| bank::set_status(&mut p.store, actor, &target, action))
    }

    // ── Read surface ────────────────────────────────────────────────

    pub fn balance_of(&self, uid: UserId) -> PortalResult<Money> {
        self.store.balance_of(uid)
    }
}
