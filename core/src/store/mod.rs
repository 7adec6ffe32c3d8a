//! SQLite persistence layer.
//!
//! RULE: Only the store modules talk to the database. Orchestrators
//! sequence store calls inside `with_tx`; they never execute SQL
//! directly.

pub mod bank;
pub mod progression;

use crate::attributes::Position;
use crate::bank::{TransactionStatus, TransactionType};
use crate::error::PortalResult;
use crate::types::{BankId, Money, PlayerId, PlayerStatus, Season, Tpe, UserId};
use rusqlite::{Connection, Transaction};

pub struct LeagueStore {
    conn: Connection,
}

impl LeagueStore {
    pub fn open(path: &str) -> PortalResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> PortalResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> PortalResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_players.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_bank.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/003_progression_log.sql"))?;
        Ok(())
    }

    /// Run `f` inside one database transaction: the request-scoped,
    /// all-or-nothing envelope every orchestrated operation uses. Any
    /// error rolls back every write made inside it.
    pub fn with_tx<T>(
        &mut self,
        f: impl FnOnce(&Transaction<'_>) -> PortalResult<T>,
    ) -> PortalResult<T> {
        let tx = self.conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    // ── Read surface (outside any transaction) ──────────────────────

    pub fn balance_of(&self, uid: UserId) -> PortalResult<Money> {
        bank::balance_of(&self.conn, uid)
    }

    pub fn transaction(&self, id: BankId) -> PortalResult<BankTransactionRow> {
        bank::get(&self.conn, id)
    }

    pub fn group_lines(&self, group_id: &str) -> PortalResult<Vec<BankTransactionRow>> {
        bank::group_lines(&self.conn, group_id)
    }

    pub fn account_statement(&self, uid: UserId) -> PortalResult<Vec<BankTransactionRow>> {
        bank::account_statement(&self.conn, uid)
    }

    pub fn player(&self, player_id: PlayerId) -> PortalResult<PlayerRow> {
        progression::get_player(&self.conn, player_id)
    }

    pub fn progression(&self, player_id: PlayerId) -> PortalResult<ProgressionRow> {
        progression::get_progression(&self.conn, player_id)
    }

    pub fn ratings(&self, player_id: PlayerId) -> PortalResult<crate::attributes::RatingSheet> {
        progression::get_ratings(&self.conn, player_id)
    }

    pub fn tpe_events_for(&self, player_id: PlayerId) -> PortalResult<Vec<TpeEventRow>> {
        progression::tpe_events_for(&self.conn, player_id)
    }

    pub fn attribute_changes_for(
        &self,
        player_id: PlayerId,
    ) -> PortalResult<Vec<AttributeChangeRow>> {
        progression::attribute_changes_for(&self.conn, player_id)
    }

    // ── Player administration ───────────────────────────────────────

    pub fn create_player(
        &mut self,
        user_id: UserId,
        name: &str,
        position: Position,
        draft_season: Season,
    ) -> PortalResult<PlayerId> {
        self.with_tx(|tx| {
            let player_id = progression::insert_player(tx, user_id, name, position, draft_season)?;
            progression::init_progression(tx, player_id)?;
            Ok(player_id)
        })
    }

    pub fn set_player_status(
        &mut self,
        player_id: PlayerId,
        status: PlayerStatus,
    ) -> PortalResult<()> {
        progression::set_player_status(&self.conn, player_id, status)
    }

    pub fn grant_tpe(
        &mut self,
        player_id: PlayerId,
        amount: Tpe,
        task_type: &str,
        task_description: &str,
    ) -> PortalResult<()> {
        self.with_tx(|tx| {
            let player = progression::get_player(tx, player_id)?;
            progression::add_total_tpe(tx, player_id, amount)?;
            progression::insert_tpe_event(
                tx,
                &NewTpeEvent {
                    user_id: player.user_id,
                    player_id,
                    tpe_change: amount,
                    task_type,
                    task_description,
                    bank_id: None,
                },
            )?;
            Ok(())
        })
    }

    // ── Period rollover (driven by the external scheduler) ──────────

    /// Clear the weekly idempotency flags for every player.
    pub fn reset_weekly_flags(&mut self) -> PortalResult<usize> {
        let changed = self.conn.execute(
            "UPDATE player_progression
             SET training_purchased = 0, activity_check_complete = 0",
            [],
        )?;
        log::info!("weekly reset: {changed} progression rows cleared");
        Ok(changed)
    }

    /// Reset all seasonal counters and flags.
    pub fn season_rollover(&mut self) -> PortalResult<usize> {
        let changed = self.conn.execute(
            "UPDATE player_progression
             SET used_redistribution = 0,
                 coaching_purchased = 0,
                 training_camp_complete = 0,
                 training_purchased = 0,
                 activity_check_complete = 0",
            [],
        )?;
        log::info!("season rollover: {changed} progression rows reset");
        Ok(changed)
    }
}

// ── Row structs ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PlayerRow {
    pub player_id: PlayerId,
    pub user_id: UserId,
    pub name: String,
    pub position: Position,
    pub status: PlayerStatus,
    pub draft_season: Season,
}

impl PlayerRow {
    /// Rookie economy applies through `window` seasons past the draft.
    pub fn is_rookie(&self, season: Season, window: Season) -> bool {
        season - self.draft_season <= window
    }

    pub fn seasons_since_draft(&self, season: Season) -> Season {
        season - self.draft_season
    }
}

#[derive(Debug, Clone)]
pub struct ProgressionRow {
    pub player_id: PlayerId,
    pub total_tpe: Tpe,
    pub applied_tpe: Tpe,
    pub banked_tpe: Tpe,
    pub used_redistribution: Tpe,
    pub coaching_purchased: Tpe,
    pub training_purchased: bool,
    pub training_camp_complete: bool,
    pub activity_check_complete: bool,
}

#[derive(Debug, Clone)]
pub struct BankTransactionRow {
    pub id: BankId,
    pub uid: UserId,
    pub amount: Money,
    pub kind: TransactionType,
    pub description: String,
    pub group_name: Option<String>,
    pub group_id: Option<String>,
    pub status: TransactionStatus,
    pub submit_by: UserId,
    pub submit_date: String,
    pub approved_by: Option<UserId>,
    pub approved_date: Option<String>,
}

/// Insert payload for one ledger line; dates are stamped at insert.
#[derive(Debug, Clone)]
pub struct NewBankTransaction<'a> {
    pub uid: UserId,
    pub amount: Money,
    pub kind: TransactionType,
    pub description: &'a str,
    pub group_name: Option<&'a str>,
    pub group_id: Option<&'a str>,
    pub status: TransactionStatus,
    pub submit_by: UserId,
    pub approved_by: Option<UserId>,
}

#[derive(Debug, Clone)]
pub struct TpeEventRow {
    pub id: i64,
    pub user_id: UserId,
    pub player_id: PlayerId,
    pub tpe_change: Tpe,
    pub task_type: String,
    pub task_description: String,
    pub bank_id: Option<BankId>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewTpeEvent<'a> {
    pub user_id: UserId,
    pub player_id: PlayerId,
    pub tpe_change: Tpe,
    pub task_type: &'a str,
    pub task_description: &'a str,
    pub bank_id: Option<BankId>,
}

#[derive(Debug, Clone)]
pub struct AttributeChangeRow {
    pub id: i64,
    pub player_id: PlayerId,
    pub season: Season,
    pub kind: String,
    pub attribute: String,
    pub old_rating: u8,
    pub new_rating: u8,
    pub changed_at: String,
}

/// Weekly/seasonal one-shot flags claimed inside purchase
/// transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodFlag {
    ActivityCheck,
    Training,
    TrainingCamp,
}

impl PeriodFlag {
    pub(crate) fn column(&self) -> &'static str {
        match self {
            PeriodFlag::ActivityCheck => "activity_check_complete",
            PeriodFlag::Training => "training_purchased",
            PeriodFlag::TrainingCamp => "training_camp_complete",
        }
    }
}
