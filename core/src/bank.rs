//! Bank ledger: transaction types, the approval state machine, and
//! multi-line transfer construction.
//!
//! Rows are append-mostly. The only mutation path is a status
//! transition; a reversal never touches the original amount, it adds
//! one compensating line per reversed row.

use crate::config::EconomyConfig;
use crate::error::{PortalError, PortalResult, ValidationError};
use crate::store::{self, bank as bank_store, BankTransactionRow, NewBankTransaction};
use crate::types::{BankId, Money, UserId};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Transfer,
    Training,
    Contract,
    JobPay,
    CareerPt,
    Other,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Transfer => "transfer",
            TransactionType::Training => "training",
            TransactionType::Contract => "contract",
            TransactionType::JobPay => "job_pay",
            TransactionType::CareerPt => "career_pt",
            TransactionType::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "transfer" => Ok(TransactionType::Transfer),
            "training" => Ok(TransactionType::Training),
            "contract" => Ok(TransactionType::Contract),
            "job_pay" => Ok(TransactionType::JobPay),
            "career_pt" => Ok(TransactionType::CareerPt),
            "other" => Ok(TransactionType::Other),
            other => Err(ValidationError::UnknownTransactionType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Completed,
    Denied,
    Reversed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Denied => "denied",
            TransactionStatus::Reversed => "reversed",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            "denied" => Ok(TransactionStatus::Denied),
            "reversed" => Ok(TransactionStatus::Reversed),
            other => Err(ValidationError::UnknownTransactionStatus(other.to_string())),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Denied | TransactionStatus::Reversed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Approve,
    Deny,
    Revert,
}

impl StatusAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusAction::Approve => "approve",
            StatusAction::Deny => "deny",
            StatusAction::Revert => "revert",
        }
    }

    /// The one transition each action performs.
    fn edge(&self) -> (TransactionStatus, TransactionStatus) {
        match self {
            StatusAction::Approve => (TransactionStatus::Pending, TransactionStatus::Completed),
            StatusAction::Deny => (TransactionStatus::Pending, TransactionStatus::Denied),
            StatusAction::Revert => (TransactionStatus::Completed, TransactionStatus::Reversed),
        }
    }
}

/// One caller-supplied line of a transaction group.
#[derive(Debug, Clone)]
pub struct TransactionLine {
    pub uid: UserId,
    pub amount: Money,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct TransactionGroup {
    pub group_id: String,
    pub lines: Vec<BankTransactionRow>,
}

/// A status-change target: one row, or every row sharing a group id.
#[derive(Debug, Clone)]
pub enum TxTarget {
    Id(BankId),
    Group(String),
}

/// Build and persist a correlated multi-line group.
///
/// Transfers get one synthesized deduction line owned by the sender
/// so the group sums to zero, and the sender's post-transfer balance
/// is checked against the overdraft floor before anything is written.
/// Non-transfer groups are independent grants/charges: no deduction,
/// no funding check.
pub fn create_group(
    store: &mut store::LeagueStore,
    config: &EconomyConfig,
    actor: UserId,
    kind: TransactionType,
    group_name: &str,
    lines: &[TransactionLine],
) -> PortalResult<TransactionGroup> {
    if lines.is_empty() {
        return Err(ValidationError::EmptyTransactionGroup.into());
    }
    if kind == TransactionType::Transfer {
        for line in lines {
            if line.amount <= 0 {
                return Err(ValidationError::NonPositiveTransferAmount {
                    uid: line.uid,
                    amount: line.amount,
                }
                .into());
            }
        }
    }

    let group_id = Uuid::new_v4().to_string();
    let overdraft_floor = config.overdraft_floor;

    store.with_tx(|tx| {
        if kind == TransactionType::Transfer {
            let total: Money = lines.iter().map(|l| l.amount).sum();
            let balance = bank_store::balance_of(tx, actor)?;
            if balance - total < overdraft_floor {
                return Err(ValidationError::InsufficientFunds {
                    balance,
                    required: total,
                    floor: overdraft_floor,
                }
                .into());
            }
        }

        for line in lines {
            bank_store::insert(
                tx,
                &NewBankTransaction {
                    uid: line.uid,
                    amount: line.amount,
                    kind,
                    description: &line.description,
                    group_name: Some(group_name),
                    group_id: Some(&group_id),
                    status: TransactionStatus::Pending,
                    submit_by: actor,
                    approved_by: None,
                },
            )?;
        }

        if kind == TransactionType::Transfer {
            let total: Money = lines.iter().map(|l| l.amount).sum();
            let description = format!("{group_name}: transfer to {} recipient(s)", lines.len());
            bank_store::insert(
                tx,
                &NewBankTransaction {
                    uid: actor,
                    amount: -total,
                    kind,
                    description: &description,
                    group_name: Some(group_name),
                    group_id: Some(&group_id),
                    status: TransactionStatus::Pending,
                    submit_by: actor,
                    approved_by: None,
                },
            )?;
        }

        let rows = bank_store::group_lines(tx, &group_id)?;
        log::info!(
            "group {group_id} ({}) submitted by {actor}: {} line(s)",
            kind.as_str(),
            rows.len()
        );
        Ok(TransactionGroup {
            group_id: group_id.clone(),
            lines: rows,
        })
    })
}

/// Drive a transaction, or a whole group, through one approval edge.
/// Every targeted line must sit on the edge's source status; a group
/// transitions atomically or not at all. Reverting inserts one
/// compensating completed line per reversed row.
pub fn set_status(
    store: &mut store::LeagueStore,
    actor: UserId,
    target: &TxTarget,
    action: StatusAction,
) -> PortalResult<TransactionStatus> {
    let (from, to) = action.edge();

    store.with_tx(|tx| {
        let rows = match target {
            TxTarget::Id(id) => vec![bank_store::get(tx, *id)?],
            TxTarget::Group(group_id) => {
                let rows = bank_store::group_lines(tx, group_id)?;
                if rows.is_empty() {
                    return Err(PortalError::not_found("transaction group", group_id));
                }
                rows
            }
        };

        for row in &rows {
            if row.status != from {
                return Err(ValidationError::InvalidStatusTransition {
                    status: row.status.as_str().to_string(),
                    action: action.as_str().to_string(),
                }
                .into());
            }
        }

        for row in &rows {
            bank_store::transition_status(tx, row.id, from, to, Some(actor))?;
        }

        if action == StatusAction::Revert {
            for row in &rows {
                let description = format!("Reversal of transaction #{}", row.id);
                bank_store::insert(
                    tx,
                    &NewBankTransaction {
                        uid: row.uid,
                        amount: -row.amount,
                        kind: row.kind,
                        description: &description,
                        group_name: row.group_name.as_deref(),
                        group_id: row.group_id.as_deref(),
                        status: TransactionStatus::Completed,
                        submit_by: actor,
                        approved_by: Some(actor),
                    },
                )?;
            }
        }

        log::info!(
            "{} by {actor}: {} line(s) now {}",
            action.as_str(),
            rows.len(),
            to.as_str()
        );
        Ok(to)
    })
}
