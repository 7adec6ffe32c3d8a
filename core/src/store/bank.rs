//! Ledger rows. Free functions over a connection so the same helpers
//! serve both one-off reads and the transactional orchestrators.

use super::{BankTransactionRow, NewBankTransaction};
use crate::bank::{TransactionStatus, TransactionType};
use crate::error::{PortalError, PortalResult};
use crate::types::{BankId, Money, UserId};
use rusqlite::{params, Connection, Row};

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<BankTransactionRow> {
    Ok(BankTransactionRow {
        id: row.get(0)?,
        uid: row.get(1)?,
        amount: row.get(2)?,
        kind: TransactionType::parse(&row.get::<_, String>(3)?)
            .map_err(|_| rusqlite::Error::InvalidQuery)?,
        description: row.get(4)?,
        group_name: row.get(5)?,
        group_id: row.get(6)?,
        status: TransactionStatus::parse(&row.get::<_, String>(7)?)
            .map_err(|_| rusqlite::Error::InvalidQuery)?,
        submit_by: row.get(8)?,
        submit_date: row.get(9)?,
        approved_by: row.get(10)?,
        approved_date: row.get(11)?,
    })
}

const TRANSACTION_COLUMNS: &str = "id, uid, amount, type, description, group_name, group_id, \
     status, submit_by, submit_date, approved_by, approved_date";

pub fn insert(conn: &Connection, new: &NewBankTransaction<'_>) -> PortalResult<BankId> {
    let now = chrono::Utc::now().to_rfc3339();
    let approved_date = new.approved_by.map(|_| now.clone());
    conn.execute(
        "INSERT INTO bank_transaction (
            uid, amount, type, description, group_name, group_id,
            status, submit_by, submit_date, approved_by, approved_date
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            new.uid,
            new.amount,
            new.kind.as_str(),
            new.description,
            new.group_name,
            new.group_id,
            new.status.as_str(),
            new.submit_by,
            now,
            new.approved_by,
            approved_date,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// An account's balance: the sum of its signed amounts, denied lines
/// excluded. Pending and reversed lines count; a reversed line is
/// compensated by its negated twin, never removed from the sum.
pub fn balance_of(conn: &Connection, uid: UserId) -> PortalResult<Money> {
    let balance = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM bank_transaction
         WHERE uid = ?1 AND status != 'denied'",
        params![uid],
        |row| row.get(0),
    )?;
    Ok(balance)
}

pub fn get(conn: &Connection, id: BankId) -> PortalResult<BankTransactionRow> {
    let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM bank_transaction WHERE id = ?1");
    conn.query_row(&sql, params![id], row_to_transaction)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => PortalError::not_found("transaction", id),
            other => other.into(),
        })
}

pub fn group_lines(conn: &Connection, group_id: &str) -> PortalResult<Vec<BankTransactionRow>> {
    let sql = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM bank_transaction
         WHERE group_id = ?1 ORDER BY id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![group_id], row_to_transaction)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn account_statement(conn: &Connection, uid: UserId) -> PortalResult<Vec<BankTransactionRow>> {
    let sql = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM bank_transaction
         WHERE uid = ?1 ORDER BY id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![uid], row_to_transaction)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Status-guarded transition for one line. Returns an error if the
/// row is no longer in `from`: the caller's view went stale inside
/// its own transaction, which should not happen; surfacing it as a
/// conflict aborts and rolls back the whole group.
pub fn transition_status(
    conn: &Connection,
    id: BankId,
    from: TransactionStatus,
    to: TransactionStatus,
    approved_by: Option<UserId>,
) -> PortalResult<()> {
    let now = chrono::Utc::now().to_rfc3339();
    let changed = conn.execute(
        "UPDATE bank_transaction
         SET status = ?1, approved_by = COALESCE(?2, approved_by),
             approved_date = CASE WHEN ?2 IS NULL THEN approved_date ELSE ?3 END
         WHERE id = ?4 AND status = ?5",
        params![to.as_str(), approved_by, now, id, from.as_str()],
    )?;
    if changed != 1 {
        return Err(PortalError::Concurrency(format!(
            "transaction {id} left state '{}' mid-update",
            from.as_str()
        )));
    }
    Ok(())
}
