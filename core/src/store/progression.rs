//! Player, progression, rating, and audit rows.

use super::{AttributeChangeRow, NewTpeEvent, PeriodFlag, PlayerRow, ProgressionRow, TpeEventRow};
use crate::attributes::{Attribute, Position, RatingChange, RatingSheet};
use crate::error::{PortalError, PortalResult};
use crate::types::{PlayerId, PlayerStatus, Season, Tpe, UserId};
use rusqlite::{params, Connection};

pub fn insert_player(
    conn: &Connection,
    user_id: UserId,
    name: &str,
    position: Position,
    draft_season: Season,
) -> PortalResult<PlayerId> {
    conn.execute(
        "INSERT INTO player (user_id, name, position, status, draft_season, created_at)
         VALUES (?1, ?2, ?3, 'active', ?4, ?5)",
        params![
            user_id,
            name,
            position.as_str(),
            draft_season,
            chrono::Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn init_progression(conn: &Connection, player_id: PlayerId) -> PortalResult<()> {
    conn.execute(
        "INSERT INTO player_progression (player_id) VALUES (?1)",
        params![player_id],
    )?;
    Ok(())
}

pub fn get_player(conn: &Connection, player_id: PlayerId) -> PortalResult<PlayerRow> {
    conn.query_row(
        "SELECT player_id, user_id, name, position, status, draft_season
         FROM player WHERE player_id = ?1",
        params![player_id],
        |row| {
            Ok((
                row.get::<_, PlayerId>(0)?,
                row.get::<_, UserId>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Season>(5)?,
            ))
        },
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => PortalError::not_found("player", player_id),
        other => other.into(),
    })
    .and_then(|(player_id, user_id, name, position, status, draft_season)| {
        Ok(PlayerRow {
            player_id,
            user_id,
            name,
            position: Position::parse(&position)?,
            status: PlayerStatus::parse(&status)?,
            draft_season,
        })
    })
}

pub fn set_player_status(
    conn: &Connection,
    player_id: PlayerId,
    status: PlayerStatus,
) -> PortalResult<()> {
    let changed = conn.execute(
        "UPDATE player SET status = ?1 WHERE player_id = ?2",
        params![status.as_str(), player_id],
    )?;
    if changed == 0 {
        return Err(PortalError::not_found("player", player_id));
    }
    Ok(())
}

pub fn get_progression(conn: &Connection, player_id: PlayerId) -> PortalResult<ProgressionRow> {
    conn.query_row(
        "SELECT player_id, total_tpe, applied_tpe, banked_tpe, used_redistribution,
                coaching_purchased, training_purchased, training_camp_complete,
                activity_check_complete
         FROM player_progression WHERE player_id = ?1",
        params![player_id],
        |row| {
            Ok(ProgressionRow {
                player_id: row.get(0)?,
                total_tpe: row.get(1)?,
                applied_tpe: row.get(2)?,
                banked_tpe: row.get(3)?,
                used_redistribution: row.get(4)?,
                coaching_purchased: row.get(5)?,
                training_purchased: row.get::<_, i64>(6)? != 0,
                training_camp_complete: row.get::<_, i64>(7)? != 0,
                activity_check_complete: row.get::<_, i64>(8)? != 0,
            })
        },
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => PortalError::not_found("progression", player_id),
        other => other.into(),
    })
}

/// Raise the TPE ceiling by a grant; the unspent remainder rises with
/// it.
pub fn add_total_tpe(conn: &Connection, player_id: PlayerId, grant: Tpe) -> PortalResult<()> {
    conn.execute(
        "UPDATE player_progression
         SET total_tpe = total_tpe + ?1, banked_tpe = banked_tpe + ?1
         WHERE player_id = ?2",
        params![grant, player_id],
    )?;
    Ok(())
}

/// Rewrite the applied/banked split after a committed attribute edit.
pub fn set_applied_tpe(conn: &Connection, player_id: PlayerId, applied: Tpe) -> PortalResult<()> {
    conn.execute(
        "UPDATE player_progression
         SET applied_tpe = ?1, banked_tpe = total_tpe - ?1
         WHERE player_id = ?2",
        params![applied, player_id],
    )?;
    Ok(())
}

/// Claim a one-shot period flag. True when this call flipped it, false
/// when it was already claimed. Running the check and the set as one
/// guarded UPDATE inside the caller's transaction is what closes the
/// double-spend window.
pub fn try_claim_flag(
    conn: &Connection,
    player_id: PlayerId,
    flag: PeriodFlag,
) -> PortalResult<bool> {
    let column = flag.column();
    let sql = format!(
        "UPDATE player_progression SET {column} = 1
         WHERE player_id = ?1 AND {column} = 0"
    );
    let changed = conn.execute(&sql, params![player_id])?;
    Ok(changed == 1)
}

pub fn add_coaching_purchased(
    conn: &Connection,
    player_id: PlayerId,
    tpe: Tpe,
) -> PortalResult<()> {
    conn.execute(
        "UPDATE player_progression
         SET coaching_purchased = coaching_purchased + ?1
         WHERE player_id = ?2",
        params![tpe, player_id],
    )?;
    Ok(())
}

pub fn add_used_redistribution(
    conn: &Connection,
    player_id: PlayerId,
    delta: Tpe,
) -> PortalResult<()> {
    conn.execute(
        "UPDATE player_progression
         SET used_redistribution = used_redistribution + ?1
         WHERE player_id = ?2",
        params![delta, player_id],
    )?;
    Ok(())
}

// ── Ratings ─────────────────────────────────────────────────────────

pub fn set_ratings(conn: &Connection, player_id: PlayerId, sheet: &RatingSheet) -> PortalResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO player_attribute (player_id, attribute, rating)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (player_id, attribute) DO UPDATE SET rating = excluded.rating",
    )?;
    for (attribute, rating) in sheet {
        stmt.execute(params![player_id, attribute.as_str(), rating])?;
    }
    Ok(())
}

pub fn get_ratings(conn: &Connection, player_id: PlayerId) -> PortalResult<RatingSheet> {
    let mut stmt = conn.prepare(
        "SELECT attribute, rating FROM player_attribute WHERE player_id = ?1",
    )?;
    let mut sheet = RatingSheet::new();
    let rows = stmt.query_map(params![player_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, u8>(1)?))
    })?;
    for row in rows {
        let (attribute, rating) = row?;
        sheet.insert(Attribute::parse(&attribute)?, rating);
    }
    Ok(sheet)
}

// ── Progression events & audit trail ────────────────────────────────

pub fn insert_tpe_event(conn: &Connection, event: &NewTpeEvent<'_>) -> PortalResult<i64> {
    conn.execute(
        "INSERT INTO tpe_event (
            user_id, player_id, tpe_change, task_type, task_description,
            bank_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.user_id,
            event.player_id,
            event.tpe_change,
            event.task_type,
            event.task_description,
            event.bank_id,
            chrono::Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn tpe_events_for(conn: &Connection, player_id: PlayerId) -> PortalResult<Vec<TpeEventRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, player_id, tpe_change, task_type, task_description,
                bank_id, created_at
         FROM tpe_event WHERE player_id = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt
        .query_map(params![player_id], |row| {
            Ok(TpeEventRow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                player_id: row.get(2)?,
                tpe_change: row.get(3)?,
                task_type: row.get(4)?,
                task_description: row.get(5)?,
                bank_id: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn insert_attribute_change(
    conn: &Connection,
    player_id: PlayerId,
    season: Season,
    kind: &str,
    change: &RatingChange,
) -> PortalResult<()> {
    conn.execute(
        "INSERT INTO attribute_change (
            player_id, season, kind, attribute, old_rating, new_rating, changed_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            player_id,
            season,
            kind,
            change.attribute.as_str(),
            change.old_rating,
            change.new_rating,
            chrono::Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn attribute_changes_for(
    conn: &Connection,
    player_id: PlayerId,
) -> PortalResult<Vec<AttributeChangeRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, player_id, season, kind, attribute, old_rating, new_rating, changed_at
         FROM attribute_change WHERE player_id = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt
        .query_map(params![player_id], |row| {
            Ok(AttributeChangeRow {
                id: row.get(0)?,
                player_id: row.get(1)?,
                season: row.get(2)?,
                kind: row.get(3)?,
                attribute: row.get(4)?,
                old_rating: row.get(5)?,
                new_rating: row.get(6)?,
                changed_at: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
