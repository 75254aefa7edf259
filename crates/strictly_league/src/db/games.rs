//! Queries on the `games` table.
//!
//! Updates are optimistic: each write names the `lock_version` it read and
//! bumps it, so a write based on a stale read touches no row.

use chrono::Utc;
use diesel::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::db::{DbError, DbErrorKind, GameChanges, GameRow, NewGameRow, STATUS_OPEN, schema::games};

/// Inserts a new session.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails.
#[instrument(skip(conn, row))]
pub fn insert(conn: &mut SqliteConnection, row: &NewGameRow) -> Result<GameRow, DbError> {
    let game = diesel::insert_into(games::table)
        .values(row)
        .returning(GameRow::as_returning())
        .get_result(conn)?;
    info!(game_id = game.id(), "Game created");
    Ok(game)
}

/// Finds a session by id.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
#[instrument(skip(conn))]
pub fn find_by_id(conn: &mut SqliteConnection, id: i32) -> Result<Option<GameRow>, DbError> {
    Ok(games::table
        .find(id)
        .select(GameRow::as_select())
        .first(conn)
        .optional()?)
}

/// Writes `changes` if the row is still at `expected_version`.
///
/// # Errors
///
/// Returns a stale-version [`DbError`] if another writer got there first.
#[instrument(skip(conn, changes))]
pub fn update_with_version(
    conn: &mut SqliteConnection,
    id: i32,
    expected_version: i32,
    changes: &GameChanges,
) -> Result<GameRow, DbError> {
    let now = Utc::now().naive_utc();
    let updated = diesel::update(
        games::table
            .filter(games::id.eq(id))
            .filter(games::lock_version.eq(expected_version)),
    )
    .set((
        changes,
        games::lock_version.eq(games::lock_version + 1),
        games::updated_at.eq(now),
    ))
    .returning(GameRow::as_returning())
    .get_result(conn)
    .optional()?;

    match updated {
        Some(row) => {
            debug!(game_id = id, lock_version = row.lock_version(), "Game updated");
            Ok(row)
        }
        None => {
            warn!(game_id = id, expected_version, "Optimistic update lost");
            Err(DbError::with_kind(
                DbErrorKind::StaleVersion,
                format!("Game {} changed since version {}", id, expected_version),
            ))
        }
    }
}

/// Deletes a session. Returns the number of rows removed.
///
/// # Errors
///
/// Returns [`DbError`] if the delete fails.
#[instrument(skip(conn))]
pub fn delete(conn: &mut SqliteConnection, id: i32) -> Result<usize, DbError> {
    let deleted = diesel::delete(games::table.find(id)).execute(conn)?;
    info!(game_id = id, deleted, "Game deleted");
    Ok(deleted)
}

/// Open sessions in which the player holds either seat, oldest first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
#[instrument(skip(conn))]
pub fn list_open_for_player(
    conn: &mut SqliteConnection,
    player_id: i32,
) -> Result<Vec<GameRow>, DbError> {
    let open = games::table
        .filter(games::status.eq(STATUS_OPEN))
        .filter(
            games::player_x_id
                .eq(player_id)
                .or(games::player_o_id.eq(player_id)),
        )
        .order(games::id.asc())
        .select(GameRow::as_select())
        .load(conn)?;
    debug!(count = open.len(), "Open games loaded");
    Ok(open)
}
