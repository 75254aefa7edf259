//! Queries on the append-only `scores` table.

use diesel::dsl::{count_star, max};
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::db::{DbError, NewScore, ScoreRow, schema::scores};

/// Appends a settlement.
///
/// # Errors
///
/// Returns a unique-violation [`DbError`] if the game was already scored.
#[instrument(skip(conn, score), fields(game_id = score.game_id(), result = %score.result()))]
pub fn insert(conn: &mut SqliteConnection, score: &NewScore) -> Result<ScoreRow, DbError> {
    let row = diesel::insert_into(scores::table)
        .values(score)
        .returning(ScoreRow::as_returning())
        .get_result(conn)?;
    info!(score_id = row.id(), "Score recorded");
    Ok(row)
}

/// Settlements in which the player held either seat, oldest first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
#[instrument(skip(conn))]
pub fn for_player(conn: &mut SqliteConnection, player_id: i32) -> Result<Vec<ScoreRow>, DbError> {
    let rows = scores::table
        .filter(
            scores::player_x_id
                .eq(player_id)
                .or(scores::player_o_id.eq(player_id)),
        )
        .order(scores::id.asc())
        .select(ScoreRow::as_select())
        .load(conn)?;
    debug!(count = rows.len(), "Player scores loaded");
    Ok(rows)
}

/// The whole score log, oldest first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
#[instrument(skip(conn))]
pub fn all(conn: &mut SqliteConnection) -> Result<Vec<ScoreRow>, DbError> {
    Ok(scores::table
        .order(scores::id.asc())
        .select(ScoreRow::as_select())
        .load(conn)?)
}

/// Number of scored games and the highest score id, read together.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
#[instrument(skip(conn))]
pub fn tally(conn: &mut SqliteConnection) -> Result<(i64, Option<i32>), DbError> {
    let tally = scores::table
        .select((count_star(), max(scores::id)))
        .first::<(i64, Option<i32>)>(conn)?;
    debug!(count = tally.0, high_water = ?tally.1, "Score tally");
    Ok(tally)
}
