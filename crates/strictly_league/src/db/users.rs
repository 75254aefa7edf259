//! Queries on the `users` table.

use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::db::{DbError, NewUser, User, UserCounters, schema::users};

/// Inserts a new player.
///
/// # Errors
///
/// Returns a unique-violation [`DbError`] if the name is taken.
#[instrument(skip(conn))]
pub fn insert(conn: &mut SqliteConnection, new_user: &NewUser) -> Result<User, DbError> {
    let user = diesel::insert_into(users::table)
        .values(new_user)
        .returning(User::as_returning())
        .get_result(conn)?;
    info!(user_id = user.id(), name = %user.name(), "User created");
    Ok(user)
}

/// Finds a player by name.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
#[instrument(skip(conn))]
pub fn find_by_name(conn: &mut SqliteConnection, name: &str) -> Result<Option<User>, DbError> {
    let user = users::table
        .filter(users::name.eq(name))
        .select(User::as_select())
        .first(conn)
        .optional()?;
    debug!(found = user.is_some(), "User lookup by name");
    Ok(user)
}

/// Finds a player by id.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
#[instrument(skip(conn))]
pub fn find_by_id(conn: &mut SqliteConnection, id: i32) -> Result<Option<User>, DbError> {
    Ok(users::table
        .find(id)
        .select(User::as_select())
        .first(conn)
        .optional()?)
}

/// Players who have finished at least one game, in registration order.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
#[instrument(skip(conn))]
pub fn list_active(conn: &mut SqliteConnection) -> Result<Vec<User>, DbError> {
    let active = users::table
        .filter(users::games_played.gt(0))
        .order(users::id.asc())
        .select(User::as_select())
        .load(conn)?;
    debug!(count = active.len(), "Active users loaded");
    Ok(active)
}

/// Overwrites a player's counters.
///
/// # Errors
///
/// Returns [`DbError`] if the player does not exist or the update fails.
#[instrument(skip(conn, counters))]
pub fn update_counters(
    conn: &mut SqliteConnection,
    id: i32,
    counters: &UserCounters,
) -> Result<(), DbError> {
    let updated = diesel::update(users::table.find(id))
        .set(counters)
        .execute(conn)?;
    if updated != 1 {
        return Err(DbError::new(format!("User {} not updated", id)));
    }
    debug!(user_id = id, "Counters written");
    Ok(())
}
