//! Database models and their conversion to domain types.

use chrono::{NaiveDate, NaiveDateTime};
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use strictly_grid::{
    Board, Cell, Game, GameStatus, Mark, MatchResult, Move, PlayerId, Settlement, Standing,
};
use tracing::instrument;

use crate::db::{DbError, schema};

/// Stored value of `games.status` for an open game.
pub const STATUS_OPEN: &str = "open";
/// Stored value of `games.status` for a won game.
pub const STATUS_WON: &str = "won";
/// Stored value of `games.status` for a drawn game.
pub const STATUS_DRAW: &str = "draw";

fn counter(value: i32, column: &str) -> Result<u32, DbError> {
    u32::try_from(value).map_err(|_| DbError::corrupt(format!("negative {}: {}", column, value)))
}

fn column_i32(value: usize, column: &str) -> Result<i32, DbError> {
    i32::try_from(value).map_err(|_| DbError::corrupt(format!("{} too large: {}", column, value)))
}

/// Registered player.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::users)]
pub struct User {
    id: i32,
    name: String,
    email: String,
    wins: i32,
    draws: i32,
    games_played: i32,
    created_at: NaiveDateTime,
}

impl User {
    /// Engine identity of this player.
    pub fn player_id(&self) -> PlayerId {
        PlayerId::from(self.id)
    }

    /// Counters as a ledger standing.
    ///
    /// # Errors
    ///
    /// Returns a corrupt-row [`DbError`] if a stored counter is negative.
    #[instrument(skip(self), fields(user_id = self.id))]
    pub fn standing(&self) -> Result<Standing, DbError> {
        Ok(Standing::with_counters(
            self.player_id(),
            self.name.clone(),
            counter(self.wins, "wins")?,
            counter(self.draws, "draws")?,
            counter(self.games_played, "games_played")?,
        ))
    }
}

/// Insertable user for registration.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::users)]
pub struct NewUser {
    name: String,
    email: String,
}

/// Counter columns written back after a settlement.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::users)]
pub struct UserCounters {
    wins: i32,
    draws: i32,
    games_played: i32,
}

impl UserCounters {
    /// Converts a standing into column values.
    ///
    /// # Errors
    ///
    /// Returns a [`DbError`] if a counter does not fit the column.
    pub fn from_standing(standing: &Standing) -> Result<Self, DbError> {
        let fit = |value: u32, column: &str| {
            i32::try_from(value)
                .map_err(|_| DbError::corrupt(format!("{} overflow: {}", column, value)))
        };
        Ok(Self {
            wins: fit(*standing.wins(), "wins")?,
            draws: fit(*standing.draws(), "draws")?,
            games_played: fit(*standing.games_played(), "games_played")?,
        })
    }
}

/// Stored game session.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::games)]
pub struct GameRow {
    id: i32,
    board_size: i32,
    cells: String,
    player_x_id: i32,
    player_o_id: i32,
    next_to_move_id: i32,
    history: String,
    status: String,
    winner_id: Option<i32>,
    lock_version: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl GameRow {
    /// Decodes the row into an engine game, re-checking every invariant.
    ///
    /// # Errors
    ///
    /// Returns a corrupt-row [`DbError`] if a column does not decode or the
    /// decoded state could not have come from legal play.
    #[instrument(skip(self), fields(game_id = self.id, status = %self.status))]
    pub fn to_game(&self) -> Result<Game, DbError> {
        let size = usize::try_from(self.board_size)
            .map_err(|_| DbError::corrupt(format!("board size {}", self.board_size)))?;
        let cells: Vec<Cell> = serde_json::from_str(&self.cells)?;
        let history: Vec<Move> = serde_json::from_str(&self.history)?;
        let board = Board::from_cells(size, cells).map_err(|e| DbError::corrupt(e.to_string()))?;

        let player_x = PlayerId::from(self.player_x_id);
        let player_o = PlayerId::from(self.player_o_id);
        let status = match (self.status.as_str(), self.winner_id) {
            (STATUS_OPEN, None) => GameStatus::Open,
            (STATUS_DRAW, None) => GameStatus::Draw,
            (STATUS_WON, Some(winner)) if winner == self.player_x_id => GameStatus::Won {
                winner: player_x,
                mark: Mark::X,
            },
            (STATUS_WON, Some(winner)) if winner == self.player_o_id => GameStatus::Won {
                winner: player_o,
                mark: Mark::O,
            },
            (status, winner) => {
                return Err(DbError::corrupt(format!(
                    "status '{}' with winner {:?}",
                    status, winner
                )));
            }
        };

        Game::restore(
            board,
            player_x,
            player_o,
            PlayerId::from(self.next_to_move_id),
            history,
            status,
        )
        .map_err(|e| DbError::corrupt(e.to_string()))
    }
}

fn status_columns(game: &Game) -> (&'static str, Option<i32>) {
    match *game.status() {
        GameStatus::Open => (STATUS_OPEN, None),
        GameStatus::Won { winner, .. } => (STATUS_WON, Some(winner.get())),
        GameStatus::Draw => (STATUS_DRAW, None),
    }
}

/// Insertable game for a freshly created session.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::games)]
pub struct NewGameRow {
    board_size: i32,
    cells: String,
    player_x_id: i32,
    player_o_id: i32,
    next_to_move_id: i32,
    history: String,
    status: String,
}

impl NewGameRow {
    /// Encodes a new game.
    ///
    /// # Errors
    ///
    /// Returns a [`DbError`] if the board does not serialize.
    pub fn from_game(game: &Game) -> Result<Self, DbError> {
        let (status, _) = status_columns(game);
        Ok(Self {
            board_size: column_i32(game.board().size(), "board_size")?,
            cells: serde_json::to_string(game.board().cells())?,
            player_x_id: game.player_x().get(),
            player_o_id: game.player_o().get(),
            next_to_move_id: game.next_to_move().get(),
            history: serde_json::to_string(game.history())?,
            status: status.to_string(),
        })
    }
}

/// Columns rewritten after a move.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::games)]
#[diesel(treat_none_as_null = true)]
pub struct GameChanges {
    cells: String,
    next_to_move_id: i32,
    history: String,
    status: String,
    winner_id: Option<i32>,
}

impl GameChanges {
    /// Encodes the mutable part of a game.
    ///
    /// # Errors
    ///
    /// Returns a [`DbError`] if the board does not serialize.
    pub fn from_game(game: &Game) -> Result<Self, DbError> {
        let (status, winner_id) = status_columns(game);
        Ok(Self {
            cells: serde_json::to_string(game.board().cells())?,
            next_to_move_id: game.next_to_move().get(),
            history: serde_json::to_string(game.history())?,
            status: status.to_string(),
            winner_id,
        })
    }
}

/// Row of the append-only score log.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::scores)]
pub struct ScoreRow {
    id: i32,
    game_id: i32,
    played_on: NaiveDate,
    player_x_id: i32,
    player_o_id: i32,
    result: String,
}

impl ScoreRow {
    /// Decodes the row into a settlement.
    ///
    /// # Errors
    ///
    /// Returns a corrupt-row [`DbError`] for an unknown result string.
    #[instrument(skip(self), fields(score_id = self.id, result = %self.result))]
    pub fn to_settlement(&self) -> Result<Settlement, DbError> {
        let result: MatchResult = self
            .result
            .parse()
            .map_err(|_| DbError::corrupt(format!("Invalid result: '{}'", self.result)))?;
        Ok(Settlement::new(
            self.played_on,
            PlayerId::from(self.player_x_id),
            PlayerId::from(self.player_o_id),
            result,
        ))
    }
}

/// Insertable score log entry.
#[derive(Debug, Clone, Insertable, Getters)]
#[diesel(table_name = schema::scores)]
pub struct NewScore {
    game_id: i32,
    played_on: NaiveDate,
    player_x_id: i32,
    player_o_id: i32,
    result: String,
}

impl NewScore {
    /// Encodes the settlement of game `game_id`.
    pub fn from_settlement(game_id: i32, settlement: &Settlement) -> Self {
        Self {
            game_id,
            played_on: *settlement.date(),
            player_x_id: settlement.player_x().get(),
            player_o_id: settlement.player_o().get(),
            result: settlement.result().to_string(),
        }
    }
}
