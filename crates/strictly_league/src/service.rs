//! League business logic.
//!
//! [`LeagueService`] addresses players by name and sessions by id. Every
//! write runs in one immediate transaction, and events go out only after
//! it commits.

use std::sync::Arc;

use chrono::Utc;
use derive_getters::Getters;
use diesel::SqliteConnection;
use strictly_grid::{
    Game, Move, PlayerId, Settlement, Standing, Transition, apply_settlement, rank,
};
use tracing::{debug, info, instrument, warn};

use crate::config::LeagueConfig;
use crate::db::{
    DbError, GameChanges, GameRow, LeagueRepository, NewGameRow, NewScore, NewUser, ScoreRow,
    User, UserCounters, games, scores, users,
};
use crate::error::{LeagueError, LeagueErrorKind};
use crate::events::{EventSink, GameEvent};
use crate::finished_games::FinishedGames;

/// A stored game with the names of its players.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Session {
    id: i32,
    game: Game,
    player_x_name: String,
    player_o_name: String,
    lock_version: i32,
}

impl Session {
    /// Name of the player due to move.
    pub fn next_to_move_name(&self) -> &str {
        if self.game.next_to_move() == self.game.player_x() {
            &self.player_x_name
        } else {
            &self.player_o_name
        }
    }

    /// Name of a seated player.
    pub fn name_of(&self, player: PlayerId) -> Option<&str> {
        if player == self.game.player_x() {
            Some(&self.player_x_name)
        } else if player == self.game.player_o() {
            Some(&self.player_o_name)
        } else {
            None
        }
    }
}

/// Result of an accepted move.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct MoveOutcome {
    session: Session,
    transition: Transition,
    settlement: Option<Settlement>,
}

/// Service layer over the league database.
#[derive(Debug, Clone)]
pub struct LeagueService {
    repository: LeagueRepository,
    config: LeagueConfig,
    events: Arc<dyn EventSink>,
    finished: FinishedGames,
}

/// Cheap structural check: one `@`, a non-empty local part and a dotted domain.
fn plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn require_user(conn: &mut SqliteConnection, name: &str) -> Result<User, LeagueError> {
    users::find_by_name(conn, name)?
        .ok_or_else(|| LeagueError::not_found(format!("No player named '{}'", name)))
}

fn require_user_by_id(conn: &mut SqliteConnection, player: PlayerId) -> Result<User, LeagueError> {
    users::find_by_id(conn, player.get())?.ok_or_else(|| {
        LeagueError::new(
            LeagueErrorKind::Corrupt,
            format!("Seated player {} does not exist", player),
        )
    })
}

fn require_game(conn: &mut SqliteConnection, session_id: i32) -> Result<GameRow, LeagueError> {
    games::find_by_id(conn, session_id)?
        .ok_or_else(|| LeagueError::not_found(format!("No game with id {}", session_id)))
}

fn load_session(conn: &mut SqliteConnection, row: &GameRow) -> Result<Session, LeagueError> {
    let game = row.to_game()?;
    let x = require_user_by_id(conn, game.player_x())?;
    let o = require_user_by_id(conn, game.player_o())?;
    Ok(Session {
        id: *row.id(),
        game,
        player_x_name: x.name().clone(),
        player_o_name: o.name().clone(),
        lock_version: *row.lock_version(),
    })
}

fn settlements(rows: Vec<ScoreRow>) -> Result<Vec<Settlement>, DbError> {
    rows.iter().map(|row| row.to_settlement()).collect()
}

impl LeagueService {
    /// Creates a service over an already migrated repository.
    #[instrument(skip_all)]
    pub fn new(
        repository: LeagueRepository,
        config: LeagueConfig,
        events: Arc<dyn EventSink>,
        finished: FinishedGames,
    ) -> Self {
        info!(db = %repository.db_path(), "Creating LeagueService");
        Self {
            repository,
            config,
            events,
            finished,
        }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &LeagueRepository {
        &self.repository
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &LeagueConfig {
        &self.config
    }

    /// Registers a player with zeroed counters.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a blank name or implausible e-mail address,
    /// `Conflict` if the name is taken.
    #[instrument(skip(self))]
    pub fn register_player(&self, name: &str, email: &str) -> Result<User, LeagueError> {
        debug!("Registering player");
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(LeagueError::invalid_input("Player name must not be empty"));
        }
        if !plausible_email(email) {
            return Err(LeagueError::invalid_input(format!(
                "'{}' is not a valid e-mail address",
                email
            )));
        }

        self.repository.write(|conn| {
            if users::find_by_name(conn, name)?.is_some() {
                warn!(name, "Player name taken");
                return Err(LeagueError::new(
                    LeagueErrorKind::Conflict,
                    format!("A player named '{}' already exists", name),
                ));
            }
            Ok(users::insert(conn, &NewUser::new(name.to_string(), email.to_string()))?)
        })
    }

    /// Looks up a player by name.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown name.
    #[instrument(skip(self))]
    pub fn get_player(&self, name: &str) -> Result<User, LeagueError> {
        self.repository.read(|conn| require_user(conn, name))
    }

    /// Starts a session; `player_x` moves first.
    ///
    /// `board_size` defaults to the configured size.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a size outside `1..=max_board_size` or identical
    /// players, `NotFound` for an unknown player.
    #[instrument(skip(self))]
    pub fn create_session(
        &self,
        player_x: &str,
        player_o: &str,
        board_size: Option<usize>,
    ) -> Result<Session, LeagueError> {
        let size = board_size.unwrap_or(*self.config.default_board_size());
        let max = *self.config.max_board_size();
        if size == 0 || size > max {
            return Err(LeagueError::invalid_input(format!(
                "Board size must be within 1..={}, got {}",
                max, size
            )));
        }
        if player_x == player_o {
            return Err(LeagueError::invalid_input(format!(
                "Player '{}' cannot play against themselves",
                player_x
            )));
        }

        let session = self.repository.write(|conn| {
            let x = require_user(conn, player_x)?;
            let o = require_user(conn, player_o)?;
            let game = Game::new(x.player_id(), o.player_id(), size)?;
            let row = games::insert(conn, &NewGameRow::from_game(&game)?)?;
            Ok::<_, LeagueError>(Session {
                id: *row.id(),
                game,
                player_x_name: x.name().clone(),
                player_o_name: o.name().clone(),
                lock_version: *row.lock_version(),
            })
        })?;

        info!(session_id = session.id, size, "Session created");
        Ok(session)
    }

    /// Applies a move for the named player.
    ///
    /// The move, the session update and, on a terminal move, both players'
    /// counters and the score log entry commit together.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown session or player, then the first failing
    /// precondition: `GameAlreadyOver`, `NotYourTurn`, `InvalidMove`,
    /// `CellOccupied`. `Conflict` if another writer changed the session.
    pub fn apply_move(
        &self,
        session_id: i32,
        player: &str,
        index: usize,
    ) -> Result<MoveOutcome, LeagueError> {
        self.apply_move_inner(session_id, player, index, None)
    }

    /// Like [`Self::apply_move`], but only if the session is still at the
    /// `lock_version` the caller last saw.
    ///
    /// # Errors
    ///
    /// As [`Self::apply_move`]; a version mismatch is a `Conflict`.
    pub fn apply_move_at_version(
        &self,
        session_id: i32,
        player: &str,
        index: usize,
        expected_version: i32,
    ) -> Result<MoveOutcome, LeagueError> {
        self.apply_move_inner(session_id, player, index, Some(expected_version))
    }

    #[instrument(skip(self))]
    fn apply_move_inner(
        &self,
        session_id: i32,
        player: &str,
        index: usize,
        expected_version: Option<i32>,
    ) -> Result<MoveOutcome, LeagueError> {
        debug!("Applying move");
        let (outcome, score_id) = self.repository.write(|conn| {
            let row = require_game(conn, session_id)?;
            let actor = require_user(conn, player)?;
            let mut session = load_session(conn, &row)?;

            let transition = session.game.apply_move(actor.player_id(), index)?;

            let version = expected_version.unwrap_or(*row.lock_version());
            let updated = games::update_with_version(
                conn,
                session_id,
                version,
                &GameChanges::from_game(&session.game)?,
            )?;
            session.lock_version = *updated.lock_version();

            let settlement = session.game.settlement(Utc::now().date_naive());
            let score_id = match &settlement {
                Some(settlement) => Some(settle(conn, session_id, &session.game, settlement)?),
                None => None,
            };

            Ok::<_, LeagueError>((
                MoveOutcome {
                    session,
                    transition,
                    settlement,
                },
                score_id,
            ))
        })?;

        self.publish(&outcome, score_id);
        Ok(outcome)
    }

    fn publish(&self, outcome: &MoveOutcome, score_id: Option<i32>) {
        let session_id = outcome.session.id;
        match (outcome.transition, outcome.settlement, score_id) {
            (Transition::Continued { next_to_move }, _, _) => {
                self.events.emit(GameEvent::TurnAdvanced {
                    session_id,
                    next_player: next_to_move,
                    next_player_name: outcome.session.next_to_move_name().to_string(),
                });
            }
            (_, Some(settlement), Some(score_id)) => {
                self.events.emit(GameEvent::GameEnded {
                    session_id,
                    score_id,
                    result: *settlement.result(),
                });
            }
            (transition, _, _) => {
                warn!(session_id, ?transition, "Terminal move without settlement");
            }
        }
    }

    /// Deletes an unfinished session.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown session, `GameAlreadyOver` once it has ended.
    #[instrument(skip(self))]
    pub fn cancel_session(&self, session_id: i32) -> Result<(), LeagueError> {
        self.repository.write(|conn| {
            let row = require_game(conn, session_id)?;
            if row.to_game()?.is_terminal() {
                warn!(session_id, "Refusing to cancel a finished game");
                return Err(LeagueError::new(
                    LeagueErrorKind::GameAlreadyOver,
                    format!("Game {} is over and cannot be cancelled", session_id),
                ));
            }
            games::delete(conn, session_id)?;
            Ok(())
        })?;
        info!(session_id, "Session cancelled");
        Ok(())
    }

    /// Loads a session.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    #[instrument(skip(self))]
    pub fn get_session(&self, session_id: i32) -> Result<Session, LeagueError> {
        self.repository.read(|conn| {
            let row = require_game(conn, session_id)?;
            load_session(conn, &row)
        })
    }

    /// Open sessions in which the named player holds either seat.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown player.
    #[instrument(skip(self))]
    pub fn list_open_sessions_for_player(&self, player: &str) -> Result<Vec<Session>, LeagueError> {
        self.repository.read(|conn| {
            let user = require_user(conn, player)?;
            let rows = games::list_open_for_player(conn, *user.id())?;
            rows.iter().map(|row| load_session(conn, row)).collect()
        })
    }

    /// Moves of a session, oldest first.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    #[instrument(skip(self))]
    pub fn get_history(&self, session_id: i32) -> Result<Vec<Move>, LeagueError> {
        let session = self.get_session(session_id)?;
        Ok(session.game.history().to_vec())
    }

    /// Players with at least one finished game, best first.
    ///
    /// # Errors
    ///
    /// Fails only if the store cannot be read.
    #[instrument(skip(self))]
    pub fn rank_players(&self) -> Result<Vec<Standing>, LeagueError> {
        let active = self.repository.read(users::list_active)?;
        let standings = active
            .iter()
            .map(User::standing)
            .collect::<Result<Vec<_>, _>>()?;
        let ranked = rank(standings);
        debug!(count = ranked.len(), "Players ranked");
        Ok(ranked)
    }

    /// Settlements of every game the named player finished.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown player.
    #[instrument(skip(self))]
    pub fn scores_for_player(&self, player: &str) -> Result<Vec<Settlement>, LeagueError> {
        self.repository.read(|conn| {
            let user = require_user(conn, player)?;
            Ok(settlements(scores::for_player(conn, *user.id())?)?)
        })
    }

    /// The whole score log, oldest first.
    ///
    /// # Errors
    ///
    /// Fails only if the store cannot be read.
    #[instrument(skip(self))]
    pub fn all_scores(&self) -> Result<Vec<Settlement>, LeagueError> {
        let rows = self.repository.read(scores::all)?;
        Ok(settlements(rows)?)
    }

    /// Number of finished games, served from the cache when warm.
    ///
    /// # Errors
    ///
    /// Fails only if a cold cache cannot be seeded from the store.
    #[instrument(skip(self))]
    pub fn finished_games(&self) -> Result<u64, LeagueError> {
        Ok(self.finished.get(&self.repository)?)
    }

    /// Returns the finished-games cache handle.
    pub fn finished_games_cache(&self) -> &FinishedGames {
        &self.finished
    }
}

/// Applies a settlement to both players and appends it to the score log.
///
/// Runs inside the move's transaction. Returns the score row id.
#[instrument(skip(conn, game, settlement), fields(result = %settlement.result()))]
fn settle(
    conn: &mut SqliteConnection,
    session_id: i32,
    game: &Game,
    settlement: &Settlement,
) -> Result<i32, LeagueError> {
    let x = require_user_by_id(conn, game.player_x())?;
    let o = require_user_by_id(conn, game.player_o())?;
    let mut x_standing = x.standing()?;
    let mut o_standing = o.standing()?;

    apply_settlement(settlement, &mut x_standing, &mut o_standing)
        .map_err(|e| LeagueError::new(LeagueErrorKind::Corrupt, e.to_string()))?;

    users::update_counters(conn, *x.id(), &UserCounters::from_standing(&x_standing)?)?;
    users::update_counters(conn, *o.id(), &UserCounters::from_standing(&o_standing)?)?;
    let score = scores::insert(conn, &NewScore::from_settlement(session_id, settlement))?;

    info!(session_id, score_id = score.id(), "Game settled");
    Ok(*score.id())
}
