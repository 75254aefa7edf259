//! Strictly League - tic-tac-toe league service.
//!
//! Durable N-by-N tic-tac-toe sessions between registered players, with
//! standings and an append-only score log.
//!
//! # Architecture
//!
//! - **Rules**: the pure `strictly_grid` engine validates and resolves moves
//! - **Store**: SQLite through diesel, one immediate transaction per write
//! - **Service**: [`LeagueService`] exposes every operation by player name
//!   and session id
//! - **Events**: turn and game-end events fan out to listeners after commit
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_league::{FinishedGames, LeagueConfig, LeagueRepository, LeagueService, NullSink};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = LeagueConfig::default();
//! let repository = LeagueRepository::new(config.database_url().clone(), *config.busy_timeout_ms());
//! repository.run_migrations()?;
//!
//! let league = LeagueService::new(repository, config, Arc::new(NullSink), FinishedGames::new());
//! league.register_player("ann", "ann@example.com")?;
//! league.register_player("bob", "bob@example.com")?;
//! let session = league.create_session("ann", "bob", None)?;
//! league.apply_move(*session.id(), "ann", 4)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
pub mod db;
mod error;
mod events;
mod finished_games;
mod service;

pub use config::{BOARD_SIZE_LIMIT, ConfigError, DATABASE_URL_ENV, LeagueConfig, MAX_BOARD_SIZE_ENV};
pub use db::{DbError, DbErrorKind, LeagueRepository, User};
pub use error::{LeagueError, LeagueErrorKind};
pub use events::{BroadcastSink, EventSink, GameEvent, NullSink, ReminderNotifier};
pub use finished_games::FinishedGames;
pub use service::{LeagueService, MoveOutcome, Session};
