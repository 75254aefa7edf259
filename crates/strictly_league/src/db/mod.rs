//! Database persistence layer for players, sessions and the score log.

mod error;
pub mod games;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only
pub mod scores;
pub mod users;

pub use error::{DbError, DbErrorKind};
pub use models::{
    GameChanges, GameRow, NewGameRow, NewScore, NewUser, STATUS_DRAW, STATUS_OPEN, STATUS_WON,
    ScoreRow, User, UserCounters,
};
pub use repository::{LeagueRepository, MIGRATIONS};
