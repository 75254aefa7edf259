//! Service error types.

use derive_more::{Display, Error};
use strictly_grid::{MoveError, SetupError};
use tracing::instrument;

use crate::config::ConfigError;
use crate::db::{DbError, DbErrorKind};

/// Category of a service failure; callers branch on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum LeagueErrorKind {
    /// Unknown player or session.
    #[display("not found")]
    NotFound,
    /// Duplicate name, or a concurrent write won the race.
    #[display("conflict")]
    Conflict,
    /// Request arguments are unusable.
    #[display("invalid input")]
    InvalidInput,
    /// The session already ended.
    #[display("game already over")]
    GameAlreadyOver,
    /// The acting player is not due to move.
    #[display("not your turn")]
    NotYourTurn,
    /// Cell index off the board.
    #[display("invalid move")]
    InvalidMove,
    /// Cell already marked.
    #[display("cell occupied")]
    CellOccupied,
    /// Store failure.
    #[display("database")]
    Database,
    /// Stored state that could not have come from legal play.
    #[display("corrupt state")]
    Corrupt,
}

/// Service error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("{}: {} at {}:{}", kind, message, file, line)]
pub struct LeagueError {
    /// Error category.
    pub kind: LeagueErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LeagueError {
    /// Creates a new error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: LeagueErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for [`LeagueErrorKind::NotFound`].
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(LeagueErrorKind::NotFound, message)
    }

    /// Shorthand for [`LeagueErrorKind::InvalidInput`].
    #[track_caller]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(LeagueErrorKind::InvalidInput, message)
    }
}

impl From<DbError> for LeagueError {
    #[track_caller]
    fn from(err: DbError) -> Self {
        let kind = match err.kind {
            DbErrorKind::UniqueViolation | DbErrorKind::StaleVersion => LeagueErrorKind::Conflict,
            DbErrorKind::Corrupt => LeagueErrorKind::Corrupt,
            DbErrorKind::Connection | DbErrorKind::Query => LeagueErrorKind::Database,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<diesel::result::Error> for LeagueError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::from(DbError::from(err))
    }
}

impl From<MoveError> for LeagueError {
    #[track_caller]
    fn from(err: MoveError) -> Self {
        let kind = match err {
            MoveError::GameAlreadyOver => LeagueErrorKind::GameAlreadyOver,
            MoveError::NotYourTurn { .. } => LeagueErrorKind::NotYourTurn,
            MoveError::InvalidMove { .. } => LeagueErrorKind::InvalidMove,
            MoveError::CellOccupied(_) => LeagueErrorKind::CellOccupied,
            MoveError::InvariantViolation(_) => LeagueErrorKind::Corrupt,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<SetupError> for LeagueError {
    #[track_caller]
    fn from(err: SetupError) -> Self {
        let kind = match err {
            SetupError::SamePlayer(_) | SetupError::Board(_) => LeagueErrorKind::InvalidInput,
            SetupError::Inconsistent(_) => LeagueErrorKind::Corrupt,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<ConfigError> for LeagueError {
    #[track_caller]
    fn from(err: ConfigError) -> Self {
        Self::invalid_input(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_grid::PlayerId;

    #[test]
    fn test_move_errors_keep_their_kind() {
        let cases = [
            (MoveError::GameAlreadyOver, LeagueErrorKind::GameAlreadyOver),
            (
                MoveError::NotYourTurn {
                    player: PlayerId::from(1),
                    expected: PlayerId::from(2),
                },
                LeagueErrorKind::NotYourTurn,
            ),
            (
                MoveError::InvalidMove { index: 9, len: 9 },
                LeagueErrorKind::InvalidMove,
            ),
            (MoveError::CellOccupied(4), LeagueErrorKind::CellOccupied),
        ];
        for (err, kind) in cases {
            assert_eq!(LeagueError::from(err).kind, kind);
        }
    }

    #[test]
    fn test_stale_version_is_a_conflict() {
        let err = LeagueError::from(DbError::with_kind(DbErrorKind::StaleVersion, "lost"));
        assert_eq!(err.kind, LeagueErrorKind::Conflict);
    }
}
