//! Session state machine.
//!
//! A [`Game`] is `Open` until a move completes a line or fills the
//! board, then it is terminal for good. Moves are validated by
//! [`MoveContract`] before anything changes and applied to a scratch
//! copy that only replaces `self` once every postcondition holds.

use super::action::{Move, MoveError, MoveRequest};
use super::board::{Board, BoardError};
use super::contracts::{Contract, MoveContract};
use super::invariants::{GameInvariants, InvariantSet};
use super::rules::{self, Resolution};
use super::settlement::{MatchResult, Settlement};
use super::types::{Mark, PlayerId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Where a game stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Accepting moves.
    Open,
    /// A player completed a line.
    Won {
        /// The winning player.
        winner: PlayerId,
        /// The winner's mark.
        mark: Mark,
    },
    /// The board filled without a completed line.
    Draw,
}

impl GameStatus {
    /// Returns true once the game has ended.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::Open)
    }
}

/// What an accepted move did to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Game continues with the other player.
    Continued {
        /// Player now due to move.
        next_to_move: PlayerId,
    },
    /// The acting player won.
    Won {
        /// The acting player.
        winner: PlayerId,
        /// Their opponent.
        loser: PlayerId,
        /// The winning mark.
        mark: Mark,
    },
    /// The board is full with no winner.
    Drawn,
}

impl Transition {
    /// Returns true if the move ended the game.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Transition::Continued { .. })
    }
}

/// Errors building or restoring a game.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SetupError {
    /// Both seats were given the same player.
    #[display("Player {} cannot play against themselves", _0)]
    SamePlayer(PlayerId),

    /// Board could not be built.
    #[display("{}", _0)]
    Board(BoardError),

    /// Persisted state contradicts the rules.
    #[display("Inconsistent game state: {}", _0)]
    Inconsistent(String),
}

impl std::error::Error for SetupError {}

impl From<BoardError> for SetupError {
    fn from(err: BoardError) -> Self {
        SetupError::Board(err)
    }
}

/// One game between two players on an N-by-N board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub(crate) board: Board,
    player_x: PlayerId,
    player_o: PlayerId,
    pub(crate) next_to_move: PlayerId,
    pub(crate) history: Vec<Move>,
    pub(crate) status: GameStatus,
}

impl Game {
    /// Creates an open game. Player X moves first.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::SamePlayer`] if both seats hold the same player
    /// and [`SetupError::Board`] for a board size of zero.
    #[instrument]
    pub fn new(player_x: PlayerId, player_o: PlayerId, size: usize) -> Result<Self, SetupError> {
        if player_x == player_o {
            return Err(SetupError::SamePlayer(player_x));
        }
        let board = Board::new(size)?;
        info!(%player_x, %player_o, size, "New game");
        Ok(Self {
            board,
            player_x,
            player_o,
            next_to_move: player_x,
            history: Vec::new(),
            status: GameStatus::Open,
        })
    }

    /// Rebuilds a game from persisted parts, verifying every invariant.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] when the parts could not have been produced
    /// by legal play.
    #[instrument(skip(board, history), fields(size = board.size(), moves = history.len()))]
    pub fn restore(
        board: Board,
        player_x: PlayerId,
        player_o: PlayerId,
        next_to_move: PlayerId,
        history: Vec<Move>,
        status: GameStatus,
    ) -> Result<Self, SetupError> {
        if player_x == player_o {
            return Err(SetupError::SamePlayer(player_x));
        }
        if next_to_move != player_x && next_to_move != player_o {
            return Err(SetupError::Inconsistent(format!(
                "next player {} is not seated",
                next_to_move
            )));
        }

        let game = Self {
            board,
            player_x,
            player_o,
            next_to_move,
            history,
            status,
        };

        GameInvariants::check_all(&game).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            warn!(%descriptions, "Restored game violates invariants");
            SetupError::Inconsistent(descriptions)
        })?;

        debug!("Game restored");
        Ok(game)
    }

    /// Applies a move for `player` at `index`.
    ///
    /// Preconditions are checked in order: the game is open, it is the
    /// player's turn, the index is on the board, the cell is empty. On
    /// failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns the [`MoveError`] for the first precondition that fails.
    #[instrument(skip(self), fields(size = self.board.size(), moves = self.history.len()))]
    pub fn apply_move(&mut self, player: PlayerId, index: usize) -> Result<Transition, MoveError> {
        let request = MoveRequest::new(player, index);
        MoveContract::pre(self, &request).inspect_err(|e| {
            warn!(error = %e, %player, index, "Move rejected");
        })?;

        let mark = self
            .mark_of(player)
            .ok_or_else(|| MoveError::InvariantViolation(format!("player {} is not seated", player)))?;
        let opponent = self.player_for(mark.opponent());

        let mut next = self.clone();
        next.board.place(index, mark)?;
        next.history.push(Move::new(mark, index));

        let transition = match rules::resolve(&next.board, index, mark) {
            Resolution::Win(mark) => {
                next.status = GameStatus::Won {
                    winner: player,
                    mark,
                };
                Transition::Won {
                    winner: player,
                    loser: opponent,
                    mark,
                }
            }
            Resolution::Draw => {
                next.status = GameStatus::Draw;
                Transition::Drawn
            }
            Resolution::Ongoing => {
                next.next_to_move = opponent;
                Transition::Continued {
                    next_to_move: opponent,
                }
            }
        };

        // Postcondition: verify contract in debug builds
        #[cfg(debug_assertions)]
        MoveContract::post(self, &next)?;

        *self = next;
        info!(%player, index, ?transition, "Move applied");
        Ok(transition)
    }

    /// Builds the settlement record for a finished game.
    ///
    /// Returns `None` while the game is open.
    pub fn settlement(&self, date: NaiveDate) -> Option<Settlement> {
        let result = match self.status {
            GameStatus::Open => return None,
            GameStatus::Won { mark: Mark::X, .. } => MatchResult::PlayerXWon,
            GameStatus::Won { mark: Mark::O, .. } => MatchResult::PlayerOWon,
            GameStatus::Draw => MatchResult::Draw,
        };
        Some(Settlement::new(date, self.player_x, self.player_o, result))
    }

    /// Returns the mark a player uses, or `None` if they are not seated.
    pub fn mark_of(&self, player: PlayerId) -> Option<Mark> {
        if player == self.player_x {
            Some(Mark::X)
        } else if player == self.player_o {
            Some(Mark::O)
        } else {
            None
        }
    }

    /// Returns the player using `mark`.
    pub fn player_for(&self, mark: Mark) -> PlayerId {
        match mark {
            Mark::X => self.player_x,
            Mark::O => self.player_o,
        }
    }

    /// Returns true if the player holds either seat.
    pub fn is_participant(&self, player: PlayerId) -> bool {
        self.mark_of(player).is_some()
    }

    /// Empty cells while the game is open; nothing once it has ended.
    pub fn valid_moves(&self) -> Vec<usize> {
        if self.status.is_terminal() {
            Vec::new()
        } else {
            self.board.empty_cells()
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the player holding X.
    pub fn player_x(&self) -> PlayerId {
        self.player_x
    }

    /// Returns the player holding O.
    pub fn player_o(&self) -> PlayerId {
        self.player_o
    }

    /// Returns the player allowed to act.
    pub fn next_to_move(&self) -> PlayerId {
        self.next_to_move
    }

    /// Returns the move history, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Returns the game status.
    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    /// Returns true once the game has ended.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns the winner, if the game was won.
    pub fn winner(&self) -> Option<PlayerId> {
        match self.status {
            GameStatus::Won { winner, .. } => Some(winner),
            _ => None,
        }
    }

    /// Returns true if the game ended in a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self.status, GameStatus::Draw)
    }

    /// Returns a status line for display.
    pub fn status_string(&self) -> String {
        match self.status {
            GameStatus::Open => format!("In progress. Player {} to move.", self.next_to_move),
            GameStatus::Won { winner, mark } => {
                format!("Game over. Player {} ({}) wins!", winner, mark)
            }
            GameStatus::Draw => "Game over. Draw!".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: PlayerId = PlayerId(1);
    const BOB: PlayerId = PlayerId(2);

    fn play(game: &mut Game, moves: &[usize]) -> Transition {
        let mut last = None;
        for &index in moves {
            let player = game.next_to_move();
            last = Some(game.apply_move(player, index).expect("legal move"));
        }
        last.expect("at least one move")
    }

    #[test]
    fn test_same_player_rejected() {
        assert_eq!(
            Game::new(ALICE, ALICE, 3).unwrap_err(),
            SetupError::SamePlayer(ALICE)
        );
    }

    #[test]
    fn test_x_moves_first() {
        let game = Game::new(ALICE, BOB, 3).unwrap();
        assert_eq!(game.next_to_move(), ALICE);
        assert_eq!(game.mark_of(BOB), Some(Mark::O));
        assert_eq!(game.valid_moves().len(), 9);
    }

    #[test]
    fn test_turn_flips() {
        let mut game = Game::new(ALICE, BOB, 3).unwrap();
        let t = game.apply_move(ALICE, 4).unwrap();
        assert_eq!(t, Transition::Continued { next_to_move: BOB });
        assert_eq!(game.next_to_move(), BOB);
        assert_eq!(game.history(), &[Move::new(Mark::X, 4)]);
    }

    #[test]
    fn test_precondition_order() {
        let mut game = Game::new(ALICE, BOB, 3).unwrap();
        game.apply_move(ALICE, 0).unwrap();

        // Wrong player with an out-of-range index reports the turn first
        assert_eq!(
            game.apply_move(ALICE, 99).unwrap_err(),
            MoveError::NotYourTurn {
                player: ALICE,
                expected: BOB
            }
        );
        // Right player, out of range, reports the index before occupancy
        assert_eq!(
            game.apply_move(BOB, 9).unwrap_err(),
            MoveError::InvalidMove { index: 9, len: 9 }
        );
        assert_eq!(game.apply_move(BOB, 0).unwrap_err(), MoveError::CellOccupied(0));
    }

    #[test]
    fn test_failed_move_changes_nothing() {
        let mut game = Game::new(ALICE, BOB, 3).unwrap();
        game.apply_move(ALICE, 0).unwrap();
        let before = game.clone();
        assert!(game.apply_move(BOB, 0).is_err());
        assert!(game.apply_move(ALICE, 1).is_err());
        assert_eq!(game, before);
    }

    #[test]
    fn test_win_ends_game() {
        let mut game = Game::new(ALICE, BOB, 3).unwrap();
        let t = play(&mut game, &[0, 3, 1, 4, 2]);
        assert_eq!(
            t,
            Transition::Won {
                winner: ALICE,
                loser: BOB,
                mark: Mark::X
            }
        );
        assert_eq!(game.winner(), Some(ALICE));
        assert!(game.valid_moves().is_empty());
        // Terminal games keep rejecting
        for _ in 0..3 {
            assert_eq!(game.apply_move(BOB, 8).unwrap_err(), MoveError::GameAlreadyOver);
        }
    }

    #[test]
    fn test_draw_ends_game() {
        let mut game = Game::new(ALICE, BOB, 3).unwrap();
        // X O X / X O O / O X X
        let t = play(&mut game, &[0, 1, 2, 4, 3, 5, 7, 6, 8]);
        assert_eq!(t, Transition::Drawn);
        assert!(game.is_draw());
        assert!(game.board().is_full());
    }

    #[test]
    fn test_settlement_only_when_terminal() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let mut game = Game::new(ALICE, BOB, 3).unwrap();
        assert!(game.settlement(date).is_none());

        play(&mut game, &[3, 0, 4, 1, 8, 2]);
        let settlement = game.settlement(date).unwrap();
        assert_eq!(*settlement.result(), MatchResult::PlayerOWon);
        assert_eq!(settlement.winner(), Some(BOB));
    }

    #[test]
    fn test_restore_round_trip() {
        let mut game = Game::new(ALICE, BOB, 4).unwrap();
        play(&mut game, &[0, 5, 10]);
        let restored = Game::restore(
            game.board().clone(),
            ALICE,
            BOB,
            game.next_to_move(),
            game.history().to_vec(),
            *game.status(),
        )
        .unwrap();
        assert_eq!(restored, game);
    }

    #[test]
    fn test_restore_rejects_wrong_turn() {
        let mut game = Game::new(ALICE, BOB, 3).unwrap();
        play(&mut game, &[0]);
        let err = Game::restore(
            game.board().clone(),
            ALICE,
            BOB,
            ALICE,
            game.history().to_vec(),
            GameStatus::Open,
        )
        .unwrap_err();
        assert!(matches!(err, SetupError::Inconsistent(_)));
    }

    #[test]
    fn test_restore_rejects_missing_history() {
        let mut board = Board::new(3).unwrap();
        board.place(4, Mark::X).unwrap();
        let err = Game::restore(board, ALICE, BOB, BOB, Vec::new(), GameStatus::Open).unwrap_err();
        assert!(matches!(err, SetupError::Inconsistent(_)));
    }
}
