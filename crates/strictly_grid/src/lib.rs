//! N-by-N tic-tac-toe engine.
//!
//! Pure game logic with no I/O: the [`Board`], win and draw resolution in
//! [`rules`], the [`Game`] state machine guarded by [`contracts`] and
//! [`invariants`], and the [`ledger`] that turns [`Settlement`]s into
//! standings and rankings.
//!
//! # Example
//!
//! ```
//! use strictly_grid::{Game, PlayerId, Transition};
//!
//! let (ann, bob) = (PlayerId::from(1), PlayerId::from(2));
//! let mut game = Game::new(ann, bob, 3)?;
//! for (player, index) in [(ann, 0), (bob, 3), (ann, 1), (bob, 4)] {
//!     game.apply_move(player, index)?;
//! }
//! let transition = game.apply_move(ann, 2)?;
//! assert!(matches!(transition, Transition::Won { winner, .. } if winner == ann));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod board;
pub mod contracts;
mod game;
pub mod invariants;
pub mod ledger;
pub mod rules;
mod settlement;
mod types;

pub use action::{Move, MoveError, MoveRequest};
pub use board::{Board, BoardError};
pub use contracts::{Contract, LegalMove, MoveContract};
pub use game::{Game, GameStatus, SetupError, Transition};
pub use invariants::{GameInvariants, Invariant, InvariantSet, InvariantViolation};
pub use ledger::{LedgerError, Standing, apply_settlement, rank};
pub use rules::{Line, Resolution, resolve};
pub use settlement::{MatchResult, Settlement};
pub use types::{Cell, Mark, PlayerId};
