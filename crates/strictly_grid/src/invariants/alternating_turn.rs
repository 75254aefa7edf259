//! Alternating turn invariant: marks alternate X, O, X, O, ...

use super::super::{Game, Mark};
use super::Invariant;

/// Invariant: marks alternate starting with X.
///
/// While the game is open the player due to move owns the mark that
/// comes next in the sequence.
pub struct AlternatingTurnInvariant;

impl Invariant<Game> for AlternatingTurnInvariant {
    fn holds(game: &Game) -> bool {
        let history = game.history();

        let alternates = history.iter().enumerate().all(|(i, mov)| {
            let expected = if i % 2 == 0 { Mark::X } else { Mark::O };
            mov.mark == expected
        });
        if !alternates {
            return false;
        }

        if game.is_terminal() {
            return true;
        }

        let expected_next = if history.len() % 2 == 0 {
            Mark::X
        } else {
            Mark::O
        };
        game.next_to_move() == game.player_for(expected_next)
    }

    fn description() -> &'static str {
        "Players alternate turns (X, O, X, O, ...)"
    }
}
