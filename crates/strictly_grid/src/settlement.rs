//! Immutable records of finished games.

use super::types::PlayerId;
use chrono::NaiveDate;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// How a finished game ended, from the seats' point of view.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchResult {
    /// The player holding X won.
    PlayerXWon,
    /// The player holding O won.
    PlayerOWon,
    /// Nobody won.
    Draw,
}

/// Outcome of one finished game, created when the game becomes terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Settlement {
    date: NaiveDate,
    player_x: PlayerId,
    player_o: PlayerId,
    result: MatchResult,
}

impl Settlement {
    /// Creates a settlement record.
    pub fn new(
        date: NaiveDate,
        player_x: PlayerId,
        player_o: PlayerId,
        result: MatchResult,
    ) -> Self {
        Self {
            date,
            player_x,
            player_o,
            result,
        }
    }

    /// Returns true if the player held either seat.
    pub fn involves(&self, player: PlayerId) -> bool {
        self.player_x == player || self.player_o == player
    }

    /// The winning player, or `None` for a draw.
    pub fn winner(&self) -> Option<PlayerId> {
        match self.result {
            MatchResult::PlayerXWon => Some(self.player_x),
            MatchResult::PlayerOWon => Some(self.player_o),
            MatchResult::Draw => None,
        }
    }

    /// The losing player, or `None` for a draw.
    pub fn loser(&self) -> Option<PlayerId> {
        match self.result {
            MatchResult::PlayerXWon => Some(self.player_o),
            MatchResult::PlayerOWon => Some(self.player_x),
            MatchResult::Draw => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 2).unwrap()
    }

    #[test]
    fn test_result_strings() {
        assert_eq!(MatchResult::PlayerXWon.to_string(), "player_x_won");
        assert_eq!(MatchResult::PlayerOWon.as_ref(), "player_o_won");
        assert_eq!("draw".parse::<MatchResult>().unwrap(), MatchResult::Draw);
        assert!("player_x".parse::<MatchResult>().is_err());
    }

    #[test]
    fn test_winner_and_loser() {
        let s = Settlement::new(
            date(),
            PlayerId::from(1),
            PlayerId::from(2),
            MatchResult::PlayerOWon,
        );
        assert_eq!(s.winner(), Some(PlayerId::from(2)));
        assert_eq!(s.loser(), Some(PlayerId::from(1)));
        assert!(s.involves(PlayerId::from(1)));
        assert!(!s.involves(PlayerId::from(3)));
    }

    #[test]
    fn test_draw_has_no_winner() {
        let s = Settlement::new(date(), PlayerId::from(1), PlayerId::from(2), MatchResult::Draw);
        assert_eq!(s.winner(), None);
        assert_eq!(s.loser(), None);
    }
}
