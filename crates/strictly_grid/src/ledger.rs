//! Per-player standings and the ranking table.
//!
//! Counters only move through [`Standing::settle_win`],
//! [`Standing::settle_draw`] and [`apply_settlement`]; each call counts
//! exactly one finished game.

use super::settlement::Settlement;
use super::types::PlayerId;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::{debug, instrument, warn};

/// Points for a win.
pub const WIN_POINTS: u32 = 3;
/// Points for a draw.
pub const DRAW_POINTS: u32 = 1;

/// Errors applying a settlement to standings.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum LedgerError {
    /// The standing passed for a seat belongs to someone else.
    #[display("Standing for player {} does not match seat held by {}", found, expected)]
    SeatMismatch {
        /// Player seated in the game.
        expected: PlayerId,
        /// Player whose standing was supplied.
        found: PlayerId,
    },
}

impl std::error::Error for LedgerError {}

/// Cumulative record of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Standing {
    player: PlayerId,
    name: String,
    wins: u32,
    draws: u32,
    games_played: u32,
}

impl Standing {
    /// A player with no games yet.
    pub fn new(player: PlayerId, name: impl Into<String>) -> Self {
        Self::with_counters(player, name, 0, 0, 0)
    }

    /// Restores a standing from stored counters.
    pub fn with_counters(
        player: PlayerId,
        name: impl Into<String>,
        wins: u32,
        draws: u32,
        games_played: u32,
    ) -> Self {
        Self {
            player,
            name: name.into(),
            wins,
            draws,
            games_played,
        }
    }

    /// `wins * 3 + draws`.
    pub fn points(&self) -> u32 {
        self.wins * WIN_POINTS + self.draws * DRAW_POINTS
    }

    /// Games neither won nor drawn.
    pub fn losses(&self) -> u32 {
        self.games_played.saturating_sub(self.wins + self.draws)
    }

    /// Share of games won, 0.0 before the first game.
    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.games_played)
        }
    }

    /// Share of games won or drawn, 0.0 before the first game.
    pub fn win_draw_rate(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            f64::from(self.wins + self.draws) / f64::from(self.games_played)
        }
    }

    /// Counts a win for `winner` and a played game for both.
    #[instrument(skip_all, fields(winner = %winner.player, loser = %loser.player))]
    pub fn settle_win(winner: &mut Standing, loser: &mut Standing) {
        winner.wins += 1;
        winner.games_played += 1;
        loser.games_played += 1;
        debug!("Win settled");
    }

    /// Counts a draw and a played game for both.
    #[instrument(skip_all, fields(a = %a.player, b = %b.player))]
    pub fn settle_draw(a: &mut Standing, b: &mut Standing) {
        a.draws += 1;
        a.games_played += 1;
        b.draws += 1;
        b.games_played += 1;
        debug!("Draw settled");
    }
}

/// Applies a settlement to the standings of its two seats.
///
/// # Errors
///
/// Returns [`LedgerError::SeatMismatch`] if `x` or `o` is not the
/// standing of the player seated with that mark. Nothing changes then.
#[instrument(skip(x, o))]
pub fn apply_settlement(
    settlement: &Settlement,
    x: &mut Standing,
    o: &mut Standing,
) -> Result<(), LedgerError> {
    for (expected, found) in [(*settlement.player_x(), x.player), (*settlement.player_o(), o.player)] {
        if expected != found {
            warn!(%expected, %found, "Settlement seats do not match standings");
            return Err(LedgerError::SeatMismatch { expected, found });
        }
    }

    match settlement.winner() {
        Some(winner) if winner == x.player => Standing::settle_win(x, o),
        Some(_) => Standing::settle_win(o, x),
        None => Standing::settle_draw(x, o),
    }
    Ok(())
}

/// Ranking table: players who have played, best first.
///
/// Ordered by points descending, then by player id ascending so equal
/// scores list earlier registrations first.
pub fn rank(standings: impl IntoIterator<Item = Standing>) -> Vec<Standing> {
    let mut ranked: Vec<Standing> = standings
        .into_iter()
        .filter(|s| s.games_played > 0)
        .collect();
    ranked.sort_by_key(|s| (Reverse(s.points()), s.player));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchResult;
    use chrono::NaiveDate;

    fn pid(n: i32) -> PlayerId {
        PlayerId::from(n)
    }

    fn settlement(result: MatchResult) -> Settlement {
        let date = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        Settlement::new(date, pid(1), pid(2), result)
    }

    #[test]
    fn test_points_and_rates() {
        let s = Standing::with_counters(pid(1), "ann", 2, 1, 4);
        assert_eq!(s.points(), 7);
        assert_eq!(s.losses(), 1);
        assert!((s.win_rate() - 0.5).abs() < f64::EPSILON);
        assert!((s.win_draw_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rates_zero_without_games() {
        let s = Standing::new(pid(1), "ann");
        assert_eq!(s.win_rate(), 0.0);
        assert_eq!(s.win_draw_rate(), 0.0);
    }

    #[test]
    fn test_apply_win_for_o() {
        let mut x = Standing::new(pid(1), "ann");
        let mut o = Standing::new(pid(2), "bob");
        apply_settlement(&settlement(MatchResult::PlayerOWon), &mut x, &mut o).unwrap();
        assert_eq!((*x.wins(), *x.games_played()), (0, 1));
        assert_eq!((*o.wins(), *o.games_played()), (1, 1));
    }

    #[test]
    fn test_apply_draw() {
        let mut x = Standing::new(pid(1), "ann");
        let mut o = Standing::new(pid(2), "bob");
        apply_settlement(&settlement(MatchResult::Draw), &mut x, &mut o).unwrap();
        assert_eq!((*x.draws(), *x.games_played()), (1, 1));
        assert_eq!((*o.draws(), *o.games_played()), (1, 1));
    }

    #[test]
    fn test_apply_rejects_swapped_seats() {
        let mut x = Standing::new(pid(1), "ann");
        let mut o = Standing::new(pid(2), "bob");
        let err = apply_settlement(&settlement(MatchResult::Draw), &mut o, &mut x).unwrap_err();
        assert_eq!(
            err,
            LedgerError::SeatMismatch {
                expected: pid(1),
                found: pid(2)
            }
        );
        assert_eq!(*x.games_played(), 0);
        assert_eq!(*o.games_played(), 0);
    }

    #[test]
    fn test_rank_by_points() {
        let ranked = rank(vec![
            Standing::with_counters(pid(1), "draws", 1, 3, 4),
            Standing::with_counters(pid(2), "wins", 2, 1, 3),
        ]);
        let names: Vec<_> = ranked.iter().map(|s| s.name().as_str()).collect();
        assert_eq!(names, ["wins", "draws"]);
    }

    #[test]
    fn test_rank_skips_idle_and_breaks_ties_by_id() {
        let ranked = rank(vec![
            Standing::with_counters(pid(5), "late", 1, 0, 1),
            Standing::new(pid(2), "idle"),
            Standing::with_counters(pid(3), "early", 0, 3, 3),
        ]);
        let ids: Vec<_> = ranked.iter().map(|s| *s.player()).collect();
        assert_eq!(ids, [pid(3), pid(5)]);
    }
}
