//! Command-line interface for strictly_league.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly League - N-by-N tic-tac-toe league
#[derive(Parser, Debug)]
#[command(name = "strictly_league")]
#[command(about = "Play N-by-N tic-tac-toe and keep league standings", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path (overrides config and environment)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register a new player
    Register {
        /// Unique player name
        name: String,
        /// Contact e-mail address
        email: String,
    },

    /// Show a player's record
    Player {
        /// Player name
        name: String,
    },

    /// Start a game; the first player takes X and moves first
    NewGame {
        /// Player taking X
        player_x: String,
        /// Player taking O
        player_o: String,
        /// Board side length (defaults to the configured size)
        #[arg(short, long)]
        size: Option<usize>,
    },

    /// Mark a cell
    Move {
        /// Game id
        game: i32,
        /// Acting player
        player: String,
        /// Cell index, row-major from 0
        cell: usize,
        /// Only apply if the game is still at this version
        #[arg(long)]
        expect_version: Option<i32>,
    },

    /// Cancel an unfinished game
    Cancel {
        /// Game id
        game: i32,
    },

    /// Show a game's board and status
    Show {
        /// Game id
        game: i32,
    },

    /// List a game's moves in order
    History {
        /// Game id
        game: i32,
    },

    /// List a player's open games
    Games {
        /// Player name
        player: String,
    },

    /// Show the league table
    Rankings,

    /// Show finished games, for one player or everyone
    Scores {
        /// Player name (all scores if omitted)
        player: Option<String>,
    },

    /// Count finished games
    Finished {
        /// Recount from the database instead of using the cache
        #[arg(long)]
        refresh: bool,
    },
}
