//! Strictly League - command-line client.

#![warn(missing_docs)]

mod cli;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use strictly_grid::{PlayerId, Settlement, Transition};
use strictly_league::{
    BroadcastSink, FinishedGames, LeagueConfig, LeagueRepository, LeagueService, ReminderNotifier,
    Session,
};
use tracing::{debug, info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,strictly_league=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = LeagueConfig::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config = config.with_database_url(db);
    }

    let repository = LeagueRepository::new(config.database_url().clone(), *config.busy_timeout_ms());
    repository.run_migrations()?;

    let sink = BroadcastSink::new(*config.event_capacity());
    let finished = FinishedGames::new();
    let listeners = [
        finished.spawn_listener(sink.subscribe()),
        ReminderNotifier.spawn(sink.subscribe()),
    ];

    let league = LeagueService::new(repository, config, Arc::new(sink), finished);
    let result = run(&league, cli.command);

    // Closing the channel lets the listeners drain and stop
    drop(league);
    for listener in listeners {
        listener.await?;
    }
    result
}

/// Executes one command against the league.
#[instrument(skip(league))]
fn run(league: &LeagueService, command: Command) -> Result<()> {
    debug!("Running command");
    match command {
        Command::Register { name, email } => {
            let user = league.register_player(&name, &email)?;
            println!("Registered {} (id {})", user.name(), user.id());
        }
        Command::Player { name } => {
            let user = league.get_player(&name)?;
            let standing = user.standing()?;
            println!("{} <{}>", user.name(), user.email());
            println!(
                "  played {}  won {}  drawn {}  lost {}",
                standing.games_played(),
                standing.wins(),
                standing.draws(),
                standing.losses()
            );
            println!(
                "  points {}  win/draw rate {:.1}%",
                standing.points(),
                standing.win_draw_rate() * 100.0
            );
        }
        Command::NewGame {
            player_x,
            player_o,
            size,
        } => {
            let session = league.create_session(&player_x, &player_o, size)?;
            println!("Game {} created", session.id());
            println!("{}", render_session(&session));
        }
        Command::Move {
            game,
            player,
            cell,
            expect_version,
        } => {
            let outcome = match expect_version {
                Some(version) => league.apply_move_at_version(game, &player, cell, version)?,
                None => league.apply_move(game, &player, cell)?,
            };
            println!("{}", render_session(outcome.session()));
            if let Transition::Continued { .. } = outcome.transition() {
                info!(game, "Turn passed");
            }
        }
        Command::Cancel { game } => {
            league.cancel_session(game)?;
            println!("Game {} cancelled", game);
        }
        Command::Show { game } => {
            let session = league.get_session(game)?;
            println!("{}", render_session(&session));
        }
        Command::History { game } => {
            let history = league.get_history(game)?;
            if history.is_empty() {
                println!("No moves yet");
            }
            for (turn, mov) in history.iter().enumerate() {
                println!("{:>3}. {}", turn + 1, mov);
            }
        }
        Command::Games { player } => {
            let sessions = league.list_open_sessions_for_player(&player)?;
            if sessions.is_empty() {
                println!("{} has no open games", player);
            }
            for session in &sessions {
                println!(
                    "Game {}: {} (X) vs {} (O), {} to move",
                    session.id(),
                    session.player_x_name(),
                    session.player_o_name(),
                    session.next_to_move_name()
                );
            }
        }
        Command::Rankings => {
            let table = league.rank_players()?;
            if table.is_empty() {
                println!("No finished games yet");
            }
            for (place, standing) in table.iter().enumerate() {
                println!(
                    "{:>3}. {:<20} {:>4} pts  {}W {}D {}L",
                    place + 1,
                    standing.name(),
                    standing.points(),
                    standing.wins(),
                    standing.draws(),
                    standing.losses()
                );
            }
        }
        Command::Scores { player } => {
            let scores = match &player {
                Some(name) => league.scores_for_player(name)?,
                None => league.all_scores()?,
            };
            let names = player_names(league, &scores)?;
            for score in &scores {
                println!("{}", render_score(score, &names));
            }
        }
        Command::Finished { refresh } => {
            let count = if refresh {
                league.finished_games_cache().refresh(league.repository())?
            } else {
                league.finished_games()?
            };
            println!("{} finished games", count);
        }
    }
    Ok(())
}

/// Names for every player appearing in `scores`.
fn player_names(league: &LeagueService, scores: &[Settlement]) -> Result<HashMap<PlayerId, String>> {
    let mut names = HashMap::new();
    for standing in league.rank_players()? {
        names.insert(*standing.player(), standing.name().clone());
    }
    for score in scores {
        for player in [*score.player_x(), *score.player_o()] {
            names.entry(player).or_insert_with(|| format!("#{}", player));
        }
    }
    Ok(names)
}

fn render_score(score: &Settlement, names: &HashMap<PlayerId, String>) -> String {
    let name = |player: &PlayerId| names.get(player).cloned().unwrap_or_default();
    format!(
        "{}  {} (X) vs {} (O): {}",
        score.date(),
        name(score.player_x()),
        name(score.player_o()),
        score.result()
    )
}

fn render_session(session: &Session) -> String {
    let game = session.game();
    let status = match (game.winner(), game.is_draw()) {
        (Some(winner), _) => format!(
            "Game over. {} wins!",
            session.name_of(winner).unwrap_or_default()
        ),
        (None, true) => "Game over. Draw!".to_string(),
        (None, false) => format!("{} to move.", session.next_to_move_name()),
    };
    format!(
        "Game {} (version {}): {} (X) vs {} (O)\n\n{}\n\n{}",
        session.id(),
        session.lock_version(),
        session.player_x_name(),
        session.player_o_name(),
        game.board().display(),
        status
    )
}
