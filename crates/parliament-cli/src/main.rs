//! Terminal front end for a Parliament game.
//!
//! The debating team's pieces propose moves, the player (or an automatic
//! selector) picks one, and an opponent answers for the other side. Every
//! committed round is printed and, optionally, appended as JSON to a
//! report file.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from the path given as the first argument, or
//!    `parliament-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the starting position
//! 4. Create the debate moderator and the team
//! 5. Build the selector, the opponent and the report sinks
//! 6. Run the game loop
//! 7. Log the result

mod error;
mod render;
mod terminal;

use std::path::PathBuf;
use std::time::Duration;

use parliament_board::{Position, StandardRules};
use parliament_core::{
    DebateModerator, GameEndReason, Opponent, OpponentMode, ParliamentConfig,
    RandomOpponent, ReportSink, Selector, SelectorMode, TopRankedSelector,
    WeightedRandomSelector,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;
use crate::render::{FanoutSink, JsonLinesSink, TerminalSink};
use crate::terminal::{HumanOpponent, TerminalInput, TerminalSelector};

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "parliament-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the starting position or the game
/// loop fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let (config, config_found) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config)?;
    info!(
        config_found,
        team = %config.game.team_side,
        seed = config.game.seed,
        max_rounds = config.game.max_rounds,
        selector = ?config.game.selector,
        opponent = ?config.game.opponent,
        "Configuration loaded"
    );

    // 3. Build the starting position.
    let position = match config.game.start_fen.as_deref() {
        Some(fen) => Position::from_fen(fen).map_err(CliError::from)?,
        None => Position::start(),
    };
    info!(fen = %position.fen(), "Starting position ready");

    // 4. Create the moderator.
    let mut moderator =
        DebateModerator::new(StandardRules::new(), position, &config).map_err(CliError::from)?;
    info!(
        game_id = %moderator.game_id(),
        pieces = moderator.team().active_agents().count(),
        "Team assembled"
    );

    // 5. Collaborators.
    let input = TerminalInput::stdin();
    let mut selector = build_selector(&config, &input);
    let mut opponent = build_opponent(&config, &input);
    let mut sink = build_sink(&config)?;

    // 6. Run the game.
    let result = parliament_core::run_game(
        &mut moderator,
        selector.as_mut(),
        opponent.as_mut(),
        sink.as_mut(),
        config.game.max_rounds,
    )
    .map_err(CliError::from)?;

    // 7. Log the result.
    parliament_core::log_game_end(&result);
    match result.end_reason {
        GameEndReason::Finished(outcome) => render::notice(&format!("Result: {outcome}")),
        GameEndReason::MaxRoundsReached => render::notice("Stopped at the round limit"),
        GameEndReason::OpponentStopped => render::notice("The opponent left the game"),
    }

    Ok(())
}

/// Load configuration, falling back to defaults when the file is missing.
///
/// Returns the config and whether a file was found.
fn load_config() -> Result<(ParliamentConfig, bool), CliError> {
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        Ok((ParliamentConfig::from_file(&config_path)?, true))
    } else {
        Ok((ParliamentConfig::default(), false))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(config: &ParliamentConfig) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_e| EnvFilter::try_new(&config.logging.level))
        .map_err(|e| CliError::Logging {
            message: e.to_string(),
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if config.logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| CliError::Logging {
        message: e.to_string(),
    })
}

fn build_selector(config: &ParliamentConfig, input: &TerminalInput) -> Box<dyn Selector> {
    match config.game.selector {
        SelectorMode::Human => Box::new(TerminalSelector::new(
            input.clone(),
            Duration::from_millis(config.game.selection_timeout_ms),
        )),
        SelectorMode::Top => Box::new(TopRankedSelector::new()),
        SelectorMode::Random => Box::new(WeightedRandomSelector::new(config.game.seed)),
    }
}

fn build_opponent(config: &ParliamentConfig, input: &TerminalInput) -> Box<dyn Opponent> {
    match config.game.opponent {
        OpponentMode::Human => Box::new(HumanOpponent::new(input.clone())),
        // Seed offset keeps the opponent's stream apart from a random selector's.
        OpponentMode::Random => Box::new(RandomOpponent::new(config.game.seed.wrapping_add(1))),
    }
}

fn build_sink(config: &ParliamentConfig) -> Result<Box<dyn ReportSink>, CliError> {
    let mut fanout = FanoutSink::default();
    fanout.push(Box::new(TerminalSink));
    if let Some(path) = config.game.report_path.as_deref() {
        fanout.push(Box::new(JsonLinesSink::create(path)?));
        info!(path = %path.display(), "Writing round reports");
    }
    Ok(Box::new(fanout))
}
