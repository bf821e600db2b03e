//! Debate moderation and round orchestration for the Parliament engine.
//!
//! This crate owns the round cycle: agents propose, the moderator ranks,
//! a selector chooses, and the committed move cascades through the
//! relationship network, the observers, the emotional states, the game
//! memory and the team psychology before a snapshot closes the round.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `parliament-config.yaml` into
//!   strongly-typed structs.
//! - [`error`] -- Error types ([`CoreError`]).
//! - [`mediator`] -- [`InteractionMediator`] and the [`MomentObserver`]
//!   capability.
//! - [`moderator`] -- [`DebateModerator`], the round state machine.
//! - [`observers`] -- Built-in observers.
//! - [`report`] -- [`RoundReport`] and [`ReportSink`].
//! - [`runner`] -- [`run_game`] loop with [`Opponent`] drivers.
//! - [`selector`] -- [`Selector`] trait and built-in selectors.
//! - [`snapshot`] -- Value [`Snapshot`]s and the bounded [`Caretaker`].
//! - [`team`] -- The [`Team`] value.

pub mod config;
pub mod error;
pub mod mediator;
pub mod moderator;
pub mod observers;
pub mod report;
pub mod runner;
pub mod selector;
pub mod snapshot;
pub mod team;

pub use config::{
    AbstainPolicy, ConfigError, DebateConfig, GameConfig, LoggingConfig, OpponentMode,
    ParliamentConfig, SelectorMode,
};
pub use error::CoreError;
pub use mediator::{InteractionMediator, MediationOutcome, MomentObserver, ObserverError};
pub use moderator::{
    AbstainOutcome, DebateModerator, DebatePhase, RoundStart, TurnOutcome, rank_proposals,
};
pub use observers::{PieceObserver, TeamObserver, TracingObserver};
pub use report::{CollectingSink, NoOpSink, PieceDelta, ReportSink, RoundReport};
pub use runner::{
    GameEndReason, GameResult, Opponent, OpponentError, RandomOpponent, ScriptedOpponent,
    log_game_end, run_game,
};
pub use selector::{
    ScriptedSelector, SelectionError, Selector, TopRankedSelector, WeightedRandomSelector,
};
pub use snapshot::{Caretaker, Snapshot};
pub use team::{AgentDump, Team, TeamDump};
