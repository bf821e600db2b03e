//! Error types for the parliament-core crate.
//!
//! Recoverable failures (a bad selection index, an abstention) leave the
//! moderator where it was. Commit failures roll the team back to the last
//! snapshot. [`CoreError::Halted`] is terminal.

use parliament_agents::AgentError;
use parliament_board::BoardError;
use parliament_types::{GameOutcome, Side};

use crate::config::ConfigError;
use crate::moderator::DebatePhase;
use crate::selector::SelectionError;

/// Errors that can occur while moderating a debate.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The rules collaborator rejected a position or move.
    #[error("board error: {source}")]
    Board {
        /// The underlying board error.
        #[from]
        source: BoardError,
    },

    /// An agent, relationship or memory operation failed.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// A moment observer failed.
    #[error("observer {observer} failed: {message}")]
    Observer {
        /// Name of the failing observer.
        observer: String,
        /// What went wrong.
        message: String,
    },

    /// The selected index does not name an offered proposal.
    #[error("selection {index} is out of range; choose 0-{last}", last = .offered.saturating_sub(1))]
    Selection {
        /// The index that was submitted.
        index: usize,
        /// How many proposals were offered.
        offered: usize,
    },

    /// The selector collaborator failed.
    #[error("selector error: {source}")]
    Selector {
        /// The underlying selector error.
        #[from]
        source: SelectionError,
    },

    /// An operation was called in the wrong phase.
    #[error("{operation} is not allowed while {phase:?}")]
    PhaseViolation {
        /// The operation attempted.
        operation: &'static str,
        /// The phase the moderator was in.
        phase: DebatePhase,
    },

    /// A move was requested for the side that is not to move.
    #[error("it is {to_move}'s turn, not {requested}'s; play {to_move}'s move first")]
    OutOfTurn {
        /// Side to move in the current position.
        to_move: Side,
        /// Side the caller tried to move for.
        requested: Side,
    },

    /// Legal moves exist but no agent produced a valid proposal.
    #[error("no valid proposals in round {round}")]
    NoProposals {
        /// The round being debated.
        round: u32,
    },

    /// The selector gave up too many times in one round.
    #[error("no valid selection after {attempts} attempts in round {round}")]
    SelectionExhausted {
        /// The round being debated.
        round: u32,
        /// Attempts made.
        attempts: u32,
    },

    /// The game already ended.
    #[error("the game is over: {outcome}")]
    GameOver {
        /// How it ended.
        outcome: GameOutcome,
    },

    /// An invariant was violated; the moderator stopped.
    #[error("moderator halted: {detail}")]
    Halted {
        /// What was violated.
        detail: String,
        /// JSON dump of the team state at the time.
        dump: String,
    },

    /// Configuration could not be loaded.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },
}

impl CoreError {
    /// Whether the moderator can debate again after this error. The round
    /// was cancelled or rolled back and nothing was left half-committed.
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Selection { .. }
            | Self::Selector { .. }
            | Self::SelectionExhausted { .. }
            | Self::Observer { .. }
            | Self::Board { .. } => true,
            Self::Agent { source } => !source.is_invariant_violation(),
            _ => false,
        }
    }

    /// Whether the error came from a violated invariant.
    pub const fn is_invariant_violation(&self) -> bool {
        match self {
            Self::Agent { source } => source.is_invariant_violation(),
            Self::Halted { .. } => true,
            _ => false,
        }
    }
}
