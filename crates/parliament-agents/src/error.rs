//! Error types for the parliament-agents crate.
//!
//! Evaluation failures ([`AgentError::InvalidMove`]) are expected and
//! recoverable: the moderator drops the offending candidate. Invariant
//! failures ([`AgentError::InvariantViolation`]) indicate a logic defect and
//! stop play.

use parliament_types::{InteractionKind, Move, PieceId};

/// Errors that can occur in agent, relationship and memory operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The agent was asked to evaluate a move it cannot make.
    #[error("piece {piece} cannot play {mv}: {reason}; offer only this piece's legal moves")]
    InvalidMove {
        /// The evaluating piece.
        piece: PieceId,
        /// The rejected move.
        mv: Move,
        /// Why the move was rejected.
        reason: String,
    },

    /// A bounded scalar left its range or a relationship edge became more
    /// asymmetric than allowed.
    #[error("state invariant violated: {detail}")]
    InvariantViolation {
        /// What was found, with the offending values.
        detail: String,
    },

    /// A piece id that is not part of the team.
    #[error("unknown piece {0}")]
    UnknownPiece(PieceId),

    /// An interaction that names the same piece twice.
    #[error("piece {piece} cannot have a {kind:?} interaction with itself")]
    SelfInteraction {
        /// The piece named twice.
        piece: PieceId,
        /// The interaction kind.
        kind: InteractionKind,
    },

    /// An arithmetic overflow occurred during a score computation.
    #[error("arithmetic overflow in score computation: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}

impl AgentError {
    pub(crate) fn overflow(context: &str) -> Self {
        Self::ArithmeticOverflow {
            context: context.to_owned(),
        }
    }

    /// Whether this error signals a logic defect that must stop play.
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation { .. })
    }
}
