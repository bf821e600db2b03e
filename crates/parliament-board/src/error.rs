//! Error types for the parliament-board crate.

use parliament_types::{Move, Square};

/// Errors from the rules collaborator and the tactical analyzer.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// The FEN string could not be parsed into a position.
    #[error("invalid FEN {fen:?}: {reason}")]
    InvalidFen {
        /// The rejected FEN.
        fen: String,
        /// Parser message.
        reason: String,
    },

    /// The move is not legal in the position.
    #[error("illegal move {mv} in position {fen}")]
    IllegalMove {
        /// The rejected move.
        mv: Move,
        /// FEN of the position the move was tried in.
        fen: String,
    },

    /// No piece stands on the origin square of a move.
    #[error("no piece on {square} in position {fen}")]
    EmptySquare {
        /// The empty square.
        square: Square,
        /// FEN of the position.
        fen: String,
    },

    /// A weighted sum overflowed.
    #[error("arithmetic overflow in tactical analysis: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}
