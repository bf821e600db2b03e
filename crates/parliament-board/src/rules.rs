//! The rules collaborator: legal move generation and move application.
//!
//! The debate engine never decides legality itself. It consumes a
//! [`RulesEngine`] and treats its answers as ground truth. [`StandardRules`]
//! implements the trait over `chess::Board`; tests substitute their own
//! implementations to inject faults.

use chess::{BoardStatus, EMPTY, MoveGen};

use parliament_types::{GameOutcome, Move, PieceKind};

use crate::convert::{from_chess_color, from_chess_move, to_chess_move};
use crate::error::BoardError;
use crate::position::Position;

/// Result of applying a legal move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// Position after the move.
    pub position: Position,
    /// The move puts the side now to move in check.
    pub gives_check: bool,
    /// The move captured a piece (en passant included).
    pub is_capture: bool,
}

/// A source of chess legality.
pub trait RulesEngine {
    /// Every legal move in the position, in a stable order.
    fn legal_moves(&self, position: &Position) -> Vec<Move>;

    /// Apply a move, producing the next position.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::IllegalMove`] if the move is not legal.
    fn apply(&self, position: &Position, mv: Move) -> Result<Applied, BoardError>;

    /// How the game ended, or `None` while it is still going.
    fn outcome(&self, position: &Position) -> Option<GameOutcome>;
}

/// Standard chess rules backed by the `chess` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl StandardRules {
    /// Create the standard rules engine.
    pub const fn new() -> Self {
        Self
    }
}

impl RulesEngine for StandardRules {
    fn legal_moves(&self, position: &Position) -> Vec<Move> {
        let mut moves: Vec<Move> = MoveGen::new_legal(position.board())
            .map(from_chess_move)
            .collect();
        moves.sort();
        moves
    }

    fn apply(&self, position: &Position, mv: Move) -> Result<Applied, BoardError> {
        let board = position.board();
        let chess_move = to_chess_move(mv);
        if !board.legal(chess_move) {
            return Err(BoardError::IllegalMove {
                mv,
                fen: position.fen(),
            });
        }

        let source = chess_move.get_source();
        let dest = chess_move.get_dest();
        let en_passant = board.piece_on(source) == Some(chess::Piece::Pawn)
            && board.piece_on(dest).is_none()
            && source.get_file() != dest.get_file();
        let is_capture = board.piece_on(dest).is_some() || en_passant;

        let next = board.make_move_new(chess_move);
        let gives_check = *next.checkers() != EMPTY;
        tracing::trace!(%mv, is_capture, gives_check, "move applied");

        Ok(Applied {
            position: position.advanced(next, mv),
            gives_check,
            is_capture,
        })
    }

    fn outcome(&self, position: &Position) -> Option<GameOutcome> {
        let board = position.board();
        match board.status() {
            BoardStatus::Ongoing => None,
            BoardStatus::Stalemate => Some(GameOutcome::Stalemate),
            BoardStatus::Checkmate => Some(GameOutcome::Checkmate {
                winner: from_chess_color(board.side_to_move()).opponent(),
            }),
        }
    }
}

/// Whether a move by `kind` from its origin is a two-square king step,
/// i.e. castling.
pub fn is_castling(kind: PieceKind, mv: Move) -> bool {
    kind == PieceKind::King && mv.from.file().abs_diff(mv.to.file()) == 2
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parliament_types::Side;

    use super::*;

    #[test]
    fn start_position_has_twenty_moves() {
        let rules = StandardRules::new();
        let moves = rules.legal_moves(&Position::start());
        assert_eq!(moves.len(), 20);
        let mut sorted = moves.clone();
        sorted.sort();
        assert_eq!(moves, sorted);
    }

    #[test]
    fn apply_reports_capture_and_check() {
        let rules = StandardRules::new();
        let position = Position::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let applied = rules.apply(&position, "e4d5".parse().unwrap()).unwrap();
        assert!(applied.is_capture);
        assert!(!applied.gives_check);
        assert_eq!(applied.position.side_to_move(), Side::Black);
        assert_eq!(applied.position.history().len(), 1);
    }

    #[test]
    fn apply_rejects_illegal_moves() {
        let rules = StandardRules::new();
        let result = rules.apply(&Position::start(), "e1e2".parse().unwrap());
        assert!(matches!(result, Err(BoardError::IllegalMove { .. })));
    }

    #[test]
    fn detects_checkmate_and_stalemate() {
        let rules = StandardRules::new();
        // Fool's mate.
        let mated =
            Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 0 1")
                .unwrap();
        assert_eq!(
            rules.outcome(&mated),
            Some(GameOutcome::Checkmate {
                winner: Side::Black
            })
        );
        assert!(rules.legal_moves(&mated).is_empty());

        let stalemate = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(rules.outcome(&stalemate), Some(GameOutcome::Stalemate));
        assert_eq!(rules.outcome(&Position::start()), None);
    }

    #[test]
    fn castling_is_a_two_file_king_step() {
        assert!(is_castling(PieceKind::King, "e1g1".parse().unwrap()));
        assert!(!is_castling(PieceKind::King, "e1f1".parse().unwrap()));
        assert!(!is_castling(PieceKind::Rook, "a1c1".parse().unwrap()));
    }
}
