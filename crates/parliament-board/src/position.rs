//! Immutable board position plus the moves that led to it.

use std::str::FromStr;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use parliament_types::{Move, PieceKind, Side, Square};

use crate::convert::{from_chess_color, from_chess_piece, from_chess_square, to_chess_square};
use crate::error::BoardError;

/// A chess position.
///
/// Wraps a `chess::Board` so the rest of the workspace never names the
/// rules crate directly. Positions are values: applying a move produces a
/// new position through [`RulesEngine::apply`](crate::RulesEngine::apply).
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    board: chess::Board,
    history: Vec<Move>,
}

impl Position {
    /// The standard starting position.
    pub fn start() -> Self {
        Self {
            board: chess::Board::default(),
            history: Vec::new(),
        }
    }

    /// Parse a position from FEN.
    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        let board = chess::Board::from_str(fen).map_err(|e| BoardError::InvalidFen {
            fen: fen.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            board,
            history: Vec::new(),
        })
    }

    /// FEN of this position.
    pub fn fen(&self) -> String {
        self.board.to_string()
    }

    /// Side to move.
    pub fn side_to_move(&self) -> Side {
        from_chess_color(self.board.side_to_move())
    }

    /// Piece on a square, if any.
    pub fn piece_at(&self, square: Square) -> Option<(Side, PieceKind)> {
        let sq = to_chess_square(square);
        let piece = self.board.piece_on(sq)?;
        let color = self.board.color_on(sq)?;
        Some((from_chess_color(color), from_chess_piece(piece)))
    }

    /// Every piece of one side, in ascending square order.
    pub fn pieces(&self, side: Side) -> Vec<(Square, PieceKind)> {
        let color = crate::convert::to_chess_color(side);
        let mut pieces: Vec<(Square, PieceKind)> = (*self.board.color_combined(color))
            .filter_map(|sq| {
                self.board
                    .piece_on(sq)
                    .map(|p| (from_chess_square(sq), from_chess_piece(p)))
            })
            .collect();
        pieces.sort_by_key(|(square, _)| *square);
        pieces
    }

    /// Whether the side to move is in check.
    pub fn in_check(&self) -> bool {
        self.board.checkers().popcnt() > 0
    }

    /// Number of pawns of either side on a file (0-based).
    pub fn pawns_on_file(&self, file: u8) -> u32 {
        let mask = chess::get_file(chess::File::from_index(usize::from(file)));
        (*self.board.pieces(chess::Piece::Pawn) & mask).popcnt()
    }

    /// Moves played since this position's root, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// The most recent move, if any.
    pub fn last_move(&self) -> Option<Move> {
        self.history.last().copied()
    }

    pub(crate) const fn board(&self) -> &chess::Board {
        &self.board
    }

    pub(crate) fn advanced(&self, board: chess::Board, mv: Move) -> Self {
        let mut history = self.history.clone();
        history.push(mv);
        Self { board, history }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl core::fmt::Debug for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Position")
            .field("fen", &self.fen())
            .field("plies", &self.history.len())
            .finish()
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.board)
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let history: Vec<String> = self.history.iter().map(ToString::to_string).collect();
        let mut state = serializer.serialize_struct("Position", 2)?;
        state.serialize_field("fen", &self.fen())?;
        state.serialize_field("history", &history)?;
        state.end()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn start_position_has_sixteen_pieces_a_side() {
        let position = Position::start();
        assert_eq!(position.side_to_move(), Side::White);
        assert_eq!(position.pieces(Side::White).len(), 16);
        assert_eq!(position.pieces(Side::Black).len(), 16);
        assert_eq!(
            position.piece_at("e1".parse().unwrap()),
            Some((Side::White, PieceKind::King))
        );
        assert!(position.piece_at("e4".parse().unwrap()).is_none());
        assert_eq!(position.pawns_on_file(4), 2);
    }

    #[test]
    fn fen_round_trips() {
        let fen = "4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1";
        let position = Position::from_fen(fen).unwrap();
        assert_eq!(position.fen(), fen);
        assert_eq!(position.pieces(Side::White).len(), 2);
    }

    #[test]
    fn rejects_garbage_fen() {
        assert!(matches!(
            Position::from_fen("not a position"),
            Err(BoardError::InvalidFen { .. })
        ));
    }

    #[test]
    fn serializes_as_fen_and_history() {
        let json = serde_json::to_value(Position::start()).unwrap();
        assert_eq!(json["history"], serde_json::json!([]));
        assert!(json["fen"].as_str().unwrap().starts_with("rnbqkbnr"));
    }
}
