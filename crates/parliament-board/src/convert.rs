//! Conversions between the shared data model and the `chess` crate.

use parliament_types::{Move, PieceKind, Side, Square};

pub(crate) fn to_chess_square(square: Square) -> chess::Square {
    chess::Square::make_square(
        chess::Rank::from_index(usize::from(square.rank())),
        chess::File::from_index(usize::from(square.file())),
    )
}

pub(crate) fn from_chess_square(square: chess::Square) -> Square {
    Square::from_index_wrapping(square.to_int())
}

pub(crate) const fn to_chess_piece(kind: PieceKind) -> chess::Piece {
    match kind {
        PieceKind::Pawn => chess::Piece::Pawn,
        PieceKind::Knight => chess::Piece::Knight,
        PieceKind::Bishop => chess::Piece::Bishop,
        PieceKind::Rook => chess::Piece::Rook,
        PieceKind::Queen => chess::Piece::Queen,
        PieceKind::King => chess::Piece::King,
    }
}

pub(crate) const fn from_chess_piece(piece: chess::Piece) -> PieceKind {
    match piece {
        chess::Piece::Pawn => PieceKind::Pawn,
        chess::Piece::Knight => PieceKind::Knight,
        chess::Piece::Bishop => PieceKind::Bishop,
        chess::Piece::Rook => PieceKind::Rook,
        chess::Piece::Queen => PieceKind::Queen,
        chess::Piece::King => PieceKind::King,
    }
}

pub(crate) const fn to_chess_color(side: Side) -> chess::Color {
    match side {
        Side::White => chess::Color::White,
        Side::Black => chess::Color::Black,
    }
}

pub(crate) const fn from_chess_color(color: chess::Color) -> Side {
    match color {
        chess::Color::White => Side::White,
        chess::Color::Black => Side::Black,
    }
}

pub(crate) fn to_chess_move(mv: Move) -> chess::ChessMove {
    chess::ChessMove::new(
        to_chess_square(mv.from),
        to_chess_square(mv.to),
        mv.promotion.map(to_chess_piece),
    )
}

pub(crate) fn from_chess_move(mv: chess::ChessMove) -> Move {
    Move {
        from: from_chess_square(mv.get_source()),
        to: from_chess_square(mv.get_dest()),
        promotion: mv.get_promotion().map(from_chess_piece),
    }
}
