//! Attack-set helpers over `chess` bitboards.
//!
//! All functions take an explicit occupancy so callers can ask "what would
//! this piece attack if the board looked like that", which is how discovered
//! attacks and rescues are detected.

use chess::{BitBoard, EMPTY};

use parliament_types::{PieceKind, Side};

use crate::convert::{from_chess_piece, to_chess_color};

/// Squares attacked by a piece of `kind` standing on `from`.
pub(crate) fn attacks(
    kind: PieceKind,
    side: Side,
    from: chess::Square,
    occupancy: BitBoard,
) -> BitBoard {
    match kind {
        PieceKind::Pawn => chess::get_pawn_attacks(from, to_chess_color(side), !EMPTY),
        PieceKind::Knight => chess::get_knight_moves(from),
        PieceKind::Bishop => chess::get_bishop_moves(from, occupancy),
        PieceKind::Rook => chess::get_rook_moves(from, occupancy),
        PieceKind::Queen => {
            chess::get_bishop_moves(from, occupancy) | chess::get_rook_moves(from, occupancy)
        }
        PieceKind::King => chess::get_king_moves(from),
    }
}

pub(crate) fn contains(set: BitBoard, square: chess::Square) -> bool {
    (set & BitBoard::from_square(square)) != EMPTY
}

/// Pieces of `side` that attack `target`, with their kinds.
pub(crate) fn attackers(
    board: &chess::Board,
    target: chess::Square,
    side: Side,
    occupancy: BitBoard,
) -> Vec<(chess::Square, PieceKind)> {
    let own = *board.color_combined(to_chess_color(side)) & occupancy;
    own.filter_map(|sq| {
        let kind = from_chess_piece(board.piece_on(sq)?);
        contains(attacks(kind, side, sq, occupancy), target).then_some((sq, kind))
    })
    .collect()
}

/// Material the piece on `square` stands to lose where it is.
///
/// A piece is en prise when an enemy attacks it and either nobody defends
/// it or the cheapest attacker is worth less than it. Kings are never en
/// prise in this sense; attacks on them are checks.
pub(crate) fn material_at_risk(
    board: &chess::Board,
    square: chess::Square,
    occupancy: BitBoard,
) -> u32 {
    let (Some(piece), Some(color)) = (board.piece_on(square), board.color_on(square)) else {
        return 0;
    };
    let kind = from_chess_piece(piece);
    if kind == PieceKind::King {
        return 0;
    }
    let owner = crate::convert::from_chess_color(color);
    let enemies = attackers(board, square, owner.opponent(), occupancy);
    if enemies.is_empty() {
        return 0;
    }
    let defenders = attackers(board, square, owner, occupancy);
    let value = kind.material_value();
    if defenders.is_empty() {
        return value;
    }
    let cheapest = enemies
        .iter()
        .filter(|(_, k)| *k != PieceKind::King)
        .map(|(_, k)| k.material_value())
        .min();
    cheapest.map_or(0, |c| value.saturating_sub(c))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn sq(name: &str) -> chess::Square {
        chess::Square::from_str(name).unwrap()
    }

    #[test]
    fn pawn_attacks_ignore_occupancy() {
        let set = attacks(PieceKind::Pawn, Side::White, sq("e4"), EMPTY);
        assert!(contains(set, sq("d5")));
        assert!(contains(set, sq("f5")));
        assert_eq!(set.popcnt(), 2);
    }

    #[test]
    fn undefended_piece_is_at_risk() {
        let board = chess::Board::from_str("3rk3/8/8/8/3B4/8/8/R3K3 w - - 0 1").unwrap();
        let occupancy = *board.combined();
        assert_eq!(material_at_risk(&board, sq("d4"), occupancy), 3);
        assert_eq!(material_at_risk(&board, sq("a1"), occupancy), 0);
    }

    #[test]
    fn defended_piece_attacked_by_heavier_piece_is_safe() {
        let board = chess::Board::from_str("3rk3/8/8/8/3B4/8/8/3RK3 w - - 0 1").unwrap();
        let occupancy = *board.combined();
        assert_eq!(material_at_risk(&board, sq("d4"), occupancy), 0);
    }
}
