//! Tactical analyzer: what a single candidate move does on the board.
//!
//! [`analyze`] is pure and local. It looks at the attack sets of the moved
//! piece, the friendly sliders behind it, the pin masks of both boards and
//! the en prise status of the mover and its allies. It never searches
//! replies, so its cost is bounded by the number of pieces on the board.
//!
//! The individual findings are combined into one `positional_delta` with
//! the fixed weights in [`TacticalWeights`].

use chess::{BitBoard, EMPTY};
use rust_decimal::Decimal;
use serde::Deserialize;

use parliament_types::{Move, PieceKind, Side, Square, TacticalSummary};

use crate::attacks::{attackers, attacks, contains, material_at_risk};
use crate::convert::{
    from_chess_color, from_chess_piece, from_chess_square, to_chess_color, to_chess_move,
    to_chess_square,
};
use crate::error::BoardError;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

/// Fixed weights combining tactical findings into a positional delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TacticalWeights {
    /// Per pawn of material won (default: 1.0).
    pub material: Decimal,
    /// For giving check (default: 0.5).
    pub check: Decimal,
    /// For a fork (default: 1.0).
    pub fork: Decimal,
    /// For creating a pin (default: 0.6).
    pub pin_created: Decimal,
    /// For hitting an already pinned piece (default: 0.4).
    pub pin_exploited: Decimal,
    /// For a discovered attack (default: 0.7).
    pub discovered: Decimal,
    /// Per square of attack-set growth (default: 0.05).
    pub control: Decimal,
    /// Per pawn of material left en prise (default: 1.0).
    pub exposure: Decimal,
    /// Per pawn of the mover's value when it escapes a threat (default: 0.5).
    pub escape: Decimal,
    /// Per ally pulled out of danger (default: 0.3).
    pub rescue: Decimal,
}

impl Default for TacticalWeights {
    fn default() -> Self {
        Self {
            material: Decimal::ONE,
            check: Decimal::new(5, 1),
            fork: Decimal::ONE,
            pin_created: Decimal::new(6, 1),
            pin_exploited: Decimal::new(4, 1),
            discovered: Decimal::new(7, 1),
            control: Decimal::new(5, 2),
            exposure: Decimal::ONE,
            escape: Decimal::new(5, 1),
            rescue: Decimal::new(3, 1),
        }
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Analyze a candidate move in a position.
///
/// # Errors
///
/// Returns [`BoardError::IllegalMove`] if the move is not legal in the
/// position. Callers are expected to only present legal moves.
pub fn analyze(
    position: &Position,
    mv: Move,
    weights: &TacticalWeights,
) -> Result<TacticalSummary, BoardError> {
    let board = position.board();
    let chess_move = to_chess_move(mv);
    if !board.legal(chess_move) {
        return Err(BoardError::IllegalMove {
            mv,
            fen: position.fen(),
        });
    }

    let from = chess_move.get_source();
    let to = chess_move.get_dest();
    let piece = board.piece_on(from).ok_or_else(|| BoardError::EmptySquare {
        square: mv.from,
        fen: position.fen(),
    })?;
    let side = from_chess_color(board.side_to_move());
    let enemy = side.opponent();
    let mover = from_chess_piece(piece);
    let landed = mv.promotion.unwrap_or(mover);

    let after = board.make_move_new(chess_move);
    let before_occupancy = *board.combined();
    let after_occupancy = *after.combined();
    let enemy_after = *after.color_combined(to_chess_color(enemy));

    // Capture, including en passant onto an empty square.
    let captured = match (board.piece_on(to), board.color_on(to)) {
        (Some(p), Some(c)) if from_chess_color(c) == enemy => Some(from_chess_piece(p)),
        _ if mover == PieceKind::Pawn && from.get_file() != to.get_file() => Some(PieceKind::Pawn),
        _ => None,
    };
    let captured_value = captured.map_or(0, PieceKind::material_value);
    let gives_check = *after.checkers() != EMPTY;

    // Square control of the moved piece.
    let before_attacks = attacks(mover, side, from, before_occupancy);
    let after_attacks = attacks(landed, side, to, after_occupancy);
    let control_delta = popcount(after_attacks).saturating_sub(popcount(before_attacks));

    let fork_targets = fork_targets(&after, after_attacks & enemy_after, landed, enemy);
    let unmasked = unmasked_sliders(board, &after, from, side, enemy_after);

    // Pins are read from the side to move, so the enemy's pins before the
    // move come from the null-move board.
    let enemy_pins_before = board.null_move().map_or(EMPTY, |b| *b.pinned());
    let enemy_pins_after = *after.pinned();
    let pin_created = (enemy_pins_after & !enemy_pins_before) != EMPTY;
    let pin_exploited = (captured.is_some() && contains(enemy_pins_before, to))
        || (after_attacks & enemy_pins_before & enemy_pins_after) != EMPTY;

    let material_risk = material_at_risk(&after, to, after_occupancy);
    let exposed = material_risk > 0;
    let escaped_threat = material_at_risk(board, from, before_occupancy) > 0 && !exposed;

    let (defends, rescues) =
        ally_effects(board, &after, from, to, side, before_attacks, after_attacks);

    let retreat = mover != PieceKind::Pawn
        && match side {
            Side::White => to.get_rank().to_index() < from.get_rank().to_index(),
            Side::Black => to.get_rank().to_index() > from.get_rank().to_index(),
        };

    let mut summary = TacticalSummary {
        mover,
        side,
        captured,
        captured_value,
        promotion: mv.promotion,
        gives_check,
        discovered_attack: !unmasked.is_empty(),
        unmasked,
        fork_targets,
        pin_created,
        pin_exploited,
        control_delta,
        exposed,
        material_risk,
        escaped_threat,
        defends,
        rescues,
        retreat,
        positional_delta: Decimal::ZERO,
    };
    summary.positional_delta = positional_delta(&summary, weights)?;
    Ok(summary)
}

/// Squares of `side`'s pieces that currently stand en prise.
pub fn en_prise(position: &Position, side: Side) -> Vec<Square> {
    let board = position.board();
    let occupancy = *board.combined();
    let mut squares: Vec<Square> = (*board.color_combined(to_chess_color(side)))
        .filter(|sq| material_at_risk(board, *sq, occupancy) > 0)
        .map(from_chess_square)
        .collect();
    squares.sort();
    squares
}

/// Squares of `side`'s pieces that attack `target`.
pub fn defenders_of(position: &Position, target: Square, side: Side) -> Vec<Square> {
    let board = position.board();
    let mut squares: Vec<Square> = attackers(board, to_chess_square(target), side, *board.combined())
        .into_iter()
        .map(|(sq, _)| from_chess_square(sq))
        .collect();
    squares.sort();
    squares
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn popcount(set: BitBoard) -> i32 {
    i32::try_from(set.popcnt()).unwrap_or(i32::MAX)
}

/// Enemy pieces attacked by the moved piece that it genuinely threatens:
/// the king, undefended pieces, and pieces worth more than the attacker.
/// Fewer than two such targets is not a fork.
fn fork_targets(
    after: &chess::Board,
    attacked_enemies: BitBoard,
    landed: PieceKind,
    enemy: Side,
) -> Vec<Square> {
    let occupancy = *after.combined();
    let mut targets: Vec<Square> = attacked_enemies
        .filter(|sq| {
            after.piece_on(*sq).is_some_and(|p| {
                let kind = from_chess_piece(p);
                kind == PieceKind::King
                    || kind.material_value() > landed.material_value()
                    || attackers(after, *sq, enemy, occupancy).is_empty()
            })
        })
        .map(from_chess_square)
        .collect();
    if targets.len() < 2 {
        targets.clear();
    }
    targets.sort();
    targets
}

/// Friendly sliders whose line ran through `from` and now reaches an enemy
/// piece it did not reach before.
fn unmasked_sliders(
    board: &chess::Board,
    after: &chess::Board,
    from: chess::Square,
    side: Side,
    enemy_after: BitBoard,
) -> Vec<Square> {
    let color = to_chess_color(side);
    let sliders = (*board.pieces(chess::Piece::Bishop)
        | *board.pieces(chess::Piece::Rook)
        | *board.pieces(chess::Piece::Queen))
        & *board.color_combined(color);
    let mut unmasked: Vec<Square> = sliders
        .filter(|sq| *sq != from)
        .filter(|sq| {
            let Some(kind) = board.piece_on(*sq).map(from_chess_piece) else {
                return false;
            };
            if after.piece_on(*sq).map(from_chess_piece) != Some(kind) {
                return false;
            }
            let before_line = attacks(kind, side, *sq, *board.combined());
            if !contains(before_line, from) {
                return false;
            }
            let after_line = attacks(kind, side, *sq, *after.combined());
            (after_line & !before_line & enemy_after) != EMPTY
        })
        .map(from_chess_square)
        .collect();
    unmasked.sort();
    unmasked
}

/// Allies newly defended by the moved piece, and allies that stood en
/// prise before the move and no longer do.
fn ally_effects(
    board: &chess::Board,
    after: &chess::Board,
    from: chess::Square,
    to: chess::Square,
    side: Side,
    before_attacks: BitBoard,
    after_attacks: BitBoard,
) -> (Vec<Square>, Vec<Square>) {
    let color = to_chess_color(side);
    let kings = *after.pieces(chess::Piece::King);
    let allies_after = *after.color_combined(color) & !BitBoard::from_square(to) & !kings;

    let mut defends: Vec<Square> = (after_attacks & allies_after & !before_attacks)
        .map(from_chess_square)
        .collect();
    defends.sort();

    let before_occupancy = *board.combined();
    let after_occupancy = *after.combined();
    let allies_before = *board.color_combined(color) & !BitBoard::from_square(from);
    let mut rescues: Vec<Square> = allies_before
        .filter(|sq| {
            board.piece_on(*sq) == after.piece_on(*sq)
                && after.color_on(*sq) == Some(color)
                && material_at_risk(board, *sq, before_occupancy) > 0
                && material_at_risk(after, *sq, after_occupancy) == 0
        })
        .map(from_chess_square)
        .collect();
    rescues.sort();

    (defends, rescues)
}

fn positional_delta(
    summary: &TacticalSummary,
    weights: &TacticalWeights,
) -> Result<Decimal, BoardError> {
    let flag = |set: bool| if set { Decimal::ONE } else { Decimal::ZERO };
    let rescued = u32::try_from(summary.rescues.len()).unwrap_or(u32::MAX);
    let escaped_value = if summary.escaped_threat {
        summary.mover.material_value()
    } else {
        0
    };

    let exposure_penalty = Decimal::ZERO
        .checked_sub(weights.exposure)
        .ok_or_else(|| BoardError::ArithmeticOverflow {
            context: String::from("exposure weight negation"),
        })?;

    let terms = [
        (weights.material, Decimal::from(summary.material_gain())),
        (weights.check, flag(summary.gives_check)),
        (weights.fork, flag(summary.is_fork())),
        (weights.pin_created, flag(summary.pin_created)),
        (weights.pin_exploited, flag(summary.pin_exploited)),
        (weights.discovered, flag(summary.discovered_attack)),
        (weights.control, Decimal::from(summary.control_delta)),
        (weights.escape, Decimal::from(escaped_value)),
        (weights.rescue, Decimal::from(rescued)),
        (exposure_penalty, Decimal::from(summary.material_risk)),
    ];

    terms.iter().try_fold(Decimal::ZERO, |total, (weight, amount)| {
        weight
            .checked_mul(*amount)
            .and_then(|term| total.checked_add(term))
            .ok_or_else(|| BoardError::ArithmeticOverflow {
                context: String::from("positional delta accumulation"),
            })
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
