//! Stable piece identities for one team.
//!
//! The board is the source of truth for where pieces stand; the roster maps
//! each of the team's pieces to a [`PieceId`] that survives moves,
//! promotion and castling. It is re-synchronised after every committed move
//! and can be checked against the board at any time.

use std::collections::BTreeMap;

use serde::Serialize;

use parliament_board::{Position, is_castling};
use parliament_types::{Move, PieceId, PieceIdentity, PieceKind, Side, Square};

use crate::error::AgentError;

/// Identities of every piece one team started with, captured ones included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roster {
    side: Side,
    identities: BTreeMap<PieceId, PieceIdentity>,
}

impl Roster {
    /// Assign ids to the team's pieces in ascending square order, starting
    /// at 0.
    pub fn from_position(position: &Position, side: Side) -> Self {
        let identities = position
            .pieces(side)
            .into_iter()
            .zip(0_u16..)
            .map(|((square, kind), raw)| {
                let id = PieceId(raw);
                (
                    id,
                    PieceIdentity {
                        id,
                        side,
                        kind,
                        square,
                        captured: false,
                    },
                )
            })
            .collect();
        Self { side, identities }
    }

    /// The side this roster belongs to.
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Identity of a piece.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownPiece`] if the id was never assigned.
    pub fn identity(&self, id: PieceId) -> Result<&PieceIdentity, AgentError> {
        self.identities.get(&id).ok_or(AgentError::UnknownPiece(id))
    }

    /// Active piece on a square, if any.
    pub fn at(&self, square: Square) -> Option<&PieceIdentity> {
        self.identities
            .values()
            .find(|identity| !identity.captured && identity.square == square)
    }

    /// Active pieces in id order.
    pub fn active(&self) -> impl Iterator<Item = &PieceIdentity> {
        self.identities.values().filter(|identity| !identity.captured)
    }

    /// Every identity in id order, captured ones included.
    pub fn all(&self) -> impl Iterator<Item = &PieceIdentity> {
        self.identities.values()
    }

    /// Update identities for a move about to be played on `before`.
    ///
    /// Handles moves of either side: for the team's own moves the mover is
    /// relocated (with the rook on castling and the new kind on promotion);
    /// for opponent moves a teammate on the destination, or behind it on en
    /// passant, is marked captured. Returns the captured teammate, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvariantViolation`] if the roster has no
    /// identity for the piece the board says is moving.
    pub fn apply_move(&mut self, before: &Position, mv: Move) -> Result<Option<PieceId>, AgentError> {
        let Some((mover_side, mover_kind)) = before.piece_at(mv.from) else {
            return Err(AgentError::InvariantViolation {
                detail: format!("no piece on {} for move {mv} in {}", mv.from, before.fen()),
            });
        };

        if mover_side != self.side {
            let victim_square = if before.piece_at(mv.to).is_some() {
                Some(mv.to)
            } else if mover_kind == PieceKind::Pawn && mv.from.file() != mv.to.file() {
                Square::from_coords(mv.to.file(), mv.from.rank())
            } else {
                None
            };
            let victim = victim_square.and_then(|square| self.at(square)).map(|i| i.id);
            if let Some(id) = victim {
                self.entry(id)?.captured = true;
            }
            return Ok(victim);
        }

        let id = self.id_at(mv.from, before, mv)?;
        let entry = self.entry(id)?;
        entry.square = mv.to;
        if let Some(kind) = mv.promotion {
            entry.kind = kind;
        }

        if is_castling(mover_kind, mv) {
            let rank = mv.from.rank();
            let (rook_from, rook_to) = if mv.to.file() > mv.from.file() {
                (Square::from_coords(7, rank), Square::from_coords(5, rank))
            } else {
                (Square::from_coords(0, rank), Square::from_coords(3, rank))
            };
            if let (Some(rook_from), Some(rook_to)) = (rook_from, rook_to) {
                let rook = self.id_at(rook_from, before, mv)?;
                self.entry(rook)?.square = rook_to;
            }
        }
        Ok(None)
    }

    /// Check every active identity against the board, and every team piece
    /// on the board against the roster.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvariantViolation`] describing the first
    /// mismatch.
    pub fn verify_against(&self, position: &Position) -> Result<(), AgentError> {
        for identity in self.active() {
            match position.piece_at(identity.square) {
                Some((side, kind)) if side == self.side && kind == identity.kind => {}
                found => {
                    return Err(AgentError::InvariantViolation {
                        detail: format!(
                            "piece {} expected {} on {}, board has {found:?}",
                            identity.id, identity.kind, identity.square
                        ),
                    });
                }
            }
        }
        let on_board = position.pieces(self.side).len();
        let active = self.active().count();
        if on_board != active {
            return Err(AgentError::InvariantViolation {
                detail: format!("board has {on_board} {} pieces, roster has {active}", self.side),
            });
        }
        Ok(())
    }

    fn id_at(&self, square: Square, before: &Position, mv: Move) -> Result<PieceId, AgentError> {
        self.at(square)
            .map(|identity| identity.id)
            .ok_or_else(|| AgentError::InvariantViolation {
                detail: format!("no identity on {square} for move {mv} in {}", before.fen()),
            })
    }

    fn entry(&mut self, id: PieceId) -> Result<&mut PieceIdentity, AgentError> {
        self.identities
            .get_mut(&id)
            .ok_or(AgentError::UnknownPiece(id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parliament_board::{RulesEngine, StandardRules};

    use super::*;

    fn play(roster: &mut Roster, position: &Position, uci: &str) -> (Position, Option<PieceId>) {
        let mv: Move = uci.parse().unwrap();
        let captured = roster.apply_move(position, mv).unwrap();
        let next = StandardRules::new().apply(position, mv).unwrap().position;
        roster.verify_against(&next).unwrap();
        (next, captured)
    }

    #[test]
    fn ids_follow_square_order() {
        let roster = Roster::from_position(&Position::start(), Side::White);
        assert_eq!(roster.active().count(), 16);
        let a1 = roster.identity(PieceId(0)).unwrap();
        assert_eq!(a1.kind, PieceKind::Rook);
        assert_eq!(a1.square.to_string(), "a1");
        let e1 = roster.at("e1".parse().unwrap()).unwrap();
        assert_eq!(e1.id, PieceId(4));
        assert_eq!(e1.kind, PieceKind::King);
    }

    #[test]
    fn castling_moves_the_rook() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let mut roster = Roster::from_position(&position, Side::White);
        let rook = roster.at("h1".parse().unwrap()).unwrap().id;
        play(&mut roster, &position, "e1g1");
        assert_eq!(roster.identity(rook).unwrap().square.to_string(), "f1");
    }

    #[test]
    fn promotion_changes_kind_but_keeps_id() {
        let position = Position::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mut roster = Roster::from_position(&position, Side::White);
        let pawn = roster.at("a7".parse().unwrap()).unwrap().id;
        play(&mut roster, &position, "a7a8q");
        let identity = roster.identity(pawn).unwrap();
        assert_eq!(identity.kind, PieceKind::Queen);
        assert_eq!(identity.square.to_string(), "a8");
    }

    #[test]
    fn opponent_capture_marks_teammate() {
        let position = Position::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 b - - 0 1").unwrap();
        let mut roster = Roster::from_position(&position, Side::White);
        let pawn = roster.at("e4".parse().unwrap()).unwrap().id;
        let (_, captured) = play(&mut roster, &position, "d5e4");
        assert_eq!(captured, Some(pawn));
        assert!(roster.identity(pawn).unwrap().captured);
        assert!(roster.at("e4".parse().unwrap()).is_none());
    }

    #[test]
    fn en_passant_capture_is_tracked() {
        let position = Position::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").unwrap();
        let mut roster = Roster::from_position(&position, Side::White);
        let pawn = roster.at("e4".parse().unwrap()).unwrap().id;
        let (_, captured) = play(&mut roster, &position, "d4e3");
        assert_eq!(captured, Some(pawn));
    }

    #[test]
    fn mismatch_is_an_invariant_violation() {
        let roster = Roster::from_position(&Position::start(), Side::White);
        let other = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let err = roster.verify_against(&other).unwrap_err();
        assert!(err.is_invariant_violation());
    }
}
