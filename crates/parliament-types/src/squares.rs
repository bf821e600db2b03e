//! Board coordinates and moves, independent of any rules engine.
//!
//! [`Square`] numbers squares from a1 = 0 to h8 = 63 (rank-major). [`Move`]
//! prints and parses in UCI long algebraic form (`e2e4`, `e7e8q`).

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::enums::PieceKind;

/// Errors from parsing squares and moves.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    /// The square name is not `a1`..`h8`.
    #[error("invalid square {text:?}: expected a file a-h followed by a rank 1-8")]
    InvalidSquare {
        /// The rejected input.
        text: String,
    },

    /// The move is not in UCI long algebraic form.
    #[error("invalid move {text:?}: expected UCI form such as e2e4 or e7e8q")]
    InvalidMove {
        /// The rejected input.
        text: String,
    },
}

/// A square on the board, a1 = 0 through h8 = 63.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Square(u8);

impl Square {
    /// Build a square from 0-based file and rank. Returns `None` off the board.
    pub fn from_coords(file: u8, rank: u8) -> Option<Self> {
        if file > 7 || rank > 7 {
            return None;
        }
        rank.checked_mul(8)
            .and_then(|r| r.checked_add(file))
            .map(Self)
    }

    /// Build a square from its 0..64 index. Returns `None` off the board.
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 64 { Some(Self(index)) } else { None }
    }

    /// Build a square from an index already known to be on the board,
    /// wrapping anything larger back into `0..64`.
    pub const fn from_index_wrapping(index: u8) -> Self {
        Self(index % 64)
    }

    /// The 0..64 index.
    pub const fn index(self) -> u8 {
        self.0
    }

    /// 0-based file (a = 0).
    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    /// 0-based rank (rank 1 = 0).
    pub const fn rank(self) -> u8 {
        self.0 / 8
    }

    /// Chebyshev distance from the four central squares (0 on d4/e4/d5/e5).
    pub const fn center_distance(self) -> u8 {
        let file = self.file();
        let rank = self.rank();
        let df = if file < 4 { 3u8.saturating_sub(file) } else { file.saturating_sub(4) };
        let dr = if rank < 4 { 3u8.saturating_sub(rank) } else { rank.saturating_sub(4) };
        if df > dr { df } else { dr }
    }
}

impl core::fmt::Display for Square {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let file = char::from(b'a'.saturating_add(self.file()));
        let rank = char::from(b'1'.saturating_add(self.rank()));
        write!(f, "{file}{rank}")
    }
}

impl FromStr for Square {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NotationError::InvalidSquare {
            text: s.to_owned(),
        };
        let bytes = s.as_bytes();
        let (Some(&file), Some(&rank), 2) = (bytes.first(), bytes.get(1), bytes.len()) else {
            return Err(invalid());
        };
        let file = file.checked_sub(b'a').ok_or_else(invalid)?;
        let rank = rank.checked_sub(b'1').ok_or_else(invalid)?;
        Self::from_coords(file, rank).ok_or_else(invalid)
    }
}

/// A move from one square to another, with an optional promotion piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Origin square.
    pub from: Square,
    /// Destination square.
    pub to: Square,
    /// Piece a pawn promotes to, if any.
    pub promotion: Option<PieceKind>,
}

impl Move {
    /// A non-promoting move.
    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    /// A promoting move.
    pub const fn promoting(from: Square, to: Square, piece: PieceKind) -> Self {
        Self {
            from,
            to,
            promotion: Some(piece),
        }
    }
}

impl core::fmt::Display for Move {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece.symbol().to_ascii_lowercase())?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NotationError::InvalidMove {
            text: s.to_owned(),
        };
        let text = s.trim();
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(invalid());
        }
        let from: Square = text.get(0..2).ok_or_else(invalid)?.parse().map_err(|_e| invalid())?;
        let to: Square = text.get(2..4).ok_or_else(invalid)?.parse().map_err(|_e| invalid())?;
        let promotion = match text.get(4..5) {
            None | Some("") => None,
            Some("q") => Some(PieceKind::Queen),
            Some("r") => Some(PieceKind::Rook),
            Some("b") => Some(PieceKind::Bishop),
            Some("n") => Some(PieceKind::Knight),
            Some(_) => return Err(invalid()),
        };
        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn square_coordinates() {
        let e4: Square = "e4".parse().unwrap();
        assert_eq!(e4.file(), 4);
        assert_eq!(e4.rank(), 3);
        assert_eq!(e4.index(), 28);
        assert_eq!(e4.to_string(), "e4");
        assert_eq!(e4.center_distance(), 0);
        assert_eq!(Square::from_coords(0, 0).unwrap().center_distance(), 3);
    }

    #[test]
    fn rejects_off_board_squares() {
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("a".parse::<Square>().is_err());
        assert!(Square::from_coords(8, 0).is_none());
        assert!(Square::from_index(64).is_none());
    }

    #[test]
    fn uci_moves_parse_and_print() {
        let mv: Move = "e7e8q".parse().unwrap();
        assert_eq!(mv.promotion, Some(PieceKind::Queen));
        assert_eq!(mv.to_string(), "e7e8q");

        let quiet: Move = "g1f3".parse().unwrap();
        assert_eq!(quiet.promotion, None);
        assert_eq!(quiet.to_string(), "g1f3");
    }

    #[test]
    fn rejects_malformed_moves() {
        assert!("e2".parse::<Move>().is_err());
        assert!("e2e4k".parse::<Move>().is_err());
        assert!("z2e4".parse::<Move>().is_err());
    }
}
