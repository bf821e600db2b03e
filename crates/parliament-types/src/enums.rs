//! Enumeration types for the debate engine.
//!
//! Closed sets only: adding a personality or an impulse means adding a
//! variant here plus a row in the corresponding table, never new control
//! flow.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Board-facing enums
// ---------------------------------------------------------------------------

/// One of the two sides of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The side that moves first.
    White,
    /// The side that moves second.
    Black,
}

impl Side {
    /// The other side.
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// The rank index (0-based) of this side's back rank.
    pub const fn back_rank(self) -> u8 {
        match self {
            Self::White => 0,
            Self::Black => 7,
        }
    }
}

impl core::fmt::Display for Side {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::White => write!(f, "white"),
            Self::Black => write!(f, "black"),
        }
    }
}

/// The kind of a chess piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    /// Pawn.
    Pawn,
    /// Knight.
    Knight,
    /// Bishop.
    Bishop,
    /// Rook.
    Rook,
    /// Queen.
    Queen,
    /// King.
    King,
}

impl PieceKind {
    /// Conventional material value in pawns. The king has no material value.
    pub const fn material_value(self) -> u32 {
        match self {
            Self::Pawn => 1,
            Self::Knight | Self::Bishop => 3,
            Self::Rook => 5,
            Self::Queen => 9,
            Self::King => 0,
        }
    }

    /// Weight of this piece in team-level psychology aggregates.
    ///
    /// Same as material value except that the king, whose morale matters to
    /// everyone, carries a weight of 4.
    pub const fn psychological_weight(self) -> u32 {
        match self {
            Self::King => 4,
            other => other.material_value(),
        }
    }

    /// Whether this piece attacks along lines that can be masked by others.
    pub const fn is_slider(self) -> bool {
        matches!(self, Self::Bishop | Self::Rook | Self::Queen)
    }

    /// The personality this piece kind embodies.
    pub const fn personality(self) -> PersonalityKind {
        match self {
            Self::Knight => PersonalityKind::Quixotic,
            Self::Bishop => PersonalityKind::Zealous,
            Self::Rook => PersonalityKind::Fortress,
            Self::Queen => PersonalityKind::Dramatic,
            Self::King => PersonalityKind::Neurotic,
            Self::Pawn => PersonalityKind::Revolutionary,
        }
    }

    /// Single-letter symbol (uppercase), as in algebraic notation.
    pub const fn symbol(self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Rook => 'R',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }
}

impl core::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Pawn => "pawn",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Rook => "rook",
            Self::Queen => "queen",
            Self::King => "king",
        };
        write!(f, "{name}")
    }
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    /// The side to move is checkmated.
    Checkmate {
        /// The side that delivered mate.
        winner: Side,
    },
    /// The side to move has no legal moves and is not in check.
    Stalemate,
}

impl core::fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Checkmate { winner } => write!(f, "checkmate, {winner} wins"),
            Self::Stalemate => write!(f, "stalemate"),
        }
    }
}

// ---------------------------------------------------------------------------
// Personality and scoring
// ---------------------------------------------------------------------------

/// Closed set of personalities. Each piece kind embodies exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityKind {
    /// Knight: romantic, leaps at glory.
    Quixotic,
    /// Bishop: single-minded about long diagonals.
    Zealous,
    /// Rook: an anxious fortress that prefers files and back ranks.
    Fortress,
    /// Queen: craves the spotlight.
    Dramatic,
    /// King: sees danger everywhere.
    Neurotic,
    /// Pawn: dreams of promotion.
    Revolutionary,
}

/// A scoring factor that can dominate a proposal.
///
/// Declaration order is the tie-break order when two factors contribute the
/// same absolute amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringFactor {
    /// Material won (captures and promotion).
    Material,
    /// Square control and piece-specific positional ideals.
    Positional,
    /// Forks, pins and discovered attacks.
    Tactical,
    /// Giving check.
    Check,
    /// Helping allies the piece trusts.
    Support,
    /// Material put at risk or rescued from danger.
    Safety,
}

impl ScoringFactor {
    /// All factors in tie-break order.
    pub const ALL: [Self; 6] = [
        Self::Material,
        Self::Positional,
        Self::Tactical,
        Self::Check,
        Self::Support,
        Self::Safety,
    ];
}

// ---------------------------------------------------------------------------
// Interactions, moments, impulses
// ---------------------------------------------------------------------------

/// Kind of interaction between two teammates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// One piece defends or enables another.
    Support,
    /// Two pieces act together, e.g. a discovered attack.
    Cooperation,
    /// A piece exposes itself to save another. The only asymmetric kind.
    Sacrifice,
    /// Two pieces argued for competing moves.
    Competition,
    /// A shared loss that damages the relationship for both.
    Trauma,
}

impl InteractionKind {
    /// Whether this kind counts toward recent cooperation.
    pub const fn is_cooperative(self) -> bool {
        matches!(self, Self::Support | Self::Cooperation | Self::Sacrifice)
    }
}

/// The noteworthy thing that happened on a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentKind {
    /// A teammate exposed itself to save another.
    Sacrifice,
    /// A teammate captured an enemy piece.
    Capture,
    /// A teammate forked enemy pieces.
    Fork,
    /// A teammate promoted.
    Promotion,
    /// A teammate gave check.
    Check,
    /// A teammate pulled an ally out of danger.
    Rescue,
    /// The opponent captured a teammate.
    Loss,
    /// The opponent attacked teammates or checked the king.
    Harassment,
    /// Nothing remarkable.
    Quiet,
}

impl MomentKind {
    /// Short narrative phrase used when the team recalls this kind of moment.
    pub const fn narrative(self) -> &'static str {
        match self {
            Self::Sacrifice => "the sacrifice",
            Self::Capture => "the triumph",
            Self::Fork => "the fork",
            Self::Promotion => "the coronation",
            Self::Check => "the assault on the king",
            Self::Rescue => "the rescue",
            Self::Loss => "the fallen",
            Self::Harassment => "the harassment",
            Self::Quiet => "the waiting",
        }
    }
}

/// Kind of emotional impulse an observer can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpulseKind {
    /// The piece won material or landed a blow.
    Triumph,
    /// A teammate was captured.
    Loss,
    /// The piece came under attack.
    Threatened,
    /// An ally supported the piece.
    Supported,
    /// An ally pulled the piece out of danger.
    Rescued,
    /// The piece exposed itself for an ally.
    Sacrificed,
    /// The piece retreated toward its own back rank.
    Retreated,
    /// The piece's proposal won the debate.
    Praised,
    /// The piece's proposal lost the debate.
    Overruled,
    /// The debate reached consensus.
    Consensus,
    /// The debate ended in dissent.
    Dissent,
    /// The piece feels abandoned by a teammate.
    Betrayed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_values_follow_convention() {
        assert_eq!(PieceKind::Pawn.material_value(), 1);
        assert_eq!(PieceKind::Bishop.material_value(), 3);
        assert_eq!(PieceKind::Queen.material_value(), 9);
        assert_eq!(PieceKind::King.material_value(), 0);
        assert_eq!(PieceKind::King.psychological_weight(), 4);
    }

    #[test]
    fn every_piece_kind_has_distinct_personality() {
        let kinds = [
            PieceKind::Pawn,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Rook,
            PieceKind::Queen,
            PieceKind::King,
        ];
        let personalities: std::collections::BTreeSet<_> =
            kinds.iter().map(|k| k.personality()).collect();
        assert_eq!(personalities.len(), kinds.len());
    }

    #[test]
    fn cooperative_interactions() {
        assert!(InteractionKind::Support.is_cooperative());
        assert!(InteractionKind::Sacrifice.is_cooperative());
        assert!(!InteractionKind::Competition.is_cooperative());
        assert!(!InteractionKind::Trauma.is_cooperative());
    }

    #[test]
    fn side_round_trips_through_yaml_names() {
        let side: Side = serde_json::from_str("\"black\"").unwrap_or(Side::White);
        assert_eq!(side, Side::Black);
        assert_eq!(side.opponent(), Side::White);
    }
}
