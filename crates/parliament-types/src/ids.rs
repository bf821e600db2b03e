//! Strongly-typed identifiers.
//!
//! Pieces are identified by small stable integers assigned at game setup in
//! board-square order, so the relationship network can key edges by id pairs
//! without holding references between agents. A game session is identified
//! by a UUID v7 so round reports from different sessions never collide.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one piece of the debating team.
///
/// Assigned once at setup and never reused, even after the piece is
/// captured. Ordering is the setup order, which the moderator uses as the
/// final ranking tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PieceId(pub u16);

impl PieceId {
    /// Return the raw index value.
    pub const fn into_inner(self) -> u16 {
        self.0
    }
}

impl core::fmt::Display for PieceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u16> for PieceId {
    fn from(id: u16) -> Self {
        Self(id)
    }
}

/// Unique identifier for a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameId(pub Uuid);

impl GameId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for GameId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for GameId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_ids_order_by_setup_index() {
        assert!(PieceId(1) < PieceId(2));
        assert_eq!(PieceId::from(7).into_inner(), 7);
        assert_eq!(PieceId(3).to_string(), "#3");
    }

    #[test]
    fn game_ids_are_unique() {
        let a = GameId::new();
        let b = GameId::new();
        assert_ne!(a, b);
    }
}
