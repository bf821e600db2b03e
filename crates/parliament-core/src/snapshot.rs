//! Value snapshots of round-scoped state and the bounded history that
//! keeps them.

use std::collections::VecDeque;

use parliament_board::Position;
use parliament_types::PieceId;

use crate::team::Team;

/// Everything a commit may change, copied by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Rounds committed so far.
    pub round: u32,
    /// Board position.
    pub position: Position,
    /// Team state.
    pub team: Team,
    /// Teammate that made the team's most recent move.
    pub last_mover: Option<PieceId>,
}

/// Bounded history of snapshots, newest last.
#[derive(Debug, Clone)]
pub struct Caretaker {
    capacity: usize,
    history: VecDeque<Snapshot>,
}

impl Caretaker {
    /// Create a caretaker that keeps at most `capacity` snapshots (at
    /// least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            history: VecDeque::with_capacity(capacity),
        }
    }

    /// Store a snapshot, evicting the oldest when full.
    pub fn capture(&mut self, snapshot: Snapshot) {
        self.history.push_back(snapshot);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }
    }

    /// The most recent snapshot.
    pub fn latest(&self) -> Option<&Snapshot> {
        self.history.back()
    }

    /// Number of snapshots held.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether no snapshot has been captured.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Held snapshots, oldest first.
    pub const fn history(&self) -> &VecDeque<Snapshot> {
        &self.history
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parliament_agents::AgentConfig;
    use parliament_types::Side;

    use super::*;

    fn snapshot(round: u32) -> Snapshot {
        let position = Position::start();
        let team = Team::new(&position, Side::White, &AgentConfig::default());
        Snapshot {
            round,
            position,
            team,
            last_mover: None,
        }
    }

    #[test]
    fn keeps_newest_within_capacity() {
        let mut caretaker = Caretaker::new(2);
        assert!(caretaker.is_empty());
        for round in 0..3 {
            caretaker.capture(snapshot(round));
        }
        assert_eq!(caretaker.len(), 2);
        assert_eq!(caretaker.latest().unwrap().round, 2);
        assert_eq!(caretaker.history().front().unwrap().round, 1);
    }

    #[test]
    fn zero_capacity_still_keeps_one() {
        let mut caretaker = Caretaker::new(0);
        caretaker.capture(snapshot(0));
        caretaker.capture(snapshot(1));
        assert_eq!(caretaker.len(), 1);
        assert_eq!(caretaker.latest().unwrap(), &snapshot(1));
    }
}
