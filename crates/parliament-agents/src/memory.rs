//! Game memory: a bounded log of the moments the team lived through.
//!
//! Every committed moment is recorded with a significance score derived
//! from the emotional impulses it produced. Pieces recall the most recent
//! significant entry they took part in when arguing for a move.

use std::collections::VecDeque;

use rust_decimal::Decimal;
use serde::Serialize;

use parliament_types::{EmotionalImpulse, MemoryEntry, Moment, MomentKind, PieceId};

use crate::config::MemoryConfig;

/// Bounded, oldest-first log of recorded moments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameMemory {
    #[serde(skip)]
    config: MemoryConfig,
    entries: VecDeque<MemoryEntry>,
}

impl GameMemory {
    /// Create an empty memory.
    pub const fn new(config: MemoryConfig) -> Self {
        Self {
            config,
            entries: VecDeque::new(),
        }
    }

    /// Record a moment and the impulses it caused, evicting the oldest entry
    /// when full. Returns the stored entry.
    ///
    /// Significance is the summed impulse magnitude per participant, capped
    /// at 1.
    pub fn record(&mut self, moment: &Moment, impulses: &[EmotionalImpulse]) -> MemoryEntry {
        let participants = moment.participants();
        let entry = MemoryEntry {
            round: moment.round,
            kind: moment.kind,
            narrative: narrate(moment, &participants),
            significance: significance(impulses, participants.len()),
            participants,
        };
        self.entries.push_back(entry.clone());
        while self.entries.len() > self.config.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                tracing::trace!(round = evicted.round, kind = ?evicted.kind, "memory evicted");
            }
        }
        entry
    }

    /// Every entry, oldest first.
    pub const fn entries(&self) -> &VecDeque<MemoryEntry> {
        &self.entries
    }

    /// Entries a piece took part in, oldest first.
    pub fn for_piece(&self, piece: PieceId) -> impl DoubleEndedIterator<Item = &MemoryEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.participants.contains(&piece))
    }

    /// The most recent significant moment involving `piece` within the last
    /// `window` rounds before `round`.
    pub fn recollection(&self, piece: PieceId, round: u32, window: u32) -> Option<MomentKind> {
        self.for_piece(piece)
            .rev()
            .take_while(|entry| round.saturating_sub(entry.round) <= window)
            .find(|entry| entry.significance >= self.config.significance_threshold)
            .map(|entry| entry.kind)
    }
}

fn significance(impulses: &[EmotionalImpulse], participants: usize) -> Decimal {
    let total = impulses
        .iter()
        .fold(Decimal::ZERO, |acc, impulse| acc.saturating_add(impulse.magnitude.abs()));
    let divisor = Decimal::from(participants.max(1));
    total
        .checked_div(divisor)
        .unwrap_or(Decimal::ONE)
        .min(Decimal::ONE)
        .round_dp(4)
}

fn narrate(moment: &Moment, participants: &[PieceId]) -> String {
    let names: Vec<String> = participants.iter().map(ToString::to_string).collect();
    let mut text = format!(
        "round {}: {} ({} {})",
        moment.round,
        moment.kind.narrative(),
        moment.side,
        moment.mv
    );
    if !names.is_empty() {
        text.push_str(" with ");
        text.push_str(&names.join(", "));
    }
    text
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parliament_types::{ImpulseKind, Move, PieceKind, Side, TacticalSummary};

    use super::*;

    fn moment(round: u32, kind: MomentKind, mover: u16) -> Moment {
        Moment {
            round,
            side: Side::White,
            kind,
            mv: "e2e4".parse::<Move>().unwrap(),
            mover: Some(PieceId(mover)),
            tactics: TacticalSummary {
                mover: PieceKind::Pawn,
                side: Side::White,
                captured: None,
                captured_value: 0,
                promotion: None,
                gives_check: false,
                discovered_attack: false,
                unmasked: Vec::new(),
                fork_targets: Vec::new(),
                pin_created: false,
                pin_exploited: false,
                control_delta: 0,
                exposed: false,
                material_risk: 0,
                escaped_threat: false,
                defends: Vec::new(),
                rescues: Vec::new(),
                retreat: false,
                positional_delta: Decimal::ZERO,
            },
            interactions: Vec::new(),
            debate: None,
            captured: None,
            threatened: Vec::new(),
            rescued: Vec::new(),
        }
    }

    fn impulse(target: u16, magnitude: Decimal) -> EmotionalImpulse {
        EmotionalImpulse {
            target: PieceId(target),
            kind: ImpulseKind::Triumph,
            magnitude,
        }
    }

    #[test]
    fn significance_is_capped_per_participant() {
        let mut memory = GameMemory::new(MemoryConfig::default());
        let entry = memory.record(
            &moment(1, MomentKind::Capture, 3),
            &[impulse(3, Decimal::ONE), impulse(3, Decimal::ONE)],
        );
        assert_eq!(entry.significance, Decimal::ONE);
        assert_eq!(entry.participants, vec![PieceId(3)]);
        assert!(entry.narrative.contains("the triumph"));

        let quiet = memory.record(&moment(2, MomentKind::Quiet, 3), &[]);
        assert_eq!(quiet.significance, Decimal::ZERO);
    }

    #[test]
    fn eviction_is_oldest_first() {
        let mut memory = GameMemory::new(MemoryConfig {
            capacity: 2,
            ..MemoryConfig::default()
        });
        for round in 0..4 {
            memory.record(&moment(round, MomentKind::Quiet, 0), &[]);
        }
        let rounds: Vec<u32> = memory.entries().iter().map(|e| e.round).collect();
        assert_eq!(rounds, vec![2, 3]);
    }

    #[test]
    fn recollection_skips_insignificant_and_stale_entries() {
        let mut memory = GameMemory::new(MemoryConfig::default());
        memory.record(&moment(1, MomentKind::Fork, 2), &[impulse(2, Decimal::ONE)]);
        memory.record(&moment(3, MomentKind::Quiet, 2), &[]);
        assert_eq!(memory.recollection(PieceId(2), 4, 6), Some(MomentKind::Fork));
        assert_eq!(memory.recollection(PieceId(2), 20, 6), None);
        assert_eq!(memory.recollection(PieceId(9), 4, 6), None);
    }
}
