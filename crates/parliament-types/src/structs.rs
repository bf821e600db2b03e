//! Core value types exchanged between the analyzer, the agents, the
//! mediator and the moderator.
//!
//! Everything here is plain data: no behavior beyond small accessors. State
//! machines that mutate these values live in `parliament-agents` and
//! `parliament-core`.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{
    ImpulseKind, InteractionKind, MomentKind, PersonalityKind, PieceKind, ScoringFactor, Side,
};
use crate::ids::PieceId;
use crate::squares::{Move, Square};

// ---------------------------------------------------------------------------
// Pieces
// ---------------------------------------------------------------------------

/// Who a piece is and where it stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceIdentity {
    /// Stable id assigned at setup.
    pub id: PieceId,
    /// Side the piece plays for.
    pub side: Side,
    /// Current kind. Changes only on promotion.
    pub kind: PieceKind,
    /// Current square. Meaningless once `captured` is set.
    pub square: Square,
    /// Whether the piece has left the board.
    pub captured: bool,
}

// ---------------------------------------------------------------------------
// Tactical analysis
// ---------------------------------------------------------------------------

/// Structured output of analyzing one candidate move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticalSummary {
    /// Kind of the moving piece.
    pub mover: PieceKind,
    /// Side making the move.
    pub side: Side,
    /// Kind of the captured piece, if any (en passant included).
    pub captured: Option<PieceKind>,
    /// Material value of the captured piece.
    pub captured_value: u32,
    /// Promotion piece, if the move promotes.
    pub promotion: Option<PieceKind>,
    /// The move puts the enemy king in check.
    pub gives_check: bool,
    /// Moving opened a friendly slider's line onto an enemy piece.
    pub discovered_attack: bool,
    /// Squares of friendly sliders whose lines the move opened.
    pub unmasked: Vec<Square>,
    /// Enemy pieces the moved piece forks (at least two when non-empty).
    pub fork_targets: Vec<Square>,
    /// The move pins an enemy piece that was not pinned before.
    pub pin_created: bool,
    /// The move captures or attacks an already pinned enemy piece.
    pub pin_exploited: bool,
    /// Change in the number of squares the moved piece attacks.
    pub control_delta: i32,
    /// The moved piece stands en prise on its destination.
    pub exposed: bool,
    /// Material the moved piece puts at risk on its destination.
    pub material_risk: u32,
    /// The moved piece was en prise before and is safe after.
    pub escaped_threat: bool,
    /// Allies the moved piece newly defends.
    pub defends: Vec<Square>,
    /// Allies that were en prise before and are safe after.
    pub rescues: Vec<Square>,
    /// The moved piece stepped back toward its own back rank.
    pub retreat: bool,
    /// Weighted combination of all of the above.
    pub positional_delta: Decimal,
}

impl TacticalSummary {
    /// Material won by the move: captured value plus promotion gain.
    pub fn material_gain(&self) -> u32 {
        let promotion_gain = self
            .promotion
            .map_or(0, |p| p.material_value().saturating_sub(1));
        self.captured_value.saturating_add(promotion_gain)
    }

    /// Whether the move forks two or more enemy pieces.
    pub fn is_fork(&self) -> bool {
        self.fork_targets.len() >= 2
    }

    /// Whether the moved piece exposes itself while saving an ally.
    pub fn is_sacrifice(&self) -> bool {
        self.exposed && !self.rescues.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Proposals
// ---------------------------------------------------------------------------

/// Per-factor contributions to a proposal's final score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    /// Material won.
    pub material: Decimal,
    /// Square control and piece-specific ideals.
    pub positional: Decimal,
    /// Forks, pins and discovered attacks.
    pub tactical: Decimal,
    /// Giving check.
    pub check: Decimal,
    /// Helping trusted allies.
    pub support: Decimal,
    /// Material risked (negative) or saved (positive).
    pub safety: Decimal,
}

impl FactorBreakdown {
    /// The contribution of a single factor.
    pub const fn get(&self, factor: ScoringFactor) -> Decimal {
        match factor {
            ScoringFactor::Material => self.material,
            ScoringFactor::Positional => self.positional,
            ScoringFactor::Tactical => self.tactical,
            ScoringFactor::Check => self.check,
            ScoringFactor::Support => self.support,
            ScoringFactor::Safety => self.safety,
        }
    }

    /// Mutable access to a single factor.
    pub fn get_mut(&mut self, factor: ScoringFactor) -> &mut Decimal {
        match factor {
            ScoringFactor::Material => &mut self.material,
            ScoringFactor::Positional => &mut self.positional,
            ScoringFactor::Tactical => &mut self.tactical,
            ScoringFactor::Check => &mut self.check,
            ScoringFactor::Support => &mut self.support,
            ScoringFactor::Safety => &mut self.safety,
        }
    }

    /// The factor with the largest absolute contribution.
    ///
    /// Ties resolve to the earliest factor in [`ScoringFactor::ALL`]. A
    /// breakdown of all zeros is a quiet positional move.
    pub fn dominant(&self) -> ScoringFactor {
        let mut best = ScoringFactor::Positional;
        let mut best_abs = Decimal::ZERO;
        for factor in ScoringFactor::ALL {
            let abs = self.get(factor).abs();
            if abs > best_abs {
                best = factor;
                best_abs = abs;
            }
        }
        best
    }
}

/// Deterministic argument attached to a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentTag {
    /// Personality voicing the argument.
    pub personality: PersonalityKind,
    /// Factor the argument is about.
    pub factor: ScoringFactor,
    /// A remembered moment the piece invokes, if any.
    pub recollection: Option<MomentKind>,
    /// Rendered phrase, looked up from the personality's vocabulary.
    pub phrase: String,
}

/// A scored candidate move argued for by one piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Piece making the proposal.
    pub proposer: PieceId,
    /// Kind of the proposing piece.
    pub piece: PieceKind,
    /// Proposed move.
    pub mv: Move,
    /// Final score after personality and emotional modifiers.
    pub score: Decimal,
    /// Argument tag.
    pub argument: ArgumentTag,
    /// Tactical summary the score was computed from.
    pub tactics: TacticalSummary,
    /// Per-factor contributions.
    pub factors: FactorBreakdown,
    /// Factor with the largest contribution.
    pub dominant: ScoringFactor,
    /// Ally the move helps most, if any.
    pub support_target: Option<PieceId>,
}

// ---------------------------------------------------------------------------
// Interactions and moments
// ---------------------------------------------------------------------------

/// Something one teammate did to or with another.
///
/// `actor` is the piece taking the action. For a sacrifice the actor is the
/// sacrificing piece and `other` the piece it saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Kind of interaction.
    pub kind: InteractionKind,
    /// Acting piece.
    pub actor: PieceId,
    /// Other participant.
    pub other: PieceId,
    /// Strength in `[0, 1]`.
    pub magnitude: Decimal,
    /// Round the interaction happened in.
    pub round: u32,
}

impl Interaction {
    /// Whether the interaction involves both pieces, in either role.
    pub fn involves_pair(&self, a: PieceId, b: PieceId) -> bool {
        (self.actor == a && self.other == b) || (self.actor == b && self.other == a)
    }
}

/// Result of the debate that chose a committed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateOutcome {
    /// Proposer of the selected move.
    pub winner: PieceId,
    /// Other pieces that proposed a move this round.
    pub overruled: Vec<PieceId>,
    /// The top two scores were within the consensus margin, or only one
    /// proposal was offered.
    pub consensus: bool,
    /// Score of the selected proposal.
    pub winning_score: Decimal,
}

/// A noteworthy event on one committed move; the unit the mediator
/// dispatches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moment {
    /// Round the move was committed in.
    pub round: u32,
    /// Side that moved.
    pub side: Side,
    /// What happened.
    pub kind: MomentKind,
    /// The committed move.
    pub mv: Move,
    /// Teammate that moved, when the team moved.
    pub mover: Option<PieceId>,
    /// Analysis of the committed move from the mover's perspective.
    pub tactics: TacticalSummary,
    /// Interactions the move produced between teammates.
    pub interactions: Vec<Interaction>,
    /// Debate result, when the team moved.
    pub debate: Option<DebateOutcome>,
    /// Teammate captured by the opponent.
    pub captured: Option<PieceId>,
    /// Teammates newly en prise after the move.
    pub threatened: Vec<PieceId>,
    /// Teammates pulled out of danger by the move.
    pub rescued: Vec<PieceId>,
}

impl Moment {
    /// Every teammate the moment touches, in id order.
    pub fn participants(&self) -> Vec<PieceId> {
        let mut ids = BTreeSet::new();
        ids.extend(self.mover);
        ids.extend(self.captured);
        ids.extend(self.threatened.iter().copied());
        ids.extend(self.rescued.iter().copied());
        for interaction in &self.interactions {
            ids.insert(interaction.actor);
            ids.insert(interaction.other);
        }
        ids.into_iter().collect()
    }
}

// ---------------------------------------------------------------------------
// Emotions, relationships, memory, psychology
// ---------------------------------------------------------------------------

/// A request to change one piece's emotional state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionalImpulse {
    /// Piece receiving the impulse.
    pub target: PieceId,
    /// Kind of impulse; selects the delta table row.
    pub kind: ImpulseKind,
    /// Scale in `[0, 1]` applied to the delta row.
    pub magnitude: Decimal,
}

/// Applied change to the four emotional scalars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionalDelta {
    /// Change in confidence.
    pub confidence: Decimal,
    /// Change in morale.
    pub morale: Decimal,
    /// Change in trust.
    pub trust: Decimal,
    /// Change in aggression.
    pub aggression: Decimal,
}

impl EmotionalDelta {
    /// Sum of two deltas. `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        Some(Self {
            confidence: self.confidence.checked_add(other.confidence)?,
            morale: self.morale.checked_add(other.morale)?,
            trust: self.trust.checked_add(other.trust)?,
            aggression: self.aggression.checked_add(other.aggression)?,
        })
    }

    /// Whether nothing changed.
    pub fn is_zero(&self) -> bool {
        self.confidence.is_zero()
            && self.morale.is_zero()
            && self.trust.is_zero()
            && self.aggression.is_zero()
    }
}

/// How one relationship edge moved after an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipChange {
    /// Interaction kind that caused the change.
    pub kind: InteractionKind,
    /// Lower id of the pair.
    pub low: PieceId,
    /// Higher id of the pair.
    pub high: PieceId,
    /// Change in the low piece's trust in the high piece.
    pub trust_low_high_delta: Decimal,
    /// Change in the high piece's trust in the low piece.
    pub trust_high_low_delta: Decimal,
    /// Change in cooperation.
    pub cooperation_delta: Decimal,
    /// Mean trust after the change.
    pub mean_trust: Decimal,
    /// Cooperation after the change.
    pub cooperation: Decimal,
}

/// One entry in the team's game memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Round the moment happened in.
    pub round: u32,
    /// What happened.
    pub kind: MomentKind,
    /// Teammates involved.
    pub participants: Vec<PieceId>,
    /// Rendered narrative line.
    pub narrative: String,
    /// Significance in `[0, 1]`.
    pub significance: Decimal,
}

/// Team-level aggregate recomputed every round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsychologicalState {
    /// Round the state was computed for.
    pub round: u32,
    /// Mean pairwise trust among active teammates.
    pub cohesion: Decimal,
    /// Value-weighted mean morale.
    pub morale: Decimal,
    /// Density of cooperative interactions in the recent window.
    pub coordination: Decimal,
    /// Confidence and morale of the leading piece.
    pub leadership: Decimal,
}

/// Predicted team-level effect of a candidate move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactPreview {
    /// Expected change in team morale.
    pub morale: Decimal,
    /// Expected change in the mover's confidence.
    pub confidence: Decimal,
    /// Expected change in trust toward the mover.
    pub trust: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn quiet_summary() -> TacticalSummary {
        TacticalSummary {
            mover: PieceKind::Knight,
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
        }
    }

    #[test]
    fn material_gain_counts_promotion() {
        let mut summary = quiet_summary();
        summary.mover = PieceKind::Pawn;
        summary.promotion = Some(PieceKind::Queen);
        summary.captured_value = 3;
        assert_eq!(summary.material_gain(), 11);
    }

    #[test]
    fn sacrifice_requires_exposure_and_rescue() {
        let mut summary = quiet_summary();
        summary.exposed = true;
        assert!(!summary.is_sacrifice());
        summary.rescues.push("d4".parse().unwrap());
        assert!(summary.is_sacrifice());
    }

    #[test]
    fn dominant_factor_breaks_ties_in_declaration_order() {
        let breakdown = FactorBreakdown {
            material: Decimal::ONE,
            tactical: Decimal::ONE,
            safety: Decimal::new(-5, 1),
            ..FactorBreakdown::default()
        };
        assert_eq!(breakdown.dominant(), ScoringFactor::Material);

        let risky = FactorBreakdown {
            safety: Decimal::new(-3, 0),
            ..breakdown
        };
        assert_eq!(risky.dominant(), ScoringFactor::Safety);
        assert_eq!(FactorBreakdown::default().dominant(), ScoringFactor::Positional);
    }

    #[test]
    fn moment_participants_are_unique_and_sorted() {
        let moment = Moment {
            round: 3,
            side: Side::White,
            kind: MomentKind::Rescue,
            mv: "e2e4".parse().unwrap(),
            mover: Some(PieceId(5)),
            tactics: quiet_summary(),
            interactions: vec![Interaction {
                kind: InteractionKind::Support,
                actor: PieceId(5),
                other: PieceId(2),
                magnitude: Decimal::ONE,
                round: 3,
            }],
            debate: None,
            captured: None,
            threatened: Vec::new(),
            rescued: vec![PieceId(2)],
        };
        assert_eq!(moment.participants(), vec![PieceId(2), PieceId(5)]);
    }

    #[test]
    fn deltas_accumulate() {
        let a = EmotionalDelta {
            confidence: Decimal::new(1, 1),
            ..EmotionalDelta::default()
        };
        let total = a.checked_add(a).unwrap();
        assert_eq!(total.confidence, Decimal::new(2, 1));
        assert!(EmotionalDelta::default().is_zero());
        assert!(!total.is_zero());
    }
}
