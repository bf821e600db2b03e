//! Team-level psychological state.
//!
//! Recomputed from scratch after every commit from the individual emotional
//! states and the relationship network. Nothing here is stored between
//! rounds except the resulting [`PsychologicalState`] value.

use rust_decimal::Decimal;

use parliament_types::{ImpactPreview, PieceId, PieceKind, PsychologicalState, TacticalSummary};

use crate::config::PsychologyConfig;
use crate::emotion::EmotionalState;
use crate::relationship::RelationshipNetwork;

/// One active teammate as seen by [`recompute`].
#[derive(Debug, Clone, Copy)]
pub struct TeamMember<'a> {
    /// Piece id.
    pub id: PieceId,
    /// Current kind (after any promotion).
    pub kind: PieceKind,
    /// Current emotional state.
    pub state: &'a EmotionalState,
}

/// Compute the team state for `round`.
///
/// - cohesion: mean pairwise trust among the given members
/// - morale: individual morale weighted by each kind's psychological weight
/// - coordination: cooperative interactions in the window per round of the
///   window, capped at 1
/// - leadership: mean of confidence and morale of the king, else the queen,
///   else the heaviest piece
pub fn recompute(
    members: &[TeamMember<'_>],
    network: &RelationshipNetwork,
    round: u32,
    config: &PsychologyConfig,
) -> PsychologicalState {
    let ids: Vec<PieceId> = members.iter().map(|m| m.id).collect();
    let cohesion = network.mean_pair_trust(&ids);

    let (weighted, weights) = members.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(sum, total), member| {
            let weight = Decimal::from(member.kind.psychological_weight());
            (
                sum.saturating_add(member.state.morale().saturating_mul(weight)),
                total.saturating_add(weight),
            )
        },
    );
    let morale = weighted
        .checked_div(weights)
        .unwrap_or(Decimal::new(5, 1));

    let window = config.coordination_window.max(1);
    let cooperative = network
        .recent_interactions(window, round)
        .filter(|i| i.kind.is_cooperative())
        .count();
    let coordination = Decimal::from(cooperative)
        .checked_div(Decimal::from(window))
        .unwrap_or(Decimal::ZERO)
        .min(Decimal::ONE);

    let leadership = leader(members).map_or(Decimal::new(5, 1), |state| {
        state
            .confidence()
            .saturating_add(state.morale())
            .checked_div(Decimal::TWO)
            .unwrap_or(Decimal::ZERO)
    });

    PsychologicalState {
        round,
        cohesion: unit(cohesion),
        morale: unit(morale),
        coordination: unit(coordination),
        leadership: unit(leadership),
    }
}

fn leader<'a>(members: &[TeamMember<'a>]) -> Option<&'a EmotionalState> {
    let by_kind = |kind: PieceKind| members.iter().find(|m| m.kind == kind);
    by_kind(PieceKind::King)
        .or_else(|| by_kind(PieceKind::Queen))
        .or_else(|| {
            members
                .iter()
                .max_by_key(|m| (m.kind.psychological_weight(), std::cmp::Reverse(m.id)))
        })
        .map(|m| m.state)
}

fn unit(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, Decimal::ONE).round_dp(4)
}

/// Predicted change to the team if a move is played.
///
/// Any capture costs morale (-0.1). Retreats cost the mover confidence and
/// sacrifices cost trust toward the mover.
pub fn preview_impact(tactics: &TacticalSummary) -> ImpactPreview {
    let mut preview = ImpactPreview::default();
    if tactics.captured.is_some() {
        preview.morale = preview.morale.saturating_sub(Decimal::new(1, 1));
    }
    if tactics.retreat {
        preview.confidence = preview.confidence.saturating_sub(Decimal::new(5, 2));
    }
    if tactics.is_sacrifice() {
        preview.trust = preview.trust.saturating_sub(Decimal::new(2, 1));
    }
    preview
}
