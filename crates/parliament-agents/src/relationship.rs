//! Relationship network between teammates.
//!
//! One edge per unordered pair of pieces, keyed `(low, high)` by id. Each
//! edge carries two directed trust values and a shared cooperation score,
//! all in `[0, 1]`. Every interaction moves the edge by a fixed base delta
//! scaled by the interaction's magnitude and capped by `max_step`; the edge
//! is re-verified after every update.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rust_decimal::Decimal;
use serde::Serialize;

use parliament_types::{Interaction, InteractionKind, PieceId, RelationshipChange};

use crate::config::RelationshipConfig;
use crate::error::AgentError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Trust gained by both sides on a support interaction (+0.05).
fn delta_support_trust() -> Decimal {
    Decimal::new(5, 2)
}

/// Cooperation gained on a support interaction (+0.05).
fn delta_support_cooperation() -> Decimal {
    Decimal::new(5, 2)
}

/// Trust gained by both sides on a cooperation interaction (+0.03).
fn delta_cooperation_trust() -> Decimal {
    Decimal::new(3, 2)
}

/// Cooperation gained on a cooperation interaction (+0.08).
fn delta_cooperation_cooperation() -> Decimal {
    Decimal::new(8, 2)
}

/// Trust lost by both sides on a competition interaction (-0.04).
fn delta_competition_trust() -> Decimal {
    Decimal::new(-4, 2)
}

/// Trust the beneficiary gains in the sacrificer (+0.15).
fn delta_sacrifice_received() -> Decimal {
    Decimal::new(15, 2)
}

/// Trust the sacrificer gains in the beneficiary (+0.05).
fn delta_sacrifice_given() -> Decimal {
    Decimal::new(5, 2)
}

/// Trust and cooperation lost by both sides on trauma (-0.15).
fn delta_trauma() -> Decimal {
    Decimal::new(-15, 2)
}

// ---------------------------------------------------------------------------
// RelationshipEdge
// ---------------------------------------------------------------------------

/// Relationship between two teammates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipEdge {
    /// How much the lower-id piece trusts the higher-id piece.
    pub trust_low_high: Decimal,
    /// How much the higher-id piece trusts the lower-id piece.
    pub trust_high_low: Decimal,
    /// Shared cooperation score.
    pub cooperation: Decimal,
    /// Round of the most recent interaction, if any.
    pub last_interaction_round: Option<u32>,
    /// Number of interactions recorded on this edge.
    pub interactions: u32,
}

impl RelationshipEdge {
    const fn neutral(config: &RelationshipConfig) -> Self {
        Self {
            trust_low_high: config.neutral_trust,
            trust_high_low: config.neutral_trust,
            cooperation: config.neutral_cooperation,
            last_interaction_round: None,
            interactions: 0,
        }
    }

    /// Mean of the two directed trust values.
    pub fn mean_trust(&self) -> Decimal {
        self.trust_low_high
            .checked_add(self.trust_high_low)
            .and_then(|sum| sum.checked_div(Decimal::TWO))
            .unwrap_or(self.trust_low_high)
    }

    fn asymmetry(&self) -> Decimal {
        self.trust_low_high
            .checked_sub(self.trust_high_low)
            .map_or(Decimal::ZERO, |gap| gap.abs())
    }
}

// ---------------------------------------------------------------------------
// RelationshipNetwork
// ---------------------------------------------------------------------------

/// Graph of relationships among the pieces of one team.
///
/// Written only by the interaction mediator during a commit; everything
/// else reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipNetwork {
    #[serde(skip)]
    config: RelationshipConfig,
    members: BTreeSet<PieceId>,
    #[serde(serialize_with = "serialize_edges")]
    edges: BTreeMap<(PieceId, PieceId), RelationshipEdge>,
    history: VecDeque<Interaction>,
}

impl RelationshipNetwork {
    /// Create an empty network.
    pub const fn new(config: RelationshipConfig) -> Self {
        Self {
            config,
            members: BTreeSet::new(),
            edges: BTreeMap::new(),
            history: VecDeque::new(),
        }
    }

    /// Add a piece, creating a neutral edge to every existing member.
    ///
    /// Registering a piece twice is a no-op.
    pub fn register(&mut self, piece: PieceId) {
        if !self.members.insert(piece) {
            return;
        }
        for &other in &self.members {
            if other != piece {
                self.edges
                    .entry(ordered(piece, other))
                    .or_insert_with(|| RelationshipEdge::neutral(&self.config));
            }
        }
    }

    /// Registered pieces in id order.
    pub const fn members(&self) -> &BTreeSet<PieceId> {
        &self.members
    }

    /// The edge between two pieces, in either order.
    pub fn edge(&self, a: PieceId, b: PieceId) -> Option<&RelationshipEdge> {
        self.edges.get(&ordered(a, b))
    }

    /// How much `truster` trusts `trusted`, or the neutral value when the
    /// pair has no edge.
    pub fn trust(&self, truster: PieceId, trusted: PieceId) -> Decimal {
        self.edge(truster, trusted)
            .map_or(self.config.neutral_trust, |edge| {
                if truster < trusted {
                    edge.trust_low_high
                } else {
                    edge.trust_high_low
                }
            })
    }

    /// Support bonus between two pieces: `mean_trust * (1 + cooperation / 2)`.
    ///
    /// Pairs without an edge get the bonus of a neutral edge.
    pub fn get_support_bonus(&self, a: PieceId, b: PieceId) -> Decimal {
        let (trust, cooperation) = self.edge(a, b).map_or(
            (self.config.neutral_trust, self.config.neutral_cooperation),
            |edge| (edge.mean_trust(), edge.cooperation),
        );
        let half = cooperation.checked_div(Decimal::TWO).unwrap_or(Decimal::ZERO);
        let factor = Decimal::ONE.saturating_add(half);
        trust.saturating_mul(factor)
    }

    /// Number of cooperative interactions between `a` and `b` recorded in
    /// the last `window` rounds up to and including `round`.
    pub fn get_recent_cooperation(&self, a: PieceId, b: PieceId, window: u32, round: u32) -> u32 {
        let count = self
            .recent_interactions(window, round)
            .filter(|i| i.kind.is_cooperative() && i.involves_pair(a, b))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Interactions recorded in the last `window` rounds up to `round`.
    pub fn recent_interactions(&self, window: u32, round: u32) -> impl Iterator<Item = &Interaction> {
        self.history
            .iter()
            .filter(move |i| i.round <= round && round.saturating_sub(i.round) < window)
    }

    /// The capped interaction history, oldest first.
    pub const fn history(&self) -> &VecDeque<Interaction> {
        &self.history
    }

    /// Mean trust over every pair drawn from `pieces`, or the neutral trust
    /// when fewer than two pieces are given.
    pub fn mean_pair_trust(&self, pieces: &[PieceId]) -> Decimal {
        let mut total = Decimal::ZERO;
        let mut pairs: u32 = 0;
        for (i, &a) in pieces.iter().enumerate() {
            for &b in pieces.iter().skip(i.saturating_add(1)) {
                let trust = self
                    .edge(a, b)
                    .map_or(self.config.neutral_trust, RelationshipEdge::mean_trust);
                total = total.saturating_add(trust);
                pairs = pairs.saturating_add(1);
            }
        }
        total
            .checked_div(Decimal::from(pairs))
            .unwrap_or(self.config.neutral_trust)
    }

    /// Apply one interaction to the edge between its two pieces.
    ///
    /// # Errors
    ///
    /// - [`AgentError::SelfInteraction`] if actor and other are the same piece
    /// - [`AgentError::UnknownPiece`] if either piece is not registered
    /// - [`AgentError::InvariantViolation`] if the updated edge leaves its
    ///   range or exceeds the asymmetry bound
    pub fn record_interaction(
        &mut self,
        interaction: &Interaction,
    ) -> Result<RelationshipChange, AgentError> {
        let Interaction {
            kind,
            actor,
            other,
            magnitude,
            round,
        } = *interaction;
        if actor == other {
            return Err(AgentError::SelfInteraction { piece: actor, kind });
        }
        for piece in [actor, other] {
            if !self.members.contains(&piece) {
                return Err(AgentError::UnknownPiece(piece));
            }
        }

        let magnitude = magnitude.clamp(Decimal::ZERO, Decimal::ONE);
        let (actor_trust, other_trust, cooperation) = base_deltas(kind);
        let step = |base: Decimal| -> Result<Decimal, AgentError> {
            let scaled = base
                .checked_mul(magnitude)
                .ok_or_else(|| AgentError::overflow("relationship step"))?;
            let limit = self.config.max_step;
            Ok(scaled.clamp(Decimal::ZERO.saturating_sub(limit), limit))
        };
        let actor_step = step(actor_trust)?;
        let other_step = step(other_trust)?;
        let cooperation_step = step(cooperation)?;

        let key = ordered(actor, other);
        let max_asymmetry = self.config.max_asymmetry;
        let edge = self
            .edges
            .get_mut(&key)
            .ok_or(AgentError::UnknownPiece(other))?;

        let before = edge.clone();
        // `actor_step` moves the actor's trust in the other piece.
        let (low_step, high_step) = if actor == key.0 {
            (actor_step, other_step)
        } else {
            (other_step, actor_step)
        };
        edge.trust_low_high = shift(edge.trust_low_high, low_step);
        edge.trust_high_low = shift(edge.trust_high_low, high_step);
        if kind == InteractionKind::Sacrifice {
            bound_asymmetry(edge, max_asymmetry);
        }
        edge.cooperation = shift(edge.cooperation, cooperation_step);
        edge.last_interaction_round = Some(round);
        edge.interactions = edge.interactions.saturating_add(1);

        verify_edge(key, edge, max_asymmetry)?;

        let change = RelationshipChange {
            kind,
            low: key.0,
            high: key.1,
            trust_low_high_delta: edge.trust_low_high.saturating_sub(before.trust_low_high),
            trust_high_low_delta: edge.trust_high_low.saturating_sub(before.trust_high_low),
            cooperation_delta: edge.cooperation.saturating_sub(before.cooperation),
            mean_trust: edge.mean_trust(),
            cooperation: edge.cooperation,
        };

        self.history.push_back(*interaction);
        while self.history.len() > self.config.history_capacity {
            self.history.pop_front();
        }

        tracing::debug!(
            kind = ?kind,
            actor = %actor,
            other = %other,
            round,
            mean_trust = %change.mean_trust,
            cooperation = %change.cooperation,
            "relationship updated"
        );
        Ok(change)
    }

    /// Check every edge against its range and asymmetry bound.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvariantViolation`] naming the first bad edge.
    pub fn verify(&self) -> Result<(), AgentError> {
        for (&key, edge) in &self.edges {
            verify_edge(key, edge, self.config.max_asymmetry)?;
        }
        Ok(())
    }
}

/// Base deltas of one interaction kind: the actor's trust in the other,
/// the other's trust in the actor, and cooperation.
fn base_deltas(kind: InteractionKind) -> (Decimal, Decimal, Decimal) {
    match kind {
        InteractionKind::Support => (
            delta_support_trust(),
            delta_support_trust(),
            delta_support_cooperation(),
        ),
        InteractionKind::Cooperation => (
            delta_cooperation_trust(),
            delta_cooperation_trust(),
            delta_cooperation_cooperation(),
        ),
        InteractionKind::Competition => (
            delta_competition_trust(),
            delta_competition_trust(),
            Decimal::ZERO,
        ),
        InteractionKind::Sacrifice => (
            delta_sacrifice_given(),
            delta_sacrifice_received(),
            delta_support_cooperation(),
        ),
        InteractionKind::Trauma => (delta_trauma(), delta_trauma(), delta_trauma()),
    }
}

fn ordered(a: PieceId, b: PieceId) -> (PieceId, PieceId) {
    if a <= b { (a, b) } else { (b, a) }
}

fn shift(value: Decimal, delta: Decimal) -> Decimal {
    value
        .saturating_add(delta)
        .clamp(Decimal::ZERO, Decimal::ONE)
}

/// Pull the larger trust value down until the gap is within `bound`.
fn bound_asymmetry(edge: &mut RelationshipEdge, bound: Decimal) {
    if edge.asymmetry() <= bound {
        return;
    }
    if edge.trust_low_high > edge.trust_high_low {
        edge.trust_low_high = edge.trust_high_low.saturating_add(bound);
    } else {
        edge.trust_high_low = edge.trust_low_high.saturating_add(bound);
    }
}

fn verify_edge(
    key: (PieceId, PieceId),
    edge: &RelationshipEdge,
    max_asymmetry: Decimal,
) -> Result<(), AgentError> {
    let in_range = |v: Decimal| v >= Decimal::ZERO && v <= Decimal::ONE;
    if !in_range(edge.trust_low_high) || !in_range(edge.trust_high_low) || !in_range(edge.cooperation)
    {
        return Err(AgentError::InvariantViolation {
            detail: format!(
                "edge {}-{} out of range: trust {}/{}, cooperation {}",
                key.0, key.1, edge.trust_low_high, edge.trust_high_low, edge.cooperation
            ),
        });
    }
    if edge.asymmetry() > max_asymmetry {
        return Err(AgentError::InvariantViolation {
            detail: format!(
                "edge {}-{} asymmetry {} exceeds {max_asymmetry}",
                key.0,
                key.1,
                edge.asymmetry()
            ),
        });
    }
    Ok(())
}

fn serialize_edges<S: serde::Serializer>(
    edges: &BTreeMap<(PieceId, PieceId), RelationshipEdge>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeSeq;

    #[derive(Serialize)]
    struct Entry<'a> {
        low: PieceId,
        high: PieceId,
        #[serde(flatten)]
        edge: &'a RelationshipEdge,
    }

    let mut seq = serializer.serialize_seq(Some(edges.len()))?;
    for (&(low, high), edge) in edges {
        seq.serialize_element(&Entry { low, high, edge })?;
    }
    seq.end()
}
