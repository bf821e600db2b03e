//! Piece agents and move evaluation.
//!
//! A [`PieceAgent`] owns its emotional state and shares an immutable
//! [`PersonalityProfile`]. [`PieceAgent::evaluate_move`] turns a candidate
//! move into a scored [`Proposal`]:
//!
//! 1. Validate that the move belongs to this piece, then analyze it
//! 2. Compute raw factors: material, positional, tactical, check, support
//!    and safety
//! 3. Scale each factor by a personality modifier and an emotional modifier
//! 4. Blend the modifiers ([`ModifierBlend`]) and sum the contributions
//! 5. Pick the dominant factor and build the argument
//!
//! Evaluation reads the agent's emotions and never writes them.

use std::sync::Arc;

use rust_decimal::Decimal;

use parliament_board::{Position, analyze, is_castling};
use parliament_types::{
    EmotionalDelta, FactorBreakdown, ImpulseKind, Move, PieceId, PieceIdentity, PieceKind,
    Proposal, ScoringFactor, Side, Square, TacticalSummary,
};

use crate::config::{EmotionConfig, ModifierBlend, ScoringConfig};
use crate::emotion::EmotionalState;
use crate::error::AgentError;
use crate::memory::GameMemory;
use crate::personality::PersonalityProfile;
use crate::relationship::RelationshipNetwork;
use crate::roster::Roster;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Decimal places kept on a proposal score.
const SCORE_DP: u32 = 4;

/// Weight of an ally pulled out of danger in the support factor.
const RESCUE_SHARE: Decimal = Decimal::ONE;

/// Weight of an ally merely defended in the support factor (0.3).
fn defend_share() -> Decimal {
    Decimal::new(3, 1)
}

/// Base of the "one and a half minus x" modifiers (1.5).
fn one_and_half() -> Decimal {
    Decimal::new(15, 1)
}

/// Base of the "one half plus x" modifiers (0.5).
fn half() -> Decimal {
    Decimal::new(5, 1)
}

// ---------------------------------------------------------------------------
// EvaluationContext
// ---------------------------------------------------------------------------

/// Read-only team state an agent consults while scoring.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// Round being debated.
    pub round: u32,
    /// The team's identities.
    pub roster: &'a Roster,
    /// The team's relationships.
    pub network: &'a RelationshipNetwork,
    /// The team's memory.
    pub memory: &'a GameMemory,
    /// Scoring parameters.
    pub config: &'a ScoringConfig,
}

// ---------------------------------------------------------------------------
// PieceAgent
// ---------------------------------------------------------------------------

/// One piece with a personality and an emotional state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceAgent {
    id: PieceId,
    profile: Arc<PersonalityProfile>,
    emotions: EmotionalState,
}

impl PieceAgent {
    /// Create an agent.
    pub const fn new(id: PieceId, profile: Arc<PersonalityProfile>, emotions: EmotionalState) -> Self {
        Self {
            id,
            profile,
            emotions,
        }
    }

    /// The piece this agent speaks for.
    pub const fn id(&self) -> PieceId {
        self.id
    }

    /// The agent's personality.
    pub fn profile(&self) -> &PersonalityProfile {
        &self.profile
    }

    /// The agent's current emotions.
    pub const fn emotions(&self) -> &EmotionalState {
        &self.emotions
    }

    /// Apply an emotional impulse. See [`EmotionalState::apply_impulse`].
    ///
    /// # Errors
    ///
    /// Propagates [`AgentError::InvariantViolation`] from the state.
    pub fn apply_impulse(
        &mut self,
        kind: ImpulseKind,
        magnitude: Decimal,
    ) -> Result<EmotionalDelta, AgentError> {
        self.emotions.apply_impulse(kind, magnitude)
    }

    /// Decay emotions toward the baseline. See [`EmotionalState::decay`].
    ///
    /// # Errors
    ///
    /// Propagates [`AgentError::InvariantViolation`] from the state.
    pub fn decay(&mut self, config: &EmotionConfig) -> Result<EmotionalDelta, AgentError> {
        self.emotions.decay(config)
    }

    /// Score a candidate move.
    ///
    /// # Errors
    ///
    /// - [`AgentError::InvalidMove`] if the piece is captured, stands
    ///   elsewhere, it is not its side's turn, or the move is illegal
    /// - [`AgentError::UnknownPiece`] if the roster does not know the piece
    /// - [`AgentError::ArithmeticOverflow`] on score overflow
    pub fn evaluate_move(
        &self,
        position: &Position,
        mv: Move,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Proposal, AgentError> {
        let identity = ctx.roster.identity(self.id)?;
        self.check_ownership(identity, position, mv)?;

        let tactics = analyze(position, mv, &ctx.config.tactics).map_err(|e| {
            AgentError::InvalidMove {
                piece: self.id,
                mv,
                reason: e.to_string(),
            }
        })?;

        let (raw, support_target) = self.raw_factors(identity, position, mv, &tactics, ctx)?;
        let factors = self.blend(&raw, &tactics, ctx.config)?;
        let score = ScoringFactor::ALL
            .iter()
            .try_fold(Decimal::ZERO, |acc, &f| acc.checked_add(factors.get(f)))
            .ok_or_else(|| AgentError::overflow("proposal score"))?
            .round_dp(SCORE_DP);

        let dominant = factors.dominant();
        let recollection =
            ctx.memory
                .recollection(self.id, ctx.round, ctx.config.recollection_window);
        let argument = self.profile.argument(dominant, recollection);

        tracing::trace!(
            piece = %self.id,
            mv = %mv,
            score = %score,
            dominant = ?dominant,
            "move evaluated"
        );

        Ok(Proposal {
            proposer: self.id,
            piece: identity.kind,
            mv,
            score,
            argument,
            tactics,
            factors,
            dominant,
            support_target,
        })
    }

    fn check_ownership(
        &self,
        identity: &PieceIdentity,
        position: &Position,
        mv: Move,
    ) -> Result<(), AgentError> {
        let reject = |reason: String| AgentError::InvalidMove {
            piece: self.id,
            mv,
            reason,
        };
        if identity.captured {
            return Err(reject("the piece has been captured".to_owned()));
        }
        if identity.square != mv.from {
            return Err(reject(format!("the piece stands on {}", identity.square)));
        }
        if position.side_to_move() != identity.side {
            return Err(reject(format!("it is not {}'s turn", identity.side)));
        }
        match position.piece_at(mv.from) {
            Some((side, kind)) if side == identity.side && kind == identity.kind => Ok(()),
            found => Err(reject(format!("the board has {found:?} on {}", mv.from))),
        }
    }

    fn raw_factors(
        &self,
        identity: &PieceIdentity,
        position: &Position,
        mv: Move,
        tactics: &TacticalSummary,
        ctx: &EvaluationContext<'_>,
    ) -> Result<(FactorBreakdown, Option<PieceId>), AgentError> {
        let weights = &ctx.config.tactics;
        let mul = |a: Decimal, b: Decimal| {
            a.checked_mul(b)
                .ok_or_else(|| AgentError::overflow("raw factor"))
        };

        let material = mul(Decimal::from(tactics.material_gain()), weights.material)?;

        let positional = mul(Decimal::from(tactics.control_delta), weights.control)?
            .checked_add(piece_flavor(identity.kind, identity.side, position, mv))
            .ok_or_else(|| AgentError::overflow("positional factor"))?;

        let mut tactical = Decimal::ZERO;
        for (hit, weight) in [
            (tactics.is_fork(), weights.fork),
            (tactics.pin_created, weights.pin_created),
            (tactics.pin_exploited, weights.pin_exploited),
            (tactics.discovered_attack, weights.discovered),
        ] {
            if hit {
                tactical = tactical
                    .checked_add(weight)
                    .ok_or_else(|| AgentError::overflow("tactical factor"))?;
            }
        }

        let check = if tactics.gives_check {
            weights.check
        } else {
            Decimal::ZERO
        };

        let (support, support_target) = self.best_support(tactics, ctx)?;

        let risk = mul(Decimal::from(tactics.material_risk), weights.exposure)?;
        let relief = if tactics.escaped_threat {
            mul(Decimal::from(tactics.mover.material_value()), weights.escape)?
        } else {
            Decimal::ZERO
        };
        let safety = relief
            .checked_sub(risk)
            .ok_or_else(|| AgentError::overflow("safety factor"))?;

        Ok((
            FactorBreakdown {
                material,
                positional,
                tactical,
                check,
                support,
                safety,
            },
            support_target,
        ))
    }

    /// Best support bonus toward an ally the move rescues or defends.
    fn best_support(
        &self,
        tactics: &TacticalSummary,
        ctx: &EvaluationContext<'_>,
    ) -> Result<(Decimal, Option<PieceId>), AgentError> {
        let rescued = tactics.rescues.iter().map(|&sq| (sq, RESCUE_SHARE));
        let defended = tactics.defends.iter().map(|&sq| (sq, defend_share()));
        let mut best: (Decimal, Option<PieceId>) = (Decimal::ZERO, None);
        for (square, share) in rescued.chain(defended) {
            let Some(ally) = ally_on(ctx.roster, square, self.id) else {
                continue;
            };
            let bonus = ctx
                .network
                .get_support_bonus(self.id, ally)
                .checked_mul(share)
                .ok_or_else(|| AgentError::overflow("support factor"))?;
            if bonus > best.0 {
                best = (bonus, Some(ally));
            }
        }
        Ok(best)
    }

    /// Apply personality and emotional modifiers to every raw factor.
    fn blend(
        &self,
        raw: &FactorBreakdown,
        tactics: &TacticalSummary,
        config: &ScoringConfig,
    ) -> Result<FactorBreakdown, AgentError> {
        let mut out = FactorBreakdown::default();
        for factor in ScoringFactor::ALL {
            let p = self.personality_modifier(factor)?;
            let e = self.emotional_modifier(factor, tactics, config)?;
            let modifier = match config.blend {
                ModifierBlend::Product => p.checked_mul(e),
                ModifierBlend::Weighted { personality_share } => {
                    let share = personality_share.clamp(Decimal::ZERO, Decimal::ONE);
                    let rest = Decimal::ONE.saturating_sub(share);
                    share
                        .checked_mul(p)
                        .zip(rest.checked_mul(e))
                        .and_then(|(a, b)| a.checked_add(b))
                }
            }
            .ok_or_else(|| AgentError::overflow("modifier blend"))?;
            *out.get_mut(factor) = raw
                .get(factor)
                .checked_mul(modifier)
                .ok_or_else(|| AgentError::overflow("factor contribution"))?
                .round_dp(SCORE_DP);
        }
        Ok(out)
    }

    fn personality_modifier(&self, factor: ScoringFactor) -> Result<Decimal, AgentError> {
        let p = &*self.profile;
        let modifier = match factor {
            ScoringFactor::Material => Some(p.tactical_weight),
            ScoringFactor::Positional => Some(p.positional_weight),
            ScoringFactor::Tactical | ScoringFactor::Check => half()
                .checked_add(p.aggression)
                .and_then(|a| a.checked_mul(p.tactical_weight)),
            ScoringFactor::Support => half().checked_add(p.loyalty),
            ScoringFactor::Safety => one_and_half().checked_sub(p.risk_tolerance),
        };
        modifier.ok_or_else(|| AgentError::overflow("personality modifier"))
    }

    fn emotional_modifier(
        &self,
        factor: ScoringFactor,
        tactics: &TacticalSummary,
        config: &ScoringConfig,
    ) -> Result<Decimal, AgentError> {
        let e = &self.emotions;
        let modifier = match factor {
            ScoringFactor::Material => one_and_half().checked_sub(e.morale()),
            ScoringFactor::Positional => half().checked_add(e.morale()),
            ScoringFactor::Tactical | ScoringFactor::Check => half().checked_add(e.aggression()),
            ScoringFactor::Support => half().checked_add(e.trust()),
            ScoringFactor::Safety => {
                let base = one_and_half().checked_sub(e.risk_modifier());
                if e.confidence() < config.timid_confidence && tactics.material_risk > 0 {
                    base.and_then(|b| b.checked_mul(Decimal::TWO))
                } else {
                    base
                }
            }
        };
        modifier.ok_or_else(|| AgentError::overflow("emotional modifier"))
    }
}

/// Active teammate other than `me` standing on `square`.
fn ally_on(roster: &Roster, square: Square, me: PieceId) -> Option<PieceId> {
    roster
        .at(square)
        .map(|identity| identity.id)
        .filter(|&id| id != me)
}

/// Rank counted from the side's own back rank.
const fn relative_rank(side: Side, square: Square) -> u8 {
    match side {
        Side::White => square.rank(),
        Side::Black => 7_u8.saturating_sub(square.rank()),
    }
}

/// Piece-specific positional preferences, in pawns.
fn piece_flavor(kind: PieceKind, side: Side, position: &Position, mv: Move) -> Decimal {
    let to = mv.to;
    match kind {
        PieceKind::Pawn => {
            let advance = relative_rank(side, to).saturating_sub(relative_rank(side, mv.from));
            let mut flavor = Decimal::new(i64::from(advance), 1);
            if relative_rank(side, to) >= 5 {
                flavor = flavor.saturating_add(Decimal::new(3, 1));
            }
            flavor
        }
        PieceKind::Knight => {
            if to.center_distance() <= 1 {
                Decimal::new(3, 1)
            } else if to.file() == 0 || to.file() == 7 {
                Decimal::new(-2, 1)
            } else {
                Decimal::ZERO
            }
        }
        PieceKind::Bishop => {
            let file = to.file();
            let rank = to.rank();
            if file == rank || file.saturating_add(rank) == 7 {
                Decimal::new(2, 1)
            } else {
                Decimal::ZERO
            }
        }
        PieceKind::Rook => {
            let mut flavor = Decimal::ZERO;
            if position.pawns_on_file(to.file()) == 0 {
                flavor = flavor.saturating_add(Decimal::new(3, 1));
            }
            if relative_rank(side, to) == 6 {
                flavor = flavor.saturating_add(Decimal::new(2, 1));
            }
            flavor
        }
        PieceKind::Queen => {
            if to.center_distance() <= 1 {
                Decimal::new(2, 1)
            } else {
                Decimal::ZERO
            }
        }
        PieceKind::King => {
            if is_castling(kind, mv) {
                Decimal::new(5, 1)
            } else {
                Decimal::new(-2, 1)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{MemoryConfig, RelationshipConfig};

    struct Fixture {
        position: Position,
        roster: Roster,
        network: RelationshipNetwork,
        memory: GameMemory,
        config: ScoringConfig,
    }

    impl Fixture {
        fn new(fen: &str) -> Self {
            let position = Position::from_fen(fen).unwrap();
            let roster = Roster::from_position(&position, position.side_to_move());
            let mut network = RelationshipNetwork::new(RelationshipConfig::default());
            for identity in roster.all() {
                network.register(identity.id);
            }
            Self {
                position,
                roster,
                network,
                memory: GameMemory::new(MemoryConfig::default()),
                config: ScoringConfig::default(),
            }
        }

        fn ctx(&self) -> EvaluationContext<'_> {
            EvaluationContext {
                round: 0,
                roster: &self.roster,
                network: &self.network,
                memory: &self.memory,
                config: &self.config,
            }
        }

        fn agent_on(&self, square: &str, emotions: EmotionalState) -> PieceAgent {
            let identity = self.roster.at(square.parse().unwrap()).unwrap();
            let profile = Arc::new(PersonalityProfile::for_piece(identity.kind));
            PieceAgent::new(identity.id, profile, emotions)
        }

        fn evaluate(&self, agent: &PieceAgent, uci: &str) -> Result<Proposal, AgentError> {
            agent.evaluate_move(&self.position, uci.parse().unwrap(), &self.ctx())
        }
    }

    fn state(confidence: i64, morale: i64) -> EmotionalState {
        EmotionalState::new(
            Decimal::new(confidence, 1),
            Decimal::new(morale, 1),
            Decimal::new(5, 1),
            Decimal::new(5, 1),
        )
        .unwrap()
    }

    #[test]
    fn evaluation_is_pure_and_deterministic() {
        let fixture = Fixture::new("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        let knight = fixture.agent_on("b1", EmotionalState::for_kind(PieceKind::Knight));
        let before = *knight.emotions();
        let first = fixture.evaluate(&knight, "b1c3").unwrap();
        let second = fixture.evaluate(&knight, "b1c3").unwrap();
        assert_eq!(first, second);
        assert_eq!(*knight.emotions(), before);
        assert_eq!(first.piece, PieceKind::Knight);
        assert_eq!(first.dominant, ScoringFactor::Positional);
        assert!(first.score > Decimal::ZERO);
    }

    #[test]
    fn capture_is_argued_on_material() {
        let fixture = Fixture::new("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        let pawn = fixture.agent_on("e4", EmotionalState::neutral());
        let proposal = fixture.evaluate(&pawn, "e4d5").unwrap();
        // 1 pawn * tactical weight 1.1 * (1.5 - 0.5)
        assert_eq!(proposal.factors.material, Decimal::new(11, 1));
        assert_eq!(proposal.dominant, ScoringFactor::Material);
        assert_eq!(proposal.argument.phrase, "Power to the pawns!");
    }

    #[test]
    fn foreign_and_illegal_moves_are_rejected() {
        let fixture = Fixture::new("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        let knight = fixture.agent_on("b1", EmotionalState::neutral());
        let err = fixture.evaluate(&knight, "g1f3").unwrap_err();
        assert!(matches!(err, AgentError::InvalidMove { .. }));
        let err = fixture.evaluate(&knight, "b1b3").unwrap_err();
        assert!(matches!(err, AgentError::InvalidMove { .. }));
    }

    #[test]
    fn timid_piece_fears_exposure_more() {
        let fixture = Fixture::new("7k/8/8/3p4/8/8/8/4Q2K w - - 0 1");
        let bold = fixture.agent_on("e1", state(9, 5));
        let timid = fixture.agent_on("e1", state(1, 5));
        let bold_safety = fixture.evaluate(&bold, "e1e4").unwrap().factors.safety;
        let timid_safety = fixture.evaluate(&timid, "e1e4").unwrap().factors.safety;
        assert!(bold_safety < Decimal::ZERO);
        assert!(timid_safety < bold_safety);
    }

    #[test]
    fn rescue_names_support_target() {
        let fixture = Fixture::new("3rk3/8/8/8/3B4/8/8/R3K3 w - - 0 1");
        let rook = fixture.agent_on("a1", EmotionalState::neutral());
        let bishop = fixture.roster.at("d4".parse().unwrap()).unwrap().id;
        let proposal = fixture.evaluate(&rook, "a1d1").unwrap();
        assert_eq!(proposal.support_target, Some(bishop));
        assert!(proposal.factors.support > Decimal::ZERO);
    }

    #[test]
    fn weighted_blend_with_full_share_ignores_emotion() {
        let mut fixture = Fixture::new("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        fixture.config.blend = ModifierBlend::Weighted {
            personality_share: Decimal::ONE,
        };
        let calm = fixture.agent_on("e4", state(5, 1));
        let elated = fixture.agent_on("e4", state(5, 9));
        let a = fixture.evaluate(&calm, "e4d5").unwrap();
        let b = fixture.evaluate(&elated, "e4d5").unwrap();
        assert_eq!(a.score, b.score);
        assert_eq!(a.factors.material, Decimal::new(11, 1));
    }
}
