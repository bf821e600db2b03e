//! Built-in moment observers.
//!
//! - [`PieceObserver`] -- reactions of the pieces directly involved
//! - [`TeamObserver`] -- reactions to how the debate went
//! - [`TracingObserver`] -- logs every moment, changes nothing

use rust_decimal::Decimal;
use tracing::info;

use parliament_types::{EmotionalImpulse, ImpulseKind, InteractionKind, Moment, PieceId};

use crate::mediator::{MomentObserver, ObserverError};
use crate::team::Team;

/// Material value of the heaviest non-royal piece, used to scale
/// material-driven impulses.
const QUEEN_VALUE: u32 = 9;

fn impulse(target: PieceId, kind: ImpulseKind, magnitude: Decimal) -> EmotionalImpulse {
    EmotionalImpulse {
        target,
        kind,
        magnitude: magnitude.clamp(Decimal::ZERO, Decimal::ONE),
    }
}

/// `value / 9`, capped at 1.
pub(crate) fn unit_scale(value: u32) -> Decimal {
    Decimal::from(value)
        .checked_div(Decimal::from(QUEEN_VALUE))
        .unwrap_or(Decimal::ONE)
        .min(Decimal::ONE)
        .round_dp(4)
}

// ---------------------------------------------------------------------------
// PieceObserver
// ---------------------------------------------------------------------------

/// Emotional reactions of the pieces a moment touches.
///
/// - the mover: triumph on captures, forks and promotion; threatened when
///   it left itself en prise; sacrificed when it did so to save an ally;
///   retreated on a backward move
/// - rescued allies: rescued
/// - supported pieces: supported, scaled by their trust in the supporter
/// - both sides of a trauma: betrayed
/// - on an opponent capture: loss for every active teammate
/// - newly attacked teammates: threatened
#[derive(Debug, Clone, Copy, Default)]
pub struct PieceObserver;

impl MomentObserver for PieceObserver {
    fn name(&self) -> &str {
        "piece"
    }

    fn observe(&mut self, moment: &Moment, team: &Team) -> Result<Vec<EmotionalImpulse>, ObserverError> {
        let mut out = Vec::new();
        let tactics = &moment.tactics;

        if let Some(mover) = moment.mover {
            if tactics.captured.is_some() {
                let magnitude = unit_scale(tactics.captured_value).max(Decimal::new(3, 1));
                out.push(impulse(mover, ImpulseKind::Triumph, magnitude));
            }
            if tactics.is_fork() {
                out.push(impulse(mover, ImpulseKind::Triumph, Decimal::new(6, 1)));
            }
            if tactics.promotion.is_some() {
                out.push(impulse(mover, ImpulseKind::Triumph, Decimal::ONE));
            }
            if tactics.is_sacrifice() {
                out.push(impulse(mover, ImpulseKind::Sacrificed, Decimal::ONE));
            } else if tactics.exposed {
                out.push(impulse(
                    mover,
                    ImpulseKind::Threatened,
                    unit_scale(tactics.material_risk),
                ));
            }
            if tactics.retreat {
                out.push(impulse(mover, ImpulseKind::Retreated, Decimal::new(5, 1)));
            }
        }

        for &ally in &moment.rescued {
            let magnitude = if tactics.is_sacrifice() {
                Decimal::ONE
            } else {
                Decimal::new(6, 1)
            };
            out.push(impulse(ally, ImpulseKind::Rescued, magnitude));
        }

        for interaction in &moment.interactions {
            match interaction.kind {
                InteractionKind::Support => {
                    let trust = team.network.trust(interaction.other, interaction.actor);
                    let magnitude = interaction
                        .magnitude
                        .saturating_mul(trust)
                        .saturating_mul(Decimal::TWO);
                    out.push(impulse(interaction.other, ImpulseKind::Supported, magnitude));
                }
                InteractionKind::Trauma => {
                    out.push(impulse(interaction.actor, ImpulseKind::Betrayed, interaction.magnitude));
                    out.push(impulse(interaction.other, ImpulseKind::Betrayed, interaction.magnitude));
                }
                InteractionKind::Cooperation
                | InteractionKind::Sacrifice
                | InteractionKind::Competition => {}
            }
        }

        if let Some(victim) = moment.captured {
            let kind = team
                .roster
                .identity(victim)
                .map_err(|e| ObserverError::new(e.to_string()))?
                .kind;
            let magnitude = unit_scale(kind.psychological_weight()).max(Decimal::new(2, 1));
            for identity in team.roster.active() {
                out.push(impulse(identity.id, ImpulseKind::Loss, magnitude));
            }
        }

        for &piece in &moment.threatened {
            out.push(impulse(piece, ImpulseKind::Threatened, Decimal::new(5, 1)));
        }

        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// TeamObserver
// ---------------------------------------------------------------------------

/// Reactions to the debate that chose the move: the winner is praised, the
/// other proposers are overruled, and the team either shares a consensus
/// or the overruled proposers dissent.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeamObserver;

impl MomentObserver for TeamObserver {
    fn name(&self) -> &str {
        "team"
    }

    fn observe(&mut self, moment: &Moment, team: &Team) -> Result<Vec<EmotionalImpulse>, ObserverError> {
        let Some(debate) = &moment.debate else {
            return Ok(Vec::new());
        };
        let mut out = vec![impulse(debate.winner, ImpulseKind::Praised, Decimal::ONE)];
        for &piece in &debate.overruled {
            out.push(impulse(piece, ImpulseKind::Overruled, Decimal::new(5, 1)));
        }
        if debate.consensus {
            for identity in team.roster.active() {
                out.push(impulse(identity.id, ImpulseKind::Consensus, Decimal::new(5, 1)));
            }
        } else {
            for &piece in &debate.overruled {
                out.push(impulse(piece, ImpulseKind::Dissent, Decimal::new(5, 1)));
            }
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// TracingObserver
// ---------------------------------------------------------------------------

/// Logs each moment at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl MomentObserver for TracingObserver {
    fn name(&self) -> &str {
        "tracing"
    }

    fn observe(&mut self, moment: &Moment, team: &Team) -> Result<Vec<EmotionalImpulse>, ObserverError> {
        info!(
            round = moment.round,
            side = %moment.side,
            mv = %moment.mv,
            kind = ?moment.kind,
            mover = ?moment.mover,
            captured = ?moment.captured,
            interactions = moment.interactions.len(),
            active = team.roster.active().count(),
            "{}",
            moment.kind.narrative()
        );
        Ok(Vec::new())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parliament_agents::AgentConfig;
    use parliament_board::Position;
    use parliament_types::{
        DebateOutcome, Interaction, MomentKind, PieceKind, Side, TacticalSummary,
    };

    use super::*;

    fn quiet_tactics() -> TacticalSummary {
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

    fn moment() -> Moment {
        Moment {
            round: 0,
            side: Side::White,
            kind: MomentKind::Quiet,
            mv: "b1c3".parse().unwrap(),
            mover: Some(PieceId(1)),
            tactics: quiet_tactics(),
            interactions: Vec::new(),
            debate: None,
            captured: None,
            threatened: Vec::new(),
            rescued: Vec::new(),
        }
    }

    fn team() -> Team {
        Team::new(&Position::start(), Side::White, &AgentConfig::default())
    }

    #[test]
    fn quiet_moment_produces_nothing() {
        let team = team();
        assert!(PieceObserver.observe(&moment(), &team).unwrap().is_empty());
        assert!(TeamObserver.observe(&moment(), &team).unwrap().is_empty());
        assert!(TracingObserver.observe(&moment(), &team).unwrap().is_empty());
    }

    #[test]
    fn support_is_scaled_by_trust() {
        let team = team();
        let mut m = moment();
        m.interactions.push(Interaction {
            kind: InteractionKind::Support,
            actor: PieceId(9),
            other: PieceId(1),
            magnitude: Decimal::new(5, 1),
            round: 0,
        });
        let impulses = PieceObserver.observe(&m, &team).unwrap();
        // 0.5 magnitude * 0.5 neutral trust * 2
        assert_eq!(
            impulses,
            vec![impulse(PieceId(1), ImpulseKind::Supported, Decimal::new(5, 1))]
        );
    }

    #[test]
    fn dissent_goes_to_the_overruled() {
        let team = team();
        let mut m = moment();
        m.debate = Some(DebateOutcome {
            winner: PieceId(1),
            overruled: vec![PieceId(6)],
            consensus: false,
            winning_score: Decimal::ONE,
        });
        let impulses = TeamObserver.observe(&m, &team).unwrap();
        let kinds: Vec<(PieceId, ImpulseKind)> = impulses.iter().map(|i| (i.target, i.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (PieceId(1), ImpulseKind::Praised),
                (PieceId(6), ImpulseKind::Overruled),
                (PieceId(6), ImpulseKind::Dissent),
            ]
        );
    }

    #[test]
    fn consensus_reaches_every_active_piece() {
        let team = team();
        let mut m = moment();
        m.debate = Some(DebateOutcome {
            winner: PieceId(1),
            overruled: Vec::new(),
            consensus: true,
            winning_score: Decimal::ONE,
        });
        let impulses = TeamObserver.observe(&m, &team).unwrap();
        let consensus = impulses
            .iter()
            .filter(|i| i.kind == ImpulseKind::Consensus)
            .count();
        assert_eq!(consensus, 16);
    }
}
