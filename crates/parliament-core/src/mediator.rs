//! Interaction mediator: fans a committed moment out to the relationship
//! network, the registered observers, the emotional states and the game
//! memory, always in that order.
//!
//! Observers see the network after it has been updated for the moment, and
//! each observer sees each moment exactly once, in registration order.

use std::collections::BTreeMap;

use tracing::debug;

use parliament_agents::EmotionConfig;
use parliament_types::{EmotionalDelta, EmotionalImpulse, MemoryEntry, Moment, PieceId, RelationshipChange};

use crate::error::CoreError;
use crate::team::Team;

/// Failure reported by an observer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ObserverError {
    /// What went wrong.
    pub message: String,
}

impl ObserverError {
    /// Create an error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Receives committed moments and answers with emotional impulses.
pub trait MomentObserver: Send {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// React to a moment. `team` already reflects the moment's
    /// relationship updates but not yet its impulses.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError`] to abort the commit; the moderator then
    /// rolls the round back.
    fn observe(&mut self, moment: &Moment, team: &Team) -> Result<Vec<EmotionalImpulse>, ObserverError>;
}

/// Everything one [`InteractionMediator::notify`] call changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediationOutcome {
    /// One change per interaction, in moment order.
    pub relationship_changes: Vec<RelationshipChange>,
    /// Impulses returned by observers, in dispatch order.
    pub impulses: Vec<EmotionalImpulse>,
    /// Net emotional change per piece, decay included.
    pub emotional_deltas: BTreeMap<PieceId, EmotionalDelta>,
    /// The memory entry recorded for the moment.
    pub memory_entry: MemoryEntry,
}

/// Ordered registry of observers plus the fixed dispatch sequence.
#[derive(Default)]
pub struct InteractionMediator {
    observers: Vec<Box<dyn MomentObserver>>,
}

impl core::fmt::Debug for InteractionMediator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names: Vec<&str> = self.observers.iter().map(|o| o.name()).collect();
        f.debug_struct("InteractionMediator")
            .field("observers", &names)
            .finish()
    }
}

impl InteractionMediator {
    /// Create a mediator with no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observer; it is dispatched after every earlier one.
    pub fn register_observer(&mut self, observer: Box<dyn MomentObserver>) {
        debug!(observer = observer.name(), "observer registered");
        self.observers.push(observer);
    }

    /// Names of the registered observers, in dispatch order.
    pub fn observer_names(&self) -> Vec<&str> {
        self.observers.iter().map(|o| o.name()).collect()
    }

    /// Dispatch one committed moment.
    ///
    /// 1. Decay every active teammate's emotions toward the baseline
    /// 2. Record every interaction in the relationship network
    /// 3. Call each observer once, in registration order
    /// 4. Apply the returned impulses
    /// 5. Record the moment in game memory
    ///
    /// On error the team is left partially updated; the caller restores
    /// its snapshot.
    pub fn notify(
        &mut self,
        moment: &Moment,
        team: &mut Team,
        emotion: &EmotionConfig,
    ) -> Result<MediationOutcome, CoreError> {
        let mut deltas: BTreeMap<PieceId, EmotionalDelta> = BTreeMap::new();

        let active: Vec<PieceId> = team.roster.active().map(|identity| identity.id).collect();
        for id in active {
            let delta = team.agent_mut(id)?.decay(emotion)?;
            accumulate(&mut deltas, id, delta)?;
        }

        let mut relationship_changes = Vec::with_capacity(moment.interactions.len());
        for interaction in &moment.interactions {
            relationship_changes.push(team.network.record_interaction(interaction)?);
        }

        let mut impulses = Vec::new();
        for observer in &mut self.observers {
            let produced = observer
                .observe(moment, team)
                .map_err(|e| CoreError::Observer {
                    observer: observer.name().to_owned(),
                    message: e.message,
                })?;
            debug!(
                observer = observer.name(),
                round = moment.round,
                impulses = produced.len(),
                "moment observed"
            );
            impulses.extend(produced);
        }

        for impulse in &impulses {
            let delta = team
                .agent_mut(impulse.target)?
                .apply_impulse(impulse.kind, impulse.magnitude)?;
            accumulate(&mut deltas, impulse.target, delta)?;
        }

        let memory_entry = team.memory.record(moment, &impulses);

        Ok(MediationOutcome {
            relationship_changes,
            impulses,
            emotional_deltas: deltas,
            memory_entry,
        })
    }
}

fn accumulate(
    deltas: &mut BTreeMap<PieceId, EmotionalDelta>,
    id: PieceId,
    delta: EmotionalDelta,
) -> Result<(), CoreError> {
    let entry = deltas.entry(id).or_default();
    *entry = entry
        .checked_add(delta)
        .ok_or_else(|| parliament_agents::AgentError::ArithmeticOverflow {
            context: format!("emotional delta of {id}"),
        })?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use parliament_agents::AgentConfig;
    use parliament_board::Position;
    use parliament_types::{ImpulseKind, Interaction, InteractionKind, MomentKind, PieceKind, Side, TacticalSummary};
    use rust_decimal::Decimal;

    use super::*;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        target: PieceId,
    }

    impl MomentObserver for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn observe(&mut self, moment: &Moment, team: &Team) -> Result<Vec<EmotionalImpulse>, ObserverError> {
            let trust = team.network.trust(PieceId(6), PieceId(1));
            self.log.lock().unwrap().push(format!("{}:{}:{trust}", self.name, moment.round));
            Ok(vec![EmotionalImpulse {
                target: self.target,
                kind: ImpulseKind::Praised,
                magnitude: Decimal::ONE,
            }])
        }
    }

    struct Refuser;

    impl MomentObserver for Refuser {
        fn name(&self) -> &str {
            "refuser"
        }

        fn observe(&mut self, _moment: &Moment, _team: &Team) -> Result<Vec<EmotionalImpulse>, ObserverError> {
            Err(ObserverError::new("not today"))
        }
    }

    fn supported_moment() -> Moment {
        Moment {
            round: 3,
            side: Side::White,
            kind: MomentKind::Quiet,
            mv: "b1c3".parse().unwrap(),
            mover: Some(PieceId(1)),
            tactics: TacticalSummary {
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
            },
            interactions: vec![Interaction {
                kind: InteractionKind::Support,
                actor: PieceId(6),
                other: PieceId(1),
                magnitude: Decimal::ONE,
                round: 3,
            }],
            debate: None,
            captured: None,
            threatened: Vec::new(),
            rescued: Vec::new(),
        }
    }

    fn team() -> Team {
        Team::new(&Position::start(), Side::White, &AgentConfig::default())
    }

    fn recorder(name: &'static str, log: &Arc<Mutex<Vec<String>>>, target: PieceId) -> Box<dyn MomentObserver> {
        Box::new(Recorder {
            name,
            log: Arc::clone(log),
            target,
        })
    }

    #[test]
    fn observers_run_once_in_registration_order_after_the_network() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut mediator = InteractionMediator::new();
        mediator.register_observer(recorder("first", &log, PieceId(1)));
        mediator.register_observer(recorder("second", &log, PieceId(1)));
        assert_eq!(mediator.observer_names(), vec!["first", "second"]);

        let mut team = team();
        let neutral = team.network.trust(PieceId(6), PieceId(1));
        let outcome = mediator
            .notify(&supported_moment(), &mut team, &AgentConfig::default().emotion)
            .unwrap();

        let seen = log.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);
        assert!(seen.first().unwrap().starts_with("first:3:"));
        assert!(seen.get(1).unwrap().starts_with("second:3:"));
        let observed_trust: Decimal = seen.first().unwrap().rsplit(':').next().unwrap().parse().unwrap();
        assert!(observed_trust > neutral);

        assert_eq!(outcome.relationship_changes.len(), 1);
        assert_eq!(outcome.impulses.len(), 2);
        assert!(outcome.emotional_deltas.contains_key(&PieceId(1)));
        assert_eq!(team.memory.entries().len(), 1);
        assert_eq!(outcome.memory_entry.round, 3);
    }

    #[test]
    fn failing_observer_names_itself() {
        let mut mediator = InteractionMediator::new();
        mediator.register_observer(Box::new(Refuser));
        let mut team = team();
        let err = mediator
            .notify(&supported_moment(), &mut team, &AgentConfig::default().emotion)
            .unwrap_err();
        assert!(matches!(err, CoreError::Observer { ref observer, .. } if observer == "refuser"));
    }

    #[test]
    fn impulse_for_unknown_piece_is_rejected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut mediator = InteractionMediator::new();
        mediator.register_observer(recorder("stray", &log, PieceId(99)));
        let mut team = team();
        assert!(
            mediator
                .notify(&supported_moment(), &mut team, &AgentConfig::default().emotion)
                .is_err()
        );
        assert!(team.memory.entries().is_empty());
    }
}
