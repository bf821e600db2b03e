//! The debating team: identities, agents, relationships, memory and the
//! team's current psychological state, bundled as one value.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use parliament_agents::{
    AgentConfig, AgentError, EmotionalState, EvaluationContext, GameMemory, PersonalityProfile,
    PieceAgent, RelationshipNetwork, Roster, ScoringConfig, TeamMember, recompute,
};
use parliament_board::Position;
use parliament_types::{PieceId, PieceKind, PsychologicalState, Side};

/// Mutable round-scoped state of one side.
///
/// A `Team` is a plain value: snapshots are clones and rollback replaces
/// the whole thing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Piece identities.
    pub roster: Roster,
    /// One agent per identity, captured pieces included.
    pub agents: BTreeMap<PieceId, PieceAgent>,
    /// Relationships between teammates.
    pub network: RelationshipNetwork,
    /// Recorded moments.
    pub memory: GameMemory,
    /// Team psychology as of the last commit.
    pub psychology: PsychologicalState,
}

impl Team {
    /// Set up the team for `side` from a position.
    ///
    /// Profiles are shared per piece kind; emotions start at each kind's
    /// default temperament.
    pub fn new(position: &Position, side: Side, config: &AgentConfig) -> Self {
        let roster = Roster::from_position(position, side);
        let mut profiles: BTreeMap<PieceKind, Arc<PersonalityProfile>> = BTreeMap::new();
        let mut network = RelationshipNetwork::new(config.relationship);
        let mut agents = BTreeMap::new();
        for identity in roster.all() {
            let profile = profiles
                .entry(identity.kind)
                .or_insert_with(|| {
                    Arc::new(PersonalityProfile::for_piece(identity.kind).with_theme(config.theme))
                })
                .clone();
            let emotions = EmotionalState::for_kind(identity.kind);
            agents.insert(identity.id, PieceAgent::new(identity.id, profile, emotions));
            network.register(identity.id);
        }
        let mut team = Self {
            roster,
            agents,
            network,
            memory: GameMemory::new(config.memory),
            psychology: PsychologicalState::default(),
        };
        team.psychology = team.recompute_psychology(0, config);
        team
    }

    /// The side this team plays.
    pub const fn side(&self) -> Side {
        self.roster.side()
    }

    /// Agent for a piece.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownPiece`] if the piece is not on the team.
    pub fn agent(&self, id: PieceId) -> Result<&PieceAgent, AgentError> {
        self.agents.get(&id).ok_or(AgentError::UnknownPiece(id))
    }

    /// Mutable agent for a piece.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownPiece`] if the piece is not on the team.
    pub fn agent_mut(&mut self, id: PieceId) -> Result<&mut PieceAgent, AgentError> {
        self.agents.get_mut(&id).ok_or(AgentError::UnknownPiece(id))
    }

    /// Agents whose pieces are still on the board, in id order.
    pub fn active_agents(&self) -> impl Iterator<Item = &PieceAgent> {
        self.roster
            .active()
            .filter_map(|identity| self.agents.get(&identity.id))
    }

    /// Read-only context for scoring moves in `round`.
    pub const fn context<'a>(&'a self, round: u32, config: &'a ScoringConfig) -> EvaluationContext<'a> {
        EvaluationContext {
            round,
            roster: &self.roster,
            network: &self.network,
            memory: &self.memory,
            config,
        }
    }

    /// Team psychology computed from the current state, without storing it.
    pub fn recompute_psychology(&self, round: u32, config: &AgentConfig) -> PsychologicalState {
        let members: Vec<TeamMember<'_>> = self
            .roster
            .active()
            .filter_map(|identity| {
                self.agents.get(&identity.id).map(|agent| TeamMember {
                    id: identity.id,
                    kind: identity.kind,
                    state: agent.emotions(),
                })
            })
            .collect();
        recompute(&members, &self.network, round, &config.psychology)
    }

    /// Check every team-level invariant.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvariantViolation`] for the first violation
    /// found in emotions, relationships or identities.
    pub fn verify(&self, position: &Position) -> Result<(), AgentError> {
        for agent in self.agents.values() {
            agent.emotions().verify()?;
        }
        self.network.verify()?;
        self.roster.verify_against(position)
    }

    /// Serializable view of the whole team, for state dumps.
    pub fn dump(&self) -> TeamDump<'_> {
        TeamDump {
            side: self.side(),
            roster: &self.roster,
            agents: self
                .agents
                .values()
                .map(|agent| AgentDump {
                    id: agent.id(),
                    name: &agent.profile().name,
                    emotions: agent.emotions(),
                })
                .collect(),
            network: &self.network,
            memory: &self.memory,
            psychology: self.psychology,
        }
    }
}

/// Serializable view of a [`Team`].
#[derive(Debug, Serialize)]
pub struct TeamDump<'a> {
    /// Side played.
    pub side: Side,
    /// Identities.
    pub roster: &'a Roster,
    /// Emotional state of every agent.
    pub agents: Vec<AgentDump<'a>>,
    /// Relationships.
    pub network: &'a RelationshipNetwork,
    /// Memory.
    pub memory: &'a GameMemory,
    /// Psychology.
    pub psychology: PsychologicalState,
}

/// One agent in a [`TeamDump`].
#[derive(Debug, Serialize)]
pub struct AgentDump<'a> {
    /// Piece id.
    pub id: PieceId,
    /// Personality name.
    pub name: &'a str,
    /// Current emotions.
    pub emotions: &'a EmotionalState,
}
