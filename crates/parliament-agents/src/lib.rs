//! Piece agents for the Parliament debate engine.
//!
//! Each piece on the team is an agent with a fixed personality and a
//! changing emotional state. Agents score candidate moves; the team's
//! relationships, memory and collective psychology shape those scores.
//!
//! # Modules
//!
//! - [`agent`] -- [`PieceAgent`] and move evaluation
//! - [`config`] -- Tunable parameters ([`AgentConfig`])
//! - [`emotion`] -- Bounded per-piece [`EmotionalState`]
//! - [`error`] -- Error types ([`AgentError`])
//! - [`memory`] -- Bounded [`GameMemory`] of recorded moments
//! - [`personality`] -- [`PersonalityProfile`] tables and argument phrases
//! - [`psychology`] -- Team-level [`PsychologicalState`](parliament_types::PsychologicalState)
//! - [`relationship`] -- [`RelationshipNetwork`] between teammates
//! - [`roster`] -- Stable piece identities ([`Roster`])

pub mod agent;
pub mod config;
pub mod emotion;
pub mod error;
pub mod memory;
pub mod personality;
pub mod psychology;
pub mod relationship;
pub mod roster;

pub use agent::{EvaluationContext, PieceAgent};
pub use config::{
    AgentConfig, EmotionConfig, MemoryConfig, ModifierBlend, PsychologyConfig, RelationshipConfig,
    ScoringConfig,
};
pub use emotion::EmotionalState;
pub use error::AgentError;
pub use memory::GameMemory;
pub use personality::{PersonalityProfile, Theme, phrase};
pub use psychology::{TeamMember, preview_impact, recompute};
pub use relationship::{RelationshipEdge, RelationshipNetwork};
pub use roster::Roster;
