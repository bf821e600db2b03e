//! Shared type definitions for the Parliament debate engine.
//!
//! This crate is the single source of truth for the data that flows between
//! the tactical analyzer, the piece agents, the interaction mediator and the
//! debate moderator. It deliberately knows nothing about any rules engine:
//! squares and moves are plain values here.
//!
//! # Modules
//!
//! - [`ids`] -- Piece and game identifiers
//! - [`enums`] -- Closed enumerations (sides, piece kinds, personalities, impulses)
//! - [`squares`] -- Board coordinates and UCI moves
//! - [`structs`] -- Proposals, interactions, moments, memory and psychology values

pub mod enums;
pub mod ids;
pub mod squares;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    GameOutcome, ImpulseKind, InteractionKind, MomentKind, PersonalityKind, PieceKind,
    ScoringFactor, Side,
};
pub use ids::{GameId, PieceId};
pub use squares::{Move, NotationError, Square};
pub use structs::{
    ArgumentTag, DebateOutcome, EmotionalDelta, EmotionalImpulse, FactorBreakdown,
    ImpactPreview, Interaction, MemoryEntry, Moment, PieceIdentity, Proposal,
    PsychologicalState, RelationshipChange, TacticalSummary,
};
