//! Rules collaborator and tactical analyzer for the Parliament debate engine.
//!
//! Legality comes from the `chess` crate behind the [`RulesEngine`] trait;
//! the rest of the workspace only sees [`Position`] and the plain
//! [`Move`](parliament_types::Move) values from `parliament-types`.
//!
//! # Modules
//!
//! - [`error`] -- Error types ([`BoardError`])
//! - [`position`] -- Immutable position wrapper with move history
//! - [`rules`] -- [`RulesEngine`] trait and the [`StandardRules`] adapter
//! - [`tactics`] -- Tactical analyzer producing a
//!   [`TacticalSummary`](parliament_types::TacticalSummary)

mod attacks;
mod convert;
pub mod error;
pub mod position;
pub mod rules;
pub mod tactics;

pub use error::BoardError;
pub use position::Position;
pub use rules::{Applied, RulesEngine, StandardRules, is_castling};
pub use tactics::{TacticalWeights, analyze, defenders_of, en_prise};
