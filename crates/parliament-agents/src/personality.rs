//! Personality profiles and argument vocabulary.
//!
//! A profile is immutable once built and shared behind an `Arc` for the
//! piece's lifetime. Each [`PersonalityKind`] maps to one row of trait
//! weights and one row of argument phrases; a [`Theme`] may scale the
//! weights for the whole team at setup.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use parliament_types::{ArgumentTag, MomentKind, PersonalityKind, PieceKind, ScoringFactor};

/// Team-wide adjustment applied to every profile at setup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// Profiles as tabulated.
    #[default]
    Classic,
    /// Tactical weight x1.2, risk tolerance x1.3 (capped at 1).
    Aggressive,
    /// Positional weight x1.2, risk tolerance x0.7 (floored at 0.1).
    Defensive,
    /// Tactical and positional weight x1.1.
    Creative,
}

/// Immutable trait weights of one piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalityProfile {
    /// Personality kind.
    pub kind: PersonalityKind,
    /// Name the piece goes by in debates.
    pub name: String,
    /// Multiplier on material and tactical factors.
    pub tactical_weight: Decimal,
    /// Multiplier on positional factors.
    pub positional_weight: Decimal,
    /// Softens the safety penalty, in `[0, 1]`.
    pub risk_tolerance: Decimal,
    /// Amplifies attacking factors, in `[0, 1]`.
    pub aggression: Decimal,
    /// Amplifies support for allies, in `[0, 1]`.
    pub loyalty: Decimal,
}

impl PersonalityProfile {
    /// The tabulated profile for a piece kind.
    pub fn for_piece(piece: PieceKind) -> Self {
        let (name, tactical, positional, risk, aggression, loyalty) = match piece {
            PieceKind::Knight => ("Sir Galahop", 12, 8, 7, 7, 6),
            PieceKind::Bishop => ("Longview", 9, 13, 4, 4, 5),
            PieceKind::Rook => ("Steadfast", 10, 11, 3, 3, 9),
            PieceKind::Queen => ("Dynamica", 13, 7, 8, 8, 4),
            PieceKind::King => ("Prudence", 8, 12, 2, 2, 7),
            PieceKind::Pawn => ("Pioneer", 11, 10, 6, 6, 8),
        };
        Self {
            kind: piece.personality(),
            name: name.to_owned(),
            tactical_weight: Decimal::new(tactical, 1),
            positional_weight: Decimal::new(positional, 1),
            risk_tolerance: Decimal::new(risk, 1),
            aggression: Decimal::new(aggression, 1),
            loyalty: Decimal::new(loyalty, 1),
        }
    }

    /// This profile with a theme applied.
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        let scale = |value: Decimal, tenths: i64| {
            value
                .checked_mul(Decimal::new(tenths, 1))
                .unwrap_or(value)
        };
        match theme {
            Theme::Classic => {}
            Theme::Aggressive => {
                self.tactical_weight = scale(self.tactical_weight, 12);
                self.risk_tolerance = scale(self.risk_tolerance, 13).min(Decimal::ONE);
            }
            Theme::Defensive => {
                self.positional_weight = scale(self.positional_weight, 12);
                self.risk_tolerance = scale(self.risk_tolerance, 7).max(Decimal::new(1, 1));
            }
            Theme::Creative => {
                self.tactical_weight = scale(self.tactical_weight, 11);
                self.positional_weight = scale(self.positional_weight, 11);
            }
        }
        self
    }

    /// Build the argument tag for a proposal dominated by `factor`,
    /// optionally invoking a remembered moment.
    pub fn argument(&self, factor: ScoringFactor, recollection: Option<MomentKind>) -> ArgumentTag {
        let base = phrase(self.kind, factor);
        let phrase = match recollection {
            Some(moment) => format!("{base} Remember {}.", moment.narrative()),
            None => base.to_owned(),
        };
        ArgumentTag {
            personality: self.kind,
            factor,
            recollection,
            phrase,
        }
    }
}

/// Fixed argument vocabulary keyed by personality and dominant factor.
pub const fn phrase(kind: PersonalityKind, factor: ScoringFactor) -> &'static str {
    use PersonalityKind as P;
    use ScoringFactor as F;
    match (kind, factor) {
        (P::Quixotic, F::Material) => "A worthy foe falls to my lance!",
        (P::Quixotic, F::Positional) => "From this saddle I can leap anywhere.",
        (P::Quixotic, F::Tactical) => "Two foes at once, as the ballads foretold!",
        (P::Quixotic, F::Check) => "Have at thee, tyrant king!",
        (P::Quixotic, F::Support) => "I ride to my companion's side.",
        (P::Quixotic, F::Safety) => "Even a knight must pick his battles.",

        (P::Zealous, F::Material) => "The unbeliever is removed from the diagonal.",
        (P::Zealous, F::Positional) => "The long diagonal is the one true path.",
        (P::Zealous, F::Tactical) => "The line reveals what was hidden.",
        (P::Zealous, F::Check) => "The king must answer for his sins.",
        (P::Zealous, F::Support) => "I watch over the faithful from afar.",
        (P::Zealous, F::Safety) => "Faith is no excuse for carelessness.",

        (P::Fortress, F::Material) => "Fine, I'll take it. Carefully.",
        (P::Fortress, F::Positional) => "An open file. Finally, some room to breathe.",
        (P::Fortress, F::Tactical) => "The walls close in on them, not us.",
        (P::Fortress, F::Check) => "Straight down the file, no hesitation.",
        (P::Fortress, F::Support) => "Stand behind me. I've got you.",
        (P::Fortress, F::Safety) => "Let's not do anything reckless.",

        (P::Dramatic, F::Material) => "Watch me take what is mine!",
        (P::Dramatic, F::Positional) => "Center stage, where I belong.",
        (P::Dramatic, F::Tactical) => "A double threat, darling. Applause, please.",
        (P::Dramatic, F::Check) => "The king trembles before me!",
        (P::Dramatic, F::Support) => "Even a star needs her chorus.",
        (P::Dramatic, F::Safety) => "I am far too precious to lose.",

        (P::Neurotic, F::Material) => "Is it poisoned? It's probably poisoned.",
        (P::Neurotic, F::Positional) => "I just want to feel safe behind my pawns.",
        (P::Neurotic, F::Tactical) => "If we strike first, maybe they won't strike me.",
        (P::Neurotic, F::Check) => "Their king should feel how I feel.",
        (P::Neurotic, F::Support) => "Please, everyone, stay close to me.",
        (P::Neurotic, F::Safety) => "Danger everywhere. Please, the safe move.",

        (P::Revolutionary, F::Material) => "Power to the pawns!",
        (P::Revolutionary, F::Positional) => "Forward, comrades! The eighth rank awaits.",
        (P::Revolutionary, F::Tactical) => "The humble pawn topples the mighty.",
        (P::Revolutionary, F::Check) => "Even a king must face the people.",
        (P::Revolutionary, F::Support) => "Solidarity! No comrade left behind.",
        (P::Revolutionary, F::Safety) => "A living revolutionary serves the cause.",
    }
}
