//! Per-piece emotional state.
//!
//! Four scalars in `[0, 1]`: confidence, morale, trust and aggression. They
//! change only through [`EmotionalState::apply_impulse`] and
//! [`EmotionalState::decay`], both of which clamp and then verify the
//! bounds. Evaluation reads the state; it never writes it.
//!
//! How the scalars feed scoring:
//! - confidence sets the tolerance for material risk
//! - morale shifts weight between positional and material factors
//! - trust scales the support factor
//! - aggression shifts weight between attacking factors and safety

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use parliament_types::{EmotionalDelta, ImpulseKind, PieceKind};

use crate::config::EmotionConfig;
use crate::error::AgentError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const SCALAR_MIN: Decimal = Decimal::ZERO;
const SCALAR_MAX: Decimal = Decimal::ONE;

/// Decimal places kept on every scalar so repeated updates do not grow
/// unbounded precision.
const SCALAR_DP: u32 = 6;

/// Per-kind deltas at magnitude 1, as (confidence, morale, trust, aggression)
/// in hundredths.
const fn impulse_row(kind: ImpulseKind) -> [i64; 4] {
    match kind {
        ImpulseKind::Triumph => [10, 8, 0, 5],
        ImpulseKind::Loss => [-8, -10, 0, 3],
        ImpulseKind::Threatened => [-5, -3, 0, 4],
        ImpulseKind::Supported => [4, 3, 5, 0],
        ImpulseKind::Rescued => [3, 5, 8, -2],
        ImpulseKind::Sacrificed => [-3, 6, 4, 0],
        ImpulseKind::Retreated => [-5, -2, 0, -3],
        ImpulseKind::Praised => [8, 3, 0, 0],
        ImpulseKind::Overruled => [-3, -1, 0, 0],
        ImpulseKind::Consensus => [0, 10, 5, 0],
        ImpulseKind::Dissent => [0, -2, -5, 2],
        ImpulseKind::Betrayed => [-2, -5, -12, 5],
    }
}

// ---------------------------------------------------------------------------
// EmotionalState
// ---------------------------------------------------------------------------

/// The four bounded emotional scalars of one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionalState {
    confidence: Decimal,
    morale: Decimal,
    trust: Decimal,
    aggression: Decimal,
}

impl EmotionalState {
    /// Build a state from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvariantViolation`] if any value lies outside
    /// `[0, 1]`.
    pub fn new(
        confidence: Decimal,
        morale: Decimal,
        trust: Decimal,
        aggression: Decimal,
    ) -> Result<Self, AgentError> {
        let state = Self {
            confidence,
            morale,
            trust,
            aggression,
        };
        state.verify()?;
        Ok(state)
    }

    /// Every scalar at 0.5.
    pub fn neutral() -> Self {
        let half = Decimal::new(5, 1);
        Self {
            confidence: half,
            morale: half,
            trust: half,
            aggression: half,
        }
    }

    /// Starting temperament of each piece kind.
    pub fn for_kind(kind: PieceKind) -> Self {
        let [confidence, morale, trust, aggression] = match kind {
            PieceKind::Knight => [7, 8, 6, 7],
            PieceKind::Bishop => [6, 7, 4, 5],
            PieceKind::Rook => [3, 5, 7, 2],
            PieceKind::Queen => [8, 6, 4, 7],
            PieceKind::King => [2, 4, 5, 3],
            PieceKind::Pawn => [5, 8, 7, 6],
        };
        Self {
            confidence: Decimal::new(confidence, 1),
            morale: Decimal::new(morale, 1),
            trust: Decimal::new(trust, 1),
            aggression: Decimal::new(aggression, 1),
        }
    }

    /// Confidence in `[0, 1]`.
    pub const fn confidence(&self) -> Decimal {
        self.confidence
    }

    /// Morale in `[0, 1]`.
    pub const fn morale(&self) -> Decimal {
        self.morale
    }

    /// Trust in `[0, 1]`.
    pub const fn trust(&self) -> Decimal {
        self.trust
    }

    /// Aggression in `[0, 1]`.
    pub const fn aggression(&self) -> Decimal {
        self.aggression
    }

    /// Willingness to work with others: `sqrt(trust * morale)`.
    pub fn cooperation_bonus(&self) -> Decimal {
        self.trust
            .checked_mul(self.morale)
            .and_then(|product| product.sqrt())
            .map_or(Decimal::ZERO, |v| v.round_dp(SCALAR_DP))
    }

    /// Appetite for risk: `0.7 * confidence + 0.3 * aggression`.
    pub fn risk_modifier(&self) -> Decimal {
        let confidence_part = self.confidence.checked_mul(Decimal::new(7, 1));
        let aggression_part = self.aggression.checked_mul(Decimal::new(3, 1));
        confidence_part
            .zip(aggression_part)
            .and_then(|(c, a)| c.checked_add(a))
            .map_or(Decimal::ZERO, |v| v.round_dp(SCALAR_DP))
    }

    /// Apply one impulse: scale the kind's delta row by `magnitude`
    /// (clamped to `[0, 1]`), add, clamp, then verify.
    ///
    /// Returns the change actually applied after clamping.
    pub fn apply_impulse(
        &mut self,
        kind: ImpulseKind,
        magnitude: Decimal,
    ) -> Result<EmotionalDelta, AgentError> {
        let magnitude = clamp_unit(magnitude);
        let row = impulse_row(kind);
        let before = *self;

        let scaled = |hundredths: i64| -> Result<Decimal, AgentError> {
            Decimal::new(hundredths, 2)
                .checked_mul(magnitude)
                .ok_or_else(|| AgentError::overflow("impulse scaling"))
        };
        let [dc, dm, dt, da] = row;
        self.confidence = shift(self.confidence, scaled(dc)?)?;
        self.morale = shift(self.morale, scaled(dm)?)?;
        self.trust = shift(self.trust, scaled(dt)?)?;
        self.aggression = shift(self.aggression, scaled(da)?)?;
        self.verify()?;

        before.delta_to(self)
    }

    /// Pull every scalar `decay_rate` of the way toward the baseline.
    ///
    /// Applied once per committed round, before that round's impulses.
    pub fn decay(&mut self, config: &EmotionConfig) -> Result<EmotionalDelta, AgentError> {
        let baseline = clamp_unit(config.baseline);
        let rate = clamp_unit(config.decay_rate);
        let before = *self;

        let toward = |value: Decimal| -> Result<Decimal, AgentError> {
            let step = baseline
                .checked_sub(value)
                .and_then(|gap| gap.checked_mul(rate))
                .ok_or_else(|| AgentError::overflow("emotional decay"))?;
            shift(value, step)
        };
        self.confidence = toward(self.confidence)?;
        self.morale = toward(self.morale)?;
        self.trust = toward(self.trust)?;
        self.aggression = toward(self.aggression)?;
        self.verify()?;

        before.delta_to(self)
    }

    /// Check that every scalar lies within `[0, 1]`.
    pub fn verify(&self) -> Result<(), AgentError> {
        for (name, value) in [
            ("confidence", self.confidence),
            ("morale", self.morale),
            ("trust", self.trust),
            ("aggression", self.aggression),
        ] {
            if value < SCALAR_MIN || value > SCALAR_MAX {
                return Err(AgentError::InvariantViolation {
                    detail: format!("{name} = {value} outside [{SCALAR_MIN}, {SCALAR_MAX}]"),
                });
            }
        }
        Ok(())
    }

    fn delta_to(&self, after: &Self) -> Result<EmotionalDelta, AgentError> {
        let diff = |a: Decimal, b: Decimal| {
            b.checked_sub(a)
                .ok_or_else(|| AgentError::overflow("emotional delta"))
        };
        Ok(EmotionalDelta {
            confidence: diff(self.confidence, after.confidence)?,
            morale: diff(self.morale, after.morale)?,
            trust: diff(self.trust, after.trust)?,
            aggression: diff(self.aggression, after.aggression)?,
        })
    }
}

impl Default for EmotionalState {
    fn default() -> Self {
        Self::neutral()
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn clamp_unit(value: Decimal) -> Decimal {
    value.clamp(SCALAR_MIN, SCALAR_MAX)
}

fn shift(value: Decimal, delta: Decimal) -> Result<Decimal, AgentError> {
    let raw = value
        .checked_add(delta)
        .ok_or_else(|| AgentError::overflow("emotional scalar update"))?;
    Ok(clamp_unit(raw).round_dp(SCALAR_DP))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
