//! Tunable parameters for emotions, relationships, scoring, memory and
//! team psychology.
//!
//! Every struct deserializes from the `agents` section of
//! `parliament-config.yaml` with each field optional; missing values fall
//! back to the defaults documented on the field.

use rust_decimal::Decimal;
use serde::Deserialize;

use parliament_board::TacticalWeights;

use crate::personality::Theme;

/// All agent-side configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AgentConfig {
    /// Personality theme applied to every profile.
    #[serde(default)]
    pub theme: Theme,

    /// Emotional decay parameters.
    #[serde(default)]
    pub emotion: EmotionConfig,

    /// Relationship network parameters.
    #[serde(default)]
    pub relationship: RelationshipConfig,

    /// Proposal scoring parameters.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Game memory parameters.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Team psychology parameters.
    #[serde(default)]
    pub psychology: PsychologyConfig,
}

// ---------------------------------------------------------------------------
// Emotion
// ---------------------------------------------------------------------------

/// Parameters for emotional decay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EmotionConfig {
    /// Neutral value every scalar decays toward (default: 0.5).
    #[serde(default = "default_baseline")]
    pub baseline: Decimal,

    /// Fraction of the distance to the baseline removed per round
    /// (default: 0.1).
    #[serde(default = "default_decay_rate")]
    pub decay_rate: Decimal,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            baseline: default_baseline(),
            decay_rate: default_decay_rate(),
        }
    }
}

fn default_baseline() -> Decimal {
    Decimal::new(5, 1)
}

fn default_decay_rate() -> Decimal {
    Decimal::new(1, 1)
}

// ---------------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------------

/// Parameters for the relationship network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RelationshipConfig {
    /// Trust on a freshly created edge (default: 0.5).
    #[serde(default = "default_neutral_trust")]
    pub neutral_trust: Decimal,

    /// Cooperation on a freshly created edge (default: 0.5).
    #[serde(default = "default_neutral_cooperation")]
    pub neutral_cooperation: Decimal,

    /// Largest change a single interaction may make to any edge value
    /// (default: 0.2).
    #[serde(default = "default_max_step")]
    pub max_step: Decimal,

    /// Largest allowed gap between the two directed trust values of an edge
    /// (default: 0.3).
    #[serde(default = "default_max_asymmetry")]
    pub max_asymmetry: Decimal,

    /// Interactions retained in the recent history (default: 64).
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        Self {
            neutral_trust: default_neutral_trust(),
            neutral_cooperation: default_neutral_cooperation(),
            max_step: default_max_step(),
            max_asymmetry: default_max_asymmetry(),
            history_capacity: default_history_capacity(),
        }
    }
}

fn default_neutral_trust() -> Decimal {
    Decimal::new(5, 1)
}

fn default_neutral_cooperation() -> Decimal {
    Decimal::new(5, 1)
}

fn default_max_step() -> Decimal {
    Decimal::new(2, 1)
}

fn default_max_asymmetry() -> Decimal {
    Decimal::new(3, 1)
}

const fn default_history_capacity() -> usize {
    64
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// How personality and emotional modifiers combine into a final score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ModifierBlend {
    /// `factor * personality * emotion`. Both modifiers compound.
    #[default]
    Product,
    /// `factor * (share * personality + (1 - share) * emotion)`.
    Weighted {
        /// Share of the personality modifier, clamped to `[0, 1]`.
        personality_share: Decimal,
    },
}

/// Parameters for proposal scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ScoringConfig {
    /// How modifiers combine.
    #[serde(default)]
    pub blend: ModifierBlend,

    /// Weights for the tactical analyzer.
    #[serde(default)]
    pub tactics: TacticalWeights,

    /// Rounds a piece looks back when recalling a memory for its argument
    /// (default: 6).
    #[serde(default = "default_recollection_window")]
    pub recollection_window: u32,

    /// Below this confidence a piece treats material risk as reckless and
    /// doubles the safety penalty (default: 0.3).
    #[serde(default = "default_timid_confidence")]
    pub timid_confidence: Decimal,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            blend: ModifierBlend::default(),
            tactics: TacticalWeights::default(),
            recollection_window: default_recollection_window(),
            timid_confidence: default_timid_confidence(),
        }
    }
}

const fn default_recollection_window() -> u32 {
    6
}

fn default_timid_confidence() -> Decimal {
    Decimal::new(3, 1)
}

// ---------------------------------------------------------------------------
// Memory and psychology
// ---------------------------------------------------------------------------

/// Parameters for the game memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MemoryConfig {
    /// Entries retained before the oldest is evicted (default: 32).
    #[serde(default = "default_memory_capacity")]
    pub capacity: usize,

    /// Minimum significance for an entry to be recalled in arguments
    /// (default: 0.2).
    #[serde(default = "default_significance_threshold")]
    pub significance_threshold: Decimal,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_memory_capacity(),
            significance_threshold: default_significance_threshold(),
        }
    }
}

const fn default_memory_capacity() -> usize {
    32
}

fn default_significance_threshold() -> Decimal {
    Decimal::new(2, 1)
}

/// Parameters for team psychology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PsychologyConfig {
    /// Rounds of interaction history that count toward coordination
    /// (default: 5).
    #[serde(default = "default_coordination_window")]
    pub coordination_window: u32,
}

impl Default for PsychologyConfig {
    fn default() -> Self {
        Self {
            coordination_window: default_coordination_window(),
        }
    }
}

const fn default_coordination_window() -> u32 {
    5
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documentation() {
        let config = AgentConfig::default();
        assert_eq!(config.emotion.baseline, Decimal::new(5, 1));
        assert_eq!(config.emotion.decay_rate, Decimal::new(1, 1));
        assert_eq!(config.relationship.max_step, Decimal::new(2, 1));
        assert_eq!(config.relationship.history_capacity, 64);
        assert_eq!(config.scoring.blend, ModifierBlend::Product);
        assert_eq!(config.memory.capacity, 32);
        assert_eq!(config.psychology.coordination_window, 5);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AgentConfig = serde_json::from_str(
            r#"{"theme": "aggressive", "scoring": {"blend": {"mode": "weighted", "personality_share": "0.25"}}}"#,
        )
        .unwrap();
        assert_eq!(config.theme, Theme::Aggressive);
        assert_eq!(
            config.scoring.blend,
            ModifierBlend::Weighted {
                personality_share: Decimal::new(25, 2)
            }
        );
        assert_eq!(config.scoring.recollection_window, 6);
        assert_eq!(config.memory, MemoryConfig::default());
    }
}
