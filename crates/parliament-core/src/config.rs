//! Configuration loading and typed config structures for a Parliament game.
//!
//! The canonical configuration lives in `parliament-config.yaml` at the
//! project root. Every section and field is optional; missing values take
//! the defaults documented on each field.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;

use parliament_agents::AgentConfig;
use parliament_types::Side;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `parliament-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ParliamentConfig {
    /// Session settings (side, start position, seed, collaborators).
    #[serde(default)]
    pub game: GameConfig,

    /// Debate moderation settings.
    #[serde(default)]
    pub debate: DebateConfig,

    /// Agent, relationship, memory and psychology parameters.
    #[serde(default)]
    pub agents: AgentConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ParliamentConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// Who picks among the ranked proposals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorMode {
    /// A person at the terminal.
    #[default]
    Human,
    /// Always the top-ranked proposal.
    Top,
    /// Rank-weighted random choice.
    Random,
}

/// Who plays the other side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpponentMode {
    /// Moves typed at the terminal in UCI notation.
    Human,
    /// Uniformly random legal moves.
    #[default]
    Random,
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// Side the debating team plays (default: white).
    #[serde(default = "default_team_side")]
    pub team_side: Side,

    /// Starting position in FEN; the standard start when absent.
    #[serde(default)]
    pub start_fen: Option<String>,

    /// Seed for every random collaborator (default: 42).
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Committed moves after which the session stops (default: 200).
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    /// Milliseconds a human selector has before the round counts as an
    /// abstention (default: 60000).
    #[serde(default = "default_selection_timeout_ms")]
    pub selection_timeout_ms: u64,

    /// Who picks the team's move (default: human).
    #[serde(default)]
    pub selector: SelectorMode,

    /// Who plays the other side (default: random).
    #[serde(default)]
    pub opponent: OpponentMode,

    /// File that receives one JSON round report per line, if set.
    #[serde(default)]
    pub report_path: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            team_side: default_team_side(),
            start_fen: None,
            seed: default_seed(),
            max_rounds: default_max_rounds(),
            selection_timeout_ms: default_selection_timeout_ms(),
            selector: SelectorMode::default(),
            opponent: OpponentMode::default(),
            report_path: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Debate
// ---------------------------------------------------------------------------

/// What an abstention does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbstainPolicy {
    /// Commit the top-ranked proposal.
    #[default]
    DefaultToTop,
    /// Collect fresh proposals and offer them again.
    Reoffer,
}

/// Debate moderation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DebateConfig {
    /// Score gap within which the top two proposals count as consensus,
    /// and within which rival proposers compete (default: 0.2).
    #[serde(default = "default_consensus_margin")]
    pub consensus_margin: Decimal,

    /// Behaviour on abstention (default: `default_to_top`).
    #[serde(default)]
    pub abstain_policy: AbstainPolicy,

    /// Invalid selections tolerated per round before giving up
    /// (default: 3).
    #[serde(default = "default_max_selection_attempts")]
    pub max_selection_attempts: u32,

    /// Snapshots retained for rollback (default: 16).
    #[serde(default = "default_snapshot_history")]
    pub snapshot_history: usize,

    /// Proposals each agent may put forward per round (default: 1).
    #[serde(default = "default_max_proposals_per_agent")]
    pub max_proposals_per_agent: usize,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            consensus_margin: default_consensus_margin(),
            abstain_policy: AbstainPolicy::default(),
            max_selection_attempts: default_max_selection_attempts(),
            snapshot_history: default_snapshot_history(),
            max_proposals_per_agent: default_max_proposals_per_agent(),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_team_side() -> Side {
    Side::White
}

const fn default_seed() -> u64 {
    42
}

const fn default_max_rounds() -> u32 {
    200
}

const fn default_selection_timeout_ms() -> u64 {
    60_000
}

fn default_consensus_margin() -> Decimal {
    Decimal::new(2, 1)
}

const fn default_max_selection_attempts() -> u32 {
    3
}

const fn default_snapshot_history() -> usize {
    16
}

const fn default_max_proposals_per_agent() -> usize {
    1
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parliament_agents::{ModifierBlend, Theme};

    #[test]
    fn default_config_is_valid() {
        let config = ParliamentConfig::default();
        assert_eq!(config.game.team_side, Side::White);
        assert_eq!(config.game.seed, 42);
        assert_eq!(config.debate.consensus_margin, Decimal::new(2, 1));
        assert_eq!(config.debate.abstain_policy, AbstainPolicy::DefaultToTop);
        assert_eq!(config.debate.max_proposals_per_agent, 1);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
game:
  team_side: black
  start_fen: "4k3/8/8/8/8/8/8/4K3 b - - 0 1"
  seed: 7
  max_rounds: 40
  selection_timeout_ms: 5000
  selector: random
  opponent: human
  report_path: "reports.jsonl"

debate:
  consensus_margin: 0.35
  abstain_policy: reoffer
  max_selection_attempts: 5
  snapshot_history: 4
  max_proposals_per_agent: 2

agents:
  theme: defensive
  emotion:
    decay_rate: 0.2
  scoring:
    blend:
      mode: weighted
      personality_share: 0.6

logging:
  level: "debug"
  json: true
"#;

        let config = ParliamentConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.game.team_side, Side::Black);
        assert_eq!(config.game.selector, SelectorMode::Random);
        assert_eq!(config.game.opponent, OpponentMode::Human);
        assert_eq!(config.game.report_path, Some(PathBuf::from("reports.jsonl")));
        assert_eq!(config.debate.consensus_margin, Decimal::new(35, 2));
        assert_eq!(config.debate.abstain_policy, AbstainPolicy::Reoffer);
        assert_eq!(config.agents.theme, Theme::Defensive);
        assert_eq!(config.agents.emotion.decay_rate, Decimal::new(2, 1));
        assert_eq!(
            config.agents.scoring.blend,
            ModifierBlend::Weighted {
                personality_share: Decimal::new(6, 1)
            }
        );
        assert!(config.logging.json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = ParliamentConfig::parse("game:\n  seed: 9\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.game.seed, 9);
        assert_eq!(config.debate, DebateConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(ParliamentConfig::parse("").is_ok());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("parliament-config.yaml");
        if path.exists() {
            let config = ParliamentConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
