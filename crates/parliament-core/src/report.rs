//! Per-round reports and the sinks that consume them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use parliament_types::{
    EmotionalDelta, GameId, GameOutcome, ImpactPreview, MemoryEntry, MomentKind, Move, PieceId,
    Proposal, PsychologicalState, RelationshipChange, Side,
};

/// Net emotional change of one piece over a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PieceDelta {
    /// Piece that changed.
    pub piece: PieceId,
    /// Net change, decay included.
    pub delta: EmotionalDelta,
}

/// Everything that happened in one committed round.
///
/// Produced for both team moves and opponent moves; the debate fields are
/// empty for the latter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    /// Game the round belongs to.
    pub game_id: GameId,
    /// Round number the move was committed in.
    pub round: u32,
    /// Side that moved.
    pub side: Side,
    /// Teammate that moved, for team moves.
    pub mover: Option<PieceId>,
    /// Committed move.
    pub mv: Move,
    /// Ranked proposals offered this round.
    pub proposals: Vec<Proposal>,
    /// Index of the selected proposal.
    pub winner_index: Option<usize>,
    /// Whether the debate reached consensus.
    pub consensus: Option<bool>,
    /// What kind of moment the move was.
    pub moment_kind: MomentKind,
    /// Net emotional change per piece, in id order.
    pub emotional_deltas: Vec<PieceDelta>,
    /// Relationship changes, in interaction order.
    pub relationship_changes: Vec<RelationshipChange>,
    /// Team psychology after the round.
    pub psychology: PsychologicalState,
    /// Memory entry recorded for the moment.
    pub memory_entry: MemoryEntry,
    /// Predicted impact of the selected proposal.
    pub impact_preview: Option<ImpactPreview>,
    /// Position after the move, in FEN.
    pub fen_after: String,
    /// Game outcome, when the move ended the game.
    pub outcome: Option<GameOutcome>,
    /// Wall-clock time the round committed.
    pub completed_at: DateTime<Utc>,
}

/// Receives round reports as the game progresses.
pub trait ReportSink: Send {
    /// Called after every committed round.
    fn on_round(&mut self, report: &RoundReport);

    /// Called once when the game ends.
    fn on_game_over(&mut self, _outcome: GameOutcome) {}
}

/// A sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl ReportSink for NoOpSink {
    fn on_round(&mut self, _report: &RoundReport) {}
}

/// A sink that keeps every report in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    /// Reports received, oldest first.
    pub reports: Vec<RoundReport>,
    /// Outcome, once the game is over.
    pub outcome: Option<GameOutcome>,
}

impl ReportSink for CollectingSink {
    fn on_round(&mut self, report: &RoundReport) {
        self.reports.push(report.clone());
    }

    fn on_game_over(&mut self, outcome: GameOutcome) {
        self.outcome = Some(outcome);
    }
}
