//! Game loop runner.
//!
//! [`run_game`] alternates team debates and opponent moves until the game
//! ends or the round limit is reached, handing every round report to a
//! [`ReportSink`].

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tracing::{error, info, warn};

use parliament_board::{Position, RulesEngine};
use parliament_types::{GameOutcome, Move};

use crate::error::CoreError;
use crate::moderator::{DebateModerator, DebatePhase, TurnOutcome};
use crate::report::{ReportSink, RoundReport};
use crate::selector::Selector;

/// Errors an opponent can report instead of a move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OpponentError {
    /// The opponent resigned or quit.
    #[error("the opponent resigned")]
    Resigned,

    /// The opponent has no legal move to offer.
    #[error("no legal move available")]
    NoMove,

    /// An internal error in the opponent.
    #[error("opponent error: {message}")]
    Internal {
        /// Description of the error.
        message: String,
    },
}

/// Chooses the other side's moves.
pub trait Opponent {
    /// Pick a move from `legal` for the position.
    ///
    /// # Errors
    ///
    /// Returns [`OpponentError::Resigned`] to stop the game.
    fn choose(&mut self, position: &Position, legal: &[Move]) -> Result<Move, OpponentError>;
}

/// Plays a uniformly random legal move.
#[derive(Debug, Clone)]
pub struct RandomOpponent {
    rng: StdRng,
}

impl RandomOpponent {
    /// Create an opponent with a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Opponent for RandomOpponent {
    fn choose(&mut self, _position: &Position, legal: &[Move]) -> Result<Move, OpponentError> {
        legal.choose(&mut self.rng).copied().ok_or(OpponentError::NoMove)
    }
}

/// Replays a fixed list of moves, then resigns.
#[derive(Debug, Clone, Default)]
pub struct ScriptedOpponent {
    moves: std::collections::VecDeque<Move>,
}

impl ScriptedOpponent {
    /// Create an opponent from a move list.
    pub fn new(moves: impl IntoIterator<Item = Move>) -> Self {
        Self {
            moves: moves.into_iter().collect(),
        }
    }
}

impl Opponent for ScriptedOpponent {
    fn choose(&mut self, _position: &Position, _legal: &[Move]) -> Result<Move, OpponentError> {
        self.moves.pop_front().ok_or(OpponentError::Resigned)
    }
}

/// Why a game run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEndReason {
    /// Checkmate or stalemate.
    Finished(GameOutcome),
    /// `max_rounds` moves were committed.
    MaxRoundsReached,
    /// The opponent resigned or ran out of moves.
    OpponentStopped,
}

/// Consecutive failed team rounds tolerated before the run gives up.
const MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// Result of a game run.
#[derive(Debug)]
pub struct GameResult {
    /// Why the run stopped.
    pub end_reason: GameEndReason,
    /// The last committed round, if any.
    pub final_report: Option<RoundReport>,
    /// Moves committed during the run, both sides counted.
    pub total_rounds: u32,
}

/// Play until the game ends, the opponent stops, or `max_rounds` moves
/// have been committed.
///
/// # Errors
///
/// Returns [`CoreError`] if a round fails in a way the moderator cannot
/// recover from, if team rounds fail recoverably several times in a row,
/// or if the opponent plays an illegal move. A single recoverable failure
/// (for example an exhausted selection) is logged and the round is
/// debated again.
pub fn run_game<R: RulesEngine>(
    moderator: &mut DebateModerator<R>,
    selector: &mut dyn Selector,
    opponent: &mut dyn Opponent,
    sink: &mut dyn ReportSink,
    max_rounds: u32,
) -> Result<GameResult, CoreError> {
    let mut final_report: Option<RoundReport> = None;
    let mut total_rounds: u32 = 0;
    let mut failures: u32 = 0;

    info!(
        game_id = %moderator.game_id(),
        team = %moderator.team_side(),
        max_rounds,
        "Game loop starting"
    );

    loop {
        if let DebatePhase::GameOver(outcome) = moderator.phase() {
            sink.on_game_over(outcome);
            return Ok(GameResult {
                end_reason: GameEndReason::Finished(outcome),
                final_report,
                total_rounds,
            });
        }

        if total_rounds >= max_rounds {
            info!(rounds = total_rounds, max_rounds, "Round limit reached");
            return Ok(GameResult {
                end_reason: GameEndReason::MaxRoundsReached,
                final_report,
                total_rounds,
            });
        }

        let report = if moderator.position().side_to_move() == moderator.team_side() {
            match moderator.play_move(selector) {
                Ok(TurnOutcome::Committed(report)) => {
                    failures = 0;
                    *report
                }
                Err(e) if e.is_recoverable() && moderator.phase() == DebatePhase::Idle => {
                    failures = failures.saturating_add(1);
                    if failures >= MAX_CONSECUTIVE_FAILURES {
                        error!(error = %e, failures, "Team rounds keep failing, stopping the run");
                        return Err(e);
                    }
                    warn!(
                        error = %e,
                        round = moderator.round(),
                        failures,
                        "Team round failed, debating again"
                    );
                    continue;
                }
                Err(e) => return Err(e),
                Ok(TurnOutcome::GameOver(outcome)) => {
                    sink.on_game_over(outcome);
                    return Ok(GameResult {
                        end_reason: GameEndReason::Finished(outcome),
                        final_report,
                        total_rounds,
                    });
                }
            }
        } else {
            let legal = moderator.legal_moves();
            let mv = match opponent.choose(moderator.position(), &legal) {
                Ok(mv) => mv,
                Err(e) => {
                    warn!(error = %e, "Opponent stopped");
                    return Ok(GameResult {
                        end_reason: GameEndReason::OpponentStopped,
                        final_report,
                        total_rounds,
                    });
                }
            };
            moderator.apply_opponent_move(mv)?
        };

        total_rounds = total_rounds.saturating_add(1);
        sink.on_round(&report);

        if let Some(outcome) = report.outcome {
            sink.on_game_over(outcome);
            return Ok(GameResult {
                end_reason: GameEndReason::Finished(outcome),
                final_report: Some(report),
                total_rounds,
            });
        }
        final_report = Some(report);
    }
}

/// Log how a game run ended.
pub fn log_game_end(result: &GameResult) {
    info!(
        reason = ?result.end_reason,
        total_rounds = result.total_rounds,
        final_round = result.final_report.as_ref().map(|r| r.round),
        "Game ended"
    );
    if let Some(ref report) = result.final_report {
        info!(
            cohesion = %report.psychology.cohesion,
            morale = %report.psychology.morale,
            coordination = %report.psychology.coordination,
            leadership = %report.psychology.leadership,
            fen = %report.fen_after,
            "Final team psychology"
        );
    } else {
        warn!("Game ended with no moves committed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parliament_board::StandardRules;

    use super::*;
    use crate::config::ParliamentConfig;
    use crate::report::CollectingSink;
    use crate::selector::TopRankedSelector;

    fn mv(uci: &str) -> Move {
        uci.parse().unwrap()
    }

    #[test]
    fn stops_at_round_limit() {
        let config = ParliamentConfig::default();
        let mut moderator = DebateModerator::new(StandardRules::new(), Position::start(), &config).unwrap();
        let mut sink = CollectingSink::default();
        let result = run_game(
            &mut moderator,
            &mut TopRankedSelector::new(),
            &mut RandomOpponent::new(config.game.seed),
            &mut sink,
            6,
        )
        .unwrap();
        assert_eq!(result.end_reason, GameEndReason::MaxRoundsReached);
        assert_eq!(result.total_rounds, 6);
        assert_eq!(sink.reports.len(), 6);
        assert_eq!(moderator.round(), 6);
        assert!(sink.reports.iter().step_by(2).all(|r| r.mover.is_some()));
        assert!(sink.reports.iter().skip(1).step_by(2).all(|r| r.mover.is_none()));
    }

    #[test]
    fn resigning_opponent_ends_the_run() {
        let mut moderator =
            DebateModerator::new(StandardRules::new(), Position::start(), &ParliamentConfig::default()).unwrap();
        let mut sink = CollectingSink::default();
        let result = run_game(
            &mut moderator,
            &mut TopRankedSelector::new(),
            &mut ScriptedOpponent::new([mv("e7e5")]),
            &mut sink,
            50,
        )
        .unwrap();
        assert_eq!(result.end_reason, GameEndReason::OpponentStopped);
        assert_eq!(result.total_rounds, 3);
    }

    #[test]
    fn team_mate_ends_the_game() {
        // White to play Qh5xf7 is mate.
        let position =
            Position::from_fen("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4").unwrap();
        let mut config = ParliamentConfig::default();
        config.debate.max_proposals_per_agent = 64;
        let mut moderator = DebateModerator::new(StandardRules::new(), position, &config).unwrap();
        let proposals = match moderator.begin_round().unwrap() {
            crate::moderator::RoundStart::Ranked(p) => p,
            crate::moderator::RoundStart::GameOver(_) => panic!("game is not over"),
        };
        let index = proposals.iter().position(|p| p.mv == mv("h5f7")).unwrap();
        moderator.cancel_round().unwrap();

        let mut sink = CollectingSink::default();
        let result = run_game(
            &mut moderator,
            &mut crate::selector::ScriptedSelector::new([Some(index)]),
            &mut RandomOpponent::new(1),
            &mut sink,
            10,
        )
        .unwrap();
        let outcome = GameOutcome::Checkmate {
            winner: parliament_types::Side::White,
        };
        assert_eq!(result.end_reason, GameEndReason::Finished(outcome));
        assert_eq!(sink.outcome, Some(outcome));
        assert_eq!(result.total_rounds, 1);
    }

    #[test]
    fn exhausted_selection_is_debated_again() {
        let mut moderator =
            DebateModerator::new(StandardRules::new(), Position::start(), &ParliamentConfig::default()).unwrap();
        let mut sink = CollectingSink::default();
        let result = run_game(
            &mut moderator,
            &mut crate::selector::ScriptedSelector::new([Some(99), Some(98), Some(97), Some(0)]),
            &mut RandomOpponent::new(3),
            &mut sink,
            4,
        )
        .unwrap();
        assert_eq!(result.end_reason, GameEndReason::MaxRoundsReached);
        assert_eq!(result.total_rounds, 4);
        let first = sink.reports.first().unwrap();
        assert_eq!(first.round, 0);
        assert_eq!(first.winner_index, Some(0));
    }

    #[test]
    fn repeated_failures_stop_the_run() {
        let mut moderator =
            DebateModerator::new(StandardRules::new(), Position::start(), &ParliamentConfig::default()).unwrap();
        let mut sink = CollectingSink::default();
        let err = run_game(
            &mut moderator,
            &mut crate::selector::ScriptedSelector::new([Some(99); 9]),
            &mut RandomOpponent::new(3),
            &mut sink,
            4,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::SelectionExhausted { round: 0, attempts: 3 }));
        assert!(sink.reports.is_empty());
        assert_eq!(moderator.round(), 0);
        assert_eq!(moderator.phase(), DebatePhase::Idle);
    }
}
