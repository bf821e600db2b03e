//! End-to-end debate rounds through the public moderator API.
//!
//! Every test drives a [`DebateModerator`] over the standard rules, or over
//! a wrapper that injects a fault, and checks the round-level guarantees:
//! deterministic ranking, rollback on failed commits, exclusion of bad
//! candidates, recoverable selection errors, and the social bookkeeping
//! of sacrifices and losses.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::missing_panics_doc
)]

use parliament_board::{Applied, BoardError, Position, RulesEngine, StandardRules};
use parliament_core::{
    CoreError, DebateModerator, DebatePhase, MomentObserver, ObserverError, ParliamentConfig,
    RoundStart, ScriptedSelector, Team, TopRankedSelector, TurnOutcome, WeightedRandomSelector,
    rank_proposals,
};
use parliament_types::{
    EmotionalImpulse, GameOutcome, InteractionKind, Moment, MomentKind, Move, PieceId, Proposal,
    Side, Square,
};

fn mv(uci: &str) -> Move {
    uci.parse().unwrap()
}

fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

fn ranked(moderator: &mut DebateModerator<impl RulesEngine>) -> Vec<Proposal> {
    match moderator.begin_round().unwrap() {
        RoundStart::Ranked(proposals) => proposals,
        RoundStart::GameOver(outcome) => panic!("unexpected game over: {outcome}"),
    }
}

fn id_on(team: &Team, square: &str) -> PieceId {
    team.roster.at(sq(square)).unwrap().id
}

fn wide_config() -> ParliamentConfig {
    let mut config = ParliamentConfig::default();
    config.debate.max_proposals_per_agent = 64;
    config
}

// ---------------------------------------------------------------------------
// Fault injection
// ---------------------------------------------------------------------------

/// Fails on the `fail_on`-th moment it sees (1-based).
struct FailingObserver {
    seen: u32,
    fail_on: u32,
}

impl MomentObserver for FailingObserver {
    fn name(&self) -> &str {
        "failing"
    }

    fn observe(&mut self, _moment: &Moment, _team: &Team) -> Result<Vec<EmotionalImpulse>, ObserverError> {
        self.seen = self.seen.saturating_add(1);
        if self.seen == self.fail_on {
            return Err(ObserverError::new("injected failure"));
        }
        Ok(Vec::new())
    }
}

/// Standard rules plus one extra move that is never actually legal.
#[derive(Debug)]
struct InjectingRules {
    extra: Move,
}

impl RulesEngine for InjectingRules {
    fn legal_moves(&self, position: &Position) -> Vec<Move> {
        let mut moves = StandardRules::new().legal_moves(position);
        moves.push(self.extra);
        moves
    }

    fn apply(&self, position: &Position, mv: Move) -> Result<Applied, BoardError> {
        StandardRules::new().apply(position, mv)
    }

    fn outcome(&self, position: &Position) -> Option<GameOutcome> {
        StandardRules::new().outcome(position)
    }
}

/// Standard rules whose `apply` forgets the move and returns the start
/// position, desynchronising board and roster.
#[derive(Debug)]
struct ForgetfulRules;

impl RulesEngine for ForgetfulRules {
    fn legal_moves(&self, position: &Position) -> Vec<Move> {
        StandardRules::new().legal_moves(position)
    }

    fn apply(&self, position: &Position, mv: Move) -> Result<Applied, BoardError> {
        let mut applied = StandardRules::new().apply(position, mv)?;
        applied.position = Position::start();
        Ok(applied)
    }

    fn outcome(&self, position: &Position) -> Option<GameOutcome> {
        StandardRules::new().outcome(position)
    }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

#[test]
fn ranking_is_deterministic_with_ties() {
    let mut moderator =
        DebateModerator::new(StandardRules::new(), Position::start(), &wide_config()).unwrap();
    let proposals = ranked(&mut moderator);
    assert!(proposals.len() > 10);

    let window = ParliamentConfig::default().agents.psychology.coordination_window;
    let mut shuffled = proposals.clone();
    shuffled.reverse();
    let tied: Vec<Proposal> = shuffled
        .iter()
        .cloned()
        .map(|mut p| {
            p.score = rust_decimal::Decimal::ONE;
            p
        })
        .collect();

    let network = &moderator.team().network;
    assert_eq!(rank_proposals(shuffled, network, window, 0), proposals);
    let first = rank_proposals(tied.clone(), network, window, 0);
    let second = rank_proposals(tied, network, window, 0);
    assert_eq!(first, second);
    assert!(first.windows(2).all(|w| (w[0].proposer, w[0].mv) <= (w[1].proposer, w[1].mv)));
}

#[test]
fn two_identical_games_produce_identical_proposals() {
    let play = || {
        let mut moderator =
            DebateModerator::new(StandardRules::new(), Position::start(), &ParliamentConfig::default())
                .unwrap();
        let mut selector = WeightedRandomSelector::new(7);
        let mut moves = Vec::new();
        for reply in ["e7e5", "b8c6", "g8f6"] {
            let TurnOutcome::Committed(report) = moderator.play_move(&mut selector).unwrap() else {
                panic!("game ended early");
            };
            moves.push((report.mv, report.proposals.clone()));
            if moderator.legal_moves().contains(&mv(reply)) {
                moderator.apply_opponent_move(mv(reply)).unwrap();
            } else {
                let fallback = moderator.legal_moves()[0];
                moderator.apply_opponent_move(fallback).unwrap();
            }
        }
        (moves, moderator.snapshot().team)
    };
    assert_eq!(play(), play());
}

// ---------------------------------------------------------------------------
// Round atomicity
// ---------------------------------------------------------------------------

#[test]
fn failed_commit_restores_previous_snapshot() {
    let mut moderator =
        DebateModerator::new(StandardRules::new(), Position::start(), &ParliamentConfig::default()).unwrap();
    moderator.register_observer(Box::new(FailingObserver { seen: 0, fail_on: 2 }));

    moderator.play_move(&mut TopRankedSelector::new()).unwrap();
    let committed = moderator.snapshot();
    assert_eq!(moderator.caretaker().latest(), Some(&committed));

    let err = moderator.apply_opponent_move(mv("e7e5")).unwrap_err();
    assert!(matches!(err, CoreError::Observer { ref observer, .. } if observer == "failing"));
    assert_eq!(moderator.snapshot(), committed);
    assert_eq!(moderator.phase(), DebatePhase::Idle);
    assert_eq!(moderator.round(), 1);

    // The same move goes through once the observer stops failing.
    let report = moderator.apply_opponent_move(mv("e7e5")).unwrap();
    assert_eq!(report.round, 1);
    assert_eq!(moderator.round(), 2);
}

#[test]
fn invariant_violation_halts_with_dump() {
    let mut moderator =
        DebateModerator::new(ForgetfulRules, Position::start(), &ParliamentConfig::default()).unwrap();
    let initial = moderator.snapshot();

    let err = moderator.play_move(&mut TopRankedSelector::new()).unwrap_err();
    let CoreError::Halted { detail, dump } = err else {
        panic!("expected a halt");
    };
    assert!(detail.contains("invariant"));
    let dump: serde_json::Value = serde_json::from_str(&dump).unwrap();
    assert_eq!(dump["side"], "white");
    assert_eq!(dump["agents"].as_array().unwrap().len(), 16);

    assert_eq!(moderator.phase(), DebatePhase::Halted);
    assert_eq!(moderator.snapshot(), initial);
    assert!(matches!(
        moderator.begin_round(),
        Err(CoreError::PhaseViolation {
            phase: DebatePhase::Halted,
            ..
        })
    ));
}

// ---------------------------------------------------------------------------
// Collecting and selection
// ---------------------------------------------------------------------------

#[test]
fn illegal_candidate_is_excluded_without_side_effects() {
    let extra = mv("b1b3");
    let mut moderator =
        DebateModerator::new(InjectingRules { extra }, Position::start(), &wide_config()).unwrap();
    let knight = id_on(moderator.team(), "b1");
    let emotions_before = *moderator.team().agent(knight).unwrap().emotions();

    let proposals = ranked(&mut moderator);
    assert!(proposals.iter().all(|p| p.mv != extra));
    assert_eq!(proposals.iter().filter(|p| p.proposer == knight).count(), 2);
    assert_eq!(moderator.team().agent(knight).unwrap().emotions(), &emotions_before);
    assert_eq!(moderator.phase(), DebatePhase::AwaitingSelection);
}

#[test]
fn out_of_range_selection_is_recoverable() {
    let mut moderator =
        DebateModerator::new(StandardRules::new(), Position::start(), &ParliamentConfig::default()).unwrap();
    let before = moderator.snapshot();
    let proposals = ranked(&mut moderator);

    let err = moderator.submit_selection(proposals.len()).unwrap_err();
    assert!(matches!(err, CoreError::Selection { index, offered } if index == proposals.len() && offered == proposals.len()));
    assert_eq!(moderator.phase(), DebatePhase::AwaitingSelection);
    assert_eq!(moderator.pending(), proposals.as_slice());
    assert_eq!(moderator.snapshot(), before);

    let report = moderator.submit_selection(0).unwrap();
    assert_eq!(report.mv, proposals[0].mv);
    assert_eq!(moderator.phase(), DebatePhase::Idle);
}

#[test]
fn play_move_reprompts_after_bad_index() {
    let mut moderator =
        DebateModerator::new(StandardRules::new(), Position::start(), &ParliamentConfig::default()).unwrap();
    let mut selector = ScriptedSelector::new([Some(99), Some(1)]);
    let TurnOutcome::Committed(report) = moderator.play_move(&mut selector).unwrap() else {
        panic!("expected a commit");
    };
    assert_eq!(report.winner_index, Some(1));
    assert_eq!(selector.remaining(), 0);
}

#[test]
fn play_move_gives_up_after_max_attempts() {
    let mut moderator =
        DebateModerator::new(StandardRules::new(), Position::start(), &ParliamentConfig::default()).unwrap();
    let before = moderator.snapshot();
    let mut selector = ScriptedSelector::new([Some(99), Some(98), Some(97)]);
    let err = moderator.play_move(&mut selector).unwrap_err();
    assert!(matches!(err, CoreError::SelectionExhausted { round: 0, attempts: 3 }));
    assert_eq!(moderator.phase(), DebatePhase::Idle);
    assert_eq!(moderator.snapshot(), before);
}

// ---------------------------------------------------------------------------
// Social bookkeeping
// ---------------------------------------------------------------------------

#[test]
fn rook_interposing_for_bishop_is_a_sacrifice() {
    // The black rook on d8 attacks the bishop on d4; Rh5-d5 blocks the
    // file and leaves the rook hanging.
    let position = Position::from_fen("3r2k1/8/8/7R/3B4/8/8/K7 w - - 0 1").unwrap();
    let mut moderator = DebateModerator::new(StandardRules::new(), position, &wide_config()).unwrap();
    let rook = id_on(moderator.team(), "h5");
    let bishop = id_on(moderator.team(), "d4");

    let proposals = ranked(&mut moderator);
    let index = proposals.iter().position(|p| p.mv == mv("h5d5")).unwrap();
    assert!(proposals[index].tactics.is_sacrifice());

    let report = moderator.submit_selection(index).unwrap();
    assert_eq!(report.moment_kind, MomentKind::Sacrifice);
    assert!(report
        .relationship_changes
        .iter()
        .any(|c| c.kind == InteractionKind::Sacrifice));

    let network = &moderator.team().network;
    let bishop_in_rook = network.trust(bishop, rook);
    let rook_in_bishop = network.trust(rook, bishop);
    assert!(bishop_in_rook > rook_in_bishop);
    assert!(bishop_in_rook <= rust_decimal::Decimal::ONE);
    assert_eq!(moderator.last_mover(), Some(rook));
}

#[test]
fn opponent_capture_brings_loss_and_trauma() {
    // White knight e5 hangs to the d6 pawn after white plays a quiet king
    // move with the rook; the rook becomes the last mover.
    let position = Position::from_fen("4k3/8/3p4/4N3/8/8/8/R3K3 w - - 0 1").unwrap();
    let mut moderator = DebateModerator::new(StandardRules::new(), position, &wide_config()).unwrap();
    let rook = id_on(moderator.team(), "a1");
    let knight = id_on(moderator.team(), "e5");

    let proposals = ranked(&mut moderator);
    let index = proposals.iter().position(|p| p.mv == mv("a1a2")).unwrap();
    moderator.submit_selection(index).unwrap();
    assert_eq!(moderator.last_mover(), Some(rook));

    let morale_before = moderator.team().agent(rook).unwrap().emotions().morale();
    let report = moderator.apply_opponent_move(mv("d6e5")).unwrap();

    assert_eq!(report.side, Side::Black);
    assert_eq!(report.moment_kind, MomentKind::Loss);
    assert_eq!(report.mover, None);
    assert!(report.proposals.is_empty());
    assert!(report
        .relationship_changes
        .iter()
        .any(|c| c.kind == InteractionKind::Trauma));
    assert!(moderator.team().roster.identity(knight).unwrap().captured);
    assert!(moderator.team().agent(rook).unwrap().emotions().morale() < morale_before);
    assert!(report.memory_entry.narrative.contains("the fallen"));
}

#[test]
fn checkmated_team_sees_game_over() {
    // Fool's mate: white is mated.
    let position =
        Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
    let mut moderator =
        DebateModerator::new(StandardRules::new(), position, &ParliamentConfig::default()).unwrap();
    let outcome = GameOutcome::Checkmate { winner: Side::Black };
    assert_eq!(moderator.phase(), DebatePhase::GameOver(outcome));
    assert_eq!(moderator.begin_round().unwrap(), RoundStart::GameOver(outcome));
    assert!(matches!(
        moderator.apply_opponent_move(mv("e8e7")),
        Err(CoreError::GameOver { .. })
    ));
}
