//! Debate moderator: the round state machine.
//!
//! A team round runs through these phases:
//!
//! 1. **Collecting** -- every active agent evaluates the legal moves of
//!    its own piece; moves the analyzer rejects are dropped and logged.
//!
//! 2. **Ranking** -- proposals are ordered by score, then recent
//!    cooperation with the ally they help, then proposer id, then move.
//!
//! 3. **Awaiting selection** -- the ranked list is handed out and the
//!    moderator waits for [`DebateModerator::submit_selection`] or
//!    [`DebateModerator::abstain`]. Nothing shared changes while waiting.
//!
//! 4. **Committing** -- the move is applied, interactions and the moment
//!    are built, and the mediator, psychology and snapshot steps run in
//!    that order.
//!
//! Opponent moves skip straight to committing through
//! [`DebateModerator::apply_opponent_move`].
//!
//! Any failure after the rules engine accepted the move restores the last
//! snapshot wholesale. An invariant violation additionally halts the
//! moderator.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use parliament_agents::{AgentError, RelationshipNetwork, preview_impact};
use parliament_board::{Applied, Position, RulesEngine, analyze, defenders_of, en_prise};
use parliament_types::{
    DebateOutcome, GameId, GameOutcome, ImpactPreview, Interaction, InteractionKind, Moment,
    MomentKind, Move, PieceId, Proposal, Side, Square, TacticalSummary,
};

use crate::config::{AbstainPolicy, ParliamentConfig};
use crate::error::CoreError;
use crate::mediator::{InteractionMediator, MomentObserver};
use crate::observers::{PieceObserver, TeamObserver, TracingObserver, unit_scale};
use crate::report::{PieceDelta, RoundReport};
use crate::selector::{SelectionError, Selector};
use crate::snapshot::{Caretaker, Snapshot};
use crate::team::Team;

/// Magnitude of the support an ally gives by defending the destination
/// square.
const DEFENDER_SUPPORT: Decimal = Decimal::from_parts(5, 0, 0, false, 1);
/// Defending support from the piece that made the previous team move.
const FOLLOW_UP_SUPPORT: Decimal = Decimal::ONE;
/// Support toward an ally pulled out of danger without a sacrifice.
const RESCUE_SUPPORT: Decimal = Decimal::from_parts(6, 0, 0, false, 1);
/// Support toward an ally that is newly protected.
const PROTECT_SUPPORT: Decimal = Decimal::from_parts(3, 0, 0, false, 1);
/// Cooperation with a slider whose line the move opened.
const UNMASK_COOPERATION: Decimal = Decimal::from_parts(8, 0, 0, false, 1);
/// Competition with a rival proposer inside the consensus margin.
const RIVAL_COMPETITION: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Where the moderator is in the round cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebatePhase {
    /// Between rounds.
    Idle,
    /// Agents are evaluating candidate moves.
    Collecting,
    /// Proposals are being ordered.
    Ranking,
    /// Ranked proposals are out; waiting for a selection.
    AwaitingSelection,
    /// A move is being committed.
    Committing,
    /// The game has ended. Terminal.
    GameOver(GameOutcome),
    /// An invariant was violated. Terminal.
    Halted,
}

/// Result of [`DebateModerator::begin_round`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundStart {
    /// Proposals ranked best first, awaiting selection.
    Ranked(Vec<Proposal>),
    /// The team has no legal moves; the game is over.
    GameOver(GameOutcome),
}

/// Result of [`DebateModerator::abstain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbstainOutcome {
    /// The top proposal was committed.
    Committed(Box<RoundReport>),
    /// Fresh proposals were collected and are awaiting selection.
    Reoffered(RoundStart),
}

/// Result of [`DebateModerator::play_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A move was committed.
    Committed(Box<RoundReport>),
    /// The game is over.
    GameOver(GameOutcome),
}

/// Extra report fields only team moves have.
#[derive(Debug, Default)]
struct DebateRecord {
    proposals: Vec<Proposal>,
    winner_index: Option<usize>,
    consensus: Option<bool>,
    impact_preview: Option<ImpactPreview>,
}

/// Order proposals best first.
///
/// Keys: score descending, recent cooperation between proposer and
/// support target descending, proposer id ascending, move ascending. The
/// order is total, so equal inputs always rank the same way.
pub fn rank_proposals(
    mut proposals: Vec<Proposal>,
    network: &RelationshipNetwork,
    window: u32,
    round: u32,
) -> Vec<Proposal> {
    let cooperation = |proposal: &Proposal| {
        proposal.support_target.map_or(0, |target| {
            network.get_recent_cooperation(proposal.proposer, target, window, round)
        })
    };
    proposals.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| cooperation(b).cmp(&cooperation(a)))
            .then_with(|| a.proposer.cmp(&b.proposer))
            .then_with(|| a.mv.cmp(&b.mv))
    });
    proposals
}

/// Runs debates for one team and commits both sides' moves.
#[derive(Debug)]
pub struct DebateModerator<R: RulesEngine> {
    rules: R,
    game_id: GameId,
    config: ParliamentConfig,
    position: Position,
    team: Team,
    mediator: InteractionMediator,
    caretaker: Caretaker,
    round: u32,
    phase: DebatePhase,
    pending: Vec<Proposal>,
    last_mover: Option<PieceId>,
}

impl<R: RulesEngine> DebateModerator<R> {
    /// Set up a game from `position` with the built-in observers
    /// registered and the initial snapshot taken.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Agent`] if the initial team state is
    /// inconsistent with the position.
    pub fn new(rules: R, position: Position, config: &ParliamentConfig) -> Result<Self, CoreError> {
        let team = Team::new(&position, config.game.team_side, &config.agents);
        team.verify(&position)?;

        let mut mediator = InteractionMediator::new();
        mediator.register_observer(Box::new(PieceObserver));
        mediator.register_observer(Box::new(TeamObserver));
        mediator.register_observer(Box::new(TracingObserver));

        let phase = rules
            .outcome(&position)
            .map_or(DebatePhase::Idle, DebatePhase::GameOver);

        let mut moderator = Self {
            rules,
            game_id: GameId::new(),
            config: config.clone(),
            position,
            team,
            mediator,
            caretaker: Caretaker::new(config.debate.snapshot_history),
            round: 0,
            phase,
            pending: Vec::new(),
            last_mover: None,
        };
        moderator.caretaker.capture(moderator.snapshot());

        info!(
            game_id = %moderator.game_id,
            team = %moderator.team.side(),
            pieces = moderator.team.roster.active().count(),
            fen = %moderator.position.fen(),
            "Game started"
        );
        Ok(moderator)
    }

    /// Append an observer after the built-in ones.
    pub fn register_observer(&mut self, observer: Box<dyn MomentObserver>) {
        self.mediator.register_observer(observer);
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Current phase.
    pub const fn phase(&self) -> DebatePhase {
        self.phase
    }

    /// Moves committed so far, both sides counted.
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Current position.
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// The debating team.
    pub const fn team(&self) -> &Team {
        &self.team
    }

    /// Game id.
    pub const fn game_id(&self) -> GameId {
        self.game_id
    }

    /// Side the team plays.
    pub const fn team_side(&self) -> Side {
        self.team.side()
    }

    /// Proposals awaiting selection, best first.
    pub fn pending(&self) -> &[Proposal] {
        &self.pending
    }

    /// Snapshot history.
    pub const fn caretaker(&self) -> &Caretaker {
        &self.caretaker
    }

    /// Teammate that made the team's last move.
    pub const fn last_mover(&self) -> Option<PieceId> {
        self.last_mover
    }

    /// Legal moves in the current position.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.rules.legal_moves(&self.position)
    }

    /// Value copy of the current committed state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            round: self.round,
            position: self.position.clone(),
            team: self.team.clone(),
            last_mover: self.last_mover,
        }
    }

    // -----------------------------------------------------------------------
    // Team rounds
    // -----------------------------------------------------------------------

    /// Collect and rank proposals for the team's move.
    ///
    /// # Errors
    ///
    /// - [`CoreError::PhaseViolation`] unless idle
    /// - [`CoreError::OutOfTurn`] if the opponent is to move
    /// - [`CoreError::NoProposals`] if legal moves exist but every
    ///   candidate was rejected
    pub fn begin_round(&mut self) -> Result<RoundStart, CoreError> {
        match self.phase {
            DebatePhase::GameOver(outcome) => return Ok(RoundStart::GameOver(outcome)),
            DebatePhase::Idle => {}
            phase => {
                return Err(CoreError::PhaseViolation {
                    operation: "begin_round",
                    phase,
                });
            }
        }

        let to_move = self.position.side_to_move();
        let requested = self.team.side();
        if to_move != requested {
            return Err(CoreError::OutOfTurn { to_move, requested });
        }

        let legal = self.rules.legal_moves(&self.position);
        if legal.is_empty() {
            let outcome = self.terminal_outcome();
            info!(round = self.round, %outcome, "No legal moves -- game over");
            self.phase = DebatePhase::GameOver(outcome);
            return Ok(RoundStart::GameOver(outcome));
        }

        self.phase = DebatePhase::Collecting;
        let proposals = match self.collect(&legal) {
            Ok(proposals) => proposals,
            Err(e) => {
                self.phase = DebatePhase::Idle;
                return Err(e);
            }
        };

        self.phase = DebatePhase::Ranking;
        let ranked = rank_proposals(
            proposals,
            &self.team.network,
            self.config.agents.psychology.coordination_window,
            self.round,
        );
        if ranked.is_empty() {
            self.phase = DebatePhase::Idle;
            return Err(CoreError::NoProposals { round: self.round });
        }

        debug!(
            round = self.round,
            proposals = ranked.len(),
            top = %ranked.first().map_or(String::new(), |p| p.mv.to_string()),
            "Proposals ranked"
        );
        self.pending.clone_from(&ranked);
        self.phase = DebatePhase::AwaitingSelection;
        Ok(RoundStart::Ranked(ranked))
    }

    /// Commit the proposal at `index` of the ranked list.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Selection`] if `index` is out of range; the moderator
    ///   stays in [`DebatePhase::AwaitingSelection`]
    /// - [`CoreError::PhaseViolation`] if no proposals are pending
    /// - any commit error, after the last snapshot has been restored
    pub fn submit_selection(&mut self, index: usize) -> Result<RoundReport, CoreError> {
        self.require_phase("submit_selection", DebatePhase::AwaitingSelection)?;
        let offered = self.pending.len();
        if index >= offered {
            warn!(round = self.round, index, offered, "Selection out of range");
            return Err(CoreError::Selection { index, offered });
        }
        self.commit_selection(index)
    }

    /// Decline to choose. The configured policy decides what happens.
    ///
    /// # Errors
    ///
    /// - [`CoreError::PhaseViolation`] if no proposals are pending
    /// - any error from committing or re-collecting
    pub fn abstain(&mut self) -> Result<AbstainOutcome, CoreError> {
        self.require_phase("abstain", DebatePhase::AwaitingSelection)?;
        match self.config.debate.abstain_policy {
            AbstainPolicy::DefaultToTop => {
                info!(round = self.round, "No selection -- committing the top proposal");
                let report = self.commit_selection(0)?;
                Ok(AbstainOutcome::Committed(Box::new(report)))
            }
            AbstainPolicy::Reoffer => {
                info!(round = self.round, "No selection -- collecting fresh proposals");
                self.pending.clear();
                self.phase = DebatePhase::Idle;
                Ok(AbstainOutcome::Reoffered(self.begin_round()?))
            }
        }
    }

    /// Drop the pending proposals. Committed state is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PhaseViolation`] if no proposals are pending.
    pub fn cancel_round(&mut self) -> Result<(), CoreError> {
        self.require_phase("cancel_round", DebatePhase::AwaitingSelection)?;
        debug!(round = self.round, discarded = self.pending.len(), "Round cancelled");
        self.pending.clear();
        self.phase = DebatePhase::Idle;
        Ok(())
    }

    /// Run a whole team turn against a selector, re-prompting on bad
    /// indices up to `debate.max_selection_attempts` times.
    ///
    /// # Errors
    ///
    /// - [`CoreError::SelectionExhausted`] when the attempts run out; the
    ///   round is cancelled
    /// - [`CoreError::Selector`] if the selector fails internally
    /// - any error from [`Self::begin_round`] or committing
    pub fn play_move(&mut self, selector: &mut dyn Selector) -> Result<TurnOutcome, CoreError> {
        let mut proposals = match self.begin_round()? {
            RoundStart::Ranked(proposals) => proposals,
            RoundStart::GameOver(outcome) => return Ok(TurnOutcome::GameOver(outcome)),
        };

        let max_attempts = self.config.debate.max_selection_attempts.max(1);
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            match selector.select(&proposals, self.round) {
                Ok(index) => match self.submit_selection(index) {
                    Ok(report) => return Ok(TurnOutcome::Committed(Box::new(report))),
                    Err(CoreError::Selection { index, offered }) => {
                        warn!(
                            round = self.round,
                            index,
                            offered,
                            attempts,
                            "Invalid selection, asking again"
                        );
                    }
                    Err(e) => return Err(e),
                },
                Err(SelectionError::NoSelection) => match self.abstain()? {
                    AbstainOutcome::Committed(report) => return Ok(TurnOutcome::Committed(report)),
                    AbstainOutcome::Reoffered(RoundStart::Ranked(fresh)) => proposals = fresh,
                    AbstainOutcome::Reoffered(RoundStart::GameOver(outcome)) => {
                        return Ok(TurnOutcome::GameOver(outcome));
                    }
                },
                Err(e) => {
                    self.cancel_round()?;
                    return Err(e.into());
                }
            }

            if attempts >= max_attempts {
                self.cancel_round()?;
                return Err(CoreError::SelectionExhausted {
                    round: self.round,
                    attempts,
                });
            }
        }
    }

    // -----------------------------------------------------------------------
    // Opponent moves
    // -----------------------------------------------------------------------

    /// Commit the opponent's move and let the team react to it.
    ///
    /// # Errors
    ///
    /// - [`CoreError::GameOver`] once the game has ended
    /// - [`CoreError::PhaseViolation`] unless idle
    /// - [`CoreError::OutOfTurn`] if the team is to move
    /// - [`CoreError::Board`] if the move is illegal; nothing changes
    /// - any commit error, after the last snapshot has been restored
    pub fn apply_opponent_move(&mut self, mv: Move) -> Result<RoundReport, CoreError> {
        match self.phase {
            DebatePhase::GameOver(outcome) => return Err(CoreError::GameOver { outcome }),
            DebatePhase::Idle => {}
            phase => {
                return Err(CoreError::PhaseViolation {
                    operation: "apply_opponent_move",
                    phase,
                });
            }
        }

        let to_move = self.position.side_to_move();
        let requested = self.team.side().opponent();
        if to_move != requested {
            return Err(CoreError::OutOfTurn { to_move, requested });
        }

        let before = self.position.clone();
        let applied = self.rules.apply(&before, mv)?;

        self.phase = DebatePhase::Committing;
        match self.commit_opponent_move(&before, mv, applied) {
            Ok(report) => Ok(report),
            Err(e) => Err(self.recover(e)),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn require_phase(&self, operation: &'static str, expected: DebatePhase) -> Result<(), CoreError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(CoreError::PhaseViolation {
                operation,
                phase: self.phase,
            })
        }
    }

    fn terminal_outcome(&self) -> GameOutcome {
        self.rules.outcome(&self.position).unwrap_or_else(|| {
            if self.position.in_check() {
                GameOutcome::Checkmate {
                    winner: self.position.side_to_move().opponent(),
                }
            } else {
                GameOutcome::Stalemate
            }
        })
    }

    /// Each active agent's best proposals for its own piece's moves.
    fn collect(&self, legal: &[Move]) -> Result<Vec<Proposal>, CoreError> {
        let ctx = self.team.context(self.round, &self.config.agents.scoring);
        let per_agent = self.config.debate.max_proposals_per_agent.max(1);
        let mut proposals = Vec::new();

        for agent in self.team.active_agents() {
            let square = self.team.roster.identity(agent.id())?.square;
            let mut own = Vec::new();
            for &mv in legal.iter().filter(|mv| mv.from == square) {
                match agent.evaluate_move(&self.position, mv, &ctx) {
                    Ok(proposal) => own.push(proposal),
                    Err(AgentError::InvalidMove { piece, mv, reason }) => {
                        debug!(round = self.round, %piece, %mv, %reason, "Candidate excluded");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            own.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.mv.cmp(&b.mv)));
            own.truncate(per_agent);
            proposals.extend(own);
        }
        Ok(proposals)
    }

    fn commit_selection(&mut self, index: usize) -> Result<RoundReport, CoreError> {
        let proposals = std::mem::take(&mut self.pending);
        self.phase = DebatePhase::Committing;
        match self.commit_team_move(proposals, index) {
            Ok(report) => Ok(report),
            Err(e) => Err(self.recover(e)),
        }
    }

    fn commit_team_move(&mut self, proposals: Vec<Proposal>, index: usize) -> Result<RoundReport, CoreError> {
        let chosen = proposals.get(index).ok_or(CoreError::Selection {
            index,
            offered: proposals.len(),
        })?;
        let side = self.team.side();
        let mover = chosen.proposer;
        let before = self.position.clone();

        let applied = self.rules.apply(&before, chosen.mv)?;
        let threatened_before = self.threatened_ids(&before);
        self.team.roster.apply_move(&before, chosen.mv)?;
        self.team.roster.verify_against(&applied.position)?;

        let rescued = self.ids_at(&chosen.tactics.rescues);
        let interactions = self.team_interactions(chosen, &proposals, &applied.position, &rescued);
        let threatened: Vec<PieceId> = self
            .threatened_ids(&applied.position)
            .difference(&threatened_before)
            .copied()
            .filter(|&id| id != mover)
            .collect();

        let consensus = self.has_consensus(&proposals);
        let overruled: BTreeSet<PieceId> = proposals
            .iter()
            .map(|p| p.proposer)
            .filter(|&p| p != mover)
            .collect();

        let moment = Moment {
            round: self.round,
            side,
            kind: team_moment_kind(&chosen.tactics),
            mv: chosen.mv,
            mover: Some(mover),
            tactics: chosen.tactics.clone(),
            interactions,
            debate: Some(DebateOutcome {
                winner: mover,
                overruled: overruled.into_iter().collect(),
                consensus,
                winning_score: chosen.score,
            }),
            captured: None,
            threatened,
            rescued,
        };
        let impact_preview = Some(preview_impact(&chosen.tactics));

        info!(
            round = self.round,
            piece = %mover,
            mv = %chosen.mv,
            score = %chosen.score,
            kind = ?moment.kind,
            consensus,
            "Team move committed"
        );

        self.position = applied.position;
        self.finish_round(
            &moment,
            DebateRecord {
                winner_index: Some(index),
                consensus: Some(consensus),
                impact_preview,
                proposals,
            },
        )
    }

    fn commit_opponent_move(&mut self, before: &Position, mv: Move, applied: Applied) -> Result<RoundReport, CoreError> {
        let tactics = analyze(before, mv, &self.config.agents.scoring.tactics)?;
        let threatened_before = self.threatened_ids(before);
        let captured = self.team.roster.apply_move(before, mv)?;
        self.team.roster.verify_against(&applied.position)?;

        let threatened: Vec<PieceId> = self
            .threatened_ids(&applied.position)
            .difference(&threatened_before)
            .copied()
            .collect();

        let mut interactions = Vec::new();
        if let (Some(victim), Some(last)) = (captured, self.last_mover) {
            self.push_trauma(&mut interactions, last, victim)?;
        }

        let kind = if captured.is_some() {
            MomentKind::Loss
        } else if !threatened.is_empty() || applied.gives_check {
            MomentKind::Harassment
        } else {
            MomentKind::Quiet
        };

        info!(
            round = self.round,
            %mv,
            captured = ?captured,
            threatened = threatened.len(),
            "Opponent move committed"
        );

        let moment = Moment {
            round: self.round,
            side: self.team.side().opponent(),
            kind,
            mv,
            mover: None,
            tactics,
            interactions,
            debate: None,
            captured,
            threatened,
            rescued: Vec::new(),
        };
        self.position = applied.position;
        self.finish_round(&moment, DebateRecord::default())
    }

    /// Mediator, psychology, snapshot, report.
    fn finish_round(&mut self, moment: &Moment, record: DebateRecord) -> Result<RoundReport, CoreError> {
        let outcome = self
            .mediator
            .notify(moment, &mut self.team, &self.config.agents.emotion)?;
        self.team.verify(&self.position)?;
        self.team.psychology = self
            .team
            .recompute_psychology(moment.round, &self.config.agents);

        self.round = self.round.saturating_add(1);
        if moment.side == self.team.side() {
            self.last_mover = moment.mover;
        }
        self.caretaker.capture(self.snapshot());

        let game_outcome = self.rules.outcome(&self.position);
        self.phase = game_outcome.map_or(DebatePhase::Idle, DebatePhase::GameOver);
        if let Some(result) = game_outcome {
            info!(round = moment.round, outcome = %result, "Game over");
        }

        debug!(
            round = moment.round,
            cohesion = %self.team.psychology.cohesion,
            morale = %self.team.psychology.morale,
            coordination = %self.team.psychology.coordination,
            leadership = %self.team.psychology.leadership,
            "Psychology recomputed"
        );

        Ok(RoundReport {
            game_id: self.game_id,
            round: moment.round,
            side: moment.side,
            mover: moment.mover,
            mv: moment.mv,
            proposals: record.proposals,
            winner_index: record.winner_index,
            consensus: record.consensus,
            moment_kind: moment.kind,
            emotional_deltas: outcome
                .emotional_deltas
                .into_iter()
                .filter(|(_, delta)| !delta.is_zero())
                .map(|(piece, delta)| PieceDelta { piece, delta })
                .collect(),
            relationship_changes: outcome.relationship_changes,
            psychology: self.team.psychology,
            memory_entry: outcome.memory_entry,
            impact_preview: record.impact_preview,
            fen_after: self.position.fen(),
            outcome: game_outcome,
            completed_at: chrono::Utc::now(),
        })
    }

    /// Roll back after a failed commit. Invariant violations halt.
    fn recover(&mut self, err: CoreError) -> CoreError {
        if err.is_invariant_violation() {
            let dump = serde_json::to_string(&self.team.dump())
                .unwrap_or_else(|e| format!("{{\"dump_error\":\"{e}\"}}"));
            error!(round = self.round, error = %err, %dump, "Invariant violated -- halting");
            self.restore();
            self.phase = DebatePhase::Halted;
            return CoreError::Halted {
                detail: err.to_string(),
                dump,
            };
        }
        warn!(round = self.round, error = %err, "Commit failed, last snapshot restored");
        self.restore();
        self.phase = DebatePhase::Idle;
        err
    }

    /// Trauma between the piece that moved last and the teammate the
    /// opponent just captured.
    fn push_trauma(&self, out: &mut Vec<Interaction>, last: PieceId, victim: PieceId) -> Result<(), CoreError> {
        if victim == last {
            return Ok(());
        }
        let weight = self.team.roster.identity(victim)?.kind.psychological_weight();
        out.push(Interaction {
            kind: InteractionKind::Trauma,
            actor: last,
            other: victim,
            magnitude: unit_scale(weight),
            round: self.round,
        });
        Ok(())
    }

    fn restore(&mut self) {
        self.pending.clear();
        if let Some(snapshot) = self.caretaker.latest().cloned() {
            self.round = snapshot.round;
            self.position = snapshot.position;
            self.team = snapshot.team;
            self.last_mover = snapshot.last_mover;
        }
    }

    fn has_consensus(&self, proposals: &[Proposal]) -> bool {
        match proposals {
            [first, second, ..] => first
                .score
                .checked_sub(second.score)
                .is_some_and(|gap| gap.abs() <= self.config.debate.consensus_margin),
            _ => true,
        }
    }

    /// Active teammates standing on `squares`, in id order.
    fn ids_at(&self, squares: &[Square]) -> Vec<PieceId> {
        let ids: BTreeSet<PieceId> = squares
            .iter()
            .filter_map(|&sq| self.team.roster.at(sq))
            .map(|identity| identity.id)
            .collect();
        ids.into_iter().collect()
    }

    /// Teammates en prise in `position`, resolved through the current
    /// roster.
    fn threatened_ids(&self, position: &Position) -> BTreeSet<PieceId> {
        en_prise(position, self.team.side())
            .into_iter()
            .filter_map(|sq| self.team.roster.at(sq))
            .map(|identity| identity.id)
            .collect()
    }

    /// Interactions produced by the team's committed move. The roster
    /// already reflects the move.
    fn team_interactions(
        &self,
        chosen: &Proposal,
        proposals: &[Proposal],
        after: &Position,
        rescued: &[PieceId],
    ) -> Vec<Interaction> {
        let mover = chosen.proposer;
        let round = self.round;
        let side = self.team.side();
        let interaction = |kind, actor, other, magnitude| Interaction {
            kind,
            actor,
            other,
            magnitude,
            round,
        };
        let mut out = Vec::new();

        for defender in self.ids_at(&defenders_of(after, chosen.mv.to, side)) {
            if defender == mover {
                continue;
            }
            let magnitude = if Some(defender) == self.last_mover {
                FOLLOW_UP_SUPPORT
            } else {
                DEFENDER_SUPPORT
            };
            out.push(interaction(InteractionKind::Support, defender, mover, magnitude));
        }

        let sacrifice = chosen.tactics.is_sacrifice();
        for &ally in rescued.iter().filter(|&&ally| ally != mover) {
            if sacrifice {
                out.push(interaction(InteractionKind::Sacrifice, mover, ally, Decimal::ONE));
            } else {
                out.push(interaction(InteractionKind::Support, mover, ally, RESCUE_SUPPORT));
            }
        }

        for ally in self.ids_at(&chosen.tactics.defends) {
            if ally != mover && !rescued.contains(&ally) {
                out.push(interaction(InteractionKind::Support, mover, ally, PROTECT_SUPPORT));
            }
        }

        for slider in self.ids_at(&chosen.tactics.unmasked) {
            if slider != mover {
                out.push(interaction(InteractionKind::Cooperation, mover, slider, UNMASK_COOPERATION));
            }
        }

        let rivals: BTreeSet<PieceId> = proposals
            .iter()
            .filter(|p| p.proposer != mover)
            .filter(|p| {
                p.score
                    .checked_sub(chosen.score)
                    .is_some_and(|gap| gap.abs() <= self.config.debate.consensus_margin)
            })
            .map(|p| p.proposer)
            .collect();
        for rival in rivals {
            out.push(interaction(InteractionKind::Competition, mover, rival, RIVAL_COMPETITION));
        }

        out
    }
}

/// Kind of a team moment, by priority: sacrifice, promotion, fork,
/// capture, check, rescue.
fn team_moment_kind(tactics: &TacticalSummary) -> MomentKind {
    if tactics.is_sacrifice() {
        MomentKind::Sacrifice
    } else if tactics.promotion.is_some() {
        MomentKind::Promotion
    } else if tactics.is_fork() {
        MomentKind::Fork
    } else if tactics.captured.is_some() {
        MomentKind::Capture
    } else if tactics.gives_check {
        MomentKind::Check
    } else if !tactics.rescues.is_empty() {
        MomentKind::Rescue
    } else {
        MomentKind::Quiet
    }
}
