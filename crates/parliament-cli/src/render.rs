//! Report sinks: the terminal renderer and the JSON-lines writer.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::Path;

use parliament_core::{ReportSink, RoundReport};
use parliament_types::GameOutcome;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::warn;

use crate::error::CliError;

/// Width of a full state bar.
const BAR_WIDTH: u32 = 10;

/// Write a prompt without a trailing newline.
pub fn prompt(text: &str) {
    let mut out = std::io::stdout().lock();
    if let Err(e) = write!(out, "{text}").and_then(|()| out.flush()) {
        warn!(error = %e, "Failed to write prompt");
    }
}

/// Write one line to the terminal.
pub fn notice(text: &str) {
    let mut out = std::io::stdout().lock();
    if let Err(e) = writeln!(out, "{text}") {
        warn!(error = %e, "Failed to write to terminal");
    }
}

fn bar(value: Decimal) -> String {
    let filled = value
        .clamp(Decimal::ZERO, Decimal::ONE)
        .saturating_mul(Decimal::from(BAR_WIDTH))
        .round()
        .to_u32()
        .unwrap_or(0);
    let empty = BAR_WIDTH.saturating_sub(filled);
    format!(
        "{}{}",
        "#".repeat(usize::try_from(filled).unwrap_or(0)),
        ".".repeat(usize::try_from(empty).unwrap_or(0))
    )
}

/// Renders each round as a short block of text on stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalSink;

impl TerminalSink {
    fn render(report: &RoundReport) -> Result<String, std::fmt::Error> {
        let mut text = String::new();
        writeln!(text)?;
        writeln!(text, "== Round {} ({}) ==", report.round, report.side)?;

        for (rank, proposal) in report.proposals.iter().enumerate() {
            let marker = if Some(rank) == report.winner_index { '>' } else { ' ' };
            writeln!(
                text,
                "{marker}{rank:>3}. {} {:<6} {} {:>8}  \"{}\"",
                proposal.proposer, proposal.piece, proposal.mv, proposal.score, proposal.argument.phrase
            )?;
        }

        match (report.mover, report.consensus) {
            (Some(mover), Some(consensus)) => {
                let verdict = if consensus { "consensus" } else { "contested" };
                writeln!(text, "  {mover} plays {} ({verdict}) -- {}", report.mv, report.memory_entry.narrative)?;
            }
            _ => writeln!(text, "  opponent plays {} -- {}", report.mv, report.memory_entry.narrative)?,
        }

        for change in &report.relationship_changes {
            writeln!(
                text,
                "  {:?} {}<->{}: trust {} coop {}",
                change.kind, change.low, change.high, change.mean_trust, change.cooperation
            )?;
        }

        let psychology = &report.psychology;
        writeln!(text, "  cohesion     [{}] {}", bar(psychology.cohesion), psychology.cohesion)?;
        writeln!(text, "  morale       [{}] {}", bar(psychology.morale), psychology.morale)?;
        writeln!(text, "  coordination [{}] {}", bar(psychology.coordination), psychology.coordination)?;
        writeln!(text, "  leadership   [{}] {}", bar(psychology.leadership), psychology.leadership)?;
        if let Some(preview) = report.impact_preview {
            writeln!(
                text,
                "  expected impact: morale {} confidence {} trust {}",
                preview.morale, preview.confidence, preview.trust
            )?;
        }
        Ok(text)
    }
}

impl ReportSink for TerminalSink {
    fn on_round(&mut self, report: &RoundReport) {
        match Self::render(report) {
            Ok(text) => notice(text.trim_end()),
            Err(e) => warn!(error = %e, round = report.round, "Failed to render round"),
        }
    }

    fn on_game_over(&mut self, outcome: GameOutcome) {
        notice(&format!("\nGame over: {outcome}"));
    }
}

/// Appends one JSON object per round to a file.
pub struct JsonLinesSink {
    writer: BufWriter<File>,
}

impl JsonLinesSink {
    /// Create (or truncate) the report file.
    pub fn create(path: &Path) -> Result<Self, CliError> {
        let file = File::create(path).map_err(|source| CliError::Report {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl ReportSink for JsonLinesSink {
    fn on_round(&mut self, report: &RoundReport) {
        let written = serde_json::to_writer(&mut self.writer, report)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"));
        if let Err(e) = written {
            warn!(error = %e, round = report.round, "Failed to write round report");
        }
    }

    fn on_game_over(&mut self, outcome: GameOutcome) {
        if let Err(e) = self.writer.flush() {
            warn!(error = %e, %outcome, "Failed to flush round reports");
        }
    }
}

/// Forwards every report to several sinks in order.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn ReportSink>>,
}

impl FanoutSink {
    /// Add a sink.
    pub fn push(&mut self, sink: Box<dyn ReportSink>) {
        self.sinks.push(sink);
    }
}

impl ReportSink for FanoutSink {
    fn on_round(&mut self, report: &RoundReport) {
        for sink in &mut self.sinks {
            sink.on_round(report);
        }
    }

    fn on_game_over(&mut self, outcome: GameOutcome) {
        for sink in &mut self.sinks {
            sink.on_game_over(outcome);
        }
    }
}
