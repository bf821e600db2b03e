//! Terminal input: the human selector and the human opponent.
//!
//! # Sync/Async Bridge
//!
//! [`Selector`] and [`Opponent`] are synchronous, but stdin is read with
//! `tokio` so a selection can time out. Each call uses
//! [`tokio::task::block_in_place`] with the current runtime handle to wait
//! on the async read.

use std::sync::Arc;
use std::time::Duration;

use parliament_board::Position;
use parliament_core::{Opponent, OpponentError, SelectionError, Selector};
use parliament_types::{Move, Proposal};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Line reader over stdin, shared by everything that prompts.
#[derive(Clone)]
pub struct TerminalInput {
    lines: Arc<Mutex<Lines<BufReader<Stdin>>>>,
}

impl TerminalInput {
    /// Wrap the process's stdin.
    pub fn stdin() -> Self {
        Self {
            lines: Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines())),
        }
    }

    /// Read one trimmed line, waiting at most `timeout` when given.
    ///
    /// `Ok(None)` means end of input or timeout.
    fn read_line(&self, timeout: Option<Duration>) -> Result<Option<String>, String> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| format!("no tokio runtime available: {e}"))?;
        let lines = Arc::clone(&self.lines);
        tokio::task::block_in_place(|| {
            handle.block_on(async move {
                let mut lines = lines.lock().await;
                let next = match timeout {
                    Some(limit) => match tokio::time::timeout(limit, lines.next_line()).await {
                        Ok(line) => line,
                        Err(_elapsed) => return Ok(None),
                    },
                    None => lines.next_line().await,
                };
                next.map(|line| line.map(|l| l.trim().to_owned()))
                    .map_err(|e| e.to_string())
            })
        })
    }
}

/// Prompts on the terminal for a proposal index.
///
/// An empty line, end of input or a timeout abstains. Text that is not a
/// number is passed on as an out-of-range index so the moderator asks
/// again.
pub struct TerminalSelector {
    input: TerminalInput,
    timeout: Duration,
}

impl TerminalSelector {
    /// Create a selector that waits `timeout` for each answer.
    pub const fn new(input: TerminalInput, timeout: Duration) -> Self {
        Self { input, timeout }
    }
}

impl Selector for TerminalSelector {
    fn select(&mut self, proposals: &[Proposal], round: u32) -> Result<usize, SelectionError> {
        crate::render::prompt(&selection_prompt(round, proposals.len()));
        let answer = self
            .input
            .read_line(Some(self.timeout))
            .map_err(|message| SelectionError::Internal { message })?;
        match answer.as_deref() {
            None => {
                debug!(round, "Selection timed out or input closed");
                Err(SelectionError::NoSelection)
            }
            Some("") => Err(SelectionError::NoSelection),
            Some(text) => Ok(text.parse::<usize>().unwrap_or_else(|_e| {
                warn!(round, input = text, "Not a number");
                usize::MAX
            })),
        }
    }
}

/// Prompt naming the inclusive range of valid indices.
fn selection_prompt(round: u32, offered: usize) -> String {
    format!(
        "Round {round}: choose 0-{} (enter = top proposal) > ",
        offered.saturating_sub(1)
    )
}

/// Reads the opponent's moves in UCI notation from the terminal.
///
/// `quit` or end of input resigns; unparsable or illegal moves are asked
/// for again.
pub struct HumanOpponent {
    input: TerminalInput,
}

impl HumanOpponent {
    /// Create an opponent reading from `input`.
    pub const fn new(input: TerminalInput) -> Self {
        Self { input }
    }
}

impl Opponent for HumanOpponent {
    fn choose(&mut self, position: &Position, legal: &[Move]) -> Result<Move, OpponentError> {
        loop {
            crate::render::prompt(&format!("{} to move (uci, or quit) > ", position.side_to_move()));
            let line = self
                .input
                .read_line(None)
                .map_err(|message| OpponentError::Internal { message })?;
            let Some(text) = line else {
                return Err(OpponentError::Resigned);
            };
            if text == "quit" {
                return Err(OpponentError::Resigned);
            }
            match text.parse::<Move>() {
                Ok(mv) if legal.contains(&mv) => return Ok(mv),
                Ok(mv) => crate::render::notice(&format!("{mv} is not legal here")),
                Err(e) => crate::render::notice(&format!("{e}")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_the_last_valid_index() {
        assert_eq!(
            selection_prompt(4, 3),
            "Round 4: choose 0-2 (enter = top proposal) > "
        );
        assert_eq!(
            selection_prompt(0, 1),
            "Round 0: choose 0-0 (enter = top proposal) > "
        );
    }
}
