//! Interactive terminal prompts.

use std::io::{self, BufRead, Write};

use microblog_client::Confirm;

/// Asks yes/no questions on a terminal.
///
/// Re-asks until the answer is `yes`/`y` or `no`/`n`. End of input counts as
/// `no`. Prompts go to `output` (stderr in the binary) so stdout carries only
/// command output.
#[derive(Debug)]
pub struct TerminalConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalConfirm<R, W> {
    /// Prompt reading from `input` and writing to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask for one line of free text. `None` at end of input.
    pub fn ask_line(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{question} ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl<R: BufRead, W: Write> Confirm for TerminalConfirm<R, W> {
    fn confirm(&mut self, question: &str) -> bool {
        let prompt = format!("{question} (yes/no):");
        loop {
            match self.ask_line(&prompt) {
                Ok(Some(answer)) => match answer.to_lowercase().as_str() {
                    "y" | "yes" => return true,
                    "n" | "no" => return false,
                    _ => {},
                },
                Ok(None) => return false,
                Err(e) => {
                    tracing::warn!(error = %e, "prompt failed, treating as no");
                    return false;
                },
            }
        }
    }
}
