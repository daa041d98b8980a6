// Interactive compress/decompress loop.
//
// A thin dispatcher: it reads a one-letter command and two paths, hands
// them to `io::transform_file`, reports the outcome and asks whether to go
// on. It owns no codec state. Reader and writer are generic so the loop can
// be driven from tests.

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::io::{Direction, FileOptions, IoError, transform_file};

const PROMPT_CHOICE: &str = "Enter 'c' to compress or 'd' to decompress: ";
const PROMPT_INPUT: &str = "Enter input file name: ";
const PROMPT_OUTPUT: &str = "Enter output file name: ";
const PROMPT_CONTINUE: &str = "Press 'q' to quit or any other key to continue: ";

/// Outcome counters for one shell session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub succeeded: u32,
    pub failed: u32,
    pub invalid_choices: u32,
}

pub struct Shell<R, W> {
    input: R,
    output: W,
    opts: FileOptions,
    line: String,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W, opts: FileOptions) -> Self {
        Self {
            input,
            output,
            opts,
            line: String::new(),
        }
    }

    /// Run until the user enters `q` or input ends.
    pub fn run(&mut self) -> io::Result<SessionSummary> {
        let mut summary = SessionSummary::default();
        while let Some(choice) = self.ask(PROMPT_CHOICE)? {
            let Some(direction) = Direction::from_choice(&choice) else {
                writeln!(self.output, "Invalid choice!")?;
                summary.invalid_choices += 1;
                continue;
            };
            let Some(input_path) = self.ask(PROMPT_INPUT)? else {
                break;
            };
            let Some(output_path) = self.ask(PROMPT_OUTPUT)? else {
                break;
            };

            if self.dispatch(direction, Path::new(&input_path), Path::new(&output_path))? {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }

            // Only the first character counts, so "quit" quits too.
            match self.ask(PROMPT_CONTINUE)? {
                Some(answer) if !answer.starts_with('q') => {}
                _ => break,
            }
        }
        self.output.flush()?;
        Ok(summary)
    }

    /// Consume the shell, returning its writer.
    pub fn into_output(self) -> W {
        self.output
    }

    fn dispatch(&mut self, direction: Direction, input: &Path, output: &Path) -> io::Result<bool> {
        log::debug!(
            "shell: {} {} -> {}",
            direction.name(),
            input.display(),
            output.display()
        );
        let result = transform_file(direction, input, output, &self.opts);
        let (ok, message) = match (result, direction) {
            (Ok(_), Direction::Compress) => (true, "File compressed successfully.".to_string()),
            (Ok(_), Direction::Decompress) => (true, "File decompressed successfully.".to_string()),
            (Err(IoError::AlreadyEncoded(_)), _) => (
                false,
                "Compression not possible: file is already compressed.".to_string(),
            ),
            (Err(IoError::NotEncoded), _) => (
                false,
                "Decompression not possible: file is already in original form.".to_string(),
            ),
            (Err(IoError::Io(e)), _) => (false, format!("Error: {}: {e}", input.display())),
            (Err(e), _) => (false, format!("Error: {e}")),
        };
        writeln!(self.output, "{message}")?;
        Ok(ok)
    }

    /// Prompt and read the next non-blank line, trimmed. `None` at EOF.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        loop {
            self.line.clear();
            if self.input.read_line(&mut self.line)? == 0 {
                writeln!(self.output)?;
                return Ok(None);
            }
            let trimmed = self.line.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }
}
