//! FILENAME: app/src/commands.rs
//! PURPOSE: Parses and executes shell commands against one sheet.
//! CONTEXT: One command per input line. Blank lines and lines starting with
//! `#` are skipped. A failing command prints `error: <message>` to the
//! output and the shell moves on to the next line.

use std::io::{BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use engine::{Position, Sheet, SheetConfig};
use log::debug;

use crate::logging::{log_enter, log_exit};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `set <A1> <text...>`; the text may be empty.
    Set { pos: Position, text: String },
    Clear(Position),
    /// Prints `value<TAB>text`.
    Get(Position),
    Values,
    Texts,
    /// Prints `rows cols`.
    Size,
    /// Prints the sheet counters as JSON.
    Stats,
}

impl Command {
    /// Parses one input line. Returns `Ok(None)` for blank and comment lines.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            return Ok(None);
        }

        let line = line.trim_start();
        let (name, rest) = match line.split_once(' ') {
            Some((name, rest)) => (name, Some(rest)),
            None => (line, None),
        };

        let command = match name {
            "set" => {
                let rest = rest.ok_or_else(|| anyhow!("set: missing cell reference"))?;
                // Only the first space separates the address from the text.
                let (addr, text) = rest.split_once(' ').unwrap_or((rest, ""));
                Command::Set {
                    pos: parse_position(addr)?,
                    text: text.to_string(),
                }
            }
            "clear" => Command::Clear(single_position(name, rest)?),
            "get" => Command::Get(single_position(name, rest)?),
            "values" => no_arguments(name, rest, Command::Values)?,
            "texts" => no_arguments(name, rest, Command::Texts)?,
            "size" => no_arguments(name, rest, Command::Size)?,
            "stats" => no_arguments(name, rest, Command::Stats)?,
            other => bail!("unknown command: {}", other),
        };
        Ok(Some(command))
    }
}

fn parse_position(addr: &str) -> Result<Position> {
    Position::parse(&addr.to_ascii_uppercase())
        .ok_or_else(|| anyhow!("invalid cell reference: {}", addr))
}

fn single_position(name: &str, rest: Option<&str>) -> Result<Position> {
    match rest.map(str::trim) {
        Some(addr) if !addr.is_empty() && !addr.contains(char::is_whitespace) => {
            parse_position(addr)
        }
        Some(addr) if !addr.is_empty() => bail!("{}: expected one cell reference", name),
        _ => bail!("{}: missing cell reference", name),
    }
}

fn no_arguments(name: &str, rest: Option<&str>, command: Command) -> Result<Command> {
    match rest.map(str::trim) {
        Some(extra) if !extra.is_empty() => bail!("{}: unexpected argument: {}", name, extra),
        _ => Ok(command),
    }
}

/// A sheet plus the command loop that drives it.
pub struct Shell {
    sheet: Sheet,
}

impl Shell {
    pub fn new(config: SheetConfig) -> Self {
        Shell {
            sheet: Sheet::with_config(config),
        }
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    pub fn execute<W: Write>(&mut self, command: &Command, out: &mut W) -> Result<()> {
        match command {
            Command::Set { pos, text } => self.sheet.set_cell(*pos, text)?,
            Command::Clear(pos) => self.sheet.clear_cell(*pos)?,
            Command::Get(pos) => {
                let value = self.sheet.value(*pos)?;
                let text = self.sheet.text(*pos)?;
                writeln!(out, "{}\t{}", value, text)?;
            }
            Command::Values => self.sheet.print_values(out)?,
            Command::Texts => self.sheet.print_texts(out)?,
            Command::Size => {
                let size = self.sheet.printable_size();
                writeln!(out, "{} {}", size.rows, size.cols)?;
            }
            Command::Stats => {
                let json = serde_json::to_string(&self.sheet.stats())
                    .context("failed to serialize stats")?;
                writeln!(out, "{}", json)?;
            }
        }
        Ok(())
    }

    /// Runs a single line, reporting a failure on `out` instead of returning it.
    /// Returns whether the line succeeded. Only output failures are errors.
    pub fn run_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<bool> {
        let outcome = Command::parse(line).and_then(|command| match command {
            Some(command) => self.execute(&command, out),
            None => Ok(()),
        });

        match outcome {
            Ok(()) => Ok(true),
            Err(err) => {
                debug!(target: "cmd", "line {:?} failed: {}", line, err);
                writeln!(out, "error: {}", err).context("failed to write output")?;
                Ok(false)
            }
        }
    }

    /// Runs every line of `input`. Returns the number of failed lines.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<usize> {
        log_enter!("cmd", "run");
        let mut failures = 0;
        for line in input.lines() {
            let line = line.context("failed to read input")?;
            if !self.run_line(&line, out)? {
                failures += 1;
            }
        }
        out.flush().context("failed to flush output")?;
        log_exit!("cmd", "run", "{} failed line(s)", failures);
        Ok(failures)
    }
}
