//! MOTORPOOL - Script / Interactive Input Coordinator
//! Supplies lines to the shell and to commands that prompt for data,
//! preferring queued script lines over the live terminal.
//!
//! ## Read modes
//! - `read_line`: next queued script line, else the terminal
//! - `read_interactive_line`: always the terminal, the queue is left alone
//!
//! Either source may deliver [`STOP_SENTINEL`], which cancels the
//! command currently prompting and nothing else.

use std::collections::VecDeque;
use std::fmt::Display;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::{MotorpoolError, Result};
use crate::types::{
    parse_optional, validate_engine_power, validate_name, validate_x, validate_y, FuelType,
    VehicleDraft, VehicleId, VehicleType, MAX_X, MAX_Y,
};

/// Typing this line at any prompt aborts the running command.
pub const STOP_SENTINEL: &str = "\\stop_running_command";

/// Only files with this extension are accepted by `execute_script`.
pub const SCRIPT_EXTENSION: &str = "txt";

/// Result of a read that the user may cancel.
#[derive(Debug, Clone, PartialEq)]
pub enum Input<T> {
    Value(T),
    Cancelled,
}

/// Source of interactive lines (a terminal, a pipe, a test buffer).
pub trait LineSource {
    /// Next line without its line terminator, `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// [`LineSource`] over any buffered reader. Bytes that are not valid
/// UTF-8 are replaced rather than failing the read.
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut raw = Vec::new();
        if self.reader.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&raw);
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Whether a script is feeding the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptState {
    Idle,
    Running(PathBuf),
}

/// The shell's terminal: interactive source, script queue and output.
pub struct InputCoordinator {
    source: Box<dyn LineSource>,
    out: Box<dyn Write>,
    queue: VecDeque<String>,
    state: ScriptState,
}

impl InputCoordinator {
    pub fn new(source: Box<dyn LineSource>, out: Box<dyn Write>) -> Self {
        Self {
            source,
            out,
            queue: VecDeque::new(),
            state: ScriptState::Idle,
        }
    }

    /// Terminal on stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(
            Box::new(ReaderSource::new(io::BufReader::new(io::stdin()))),
            Box::new(io::stdout()),
        )
    }

    /// Where commands print their results.
    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    pub fn script_state(&self) -> &ScriptState {
        &self.state
    }

    pub fn is_running_script(&self) -> bool {
        matches!(self.state, ScriptState::Running(_))
    }

    /// Script lines not consumed yet.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Queue the lines of a script file and enter `Running`.
    ///
    /// Returns the number of queued lines. Rejected while another script
    /// runs, for non-`.txt` paths and for files that cannot be read; the
    /// state stays `Idle` in every failure case.
    pub fn begin_script(&mut self, path: &Path) -> Result<usize> {
        if let ScriptState::Running(current) = &self.state {
            return Err(MotorpoolError::ScriptRejected(format!(
                "{} is already running, nested execute_script is not allowed",
                current.display()
            )));
        }

        let has_txt_extension = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case(SCRIPT_EXTENSION));
        if !has_txt_extension {
            return Err(MotorpoolError::ScriptRejected(format!(
                "{}: only .{} files are supported",
                path.display(),
                SCRIPT_EXTENSION
            )));
        }
        if !path.is_file() {
            return Err(MotorpoolError::ScriptRejected(format!(
                "{}: file not found or not accessible",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            log::warn!("cannot read script {:?}: {}", path, e);
            MotorpoolError::ScriptRejected(format!("{}: {}", path.display(), e))
        })?;

        // Blank lines stay queued: a prompt may take them as "no value"
        let lines: Vec<String> = content
            .lines()
            .map(|line| line.trim().to_string())
            .collect();
        if lines.iter().all(|line| line.is_empty()) {
            return Ok(0);
        }

        let count = lines.len();
        self.queue.extend(lines);
        self.state = ScriptState::Running(path.to_path_buf());
        log::info!("script {:?} started ({} lines)", path, count);
        Ok(count)
    }

    /// Drop any queued lines and return to `Idle`.
    pub fn abort_script(&mut self) {
        if let ScriptState::Running(path) = &self.state {
            log::info!(
                "script {:?} aborted with {} lines unread",
                path,
                self.queue.len()
            );
        }
        self.queue.clear();
        self.state = ScriptState::Idle;
    }

    /// Next command line for the shell loop. `None` at end of input.
    ///
    /// Blank queued lines are skipped. Once the queue is drained the
    /// state drops back to `Idle` before the terminal is read.
    pub fn next_command_line(&mut self) -> Result<Option<String>> {
        while let Some(line) = self.queue.pop_front() {
            if line.is_empty() {
                continue;
            }
            writeln!(self.out, "> {}", line)?;
            return Ok(Some(line));
        }
        self.finish_script();

        write!(self.out, "motorpool> ")?;
        self.out.flush()?;
        Ok(self.source.read_line()?)
    }

    /// Next line for a prompting command: script queue first.
    pub fn read_line(&mut self, prompt: &str) -> Result<Input<String>> {
        write!(self.out, "{}", prompt)?;
        let line = match self.queue.pop_front() {
            Some(line) => {
                writeln!(self.out, "{}", line)?;
                line
            }
            None => {
                self.out.flush()?;
                self.source.read_line()?.ok_or(MotorpoolError::InputClosed)?
            }
        };
        Ok(check_sentinel(line))
    }

    /// Next line from the terminal, even while a script is queued.
    pub fn read_interactive_line(&mut self, prompt: &str) -> Result<Input<String>> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;
        let line = self.source.read_line()?.ok_or(MotorpoolError::InputClosed)?;
        Ok(check_sentinel(line))
    }

    /// Prompt until `parse` accepts the line, reporting each rejection.
    pub fn prompt_parsed<T, F>(&mut self, prompt: &str, parse: F) -> Result<Input<T>>
    where
        F: Fn(&str) -> Result<T>,
    {
        loop {
            let Input::Value(line) = self.read_line(prompt)? else {
                return Ok(Input::Cancelled);
            };
            match parse(&line) {
                Ok(value) => return Ok(Input::Value(value)),
                Err(e) => writeln!(self.out, "  {}", e)?,
            }
        }
    }

    /// [`prompt_parsed`](Self::prompt_parsed) over the terminal only.
    pub fn prompt_interactive<T, F>(&mut self, prompt: &str, parse: F) -> Result<Input<T>>
    where
        F: Fn(&str) -> Result<T>,
    {
        loop {
            let Input::Value(line) = self.read_interactive_line(prompt)? else {
                return Ok(Input::Cancelled);
            };
            match parse(&line) {
                Ok(value) => return Ok(Input::Value(value)),
                Err(e) => writeln!(self.out, "  {}", e)?,
            }
        }
    }

    pub fn prompt_name(&mut self) -> Result<Input<String>> {
        self.prompt_parsed("Name (non-empty): ", validate_name)
    }

    pub fn prompt_x(&mut self) -> Result<Input<i64>> {
        let prompt = format!("Coordinate X (0..{}): ", MAX_X);
        self.prompt_parsed(&prompt, |s| validate_x(parse_number(s, "x")?))
    }

    pub fn prompt_y(&mut self) -> Result<Input<i32>> {
        let prompt = format!("Coordinate Y (0..{}): ", MAX_Y);
        self.prompt_parsed(&prompt, |s| validate_y(parse_number(s, "y")?))
    }

    pub fn prompt_engine_power(&mut self) -> Result<Input<f32>> {
        self.prompt_parsed("Engine power (> 0): ", |s| {
            validate_engine_power(parse_number(s, "engine_power")?)
        })
    }

    pub fn prompt_vehicle_type(&mut self) -> Result<Input<Option<VehicleType>>> {
        let prompt = format!(
            "Vehicle type ({}) or empty for null: ",
            joined(&VehicleType::ALL)
        );
        self.prompt_parsed(&prompt, parse_optional::<VehicleType>)
    }

    pub fn prompt_fuel_type(&mut self) -> Result<Input<Option<FuelType>>> {
        let prompt = format!("Fuel type ({}) or empty for null: ", joined(&FuelType::ALL));
        self.prompt_parsed(&prompt, parse_optional::<FuelType>)
    }

    /// Ask for every field of a vehicle, in order.
    pub fn prompt_draft(&mut self) -> Result<Input<VehicleDraft>> {
        let Input::Value(name) = self.prompt_name()? else {
            return Ok(Input::Cancelled);
        };
        let Input::Value(x) = self.prompt_x()? else {
            return Ok(Input::Cancelled);
        };
        let Input::Value(y) = self.prompt_y()? else {
            return Ok(Input::Cancelled);
        };
        let Input::Value(engine_power) = self.prompt_engine_power()? else {
            return Ok(Input::Cancelled);
        };
        let Input::Value(vehicle_type) = self.prompt_vehicle_type()? else {
            return Ok(Input::Cancelled);
        };
        let Input::Value(fuel_type) = self.prompt_fuel_type()? else {
            return Ok(Input::Cancelled);
        };

        Ok(Input::Value(VehicleDraft {
            name,
            x,
            y,
            engine_power,
            vehicle_type,
            fuel_type,
        }))
    }

    /// Engine power threshold for `remove_greater`.
    pub fn prompt_threshold(&mut self) -> Result<Input<f32>> {
        self.prompt_parsed("Engine power threshold (>= 0): ", parse_threshold)
    }

    /// A non-empty credential, read from the terminal only.
    pub fn prompt_credential(&mut self, prompt: &str) -> Result<Input<String>> {
        self.prompt_interactive(prompt, |s| {
            let value = s.trim();
            if value.is_empty() {
                return Err(MotorpoolError::InvalidArgument(
                    "value must not be empty".to_string(),
                ));
            }
            Ok(value.to_string())
        })
    }

    fn finish_script(&mut self) {
        if let ScriptState::Running(path) = &self.state {
            log::info!("script {:?} finished", path);
            self.state = ScriptState::Idle;
        }
    }
}

fn check_sentinel(line: String) -> Input<String> {
    if line.trim() == STOP_SENTINEL {
        Input::Cancelled
    } else {
        Input::Value(line)
    }
}

fn joined<T: Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_number<T: std::str::FromStr>(input: &str, field: &'static str) -> Result<T> {
    input
        .trim()
        .parse()
        .map_err(|_| MotorpoolError::validation(field, format!("'{}' is not a number", input.trim())))
}

/// A positive vehicle id.
pub fn parse_id(input: &str) -> Result<VehicleId> {
    match input.trim().parse::<VehicleId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(MotorpoolError::InvalidArgument(format!(
            "id must be a positive integer, got '{}'",
            input.trim()
        ))),
    }
}

/// A finite, non-negative engine power threshold.
pub fn parse_threshold(input: &str) -> Result<f32> {
    match input.trim().parse::<f32>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(MotorpoolError::InvalidArgument(format!(
            "threshold must be a number >= 0, got '{}'",
            input.trim()
        ))),
    }
}
