//! Line-oriented front end driving a [`Session`].
//!
//! A plain line is calculated. While the buffer is being composed (after
//! `:mr`, `:back` or a keypad command) the line is appended to it, as it is
//! when the line starts with a binary operator. Otherwise the line replaces
//! the buffer. Lines that start with `:` are session commands.

use crate::calculator::{Constant, Function, copy_to_clipboard, is_binary_operator};
use crate::session::{History, MemoryOp, Session, SessionState};
use anyhow::{Context, Result, bail};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A session command entered as `:name [arg]`.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Calculate,
    Undo,
    Clear,
    Backspace,
    Memory(MemoryOp),
    Key(Key),
    /// Load a history entry, numbered from 1.
    Reuse(usize),
    ShowMemory,
    ShowBuffer,
    History,
    ClearHistory,
    Export(PathBuf),
    Help,
    Quit,
}

/// Keypad keys that have no plain-text equivalent in a typed line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Function(Function),
    Constant(Constant),
    Power,
    PowerOfTen,
    Percent,
    Factorial,
}

impl Key {
    fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "pow" => Self::Power,
            "10x" => Self::PowerOfTen,
            "%" => Self::Percent,
            "!" => Self::Factorial,
            other => {
                if let Some(function) = Function::from_name(other) {
                    Self::Function(function)
                } else {
                    Self::Constant(Constant::from_name(other)?)
                }
            }
        };
        Some(key)
    }
}

/// One line of REPL input.
#[derive(Clone, Debug, PartialEq)]
pub enum Line {
    Command(Command),
    Expression(String),
    Blank,
}

const HELP: &str = "\
Enter an expression to calculate it, or one of:
  :calc           recalculate the current buffer
  :undo           restore the buffer from before the last edit
  :back           delete the last character of the buffer
  :clear          clear the buffer
  :buffer         show the buffer
  :mc :mr :m+ :m- memory clear / recall / add / subtract
  :memory         show the memory register
  :sqrt :sin :cos :tan :log :log10
                  append a function call
  :pi :e          append a constant
  :pow :10x :% :! power, power of ten, percent, factorial keys
  :history        list previous calculations
  :reuse <n>      load history entry n into the buffer
  :clear-history  forget previous calculations
  :export <path>  write the history to a text file
  :quit           exit";

/// Parse one input line.
pub fn parse_line(line: &str) -> Result<Line> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Line::Blank);
    }
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Line::Expression(line.to_string()));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    let command = match name {
        "calc" | "=" => Command::Calculate,
        "undo" | "u" => Command::Undo,
        "clear" | "c" => Command::Clear,
        "back" | "b" => Command::Backspace,
        "buffer" => Command::ShowBuffer,
        "memory" | "m" => Command::ShowMemory,
        "history" | "h" => Command::History,
        "clear-history" => Command::ClearHistory,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        "export" if arg.is_empty() => bail!(":export needs a file path"),
        "export" => Command::Export(PathBuf::from(arg)),
        "reuse" | "r" => match arg.parse::<usize>() {
            Ok(n) if n > 0 => Command::Reuse(n),
            _ => bail!(":reuse needs a history entry number"),
        },
        other => {
            if let Ok(op) = other.parse::<MemoryOp>() {
                Command::Memory(op)
            } else if let Some(key) = Key::from_name(other) {
                Command::Key(key)
            } else {
                bail!("unknown command ':{}' (try :help)", other)
            }
        }
    };
    Ok(Line::Command(command))
}

/// Load a history saved by [`save_history`]. A missing file is empty.
pub fn load_history(path: &Path) -> Result<History> {
    if !path.exists() {
        return Ok(History::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid history file {}", path.display()))
}

pub fn save_history(path: &Path, history: &History) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(history)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write history {}", path.display()))
}

pub fn export_history(path: &Path, history: &History) -> Result<()> {
    std::fs::write(path, history.export_text())
        .with_context(|| format!("Failed to export history to {}", path.display()))?;
    info!(path = %path.display(), entries = history.len(), "exported history");
    Ok(())
}

/// Interactive driver around a session.
pub struct Repl {
    session: Session,
    history_path: Option<PathBuf>,
    copy_results: bool,
}

impl Repl {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            history_path: None,
            copy_results: false,
        }
    }

    /// Save the history to `path` after every successful calculation.
    pub fn with_history_path(mut self, path: Option<PathBuf>) -> Self {
        self.history_path = path;
        self
    }

    pub fn with_clipboard(mut self, copy_results: bool) -> Self {
        self.copy_results = copy_results;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Read lines from `input` until end of input or `:quit`.
    pub fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> Result<()> {
        for line in input.lines() {
            let line = line.context("Failed to read input")?;
            let keep_going = match parse_line(&line) {
                Ok(parsed) => self.handle(parsed, out)?,
                Err(err) => {
                    writeln!(out, "{}", err)?;
                    true
                }
            };
            if !keep_going {
                break;
            }
        }
        Ok(())
    }

    /// Apply one line to the session. Returns `false` on quit.
    pub fn handle(&mut self, line: Line, out: &mut impl Write) -> Result<bool> {
        match line {
            Line::Blank => {}
            Line::Expression(text) => {
                let append = self.session.state() == SessionState::Composing
                    || text.chars().next().is_some_and(is_binary_operator);
                if append && !self.session.submit(&text) {
                    writeln!(out, "Rejected input")?;
                    return Ok(true);
                }
                if !append {
                    self.session.replace(&text);
                }
                self.calculate(out)?;
            }
            Line::Command(command) => return self.command(command, out),
        }
        Ok(true)
    }

    fn command(&mut self, command: Command, out: &mut impl Write) -> Result<bool> {
        match command {
            Command::Calculate => self.calculate(out)?,
            Command::Undo => {
                if !self.session.undo() {
                    writeln!(out, "Nothing to undo")?;
                }
                self.show_buffer(out)?;
            }
            Command::Clear => {
                self.session.clear();
                self.show_buffer(out)?;
            }
            Command::Backspace => {
                self.session.backspace();
                self.show_buffer(out)?;
            }
            Command::Memory(op) => match self.session.memory_op(op) {
                Ok(_) if op == MemoryOp::Recall => self.show_buffer(out)?,
                Ok(value) => writeln!(out, "M = {}", self.format(value))?,
                Err(err) => writeln!(out, "Error: {}", err)?,
            },
            Command::Key(key) => {
                if !self.press(key) {
                    writeln!(out, "Rejected input")?;
                }
                self.show_buffer(out)?;
            }
            Command::Reuse(n) => {
                let index = n.checked_sub(1);
                match index.filter(|i| self.session.reuse(*i)) {
                    Some(i) => writeln!(out, "{}", self.session.history().entries()[i])?,
                    None => writeln!(out, "No history entry {}", n)?,
                }
            }
            Command::ShowMemory => {
                writeln!(out, "M = {}", self.format(self.session.memory()))?;
            }
            Command::ShowBuffer => self.show_buffer(out)?,
            Command::History => {
                if self.session.history().is_empty() {
                    writeln!(out, "No history")?;
                }
                for (i, entry) in self.session.history().entries().iter().enumerate() {
                    writeln!(out, "{}: {}", i + 1, entry)?;
                }
            }
            Command::ClearHistory => {
                self.session.clear_history();
                self.persist_history();
            }
            Command::Export(path) => {
                if self.session.history().is_empty() {
                    writeln!(out, "No history to export")?;
                } else if let Err(err) = export_history(&path, self.session.history()) {
                    writeln!(out, "{:#}", err)?;
                }
            }
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn press(&mut self, key: Key) -> bool {
        match key {
            Key::Function(function) => self.session.enter_function(function),
            Key::Constant(constant) => self.session.enter_constant(constant),
            Key::Power => self.session.power(),
            Key::PowerOfTen => self.session.power_of_ten(),
            Key::Percent => self.session.percent(),
            Key::Factorial => self.session.factorial(),
        }
    }

    fn calculate(&mut self, out: &mut impl Write) -> Result<()> {
        match self.session.calculate() {
            Ok(evaluation) => {
                writeln!(out, "{}", evaluation.formatted)?;
                if self.copy_results
                    && let Err(err) = copy_to_clipboard(&evaluation.formatted)
                {
                    warn!("{:#}", err);
                }
                self.persist_history();
            }
            Err(err) => writeln!(out, "Error: {}", err)?,
        }
        Ok(())
    }

    fn show_buffer(&self, out: &mut impl Write) -> Result<()> {
        let buffer = self.session.buffer();
        writeln!(out, "{}", if buffer.is_empty() { "0" } else { buffer })?;
        Ok(())
    }

    fn format(&self, value: f64) -> String {
        let settings = self.session.settings();
        crate::calculator::format_number(
            value,
            settings.precision(),
            settings.thousands_separator(),
        )
    }

    fn persist_history(&self) {
        if let Some(path) = &self.history_path
            && let Err(err) = save_history(path, self.session.history())
        {
            warn!("{:#}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::FormatSettings;

    fn run(repl: &mut Repl, script: &str) -> String {
        let mut out = Vec::new();
        repl.run(script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn repl() -> Repl {
        Repl::new(Session::new(FormatSettings::new(2, true)))
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("  ").unwrap(), Line::Blank);
        assert_eq!(
            parse_line(" 2+2 ").unwrap(),
            Line::Expression("2+2".into())
        );
        assert_eq!(
            parse_line(":m+").unwrap(),
            Line::Command(Command::Memory(MemoryOp::Add))
        );
        assert_eq!(
            parse_line(":export out.txt").unwrap(),
            Line::Command(Command::Export(PathBuf::from("out.txt")))
        );
        assert!(parse_line(":export").is_err());
        assert!(parse_line(":bogus").is_err());
    }

    #[test]
    fn test_parse_keys_and_reuse() {
        assert_eq!(
            parse_line(":sqrt").unwrap(),
            Line::Command(Command::Key(Key::Function(Function::Sqrt)))
        );
        assert_eq!(
            parse_line(":pi").unwrap(),
            Line::Command(Command::Key(Key::Constant(Constant::Pi)))
        );
        assert_eq!(
            parse_line(":!").unwrap(),
            Line::Command(Command::Key(Key::Factorial))
        );
        assert_eq!(
            parse_line(":%").unwrap(),
            Line::Command(Command::Key(Key::Percent))
        );
        assert_eq!(
            parse_line(":reuse 2").unwrap(),
            Line::Command(Command::Reuse(2))
        );
        assert!(parse_line(":reuse").is_err());
        assert!(parse_line(":reuse 0").is_err());
    }

    #[test]
    fn test_calculations() {
        let mut repl = repl();
        let output = run(&mut repl, "2+3*4\n1/0\n1000*1000\n");
        assert_eq!(
            output,
            "14.00\nError: division by zero\n1,000,000.00\n"
        );
        assert_eq!(repl.session().history().len(), 2);
    }

    #[test]
    fn test_undo_and_recalculate() {
        let mut repl = repl();
        let output = run(&mut repl, "2*8\n:back\n:calc\n:undo\n:calc\n");
        assert_eq!(output, "16.00\n2*\nError: expression is empty or incomplete\n2*8\n16.00\n");
    }

    #[test]
    fn test_memory_commands() {
        let mut repl = repl();
        let output = run(&mut repl, "1500\n:m+\n:clear\n:mr\n:memory\n:mc\n");
        assert_eq!(output, "1,500.00\nM = 1,500.00\n0\n1500\nM = 1,500.00\nM = 0.00\n");
    }

    #[test]
    fn test_memory_recall_composes() {
        let mut repl = repl();
        let output = run(&mut repl, "7\n:m+\n:clear\n:mr\n*2\n");
        assert_eq!(output, "7.00\nM = 7.00\n0\n7\n14.00\n");

        let mut repl = self::repl();
        let output = run(&mut repl, "4\n:m+\n:clear\n3\n+\n:mr\n:calc\n");
        assert_eq!(output, "4.00\nM = 4.00\n0\n3.00\nError: expression is empty or incomplete\n3+4\n7.00\n");
    }

    #[test]
    fn test_result_continues_with_operator() {
        let mut repl = repl();
        let output = run(&mut repl, "2*3\n*4\n10\n");
        assert_eq!(output, "6.00\n24.00\n10.00\n");
        assert_eq!(repl.session().buffer(), "10");
    }

    #[test]
    fn test_operator_collision_rejected() {
        let mut repl = repl();
        let output = run(&mut repl, "5+\n+3\n:buffer\n");
        assert_eq!(
            output,
            "Error: expression is empty or incomplete\nRejected input\n5+\n"
        );
    }

    #[test]
    fn test_typed_line_is_one_undo_step() {
        let mut repl = repl();
        let output = run(&mut repl, "2+2\n3+3\n:undo\n:undo\n");
        assert_eq!(output, "4.00\n6.00\n2+2\n0\n");
    }

    #[test]
    fn test_keypad_commands() {
        let mut repl = repl();
        let output = run(&mut repl, ":sqrt\n16\n");
        assert_eq!(output, "sqrt(\n4.00\n");

        let mut repl = self::repl();
        let output = run(&mut repl, ":!\n3\n:!\n:!\n:calc\n");
        assert_eq!(output, "Rejected input\n0\n3.00\n3!\n3!!\n720.00\n");

        let mut repl = self::repl();
        let output = run(&mut repl, "50\n:%\n:calc\n:clear\n:pi\n");
        assert_eq!(output, "50.00\n50/100\n0.50\n0\n3.14159265359\n");
    }

    #[test]
    fn test_reuse_history_entry() {
        let mut repl = repl();
        let output = run(&mut repl, "999+1\n2*3\n:history\n:reuse 1\n:m+\n:reuse 5\n");
        assert_eq!(
            output,
            "1,000.00\n6.00\n1: 999+1 = 1,000.00\n2: 2*3 = 6.00\n999+1 = 1,000.00\nM = 1,000.00\nNo history entry 5\n"
        );
        assert_eq!(repl.session().buffer(), "999+1");
    }

    #[test]
    fn test_quit_stops_reading() {
        let mut repl = repl();
        let output = run(&mut repl, "1+1\n:quit\n2+2\n");
        assert_eq!(output, "2.00\n");
    }

    #[test]
    fn test_history_export_and_persist() {
        let dir = tempfile::tempdir().unwrap();
        let export = dir.path().join("export.txt");
        let saved = dir.path().join("nested").join("history.json");

        let mut repl = repl().with_history_path(Some(saved.clone()));
        run(
            &mut repl,
            &format!("5!\nsqrt(16\n:export {}\n", export.display()),
        );

        let text = std::fs::read_to_string(&export).unwrap();
        assert_eq!(text, "5! = 120.00\nsqrt(16 = 4.00");

        let loaded = load_history(&saved).unwrap();
        assert_eq!(&loaded, repl.session().history());
    }

    #[test]
    fn test_load_missing_history() {
        let dir = tempfile::tempdir().unwrap();
        let history = load_history(&dir.path().join("none.json")).unwrap();
        assert!(history.is_empty());
    }
}
