//! Line-oriented review session.
//!
//! Every input line is one command, split into words and parsed with clap.
//! Double quotes group a word that contains spaces. Free text runs to the end
//! of the line exactly as typed; `\n` inside it starts a new line.
//! Lookups that find nothing are reported and the session carries on. Other
//! errors abort a script but only get printed in an interactive session.

use super::kinds::write_kinds;
use anyhow::Context;
use clap::{error::ErrorKind, Parser};
use margin::{
    sink::FileSink, Config, DeliverySink, DocumentAccess, DocumentKey, FuzzyPicker, Session,
};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, IsTerminal, Write},
    path::{Path, PathBuf},
};

const PROMPT: &str = "margin> ";

/// One command of a review session.
#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
pub enum ReplCommand {
    /// Open a file, or re-read it if already open
    Open { path: PathBuf },
    /// Annotate a line
    Add {
        path: PathBuf,
        line: u32,
        kind: String,
        #[arg(allow_hyphen_values = true)]
        text: String,
    },
    /// Replace the text of an annotation
    Edit {
        path: PathBuf,
        line: u32,
        #[arg(allow_hyphen_values = true)]
        text: String,
    },
    /// Remove an annotation
    Delete { path: PathBuf, line: u32 },
    /// List the annotations of a file, or of every file
    Show { path: Option<PathBuf> },
    /// Jump to the next annotation after a line
    Next { path: PathBuf, line: u32 },
    /// Jump to the previous annotation before a line
    Prev { path: PathBuf, line: u32 },
    /// Insert text before a line of an open file
    Insert {
        path: PathBuf,
        at: u32,
        #[arg(allow_hyphen_values = true)]
        text: String,
    },
    /// Remove lines from an open file
    Remove {
        path: PathBuf,
        start: u32,
        #[arg(default_value_t = 1)]
        count: u32,
    },
    /// Move lines of an open file before another line
    Move {
        path: PathBuf,
        start: u32,
        count: u32,
        to: u32,
    },
    /// Re-read an open file from disk
    Reload { path: PathBuf },
    /// Fuzzy-find an annotation across all files
    Pick {
        #[arg(allow_hyphen_values = true)]
        query: Option<String>,
    },
    /// Export every annotation as a report
    Export {
        /// Write the report to this file instead of the configured sinks
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Drop the annotations of a file, or of every file
    Clear { path: Option<PathBuf> },
    /// List the annotation kinds
    Kinds,
    /// End the session
    #[command(alias = "exit")]
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Print errors and keep going. `prompt` shows a prompt before each command.
    Interactive { prompt: bool },
    /// Stop at the first error.
    Script,
}

pub struct Repl<'a, W> {
    session: &'a mut Session,
    out: W,
}

impl<'a, W: Write> Repl<'a, W> {
    pub fn new(session: &'a mut Session, out: W) -> Self {
        Self { session, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Run commands from `input` until it ends or a `quit` command.
    pub fn run(&mut self, input: impl BufRead, mode: Mode) -> anyhow::Result<()> {
        self.prompt(mode)?;
        for (index, line) in input.lines().enumerate() {
            let line = line.context("Failed to read command")?;
            let command = line.trim();
            if command.is_empty() || command.starts_with('#') {
                self.prompt(mode)?;
                continue;
            }

            match self.execute(command) {
                Ok(Flow::Quit) => return Ok(()),
                Ok(Flow::Continue) => {},
                Err(err) if is_informational(&err) => writeln!(self.out, "{err}")?,
                Err(err) => match mode {
                    Mode::Script => {
                        return Err(err.context(format!("Command on line {} failed", index + 1)));
                    },
                    Mode::Interactive { .. } => self.report_error(&err)?,
                },
            }
            self.prompt(mode)?;
        }
        Ok(())
    }

    /// Parse and run a single command line.
    pub fn execute(&mut self, line: &str) -> anyhow::Result<Flow> {
        let command = match ReplCommand::try_parse_from(split_words(line)) {
            Ok(command) => command,
            Err(err) if is_help(err.kind()) => {
                write!(self.out, "{err}")?;
                return Ok(Flow::Continue);
            },
            Err(err) => return Err(err.into()),
        };
        tracing::debug!("command: {command:?}");
        self.dispatch(command)
    }

    fn dispatch(&mut self, command: ReplCommand) -> anyhow::Result<Flow> {
        match command {
            ReplCommand::Open { path } => {
                let document = self.session.open(&path)?;
                let lines = self.session.host().line_count(&document).unwrap_or(0);
                let shown = document.short_path(self.session.base());
                writeln!(self.out, "opened {shown} ({lines} lines)")?;
            },
            ReplCommand::Add {
                path,
                line,
                kind,
                text,
            } => {
                let replaced = self.session.add(&path, line, &kind, &unescape(&text))?;
                let verb = if replaced.is_some() { "replaced" } else { "added" };
                writeln!(self.out, "{verb} {} at {}:{line}", kind.to_uppercase(), path.display())?;
            },
            ReplCommand::Edit { path, line, text } => {
                self.session.edit(&path, line, &unescape(&text))?;
                writeln!(self.out, "edited {}:{line}", path.display())?;
            },
            ReplCommand::Delete { path, line } => {
                let removed = self.session.delete(&path, line)?;
                writeln!(self.out, "deleted {} at {}:{line}", removed.kind, path.display())?;
            },
            ReplCommand::Show { path } => self.show(path.as_deref())?,
            ReplCommand::Next { path, line } => {
                let jump = self.session.next(&path, line)?;
                self.report_jump(jump)?;
            },
            ReplCommand::Prev { path, line } => {
                let jump = self.session.prev(&path, line)?;
                self.report_jump(jump)?;
            },
            ReplCommand::Insert { path, at, text } => {
                let document = DocumentKey::resolve(&path)?;
                let lines: Vec<String> = unescape(&text).lines().map(String::from).collect();
                let count = lines.len();
                self.session
                    .host_mut()
                    .insert_lines(&document, at, lines)?;
                writeln!(self.out, "inserted {count} lines before {}:{at}", path.display())?;
            },
            ReplCommand::Remove { path, start, count } => {
                let document = DocumentKey::resolve(&path)?;
                self.session
                    .host_mut()
                    .delete_lines(&document, start, count)?;
                writeln!(self.out, "removed lines from {}:{start}", path.display())?;
            },
            ReplCommand::Move {
                path,
                start,
                count,
                to,
            } => {
                let document = DocumentKey::resolve(&path)?;
                self.session
                    .host_mut()
                    .move_lines(&document, start, count, to)?;
                writeln!(self.out, "moved {count} lines to {}:{to}", path.display())?;
            },
            ReplCommand::Reload { path } => {
                let document = DocumentKey::resolve(&path)?;
                self.session.host_mut().reload(&document)?;
                writeln!(self.out, "reloaded {}", path.display())?;
            },
            ReplCommand::Pick { query } => self.pick(query.as_deref().unwrap_or_default())?,
            ReplCommand::Export { file } => {
                let outcome = match file {
                    Some(file) => {
                        let mut sinks: Vec<Box<dyn DeliverySink>> =
                            vec![Box::new(FileSink::new(file))];
                        self.session.export(&mut sinks)?
                    },
                    None => self.session.export_configured()?,
                };
                write!(
                    self.out,
                    "exported {} annotations via {}",
                    outcome.entries, outcome.sink
                )?;
                if outcome.deleted > 0 {
                    write!(self.out, " ({} in deleted files)", outcome.deleted)?;
                }
                writeln!(self.out)?;
            },
            ReplCommand::Clear { path } => {
                let cleared = self.session.clear(path.as_deref())?;
                writeln!(self.out, "cleared {cleared} annotations")?;
            },
            ReplCommand::Kinds => write_kinds(&mut self.out)?,
            ReplCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn show(&mut self, path: Option<&Path>) -> anyhow::Result<()> {
        match path {
            Some(path) => {
                let annotations = self.session.annotations(path)?;
                if annotations.is_empty() {
                    writeln!(self.out, "no annotations in {}", path.display())?;
                }
                for (line, annotation) in annotations {
                    let mut text = annotation.text.lines();
                    let first = text.next().unwrap_or_default();
                    writeln!(self.out, "{line:>5} [{}] {first}", annotation.kind)?;
                    for rest in text {
                        writeln!(self.out, "      {rest}")?;
                    }
                }
            },
            None => {
                let entries = self.session.entries();
                if entries.is_empty() {
                    writeln!(self.out, "no annotations")?;
                }
                let base = self.session.base().map(Path::to_path_buf);
                for entry in entries {
                    writeln!(self.out, "{}", entry.label(base.as_deref()))?;
                }
            },
        }
        Ok(())
    }

    fn pick(&mut self, query: &str) -> anyhow::Result<()> {
        let base = self.session.base().map(Path::to_path_buf);
        let mut picker = FuzzyPicker::new(query, base.clone());
        match self.session.pick(&mut picker) {
            Some(entry) => writeln!(self.out, "{}", entry.label(base.as_deref()))?,
            None => writeln!(self.out, "no match for {query:?}")?,
        }
        Ok(())
    }

    fn report_jump(&mut self, jump: margin::Jump) -> io::Result<()> {
        if jump.wrapped && self.session.config().notify_on_wrap {
            writeln!(self.out, "line {} (wrapped)", jump.line)
        } else {
            writeln!(self.out, "line {}", jump.line)
        }
    }

    fn report_error(&mut self, err: &anyhow::Error) -> io::Result<()> {
        // clap renders its own `error:` prefix and usage
        if err.downcast_ref::<clap::Error>().is_some() {
            write!(self.out, "{err}")
        } else {
            writeln!(self.out, "error: {err:#}")
        }
    }

    fn prompt(&mut self, mode: Mode) -> io::Result<()> {
        if mode == (Mode::Interactive { prompt: true }) {
            write!(self.out, "{PROMPT}")?;
            self.out.flush()?;
        }
        Ok(())
    }
}

/// Open `files` and run a session from `script`, or from stdin.
pub fn run(config: Config, files: &[PathBuf], script: Option<&Path>) -> anyhow::Result<()> {
    let mut session = Session::with_buffers(config);
    for file in files {
        session
            .open(file)
            .with_context(|| format!("Failed to open {}", file.display()))?;
    }

    let stdout = io::stdout().lock();
    let mut repl = Repl::new(&mut session, stdout);
    match script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open script: {}", path.display()))?;
            repl.run(BufReader::new(file), Mode::Script)
        },
        None => {
            let stdin = io::stdin();
            let prompt = stdin.is_terminal();
            repl.run(stdin.lock(), Mode::Interactive { prompt })
        },
    }
}

/// Split a command line into clap arguments.
///
/// Commands ending in free text get everything after their fixed arguments as
/// one final argument, spacing included.
fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let Some((name, mut rest)) = next_word(line) else {
        return words;
    };
    let fixed = free_text_position(&name);
    words.push(name);

    match fixed {
        Some(fixed) => {
            for _ in 0..fixed {
                let Some((word, remaining)) = next_word(rest) else {
                    break;
                };
                words.push(word);
                rest = remaining;
            }
            let text = rest.trim();
            if !text.is_empty() {
                words.push(text.to_string());
            }
        },
        None => {
            while let Some((word, remaining)) = next_word(rest) {
                words.push(word);
                rest = remaining;
            }
        },
    }
    words
}

/// Next whitespace-separated or double-quoted word, and the input after it.
fn next_word(input: &str) -> Option<(String, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    if let Some(quoted) = input.strip_prefix('"') {
        return Some(match quoted.find('"') {
            Some(end) => (quoted[..end].to_string(), &quoted[end + 1..]),
            None => (quoted.to_string(), ""),
        });
    }
    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    Some((input[..end].to_string(), &input[end..]))
}

/// Number of arguments before the free text of `command`, if it takes any.
fn free_text_position(command: &str) -> Option<usize> {
    match command {
        "add" => Some(3),
        "edit" | "insert" => Some(2),
        "pick" => Some(0),
        _ => None,
    }
}

fn unescape(text: &str) -> String {
    text.replace("\\n", "\n")
}

fn is_help(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

fn is_informational(err: &anyhow::Error) -> bool {
    err.downcast_ref::<margin::Error>()
        .is_some_and(margin::Error::is_informational)
}
