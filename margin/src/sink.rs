//! Where finished reports go.
//!
//! Sinks are tried in the configured order and the first one that accepts the
//! report wins. Clipboard delivery shells out to whichever clipboard tool is on
//! `PATH`.

use crate::{
    config::{Config, SinkKind},
    error::{Error, Result, SinkFailure},
};
use anyhow::{bail, Context};
use std::{
    io::Write,
    path::PathBuf,
    process::{Command, Stdio},
};

pub trait DeliverySink {
    fn name(&self) -> &str;

    fn deliver(&mut self, report: &str) -> anyhow::Result<()>;
}

/// Hand `report` to the first sink that accepts it, returning that sink's name.
pub fn deliver(report: &str, sinks: &mut [Box<dyn DeliverySink>]) -> Result<String> {
    let mut failures = Vec::new();
    for sink in sinks.iter_mut() {
        match sink.deliver(report) {
            Ok(()) => {
                tracing::info!("report delivered via {}", sink.name());
                return Ok(sink.name().to_string());
            },
            Err(reason) => {
                tracing::warn!("sink {} failed: {reason:#}", sink.name());
                failures.push(SinkFailure {
                    sink: sink.name().to_string(),
                    reason,
                });
            },
        }
    }
    Err(Error::DeliveryUnavailable { failures })
}

/// Build the sinks listed in `config`, in order.
pub fn from_config(config: &Config) -> Vec<Box<dyn DeliverySink>> {
    config
        .sinks
        .iter()
        .map(|kind| -> Box<dyn DeliverySink> {
            match kind {
                SinkKind::Clipboard => Box::new(ClipboardSink::detect()),
                SinkKind::File => Box::new(FileSink::new(config.report_file.clone())),
                SinkKind::Stdout => Box::new(StdoutSink),
            }
        })
        .collect()
}

/// Clipboard tools in preference order, with the arguments that make them read stdin.
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("pbcopy", &[]),
    ("clip.exe", &[]),
];

/// Pipes the report into an external clipboard tool.
#[derive(Debug)]
pub struct ClipboardSink {
    tool: Option<(PathBuf, &'static [&'static str])>,
}

impl ClipboardSink {
    /// Use the first clipboard tool found on `PATH`.
    pub fn detect() -> Self {
        let tool = CLIPBOARD_TOOLS.iter().find_map(|(name, args)| {
            which::which(name).ok().map(|path| (path, *args))
        });
        if let Some((path, _)) = &tool {
            tracing::debug!("clipboard tool: {}", path.display());
        }
        Self { tool }
    }
}

impl DeliverySink for ClipboardSink {
    fn name(&self) -> &str {
        "clipboard"
    }

    fn deliver(&mut self, report: &str) -> anyhow::Result<()> {
        let Some((program, args)) = &self.tool else {
            bail!("no clipboard tool found on PATH");
        };

        let mut child = Command::new(program)
            .args(*args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start {}", program.display()))?;

        child
            .stdin
            .take()
            .context("clipboard tool has no stdin")?
            .write_all(report.as_bytes())
            .with_context(|| format!("Failed to write to {}", program.display()))?;

        let output = child.wait_with_output()?;
        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

/// Writes the report to a file, replacing its contents.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DeliverySink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    fn deliver(&mut self, report: &str) -> anyhow::Result<()> {
        std::fs::write(&self.path, report)
            .with_context(|| format!("Failed to write report to {}", self.path.display()))
    }
}

#[derive(Debug)]
pub struct StdoutSink;

impl DeliverySink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    fn deliver(&mut self, report: &str) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(report.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}
