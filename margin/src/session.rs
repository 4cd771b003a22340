//! The review session: one explicit context object per process.
//!
//! A [`Session`] owns the annotation store, the document host and the
//! configuration. Front ends create one at startup and route every user action
//! through it; nothing lives in global state.

use crate::{
    annotation::Annotation,
    buffer::Buffers,
    config::Config,
    document::{DiskExistence, DocumentKey, ExistenceCheck},
    error::{Error, Result, Target},
    export::{deleted_count, render_report, ExportEntry},
    kind::AnnotationKind,
    navigate::{Direction, Jump},
    picker::{select, Picker},
    sink::{self, DeliverySink},
    store::{AnnotationStore, ClearTarget, Host},
};
use std::path::{Path, PathBuf};

/// Result of a successful export.
#[derive(Clone, Debug)]
pub struct ExportOutcome {
    pub report: String,
    pub entries: usize,
    /// Entries whose document no longer exists on disk.
    pub deleted: usize,
    /// Name of the sink that accepted the report.
    pub sink: String,
}

pub struct Session<H = Buffers> {
    store: AnnotationStore,
    host: H,
    config: Config,
    base: Option<PathBuf>,
    existence: Box<dyn ExistenceCheck>,
}

impl Session<Buffers> {
    /// Session over in-memory buffers loaded from disk.
    pub fn with_buffers(config: Config) -> Self {
        let buffers = Buffers::new(config.anchor_on_delete);
        Self::new(buffers, config)
    }

    /// Open (or reload) a document from disk.
    ///
    /// Annotations added before the document was open are anchored here, so
    /// edits from now on move them.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<DocumentKey> {
        let document = DocumentKey::resolve(path)?;
        self.host.open(&document)?;
        self.store.reconcile(&document, &mut self.host);
        Ok(document)
    }
}

impl<H: Host> Session<H> {
    /// Report paths are shown relative to the current directory when possible.
    pub fn new(host: H, config: Config) -> Self {
        let base = std::env::current_dir()
            .and_then(std::fs::canonicalize)
            .ok();
        Self {
            store: AnnotationStore::new(),
            host,
            config,
            base,
            existence: Box::new(DiskExistence),
        }
    }

    pub fn with_base(mut self, base: Option<PathBuf>) -> Self {
        self.base = base;
        self
    }

    pub fn with_existence_check(mut self, existence: impl ExistenceCheck + 'static) -> Self {
        self.existence = Box::new(existence);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn base(&self) -> Option<&Path> {
        self.base.as_deref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Direct access to the host, e.g. to apply edits to its documents.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    /// Annotate `line` of `path`. The kind is validated before anything else.
    pub fn add(
        &mut self,
        path: impl AsRef<Path>,
        line: u32,
        kind: &str,
        text: &str,
    ) -> Result<Option<Annotation>> {
        let kind: AnnotationKind = kind.parse()?;
        let document = DocumentKey::resolve(path)?;
        let line_content = self.host.line_text(&document, line).unwrap_or_default();
        self.store
            .add(&document, line, kind, text, &line_content, &mut self.host)
    }

    pub fn edit(&mut self, path: impl AsRef<Path>, line: u32, text: &str) -> Result<()> {
        let document = DocumentKey::resolve(path)?;
        self.store.edit(&document, line, text, &mut self.host)
    }

    pub fn delete(&mut self, path: impl AsRef<Path>, line: u32) -> Result<Annotation> {
        let document = DocumentKey::resolve(path)?;
        self.store.delete(&document, line, &mut self.host)
    }

    pub fn get(&mut self, path: impl AsRef<Path>, line: u32) -> Result<Option<&Annotation>> {
        let document = DocumentKey::resolve(path)?;
        Ok(self.store.get(&document, line, &mut self.host))
    }

    pub fn annotations(&mut self, path: impl AsRef<Path>) -> Result<Vec<(u32, &Annotation)>> {
        let document = DocumentKey::resolve(path)?;
        Ok(self.store.annotations(&document, &mut self.host))
    }

    pub fn next(&mut self, path: impl AsRef<Path>, cursor_line: u32) -> Result<Jump> {
        self.navigate(path, cursor_line, Direction::Next)
    }

    pub fn prev(&mut self, path: impl AsRef<Path>, cursor_line: u32) -> Result<Jump> {
        self.navigate(path, cursor_line, Direction::Prev)
    }

    fn navigate(
        &mut self,
        path: impl AsRef<Path>,
        cursor_line: u32,
        direction: Direction,
    ) -> Result<Jump> {
        let document = DocumentKey::resolve(path)?;
        let jump = self
            .store
            .navigate(&document, cursor_line, direction, &mut self.host)?;
        if jump.wrapped && self.config.notify_on_wrap {
            tracing::info!("{document}: wrapped around to line {}", jump.line);
        }
        Ok(jump)
    }

    /// Every annotation, reconciled and sorted by document then line.
    pub fn entries(&mut self) -> Vec<ExportEntry> {
        self.store.collect_all(&mut self.host, self.existence.as_ref())
    }

    /// Let `picker` choose an annotation across all documents.
    pub fn pick<P: Picker + ?Sized>(&mut self, picker: &mut P) -> Option<ExportEntry> {
        let entries = self.entries();
        let mut chosen = None;
        select(&entries, picker, |entry| chosen = entry.cloned());
        chosen
    }

    /// Render every annotation and deliver the report through `sinks`.
    pub fn export(&mut self, sinks: &mut [Box<dyn DeliverySink>]) -> Result<ExportOutcome> {
        let entries = self.entries();
        if entries.is_empty() {
            return Err(Error::NoAnnotationAtTarget {
                target: Target::Store,
            });
        }

        let report = render_report(&entries, self.base());
        let deleted = deleted_count(&entries);
        if deleted > 0 {
            tracing::warn!("{deleted} exported annotations belong to deleted files");
        }

        let sink = sink::deliver(&report, sinks)?;
        Ok(ExportOutcome {
            report,
            entries: entries.len(),
            deleted,
            sink,
        })
    }

    /// Export through the sinks named in the configuration.
    pub fn export_configured(&mut self) -> Result<ExportOutcome> {
        let mut sinks = sink::from_config(&self.config);
        self.export(&mut sinks)
    }

    /// Drop the annotations of `path`, or of every document when `None`.
    pub fn clear(&mut self, path: Option<&Path>) -> Result<usize> {
        match path {
            Some(path) => {
                let document = DocumentKey::resolve(path)?;
                Ok(self
                    .store
                    .clear(ClearTarget::Document(&document), &mut self.host))
            },
            None => Ok(self.store.clear(ClearTarget::All, &mut self.host)),
        }
    }
}
