//! Line-anchored review annotations.
//!
//! A reviewer attaches typed notes to lines of text documents. The notes keep
//! pointing at the right line while the documents are edited, and the whole
//! set can be exported as one report.
//!
//! # Architecture
//!
//! - [`AnnotationStore`] holds annotations per document, keyed by a cached line
//!   number that is reconciled against live anchors before every line-dependent
//!   operation.
//! - Anchors come from the host through [`TrackedPositions`]; [`Buffers`] is the
//!   built-in host, backed by [`LineAnchors`].
//! - [`Session`] is the context object a front end drives.
//!
//! # Concurrency
//!
//! Everything here is single-threaded. None of the types lock internally, so a
//! store or session shared across threads needs external synchronization.

pub mod anchor;
pub mod annotation;
pub mod buffer;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod kind;
pub mod navigate;
pub mod paths;
pub mod picker;
pub mod session;
pub mod sink;
pub mod store;

pub use anchor::{AnchorId, DeletePolicy, LineAnchors, LineEdit, TrackedPositions};
pub use annotation::Annotation;
pub use buffer::Buffers;
pub use config::{Config, SinkKind};
pub use document::{DiskExistence, DocumentAccess, DocumentKey, ExistenceCheck};
pub use error::{Error, Result, Target};
pub use export::{render_report, ExportEntry, DELETED_FILE_MARKER};
pub use kind::AnnotationKind;
pub use navigate::{Direction, Jump};
pub use picker::{FuzzyPicker, Picker};
pub use session::{ExportOutcome, Session};
pub use sink::DeliverySink;
pub use store::{AnnotationStore, ClearTarget, Host};
