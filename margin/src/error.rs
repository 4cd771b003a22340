//! Error taxonomy for the annotation engine.
//!
//! Every mutating operation validates its input before touching the store, so
//! an `Err` always means the store is exactly as it was before the call.

use crate::document::DocumentKey;
use std::{fmt, path::PathBuf};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid annotation kind `{kind}` (expected one of {})", crate::kind::AnnotationKind::names())]
    InvalidKind { kind: String },

    #[error("document has no name")]
    EmptyDocumentKey,

    #[error("{target}")]
    NoAnnotationAtTarget { target: Target },

    #[error("annotation text is empty")]
    EmptyText,

    #[error("line {line} is out of range for {document}")]
    LineOutOfRange { document: DocumentKey, line: u32 },

    #[error("{document} is not open")]
    DocumentNotOpen { document: DocumentKey },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no delivery sink accepted the report: {}", SinkFailures(.failures))]
    DeliveryUnavailable { failures: Vec<SinkFailure> },
}

impl Error {
    /// Outcomes that mean "nothing there" rather than a failed operation.
    pub fn is_informational(&self) -> bool {
        matches!(self, Error::NoAnnotationAtTarget { .. })
    }
}

/// Where a lookup came up empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Line { document: DocumentKey, line: u32 },
    Document(DocumentKey),
    Store,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Line { document, line } => write!(f, "no annotation at {document}:{line}"),
            Target::Document(document) => write!(f, "no annotations in {document}"),
            Target::Store => write!(f, "no annotations"),
        }
    }
}

/// A single sink's refusal, kept so the caller can see every attempt.
#[derive(Debug)]
pub struct SinkFailure {
    pub sink: String,
    pub reason: anyhow::Error,
}

struct SinkFailures<'a>(&'a [SinkFailure]);

impl fmt::Display for SinkFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "no sinks configured");
        }
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {:#}", failure.sink, failure.reason)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_error_lists_every_sink() {
        let err = Error::DeliveryUnavailable {
            failures: vec![
                SinkFailure {
                    sink: "clipboard".into(),
                    reason: anyhow::anyhow!("no clipboard tool found"),
                },
                SinkFailure {
                    sink: "file".into(),
                    reason: anyhow::anyhow!("permission denied"),
                },
            ],
        };
        let message = err.to_string();
        assert!(message.contains("clipboard: no clipboard tool found"));
        assert!(message.contains("file: permission denied"));
        assert!(!err.is_informational());
    }

    #[test]
    fn empty_target_is_informational() {
        let err = Error::NoAnnotationAtTarget {
            target: Target::Store,
        };
        assert!(err.is_informational());
        assert_eq!(err.to_string(), "no annotations");
    }

    #[test]
    fn io_error_names_the_path() {
        let err = Error::Io {
            path: PathBuf::from("/tmp/notes.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "I/O error on /tmp/notes.txt: not found");
    }
}
