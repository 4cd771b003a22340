//! Annotation storage and reconciliation.
//!
//! Stored line numbers are only a cache of where each annotation was last
//! seen. Every operation that depends on line numbers first reconciles the
//! document: anchors are asked for their current line, annotations whose
//! anchor is gone are dropped, and annotations that land on the same line are
//! spread out deterministically.

use crate::{
    anchor::TrackedPositions,
    annotation::Annotation,
    document::{DocumentAccess, DocumentKey},
    error::{Error, Result, Target},
    kind::AnnotationKind,
};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// Everything the store needs from the environment hosting the documents.
pub trait Host: DocumentAccess + TrackedPositions {}

impl<T: DocumentAccess + TrackedPositions + ?Sized> Host for T {}

/// Which part of the store [`AnnotationStore::clear`] empties.
#[derive(Clone, Copy, Debug)]
pub enum ClearTarget<'a> {
    Document(&'a DocumentKey),
    All,
}

/// All annotations, partitioned by document and keyed by line.
///
/// The store is a plain single-owner value with no interior locking. Sharing
/// one between threads requires external synchronization around every call,
/// reconciliation included.
#[derive(Debug, Default)]
pub struct AnnotationStore {
    documents: FxHashMap<DocumentKey, BTreeMap<u32, Annotation>>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resync `document`'s stored lines with its anchors.
    ///
    /// Annotations are visited in stored-line order. An anchor that is gone, or
    /// whose line falls outside the document, removes its annotation. An
    /// annotation without an anchor is anchored at its stored line once the
    /// document is open, and keeps that line until then. When a line is
    /// already taken, the annotation probes forward to the next free line.
    /// Running this twice without intervening edits changes nothing.
    pub fn reconcile<H: Host + ?Sized>(&mut self, document: &DocumentKey, host: &mut H) {
        let Some(stored) = self.documents.remove(document) else {
            return;
        };
        let line_count = host.line_count(document);

        let mut reconciled = BTreeMap::new();
        let mut removed = 0;
        let mut displaced = 0;
        for (stored_line, mut annotation) in stored {
            let target = match annotation.anchor {
                Some(anchor) => {
                    let current = host
                        .anchor_line(anchor)
                        .filter(|&line| within(line, line_count));
                    match current {
                        Some(line) => line,
                        None => {
                            tracing::debug!(
                                "dropping {} annotation at {document}:{stored_line}, anchor gone",
                                annotation.kind
                            );
                            host.release_anchor(anchor);
                            removed += 1;
                            continue;
                        },
                    }
                },
                None => {
                    let anchor = line_count.and_then(|_| host.create_anchor(document, stored_line));
                    if anchor.is_some() {
                        tracing::debug!("anchored {document}:{stored_line} now that it is open");
                        annotation.anchor = anchor;
                    }
                    stored_line
                },
            };

            let mut line = target;
            while reconciled.contains_key(&line) {
                line += 1;
            }
            if line != target {
                tracing::trace!("{document}: collision on line {target}, placed on {line}");
                displaced += 1;
            }
            reconciled.insert(line, annotation);
        }

        if removed > 0 || displaced > 0 {
            tracing::debug!(
                "reconciled {document}: {} kept, {removed} removed, {displaced} displaced",
                reconciled.len()
            );
        }
        if !reconciled.is_empty() {
            self.documents.insert(document.clone(), reconciled);
        }
    }

    pub fn reconcile_all<H: Host + ?Sized>(&mut self, host: &mut H) {
        let documents: Vec<DocumentKey> = self.documents.keys().cloned().collect();
        for document in &documents {
            self.reconcile(document, host);
        }
    }

    /// Put an annotation on `line`, replacing whatever was there.
    ///
    /// `line` must exist when the document is open. On a document that is not
    /// open the annotation is stored unanchored and picks up an anchor on the
    /// first reconcile after the document opens.
    ///
    /// The replaced annotation's anchor is reused when it still sits on `line`,
    /// so a slot never ends up with two anchors. Returns the replaced
    /// annotation, detached from its anchor.
    pub fn add<H: Host + ?Sized>(
        &mut self,
        document: &DocumentKey,
        line: u32,
        kind: AnnotationKind,
        text: impl Into<String>,
        line_content: &str,
        host: &mut H,
    ) -> Result<Option<Annotation>> {
        let text = text.into();
        if line == 0 {
            return Err(Error::LineOutOfRange {
                document: document.clone(),
                line,
            });
        }
        if text.trim().is_empty() {
            return Err(Error::EmptyText);
        }
        if host.line_count(document).is_some_and(|count| line > count) {
            return Err(Error::LineOutOfRange {
                document: document.clone(),
                line,
            });
        }

        self.reconcile(document, host);
        let slots = self.documents.entry(document.clone()).or_default();
        let mut previous = slots.remove(&line);

        let old_anchor = previous.as_mut().and_then(|previous| previous.anchor.take());
        let carried = old_anchor.filter(|&anchor| host.anchor_line(anchor) == Some(line));
        if let (Some(anchor), None) = (old_anchor, carried) {
            host.release_anchor(anchor);
        }
        let anchor = carried.or_else(|| host.create_anchor(document, line));
        if anchor.is_none() {
            tracing::debug!("{document} is not open, {line} stays unanchored until it is");
        }

        slots.insert(line, Annotation::new(kind, text, line_content, anchor));
        tracing::debug!("added {kind} annotation at {document}:{line}");
        Ok(previous)
    }

    /// Replace the text of the annotation on `line`.
    pub fn edit<H: Host + ?Sized>(
        &mut self,
        document: &DocumentKey,
        line: u32,
        text: impl Into<String>,
        host: &mut H,
    ) -> Result<()> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::EmptyText);
        }
        self.reconcile(document, host);
        let annotation = self
            .documents
            .get_mut(document)
            .and_then(|slots| slots.get_mut(&line))
            .ok_or_else(|| no_annotation_at(document, line))?;
        annotation.text = text;
        Ok(())
    }

    pub fn get<H: Host + ?Sized>(
        &mut self,
        document: &DocumentKey,
        line: u32,
        host: &mut H,
    ) -> Option<&Annotation> {
        self.reconcile(document, host);
        self.documents.get(document)?.get(&line)
    }

    /// Reconciled annotations of `document`, ascending by line.
    pub fn annotations<H: Host + ?Sized>(
        &mut self,
        document: &DocumentKey,
        host: &mut H,
    ) -> Vec<(u32, &Annotation)> {
        self.reconcile(document, host);
        self.documents
            .get(document)
            .map(|slots| slots.iter().map(|(&line, annotation)| (line, annotation)).collect())
            .unwrap_or_default()
    }

    /// Remove the annotation whose reconciled line is `line`.
    pub fn delete<H: Host + ?Sized>(
        &mut self,
        document: &DocumentKey,
        line: u32,
        host: &mut H,
    ) -> Result<Annotation> {
        self.reconcile(document, host);
        let slots = self
            .documents
            .get_mut(document)
            .ok_or_else(|| no_annotation_at(document, line))?;
        let mut annotation = slots
            .remove(&line)
            .ok_or_else(|| no_annotation_at(document, line))?;
        if slots.is_empty() {
            self.documents.remove(document);
        }

        if let Some(anchor) = annotation.anchor.take() {
            host.release_anchor(anchor);
        }
        tracing::debug!("deleted {} annotation at {document}:{line}", annotation.kind);
        Ok(annotation)
    }

    /// Drop annotations without reconciling. Returns how many were removed.
    pub fn clear<H: Host + ?Sized>(&mut self, target: ClearTarget<'_>, host: &mut H) -> usize {
        let removed: Vec<Annotation> = match target {
            ClearTarget::Document(document) => self
                .documents
                .remove(document)
                .map(|slots| slots.into_values().collect())
                .unwrap_or_default(),
            ClearTarget::All => self
                .documents
                .drain()
                .flat_map(|(_, slots)| slots.into_values())
                .collect(),
        };

        for anchor in removed.iter().filter_map(|annotation| annotation.anchor) {
            host.release_anchor(anchor);
        }
        tracing::debug!("cleared {} annotations", removed.len());
        removed.len()
    }

    /// Documents with at least one stored annotation, in no particular order.
    pub fn documents(&self) -> impl Iterator<Item = &DocumentKey> {
        self.documents.keys()
    }

    /// Stored (not reconciled) annotations of `document`.
    pub fn stored(&self, document: &DocumentKey) -> Option<&BTreeMap<u32, Annotation>> {
        self.documents.get(document)
    }

    /// Total stored annotations across all documents.
    pub fn len(&self) -> usize {
        self.documents.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn within(line: u32, line_count: Option<u32>) -> bool {
    line >= 1 && line_count.map_or(true, |count| line <= count)
}

fn no_annotation_at(document: &DocumentKey, line: u32) -> Error {
    Error::NoAnnotationAtTarget {
        target: Target::Line {
            document: document.clone(),
            line,
        },
    }
}
