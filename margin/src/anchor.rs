//! Tracked positions: handles that follow a line through edits.
//!
//! The engine only ever asks an anchor "which line are you on now?". Hosts with
//! their own mark primitive implement [`TrackedPositions`] directly; hosts
//! without one can record their edits into a [`LineAnchors`] and delegate to it.

use crate::document::DocumentKey;
use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Opaque handle to a tracked position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorId(pub u64);

/// Host contract for creating and querying tracked positions.
///
/// An anchor bound to line N must keep following that line across arbitrary
/// line insertions and deletions for as long as it is held.
pub trait TrackedPositions {
    /// Bind a new anchor to `line` (1-based). `None` if the host can't anchor there.
    fn create_anchor(&mut self, document: &DocumentKey, line: u32) -> Option<AnchorId>;

    /// Current line of the anchor, or `None` once it is gone.
    fn anchor_line(&self, anchor: AnchorId) -> Option<u32>;

    fn release_anchor(&mut self, anchor: AnchorId);
}

/// What happens to anchors whose line is deleted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// The anchor is gone along with its line.
    #[default]
    Invalidate,
    /// The anchor collapses onto the first line after the deleted range.
    Collapse,
}

/// A line-granular edit, in 1-based line numbers of the document before the edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineEdit {
    /// `count` new lines inserted before line `at`.
    Insert { at: u32, count: u32 },
    /// Lines `start..start + count` removed.
    Delete { start: u32, count: u32 },
    /// Lines `start..start + count` moved before line `to`.
    Move { start: u32, count: u32, to: u32 },
}

impl LineEdit {
    /// Where `line` ends up after this edit. `None` if the line was deleted.
    pub fn map_line(&self, line: u32) -> Option<u32> {
        match *self {
            LineEdit::Insert { at, count } => {
                if line >= at {
                    Some(line.saturating_add(count))
                } else {
                    Some(line)
                }
            },
            LineEdit::Delete { start, count } => {
                if line < start {
                    Some(line)
                } else if line - start >= count {
                    Some(line - count)
                } else {
                    None
                }
            },
            LineEdit::Move { start, count, to } => {
                let end = start.saturating_add(count);
                if to >= start && to <= end {
                    Some(line)
                } else if to > end {
                    // Block moves down, the lines between close the gap.
                    if (start..end).contains(&line) {
                        Some(line.saturating_add(to - end))
                    } else if (end..to).contains(&line) {
                        Some(line - count)
                    } else {
                        Some(line)
                    }
                } else if (start..end).contains(&line) {
                    Some(to.saturating_add(line - start))
                } else if (to..start).contains(&line) {
                    Some(line.saturating_add(count))
                } else {
                    Some(line)
                }
            },
        }
    }
}

#[derive(Clone, Debug)]
struct TrackedLine {
    document: DocumentKey,
    line: Option<u32>,
}

/// Engine-owned anchor storage that shifts on recorded [`LineEdit`]s.
///
/// Knows nothing about document contents: the owner is responsible for only
/// creating anchors on lines that exist and for recording every edit.
#[derive(Debug, Default)]
pub struct LineAnchors {
    anchors: FxHashMap<AnchorId, TrackedLine>,
    next_id: u64,
    policy: DeletePolicy,
}

impl LineAnchors {
    pub fn new(policy: DeletePolicy) -> Self {
        Self {
            anchors: FxHashMap::default(),
            next_id: 1,
            policy,
        }
    }

    pub fn policy(&self) -> DeletePolicy {
        self.policy
    }

    pub fn create(&mut self, document: &DocumentKey, line: u32) -> AnchorId {
        let id = AnchorId(self.next_id);
        self.next_id += 1;
        self.anchors.insert(
            id,
            TrackedLine {
                document: document.clone(),
                line: Some(line),
            },
        );
        id
    }

    pub fn line(&self, anchor: AnchorId) -> Option<u32> {
        self.anchors.get(&anchor).and_then(|tracked| tracked.line)
    }

    pub fn release(&mut self, anchor: AnchorId) {
        self.anchors.remove(&anchor);
    }

    /// Number of anchors held, gone ones included.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Shift every anchor of `document` through `edit`.
    pub fn apply(&mut self, document: &DocumentKey, edit: LineEdit) {
        let policy = self.policy;
        for (id, tracked) in self.anchors.iter_mut() {
            if &tracked.document != document {
                continue;
            }
            let Some(line) = tracked.line else {
                continue;
            };

            let mapped = match (edit.map_line(line), edit, policy) {
                (Some(mapped), ..) => Some(mapped),
                (None, LineEdit::Delete { start, .. }, DeletePolicy::Collapse) => Some(start),
                (None, ..) => None,
            };

            if mapped != Some(line) {
                tracing::trace!("anchor {id:?} in {document}: {line} -> {mapped:?}");
            }
            tracked.line = mapped;
        }
    }

    /// Mark every anchor of `document` as gone, e.g. when the document is closed.
    pub fn invalidate_document(&mut self, document: &DocumentKey) {
        for tracked in self.anchors.values_mut() {
            if &tracked.document == document {
                tracked.line = None;
            }
        }
    }
}
