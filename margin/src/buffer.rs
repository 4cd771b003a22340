//! In-memory documents that record their own line edits.
//!
//! [`Buffers`] is the default host: it loads documents from disk, applies
//! line-level edits, and keeps a [`LineAnchors`] in sync with every edit so
//! annotations follow their lines. Edits made to the file by other programs
//! are picked up with [`Buffers::reload`], which diffs the old and new lines
//! and replays the difference as edits.

use crate::{
    anchor::{AnchorId, DeletePolicy, LineAnchors, LineEdit, TrackedPositions},
    document::{DocumentAccess, DocumentKey},
    error::{Error, Result},
};
use rustc_hash::FxHashMap;
use similar::{capture_diff_slices, Algorithm, DiffOp};

#[derive(Debug, Default)]
pub struct Buffers {
    documents: FxHashMap<DocumentKey, Vec<String>>,
    anchors: LineAnchors,
}

impl Buffers {
    pub fn new(policy: DeletePolicy) -> Self {
        Self {
            documents: FxHashMap::default(),
            anchors: LineAnchors::new(policy),
        }
    }

    /// Load `document` from disk. Reopening an already open document reloads it.
    pub fn open(&mut self, document: &DocumentKey) -> Result<()> {
        if self.documents.contains_key(document) {
            return self.reload(document);
        }
        let lines = read_lines(document)?;
        tracing::debug!("opened {document} ({} lines)", lines.len());
        self.documents.insert(document.clone(), lines);
        Ok(())
    }

    /// Open `document` with the given contents instead of reading it from disk.
    /// An already open document is updated like [`Buffers::reload`].
    pub fn open_text(&mut self, document: &DocumentKey, text: &str) {
        self.replace_lines(document, split_lines(text));
    }

    /// Close `document`. Its anchors are gone from then on.
    pub fn close(&mut self, document: &DocumentKey) -> bool {
        let closed = self.documents.remove(document).is_some();
        if closed {
            self.anchors.invalidate_document(document);
        }
        closed
    }

    pub fn is_open(&self, document: &DocumentKey) -> bool {
        self.documents.contains_key(document)
    }

    pub fn text(&self, document: &DocumentKey) -> Option<String> {
        self.documents.get(document).map(|lines| {
            let mut text = lines.join("\n");
            if !lines.is_empty() {
                text.push('\n');
            }
            text
        })
    }

    /// Insert `lines` before line `at`. `at` may be one past the last line to append.
    pub fn insert_lines(
        &mut self,
        document: &DocumentKey,
        at: u32,
        lines: Vec<String>,
    ) -> Result<()> {
        let contents = self.lines_mut(document)?;
        if at == 0 || at as usize > contents.len() + 1 {
            return Err(out_of_range(document, at));
        }
        let count = lines.len() as u32;
        let index = at as usize - 1;
        contents.splice(index..index, lines);
        self.anchors.apply(document, LineEdit::Insert { at, count });
        Ok(())
    }

    /// Delete up to `count` lines starting at `start`; the range is clipped at the end.
    pub fn delete_lines(&mut self, document: &DocumentKey, start: u32, count: u32) -> Result<()> {
        let contents = self.lines_mut(document)?;
        if start == 0 || start as usize > contents.len() {
            return Err(out_of_range(document, start));
        }
        let index = start as usize - 1;
        let count = count.min((contents.len() - index) as u32);
        contents.drain(index..index + count as usize);
        self.anchors.apply(document, LineEdit::Delete { start, count });
        Ok(())
    }

    /// Move lines `start..start + count` so they sit before line `to`.
    pub fn move_lines(
        &mut self,
        document: &DocumentKey,
        start: u32,
        count: u32,
        to: u32,
    ) -> Result<()> {
        let contents = self.lines_mut(document)?;
        let len = contents.len() as u32;
        let end = match start.checked_add(count) {
            Some(end) if start > 0 && count > 0 && end - 1 <= len => end,
            _ => return Err(out_of_range(document, start)),
        };
        if to == 0 || to > len.saturating_add(1) {
            return Err(out_of_range(document, to));
        }
        if to >= start && to <= end {
            return Ok(());
        }

        let block: Vec<String> = contents
            .drain(start as usize - 1..end as usize - 1)
            .collect();
        // `to` is counted before the block was removed.
        let insert_at = if to > end { to - count } else { to };
        let index = insert_at as usize - 1;
        contents.splice(index..index, block);
        self.anchors
            .apply(document, LineEdit::Move { start, count, to });
        Ok(())
    }

    /// Re-read `document` from disk, shifting anchors through the line diff.
    ///
    /// Changed hunks of equal size count as in-place modifications and keep
    /// their anchors; a size difference is treated as lines deleted from or
    /// inserted at the end of the hunk.
    pub fn reload(&mut self, document: &DocumentKey) -> Result<()> {
        if !self.is_open(document) {
            return Err(Error::DocumentNotOpen {
                document: document.clone(),
            });
        }
        let new_lines = read_lines(document)?;
        self.replace_lines(document, new_lines);
        Ok(())
    }

    fn replace_lines(&mut self, document: &DocumentKey, new_lines: Vec<String>) {
        if let Some(old_lines) = self.documents.get(document) {
            let edits = diff_edits(old_lines, &new_lines);
            tracing::debug!("replaced {document}: {} line edits", edits.len());
            for edit in edits {
                self.anchors.apply(document, edit);
            }
        }
        self.documents.insert(document.clone(), new_lines);
    }

    fn lines_mut(&mut self, document: &DocumentKey) -> Result<&mut Vec<String>> {
        self.documents
            .get_mut(document)
            .ok_or_else(|| Error::DocumentNotOpen {
                document: document.clone(),
            })
    }
}

impl DocumentAccess for Buffers {
    fn line_count(&self, document: &DocumentKey) -> Option<u32> {
        self.documents
            .get(document)
            .map(|lines| lines.len() as u32)
    }

    fn line_text(&self, document: &DocumentKey, line: u32) -> Option<String> {
        let index = (line as usize).checked_sub(1)?;
        self.documents.get(document)?.get(index).cloned()
    }
}

impl TrackedPositions for Buffers {
    fn create_anchor(&mut self, document: &DocumentKey, line: u32) -> Option<AnchorId> {
        let len = self.line_count(document)?;
        if line == 0 || line > len {
            tracing::debug!("not anchoring {document}:{line}, document has {len} lines");
            return None;
        }
        Some(self.anchors.create(document, line))
    }

    fn anchor_line(&self, anchor: AnchorId) -> Option<u32> {
        self.anchors.line(anchor)
    }

    fn release_anchor(&mut self, anchor: AnchorId) {
        self.anchors.release(anchor);
    }
}

fn out_of_range(document: &DocumentKey, line: u32) -> Error {
    Error::LineOutOfRange {
        document: document.clone(),
        line,
    }
}

fn read_lines(document: &DocumentKey) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(document.as_path()).map_err(|source| Error::Io {
        path: document.as_path().to_path_buf(),
        source,
    })?;
    Ok(split_lines(&text))
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

/// Translate a line diff into edits, ordered bottom-up so each edit's line
/// numbers are still valid when it is applied.
fn diff_edits(old: &[String], new: &[String]) -> Vec<LineEdit> {
    let mut edits = Vec::new();
    for op in capture_diff_slices(Algorithm::Myers, old, new).iter().rev() {
        match *op {
            DiffOp::Equal { .. } => {},
            DiffOp::Delete {
                old_index, old_len, ..
            } => edits.push(LineEdit::Delete {
                start: old_index as u32 + 1,
                count: old_len as u32,
            }),
            DiffOp::Insert {
                old_index, new_len, ..
            } => edits.push(LineEdit::Insert {
                at: old_index as u32 + 1,
                count: new_len as u32,
            }),
            DiffOp::Replace {
                old_index,
                old_len,
                new_len,
                ..
            } => {
                let modified = old_len.min(new_len);
                let tail = (old_index + modified) as u32 + 1;
                if old_len > new_len {
                    edits.push(LineEdit::Delete {
                        start: tail,
                        count: (old_len - new_len) as u32,
                    });
                } else if new_len > old_len {
                    edits.push(LineEdit::Insert {
                        at: tail,
                        count: (new_len - old_len) as u32,
                    });
                }
            },
        }
    }
    edits
}
