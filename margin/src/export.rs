//! Flattening the store into a report.
//!
//! Collection reconciles and sorts; rendering is a pure function of the
//! collected entries so it can be tested without any host or filesystem.

use crate::{
    annotation::{truncate_context, Annotation, CONTEXT_DISPLAY_LIMIT},
    document::{DocumentKey, ExistenceCheck},
    kind::AnnotationKind,
    store::{AnnotationStore, Host},
};
use rustc_hash::FxHashMap;
use std::path::Path;

/// Marker for entries whose document no longer exists on disk.
pub const DELETED_FILE_MARKER: &str = "[DELETED FILE]";

const INDENT: &str = "   ";

/// One annotation, flattened out of the store for export or picking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportEntry {
    pub document: DocumentKey,
    pub line: u32,
    pub annotation: Annotation,
    pub document_exists: bool,
}

impl ExportEntry {
    /// Single-line summary, e.g. `src/lib.rs:12 ISSUE off by one`.
    pub fn label(&self, base: Option<&Path>) -> String {
        let first_line = self.annotation.text.lines().next().unwrap_or_default();
        format!(
            "{}:{} {} {}",
            self.document.short_path(base),
            self.line,
            self.annotation.kind,
            first_line
        )
    }
}

impl AnnotationStore {
    /// Reconcile every document and flatten the store, sorted by document then line.
    ///
    /// Existence is checked once per document on every call; nothing is cached
    /// between exports.
    pub fn collect_all<H, E>(&mut self, host: &mut H, existence: &E) -> Vec<ExportEntry>
    where
        H: Host + ?Sized,
        E: ExistenceCheck + ?Sized,
    {
        self.reconcile_all(host);

        let documents: Vec<DocumentKey> = self.documents().cloned().collect();
        let exists: FxHashMap<DocumentKey, bool> = documents
            .into_iter()
            .map(|document| {
                let exists = existence.exists(&document);
                (document, exists)
            })
            .collect();

        let mut entries = Vec::with_capacity(self.len());
        for (document, document_exists) in &exists {
            let Some(slots) = self.stored(document) else {
                continue;
            };
            entries.extend(slots.iter().map(|(&line, annotation)| ExportEntry {
                document: document.clone(),
                line,
                annotation: annotation.clone(),
                document_exists: *document_exists,
            }));
        }
        entries.sort_by(|a, b| a.document.cmp(&b.document).then(a.line.cmp(&b.line)));
        entries
    }
}

/// Entries pointing at documents that are gone from disk.
pub fn deleted_count(entries: &[ExportEntry]) -> usize {
    entries.iter().filter(|entry| !entry.document_exists).count()
}

/// Render the review report.
///
/// Paths are shown relative to `base` when they live under it.
pub fn render_report(entries: &[ExportEntry], base: Option<&Path>) -> String {
    let mut report = String::new();
    report.push_str("# Review annotations\n\n");
    report.push_str("Each entry is tagged with one of these kinds:\n\n");
    for kind in AnnotationKind::ALL {
        report.push_str(&format!("- {}: {}\n", kind.label(), kind.description()));
    }

    for (index, entry) in entries.iter().enumerate() {
        report.push_str(&format!("\n{}. [{}]", index + 1, entry.annotation.kind));
        if !entry.document_exists {
            report.push_str(&format!(" {DELETED_FILE_MARKER}"));
        }
        report.push_str(&format!(
            " {}:{}\n",
            entry.document.short_path(base),
            entry.line
        ));

        for line in entry.annotation.text.lines() {
            if !line.is_empty() {
                report.push_str(INDENT);
                report.push_str(line);
            }
            report.push('\n');
        }

        let context = truncate_context(entry.annotation.original_context(), CONTEXT_DISPLAY_LIMIT);
        if !context.is_empty() {
            report.push_str(&format!("{INDENT}Context: {context}\n"));
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{doc, FakeHost};
    use std::path::PathBuf;

    struct Missing(Vec<DocumentKey>);

    impl ExistenceCheck for Missing {
        fn exists(&self, document: &DocumentKey) -> bool {
            !self.0.contains(document)
        }
    }

    fn entry(name: &str, line: u32, kind: AnnotationKind, text: &str, context: &str) -> ExportEntry {
        ExportEntry {
            document: doc(name),
            line,
            annotation: Annotation::new(kind, text, context, None),
            document_exists: true,
        }
    }

    #[test]
    fn collect_sorts_by_document_then_line() {
        let mut host = FakeHost::with_lines(100);
        let mut store = AnnotationStore::new();
        for (name, line) in [("b.txt", 3), ("a.txt", 9), ("b.txt", 1), ("a.txt", 2)] {
            store
                .add(&doc(name), line, AnnotationKind::Note, "n", "", &mut host)
                .unwrap();
        }

        let entries = store.collect_all(&mut host, &Missing(vec![]));
        let order: Vec<(String, u32)> = entries
            .iter()
            .map(|entry| (entry.document.short_path(Some(Path::new("/margin-tests"))), entry.line))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a.txt".to_string(), 2),
                ("a.txt".to_string(), 9),
                ("b.txt".to_string(), 1),
                ("b.txt".to_string(), 3),
            ]
        );
        for pair in entries.windows(2) {
            assert!(
                pair[0].document < pair[1].document
                    || (pair[0].document == pair[1].document && pair[0].line <= pair[1].line)
            );
        }
    }

    #[test]
    fn collect_marks_missing_documents() {
        let mut host = FakeHost::with_lines(100);
        let mut store = AnnotationStore::new();
        store
            .add(&doc("kept.txt"), 1, AnnotationKind::Note, "n", "", &mut host)
            .unwrap();
        store
            .add(&doc("gone.txt"), 1, AnnotationKind::Issue, "i", "", &mut host)
            .unwrap();

        let entries = store.collect_all(&mut host, &Missing(vec![doc("gone.txt")]));
        assert_eq!(deleted_count(&entries), 1);
        let gone = entries.iter().find(|entry| entry.document == doc("gone.txt")).unwrap();
        assert!(!gone.document_exists);
    }

    #[test]
    fn report_lists_kinds_in_preamble() {
        let report = render_report(&[], None);
        assert!(report.starts_with("# Review annotations\n"));
        for kind in AnnotationKind::ALL {
            assert!(report.contains(&format!("- {}: {}", kind.label(), kind.description())));
        }
    }

    #[test]
    fn report_entry_layout() {
        let base = PathBuf::from("/margin-tests");
        let entries = vec![
            entry("a.txt", 12, AnnotationKind::Issue, "off by one", "for i in 0..=n {"),
            entry("b.txt", 3, AnnotationKind::Praise, "nice", ""),
        ];

        let report = render_report(&entries, Some(&base));
        let expected_tail = "\n\
            1. [ISSUE] a.txt:12\n   off by one\n   Context: for i in 0..=n {\n\
            \n\
            2. [PRAISE] b.txt:3\n   nice\n";
        assert!(report.ends_with(expected_tail), "{report}");
    }

    #[test]
    fn report_reindents_multiline_text() {
        let entries = vec![entry(
            "a.txt",
            1,
            AnnotationKind::Suggestion,
            "first\n\nthird",
            "",
        )];
        let report = render_report(&entries, Some(Path::new("/margin-tests")));
        assert!(report.ends_with("1. [SUGGESTION] a.txt:1\n   first\n\n   third\n"));
    }

    #[test]
    fn report_truncates_context_and_marks_deleted_files() {
        let mut deleted = entry("old.txt", 5, AnnotationKind::Note, "n", &"y".repeat(80));
        deleted.document_exists = false;

        let report = render_report(&[deleted], Some(Path::new("/margin-tests")));
        assert!(report.contains("1. [NOTE] [DELETED FILE] old.txt:5\n"));
        let context_line = report
            .lines()
            .find(|line| line.trim_start().starts_with("Context:"))
            .unwrap();
        let context = context_line.trim_start().trim_start_matches("Context: ");
        assert_eq!(context.chars().count(), CONTEXT_DISPLAY_LIMIT);
        assert!(context.ends_with("..."));
    }

    #[test]
    fn label_uses_first_text_line() {
        let e = entry("a.txt", 4, AnnotationKind::Note, "headline\nmore", "");
        assert_eq!(e.label(Some(Path::new("/margin-tests"))), "a.txt:4 NOTE headline");
    }
}
