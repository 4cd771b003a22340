//! Choosing one annotation out of the flattened export entries.

use crate::export::ExportEntry;
use nucleo_matcher::{
    pattern::{CaseMatching, Normalization, Pattern},
    Config, Matcher,
};
use std::path::PathBuf;

/// A selection UI over export entries.
pub trait Picker {
    /// Index of the chosen entry, or `None` if nothing was chosen.
    fn pick(&mut self, entries: &[ExportEntry]) -> Option<usize>;
}

/// Let `picker` choose among `entries` and hand the choice to `on_choice`.
pub fn select<P, F>(entries: &[ExportEntry], picker: &mut P, on_choice: F)
where
    P: Picker + ?Sized,
    F: FnOnce(Option<&ExportEntry>),
{
    let choice = picker.pick(entries).and_then(|index| entries.get(index));
    on_choice(choice)
}

/// Picks the best fuzzy match for a fixed query.
///
/// Entries are matched on their [`ExportEntry::label`], so a query can mix
/// path fragments, kinds and words from the annotation text.
pub struct FuzzyPicker {
    query: String,
    base: Option<PathBuf>,
    matcher: Matcher,
}

struct Candidate {
    index: usize,
    label: String,
}

impl AsRef<str> for Candidate {
    fn as_ref(&self) -> &str {
        &self.label
    }
}

impl FuzzyPicker {
    pub fn new(query: impl Into<String>, base: Option<PathBuf>) -> Self {
        Self {
            query: query.into(),
            base,
            matcher: Matcher::new(Config::DEFAULT.match_paths()),
        }
    }

    /// Indices of matching entries, best match first. An empty query keeps
    /// every entry in its original order.
    pub fn rank(&mut self, entries: &[ExportEntry]) -> Vec<usize> {
        if self.query.trim().is_empty() {
            return (0..entries.len()).collect();
        }

        let pattern = Pattern::parse(&self.query, CaseMatching::Ignore, Normalization::Smart);
        let candidates = entries.iter().enumerate().map(|(index, entry)| Candidate {
            index,
            label: entry.label(self.base.as_deref()),
        });

        let mut matches = pattern.match_list(candidates, &mut self.matcher);
        // Stable sort: equal scores keep export order.
        matches.sort_by(|a, b| b.1.cmp(&a.1));
        matches
            .into_iter()
            .map(|(candidate, _score)| candidate.index)
            .collect()
    }
}

impl Picker for FuzzyPicker {
    fn pick(&mut self, entries: &[ExportEntry]) -> Option<usize> {
        self.rank(entries).first().copied()
    }
}
