//! The closed set of annotation kinds.

use crate::error::Error;
use std::{fmt, str::FromStr};

/// What an annotation is about.
///
/// Parsing is case-insensitive; the canonical spelling is upper case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnnotationKind {
    Note,
    Suggestion,
    Issue,
    Praise,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 4] = [
        AnnotationKind::Note,
        AnnotationKind::Suggestion,
        AnnotationKind::Issue,
        AnnotationKind::Praise,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AnnotationKind::Note => "NOTE",
            AnnotationKind::Suggestion => "SUGGESTION",
            AnnotationKind::Issue => "ISSUE",
            AnnotationKind::Praise => "PRAISE",
        }
    }

    /// One-line meaning, used in the report preamble and `kinds` listings.
    pub fn description(self) -> &'static str {
        match self {
            AnnotationKind::Note => "an observation or question, no change required",
            AnnotationKind::Suggestion => "an optional improvement worth considering",
            AnnotationKind::Issue => "a problem that should be fixed",
            AnnotationKind::Praise => "something done well that should be kept",
        }
    }

    pub(crate) fn names() -> String {
        Self::ALL
            .iter()
            .map(|kind| kind.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AnnotationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::InvalidKind { kind: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_any_case() {
        assert_eq!("note".parse::<AnnotationKind>().unwrap(), AnnotationKind::Note);
        assert_eq!(
            "Suggestion".parse::<AnnotationKind>().unwrap(),
            AnnotationKind::Suggestion
        );
        assert_eq!(" ISSUE ".parse::<AnnotationKind>().unwrap(), AnnotationKind::Issue);
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = "nitpick".parse::<AnnotationKind>().unwrap_err();
        assert!(matches!(err, Error::InvalidKind { ref kind } if kind == "nitpick"));
        assert!(err.to_string().contains("NOTE, SUGGESTION, ISSUE, PRAISE"));
    }

    #[test]
    fn display_matches_label() {
        for kind in AnnotationKind::ALL {
            assert_eq!(kind.to_string(), kind.label());
        }
    }
}
