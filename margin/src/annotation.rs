use crate::{anchor::AnchorId, kind::AnnotationKind};

/// Longest original context shown in reports, ellipsis included.
pub const CONTEXT_DISPLAY_LIMIT: usize = 60;

/// A typed, user-authored comment bound to one line of one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub kind: AnnotationKind,
    pub text: String,
    /// Weak handle into the host's tracked positions. The store never owns the
    /// position itself, only asks it where it is.
    pub anchor: Option<AnchorId>,
    original_context: String,
}

impl Annotation {
    pub fn new(
        kind: AnnotationKind,
        text: impl Into<String>,
        line_content: &str,
        anchor: Option<AnchorId>,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            anchor,
            original_context: line_content.trim().to_string(),
        }
    }

    /// The annotated line's text as it was when the annotation was made.
    pub fn original_context(&self) -> &str {
        &self.original_context
    }
}

/// Shorten `context` to at most `limit` characters, ending in `...` when cut.
pub fn truncate_context(context: &str, limit: usize) -> String {
    let context = context.trim();
    if context.chars().count() <= limit {
        return context.to_string();
    }
    let keep = limit.saturating_sub(3);
    let mut truncated: String = context.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}
