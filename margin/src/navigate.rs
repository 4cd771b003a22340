//! Jumping between annotations of one document.

use crate::{
    document::DocumentKey,
    error::{Error, Result, Target},
    store::{AnnotationStore, Host},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// Where navigation landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Jump {
    pub line: u32,
    /// The search ran off the end (or start) and continued from the other side.
    pub wrapped: bool,
}

impl AnnotationStore {
    pub fn next<H: Host + ?Sized>(
        &mut self,
        document: &DocumentKey,
        cursor_line: u32,
        host: &mut H,
    ) -> Result<Jump> {
        self.navigate(document, cursor_line, Direction::Next, host)
    }

    pub fn prev<H: Host + ?Sized>(
        &mut self,
        document: &DocumentKey,
        cursor_line: u32,
        host: &mut H,
    ) -> Result<Jump> {
        self.navigate(document, cursor_line, Direction::Prev, host)
    }

    /// Find the closest annotation strictly after (or before) `cursor_line`,
    /// wrapping around when there is none in that direction.
    pub fn navigate<H: Host + ?Sized>(
        &mut self,
        document: &DocumentKey,
        cursor_line: u32,
        direction: Direction,
        host: &mut H,
    ) -> Result<Jump> {
        let lines: Vec<u32> = self
            .annotations(document, host)
            .into_iter()
            .map(|(line, _)| line)
            .collect();
        let (Some(&first), Some(&last)) = (lines.first(), lines.last()) else {
            return Err(Error::NoAnnotationAtTarget {
                target: Target::Document(document.clone()),
            });
        };

        let found = match direction {
            Direction::Next => lines.iter().find(|&&line| line > cursor_line),
            Direction::Prev => lines.iter().rev().find(|&&line| line < cursor_line),
        };
        let jump = match (found, direction) {
            (Some(&line), _) => Jump {
                line,
                wrapped: false,
            },
            (None, Direction::Next) => Jump {
                line: first,
                wrapped: true,
            },
            (None, Direction::Prev) => Jump {
                line: last,
                wrapped: true,
            },
        };
        tracing::trace!("{direction:?} from {document}:{cursor_line} -> {jump:?}");
        Ok(jump)
    }
}
