//! Selection normalization.
//!
//! Hosts report selections as anchor/head pairs, and the user may have
//! dragged in either direction. Propagation only cares about the ordered
//! span of touched lines.

/// One editor selection as reported by the host, in document lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor_line: u32,
    pub head_line: u32,
}

/// An ordered, inclusive range of line numbers with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl Selection {
    /// A collapsed selection (a bare cursor) on one line.
    pub fn caret(line: u32) -> Self {
        Self {
            anchor_line: line,
            head_line: line,
        }
    }

    /// Normalize into an ordered line range, regardless of whether the
    /// selection was authored forwards or backwards.
    pub fn line_range(&self) -> LineRange {
        LineRange {
            start: self.anchor_line.min(self.head_line),
            end: self.anchor_line.max(self.head_line),
        }
    }
}

impl LineRange {
    /// Iterate the covered line numbers, both ends included.
    pub fn lines(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}
