//! Block-reference marker detection.
//!
//! A synced line is any line whose last characters form a block-reference
//! marker `^<digits>`. The marker is end-of-line anchored: a marker in the
//! middle of a line does not make the line a synced line, and anything
//! after the digits disqualifies it. Everything before the marker,
//! including leading whitespace, is line content and travels verbatim when
//! the line is propagated.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{SyncError, SyncResult};

// [0-9], not \d: the regex crate's \d is Unicode-aware, and ids are ASCII
// digit runs everywhere else (contains_block_id checks is_ascii_digit)
static BLOCK_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\^([0-9]+)$").expect("block id pattern is valid"));

/// Returns true iff `text` ends with `^` followed by one or more digits.
pub fn is_synced_line(text: &str) -> bool {
    BLOCK_ID_RE.is_match(text)
}

/// Returns true iff `text` ends with `^<id>` exactly.
///
/// The id must match the full trailing digit run: id `"12"` matches neither
/// a line ending `^123` nor a line ending `^1`.
pub fn contains_block_id(text: &str, id: &str) -> bool {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    text.strip_suffix(id)
        .is_some_and(|prefix| prefix.ends_with('^'))
}

/// One line of text carrying a block-reference marker.
///
/// Immutable once constructed; created transiently per detected edit and
/// discarded after propagation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedLine {
    raw_text: String,
    block_id: String,
}

impl SyncedLine {
    /// Parse a line into a `SyncedLine`.
    ///
    /// Fails with [`SyncError::MalformedSyncedLine`] when the line has no
    /// trailing `^<digits>` marker. On success `block_id()` is never empty.
    pub fn parse(text: &str) -> SyncResult<Self> {
        let captures = BLOCK_ID_RE
            .captures(text)
            .ok_or_else(|| SyncError::malformed_synced_line(text))?;

        Ok(Self {
            raw_text: text.to_string(),
            block_id: captures[1].to_string(),
        })
    }

    /// Full line content, marker included.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// The digit run following `^`.
    pub fn block_id(&self) -> &str {
        &self.block_id
    }
}
