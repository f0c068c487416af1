//! Host editor contract.
//!
//! The engine never talks to a concrete editor toolkit. Hosts implement
//! [`EditorBuffer`] over their open buffers and [`ChangeSource`] over their
//! change-notification stream; everything else in this crate depends only
//! on these traits.

use std::ops::Deref;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::one::Ref;
use url::Url;

use crate::selection::Selection;

/// A caret position inside an editor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub line: u32,
    pub ch: u32,
}

impl Cursor {
    /// Clamp the cursor to the bounds of a replacement line set.
    ///
    /// Whole-content rewrites can shrink the document under the caret; the
    /// host treats an out-of-bounds caret as an error, so it is resolved
    /// here instead of surfaced. Columns count characters, matching the
    /// editor's `ch` coordinate.
    pub fn clamped_to(self, lines: &[&str]) -> Cursor {
        let max_line = lines.len().saturating_sub(1) as u32;
        let line = self.line.min(max_line);
        let max_ch = lines
            .get(line as usize)
            .map(|l| l.chars().count() as u32)
            .unwrap_or(0);
        Cursor {
            line,
            ch: self.ch.min(max_ch),
        }
    }
}

/// One open editor buffer, as exposed by the host.
///
/// All methods are synchronous in-memory access; the open-document phase of
/// propagation relies on this to hold the re-entrancy guard tightly around
/// a write without suspension points in between.
pub trait EditorBuffer: Send + Sync {
    /// Stable identity of the backing document for this buffer's lifetime.
    fn uri(&self) -> Url;

    /// Full buffer content.
    fn content(&self) -> String;

    /// Replace the full buffer content.
    fn set_content(&self, text: &str);

    /// A single line's text, or `None` past the end of the buffer.
    fn line(&self, line: u32) -> Option<String>;

    fn cursor(&self) -> Cursor;

    fn set_cursor(&self, cursor: Cursor);

    /// Current selections, one per caret.
    fn selections(&self) -> Vec<Selection>;
}

/// Callback invoked by a [`ChangeSource`] on every buffer change.
pub type ChangeHandler = Arc<dyn Fn(Arc<dyn EditorBuffer>, Vec<Selection>) + Send + Sync>;

/// Opaque handle for de-registering a [`ChangeHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// The host's change-notification stream.
///
/// Hosts call every subscribed handler with the changed buffer and its
/// selections at notification time. Handlers must be de-registerable so
/// the engine can detach on shutdown.
pub trait ChangeSource: Send + Sync {
    fn subscribe(&self, handler: ChangeHandler) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// The set of currently open editors, keyed by document identity.
///
/// Hosts insert a buffer when a document opens and remove it when the
/// document closes; the propagator snapshots it per pass.
#[derive(Default)]
pub struct EditorRegistry {
    editors: DashMap<Url, Arc<dyn EditorBuffer>>,
}

/// Shared read access to one registered editor.
pub struct EditorHandle<'a> {
    inner: Ref<'a, Url, Arc<dyn EditorBuffer>>,
}

impl Deref for EditorHandle<'_> {
    type Target = Arc<dyn EditorBuffer>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl EditorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, editor: Arc<dyn EditorBuffer>) {
        self.editors.insert(editor.uri(), editor);
    }

    pub fn remove(&self, uri: &Url) -> Option<Arc<dyn EditorBuffer>> {
        self.editors.remove(uri).map(|(_, editor)| editor)
    }

    pub fn get(&self, uri: &Url) -> Option<EditorHandle<'_>> {
        self.editors.get(uri).map(|inner| EditorHandle { inner })
    }

    pub fn contains(&self, uri: &Url) -> bool {
        self.editors.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.editors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }

    /// Snapshot all open editors with `source` first.
    ///
    /// Propagation rewrites the just-edited document before scanning the
    /// rest, so a pass never reads another buffer's stale copy ahead of
    /// the source.
    pub fn snapshot_source_first(&self, source: &Url) -> Vec<Arc<dyn EditorBuffer>> {
        let mut editors: Vec<Arc<dyn EditorBuffer>> = Vec::with_capacity(self.editors.len());
        for entry in self.editors.iter() {
            editors.push(Arc::clone(entry.value()));
        }
        editors.sort_by_key(|editor| editor.uri() != *source);
        editors
    }
}
