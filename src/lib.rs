//! kagami — keeps block-referenced lines identical across a document
//! collection.
//!
//! A *synced line* is any line ending in a block-reference marker
//! `^<digits>`. When such a line changes in an open editor, the engine
//! waits for the edit burst to settle, then rewrites every other line
//! carrying the same block id — in open editors synchronously, in at-rest
//! documents via async I/O — while a re-entrancy guard keeps its own
//! writes from re-triggering propagation.
//!
//! Hosts implement [`EditorBuffer`] and [`ChangeSource`] over their editor
//! surface and [`Vault`] over their document store, then drive a
//! [`SyncEngine`].

pub mod block_id;
pub mod config;
pub mod debounce;
pub mod editor;
pub mod engine;
pub mod error;
pub mod guard;
pub mod propagate;
pub mod selection;
pub mod vault;

pub use block_id::{SyncedLine, contains_block_id, is_synced_line};
pub use config::Settings;
pub use debounce::{ChangeDebouncer, DEFAULT_DEBOUNCE_DURATION};
pub use editor::{
    ChangeHandler, ChangeSource, Cursor, EditorBuffer, EditorRegistry, SubscriptionId,
};
pub use engine::SyncEngine;
pub use error::{SyncError, SyncResult};
pub use guard::{ReentrancyGuard, WriteToken};
pub use propagate::{PendingChangeBatch, SyncPropagator};
pub use selection::{LineRange, Selection};
pub use vault::{FsVault, Vault};
