//! Engine wiring: change notifications in, document rewrites out.
//!
//! The engine owns the open-editor registry, the re-entrancy guard, the
//! debouncer and the propagator, and connects them: a change notification
//! that arrives while the guard is held is dropped on the floor (it was
//! caused by the engine's own write); any other notification re-arms the
//! debounce timer with a fresh batch. When the timer fires, the batch is
//! handed to the propagator once.

use std::sync::{Arc, Mutex, Weak};

use url::Url;

use crate::config::Settings;
use crate::debounce::ChangeDebouncer;
use crate::editor::{ChangeSource, EditorBuffer, EditorRegistry, SubscriptionId};
use crate::error::LockResultExt;
use crate::guard::ReentrancyGuard;
use crate::propagate::{PendingChangeBatch, SyncPropagator};
use crate::selection::Selection;
use crate::vault::Vault;

const LOG_TARGET: &str = "kagami::engine";

/// The synced-line engine for one document collection.
pub struct SyncEngine<V: Vault> {
    editors: Arc<EditorRegistry>,
    guard: Arc<ReentrancyGuard>,
    debouncer: ChangeDebouncer,
    propagator: Arc<SyncPropagator<V>>,
    subscription: Mutex<Option<(Arc<dyn ChangeSource>, SubscriptionId)>>,
    // Handed to change-source subscriptions; weak so a forgotten
    // unsubscribe cannot keep the engine alive
    this: Weak<Self>,
}

impl<V: Vault + 'static> SyncEngine<V> {
    pub fn new(vault: V, settings: Settings) -> Arc<Self> {
        let editors = Arc::new(EditorRegistry::new());
        let guard = Arc::new(ReentrancyGuard::new());
        let propagator = Arc::new(SyncPropagator::new(
            Arc::clone(&editors),
            Arc::new(vault),
            Arc::clone(&guard),
            &settings,
        ));

        Arc::new_cyclic(|this| Self {
            editors,
            guard,
            debouncer: ChangeDebouncer::with_delay(settings.debounce_duration()),
            propagator,
            subscription: Mutex::new(None),
            this: this.clone(),
        })
    }

    /// Register an editor that just opened.
    pub fn insert_editor(&self, editor: Arc<dyn EditorBuffer>) {
        self.editors.insert(editor);
    }

    /// Drop an editor that closed. Its document stays reachable through
    /// the vault.
    pub fn remove_editor(&self, uri: &Url) {
        self.editors.remove(uri);
    }

    /// Entry point for the host's change notifications.
    ///
    /// Returns immediately while the re-entrancy guard is held: such a
    /// notification was triggered by the engine's own write. Otherwise the
    /// debounce timer is re-armed with this batch, discarding any pending
    /// one.
    pub fn on_editor_change(&self, editor: Arc<dyn EditorBuffer>, selections: Vec<Selection>) {
        if self.guard.is_held() {
            log::trace!(
                target: LOG_TARGET,
                "Ignoring change notification from our own write to {}",
                editor.uri()
            );
            return;
        }

        let propagator = Arc::clone(&self.propagator);
        let batch = PendingChangeBatch { editor, selections };
        self.debouncer.schedule(async move {
            propagator.propagate_batch(batch).await;
        });
    }

    /// Subscribe to a host change source, replacing any prior attachment.
    pub fn attach(&self, source: Arc<dyn ChangeSource>) {
        let weak = self.this.clone();
        let id = source.subscribe(Arc::new(move |editor, selections| {
            if let Some(engine) = weak.upgrade() {
                engine.on_editor_change(editor, selections);
            }
        }));

        let mut slot = self.subscription.lock().recover_poison("engine.attach");
        if let Some((prev_source, prev_id)) = slot.replace((source, id)) {
            prev_source.unsubscribe(prev_id);
        }
    }

    /// Detach from the change source and drop any pending debounce timer.
    pub fn shutdown(&self) {
        let mut slot = self.subscription.lock().recover_poison("engine.shutdown");
        if let Some((source, id)) = slot.take() {
            source.unsubscribe(id);
        }
        self.debouncer.cancel();
        log::debug!(target: LOG_TARGET, "Engine shut down");
    }
}
