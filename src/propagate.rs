//! Cross-document propagation of synced lines.
//!
//! Given one changed synced line, the propagator makes every line in the
//! collection sharing its block id read identically to it. Open editors
//! are rewritten first (synchronously, under the re-entrancy guard, source
//! editor ahead of the rest), then at-rest documents one at a time.
//!
//! Failures are isolated per line and per document: a malformed marker
//! aborts only that line, an I/O failure abandons only that document, and
//! completed writes are never rolled back.

use std::collections::HashSet;
use std::sync::Arc;

use url::Url;

use crate::block_id::{self, SyncedLine};
use crate::config::Settings;
use crate::editor::{EditorBuffer, EditorRegistry};
use crate::error::SyncError;
use crate::guard::ReentrancyGuard;
use crate::vault::Vault;

const LOG_TARGET: &str = "kagami::propagate";

/// The debounced unit of work: the changed editor plus the selections
/// captured with the last change notification. Consumed exactly once.
pub struct PendingChangeBatch {
    pub editor: Arc<dyn EditorBuffer>,
    pub selections: Vec<crate::selection::Selection>,
}

/// Replace every line of `content` matching `source`'s block id with the
/// source text. Returns the resulting lines and how many were matched.
///
/// Splitting on `\n` keeps empty segments, so joining the untouched result
/// reproduces the input byte for byte, trailing newline included.
fn rewrite_lines<'a>(content: &'a str, source: &'a SyncedLine) -> (Vec<&'a str>, usize) {
    let mut matched = 0;
    let lines = content
        .split('\n')
        .map(|line| {
            if block_id::contains_block_id(line, source.block_id()) {
                matched += 1;
                source.raw_text()
            } else {
                line
            }
        })
        .collect();
    (lines, matched)
}

/// Rewrites all lines sharing a changed line's block id, everywhere.
pub struct SyncPropagator<V: Vault> {
    editors: Arc<EditorRegistry>,
    vault: Arc<V>,
    guard: Arc<ReentrancyGuard>,
    skip_open_in_vault_pass: bool,
}

impl<V: Vault> SyncPropagator<V> {
    pub fn new(
        editors: Arc<EditorRegistry>,
        vault: Arc<V>,
        guard: Arc<ReentrancyGuard>,
        settings: &Settings,
    ) -> Self {
        Self {
            editors,
            vault,
            guard,
            skip_open_in_vault_pass: settings.skip_open_documents_in_vault_pass,
        }
    }

    /// Process one debounced batch.
    ///
    /// Every synced line inside the batch's selection ranges propagates
    /// independently; one line's failure never blocks the others. Lines
    /// are re-read from the editor here because the buffer may have moved
    /// on since the notification that armed the timer.
    pub async fn propagate_batch(&self, batch: PendingChangeBatch) {
        let source_uri = batch.editor.uri();

        for selection in &batch.selections {
            for line_no in selection.line_range().lines() {
                let Some(text) = batch.editor.line(line_no) else {
                    continue;
                };
                if !block_id::is_synced_line(&text) {
                    continue;
                }
                match SyncedLine::parse(&text) {
                    Ok(source) => self.propagate_line(&source, &source_uri).await,
                    Err(err) => {
                        // Unreachable while parse and is_synced_line share
                        // one pattern; isolated anyway
                        log::error!(
                            target: LOG_TARGET,
                            "Skipping line {} of {}: {}",
                            line_no,
                            source_uri,
                            err
                        );
                    }
                }
            }
        }
    }

    /// Propagate one synced line to every document sharing its block id.
    pub async fn propagate_line(&self, source: &SyncedLine, source_uri: &Url) {
        let updated_open = self.rewrite_open_editors(source, source_uri);
        self.rewrite_vault(source, &updated_open).await;
    }

    /// Open-editor pass: synchronous in-memory rewrites, source first.
    ///
    /// The guard is held tightly around each write/cursor-restore pair;
    /// there is no suspension point inside the token's scope, so the
    /// host's re-entrant change notification is the only thing that can
    /// observe it held. Returns the identities that were rewritten.
    fn rewrite_open_editors(&self, source: &SyncedLine, source_uri: &Url) -> HashSet<Url> {
        let mut updated = HashSet::new();

        for editor in self.editors.snapshot_source_first(source_uri) {
            let content = editor.content();
            let (lines, matched) = rewrite_lines(&content, source);
            if matched == 0 {
                continue;
            }

            let cursor = editor.cursor();
            let new_content = lines.join("\n");
            {
                let _token = self.guard.hold();
                editor.set_content(&new_content);
                editor.set_cursor(cursor.clamped_to(&lines));
            }

            let uri = editor.uri();
            log::debug!(
                target: LOG_TARGET,
                "Rewrote {} line(s) with ^{} in open editor {}",
                matched,
                source.block_id(),
                uri
            );
            updated.insert(uri);
        }

        updated
    }

    /// At-rest pass: sequential async rewrites over the vault.
    ///
    /// Not guarded (no editor change notification fires for these writes).
    /// Documents already rewritten through an open editor are skipped when
    /// configured; writing them anyway would only repeat identical content.
    async fn rewrite_vault(&self, source: &SyncedLine, updated_open: &HashSet<Url>) {
        let documents = match self.vault.list_documents().await {
            Ok(documents) => documents,
            Err(err) => {
                log::error!(
                    target: LOG_TARGET,
                    "Cannot enumerate vault, at-rest pass aborted: {}",
                    err
                );
                return;
            }
        };

        for uri in documents {
            if self.skip_open_in_vault_pass && updated_open.contains(&uri) {
                continue;
            }
            if let Err(err) = self.rewrite_vault_document(source, &uri).await {
                log::error!(
                    target: LOG_TARGET,
                    "Propagation of ^{} to {} abandoned: {}",
                    source.block_id(),
                    uri,
                    err
                );
            }
        }
    }

    async fn rewrite_vault_document(
        &self,
        source: &SyncedLine,
        uri: &Url,
    ) -> Result<(), SyncError> {
        let content = self.vault.read(uri).await?;
        let (lines, matched) = rewrite_lines(&content, source);
        if matched == 0 {
            return Ok(());
        }

        let new_content = lines.join("\n");
        // Matched lines may already carry the source text; rewriting them
        // would only churn mtimes
        if new_content == content {
            return Ok(());
        }

        self.vault.write(uri, &new_content).await?;
        log::debug!(
            target: LOG_TARGET,
            "Updated block reference ^{} in at-rest document {}",
            source.block_id(),
            uri
        );
        Ok(())
    }
}
