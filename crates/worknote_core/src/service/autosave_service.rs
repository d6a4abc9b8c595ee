//! Auto-save slot service.
//!
//! # Responsibility
//! - Keep a best-effort, latest-write-wins copy of the form being typed.
//!
//! # Invariants
//! - No operation returns an error; storage failures are logged and dropped.
//! - The save timestamp never leaves this module through `load_snapshot`.

use crate::model::draft::now_epoch_ms;
use crate::model::knowledge::KnowledgeInput;
use crate::repo::snapshot_repo::{Snapshot, SnapshotSlot};
use log::{debug, warn};

/// Silent-failure wrapper around one `SnapshotSlot`.
pub struct AutoSave<S: SnapshotSlot> {
    slot: S,
}

impl<S: SnapshotSlot> AutoSave<S> {
    pub fn new(slot: S) -> Self {
        Self { slot }
    }

    /// Overwrites the slot with `input`.
    pub fn save_snapshot(&self, input: &KnowledgeInput) {
        let snapshot = Snapshot {
            input: input.clone(),
            saved_at: now_epoch_ms(),
        };
        match self.slot.write(&snapshot) {
            Ok(()) => debug!(
                "event=autosave_write module=autosave status=ok saved_at={}",
                snapshot.saved_at
            ),
            Err(err) => warn!("event=autosave_write module=autosave status=error error={err}"),
        }
    }

    /// Returns the last saved form, or `None` when empty or unreadable.
    pub fn load_snapshot(&self) -> Option<KnowledgeInput> {
        match self.slot.read() {
            Ok(snapshot) => snapshot.map(|snapshot| snapshot.input),
            Err(err) => {
                warn!("event=autosave_read module=autosave status=error error={err}");
                None
            }
        }
    }

    /// Empties the slot.
    pub fn clear_snapshot(&self) {
        if let Err(err) = self.slot.clear() {
            warn!("event=autosave_clear module=autosave status=error error={err}");
        }
    }

    /// Save time of the current snapshot, for diagnostics only.
    pub fn last_saved_at(&self) -> Option<i64> {
        self.slot.read().ok().flatten().map(|snapshot| snapshot.saved_at)
    }
}
