use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::models::ShortcutEntry;

/// Everything the list manager reports to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ViewEvent {
    ShowProgress,
    HideProgress,
    ShowAddButton,
    HideAddButton,
    MaxItemsError,
    OpenApplicationListError,
    ShowUndo,
    HideUndo,
    ReorderMode { enabled: bool },
    UpdateItems { items: Vec<ShortcutEntry> },
    AddItem { position: usize, entry: ShortcutEntry },
    RemoveItem { position: usize },
    MoveItem { from: usize, to: usize },
    ShowPicker { entries: Vec<ShortcutEntry> },
}

pub trait ShortcutView: Send {
    fn report(&mut self, event: ViewEvent);
}

/// Collects events into a shared buffer the caller keeps a handle to.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    events: Arc<Mutex<Vec<ViewEvent>>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains everything reported so far.
    pub fn take(&self) -> Vec<ViewEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl ShortcutView for RecordingView {
    fn report(&mut self, event: ViewEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
