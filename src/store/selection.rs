use std::collections::BTreeSet;

use anyhow::Result;

use crate::store::json_store::SessionStorage;

pub const TAGS_KEY: &str = "selected_tags";
pub const SHOWN_KEY: &str = "shown";

/// Tag selection and shown-question history for one session.
///
/// Reads never fail: a missing or unparseable value reads as absent.
pub struct SelectionStore<S> {
    storage: S,
}

impl<S: SessionStorage> SelectionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Persist a new selection and start a fresh epoch in the same write.
    pub fn save_selection(&mut self, tags: &BTreeSet<String>) -> Result<()> {
        let json = serde_json::to_string(tags)?;
        self.storage
            .apply(&[(TAGS_KEY, Some(json.as_str())), (SHOWN_KEY, None)])
    }

    pub fn load_selection(&self) -> Option<BTreeSet<String>> {
        let raw = self.storage.get(TAGS_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    pub fn load_shown(&self) -> Vec<String> {
        self.storage
            .get(SHOWN_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn append_shown(&mut self, text: &str) -> Result<()> {
        let mut shown = self.load_shown();
        shown.push(text.to_string());
        let json = serde_json::to_string(&shown)?;
        self.storage.apply(&[(SHOWN_KEY, Some(json.as_str()))])
    }

    /// Forget the selection and history, ending the session.
    pub fn clear(&mut self) -> Result<()> {
        self.storage.clear()
    }
}
