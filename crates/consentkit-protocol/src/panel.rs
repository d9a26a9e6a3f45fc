//! State behind a consent dialog.
//!
//! The panel edits a draft copy of the preferences. Nothing reaches the
//! store until the visitor accepts, rejects or saves.

use std::sync::Arc;

use crate::lifecycle::ConsentManager;
use crate::preferences::{Category, CategorySet};

pub struct ConsentPanel {
    manager: Arc<ConsentManager>,
    draft: CategorySet,
    visible: bool,
    has_consented: bool,
}

impl ConsentPanel {
    /// Load the saved decision. The panel starts visible when there is none.
    pub fn open(manager: Arc<ConsentManager>) -> Self {
        let saved = manager.store().get_preferences();
        let has_consented = saved.is_some();
        Self {
            manager,
            draft: saved.unwrap_or_default(),
            visible: !has_consented,
            has_consented,
        }
    }

    pub fn draft(&self) -> &CategorySet {
        &self.draft
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn has_consented(&self) -> bool {
        self.has_consented
    }

    /// Granted and total category counts of the draft.
    pub fn summary(&self) -> (usize, usize) {
        (self.draft.granted_count(), Category::all().len())
    }

    /// Toggle one category in the draft. `Necessary` is ignored.
    pub fn update_preference(&mut self, category: Category, granted: bool) {
        self.draft.set(category, granted);
    }

    pub fn accept_all(&mut self) {
        let record = self.manager.accept_all();
        self.committed(record.preferences);
    }

    pub fn reject_all(&mut self) {
        let record = self.manager.reject_all();
        self.committed(record.preferences);
    }

    /// Commit the draft as a custom decision.
    pub fn save(&mut self) {
        let record = self.manager.save_custom(self.draft);
        self.committed(record.preferences);
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Throw away unsaved edits.
    pub fn discard(&mut self) {
        self.draft = self.manager.store().get_preferences().unwrap_or_default();
    }

    /// Revoke consent and ask again.
    pub fn reset(&mut self) {
        self.manager.reset();
        self.draft = CategorySet::default();
        self.has_consented = false;
        self.visible = true;
    }

    fn committed(&mut self, prefs: CategorySet) {
        self.draft = prefs;
        self.has_consented = true;
        self.visible = false;
    }
}
