use std::collections::BTreeSet;

use serde::Serialize;

/// Transient search state of the list screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub search_text: String,
    /// Internal category names.
    pub selected_categories: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.search_text.is_empty() && self.selected_categories.is_empty()
    }

    /// Flips membership of `name`. Returns true if it is selected afterwards.
    pub fn toggle_category(&mut self, name: &str) -> bool {
        if self.selected_categories.remove(name) {
            false
        } else {
            self.selected_categories.insert(name.to_string());
            true
        }
    }
}
