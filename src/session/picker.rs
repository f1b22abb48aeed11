use std::collections::BTreeSet;

/// Checkbox list over the tag universe. The `selected` set is the only
/// source of truth for what the user picked.
#[derive(Clone, Debug)]
pub struct TagPicker {
    pub universe: Vec<String>,
    pub selected: BTreeSet<String>,
    pub cursor: usize,
}

impl TagPicker {
    /// Start from a saved selection, or every tag when nothing was saved.
    /// Saved tags no longer present in the universe are dropped.
    pub fn new(universe: Vec<String>, saved: Option<&BTreeSet<String>>) -> Self {
        let selected = match saved {
            Some(saved) => universe
                .iter()
                .filter(|t| saved.contains(*t))
                .cloned()
                .collect(),
            None => universe.iter().cloned().collect(),
        };
        Self {
            universe,
            selected,
            cursor: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.universe.is_empty()
    }

    pub fn is_selected(&self, tag: &str) -> bool {
        self.selected.contains(tag)
    }

    pub fn next(&mut self) {
        if !self.universe.is_empty() {
            self.cursor = (self.cursor + 1) % self.universe.len();
        }
    }

    pub fn prev(&mut self) {
        if self.universe.is_empty() {
            return;
        }
        if self.cursor > 0 {
            self.cursor -= 1;
        } else {
            self.cursor = self.universe.len() - 1;
        }
    }

    pub fn toggle_current(&mut self) {
        let Some(tag) = self.universe.get(self.cursor) else {
            return;
        };
        if !self.selected.remove(tag) {
            self.selected.insert(tag.clone());
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self.universe.iter().cloned().collect();
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    /// `All` when every tag is checked, otherwise `checked/total`.
    pub fn badge(&self) -> String {
        let total = self.universe.len();
        let checked = self.selected.len();
        if total > 0 && checked == total {
            "All".to_string()
        } else {
            format!("{checked}/{total}")
        }
    }

    /// The selection to persist: an empty pick means every tag.
    pub fn confirmed(&self) -> BTreeSet<String> {
        if self.selected.is_empty() {
            self.universe.iter().cloned().collect()
        } else {
            self.selected.clone()
        }
    }
}
