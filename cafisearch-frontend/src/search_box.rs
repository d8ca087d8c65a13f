///! Search box state: query text, dropdown results and keyboard selection

use cafisearch_common::Place;

/// Entries shown in the dropdown
pub const DROPDOWN_LIMIT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Escape,
}

#[derive(Debug, Default)]
pub struct SearchBox {
    query: String,
    results: Vec<Place>,
    loading: bool,
    selected: Option<usize>,
}

impl SearchBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Results shown in the dropdown
    pub fn visible_results(&self) -> &[Place] {
        &self.results[..self.results.len().min(DROPDOWN_LIMIT)]
    }

    /// Keystroke: update the text and show loading until the debounced
    /// search settles
    pub fn input(&mut self, value: &str) {
        self.query = value.to_string();
        self.loading = true;
    }

    /// Debounced value arrived; returns the query to send, if any.
    ///
    /// Blank input clears the dropdown without contacting the backend.
    pub fn settle(&mut self, value: &str) -> Option<String> {
        if value.trim().is_empty() {
            self.clear();
            self.loading = false;
            return None;
        }
        self.loading = true;
        Some(value.to_string())
    }

    /// Apply results for `query`; responses for an outdated query are dropped
    pub fn set_results(&mut self, query: &str, results: Vec<Place>) -> bool {
        if query != self.query {
            tracing::debug!("Dropping stale results for '{}'", query);
            return false;
        }
        self.results = results;
        self.selected = None;
        self.loading = false;
        true
    }

    /// Handle a navigation key; returns the picked place on Enter
    pub fn handle_key(&mut self, key: Key) -> Option<Place> {
        let count = self.visible_results().len();
        match key {
            Key::Down => {
                if count > 0 {
                    self.selected = Some(match self.selected {
                        Some(i) => (i + 1).min(count - 1),
                        None => 0,
                    });
                }
                None
            }
            Key::Up => {
                self.selected = match self.selected {
                    Some(0) | None => None,
                    Some(i) => Some(i - 1),
                };
                None
            }
            Key::Enter => {
                let index = self.selected.unwrap_or(0);
                let place = self.visible_results().get(index).cloned()?;
                Some(self.pick(place))
            }
            Key::Escape => {
                self.clear();
                None
            }
        }
    }

    /// Choose a place: the query becomes its name and the dropdown closes
    pub fn pick(&mut self, place: Place) -> Place {
        self.query = place.name.clone();
        self.clear();
        place
    }

    fn clear(&mut self) {
        self.results.clear();
        self.selected = None;
    }
}
