use crate::notes::models::NoteFilter;

/// Search bar and privacy segment. Edits happen on a draft; the list only
/// restarts when a changed filter is applied.
pub struct SearchState {
    pub search_mode: bool,
    pub draft: String,
    applied: NoteFilter,
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            search_mode: false,
            draft: String::new(),
            applied: NoteFilter::default(),
        }
    }

    pub fn filter(&self) -> &NoteFilter {
        &self.applied
    }

    pub fn enter_search_mode(&mut self) {
        self.search_mode = true;
        self.draft = self.applied.query.clone();
    }

    pub fn cancel_search(&mut self) {
        self.search_mode = false;
        self.draft = self.applied.query.clone();
    }

    /// Leave search mode. Returns the new filter if the query changed.
    pub fn confirm_search(&mut self) -> Option<NoteFilter> {
        self.search_mode = false;
        let query = self.draft.trim().to_string();
        self.draft = query.clone();
        if query == self.applied.query {
            return None;
        }
        self.applied.query = query;
        Some(self.applied.clone())
    }

    pub fn insert_char(&mut self, c: char) {
        self.draft.push(c);
    }

    pub fn backspace(&mut self) {
        self.draft.pop();
    }

    pub fn clear_draft(&mut self) {
        self.draft.clear();
    }

    /// Drop the applied query. Returns the new filter if there was one.
    pub fn clear_query(&mut self) -> Option<NoteFilter> {
        self.draft.clear();
        if self.applied.query.is_empty() {
            return None;
        }
        self.applied.query.clear();
        Some(self.applied.clone())
    }

    pub fn cycle_privacy(&mut self) -> NoteFilter {
        self.applied.privacy = self.applied.privacy.next();
        self.applied.clone()
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}
