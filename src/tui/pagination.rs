//! Incremental loading of an offset-paginated, server-ordered list.
//!
//! Fetching is split in two phases so the controller never blocks:
//! [`IncrementalListController::load_more`] hands back a [`PageRequest`]
//! for the host to execute, and the host feeds the outcome back through
//! [`IncrementalListController::apply`]. Each request carries the
//! generation it was issued under; a response whose generation, filter or
//! offset no longer matches is dropped as stale.

use crate::tui::selection::ItemId;
use log::{debug, warn};
use std::collections::HashSet;
use thiserror::Error;

/// Anything the list can hold: it only needs a stable identifier.
pub trait Identified {
    fn item_id(&self) -> ItemId;
}

/// One page as reported by the item source.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    pub next_offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<F> {
    pub generation: u64,
    pub filter: F,
    pub offset: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("item source unavailable: {0}")]
    Unavailable(String),
    #[error("loader is not running")]
    Disconnected,
}

/// Request/response access to the backing collection.
pub trait ItemSource<T, F> {
    /// Return at most `limit` items starting at `offset`, with an accurate
    /// `has_more`.
    fn fetch(&mut self, filter: &F, offset: usize, limit: usize) -> Result<Page<T>, FetchError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Errored(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { added: usize, duplicates: usize },
    Failed,
    Stale,
}

/// What the grid should render in place of, or below, the cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    /// Nothing loaded yet and a page is in flight.
    Skeleton,
    /// The query finished with no results.
    Empty,
    Populated,
}

#[derive(Debug)]
pub struct IncrementalListController<T, F> {
    items: Vec<T>,
    ids: Vec<ItemId>,
    seen: HashSet<ItemId>,
    has_more: bool,
    cursor: usize,
    status: LoadStatus,
    filter: F,
    generation: u64,
    page_size: usize,
}

impl<T, F> IncrementalListController<T, F>
where
    T: Identified,
    F: Clone + PartialEq,
{
    /// An empty list that still expects its first page.
    pub fn new(filter: F, page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            ids: Vec::new(),
            seen: HashSet::new(),
            has_more: true,
            cursor: 0,
            status: LoadStatus::Idle,
            filter,
            generation: 0,
            page_size: page_size.max(1),
        }
    }

    /// Replace everything. Used whenever the query identity changes; any
    /// request issued before this call becomes stale.
    pub fn reset(&mut self, filter: F, items: Vec<T>, has_more: bool, cursor: usize) {
        self.generation += 1;
        self.filter = filter;
        self.items.clear();
        self.ids.clear();
        self.seen.clear();
        self.has_more = has_more;
        self.cursor = cursor;
        self.status = LoadStatus::Idle;
        self.append_unique(items);
        debug!(
            "list reset (generation {}): {} items, cursor {}, has_more {}",
            self.generation,
            self.items.len(),
            cursor,
            has_more
        );
    }

    /// Reset to an empty list for `filter`, ready to fetch from offset 0.
    pub fn restart(&mut self, filter: F) {
        self.reset(filter, Vec::new(), true, 0);
    }

    /// Issue the next page request, unless one is already in flight or the
    /// source has nothing more.
    pub fn load_more(&mut self) -> Option<PageRequest<F>> {
        if self.status == LoadStatus::Loading || !self.has_more {
            return None;
        }

        self.status = LoadStatus::Loading;
        let request = PageRequest {
            generation: self.generation,
            filter: self.filter.clone(),
            offset: self.cursor,
            limit: self.page_size,
        };
        debug!("requesting page at offset {} (generation {})", request.offset, request.generation);
        Some(request)
    }

    /// User-triggered retry from the error affordance.
    pub fn retry(&mut self) -> Option<PageRequest<F>> {
        if self.is_errored() {
            self.load_more()
        } else {
            None
        }
    }

    /// The end-of-list sentinel scrolled into view. An errored list waits
    /// for an explicit retry.
    pub fn sentinel_visible(&mut self) -> Option<PageRequest<F>> {
        match self.status {
            LoadStatus::Idle => self.load_more(),
            LoadStatus::Loading | LoadStatus::Errored(_) => None,
        }
    }

    /// Apply the outcome of `request`. A page is applied atomically: either
    /// all of its new items are appended or, on error, nothing changes but
    /// the status.
    pub fn apply(&mut self, request: &PageRequest<F>, result: Result<Page<T>, FetchError>) -> ApplyOutcome {
        if !self.is_current(request) {
            debug!(
                "discarding stale page for offset {} (generation {}, now {})",
                request.offset, request.generation, self.generation
            );
            return ApplyOutcome::Stale;
        }

        match result {
            Ok(page) => {
                let received = page.items.len();
                let added = self.append_unique(page.items);
                self.has_more = page.has_more;
                self.cursor = page.next_offset;
                self.status = LoadStatus::Idle;
                debug!(
                    "applied page at offset {}: {} added, {} duplicates, has_more {}",
                    request.offset,
                    added,
                    received - added,
                    self.has_more
                );
                ApplyOutcome::Applied {
                    added,
                    duplicates: received - added,
                }
            }
            Err(e) => {
                warn!("page fetch at offset {} failed: {}", request.offset, e);
                self.status = LoadStatus::Errored(e.to_string());
                ApplyOutcome::Failed
            }
        }
    }

    fn is_current(&self, request: &PageRequest<F>) -> bool {
        request.generation == self.generation
            && request.offset == self.cursor
            && request.filter == self.filter
            && self.status == LoadStatus::Loading
    }

    fn append_unique(&mut self, incoming: Vec<T>) -> usize {
        let mut added = 0;
        for item in incoming {
            let id = item.item_id();
            if self.seen.insert(id.clone()) {
                self.ids.push(id);
                self.items.push(item);
                added += 1;
            }
        }
        added
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Identifiers of the loaded items, in list order.
    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&T> {
        self.position(id).map(|i| &self.items[i])
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        if !self.seen.contains(id) {
            return None;
        }
        self.ids.iter().position(|known| known == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn is_errored(&self) -> bool {
        matches!(self.status, LoadStatus::Errored(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            LoadStatus::Errored(message) => Some(message),
            _ => None,
        }
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn phase(&self) -> ListPhase {
        if !self.items.is_empty() {
            ListPhase::Populated
        } else if self.is_loading() || (self.has_more && !self.is_errored()) {
            ListPhase::Skeleton
        } else {
            ListPhase::Empty
        }
    }
}
