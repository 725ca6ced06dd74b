//! Card grid geometry.
//!
//! The grid is recomputed on every frame from the viewport size and the
//! loaded ids, so drag hit-testing always sees the layout the user is
//! looking at. Card bounds are kept in content coordinates (scroll offset
//! included); conversions to and from screen cells happen here.

use crate::tui::geometry::{Bounds, Point};
use crate::tui::selection::{GeometryProvider, ItemId};
use ratatui::layout::Rect;
use std::collections::HashMap;

pub const CARD_HEIGHT: u16 = 7;
pub const GAP: u16 = 1;
pub const MIN_CARD_WIDTH: u16 = 28;
pub const MAX_COLUMNS: u16 = 4;
/// Rows reserved under the last card for the loading/error/end marker.
pub const FOOTER_HEIGHT: u16 = 3;

#[derive(Debug, Clone, Default)]
pub struct GridLayout {
    viewport: Rect,
    columns: u16,
    card_width: u16,
    order: Vec<ItemId>,
    cards: HashMap<ItemId, Bounds>,
}

impl GridLayout {
    pub fn compute(viewport: Rect, ids: &[ItemId]) -> Self {
        let columns = columns_for(viewport.width);
        let gaps = GAP * (columns - 1);
        let card_width = (viewport.width.saturating_sub(gaps) / columns).max(1);

        let mut cards = HashMap::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            cards.insert(id.clone(), slot_bounds(index, columns, card_width));
        }

        Self {
            viewport,
            columns,
            card_width,
            order: ids.to_vec(),
            cards,
        }
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn columns(&self) -> usize {
        self.columns as usize
    }

    pub fn card_width(&self) -> u16 {
        self.card_width
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Bounds of the `index`th slot, whether or not an item occupies it.
    pub fn slot(&self, index: usize) -> Bounds {
        slot_bounds(index, self.columns.max(1), self.card_width)
    }

    fn rows(&self) -> i32 {
        let columns = self.columns.max(1) as usize;
        self.order.len().div_ceil(columns) as i32
    }

    /// First content row below the cards; the sentinel lives here.
    pub fn sentinel_row(&self) -> i32 {
        self.rows() * (CARD_HEIGHT + GAP) as i32
    }

    /// The footer cell under `column`, used for the placeholder cards shown
    /// while the next page loads.
    pub fn footer_slot(&self, column: usize) -> Bounds {
        let card = self.slot(column);
        let top = self.sentinel_row();
        Bounds::new(card.left, top, card.right, top + FOOTER_HEIGHT as i32 - 1)
    }

    pub fn content_height(&self) -> i32 {
        self.sentinel_row() + FOOTER_HEIGHT as i32
    }

    pub fn max_scroll(&self) -> i32 {
        (self.content_height() - self.viewport.height as i32).max(0)
    }

    pub fn sentinel_visible(&self, scroll: i32) -> bool {
        self.sentinel_row() < scroll + self.viewport.height as i32
    }

    /// Screen cell to content point, or `None` outside the viewport.
    pub fn to_content(&self, column: u16, row: u16, scroll: i32) -> Option<Point> {
        let inside = column >= self.viewport.x
            && column < self.viewport.x + self.viewport.width
            && row >= self.viewport.y
            && row < self.viewport.y + self.viewport.height;
        if !inside {
            return None;
        }
        Some(self.to_content_clamped(column, row, scroll))
    }

    /// Like [`to_content`](Self::to_content), but pins points outside the
    /// viewport to its nearest edge. Drags keep tracking past the grid.
    pub fn to_content_clamped(&self, column: u16, row: u16, scroll: i32) -> Point {
        let max_x = (self.viewport.width as i32 - 1).max(0);
        let max_y = (self.viewport.height as i32 - 1).max(0);
        let x = (column as i32 - self.viewport.x as i32).clamp(0, max_x);
        let y = (row as i32 - self.viewport.y as i32).clamp(0, max_y);
        Point::new(x, y + scroll)
    }

    /// Content bounds to the on-screen rect they occupy, clipped to the
    /// viewport. `None` when fully scrolled out of view.
    pub fn to_screen(&self, bounds: Bounds, scroll: i32) -> Option<Rect> {
        let top_edge = scroll;
        let bottom_edge = scroll + self.viewport.height as i32 - 1;
        let right_edge = self.viewport.width as i32 - 1;

        let top = bounds.top.max(top_edge);
        let bottom = bounds.bottom.min(bottom_edge);
        let left = bounds.left.max(0);
        let right = bounds.right.min(right_edge);
        if top > bottom || left > right {
            return None;
        }

        Some(Rect::new(
            self.viewport.x + left as u16,
            self.viewport.y + (top - scroll) as u16,
            (right - left + 1) as u16,
            (bottom - top + 1) as u16,
        ))
    }

    pub fn hit_test(&self, point: Point) -> Option<&ItemId> {
        self.order
            .iter()
            .find(|id| self.cards.get(*id).is_some_and(|b| b.contains(point)))
    }

    /// Scroll offset that brings the card at `index` fully into view.
    pub fn scroll_to_reveal(&self, index: usize, scroll: i32) -> i32 {
        let card = self.slot(index);
        let height = self.viewport.height as i32;
        let target = if card.top < scroll {
            card.top
        } else if card.bottom >= scroll + height {
            card.bottom - height + 1
        } else {
            scroll
        };
        target.clamp(0, self.max_scroll())
    }
}

impl GeometryProvider for GridLayout {
    fn item_bounds(&self, id: &str) -> Option<Bounds> {
        self.cards.get(id).copied()
    }
}

/// One column per `MIN_CARD_WIDTH` cells, up to four.
pub fn columns_for(width: u16) -> u16 {
    ((width + GAP) / (MIN_CARD_WIDTH + GAP)).clamp(1, MAX_COLUMNS)
}

fn slot_bounds(index: usize, columns: u16, card_width: u16) -> Bounds {
    let columns = columns as usize;
    let col = (index % columns) as i32;
    let row = (index / columns) as i32;
    let left = col * (card_width + GAP) as i32;
    let top = row * (CARD_HEIGHT + GAP) as i32;
    Bounds::new(
        left,
        top,
        left + card_width as i32 - 1,
        top + CARD_HEIGHT as i32 - 1,
    )
}
