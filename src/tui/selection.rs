//! Multi-select state for the card grid.
//!
//! [`SelectionEngine`] owns the set of selected note ids and the rubber-band
//! drag that mutates it. It knows nothing about terminals or events; the
//! hosting view translates input into the commands below.

use crate::tui::geometry::{calculate_box, intersects, Bounds, Point, SelectionBox};
use log::debug;
use std::collections::{HashMap, HashSet};

pub type ItemId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    View,
    Selecting,
}

/// Modifier keys held when a drag starts. Any of them keeps the current
/// selection as the drag's baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DragModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl DragModifiers {
    #[cfg(test)]
    pub const NONE: DragModifiers = DragModifiers { shift: false, ctrl: false, meta: false };

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// What sits under the pointer when a drag would begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Background,
    /// Cards, buttons and inputs handle their own clicks.
    Interactive,
}

/// Live bounding boxes of rendered items, looked up on every drag update.
pub trait GeometryProvider {
    fn item_bounds(&self, id: &str) -> Option<Bounds>;
}

impl GeometryProvider for HashMap<ItemId, Bounds> {
    fn item_bounds(&self, id: &str) -> Option<Bounds> {
        self.get(id).copied()
    }
}

/// Result of a plain click on an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// View mode: the host should navigate to the item.
    Open(ItemId),
    /// Selecting mode: membership was flipped.
    Toggled,
}

#[derive(Debug, Clone)]
struct DragState {
    origin: Point,
    baseline: HashSet<ItemId>,
}

#[derive(Debug, Default)]
pub struct SelectionEngine {
    mode: SelectionMode,
    selected: HashSet<ItemId>,
    drag: Option<DragState>,
    selection_box: Option<SelectionBox>,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn is_selecting(&self) -> bool {
        self.mode == SelectionMode::Selecting
    }

    #[cfg(test)]
    pub fn selected_ids(&self) -> &HashSet<ItemId> {
        &self.selected
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids in a stable order, for dispatching bulk actions.
    pub fn sorted_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn selection_box(&self) -> Option<SelectionBox> {
        self.selection_box
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn toggle(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
        self.sync_mode();
    }

    /// Enter selecting mode with exactly `id` selected.
    pub fn start_with(&mut self, id: &str) {
        self.selected.clear();
        self.selected.insert(id.to_string());
        self.sync_mode();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.drag = None;
        self.selection_box = None;
        self.sync_mode();
    }

    pub fn select_all<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = ItemId>,
    {
        self.selected = ids.into_iter().collect();
        self.sync_mode();
    }

    /// Plain click on an item.
    pub fn activate(&mut self, id: &str) -> Activation {
        if self.is_selecting() {
            self.toggle(id);
            Activation::Toggled
        } else {
            Activation::Open(id.to_string())
        }
    }

    /// Long-press on an item: starts a fresh selection, or toggles when one
    /// is already in progress.
    pub fn long_press(&mut self, id: &str) {
        if self.is_selecting() {
            self.toggle(id);
        } else {
            self.start_with(id);
        }
    }

    /// Start a rubber-band drag. Returns false when the press landed on an
    /// interactive element, in which case nothing changes.
    pub fn begin_drag(&mut self, origin: Point, target: PointerTarget, modifiers: DragModifiers) -> bool {
        if target == PointerTarget::Interactive {
            return false;
        }

        let baseline = if modifiers.any() {
            self.selected.clone()
        } else {
            self.selected.clear();
            self.sync_mode();
            HashSet::new()
        };

        debug!(
            "drag started at ({}, {}) with {} baseline ids",
            origin.x,
            origin.y,
            baseline.len()
        );
        self.drag = Some(DragState { origin, baseline });
        self.selection_box = Some(SelectionBox { x: origin.x, y: origin.y, width: 0, height: 0 });
        true
    }

    /// Recompute the rectangle and the selection from the pointer's current
    /// position. `ids` is the set of items currently in the list; each is
    /// hit-tested against its live bounds, and ids without geometry are
    /// treated as not intersecting.
    pub fn update_drag<'a, I, G>(&mut self, current: Point, ids: I, geometry: &G)
    where
        I: IntoIterator<Item = &'a str>,
        G: GeometryProvider + ?Sized,
    {
        let Some(drag) = &self.drag else {
            return;
        };

        let rubber_band = calculate_box(drag.origin, current);
        let band = rubber_band.bounds();

        let mut next = drag.baseline.clone();
        for id in ids {
            let hit = geometry
                .item_bounds(id)
                .is_some_and(|item| intersects(&band, &item));
            if hit {
                next.insert(id.to_string());
            }
        }

        self.selection_box = Some(rubber_band);
        self.selected = next;
        self.sync_mode();
    }

    pub fn end_drag(&mut self) {
        if self.drag.take().is_some() {
            debug!("drag ended with {} selected", self.selected.len());
        }
        self.selection_box = None;
    }

    fn sync_mode(&mut self) {
        self.mode = if self.selected.is_empty() {
            SelectionMode::View
        } else {
            SelectionMode::Selecting
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_geometry() -> HashMap<ItemId, Bounds> {
        let mut map = HashMap::new();
        map.insert("1".to_string(), Bounds::new(0, 0, 10, 10));
        map.insert("2".to_string(), Bounds::new(20, 0, 30, 10));
        map.insert("3".to_string(), Bounds::new(100, 0, 110, 10));
        map
    }

    const IDS: [&str; 3] = ["1", "2", "3"];

    fn ids(list: &[&str]) -> HashSet<ItemId> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn assert_mode_matches(engine: &SelectionEngine) {
        assert_eq!(engine.is_selecting(), !engine.is_empty());
    }

    #[test]
    fn test_new_engine_is_in_view_mode() {
        let engine = SelectionEngine::new();
        assert_eq!(engine.mode(), SelectionMode::View);
        assert!(engine.is_empty());
        assert!(engine.selection_box().is_none());
    }

    #[test]
    fn test_toggle_enters_and_leaves_selecting() {
        let mut engine = SelectionEngine::new();
        engine.toggle("a");
        assert_eq!(engine.mode(), SelectionMode::Selecting);
        assert!(engine.is_selected("a"));

        engine.toggle("a");
        assert_eq!(engine.mode(), SelectionMode::View);
        assert!(engine.is_empty());
    }

    #[test]
    fn test_toggle_twice_restores_previous_set() {
        let mut engine = SelectionEngine::new();
        engine.select_all(vec!["a".to_string(), "b".to_string()]);
        let before = engine.selected_ids().clone();

        engine.toggle("c");
        engine.toggle("c");
        assert_eq!(engine.selected_ids(), &before);

        engine.toggle("a");
        engine.toggle("a");
        assert_eq!(engine.selected_ids(), &before);
        assert_mode_matches(&engine);
    }

    #[test]
    fn test_start_with_then_toggle_returns_to_view() {
        let mut engine = SelectionEngine::new();
        engine.start_with("n1");
        assert_eq!(engine.selected_ids(), &ids(&["n1"]));
        assert!(engine.is_selecting());

        engine.toggle("n1");
        assert!(engine.is_empty());
        assert_eq!(engine.mode(), SelectionMode::View);
    }

    #[test]
    fn test_start_with_discards_prior_selection() {
        let mut engine = SelectionEngine::new();
        engine.select_all(vec!["a".to_string(), "b".to_string()]);
        engine.start_with("c");
        assert_eq!(engine.selected_ids(), &ids(&["c"]));
    }

    #[test]
    fn test_clear_cancels_drag() {
        let mut engine = SelectionEngine::new();
        engine.begin_drag(Point::new(0, 0), PointerTarget::Background, DragModifiers::NONE);
        engine.update_drag(Point::new(25, 10), IDS, &strip_geometry());
        assert!(engine.selection_box().is_some());

        engine.clear();
        assert!(engine.is_empty());
        assert!(!engine.is_dragging());
        assert!(engine.selection_box().is_none());
        assert_eq!(engine.mode(), SelectionMode::View);
    }

    #[test]
    fn test_select_all_and_empty_select_all() {
        let mut engine = SelectionEngine::new();
        engine.select_all(IDS.iter().map(|s| s.to_string()));
        assert_eq!(engine.len(), 3);
        assert!(engine.is_selecting());

        engine.select_all(Vec::new());
        assert_eq!(engine.mode(), SelectionMode::View);
    }

    #[test]
    fn test_drag_selects_intersecting_items() {
        let mut engine = SelectionEngine::new();
        assert!(engine.begin_drag(Point::new(0, 0), PointerTarget::Background, DragModifiers::NONE));
        engine.update_drag(Point::new(25, 10), IDS, &strip_geometry());

        assert_eq!(engine.selected_ids(), &ids(&["1", "2"]));
        assert!(engine.is_selecting());
        assert_eq!(
            engine.selection_box(),
            Some(SelectionBox { x: 0, y: 0, width: 25, height: 10 })
        );
    }

    #[test]
    fn test_drag_removes_items_that_leave_the_rectangle() {
        let mut engine = SelectionEngine::new();
        engine.begin_drag(Point::new(0, 0), PointerTarget::Background, DragModifiers::NONE);
        engine.update_drag(Point::new(25, 10), IDS, &strip_geometry());
        engine.update_drag(Point::new(5, 5), IDS, &strip_geometry());
        assert_eq!(engine.selected_ids(), &ids(&["1"]));

        // Shrinking back past every card empties the set and leaves selecting.
        engine.begin_drag(Point::new(50, 50), PointerTarget::Background, DragModifiers::NONE);
        engine.update_drag(Point::new(25, 5), IDS, &strip_geometry());
        assert_eq!(engine.selected_ids(), &ids(&["2"]));
        engine.update_drag(Point::new(40, 40), IDS, &strip_geometry());
        assert!(engine.is_empty());
        assert_eq!(engine.mode(), SelectionMode::View);
    }

    #[test]
    fn test_plain_drag_clears_existing_selection() {
        let mut engine = SelectionEngine::new();
        engine.select_all(vec!["3".to_string()]);

        engine.begin_drag(Point::new(0, 0), PointerTarget::Background, DragModifiers::NONE);
        assert!(engine.is_empty());
        assert_eq!(engine.mode(), SelectionMode::View);

        engine.update_drag(Point::new(5, 5), IDS, &strip_geometry());
        assert_eq!(engine.selected_ids(), &ids(&["1"]));
    }

    #[test]
    fn test_modifier_drag_never_drops_baseline() {
        let mut engine = SelectionEngine::new();
        engine.start_with("3");
        let shift = DragModifiers { shift: true, ..DragModifiers::NONE };

        engine.begin_drag(Point::new(0, 0), PointerTarget::Background, shift);
        assert_eq!(engine.selected_ids(), &ids(&["3"]));

        let path = [Point::new(5, 5), Point::new(25, 10), Point::new(0, 0), Point::new(-5, -5)];
        for p in path {
            engine.update_drag(p, IDS, &strip_geometry());
            assert!(engine.is_selected("3"));
        }
        assert_eq!(engine.selected_ids(), &ids(&["1", "3"]));
    }

    #[test]
    fn test_begin_drag_on_interactive_target_is_noop() {
        let mut engine = SelectionEngine::new();
        engine.start_with("1");

        assert!(!engine.begin_drag(Point::new(0, 0), PointerTarget::Interactive, DragModifiers::NONE));
        assert!(!engine.is_dragging());
        assert_eq!(engine.selected_ids(), &ids(&["1"]));

        engine.update_drag(Point::new(110, 10), IDS, &strip_geometry());
        assert_eq!(engine.selected_ids(), &ids(&["1"]));
    }

    #[test]
    fn test_items_without_geometry_are_skipped() {
        let mut engine = SelectionEngine::new();
        engine.begin_drag(Point::new(0, 0), PointerTarget::Background, DragModifiers::NONE);
        engine.update_drag(Point::new(200, 200), ["1", "offscreen"], &strip_geometry());
        assert_eq!(engine.selected_ids(), &ids(&["1"]));
    }

    #[test]
    fn test_end_drag_keeps_last_selection() {
        let mut engine = SelectionEngine::new();
        engine.begin_drag(Point::new(0, 0), PointerTarget::Background, DragModifiers::NONE);
        engine.update_drag(Point::new(25, 10), IDS, &strip_geometry());
        engine.end_drag();

        assert!(!engine.is_dragging());
        assert!(engine.selection_box().is_none());
        assert_eq!(engine.selected_ids(), &ids(&["1", "2"]));

        // Further moves after release have no effect.
        engine.update_drag(Point::new(110, 10), IDS, &strip_geometry());
        assert_eq!(engine.len(), 2);
    }

    #[test]
    fn test_activate_depends_on_mode() {
        let mut engine = SelectionEngine::new();
        assert_eq!(engine.activate("7"), Activation::Open("7".to_string()));
        assert!(engine.is_empty());

        engine.start_with("1");
        assert_eq!(engine.activate("7"), Activation::Toggled);
        assert_eq!(engine.selected_ids(), &ids(&["1", "7"]));
    }

    #[test]
    fn test_long_press_starts_or_toggles() {
        let mut engine = SelectionEngine::new();
        engine.long_press("a");
        assert_eq!(engine.selected_ids(), &ids(&["a"]));

        engine.long_press("b");
        assert_eq!(engine.selected_ids(), &ids(&["a", "b"]));

        engine.long_press("a");
        engine.long_press("b");
        assert_eq!(engine.mode(), SelectionMode::View);
    }

    #[test]
    fn test_sorted_ids_are_stable() {
        let mut engine = SelectionEngine::new();
        engine.select_all(vec!["9".to_string(), "10".to_string(), "1".to_string()]);
        assert_eq!(engine.sorted_ids(), vec!["1", "10", "9"]);
    }
}
