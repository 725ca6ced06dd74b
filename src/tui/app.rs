use crate::config::Config;
use crate::notes::models::{Note, NoteFilter, NoteId, NoteSummary};
use crate::tui::gesture::{Feedback, GestureAction, NoFeedback, PressGesture};
use crate::tui::handlers::{
    BrowseAction, ConfirmAction, HelpModeAction, KeyHandler, MouseHandler, PointerEvent, ReaderAction,
    SearchModeAction,
};
use crate::tui::layout::GridLayout;
use crate::tui::loader::{Loader, LoaderRequest, LoaderResponse};
use crate::tui::pagination::{ApplyOutcome, FetchError, IncrementalListController, PageRequest};
use crate::tui::search::SearchState;
use crate::tui::selection::{Activation, PointerTarget, SelectionEngine};
use anyhow::Result;
use crossterm::event::{Event, KeyEvent, KeyEventKind};
use log::{debug, info, warn};
use ratatui::layout::Rect;
use std::time::{Duration, Instant};

/// Upper bound on how long the event loop sleeps between ticks.
pub const TICK: Duration = Duration::from_millis(50);
const WHEEL_STEP: i32 = 3;

pub type NoteList = IncrementalListController<NoteSummary, NoteFilter>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Search,
    Reader,
    ConfirmDelete,
    Help,
}

#[derive(Debug)]
pub enum ReaderState {
    Loading(NoteId),
    Ready(Note),
    Failed(String),
}

#[derive(Debug)]
pub struct Reader {
    pub state: ReaderState,
    pub scroll: u16,
}

#[derive(Debug, Clone, Copy)]
pub struct AppSettings {
    pub page_size: usize,
    pub long_press: Duration,
    pub move_threshold: i32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for AppSettings {
    fn from(config: &Config) -> Self {
        Self {
            page_size: config.page_size,
            long_press: Duration::from_millis(config.long_press_ms),
            move_threshold: config.move_threshold as i32,
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub mode: Mode,
    pub list: NoteList,
    pub selection: SelectionEngine,
    pub press: PressGesture,
    pub search: SearchState,
    pub layout: GridLayout,
    pub scroll_offset: i32,
    pub focused: usize,
    pub total_notes: usize,
    pub reader: Option<Reader>,
    pub status_message: Option<String>,
    /// Notes the open confirmation prompt will delete.
    pub pending_delete: Vec<NoteId>,
    deleting: bool,
    in_flight: Option<PageRequest<NoteFilter>>,
    loader: Loader,
    feedback: Box<dyn Feedback>,
}

impl App {
    pub fn new(loader: Loader, settings: AppSettings) -> Self {
        let search = SearchState::new();
        Self {
            should_quit: false,
            mode: Mode::Browse,
            list: IncrementalListController::new(search.filter().clone(), settings.page_size),
            selection: SelectionEngine::new(),
            press: PressGesture::new(settings.long_press, settings.move_threshold),
            search,
            layout: GridLayout::default(),
            scroll_offset: 0,
            focused: 0,
            total_notes: 0,
            reader: None,
            status_message: None,
            pending_delete: Vec::new(),
            deleting: false,
            in_flight: None,
            loader,
            feedback: Box::new(NoFeedback),
        }
    }

    pub fn with_feedback(mut self, feedback: Box<dyn Feedback>) -> Self {
        self.feedback = feedback;
        self
    }

    /// Request the first page.
    pub fn start(&mut self) {
        self.request_next_page();
    }

    pub fn handle_event(&mut self, event: Event, now: Instant) -> Result<()> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key_event(key),
            Event::Mouse(mouse) => {
                if let Some(pointer) = MouseHandler::translate(mouse) {
                    self.handle_pointer(pointer, now);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Advance timers, apply finished loads and watch the sentinel.
    pub fn tick(&mut self, now: Instant) {
        if let Some(action) = self.press.tick(now) {
            self.handle_gesture(action);
        }
        self.drain_loader();
        self.check_sentinel();
    }

    /// How long the event loop may block before the next [`tick`](Self::tick).
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        match self.press.deadline() {
            Some(deadline) => deadline.saturating_duration_since(now).min(TICK),
            None => TICK,
        }
    }

    /// Called by the renderer with the area the grid occupies.
    pub fn set_viewport(&mut self, area: Rect) {
        self.layout = GridLayout::compute(area, self.list.ids());
        self.clamp_view();
    }

    fn refresh_layout(&mut self) {
        self.set_viewport(self.layout.viewport());
    }

    fn clamp_view(&mut self) {
        self.scroll_offset = self.scroll_offset.clamp(0, self.layout.max_scroll());
        self.focused = self.focused.min(self.list.len().saturating_sub(1));
    }

    pub fn focused_id(&self) -> Option<&str> {
        self.list.ids().get(self.focused).map(String::as_str)
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> Result<()> {
        match self.mode {
            Mode::Browse => self.handle_browse_key(key_event),
            Mode::Search => self.handle_search_key(key_event),
            Mode::Reader => self.handle_reader_key(key_event),
            Mode::ConfirmDelete => self.handle_confirm_key(key_event),
            Mode::Help => {
                if KeyHandler::handle_help_mode_key(key_event) == HelpModeAction::ExitHelpMode {
                    self.mode = Mode::Browse;
                }
            }
        }
        Ok(())
    }

    fn handle_browse_key(&mut self, key_event: KeyEvent) {
        let action = KeyHandler::handle_browse_key(key_event);
        if action != BrowseAction::None {
            self.status_message = None;
        }

        let columns = self.layout.columns().max(1) as isize;
        match action {
            BrowseAction::None => {}
            BrowseAction::Quit => self.should_quit = true,
            BrowseAction::HandleEscape => self.selection.clear(),
            BrowseAction::CursorUp => self.move_focus(-columns),
            BrowseAction::CursorDown => self.move_focus(columns),
            BrowseAction::CursorLeft => self.move_focus(-1),
            BrowseAction::CursorRight => self.move_focus(1),
            BrowseAction::PageUp => self.scroll_by(-(self.layout.viewport().height as i32)),
            BrowseAction::PageDown => self.scroll_by(self.layout.viewport().height as i32),
            BrowseAction::ActivateFocused => {
                if let Some(id) = self.focused_id().map(str::to_string) {
                    self.handle_gesture(GestureAction::Click(id));
                }
            }
            BrowseAction::ToggleFocused => {
                if let Some(id) = self.focused_id().map(str::to_string) {
                    self.selection.toggle(&id);
                }
            }
            BrowseAction::SelectAll => {
                if !self.list.is_empty() {
                    self.selection.select_all(self.list.ids().iter().cloned());
                }
            }
            BrowseAction::DeleteSelected => {
                if self.selection.is_selecting() && !self.deleting {
                    self.pending_delete = self
                        .selection
                        .sorted_ids()
                        .iter()
                        .filter_map(|id| id.parse().ok())
                        .collect();
                    self.mode = Mode::ConfirmDelete;
                }
            }
            BrowseAction::EnterSearchMode => {
                self.search.enter_search_mode();
                self.mode = Mode::Search;
            }
            BrowseAction::ClearSearch => {
                if let Some(filter) = self.search.clear_query() {
                    self.apply_filter(filter);
                }
            }
            BrowseAction::CyclePrivacy => {
                let filter = self.search.cycle_privacy();
                self.apply_filter(filter);
            }
            BrowseAction::Retry => {
                if let Some(request) = self.list.retry() {
                    info!("retrying page at offset {}", request.offset);
                    self.dispatch_page(request);
                }
            }
            BrowseAction::Reload => self.reload(),
            BrowseAction::ToggleHelpMode => self.mode = Mode::Help,
        }
    }

    fn handle_search_key(&mut self, key_event: KeyEvent) {
        match KeyHandler::handle_search_mode_key(key_event) {
            SearchModeAction::None => {}
            SearchModeAction::CancelSearch => {
                self.search.cancel_search();
                self.mode = Mode::Browse;
            }
            SearchModeAction::ConfirmSearch => {
                self.mode = Mode::Browse;
                if let Some(filter) = self.search.confirm_search() {
                    self.apply_filter(filter);
                }
            }
            SearchModeAction::Backspace => self.search.backspace(),
            SearchModeAction::ClearDraft => self.search.clear_draft(),
            SearchModeAction::InsertChar(c) => self.search.insert_char(c),
        }
    }

    fn handle_reader_key(&mut self, key_event: KeyEvent) {
        match KeyHandler::handle_reader_key(key_event) {
            ReaderAction::None => {}
            ReaderAction::Close => {
                self.reader = None;
                self.mode = Mode::Browse;
            }
            ReaderAction::ScrollUp => {
                if let Some(reader) = &mut self.reader {
                    reader.scroll = reader.scroll.saturating_sub(1);
                }
            }
            ReaderAction::ScrollDown => {
                if let Some(reader) = &mut self.reader {
                    reader.scroll = reader.scroll.saturating_add(1);
                }
            }
            ReaderAction::Delete => {
                if let Some(Reader { state: ReaderState::Ready(note), .. }) = &self.reader {
                    if !self.deleting {
                        self.pending_delete = vec![note.id];
                        self.mode = Mode::ConfirmDelete;
                    }
                }
            }
        }
    }

    fn handle_confirm_key(&mut self, key_event: KeyEvent) {
        match KeyHandler::handle_confirm_key(key_event) {
            ConfirmAction::None => {}
            ConfirmAction::Cancel => {
                self.pending_delete.clear();
                self.mode = if self.reader.is_some() { Mode::Reader } else { Mode::Browse };
            }
            ConfirmAction::Confirm => {
                self.reader = None;
                self.mode = Mode::Browse;
                self.delete_pending();
            }
        }
    }

    /// Hand the pending ids to the store and drop the selection at once;
    /// the list reloads when the store answers.
    fn delete_pending(&mut self) {
        let ids = std::mem::take(&mut self.pending_delete);
        match self.loader.send(LoaderRequest::DeleteBatch(ids)) {
            Ok(()) => self.deleting = true,
            Err(e) => self.status_message = Some(format!("Delete failed: {}", e)),
        }
        self.selection.clear();
    }

    pub fn handle_pointer(&mut self, pointer: PointerEvent, now: Instant) {
        match pointer {
            PointerEvent::Press { column, row, modifiers } => {
                if self.mode != Mode::Browse {
                    return;
                }
                // Header, toolbar and footer sit outside the grid and own their clicks.
                let Some(point) = self.layout.to_content(column, row, self.scroll_offset) else {
                    return;
                };

                // A drag whose release never arrived must not outlive a new press.
                self.selection.end_drag();

                let hit = self.layout.hit_test(point).cloned();
                let target = if hit.is_some() {
                    PointerTarget::Interactive
                } else {
                    PointerTarget::Background
                };
                self.selection.begin_drag(point, target, modifiers);

                if let Some(id) = hit {
                    if let Some(index) = self.list.position(&id) {
                        self.focused = index;
                    }
                    self.press.press(&id, point, now);
                }
            }
            PointerEvent::SecondaryPress { column, row } => {
                // No context menu on cards; a right press just abandons any pending press.
                if let Some(id) = self
                    .layout
                    .to_content(column, row, self.scroll_offset)
                    .and_then(|point| self.layout.hit_test(point))
                {
                    debug!("context menu suppressed on {}", id);
                }
                self.press.cancel();
            }
            PointerEvent::Drag { column, row } => {
                let point = self.layout.to_content_clamped(column, row, self.scroll_offset);
                self.press.moved(point);
                if self.selection.is_dragging() {
                    self.selection
                        .update_drag(point, self.list.ids().iter().map(String::as_str), &self.layout);
                }
            }
            PointerEvent::Release { .. } => {
                if let Some(action) = self.press.release(now) {
                    self.handle_gesture(action);
                }
                self.selection.end_drag();
            }
            PointerEvent::ScrollUp => self.scroll_by(-WHEEL_STEP),
            PointerEvent::ScrollDown => self.scroll_by(WHEEL_STEP),
        }
    }

    fn handle_gesture(&mut self, action: GestureAction) {
        match action {
            GestureAction::Click(id) => {
                if let Activation::Open(id) = self.selection.activate(&id) {
                    self.open_note(&id);
                }
            }
            GestureAction::LongPress(id) => {
                self.selection.long_press(&id);
                self.feedback.long_press();
            }
        }
    }

    fn open_note(&mut self, id: &str) {
        let Ok(note_id) = id.parse::<NoteId>() else {
            warn!("cannot open note with id {:?}", id);
            return;
        };

        let state = match self.loader.send(LoaderRequest::Open(note_id)) {
            Ok(()) => ReaderState::Loading(note_id),
            Err(e) => ReaderState::Failed(e.to_string()),
        };
        self.reader = Some(Reader { state, scroll: 0 });
        self.mode = Mode::Reader;
    }

    fn move_focus(&mut self, delta: isize) {
        if self.list.is_empty() {
            return;
        }
        let last = self.list.len() as isize - 1;
        self.focused = (self.focused as isize + delta).clamp(0, last) as usize;
        self.scroll_offset = self.layout.scroll_to_reveal(self.focused, self.scroll_offset);
    }

    fn scroll_by(&mut self, delta: i32) {
        self.scroll_offset = (self.scroll_offset + delta).clamp(0, self.layout.max_scroll());
    }

    fn apply_filter(&mut self, filter: NoteFilter) {
        if &filter != self.list.filter() {
            info!("filter changed: query {:?}, privacy {}", filter.query, filter.privacy.label());
            self.restart_list(filter);
        }
    }

    /// Re-query from the top with the current filter.
    pub fn reload(&mut self) {
        let filter = self.list.filter().clone();
        self.restart_list(filter);
    }

    fn restart_list(&mut self, filter: NoteFilter) {
        self.list.restart(filter);
        // The ids in the old list no longer describe what is on screen.
        self.selection.clear();
        self.press.cancel();
        self.scroll_offset = 0;
        self.focused = 0;
        self.refresh_layout();
        self.request_next_page();
    }

    fn request_next_page(&mut self) {
        if let Some(request) = self.list.load_more() {
            self.dispatch_page(request);
        }
    }

    fn dispatch_page(&mut self, request: PageRequest<NoteFilter>) {
        match self.loader.send(LoaderRequest::Page(request.clone())) {
            Ok(()) => self.in_flight = Some(request),
            Err(e) => {
                self.list.apply(&request, Err(e));
            }
        }
    }

    fn check_sentinel(&mut self) {
        if self.layout.viewport().height == 0 {
            return;
        }
        if self.layout.sentinel_visible(self.scroll_offset) {
            if let Some(request) = self.list.sentinel_visible() {
                self.dispatch_page(request);
            }
        }
    }

    fn drain_loader(&mut self) {
        loop {
            match self.loader.try_recv() {
                Ok(Some(response)) => self.handle_response(response),
                Ok(None) => break,
                Err(e) => {
                    self.fail_outstanding(e);
                    break;
                }
            }
        }
    }

    /// The worker is gone: nothing outstanding will ever be answered.
    fn fail_outstanding(&mut self, error: FetchError) {
        if let Some(request) = self.in_flight.take() {
            warn!("loader lost with page at offset {} outstanding", request.offset);
            self.list.apply(&request, Err(error.clone()));
        }
        if let Some(reader) = &mut self.reader {
            if let ReaderState::Loading(_) = reader.state {
                reader.state = ReaderState::Failed(error.to_string());
            }
        }
        if self.deleting {
            self.deleting = false;
            self.status_message = Some(format!("Delete failed: {}", error));
        }
    }

    fn handle_response(&mut self, response: LoaderResponse) {
        match response {
            LoaderResponse::Page { request, result, total } => {
                if self.in_flight.as_ref() == Some(&request) {
                    self.in_flight = None;
                }
                if let ApplyOutcome::Applied { .. } = self.list.apply(&request, result) {
                    self.total_notes = total;
                    self.refresh_layout();
                }
            }
            LoaderResponse::Opened(result) => {
                let Some(reader) = &mut self.reader else {
                    return;
                };
                reader.state = match result {
                    Ok(note) => ReaderState::Ready(note),
                    Err(e) => ReaderState::Failed(e),
                };
            }
            LoaderResponse::Deleted(result) => {
                self.deleting = false;
                match result {
                    Ok(count) => {
                        self.status_message = Some(format!("Deleted {} notes", count));
                        self.reload();
                    }
                    Err(e) => self.status_message = Some(format!("Delete failed: {}", e)),
                }
            }
        }
    }

    #[cfg(test)]
    fn wait_for_loader(&mut self) {
        let response = self
            .loader
            .recv_timeout(Duration::from_secs(5))
            .expect("loader did not answer");
        self.handle_response(response);
    }
}
