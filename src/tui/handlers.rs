use crate::tui::selection::DragModifiers;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

pub struct KeyHandler;

impl KeyHandler {
    pub fn handle_browse_key(key_event: KeyEvent) -> BrowseAction {
        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
        match key_event.code {
            KeyCode::Char('q') => BrowseAction::Quit,
            KeyCode::Char('c') if ctrl => BrowseAction::Quit,
            KeyCode::Char('a') if ctrl => BrowseAction::SelectAll,
            KeyCode::Esc => BrowseAction::HandleEscape,
            KeyCode::Up | KeyCode::Char('k') => BrowseAction::CursorUp,
            KeyCode::Down | KeyCode::Char('j') => BrowseAction::CursorDown,
            KeyCode::Left | KeyCode::Char('h') => BrowseAction::CursorLeft,
            KeyCode::Right | KeyCode::Char('l') => BrowseAction::CursorRight,
            KeyCode::PageUp => BrowseAction::PageUp,
            KeyCode::PageDown => BrowseAction::PageDown,
            KeyCode::Enter => BrowseAction::ActivateFocused,
            KeyCode::Char(' ') => BrowseAction::ToggleFocused,
            KeyCode::Char('a') => BrowseAction::SelectAll,
            KeyCode::Char('d') | KeyCode::Delete => BrowseAction::DeleteSelected,
            KeyCode::Char('/') => BrowseAction::EnterSearchMode,
            KeyCode::Char('x') => BrowseAction::ClearSearch,
            KeyCode::Char('p') => BrowseAction::CyclePrivacy,
            KeyCode::Char('r') => BrowseAction::Retry,
            KeyCode::Char('R') => BrowseAction::Reload,
            KeyCode::Char('?') => BrowseAction::ToggleHelpMode,
            _ => BrowseAction::None,
        }
    }

    pub fn handle_help_mode_key(key_event: KeyEvent) -> HelpModeAction {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Char('?') => HelpModeAction::ExitHelpMode,
            _ => HelpModeAction::None,
        }
    }

    pub fn handle_search_mode_key(key_event: KeyEvent) -> SearchModeAction {
        match key_event.code {
            KeyCode::Esc => SearchModeAction::CancelSearch,
            KeyCode::Enter => SearchModeAction::ConfirmSearch,
            KeyCode::Backspace => SearchModeAction::Backspace,
            KeyCode::Char('u') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                SearchModeAction::ClearDraft
            }
            KeyCode::Char(c) => SearchModeAction::InsertChar(c),
            _ => SearchModeAction::None,
        }
    }

    pub fn handle_reader_key(key_event: KeyEvent) -> ReaderAction {
        match key_event.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter | KeyCode::Backspace => ReaderAction::Close,
            KeyCode::Up | KeyCode::Char('k') => ReaderAction::ScrollUp,
            KeyCode::Down | KeyCode::Char('j') => ReaderAction::ScrollDown,
            KeyCode::Delete | KeyCode::Char('d') => ReaderAction::Delete,
            _ => ReaderAction::None,
        }
    }

    pub fn handle_confirm_key(key_event: KeyEvent) -> ConfirmAction {
        match key_event.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => ConfirmAction::Confirm,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Char('q') => ConfirmAction::Cancel,
            _ => ConfirmAction::None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum BrowseAction {
    None,
    Quit,
    HandleEscape,
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    PageUp,
    PageDown,
    ActivateFocused,
    ToggleFocused,
    SelectAll,
    DeleteSelected,
    EnterSearchMode,
    ClearSearch,
    CyclePrivacy,
    Retry,
    Reload,
    ToggleHelpMode,
}

#[derive(Debug, PartialEq)]
pub enum HelpModeAction {
    None,
    ExitHelpMode,
}

#[derive(Debug, PartialEq)]
pub enum SearchModeAction {
    None,
    CancelSearch,
    ConfirmSearch,
    Backspace,
    ClearDraft,
    InsertChar(char),
}

#[derive(Debug, PartialEq)]
pub enum ReaderAction {
    None,
    Close,
    ScrollUp,
    ScrollDown,
    Delete,
}

#[derive(Debug, PartialEq)]
pub enum ConfirmAction {
    None,
    Confirm,
    Cancel,
}

/// Mouse input reduced to what the grid cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Press { column: u16, row: u16, modifiers: DragModifiers },
    /// Right button: opens nothing, cancels a pending press.
    SecondaryPress { column: u16, row: u16 },
    Drag { column: u16, row: u16 },
    Release { column: u16, row: u16 },
    ScrollUp,
    ScrollDown,
}

pub struct MouseHandler;

impl MouseHandler {
    pub fn translate(mouse_event: MouseEvent) -> Option<PointerEvent> {
        let (column, row) = (mouse_event.column, mouse_event.row);
        match mouse_event.kind {
            MouseEventKind::Down(MouseButton::Left) => Some(PointerEvent::Press {
                column,
                row,
                modifiers: drag_modifiers(mouse_event.modifiers),
            }),
            MouseEventKind::Down(MouseButton::Right) => Some(PointerEvent::SecondaryPress { column, row }),
            MouseEventKind::Drag(MouseButton::Left) => Some(PointerEvent::Drag { column, row }),
            MouseEventKind::Up(MouseButton::Left) => Some(PointerEvent::Release { column, row }),
            MouseEventKind::ScrollUp => Some(PointerEvent::ScrollUp),
            MouseEventKind::ScrollDown => Some(PointerEvent::ScrollDown),
            _ => None,
        }
    }
}

/// Terminals rarely report a command key, so Alt stands in for it.
pub fn drag_modifiers(modifiers: KeyModifiers) -> DragModifiers {
    DragModifiers {
        shift: modifiers.contains(KeyModifiers::SHIFT),
        ctrl: modifiers.contains(KeyModifiers::CONTROL),
        meta: modifiers.intersects(KeyModifiers::ALT | KeyModifiers::SUPER | KeyModifiers::META),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse(kind: MouseEventKind, modifiers: KeyModifiers) -> MouseEvent {
        MouseEvent {
            kind,
            column: 7,
            row: 9,
            modifiers,
        }
    }

    #[test]
    fn test_browse_basic_keys() {
        let key_event = KeyEvent::from(KeyCode::Char('q'));
        assert_eq!(KeyHandler::handle_browse_key(key_event), BrowseAction::Quit);

        let key_event = KeyEvent::from(KeyCode::Esc);
        assert_eq!(KeyHandler::handle_browse_key(key_event), BrowseAction::HandleEscape);

        let key_event = KeyEvent::from(KeyCode::Enter);
        assert_eq!(KeyHandler::handle_browse_key(key_event), BrowseAction::ActivateFocused);

        let key_event = KeyEvent::from(KeyCode::Char(' '));
        assert_eq!(KeyHandler::handle_browse_key(key_event), BrowseAction::ToggleFocused);

        let key_event = KeyEvent::from(KeyCode::Char('d'));
        assert_eq!(KeyHandler::handle_browse_key(key_event), BrowseAction::DeleteSelected);
    }

    #[test]
    fn test_browse_navigation_keys() {
        let key_event = KeyEvent::from(KeyCode::Up);
        assert_eq!(KeyHandler::handle_browse_key(key_event), BrowseAction::CursorUp);

        let key_event = KeyEvent::from(KeyCode::Char('j'));
        assert_eq!(KeyHandler::handle_browse_key(key_event), BrowseAction::CursorDown);

        let key_event = KeyEvent::from(KeyCode::Char('h'));
        assert_eq!(KeyHandler::handle_browse_key(key_event), BrowseAction::CursorLeft);

        let key_event = KeyEvent::from(KeyCode::Right);
        assert_eq!(KeyHandler::handle_browse_key(key_event), BrowseAction::CursorRight);
    }

    #[test]
    fn test_browse_ctrl_keys() {
        let key_event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(KeyHandler::handle_browse_key(key_event), BrowseAction::Quit);

        let key_event = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        assert_eq!(KeyHandler::handle_browse_key(key_event), BrowseAction::SelectAll);
    }

    #[test]
    fn test_help_mode_keys() {
        let key_event = KeyEvent::from(KeyCode::Esc);
        assert_eq!(KeyHandler::handle_help_mode_key(key_event), HelpModeAction::ExitHelpMode);

        let key_event = KeyEvent::from(KeyCode::Char('x'));
        assert_eq!(KeyHandler::handle_help_mode_key(key_event), HelpModeAction::None);
    }

    #[test]
    fn test_search_mode_keys() {
        let key_event = KeyEvent::from(KeyCode::Esc);
        assert_eq!(KeyHandler::handle_search_mode_key(key_event), SearchModeAction::CancelSearch);

        let key_event = KeyEvent::from(KeyCode::Enter);
        assert_eq!(KeyHandler::handle_search_mode_key(key_event), SearchModeAction::ConfirmSearch);

        let key_event = KeyEvent::from(KeyCode::Char('q'));
        assert_eq!(KeyHandler::handle_search_mode_key(key_event), SearchModeAction::InsertChar('q'));

        let key_event = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert_eq!(KeyHandler::handle_search_mode_key(key_event), SearchModeAction::ClearDraft);
    }

    #[test]
    fn test_reader_and_confirm_keys() {
        assert_eq!(KeyHandler::handle_reader_key(KeyEvent::from(KeyCode::Esc)), ReaderAction::Close);
        assert_eq!(KeyHandler::handle_reader_key(KeyEvent::from(KeyCode::Char('j'))), ReaderAction::ScrollDown);
        assert_eq!(KeyHandler::handle_reader_key(KeyEvent::from(KeyCode::Char('d'))), ReaderAction::Delete);
        assert_eq!(KeyHandler::handle_reader_key(KeyEvent::from(KeyCode::Delete)), ReaderAction::Delete);

        assert_eq!(KeyHandler::handle_confirm_key(KeyEvent::from(KeyCode::Char('y'))), ConfirmAction::Confirm);
        assert_eq!(KeyHandler::handle_confirm_key(KeyEvent::from(KeyCode::Esc)), ConfirmAction::Cancel);
        assert_eq!(KeyHandler::handle_confirm_key(KeyEvent::from(KeyCode::Char('z'))), ConfirmAction::None);
    }

    #[test]
    fn test_mouse_translation() {
        let press = MouseHandler::translate(mouse(MouseEventKind::Down(MouseButton::Left), KeyModifiers::SHIFT));
        assert_eq!(
            press,
            Some(PointerEvent::Press {
                column: 7,
                row: 9,
                modifiers: DragModifiers { shift: true, ..DragModifiers::NONE },
            })
        );

        let right = MouseHandler::translate(mouse(MouseEventKind::Down(MouseButton::Right), KeyModifiers::NONE));
        assert_eq!(right, Some(PointerEvent::SecondaryPress { column: 7, row: 9 }));

        let moved = MouseHandler::translate(mouse(MouseEventKind::Moved, KeyModifiers::NONE));
        assert_eq!(moved, None);
    }

    #[test]
    fn test_alt_counts_as_meta() {
        let modifiers = drag_modifiers(KeyModifiers::ALT);
        assert!(modifiers.meta);
        assert!(modifiers.any());
        assert!(!drag_modifiers(KeyModifiers::NONE).any());
    }
}
