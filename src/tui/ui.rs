use crate::notes::models::{NoteSummary, format_date};
use crate::tui::app::{App, Mode, ReaderState};
use crate::tui::geometry::Bounds;
use crate::tui::layout::CARD_HEIGHT;
use crate::tui::pagination::{ListPhase, LoadStatus};
use chrono::Local;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Clear, Paragraph, Wrap,
        block::{Position, Title},
    },
};

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header or selection toolbar
            Constraint::Min(0),    // Card grid
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    // Hit-testing uses the same layout that is about to be drawn.
    app.set_viewport(chunks[1]);

    if app.selection.is_selecting() {
        draw_toolbar(frame, chunks[0], app);
    } else {
        draw_header(frame, chunks[0], app);
    }
    draw_grid(frame, chunks[1], app);
    draw_footer(frame, chunks[2], app);

    match app.mode {
        Mode::Reader => draw_reader(frame, app),
        Mode::ConfirmDelete => {
            draw_reader(frame, app);
            draw_confirm(frame, app);
        }
        Mode::Help => draw_help_window(frame),
        Mode::Browse | Mode::Search => {}
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let filter = app.list.filter();
    let query = if app.search.search_mode {
        Span::styled(format!("/{}█", app.search.draft), Style::default().fg(Color::White))
    } else if filter.query.is_empty() {
        Span::styled("/ to search", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(format!("\"{}\"", filter.query), Style::default().fg(Color::White))
    };

    let line = Line::from(vec![
        Span::styled(format!("Notes ({})", app.total_notes), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(format!("[{}]", filter.privacy.label()), Style::default().fg(Color::Magenta)),
        Span::raw("  "),
        query,
    ]);

    let header = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).title("edgenote"))
        .style(Style::default().fg(Color::Cyan));

    frame.render_widget(header, area);
}

fn draw_toolbar(frame: &mut Frame, area: Rect, app: &App) {
    let line = Line::from(vec![
        Span::styled(
            format!("{} selected", app.selection.len()),
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  a: select all | d: delete | Esc: cancel"),
    ]);

    let toolbar = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).title("Selection"))
        .style(Style::default().fg(Color::Cyan));

    frame.render_widget(toolbar, area);
}

fn draw_grid(frame: &mut Frame, area: Rect, app: &App) {
    match app.list.phase() {
        ListPhase::Skeleton => draw_skeleton(frame, app),
        ListPhase::Empty => {
            let text = match app.list.error_message() {
                Some(message) => format!("Couldn't load notes: {}\n\nr: retry", message),
                None => "No notes found.".to_string(),
            };
            let top = area.y + area.height / 3;
            let empty = Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, Rect::new(area.x, top, area.width, area.height.saturating_sub(top - area.y)));
        }
        ListPhase::Populated => {
            for (index, summary) in app.list.items().iter().enumerate() {
                let bounds = app.layout.slot(index);
                if let Some(rect) = app.layout.to_screen(bounds, app.scroll_offset) {
                    draw_card(frame, rect, summary, app, index == app.focused);
                }
            }
            draw_list_footer(frame, app);
        }
    }

    if let Some(selection_box) = app.selection.selection_box() {
        if let Some(rect) = app.layout.to_screen(selection_box.bounds(), app.scroll_offset) {
            let band = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::LightBlue));
            frame.render_widget(band, rect);
        }
    }
}

fn draw_skeleton(frame: &mut Frame, app: &App) {
    let viewport = app.layout.viewport();
    let rows = (viewport.height / CARD_HEIGHT).max(1) as usize;
    let placeholder = Paragraph::new("░░░░░░░░░░░░\n░░░░░░░░░░░░░░░░░░\n░░░░░░░░")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));

    for index in 0..rows * app.layout.columns() {
        if let Some(rect) = app.layout.to_screen(app.layout.slot(index), 0) {
            frame.render_widget(placeholder.clone(), rect);
        }
    }
}

fn draw_card(frame: &mut Frame, rect: Rect, summary: &NoteSummary, app: &App, focused: bool) {
    let id = summary.id.to_string();
    let selected = app.selection.is_selected(&id);

    let border_style = if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };

    let marker = match (app.selection.is_selecting(), selected) {
        (true, true) => "[x] ",
        (true, false) => "[ ] ",
        (false, _) => "",
    };
    let title = format!(" {}{} ", marker, summary.title);

    let mut lines = vec![Line::from(Span::styled(
        format_date(summary.date.map(|date| date.with_timezone(&Local))),
        Style::default().fg(Color::DarkGray),
    ))];
    if summary.is_public {
        if let Some(slug) = &summary.slug {
            lines.push(Line::from(Span::styled(format!("/p/{}", slug), Style::default().fg(Color::Green))));
        }
    }
    lines.push(Line::from(summary.excerpt.replace('\n', " ")));

    let card = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(if selected { BorderType::Thick } else { BorderType::Rounded })
                .border_style(border_style)
                .title(title),
        );

    frame.render_widget(card, rect);
}

/// The row under the last card: placeholder cards, retry prompt or end marker.
fn draw_list_footer(frame: &mut Frame, app: &App) {
    if app.list.is_loading() {
        draw_footer_skeleton(frame, app);
        return;
    }

    let row = app.layout.sentinel_row();
    let bounds = Bounds::new(0, row, app.layout.viewport().width as i32 - 1, row);
    let Some(rect) = app.layout.to_screen(bounds, app.scroll_offset) else {
        return;
    };

    let (text, style) = match app.list.status() {
        LoadStatus::Loading => return,
        LoadStatus::Errored(message) => (
            format!("Couldn't load more notes: {} (r: retry)", message),
            Style::default().fg(Color::Red),
        ),
        LoadStatus::Idle if !app.list.has_more() => {
            ("No more notes".to_string(), Style::default().fg(Color::DarkGray))
        }
        LoadStatus::Idle => return,
    };

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center).style(style), rect);
}

fn draw_footer_skeleton(frame: &mut Frame, app: &App) {
    let placeholder = Paragraph::new("░░░░░░░░░░░░░░")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));

    for column in 0..app.layout.columns() {
        if let Some(rect) = app.layout.to_screen(app.layout.footer_slot(column), app.scroll_offset) {
            frame.render_widget(placeholder.clone(), rect);
        }
    }
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let footer_text = if let Some(message) = &app.status_message {
        message.clone()
    } else if app.mode == Mode::Search {
        "SEARCH | Enter: apply | Esc: cancel | Ctrl+U: clear".to_string()
    } else {
        format!(
            "Loaded: {} | hjkl: move | Enter: open | Space: select | /: search | p: privacy | ?: help | q: quit",
            app.list.len()
        )
    };

    let footer = Paragraph::new(footer_text)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Yellow));

    frame.render_widget(footer, area);
}

fn draw_reader(frame: &mut Frame, app: &App) {
    let Some(reader) = &app.reader else {
        return;
    };

    let (title, lines) = match &reader.state {
        ReaderState::Loading(id) => (format!(" Note {} ", id), vec![Line::from("Loading…")]),
        ReaderState::Failed(message) => (
            " Note ".to_string(),
            vec![Line::from(Span::styled(message.clone(), Style::default().fg(Color::Red)))],
        ),
        ReaderState::Ready(note) => {
            let mut lines = vec![Line::from(Span::styled(
                format!(
                    "Created {} | Updated {}",
                    format_date(note.created_at.map(|date| date.with_timezone(&Local))),
                    format_date(note.updated_at.map(|date| date.with_timezone(&Local))),
                ),
                Style::default().fg(Color::DarkGray),
            ))];
            if let Some(path) = note.public_path() {
                lines.push(Line::from(Span::styled(format!("Public at {}", path), Style::default().fg(Color::Green))));
            }
            lines.push(Line::from(""));
            lines.extend(note.content.lines().map(|line| Line::from(line.to_string())));
            (format!(" {} ", note.display_title()), lines)
        }
    };

    let reader_paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title(Title::from(" j/k: scroll | d: delete | Esc: close ").position(Position::Bottom))
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: false })
        .scroll((reader.scroll, 0));

    let area = centered_rect(80, 80, frame.size());
    frame.render_widget(Clear, area);
    frame.render_widget(reader_paragraph, area);
}

fn draw_confirm(frame: &mut Frame, app: &App) {
    let count = app.pending_delete.len();
    let noun = if count == 1 { "note" } else { "notes" };
    let text = format!("Delete {} {}?\n\ny: delete | n: cancel", count, noun);

    let confirm = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Confirm ")
                .style(Style::default().fg(Color::Red)),
        )
        .style(Style::default().fg(Color::White));

    let area = centered_rect(40, 20, frame.size());
    frame.render_widget(Clear, area);
    frame.render_widget(confirm, area);
}

fn draw_help_window(frame: &mut Frame) {
    let help_text = vec![
        "edgenote - Keyboard and Mouse",
        "",
        "BROWSING:",
        "  ←↓↑→ / hjkl       Move focus between cards",
        "  Enter / click     Open note (toggle while selecting)",
        "  PgUp / PgDn       Scroll a page",
        "  Wheel             Scroll",
        "",
        "SELECTING:",
        "  Space             Select/deselect focused card",
        "  Hold click        Start selecting with that card",
        "  Drag background   Band-select cards",
        "  Shift/Ctrl/Alt    Keep current selection while dragging",
        "  a / Ctrl+A        Select all loaded notes",
        "  d                 Delete selected notes",
        "  Esc               Clear selection",
        "",
        "READING:",
        "  j / k             Scroll the note",
        "  d / Delete        Delete the open note",
        "  Esc / q           Close",
        "",
        "FILTERING:",
        "  /                 Search titles and content",
        "  x                 Clear search",
        "  p                 Cycle All / Private / Public",
        "",
        "OTHER:",
        "  r                 Retry a failed page",
        "  R                 Reload from the top",
        "  ?                 Show this help (press ? or Esc to close)",
        "  q / Ctrl+C        Quit application",
    ];

    let help_paragraph = Paragraph::new(help_text.join("\n"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: false });

    let area = centered_rect(80, 80, frame.size());
    frame.render_widget(Clear, area);
    frame.render_widget(help_paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::models::NoteId;
    use crate::tui::app::AppSettings;
    use crate::tui::loader::{Loader, LoaderRequest, LoaderResponse};
    use crate::tui::pagination::Page;
    use ratatui::{Terminal, backend::TestBackend};
    use std::time::Instant;

    fn summary(id: NoteId) -> NoteSummary {
        NoteSummary {
            id,
            title: format!("note {}", id),
            excerpt: "body".to_string(),
            date: None,
            slug: None,
            is_public: false,
        }
    }

    fn screen_rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| (0..buffer.area.width).map(|x| buffer.get(x, y).symbol()).collect())
            .collect()
    }

    #[test]
    fn test_next_page_shows_placeholder_cards() {
        let (request_tx, request_rx) = crossbeam_channel::unbounded();
        let (response_tx, response_rx) = crossbeam_channel::unbounded();
        let mut app = App::new(Loader::from_channels(request_tx, response_rx), AppSettings::default());
        app.start();

        let Ok(LoaderRequest::Page(request)) = request_rx.try_recv() else {
            panic!("first page was not requested");
        };
        let page = Page {
            items: vec![summary(2), summary(1)],
            has_more: true,
            next_offset: 2,
        };
        response_tx
            .send(LoaderResponse::Page { request, result: Ok(page), total: 5 })
            .unwrap();
        app.tick(Instant::now());
        let _next = app.list.load_more();
        assert!(app.list.is_loading());
        assert_eq!(app.list.len(), 2);

        let mut terminal = Terminal::new(TestBackend::new(80, 40)).unwrap();
        terminal.draw(|frame| draw(frame, &mut app)).unwrap();
        let rows = screen_rows(&terminal);

        assert!(rows.iter().any(|row| row.contains("note 2")));
        assert!(rows.iter().any(|row| row.contains('░')));
        assert!(!rows.iter().any(|row| row.contains("Loading more")));
    }

    #[test]
    fn test_centered_rect_is_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(40, 20, area);
        assert_eq!(popup.width, 40);
        assert_eq!(popup.height, 10);
        assert!(popup.x >= 30 && popup.y >= 20);
    }
}
