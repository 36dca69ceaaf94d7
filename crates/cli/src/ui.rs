//! # TUI Rendering Logic
//!
//! This module is responsible for drawing the entire user interface based on the
//! current application state. Both screens share a header with the route tabs
//! and a status bar at the bottom.

use crate::app::{App, InputMode, Screen};
use ragfile::config::{MAX_CHUNK_SIZE, MAX_RETRIEVAL_DEPTH, MIN_CHUNK_SIZE, MIN_RETRIEVAL_DEPTH};
use ragfile::documents::Viewer;
use ragfile::navigation::Route;
use ragfile::render::{render_response, ResponseView};
use ragfile::screens::{ChatScreen, HomeScreen};
use ragfile::status::OpStatus;
use ragfile::ConfigField;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
};

/// The main rendering function, which draws the layout of the mounted screen.
pub fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Route tabs
            Constraint::Min(0),    // Screen content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_tabs(frame, app, main_layout[0]);
    match &app.screen {
        Screen::Home(home) => render_home(frame, app, home, main_layout[1]),
        Screen::Chat(chat) => render_chat(frame, app, chat, main_layout[1]),
    }
    render_status_bar(frame, app, main_layout[2]);
}

/// Renders the route tabs and the service URL.
fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let selected_index = match app.navigator.current() {
        Route::Home => 0,
        Route::Chat => 1,
    };
    let tabs = Tabs::new(vec!["Configure", "Chat"])
        .block(
            Block::default()
                .title(format!("RAG File Assistant ({})", app.server_url))
                .borders(Borders::ALL),
        )
        .select(selected_index)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        );

    frame.render_widget(tabs, area);
}

fn field_hint(field: ConfigField) -> String {
    match field {
        ConfigField::ChunkSize => format!(
            "How many characters does a chunk contain ({MIN_CHUNK_SIZE}-{MAX_CHUNK_SIZE})"
        ),
        ConfigField::Model => "What language model to use".to_string(),
        ConfigField::RetrievalDepth => format!(
            "How many nearest chunks are included as context ({MIN_RETRIEVAL_DEPTH}-{MAX_RETRIEVAL_DEPTH})"
        ),
    }
}

fn field_label(field: ConfigField) -> &'static str {
    match field {
        ConfigField::ChunkSize => "Chunk Size",
        ConfigField::Model => "Model",
        ConfigField::RetrievalDepth => "Nearest Chunks",
    }
}

/// Renders the configuration form and the re-chunk action.
fn render_home(frame: &mut Frame, app: &App, home: &HomeScreen, area: Rect) {
    let block = Block::default().title("Settings").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![Line::from("")];
    for (row, field) in ConfigField::ALL.iter().enumerate() {
        let focused = app.focus == *field;
        let editing = focused && app.input_mode == InputMode::Field;
        let value = if editing {
            app.input_text.clone()
        } else if *field == ConfigField::Model {
            format!("< {} >", home.store.to_payload().model.label())
        } else {
            home.store.field_text(*field)
        };

        let label_style = if focused {
            Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default()
        };
        let value_style = if editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Cyan)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<16}", field_label(*field)), label_style),
            Span::styled(format!(" {value:<12}"), value_style),
            Span::styled(field_hint(*field), Style::default().fg(Color::DarkGray)),
        ]));

        if editing {
            // Row 0 is the top margin.
            let left = 2 + 16 + 1;
            let width = inner.width.saturating_sub(left);
            let x = inner.x + left + cursor_offset(&app.input_text, width);
            frame.set_cursor_position((x, inner.y + 1 + row as u16));
        }
    }

    lines.push(Line::from(""));
    let rechunk_style = if home.store.is_default_chunk_size() {
        Style::default()
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };
    lines.push(Line::from(Span::styled(
        "  [r] Re-chunk all stored files with this chunk size",
        rechunk_style,
    )));
    if let Some(line) = op_line(home.rechunk.status(), "Re-chunking...") {
        lines.push(line);
    }
    lines.push(Line::from(""));
    lines.push(Line::from("  [Enter] Go to chat"));

    frame.render_widget(Paragraph::new(lines), inner);
}

/// One status line for an operation slot.
/// Column of the cursor after `text`, kept inside a field `width` cells wide.
fn cursor_offset(text: &str, width: u16) -> u16 {
    let typed = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
    typed.min(width.saturating_sub(1))
}

fn op_line(status: &OpStatus<String>, pending: &str) -> Option<Line<'static>> {
    match status {
        OpStatus::Idle => None,
        OpStatus::InFlight => Some(Line::from(Span::styled(
            format!("  {pending}"),
            Style::default().fg(Color::Yellow),
        ))),
        OpStatus::Succeeded(message) => Some(Line::from(Span::styled(
            format!("  {message}"),
            Style::default().fg(Color::Green),
        ))),
        OpStatus::Failed(message) => Some(Line::from(Span::styled(
            format!("  {message}"),
            Style::default().fg(Color::Red),
        ))),
    }
}

/// Renders the question box, the response, and the file panel.
fn render_chat(frame: &mut Frame, app: &App, chat: &ChatScreen, area: Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);
    render_question_panel(frame, app, chat, layout[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(layout[1]);
    render_response_panel(frame, chat, columns[0]);
    render_files_panel(frame, app, chat, columns[1]);

    if let Some(filename) = chat.documents.pending_confirmation() {
        render_confirm_popup(frame, filename);
    } else if *chat.documents.viewer() != Viewer::Closed {
        render_viewer_popup(frame, chat.documents.viewer());
    }
}

/// Renders the top input panel holding the question or a file path.
fn render_question_panel(frame: &mut Frame, app: &App, chat: &ChatScreen, area: Rect) {
    let (title, text) = match app.input_mode {
        InputMode::Path => ("FILE PATH", app.input_text.as_str()),
        _ => ("QUESTION", chat.query.question()),
    };
    let outer_block = Block::default().title(title).borders(Borders::ALL);
    let inner_area = outer_block.inner(area);
    frame.render_widget(outer_block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(10)])
        .split(inner_area);

    let input = Paragraph::new(text).style(Style::default().fg(Color::Yellow));
    frame.render_widget(input, chunks[0]);

    let button_style = if chat.query.can_ask() {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let submit_button = Paragraph::new("[ Ask ]")
        .style(button_style)
        .alignment(Alignment::Center);
    frame.render_widget(submit_button, chunks[1]);

    if matches!(app.input_mode, InputMode::Question | InputMode::Path) {
        let x = chunks[0].x + cursor_offset(text, chunks[0].width);
        frame.set_cursor_position((x, chunks[0].y));
    }
}

fn render_response_panel(frame: &mut Frame, chat: &ChatScreen, area: Rect) {
    let block = Block::default().title("Response").borders(Borders::ALL);
    let lines = match render_response(chat.query.status()) {
        ResponseView::Hidden => vec![Line::from(Span::styled(
            "Ask a question about your uploaded files.",
            Style::default().fg(Color::DarkGray),
        ))],
        ResponseView::Loading => vec![Line::from(Span::styled(
            "Thinking...",
            Style::default().fg(Color::Yellow),
        ))],
        ResponseView::Error(message) => vec![Line::from(Span::styled(
            message,
            Style::default().fg(Color::Red),
        ))],
        ResponseView::Answer { text, evidence } => {
            let mut lines: Vec<Line> = text.lines().map(|l| Line::from(l.to_string())).collect();
            if !evidence.is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Retrieved Chunks:",
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                for item in evidence {
                    lines.push(Line::from(""));
                    lines.push(Line::from(Span::styled(
                        item.caption,
                        Style::default().fg(Color::Cyan),
                    )));
                    lines.extend(item.body.lines().map(|l| Line::from(l.to_string())));
                }
            }
            lines
        }
    };
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Renders the upload selection and the table of stored files.
fn render_files_panel(frame: &mut Frame, app: &App, chat: &ChatScreen, area: Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let mut upload_lines = vec![Line::from(format!(
        "  {}",
        chat.uploader.selection_summary()
    ))];
    if let Some(line) = op_line(chat.uploader.status(), "Uploading...") {
        upload_lines.push(line);
    }
    let upload = Paragraph::new(upload_lines).block(
        Block::default()
            .title(format!("Upload (chunk size {})", chat.config().chunk_size))
            .borders(Borders::ALL),
    );
    frame.render_widget(upload, layout[0]);

    let header_cells = ["File", "Chunks"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = chat.documents.files().iter().map(|file| {
        Row::new(vec![
            Cell::from(file.filename.clone()),
            Cell::from(file.chunk_count.to_string()),
        ])
    });

    let title = match chat.documents.refresh_status() {
        OpStatus::InFlight => "Stored Files (loading...)".to_string(),
        OpStatus::Failed(_) => "Stored Files (refresh failed)".to_string(),
        _ => format!("Stored Files: {}", chat.documents.summary()),
    };
    let table = Table::new(rows, [Constraint::Percentage(75), Constraint::Percentage(25)])
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default();
    if !chat.documents.files().is_empty() {
        state.select(Some(app.selected_file));
    }
    frame.render_stateful_widget(table, layout[1], &mut state);
}

/// A rectangle of the given percentage size, centered in `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn render_confirm_popup(frame: &mut Frame, filename: &str) {
    let area = centered_rect(50, 20, frame.area());
    let text = vec![
        Line::from(format!("Delete file \"{filename}\" and all its chunks?")),
        Line::from(""),
        Line::from("[y] Delete    [n] Cancel"),
    ];
    let popup = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().title("Confirm").borders(Borders::ALL));
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

fn render_viewer_popup(frame: &mut Frame, viewer: &Viewer) {
    let area = centered_rect(80, 80, frame.area());
    let (title, body, style) = match viewer {
        Viewer::Closed => return,
        Viewer::Loading { filename } => (
            filename.as_str(),
            "Loading...".to_string(),
            Style::default().fg(Color::Yellow),
        ),
        Viewer::Loaded { filename, content } => {
            (filename.as_str(), content.clone(), Style::default())
        }
        Viewer::Failed { filename, message } => (
            filename.as_str(),
            message.clone(),
            Style::default().fg(Color::Red),
        ),
    };
    let popup = Paragraph::new(body)
        .style(style)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(format!("{title} (Esc to close)"))
                .borders(Borders::ALL),
        );
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

/// Renders the bottom status bar.
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = Paragraph::new(app.status.as_str())
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));
    frame.render_widget(status, area);
}
