use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use pitchside_core::{ChatRole, ModelId};

use crate::app::{App, InputMode};

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("**") else {
            break;
        };

        if open > 0 {
            spans.push(Span::raw(rest[..open].to_string()));
        }
        let bold = &after_open[..close];
        if bold.is_empty() {
            spans.push(Span::raw("****"));
        } else {
            spans.push(Span::styled(
                bold.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        rest = &after_open[close + 2..];
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat_screen(app, frame, body_area);
    render_footer(app, frame, footer_area);

    if app.show_model_picker {
        render_model_picker(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let status = if app.chat.server_available() {
        Span::styled(
            format!(" {} ", app.chat.config().api_endpoint),
            Style::default().fg(Color::Green),
        )
    } else {
        Span::styled(" offline ", Style::default().fg(Color::Yellow))
    };

    let title = Line::from(vec![
        Span::styled(" Pitchside ", Style::default().fg(Color::Cyan).bold()),
        Span::styled("match analysis", Style::default().fg(Color::White)),
        Span::raw(" "),
        status,
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let banner_height = if app.chat.server_unavailable_shown() { 1 } else { 0 };

    let [banner_area, chat_area, hint_area, input_area] = Layout::vertical([
        Constraint::Length(banner_height),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    if banner_height > 0 {
        let banner = Paragraph::new(Line::from(Span::styled(
            " Backend unavailable: replies are placeholders until the analysis server is running ",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        )));
        frame.render_widget(banner, banner_area);
    }

    render_transcript(app, frame, chat_area);
    render_match_hint(app, frame, hint_area);
    render_input(app, frame, input_area);
}

fn render_transcript(app: &App, frame: &mut Frame, area: Rect) {
    let model = app.chat.selected_model();
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.input_mode == InputMode::Normal {
            Color::Cyan
        } else {
            Color::DarkGray
        }))
        .title(format!(" {}: {} ", model.provider().display_name(), model.as_str()));

    let chat = transcript_paragraph(app)
        .block(chat_block)
        .scroll((app.scroll, 0));

    frame.render_widget(chat, area);
}

/// The transcript exactly as it is drawn, minus the border. Also used to
/// measure the wrapped height for scrolling.
pub fn transcript_paragraph(app: &App) -> Paragraph<'static> {
    let text = if app.chat.transcript().is_empty() && !app.chat.is_loading() {
        Text::from(vec![
            Line::from(Span::styled(
                "Ask about a fixture, e.g. \"Mumbai Indians vs Chennai Super Kings at Wankhede Stadium\"",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(
                "Venue history, head-to-head, key players and a prediction come back from the analysis server.",
                Style::default().fg(Color::DarkGray),
            )),
        ])
    } else {
        let mut lines: Vec<Line<'static>> = Vec::new();

        for msg in app.chat.transcript() {
            match msg.role() {
                ChatRole::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    for line in msg.content().lines() {
                        lines.push(Line::from(line.to_string()));
                    }
                    lines.push(Line::default());
                }
                ChatRole::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "Analyst:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    for line in msg.content().lines() {
                        lines.push(parse_markdown_line(line));
                    }
                    lines.push(Line::default());
                }
            }
        }

        if app.chat.is_loading() {
            lines.push(Line::from(Span::styled(
                "Analyst:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Analyzing{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    Paragraph::new(text).wrap(Wrap { trim: true })
}

fn render_match_hint(app: &App, frame: &mut Frame, area: Rect) {
    let line = match app.detected_match() {
        Some(fixture) if fixture.teams_recognized() => Line::from(vec![
            Span::styled(" Match: ", Style::default().fg(Color::DarkGray)),
            Span::styled(fixture.to_string(), Style::default().fg(Color::Green)),
        ]),
        Some(fixture) => Line::from(vec![
            Span::styled(" Match: ", Style::default().fg(Color::DarkGray)),
            Span::styled(fixture.to_string(), Style::default().fg(Color::Yellow)),
            Span::styled(" (teams not recognized)", Style::default().fg(Color::DarkGray)),
        ]),
        None if !app.input.trim().is_empty() => Line::from(Span::styled(
            " Tip: phrase it as 'Team1 vs Team2 at Venue'",
            Style::default().fg(Color::DarkGray),
        )),
        None => Line::default(),
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(if app.chat.is_loading() {
            " Ask (waiting for reply) "
        } else {
            " Ask (Enter to send) "
        });

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    // Show cursor when editing
    if editing && !app.show_model_picker {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" INSERT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut spans = vec![Span::styled(mode_text, mode_style)];

    let hints: &[(&str, &str)] = match app.input_mode {
        InputMode::Normal => &[
            ("i", "type"),
            ("j/k", "scroll"),
            ("m", "model"),
            ("n", "new chat"),
            ("q", "quit"),
        ],
        InputMode::Editing => &[("Enter", "send"), ("PgUp/PgDn", "scroll"), ("Esc", "normal")],
    };
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
    }

    if let Some(notice) = &app.notice {
        spans.push(Span::styled(
            format!("  {}", notice),
            Style::default().fg(Color::Yellow),
        ));
    } else if let Some(prediction) = app.chat.latest_prediction() {
        spans.push(Span::styled(
            format!(
                "  Prediction: {} ({:.0}%)",
                prediction.team,
                prediction.win_probability * 100.0
            ),
            Style::default().fg(Color::Green),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_model_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let models = ModelId::all();

    // Calculate popup size and position (centered)
    let popup_width = 44.min(area.width.saturating_sub(4));
    let popup_height = (models.len() as u16 + 2).min(area.height.saturating_sub(4));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Select Model (Enter to select, Esc to cancel) ");

    let selected = app.chat.selected_model();
    let items: Vec<ListItem> = models
        .iter()
        .map(|model| {
            let style = if *model == selected {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!(
                " {:<16} {} ",
                model.as_str(),
                model.provider().display_name()
            ))
            .style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.model_picker_state);
}
