use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use concierge_core::state::{ChatRole, TurnState, WidgetState};

use crate::app::App;

/// Widest the chat window gets; on narrow terminals it takes the full width.
const WINDOW_MAX_WIDTH: u16 = 64;

pub fn render(app: &mut App, frame: &mut Frame) {
    match app.window {
        WidgetState::Closed => render_launcher(app, frame),
        WidgetState::Open => render_chat_window(app, frame),
    }
}

/// Collapsed widget: a small badge in the bottom-right corner, the terminal
/// stand-in for the floating chat button.
fn render_launcher(app: &App, frame: &mut Frame) {
    let area = frame.area();
    let label = format!("{}  [o]", app.title);
    let width = (label.chars().count() as u16 + 4).min(area.width);
    let badge = Rect {
        x: area.width.saturating_sub(width + 1),
        y: area.height.saturating_sub(4),
        width,
        height: area.height.min(3),
    };

    let button = Paragraph::new(Line::from(vec![
        Span::raw(app.title.as_str()),
        Span::styled(
            "  [o]",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(button, badge);
}

fn render_chat_window(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let width = area.width.min(WINDOW_MAX_WIDTH);
    let window = Rect {
        x: area.width.saturating_sub(width),
        y: 0,
        width,
        height: area.height,
    };

    frame.render_widget(Clear, window);

    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(window);

    // Store chat dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", app.title))
        .title_alignment(Alignment::Left);

    let mut lines: Vec<Line> = Vec::new();
    for msg in &app.transcript {
        match msg.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )));
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    "Assistant:",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )));
            }
            // The system prompt is part of the conversation, never the
            // transcript; skip defensively if it ever shows up.
            ChatRole::System => continue,
        }
        for line in msg.content.lines() {
            lines.push(Line::from(line));
        }
        lines.push(Line::default());
    }

    if app.turn == TurnState::AwaitingReply {
        lines.push(Line::from(Span::styled(
            "Assistant:",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    let (input_title, input_color) = if app.input_enabled() {
        (" Message (Enter to send, Esc to close) ", Color::Cyan)
    } else {
        (" Waiting for reply... ", Color::DarkGray)
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_color))
        .title(input_title);

    let input = Paragraph::new(app.input.as_str()).block(input_block);
    frame.render_widget(input, input_area);

    if app.input_enabled() {
        let max_x = input_area.width.saturating_sub(2);
        let cursor_x = (app.input_cursor as u16).min(max_x);
        frame.set_cursor_position((input_area.x + 1 + cursor_x, input_area.y + 1));
    }
}
