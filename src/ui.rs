use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthChar;
use crate::app::{App, Focus};
use crate::state::{Conversation, Role};

const TITLE: &str = " Order E-Bot ";
const PLACEHOLDER: &str = "Type your Message...";
const THINKING: &str = "Thinking...";
const SEND_LABEL: &str = "Send";

fn role_style(role: Role) -> Style {
    let color = match role {
        Role::User => Color::Cyan,
        Role::Bot => Color::Yellow,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Lines of the messages window, in conversation order
pub fn conversation_lines(conversation: &Conversation, pending: bool) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = Vec::new();

    for msg in conversation {
        lines.push(Line::from(Span::styled(msg.role.label(), role_style(msg.role))));
        if msg.content.is_empty() {
            lines.push(Line::default());
        }
        for line in msg.content.lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::default());
    }

    if pending {
        lines.push(Line::from(Span::styled(
            THINKING,
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

/// Messages window contents with the wrapping used on screen
pub fn messages_paragraph(conversation: &Conversation, pending: bool) -> Paragraph<'static> {
    Paragraph::new(Text::from(conversation_lines(conversation, pending)))
        .wrap(Wrap { trim: false })
}

/// Slice of the draft that fits `width` columns with the cursor in view,
/// and the cursor's column within it. Widths are display columns, so wide
/// characters take two.
pub fn visible_input(draft: &str, cursor: usize, width: usize) -> (String, u16) {
    if width == 0 {
        return (String::new(), 0);
    }

    let widths: Vec<(char, usize)> = draft
        .chars()
        .map(|c| (c, c.width().unwrap_or(0)))
        .collect();
    let cursor = cursor.min(widths.len());
    let columns = |from: usize| -> usize { widths[from..cursor].iter().map(|(_, w)| w).sum() };

    // The cursor cell itself must fit, hence strictly less than width
    let mut offset = 0;
    while offset < cursor && columns(offset) >= width {
        offset += 1;
    }

    let mut visible = String::new();
    let mut used = 0;
    for &(c, w) in &widths[offset..] {
        if used + w > width {
            break;
        }
        visible.push(c);
        used += w;
    }

    (visible, columns(offset) as u16)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, messages, input row, footer
    let [header_area, messages_area, input_row, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(TITLE, Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, header_area);

    render_messages(app, frame, messages_area);
    render_input_row(app, frame, input_row);
    render_footer(app, frame, footer_area);
}

fn render_messages(app: &mut App, frame: &mut Frame, area: ratatui::layout::Rect) {
    // Inner size minus borders, for scroll calculations
    app.messages_height = area.height.saturating_sub(2);
    app.messages_width = area.width.saturating_sub(2);
    if app.follow_tail {
        app.scroll_to_bottom();
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let messages = messages_paragraph(&app.chat.conversation, app.chat.pending)
        .block(block)
        .scroll((app.scroll, 0));

    frame.render_widget(messages, area);
}

fn render_input_row(app: &mut App, frame: &mut Frame, area: ratatui::layout::Rect) {
    let [input_area, send_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(SEND_LABEL.len() as u16 + 6),
    ])
    .areas(area);

    // Store areas for mouse hit-testing
    app.input_area = Some(input_area);
    app.send_area = Some(send_area);

    let input_focused = app.focus == Focus::Input;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if input_focused { Color::Yellow } else { Color::DarkGray }));

    // Horizontal scrolling keeps the cursor visible
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) = visible_input(&app.chat.draft, app.chat.cursor, inner_width);

    let input = if app.chat.draft.is_empty() {
        Paragraph::new(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };
    frame.render_widget(input.block(input_block), input_area);

    if input_focused {
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }

    // Dimmed while a reply is outstanding
    let button_style = if !app.chat.can_send() {
        Style::default().fg(Color::DarkGray)
    } else if app.focus == Focus::SendButton {
        Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    };
    let button_border = if app.focus == Focus::SendButton && app.chat.can_send() {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let button = Paragraph::new(Line::from(Span::styled(format!(" {} ", SEND_LABEL), button_style)).centered())
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(button_border)));
    frame.render_widget(button, send_area);
}

fn render_footer(app: &App, frame: &mut Frame, area: ratatui::layout::Rect) {
    let hints = if app.chat.pending {
        " Waiting for reply... | PgUp/PgDn: scroll | Esc: quit "
    } else {
        " Enter: send | Tab: focus button | PgUp/PgDn: scroll | Esc: quit "
    };
    let footer = Paragraph::new(Span::styled(hints, Style::default().fg(Color::DarkGray)));
    frame.render_widget(footer, area);
}
