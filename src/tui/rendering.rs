use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs, Wrap};

use super::app::{MessageType, StatusMessage};
use super::layout::AppLayout;
use super::timestamps::{format_timestamp, format_utc};
use crate::models::MessageRecord;
use crate::utils::{sanitize_line, strip_ansi_codes};

const MUTED: Color = Color::Rgb(113, 113, 122);
const BRIGHT: Color = Color::Rgb(250, 250, 250);
const ACCENT: Color = Color::Rgb(16, 185, 129);
const ERROR: Color = Color::Rgb(239, 68, 68);
const BAR_BG: Color = Color::Rgb(24, 24, 27);

/// Tab labels longer than this are shortened with an ellipsis
const TAB_LABEL_CHARS: usize = 16;

/// Everything the browser screen draws in one frame
pub struct RenderState<'a> {
    pub conversation_ids: Vec<&'a str>,
    pub active_tab: usize,
    pub records: &'a [MessageRecord],
    pub selected_idx: usize,
    pub page_number: Option<u32>,
    pub visited_pages: Vec<u32>,
    pub has_previous: bool,
    pub has_next: bool,
    pub info: &'a str,
    pub status_message: Option<&'a StatusMessage>,
    pub now: DateTime<Utc>,
}

/// Render the entire browser UI
pub fn render_ui(frame: &mut Frame, state: &RenderState) {
    let layout = AppLayout::new(frame.area());

    render_tabs(frame, layout.tabs_area, state);
    render_messages(frame, layout.messages_area, state);
    render_preview(frame, layout.preview_area, state.records.get(state.selected_idx));
    render_nav_bar(frame, layout.nav_area, state);
    render_status_bar(frame, layout.status_area, state);
}

fn tab_label(conversation_id: &str) -> String {
    let clean = sanitize_line(conversation_id);
    if clean.chars().count() > TAB_LABEL_CHARS {
        let short: String = clean.chars().take(TAB_LABEL_CHARS).collect();
        format!("{}…", short)
    } else {
        clean
    }
}

fn render_tabs(frame: &mut Frame, area: Rect, state: &RenderState) {
    let titles: Vec<Line> =
        state.conversation_ids.iter().map(|id| Line::from(tab_label(id))).collect();

    let tabs = Tabs::new(titles)
        .select(state.active_tab)
        .style(Style::default().fg(MUTED))
        .highlight_style(Style::default().fg(BRIGHT).bg(ACCENT).add_modifier(Modifier::BOLD));

    frame.render_widget(tabs, area);
}

fn render_messages(frame: &mut Frame, area: Rect, state: &RenderState) {
    let header = Row::new(vec!["Time", "Sender", "Message"])
        .style(Style::default().fg(BRIGHT).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = state
        .records
        .iter()
        .map(|record| {
            let message = match &record.text {
                Some(text) => Cell::from(sanitize_line(text)),
                None => Cell::from("(no text)")
                    .style(Style::default().fg(MUTED).add_modifier(Modifier::ITALIC)),
            };
            Row::new(vec![
                Cell::from(format_timestamp(&record.created_time, &state.now)),
                Cell::from(sanitize_line(record.sender_label())),
                message,
            ])
        })
        .collect();

    let title = match state.conversation_ids.get(state.active_tab) {
        Some(id) => format!(" Conversation: {} ", sanitize_line(id)),
        None => " Conversation ".to_string(),
    };

    let table = Table::new(
        rows,
        [Constraint::Length(16), Constraint::Length(18), Constraint::Min(10)],
    )
    .header(header)
    .row_highlight_style(Style::default().fg(BRIGHT).bg(ACCENT).add_modifier(Modifier::BOLD))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(MUTED))
            .title(title),
    );

    let mut table_state = TableState::default();
    if !state.records.is_empty() {
        table_state.select(Some(state.selected_idx.min(state.records.len() - 1)));
    }
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn render_preview(frame: &mut Frame, area: Rect, record: Option<&MessageRecord>) {
    let content = if let Some(record) = record {
        let label = |name: &'static str| Span::styled(name, Style::default().fg(MUTED));

        let mut lines = vec![
            Line::from(vec![label("Time: "), Span::raw(format_utc(&record.created_time))]),
            Line::from(vec![label("From: "), Span::raw(sanitize_line(record.sender_label()))]),
        ];
        if let Some(sender_id) = &record.sender_id {
            lines.push(Line::from(vec![label("Sender ID: "), Span::raw(sanitize_line(sender_id))]));
        }
        if !record.recipient_ids.is_empty() {
            let to = record.recipient_ids.join(", ");
            lines.push(Line::from(vec![label("To: "), Span::raw(sanitize_line(&to))]));
        }
        lines.push(Line::from(vec![label("Message ID: "), Span::raw(sanitize_line(&record.id))]));
        lines.push(Line::from(""));

        match &record.text {
            Some(text) => {
                for line in strip_ansi_codes(text).lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
            None => lines.push(Line::from(Span::styled(
                "(no text)",
                Style::default().fg(MUTED).add_modifier(Modifier::ITALIC),
            ))),
        }

        Text::from(lines)
    } else {
        Text::from("No message selected")
    };

    let paragraph = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(MUTED))
                .title(" Preview "),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn render_nav_bar(frame: &mut Frame, area: Rect, state: &RenderState) {
    let button = |text: &'static str, enabled: bool| {
        let style = if enabled {
            Style::default().fg(BRIGHT).bg(ACCENT)
        } else {
            Style::default().fg(MUTED).bg(BAR_BG)
        };
        Span::styled(text, style)
    };

    let mut spans = vec![
        Span::raw(" "),
        button(" ◀ Prev Page ", state.has_previous),
        Span::raw(" "),
        button(" Next Page ▶ ", state.has_next),
        Span::raw("  "),
    ];

    if !state.visited_pages.is_empty() {
        spans.push(Span::styled("Pages: ", Style::default().fg(MUTED)));
        for number in &state.visited_pages {
            let style = if Some(*number) == state.page_number {
                Style::default().fg(BRIGHT).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(MUTED)
            };
            spans.push(Span::styled(number.to_string(), style));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::raw(" "));
    }

    spans.push(Span::styled(sanitize_line(state.info), Style::default().fg(BRIGHT)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &RenderState) {
    let (status_text, style) = match state.status_message {
        Some(msg) => {
            let fg = match msg.message_type {
                MessageType::Success => ACCENT,
                MessageType::Error => ERROR,
            };
            (format!(" {} ", msg.text), Style::default().fg(fg).bg(BAR_BG))
        }
        None => {
            let mut parts = vec![];
            if !state.records.is_empty() {
                parts.push(format!("message {}/{}", state.selected_idx + 1, state.records.len()));
            }
            parts.push("←/→: page".to_string());
            if state.conversation_ids.len() > 1 {
                parts.push("Tab: conversation".to_string());
            }
            parts.push("Ctrl+Y: copy".to_string());
            parts.push("r: retry".to_string());
            parts.push("q: quit".to_string());
            (format!(" {} ", parts.join(" | ")), Style::default().fg(BRIGHT).bg(BAR_BG))
        }
    };

    frame.render_widget(Paragraph::new(status_text).style(style), area);
}
