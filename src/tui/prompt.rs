use std::time::Duration;

use anyhow::Result;
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::events::{PromptAction, key_to_prompt_action, poll_key};
use super::layout::centered_rect;
use crate::utils::normalize_token;

/// Input length cap per field
const MAX_FIELD_CHARS: usize = 4096;

const MUTED: Color = Color::Rgb(113, 113, 122);
const BRIGHT: Color = Color::Rgb(250, 250, 250);
const ACCENT: Color = Color::Rgb(16, 185, 129);
const ERROR: Color = Color::Rgb(239, 68, 68);

/// What the user entered on the prompt screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptInput {
    pub token: String,
    pub conversation_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Token,
    ConversationIds,
}

/// Result of feeding one action to the form.
#[derive(Debug, PartialEq)]
pub enum PromptOutcome {
    Pending,
    Submitted(PromptInput),
    Cancelled,
}

/// Token and conversation ID entry form, prefilled with whatever the command line
/// already provided.
#[derive(Debug)]
pub struct PromptForm {
    token: String,
    conversation_ids: String,
    focus: Field,
    error: Option<&'static str>,
}

impl PromptForm {
    pub fn new(preset_token: Option<&str>, preset_ids: &[String]) -> Self {
        let token = preset_token.unwrap_or_default().to_string();
        let focus = if token.is_empty() { Field::Token } else { Field::ConversationIds };
        Self { token, conversation_ids: preset_ids.join(", "), focus, error: None }
    }

    pub fn handle(&mut self, action: PromptAction) -> PromptOutcome {
        match action {
            PromptAction::Cancel => return PromptOutcome::Cancelled,
            PromptAction::Submit => {
                if self.focus == Field::Token && self.conversation_ids.trim().is_empty() {
                    self.focus = Field::ConversationIds;
                } else if let Some(input) = self.submit() {
                    return PromptOutcome::Submitted(input);
                }
            }
            PromptAction::NextField | PromptAction::PreviousField => {
                self.focus = match self.focus {
                    Field::Token => Field::ConversationIds,
                    Field::ConversationIds => Field::Token,
                };
            }
            PromptAction::Insert(c) => {
                let field = self.focused_mut();
                if field.chars().count() < MAX_FIELD_CHARS {
                    field.push(c);
                }
            }
            PromptAction::DeleteChar => {
                self.focused_mut().pop();
            }
            PromptAction::None => {}
        }
        PromptOutcome::Pending
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Token => &mut self.token,
            Field::ConversationIds => &mut self.conversation_ids,
        }
    }

    fn submit(&mut self) -> Option<PromptInput> {
        let token = normalize_token(&self.token);
        let conversation_ids = parse_id_list(&self.conversation_ids);

        if token.is_empty() {
            self.error = Some("Please provide an access token.");
            self.focus = Field::Token;
            return None;
        }
        if conversation_ids.is_empty() {
            self.error = Some("Please provide at least one conversation ID.");
            self.focus = Field::ConversationIds;
            return None;
        }
        self.error = None;
        Some(PromptInput { token, conversation_ids })
    }
}

/// Split a comma-separated ID list, dropping blanks.
pub fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// Run the prompt until it is submitted (`Some`) or cancelled (`None`).
pub fn run_prompt<B: Backend>(
    terminal: &mut Terminal<B>,
    mut form: PromptForm,
) -> Result<Option<PromptInput>> {
    loop {
        terminal.draw(|f| render_prompt(f, &form))?;

        let Some(key) = poll_key(Duration::from_millis(250))? else {
            continue;
        };
        match form.handle(key_to_prompt_action(key)) {
            PromptOutcome::Pending => {}
            PromptOutcome::Submitted(input) => return Ok(Some(input)),
            PromptOutcome::Cancelled => return Ok(None),
        }
    }
}

pub fn render_prompt(frame: &mut Frame, form: &PromptForm) {
    let area = centered_rect(frame.area(), 72, 13);
    frame.render_widget(Clear, area);

    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MUTED))
        .title(" Instagram Message Explorer ");
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Instructions
            Constraint::Length(3), // Token
            Constraint::Length(3), // Conversation IDs
            Constraint::Length(1), // Error
            Constraint::Min(1),    // Hints
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(
            "Enter your Instagram Graph API token and conversation IDs (comma separated).",
        )
        .wrap(Wrap { trim: true }),
        rows[0],
    );

    let masked: String = "•".repeat(form.token.chars().count());
    render_field(frame, rows[1], " Access token ", &masked, form.focus == Field::Token);
    render_field(
        frame,
        rows[2],
        " Conversation IDs ",
        &form.conversation_ids,
        form.focus == Field::ConversationIds,
    );

    if let Some(error) = form.error {
        frame.render_widget(Paragraph::new(error).style(Style::default().fg(ERROR)), rows[3]);
    }

    let hints = Line::from(vec![
        Span::styled("Enter", Style::default().fg(BRIGHT).add_modifier(Modifier::BOLD)),
        Span::styled(": fetch messages  ", Style::default().fg(MUTED)),
        Span::styled("Tab", Style::default().fg(BRIGHT).add_modifier(Modifier::BOLD)),
        Span::styled(": switch field  ", Style::default().fg(MUTED)),
        Span::styled("Esc", Style::default().fg(BRIGHT).add_modifier(Modifier::BOLD)),
        Span::styled(": quit", Style::default().fg(MUTED)),
    ]);
    frame.render_widget(Paragraph::new(hints), rows[4]);
}

fn render_field(
    frame: &mut Frame,
    area: Rect,
    title: &'static str,
    value: &str,
    focused: bool,
) {
    let border = if focused { ACCENT } else { MUTED };
    let shown = if focused { format!("{}▏", value) } else { value.to_string() };

    // Keep the end of long values visible
    let width = area.width.saturating_sub(2) as usize;
    let count = shown.chars().count();
    let visible: String = shown.chars().skip(count.saturating_sub(width)).collect();

    let paragraph = Paragraph::new(visible).block(
        Block::default().borders(Borders::ALL).border_style(Style::default().fg(border)).title(title),
    );
    frame.render_widget(paragraph, area);
}
