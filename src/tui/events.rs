use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// User actions in the conversation browser
#[derive(Debug, PartialEq)]
pub enum Action {
    Quit,
    NextPage,
    PreviousPage,
    NextConversation,
    PreviousConversation,
    MoveUp,
    MoveDown,
    JumpUp,
    JumpDown,
    CopyToClipboard,
    Reload,
    None,
}

/// User actions on the prompt screen
#[derive(Debug, PartialEq)]
pub enum PromptAction {
    Cancel,
    Submit,
    NextField,
    PreviousField,
    Insert(char),
    DeleteChar,
    None,
}

/// Poll for a key press. Releases and repeats reported by some terminals are ignored.
pub fn poll_key(timeout: Duration) -> anyhow::Result<Option<KeyEvent>> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
        && key.kind == KeyEventKind::Press
    {
        return Ok(Some(key));
    }
    Ok(None)
}

pub fn key_to_action(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Char('q'), KeyModifiers::NONE) | (KeyCode::Esc, _) => Action::Quit,

        // Pages
        (KeyCode::Right, _) | (KeyCode::Char('n'), KeyModifiers::NONE) => Action::NextPage,
        (KeyCode::Left, _) | (KeyCode::Char('p'), KeyModifiers::NONE) => Action::PreviousPage,

        // Conversations
        (KeyCode::Tab, _) => Action::NextConversation,
        (KeyCode::BackTab, _) => Action::PreviousConversation,

        // Rows (Vim style too)
        (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => Action::MoveUp,
        (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => Action::MoveDown,
        (KeyCode::PageUp, _) => Action::JumpUp,
        (KeyCode::PageDown, _) => Action::JumpDown,

        (KeyCode::Char('y'), KeyModifiers::CONTROL) => Action::CopyToClipboard,
        (KeyCode::Char('r'), KeyModifiers::NONE) => Action::Reload,

        _ => Action::None,
    }
}

pub fn key_to_prompt_action(key: KeyEvent) -> PromptAction {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Esc, _) => PromptAction::Cancel,
        (KeyCode::Enter, _) => PromptAction::Submit,
        (KeyCode::Tab, _) | (KeyCode::Down, _) => PromptAction::NextField,
        (KeyCode::BackTab, _) | (KeyCode::Up, _) => PromptAction::PreviousField,
        (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT) => {
            PromptAction::Insert(c)
        }
        (KeyCode::Backspace, _) => PromptAction::DeleteChar,
        _ => PromptAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_quit_actions() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_c), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Quit);
    }

    #[test]
    fn test_page_navigation() {
        assert_eq!(key_to_action(key(KeyCode::Right)), Action::NextPage);
        assert_eq!(key_to_action(key(KeyCode::Char('n'))), Action::NextPage);
        assert_eq!(key_to_action(key(KeyCode::Left)), Action::PreviousPage);
        assert_eq!(key_to_action(key(KeyCode::Char('p'))), Action::PreviousPage);
    }

    #[test]
    fn test_conversation_switching() {
        assert_eq!(key_to_action(key(KeyCode::Tab)), Action::NextConversation);
        let back_tab = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert_eq!(key_to_action(back_tab), Action::PreviousConversation);
    }

    #[test]
    fn test_row_navigation() {
        assert_eq!(key_to_action(key(KeyCode::Up)), Action::MoveUp);
        assert_eq!(key_to_action(key(KeyCode::Char('j'))), Action::MoveDown);
        assert_eq!(key_to_action(key(KeyCode::PageDown)), Action::JumpDown);
        assert_eq!(key_to_action(key(KeyCode::PageUp)), Action::JumpUp);
    }

    #[test]
    fn test_copy_and_reload() {
        let ctrl_y = KeyEvent::new(KeyCode::Char('y'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_y), Action::CopyToClipboard);
        assert_eq!(key_to_action(key(KeyCode::Char('r'))), Action::Reload);
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(key_to_action(key(KeyCode::F(1))), Action::None);
    }

    #[test]
    fn test_prompt_keys() {
        assert_eq!(key_to_prompt_action(key(KeyCode::Esc)), PromptAction::Cancel);
        assert_eq!(key_to_prompt_action(key(KeyCode::Enter)), PromptAction::Submit);
        assert_eq!(key_to_prompt_action(key(KeyCode::Tab)), PromptAction::NextField);
        assert_eq!(key_to_prompt_action(key(KeyCode::Char('q'))), PromptAction::Insert('q'));
        let shifted = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(key_to_prompt_action(shifted), PromptAction::Insert('A'));
        assert_eq!(key_to_prompt_action(key(KeyCode::Backspace)), PromptAction::DeleteChar);
    }
}
