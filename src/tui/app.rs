//! TUI application state and event handling for the conversation browser.
//!
//! It manages:
//!
//! - **Conversation tabs**: one [`ConversationView`] per requested conversation
//! - **Paging**: lazy page loads through a cached [`ConversationPager`]
//! - **Event loop**: keyboard input and the application lifecycle
//! - **Status messages**: transient feedback for clipboard operations and errors
//!
//! # Architecture
//!
//! The `App` struct owns all state and runs the event loop via `run()`. The loop is
//! synchronous. A page load is queued first so the next frame shows "Loading…", then
//! performed on the tokio runtime through [`Handle::block_on`]. `run()` must therefore
//! be called from outside the runtime's worker threads.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use ratatui::Terminal;
use ratatui::backend::Backend;
use tokio::runtime::Handle;

use super::events::{Action, key_to_action, poll_key};
use super::history::{Direction, PageHistory, PageKey};
use super::rendering::{RenderState, render_ui};
use crate::clipboard::{ClipboardProvider, SystemClipboard, copy_message};
use crate::models::MessageRecord;
use crate::paginator::{BrowsePage, ConversationPager};

/// Duration for success status messages (milliseconds)
const STATUS_SUCCESS_DURATION_MS: u64 = 3000;
/// Duration for error status messages (milliseconds)
const STATUS_ERROR_DURATION_MS: u64 = 5000;
/// Rows moved by PageUp/PageDown
const JUMP_ROWS: isize = 10;

const LOADING: &str = "Loading…";
const END_OF_PAGES: &str = "Reached the end or page limit.";
const NO_NEWER_PAGES: &str = "No newer pages available.";
const NO_MESSAGES: &str = "No messages available.";

/// Type of status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Error,
}

/// Transient status message with expiry
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub message_type: MessageType,
    pub expires_at: Instant,
}

/// Browser state for one conversation tab.
pub struct ConversationView {
    pager: ConversationPager,
    history: PageHistory,
    page: Option<Arc<BrowsePage>>,
    selected_idx: usize,
    info: String,
    /// Load to repeat on reload after a failure
    failed: Option<(PageKey, Direction)>,
    next_blocked: bool,
}

impl ConversationView {
    fn new(pager: ConversationPager) -> Self {
        Self {
            pager,
            history: PageHistory::new(),
            page: None,
            selected_idx: 0,
            info: LOADING.to_string(),
            failed: None,
            next_blocked: false,
        }
    }

    pub fn conversation_id(&self) -> &str {
        self.pager.conversation_id()
    }

    pub fn records(&self) -> &[MessageRecord] {
        self.page.as_ref().map(|p| p.records.as_slice()).unwrap_or(&[])
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    fn has_next(&self) -> bool {
        !self.next_blocked && self.page.as_ref().is_some_and(|p| p.next_cursor.is_some())
    }

    fn has_previous(&self) -> bool {
        self.history.previous_target().is_some()
    }

    fn is_untouched(&self) -> bool {
        self.history.current().is_none() && self.failed.is_none()
    }
}

struct PendingLoad {
    view: usize,
    key: PageKey,
    direction: Direction,
}

pub struct App {
    runtime: Handle,
    views: Vec<ConversationView>,
    active: usize,
    should_quit: bool,
    pending: Option<PendingLoad>,
    clipboard: Box<dyn ClipboardProvider>,
    // Status message (clipboard feedback, load errors)
    status_message: Option<StatusMessage>,
    // Dirty state tracking for efficient rendering
    needs_redraw: bool,
    last_draw_time: Instant,
}

impl App {
    pub fn new(runtime: Handle, pagers: Vec<ConversationPager>) -> Self {
        let mut app = Self {
            runtime,
            views: pagers.into_iter().map(ConversationView::new).collect(),
            active: 0,
            should_quit: false,
            pending: None,
            clipboard: Box::new(SystemClipboard),
            status_message: None,
            needs_redraw: true,
            last_draw_time: Instant::now(),
        };
        app.queue_first_page_if_untouched();
        app
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardProvider>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Set a transient status message with automatic expiry
    fn set_status(&mut self, text: impl Into<String>, message_type: MessageType, duration_ms: u64) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            message_type,
            expires_at: Instant::now() + Duration::from_millis(duration_ms),
        });
        self.needs_redraw = true;
    }

    fn check_and_clear_expired_status(&mut self) {
        let should_clear =
            self.status_message.as_ref().is_some_and(|msg| Instant::now() >= msg.expires_at);
        if should_clear {
            self.status_message = None;
            self.needs_redraw = true;
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            self.check_and_clear_expired_status();

            // Draw if dirty or if it's been >100ms (for terminal resize handling)
            let now = Instant::now();
            let elapsed = now.duration_since(self.last_draw_time);
            if self.needs_redraw || elapsed >= Duration::from_millis(100) {
                terminal.draw(|f| render_ui(f, &self.render_state()))?;
                self.needs_redraw = false;
                self.last_draw_time = now;
            }

            // The "Loading…" frame is on screen; perform the queued load
            if let Some(load) = self.pending.take() {
                self.perform_load(load);
                continue;
            }

            if let Some(key) = poll_key(Duration::from_millis(100))? {
                self.handle_action(key_to_action(key));
            }
        }

        Ok(())
    }

    fn render_state(&self) -> RenderState<'_> {
        let view = self.views.get(self.active);
        RenderState {
            conversation_ids: self.views.iter().map(ConversationView::conversation_id).collect(),
            active_tab: self.active,
            records: view.map(ConversationView::records).unwrap_or(&[]),
            selected_idx: view.map(|v| v.selected_idx).unwrap_or(0),
            page_number: view.and_then(|v| v.history.current_number()),
            visited_pages: view.map(|v| v.history.visited_numbers()).unwrap_or_default(),
            has_previous: view.is_some_and(ConversationView::has_previous),
            has_next: view.is_some_and(ConversationView::has_next),
            info: view.map(ConversationView::info).unwrap_or("No conversations provided"),
            status_message: self.status_message.as_ref(),
            now: Utc::now(),
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::NextPage => self.go_next(),
            Action::PreviousPage => self.go_previous(),
            Action::NextConversation => self.switch_conversation(1),
            Action::PreviousConversation => self.switch_conversation(-1),
            Action::MoveUp => self.move_selection(-1),
            Action::MoveDown => self.move_selection(1),
            Action::JumpUp => self.move_selection(-JUMP_ROWS),
            Action::JumpDown => self.move_selection(JUMP_ROWS),
            Action::CopyToClipboard => self.copy_selected(),
            Action::Reload => self.reload(),
            Action::None => {}
        }
    }

    fn queue_load(&mut self, key: PageKey, direction: Direction) {
        if let Some(view) = self.views.get_mut(self.active) {
            view.info = LOADING.to_string();
            self.pending = Some(PendingLoad { view: self.active, key, direction });
            self.needs_redraw = true;
        }
    }

    fn queue_first_page_if_untouched(&mut self) {
        if self.views.get(self.active).is_some_and(ConversationView::is_untouched) {
            self.queue_load(PageKey::First, Direction::Initial);
        }
    }

    fn perform_load(&mut self, load: PendingLoad) {
        let Some(view) = self.views.get_mut(load.view) else {
            return;
        };
        let result = self.runtime.block_on(view.pager.fetch_page(load.key.cursor()));

        match result {
            Ok(Some(page)) => {
                let number = view.history.visit(load.key, load.direction);
                view.info = if page.records.is_empty() {
                    format!("Page {} (no messages)", number)
                } else {
                    format!("Page {}", number)
                };
                view.page = Some(page);
                view.selected_idx = 0;
                view.failed = None;
                view.next_blocked = false;
            }
            Ok(None) => {
                let info = match load.direction {
                    Direction::Next => {
                        view.next_blocked = true;
                        END_OF_PAGES
                    }
                    Direction::Previous => NO_NEWER_PAGES,
                    Direction::Initial => NO_MESSAGES,
                };
                view.info = info.to_string();
            }
            Err(e) => {
                tracing::warn!(conversation_id = view.conversation_id(), "page load failed: {}", e);
                view.info = format!("Error: {}", e);
                view.failed = Some((load.key, load.direction));
                self.set_status(
                    format!("✗ {} (r: retry)", e.kind()),
                    MessageType::Error,
                    STATUS_ERROR_DURATION_MS,
                );
            }
        }
        self.needs_redraw = true;
    }

    fn go_next(&mut self) {
        let Some(view) = self.views.get_mut(self.active) else {
            return;
        };
        let next = view.page.as_ref().and_then(|p| p.next_cursor.clone());
        match next {
            Some(cursor) if !view.next_blocked => {
                self.queue_load(PageKey::At(cursor), Direction::Next);
            }
            _ if view.page.is_some() => {
                view.info = END_OF_PAGES.to_string();
                self.needs_redraw = true;
            }
            _ => {}
        }
    }

    fn go_previous(&mut self) {
        let Some(view) = self.views.get_mut(self.active) else {
            return;
        };
        match view.history.previous_target().cloned() {
            Some(key) => self.queue_load(key, Direction::Previous),
            None if view.page.is_some() => {
                view.info = NO_NEWER_PAGES.to_string();
                self.needs_redraw = true;
            }
            None => {}
        }
    }

    fn switch_conversation(&mut self, delta: isize) {
        let count = self.views.len();
        if count < 2 {
            return;
        }
        self.active = (self.active as isize + delta).rem_euclid(count as isize) as usize;
        self.needs_redraw = true;
        self.queue_first_page_if_untouched();
    }

    fn move_selection(&mut self, delta: isize) {
        let Some(view) = self.views.get_mut(self.active) else {
            return;
        };
        let total = view.records().len();
        if total == 0 {
            view.selected_idx = 0;
            return;
        }

        let old_idx = view.selected_idx;
        let new_idx = (view.selected_idx as isize + delta).max(0) as usize;
        view.selected_idx = new_idx.min(total - 1);

        if old_idx != view.selected_idx {
            self.needs_redraw = true;
        }
    }

    fn copy_selected(&mut self) {
        let Some(view) = self.views.get(self.active) else {
            return;
        };
        let records = view.records();

        if records.is_empty() {
            self.set_status("✗ No message to copy", MessageType::Error, STATUS_ERROR_DURATION_MS);
        } else if let Some(record) = records.get(view.selected_idx) {
            let result = copy_message(self.clipboard.as_mut(), record);
            match result {
                Ok(()) => self.set_status(
                    "✓ Copied to clipboard",
                    MessageType::Success,
                    STATUS_SUCCESS_DURATION_MS,
                ),
                Err(e) => self.set_status(
                    format!("✗ Clipboard error: {}", e),
                    MessageType::Error,
                    STATUS_ERROR_DURATION_MS,
                ),
            }
        } else {
            self.set_status("✗ Invalid selection", MessageType::Error, STATUS_ERROR_DURATION_MS);
        }
    }

    fn reload(&mut self) {
        let failed = self.views.get(self.active).and_then(|v| v.failed.clone());
        match failed {
            Some((key, direction)) => self.queue_load(key, direction),
            None => {
                self.set_status("Nothing to reload", MessageType::Success, STATUS_SUCCESS_DURATION_MS)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use serde_json::{Value, json};
    use tokio::runtime::Runtime;

    use super::*;
    use crate::clipboard::tests::MockClipboard;
    use crate::fetcher::{Credential, PageFetcher, PageRequest, RetryPolicy, Transport, TransportError};
    use crate::models::SortOrder;

    /// Pages keyed by cursor (`None` for the first page); unknown cursors are a 404.
    struct Pages(HashMap<Option<String>, Value>);

    #[async_trait]
    impl Transport for Pages {
        async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Value, TransportError> {
            let key = request.cursor.map(|c| c.as_str().to_string());
            self.0
                .get(&key)
                .cloned()
                .ok_or(TransportError::Status { status: 404, body: String::new() })
        }
    }

    fn page(ids: &[&str], next: Option<&str>) -> Value {
        let data: Vec<Value> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                json!({
                    "id": id,
                    "created_time": format!("2024-01-15T10:{:02}:00+0000", i),
                    "message": format!("text {}", id),
                })
            })
            .collect();
        match next {
            Some(next) => json!({"data": data, "paging": {"next": next}}),
            None => json!({"data": data}),
        }
    }

    fn runtime() -> Runtime {
        tokio::runtime::Builder::new_multi_thread().worker_threads(1).enable_all().build().unwrap()
    }

    fn app(runtime: &Runtime, conversations: &[&str], pages: Vec<(Option<&str>, Value)>) -> App {
        let transport = Arc::new(Pages(
            pages.into_iter().map(|(k, v)| (k.map(str::to_string), v)).collect(),
        ));
        let fetcher =
            Arc::new(PageFetcher::new(transport).with_retry(RetryPolicy::no_retry()));
        let pagers = conversations
            .iter()
            .map(|id| {
                ConversationPager::new(
                    fetcher.clone(),
                    Credential::new("t").unwrap(),
                    *id,
                    SortOrder::Ascending,
                    0,
                )
            })
            .collect();
        App::new(runtime.handle().clone(), pagers).with_clipboard(Box::new(MockClipboard::default()))
    }

    fn drain(app: &mut App) {
        while let Some(load) = app.pending.take() {
            app.perform_load(load);
        }
    }

    #[test]
    fn test_first_page_queued_on_start() {
        let rt = runtime();
        let mut app = app(&rt, &["c1"], vec![(None, page(&["a", "b"], None))]);
        assert_eq!(app.views[0].info(), LOADING);
        assert!(app.pending.is_some());

        drain(&mut app);
        assert_eq!(app.views[0].info(), "Page 1");
        assert_eq!(app.views[0].records().len(), 2);
    }

    #[test]
    fn test_next_and_previous_pages() {
        let rt = runtime();
        let mut app = app(
            &rt,
            &["c1"],
            vec![(None, page(&["a"], Some("p2"))), (Some("p2"), page(&["b"], None))],
        );
        drain(&mut app);

        app.handle_action(Action::NextPage);
        assert_eq!(app.views[0].info(), LOADING);
        drain(&mut app);
        assert_eq!(app.views[0].info(), "Page 2");
        assert_eq!(app.views[0].records()[0].id, "b");
        assert!(!app.views[0].has_next());

        app.handle_action(Action::NextPage);
        assert_eq!(app.views[0].info(), END_OF_PAGES);
        assert!(app.pending.is_none());

        app.handle_action(Action::PreviousPage);
        drain(&mut app);
        assert_eq!(app.views[0].info(), "Page 1");
        assert_eq!(app.views[0].records()[0].id, "a");

        app.handle_action(Action::PreviousPage);
        assert_eq!(app.views[0].info(), NO_NEWER_PAGES);
    }

    #[test]
    fn test_failed_load_reports_and_retries() {
        let rt = runtime();
        let mut app = app(&rt, &["c1"], vec![]);
        drain(&mut app);

        assert!(app.views[0].info().starts_with("Error:"));
        let msg = app.status_message.as_ref().unwrap();
        assert_eq!(msg.message_type, MessageType::Error);
        assert!(msg.text.contains("not_found"));

        app.handle_action(Action::Reload);
        assert!(app.pending.is_some());
    }

    #[test]
    fn test_switching_tabs_loads_lazily() {
        let rt = runtime();
        let mut app = app(&rt, &["c1", "c2"], vec![(None, page(&["a"], None))]);
        drain(&mut app);
        assert!(app.views[1].is_untouched());

        app.handle_action(Action::NextConversation);
        assert_eq!(app.active, 1);
        drain(&mut app);
        assert_eq!(app.views[1].info(), "Page 1");

        app.handle_action(Action::NextConversation);
        assert_eq!(app.active, 0);
        assert!(app.pending.is_none());
        app.handle_action(Action::PreviousConversation);
        assert_eq!(app.active, 1);
    }

    #[test]
    fn test_move_selection_bounds() {
        let rt = runtime();
        let mut app = app(&rt, &["c1"], vec![(None, page(&["a", "b", "c"], None))]);
        drain(&mut app);

        app.handle_action(Action::MoveDown);
        assert_eq!(app.views[0].selected_idx, 1);
        app.handle_action(Action::JumpDown);
        assert_eq!(app.views[0].selected_idx, 2);
        app.handle_action(Action::JumpUp);
        assert_eq!(app.views[0].selected_idx, 0);
        app.handle_action(Action::MoveUp);
        assert_eq!(app.views[0].selected_idx, 0);
    }

    #[test]
    fn test_copy_selected_message() {
        let rt = runtime();
        let mut app = app(&rt, &["c1"], vec![(None, page(&["a", "b"], None))]);
        drain(&mut app);

        app.handle_action(Action::MoveDown);
        app.handle_action(Action::CopyToClipboard);
        let msg = app.status_message.as_ref().unwrap();
        assert_eq!(msg.text, "✓ Copied to clipboard");
        assert_eq!(msg.message_type, MessageType::Success);
    }

    #[test]
    fn test_copy_with_no_messages() {
        let rt = runtime();
        let mut app = app(&rt, &["c1"], vec![(None, page(&[], None))]);
        drain(&mut app);
        assert_eq!(app.views[0].info(), "Page 1 (no messages)");

        app.handle_action(Action::CopyToClipboard);
        assert_eq!(app.status_message.as_ref().unwrap().text, "✗ No message to copy");
    }

    #[test]
    fn test_status_message_expiry() {
        let rt = runtime();
        let mut app = app(&rt, &["c1"], vec![]);
        app.set_status("Expired", MessageType::Success, 0);
        std::thread::sleep(Duration::from_millis(1));
        app.check_and_clear_expired_status();
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_quit() {
        let rt = runtime();
        let mut app = app(&rt, &["c1"], vec![]);
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }
}
