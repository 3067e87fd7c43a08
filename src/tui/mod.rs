//! Interactive terminal UI: a prompt screen for missing input and a paged
//! conversation browser.
//!
//! # Error Handling Strategy
//!
//! Terminal setup and drawing failures abort the TUI and propagate as `anyhow` errors;
//! [`terminal::TerminalManager`] restores the terminal on every exit path, panics
//! included. Page load failures never leave the browser: they are shown on the
//! affected tab and can be retried with `r`.

mod app;
mod events;
mod history;
mod layout;
pub mod prompt;
mod rendering;
pub mod terminal;
mod timestamps;

use std::sync::Arc;

use anyhow::{Context, Result};
pub use app::App;
pub use prompt::{PromptForm, PromptInput};
use tokio::runtime::Handle;

use crate::fetcher::{Credential, PageFetcher};
use crate::paginator::{ConversationPager, PaginationOptions};
use terminal::TerminalManager;

/// Inputs for an interactive session. Missing credential or IDs are asked for on the
/// prompt screen first.
pub struct InteractiveSession {
    pub runtime: Handle,
    pub fetcher: Arc<PageFetcher>,
    pub credential: Option<Credential>,
    pub conversation_ids: Vec<String>,
    pub options: PaginationOptions,
}

/// Run the interactive TUI until the user quits.
///
/// Must not be called from inside the tokio runtime.
pub fn run_interactive(session: InteractiveSession) -> Result<()> {
    let mut manager = TerminalManager::new()?;
    let result = drive(&mut manager, session);
    manager.restore()?;
    result
}

fn drive(manager: &mut TerminalManager, session: InteractiveSession) -> Result<()> {
    let InteractiveSession { runtime, fetcher, credential, conversation_ids, options } = session;

    let (credential, conversation_ids) = match credential {
        Some(credential) if !conversation_ids.is_empty() => (credential, conversation_ids),
        preset => {
            let form =
                PromptForm::new(preset.as_ref().map(Credential::expose), &conversation_ids);
            let Some(input) = prompt::run_prompt(manager.terminal_mut(), form)? else {
                tracing::info!("prompt cancelled");
                return Ok(());
            };
            let credential =
                Credential::new(&input.token).context("Access token must not be empty")?;
            (credential, input.conversation_ids)
        }
    };

    let pagers = conversation_ids
        .iter()
        .map(|id| {
            ConversationPager::new(
                Arc::clone(&fetcher),
                credential.clone(),
                id.as_str(),
                options.order,
                options.page_limit,
            )
        })
        .collect();

    App::new(runtime, pagers).run(manager.terminal_mut())
}
