use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use crate::config::{Overrides, RunConfig, Settings};
use crate::coordinator::Coordinator;
use crate::fetcher::Credential;
use crate::models::{FetchOutcome, SortOrder};
use crate::output::{
    OutputFormat, write_conversation_raw, write_conversation_text, write_json, write_skipped_text,
};
use crate::tui::{InteractiveSession, run_interactive};
use crate::utils::{LogTarget, init_logging};

/// Exit code when at least one conversation failed or was skipped
pub const EXIT_PARTIAL_FAILURE: u8 = 2;
/// Exit code after Ctrl+C
pub const EXIT_CANCELLED: u8 = 130;
/// Exit code for usage and configuration errors
pub const EXIT_USAGE: u8 = 1;

#[derive(Parser, Debug)]
#[command(name = "ig-message-explorer")]
#[command(version)]
#[command(about = "Fetch and browse Instagram direct message conversations", long_about = None)]
pub struct Cli {
    /// Conversation IDs to fetch
    #[arg(value_name = "CONVERSATION_ID")]
    pub conversation_ids: Vec<String>,

    /// File containing conversation IDs, one per line
    #[arg(long, value_name = "PATH")]
    pub ids_file: Option<PathBuf>,

    /// Instagram Graph API access token
    #[arg(long, env = "IG_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Sort messages by created time: asc or desc [default: asc]
    #[arg(long, value_name = "ORDER")]
    pub order: Option<SortOrder>,

    /// Maximum pages to fetch per conversation (0 means no limit)
    #[arg(long, value_name = "N")]
    pub page_limit: Option<u32>,

    /// Print plain output instead of starting the interactive browser
    #[arg(long)]
    pub no_tui: bool,

    /// Print one JSON record per line (requires --no-tui)
    #[arg(long, requires = "no_tui", conflicts_with = "json")]
    pub raw: bool,

    /// Print the whole result as one JSON document (requires --no-tui)
    #[arg(long, requires = "no_tui")]
    pub json: bool,

    /// Conversations fetched at the same time
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Config file [default: <config dir>/ig-message-explorer/config.toml]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Graph API base URL, including the version
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// Write logs to this file (RUST_LOG sets the level)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.raw {
            OutputFormat::Raw
        } else {
            OutputFormat::Text
        }
    }

    fn log_target(&self) -> LogTarget<'_> {
        match (&self.log_file, self.no_tui) {
            (Some(path), _) => LogTarget::File(path),
            (None, true) => LogTarget::Stderr,
            (None, false) => LogTarget::Disabled,
        }
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            token: self.token.clone(),
            api_base: self.api_base.clone(),
            order: self.order,
            page_limit: self.page_limit,
            concurrency: self.concurrency,
        }
    }
}

/// Parse the command line and run. Usage errors exit with 1; `--help` and
/// `--version` exit with 0.
pub fn run() -> Result<ExitCode> {
    match Cli::try_parse() {
        Ok(cli) => run_with(cli),
        Err(e) => {
            let _ = e.print();
            Ok(if e.use_stderr() { ExitCode::from(EXIT_USAGE) } else { ExitCode::SUCCESS })
        }
    }
}

pub fn run_with(cli: Cli) -> Result<ExitCode> {
    init_logging(cli.log_target())?;

    let settings = Settings::load_with(cli.config.as_deref())?;
    let config = RunConfig::resolve(&settings, cli.overrides())?;

    let mut conversation_ids = cli.conversation_ids.clone();
    if let Some(path) = &cli.ids_file {
        conversation_ids.extend(read_ids_file(path)?);
    }
    conversation_ids.retain(|id| !id.trim().is_empty());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let fetcher = config.build_fetcher()?;

    if !cli.no_tui {
        run_interactive(InteractiveSession {
            runtime: runtime.handle().clone(),
            fetcher,
            credential: config.credential.clone(),
            conversation_ids,
            options: config.options,
        })?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(credential) = config.credential.clone() else {
        anyhow::bail!("--token (or IG_ACCESS_TOKEN) is required with --no-tui");
    };
    if conversation_ids.is_empty() {
        anyhow::bail!("at least one conversation ID or --ids-file is required with --no-tui");
    }

    let coordinator = Coordinator::new(fetcher, config.options).with_concurrency(config.concurrency);
    let outcome = runtime.block_on(run_batch(
        &coordinator,
        &credential,
        &conversation_ids,
        cli.output_format(),
    ))?;

    Ok(exit_code_for(&outcome))
}

/// One ID per line; surrounding whitespace and blank lines are ignored.
pub fn read_ids_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read IDs file: {}", path.display()))?;
    Ok(content.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect())
}

pub fn exit_code_for(outcome: &FetchOutcome) -> ExitCode {
    if outcome.was_cancelled() {
        ExitCode::from(EXIT_CANCELLED)
    } else if outcome.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_PARTIAL_FAILURE)
    }
}

async fn run_batch(
    coordinator: &Coordinator,
    credential: &Credential,
    conversation_ids: &[String],
    format: OutputFormat,
) -> Result<FetchOutcome> {
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            tracing::warn!("interrupted; stopping before the next page request");
            eprintln!("Interrupted; finishing in-flight requests (Ctrl+C again to quit now)");
            cancel.cancel();

            // A page stuck in its retry loop can take a while; a second Ctrl+C exits
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(i32::from(EXIT_CANCELLED));
            }
        })
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut write_error: Option<io::Error> = None;

    let outcome = coordinator
        .run_with_progress(conversation_ids, credential, &cancel, |conversation| {
            if write_error.is_some() || !format.is_streaming() {
                return;
            }
            let result = match format {
                OutputFormat::Raw => write_conversation_raw(&mut out, conversation),
                _ => write_conversation_text(&mut out, conversation),
            };
            if let Err(e) = result.and_then(|()| out.flush()) {
                write_error = Some(e);
            }
            if format == OutputFormat::Raw
                && let Some(err) = conversation.error()
            {
                eprintln!("error: conversation {}: {}", conversation.conversation_id, err);
            }
        })
        .await;
    watcher.abort();

    if let Some(e) = write_error {
        return Err(e).context("Failed to write output");
    }

    match format {
        OutputFormat::Text => write_skipped_text(&mut out, outcome.skipped())?,
        OutputFormat::Json => write_json(&mut out, &outcome)?,
        OutputFormat::Raw => {
            for conversation_id in outcome.skipped() {
                eprintln!("error: conversation {}: skipped, access token was rejected", conversation_id);
            }
        }
    }
    out.flush().context("Failed to write output")?;

    Ok(outcome)
}
