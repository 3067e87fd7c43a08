//! Run configuration: `config.toml` settings merged with command-line overrides.
//!
//! # Error Handling Strategy
//!
//! Configuration problems are user errors and are reported through `anyhow` with the
//! offending path or key in the context. Nothing here is retried or defaulted silently
//! once the user named a value: a missing `--config` file or an out-of-range key fails
//! the run before any request is made.
//!
//! Precedence, highest first: command-line flag, environment, config file, built-in
//! default. The environment only carries the access token, and clap folds it into the
//! flag value before it gets here.

pub mod settings;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

pub use settings::{RetrySettings, Settings, config_file_path};

use crate::fetcher::{Credential, HttpTransport, PageFetcher, RetryPolicy};
use crate::models::SortOrder;
use crate::paginator::PaginationOptions;

/// Values given explicitly for this run.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub api_base: Option<String>,
    pub order: Option<SortOrder>,
    pub page_limit: Option<u32>,
    pub concurrency: Option<usize>,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// `None` when no usable token was supplied anywhere.
    pub credential: Option<Credential>,
    pub api_base: String,
    pub fields: String,
    pub page_size: u32,
    pub options: PaginationOptions,
    pub concurrency: usize,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl RunConfig {
    pub fn resolve(settings: &Settings, overrides: Overrides) -> Result<Self> {
        let credential = overrides
            .token
            .as_deref()
            .and_then(Credential::new)
            .or_else(|| settings.access_token.as_deref().and_then(Credential::new));

        let concurrency = overrides.concurrency.unwrap_or(settings.concurrency);
        if concurrency == 0 {
            anyhow::bail!("--concurrency must be at least 1");
        }

        Ok(Self {
            credential,
            api_base: overrides.api_base.unwrap_or_else(|| settings.api_base.clone()),
            fields: settings.fields.clone(),
            page_size: settings.page_size,
            options: PaginationOptions {
                order: overrides.order.unwrap_or(settings.order),
                page_limit: overrides.page_limit.unwrap_or(settings.page_limit),
            },
            concurrency,
            request_timeout: settings.request_timeout(),
            retry: settings.retry_policy(),
        })
    }

    /// Page fetcher over HTTP for this configuration.
    pub fn build_fetcher(&self) -> Result<Arc<PageFetcher>> {
        let transport = HttpTransport::new(&self.api_base, &self.fields, self.request_timeout)
            .context("Failed to set up the Graph API client")?;
        let fetcher = PageFetcher::new(Arc::new(transport))
            .with_retry(self.retry)
            .with_request_timeout(self.request_timeout)
            .with_page_size(self.page_size);
        Ok(Arc::new(fetcher))
    }
}
