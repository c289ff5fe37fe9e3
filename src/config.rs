//! # Scraper Configuration Module
//!
//! This module provides configuration for the Letterboxd scraper: where pages are
//! fetched from, how long a request may take, how many film pages may be fetched
//! at once, and how listing pagination is accumulated. It uses a builder pattern
//! for flexible configuration.
//!
//! ## Key Components
//!
//! - `ScraperConfig`: The main configuration struct
//! - `ScraperConfigBuilder`: Builder pattern implementation for easier configuration
//! - `Pagination`: How per-page listing results combine into the rated set
//!
//! ## Features
//!
//! - Defaults matching the live site
//! - URL templates for listing, unrated listing and film pages
//! - Environment overrides via `ScraperConfig::from_env`

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Default site root
pub const DEFAULT_BASE_URL: &str = "https://letterboxd.com";

/// Poster used when a film has no image
pub const DEFAULT_PLACEHOLDER_POSTER: &str = "https://via.placeholder.com/150";

/// Prefix for actor links
pub const DEFAULT_WIKI_BASE: &str = "https://en.wikipedia.org/wiki/";

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How listing pages combine into the final rated set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pagination {
    /// Each non-empty page replaces the previous one; only the last page survives
    #[default]
    LastPage,
    /// Each non-empty page is appended to the running lists
    Accumulate,
}

/// Configuration for the scraper
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Site root, without trailing slash
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// User agent to use for requests
    pub user_agent: String,

    /// Maximum number of film pages fetched at once in batch lookups
    pub concurrency: usize,

    /// Listing pagination policy
    pub pagination: Pagination,

    /// Optional cap on the number of listing pages fetched
    pub max_pages: Option<u32>,

    /// Poster URL used when none is available
    pub placeholder_poster: String,

    /// Prefix used to build actor links
    pub wiki_base: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("letterboxd-scraper/{}", env!("CARGO_PKG_VERSION")),
            concurrency: 1,
            pagination: Pagination::default(),
            max_pages: None,
            placeholder_poster: DEFAULT_PLACEHOLDER_POSTER.to_string(),
            wiki_base: DEFAULT_WIKI_BASE.to_string(),
        }
    }
}

/// Builder for ScraperConfig
#[derive(Debug, Default)]
pub struct ScraperConfigBuilder {
    config: ScraperConfig,
}

impl ScraperConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ScraperConfig::default(),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: ScraperConfig) -> Self {
        Self { config }
    }

    /// Set the site root
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout in seconds
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the number of film pages fetched at once
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Set the pagination policy
    pub fn pagination(mut self, pagination: Pagination) -> Self {
        self.config.pagination = pagination;
        self
    }

    /// Cap the number of listing pages fetched
    pub fn max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the placeholder poster URL
    pub fn placeholder_poster(mut self, url: impl Into<String>) -> Self {
        self.config.placeholder_poster = url.into();
        self
    }

    /// Set the prefix used for actor links
    pub fn wiki_base(mut self, wiki_base: impl Into<String>) -> Self {
        self.config.wiki_base = wiki_base.into();
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<ScraperConfig> {
        let config = self.config;

        Url::parse(&config.base_url)
            .map_err(|e| Error::InvalidConfig(format!("base_url '{}': {}", config.base_url, e)))?;

        if config.concurrency == 0 {
            return Err(Error::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if config.timeout_secs == 0 {
            return Err(Error::InvalidConfig(
                "timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }
}

impl ScraperConfig {
    /// Create a new builder
    pub fn builder() -> ScraperConfigBuilder {
        ScraperConfigBuilder::new()
    }

    /// Defaults overridden by `LETTERBOXD_BASE_URL`, `LETTERBOXD_TIMEOUT_SECS`
    /// and `LETTERBOXD_CONCURRENCY`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut builder = Self::builder();

        if let Some(base_url) = lookup("LETTERBOXD_BASE_URL") {
            builder = builder.base_url(base_url);
        }
        if let Some(raw) = lookup("LETTERBOXD_TIMEOUT_SECS") {
            let secs = raw.trim().parse().map_err(|_| {
                Error::InvalidConfig(format!("LETTERBOXD_TIMEOUT_SECS '{}' is not a number", raw))
            })?;
            builder = builder.timeout_secs(secs);
        }
        if let Some(raw) = lookup("LETTERBOXD_CONCURRENCY") {
            let n = raw.trim().parse().map_err(|_| {
                Error::InvalidConfig(format!("LETTERBOXD_CONCURRENCY '{}' is not a number", raw))
            })?;
            builder = builder.concurrency(n);
        }

        builder.build()
    }

    /// Get the timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Page `page` of a user's films listing
    pub fn listing_url(&self, username: &str, page: u32) -> String {
        format!("{}/{}/films/page/{}/", self.base_url, username.trim(), page)
    }

    /// The user's "rated: none" listing
    pub fn unrated_url(&self, username: &str) -> String {
        format!("{}/{}/films/rated/none/", self.base_url, username.trim())
    }

    /// A film's detail page
    pub fn film_url(&self, slug: &str) -> String {
        format!("{}/film/{}/", self.base_url, slug.trim())
    }

    /// Link to an actor's Wikipedia page; existence is not checked
    pub fn actor_wiki_url(&self, name: &str) -> String {
        format!("{}{}", self.wiki_base, name.replace(' ', "_"))
    }
}
