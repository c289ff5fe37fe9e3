//! Film pages
//!
//! This module turns a film's page into a [`FilmDetail`]: the JSON-LD block gives
//! the canonical fields, the page HTML gives the summary and the reviews.

mod detail;
pub mod jsonld;
mod reviews;

pub use detail::{extract_detail, extract_detail_from_html};
pub use jsonld::FilmJsonLd;
pub use reviews::extract_reviews;

use serde::{Deserialize, Serialize};

use crate::config::ScraperConfig;

/// Title used when a film has none
pub const UNKNOWN_TITLE: &str = "Unknown Movie";

/// Year and director when unknown
pub const NOT_AVAILABLE: &str = "N/A";

/// Genre reported by the placeholder detail
pub const PLACEHOLDER_GENRE: &str = "Drama";

/// An actor with a best-effort Wikipedia link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub wiki_url: String,
}

/// One user review from a film page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Reviewer display name, "Unknown" when absent
    pub reviewer: String,

    /// Paragraph text joined with spaces
    pub content: String,

    /// Like count as shown on the site
    pub likes: String,
}

/// Everything we know about one film
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmDetail {
    pub slug: String,
    pub title: String,
    /// Four-digit year or "N/A"
    pub year: String,
    pub genres: Vec<String>,
    pub director: String,
    /// Site average rating, 0.0 when absent
    pub rating: f64,
    pub poster_url: String,
    pub actors: Vec<Actor>,
    pub summary: String,
    pub reviews: Vec<ReviewRecord>,
}

impl FilmDetail {
    /// Stand-in returned when the JSON-LD block cannot be decoded
    pub fn placeholder(config: &ScraperConfig, slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            title: UNKNOWN_TITLE.to_string(),
            year: NOT_AVAILABLE.to_string(),
            genres: vec![PLACEHOLDER_GENRE.to_string()],
            director: NOT_AVAILABLE.to_string(),
            rating: 0.0,
            poster_url: config.placeholder_poster.clone(),
            actors: Vec::new(),
            summary: String::new(),
            reviews: Vec::new(),
        }
    }
}

/// Result of a single-film lookup
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    /// The JSON-LD block decoded
    Complete(FilmDetail),

    /// The block was present but malformed; a placeholder stands in
    DecodeFailed {
        placeholder: FilmDetail,
        reason: String,
    },
}

impl DetailOutcome {
    pub fn detail(&self) -> &FilmDetail {
        match self {
            DetailOutcome::Complete(detail) => detail,
            DetailOutcome::DecodeFailed { placeholder, .. } => placeholder,
        }
    }

    pub fn into_detail(self) -> FilmDetail {
        match self {
            DetailOutcome::Complete(detail) => detail,
            DetailOutcome::DecodeFailed { placeholder, .. } => placeholder,
        }
    }

    /// Whether the detail is a placeholder
    pub fn is_degraded(&self) -> bool {
        matches!(self, DetailOutcome::DecodeFailed { .. })
    }
}
