//! # letterboxd-scraper - Film catalogue extraction from Letterboxd
//!
//! This crate pulls structured film data out of Letterboxd's rendered pages and
//! normalizes it into records for downstream consumers such as a recommendation
//! model.
//!
//! ## Features
//!
//! - Paginated crawl of a user's rated films, with unrated films filtered out
//! - Per-film details from the embedded JSON-LD block, with HTML fallback for
//!   the summary and the review list
//! - Batch recommendation feed with per-film failure isolation
//! - One tabular row per rated film (`user_name, film_id, Movie_name, rating, image`)
//! - Async API with Tokio, pluggable [`http::Fetcher`] for the transport
//!
//! ## Example
//!
//! ```rust,no_run
//! use letterboxd_scraper::{config::ScraperConfig, dataset, http::HttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScraperConfig::from_env()?;
//!     let client = HttpClient::new(&config)?;
//!
//!     let data = dataset::scrape_user_dataset(&client, &config, "alice").await?;
//!     for row in &data.rows {
//!         println!("{} rated {} {}", row.user_name, row.movie_name, row.rating);
//!     }
//!     Ok(())
//! }
//! ```

mod dom;
mod error;

pub mod config;
pub mod dataset;
pub mod film;
pub mod http;
pub mod listing;
pub mod recommend;

pub use error::Error;

/// Re-export of common types for public use
pub mod prelude {
    pub use crate::config::{Pagination, ScraperConfig};
    pub use crate::dataset::{UserDataset, UserFilmRow};
    pub use crate::error::Error;
    pub use crate::error::Result;
    pub use crate::film::{DetailOutcome, FilmDetail, ReviewRecord};
    pub use crate::http::{FetchedPage, Fetcher, HttpClient};
    pub use crate::listing::{FilmEntry, RatedFilms};
    pub use crate::recommend::RecommendationEntry;
}
