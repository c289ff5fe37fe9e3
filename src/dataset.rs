//! User rating dataset
//!
//! Joins the listing crawl, the unrated filter and the poster lookups into one
//! row per rated film, and writes the rows out as JSON, TSV or a text table.

use std::io::Write;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::config::ScraperConfig;
use crate::error::Result;
use crate::http::Fetcher;
use crate::listing::{crawl, filter_unrated};
use crate::recommend::fetch_structured_data;

/// Column names of the tabular output, in order
pub const COLUMNS: [&str; 5] = ["user_name", "film_id", "Movie_name", "rating", "image"];

/// One rated film of one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFilmRow {
    pub user_name: String,
    pub film_id: String,
    #[serde(rename = "Movie_name")]
    pub movie_name: String,
    pub rating: u8,
    pub image: String,
}

/// All rows scraped for a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDataset {
    pub username: String,
    pub scraped_at: DateTime<Utc>,
    pub rows: Vec<UserFilmRow>,
}

/// Zip the parallel lists into rows, one per index.
///
/// Lists of unequal length are truncated to the shortest.
pub fn assemble(
    username: &str,
    names: &[String],
    slugs: &[String],
    ratings: &[u8],
    images: &[String],
) -> Vec<UserFilmRow> {
    let lengths = [names.len(), slugs.len(), ratings.len(), images.len()];
    if lengths.iter().any(|len| *len != lengths[0]) {
        warn!(
            "Unaligned lists (names {}, slugs {}, ratings {}, images {}), truncating",
            lengths[0], lengths[1], lengths[2], lengths[3]
        );
    }

    names
        .iter()
        .zip(slugs)
        .zip(ratings)
        .zip(images)
        .map(|(((name, slug), rating), image)| UserFilmRow {
            user_name: username.to_string(),
            film_id: slug.clone(),
            movie_name: name.clone(),
            rating: *rating,
            image: image.clone(),
        })
        .collect()
}

/// Poster URL for each slug, in slug order.
///
/// A film whose poster cannot be found gets the placeholder poster so the list
/// stays aligned with `slugs`.
#[instrument(skip(fetcher, config, slugs), fields(count = slugs.len()))]
pub async fn fetch_posters<F: Fetcher>(
    fetcher: &F,
    config: &ScraperConfig,
    slugs: &[String],
) -> Vec<String> {
    stream::iter(slugs)
        .map(|slug| async move {
            match fetch_structured_data(fetcher, config, slug).await {
                Ok(data) => data.image.unwrap_or_else(|| {
                    warn!("No image for {}, using placeholder", slug);
                    config.placeholder_poster.clone()
                }),
                Err(e) => {
                    warn!("Poster lookup failed for {}: {}", slug, e);
                    config.placeholder_poster.clone()
                }
            }
        })
        .buffered(config.concurrency)
        .collect()
        .await
}

/// Crawl a user's ratings and build their dataset
#[instrument(skip(fetcher, config))]
pub async fn scrape_user_dataset<F: Fetcher>(
    fetcher: &F,
    config: &ScraperConfig,
    username: &str,
) -> Result<UserDataset> {
    let username = username.trim();

    let rated = crawl(fetcher, config, username).await?;
    let (names, slugs) = filter_unrated(fetcher, config, username, rated.names, rated.slugs).await?;
    let images = fetch_posters(fetcher, config, &slugs).await;

    let rows = assemble(username, &names, &slugs, &rated.ratings, &images);
    info!("Dataset for {} has {} rows", username, rows.len());

    Ok(UserDataset {
        username: username.to_string(),
        scraped_at: Utc::now(),
        rows,
    })
}

/// Write rows as a pretty JSON array
pub fn write_json<W: Write>(writer: &mut W, rows: &[UserFilmRow]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, rows)?;
    writeln!(writer)?;
    Ok(())
}

/// Tab-separated writer. Fields holding a tab, quote or line break are quoted.
fn tsv_writer<W: Write>(writer: W, headers: bool) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(headers)
        .from_writer(writer)
}

/// Write rows as tab-separated values under the [`COLUMNS`] header line
pub fn write_tsv<W: Write>(writer: W, rows: &[UserFilmRow]) -> Result<()> {
    let mut tsv = tsv_writer(writer, false);
    tsv.write_record(COLUMNS)?;
    for row in rows {
        tsv.serialize(row)?;
    }
    tsv.flush()?;
    Ok(())
}

/// Write any records as tab-separated values, headed by their field names.
///
/// Nothing is written for an empty slice.
pub fn write_records_tsv<W: Write, R: Serialize>(writer: W, records: &[R]) -> Result<()> {
    let mut tsv = tsv_writer(writer, true);
    for record in records {
        tsv.serialize(record)?;
    }
    tsv.flush()?;
    Ok(())
}

/// Human-readable table of the rows
pub fn render_table(rows: &[UserFilmRow]) -> String {
    let name_width = rows
        .iter()
        .map(|r| r.movie_name.chars().count())
        .chain(std::iter::once(COLUMNS[2].len()))
        .max()
        .unwrap_or(0)
        .min(40);
    let slug_width = rows
        .iter()
        .map(|r| r.film_id.chars().count())
        .chain(std::iter::once(COLUMNS[1].len()))
        .max()
        .unwrap_or(0)
        .min(40);

    let mut out = format!(
        "{:>4} | {:<name_width$} | {:<slug_width$} | {:>6}\n",
        "#", COLUMNS[2], COLUMNS[1], COLUMNS[3]
    );
    out.push_str(&"-".repeat(name_width + slug_width + 19));
    out.push('\n');

    for (i, row) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{:>4} | {:<name_width$} | {:<slug_width$} | {:>6}\n",
            i + 1,
            truncate(&row.movie_name, name_width),
            truncate(&row.film_id, slug_width),
            row.rating
        ));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
