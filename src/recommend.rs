//! Recommendation feed built from film JSON-LD blocks
//!
//! Each slug is looked up on its own. A film whose page cannot be fetched,
//! has no JSON-LD block, or fails to decode is logged and left out; a film
//! without an aggregate rating stays in with an empty rating.

use futures::stream::{self, StreamExt};
use serde::{Serialize, Serializer};
use tracing::{info, instrument, warn};

use crate::config::ScraperConfig;
use crate::error::{Error, Result};
use crate::film::FilmJsonLd;
use crate::film::jsonld;
use crate::http::Fetcher;

/// One film in the recommendation feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationEntry {
    pub title: String,
    pub movie_id: String,
    pub image: String,
    /// Site average rating; serialized as `""` when the film has none
    #[serde(serialize_with = "rating_or_empty")]
    pub rating: Option<f64>,
}

fn rating_or_empty<S: Serializer>(
    rating: &Option<f64>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match rating {
        Some(value) => serializer.serialize_f64(*value),
        None => serializer.serialize_str(""),
    }
}

/// Fetch a film page and decode its JSON-LD block with the comment-split variant
pub async fn fetch_structured_data<F: Fetcher>(
    fetcher: &F,
    config: &ScraperConfig,
    slug: &str,
) -> Result<FilmJsonLd> {
    let slug = slug.trim();
    let page = fetcher.fetch(&config.film_url(slug)).await?;
    if !page.is_success() {
        return Err(Error::NotFound {
            slug: slug.to_string(),
            status_code: page.status,
        });
    }

    let raw = jsonld::find_block_in(&page.body).ok_or_else(|| Error::MissingData {
        slug: slug.to_string(),
    })?;

    jsonld::decode_comment_split(&raw)
}

/// Build a recommendation feed for `slugs`, in input order.
///
/// Up to `config.concurrency` film pages are fetched at once. Per-film
/// failures never abort the batch.
#[instrument(skip(fetcher, config, slugs), fields(count = slugs.len()))]
pub async fn aggregate<F: Fetcher>(
    fetcher: &F,
    config: &ScraperConfig,
    slugs: &[String],
) -> Vec<RecommendationEntry> {
    let results: Vec<Option<RecommendationEntry>> = stream::iter(slugs)
        .map(|slug| recommendation_for(fetcher, config, slug))
        .buffered(config.concurrency)
        .collect()
        .await;

    let entries: Vec<RecommendationEntry> = results.into_iter().flatten().collect();
    info!("Built {} recommendations from {} films", entries.len(), slugs.len());
    entries
}

async fn recommendation_for<F: Fetcher>(
    fetcher: &F,
    config: &ScraperConfig,
    slug: &str,
) -> Option<RecommendationEntry> {
    let data = match fetch_structured_data(fetcher, config, slug).await {
        Ok(data) => data,
        Err(e) => {
            warn!("Skipping {}: {}", slug, e);
            return None;
        }
    };

    let Some(title) = data.name.clone() else {
        warn!("Skipping {}: structured data has no name", slug);
        return None;
    };
    let Some(image) = data.image.clone() else {
        warn!("Skipping {}: structured data has no image", slug);
        return None;
    };

    let rating = data.rating();
    if rating.is_none() {
        warn!("No rating for {}", slug);
    }

    Some(RecommendationEntry {
        title,
        movie_id: slug.trim().to_string(),
        image,
        rating,
    })
}
