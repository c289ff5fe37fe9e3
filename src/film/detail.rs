//! Single-film detail lookup

use scraper::Html;
use tracing::{debug, info, instrument, warn};

use super::jsonld::{self, FilmJsonLd};
use super::reviews::extract_reviews;
use super::{Actor, DetailOutcome, FilmDetail, NOT_AVAILABLE, UNKNOWN_TITLE};
use crate::config::ScraperConfig;
use crate::dom;
use crate::error::{Error, Result};
use crate::http::Fetcher;

/// Fetch a film page and extract its detail.
///
/// # Errors
///
/// * `Error::NotFound` when the page does not return a success status
/// * `Error::MissingData` when the page has no JSON-LD block
/// * transport errors from the fetcher
///
/// A malformed JSON-LD block is not an error: the outcome is
/// [`DetailOutcome::DecodeFailed`] with a placeholder detail.
#[instrument(skip(fetcher, config))]
pub async fn extract_detail<F: Fetcher>(
    fetcher: &F,
    config: &ScraperConfig,
    slug: &str,
) -> Result<DetailOutcome> {
    let slug = slug.trim();
    let page = fetcher.fetch(&config.film_url(slug)).await?;

    if !page.is_success() {
        return Err(Error::NotFound {
            slug: slug.to_string(),
            status_code: page.status,
        });
    }
    debug!("Film page fetched for {}", slug);

    extract_detail_from_html(config, slug, &page.body)
}

/// Extract a film's detail from its page HTML
pub fn extract_detail_from_html(
    config: &ScraperConfig,
    slug: &str,
    html: &str,
) -> Result<DetailOutcome> {
    let document = Html::parse_document(html);

    let Some(raw) = jsonld::find_block(&document) else {
        warn!("Movie data not found on the page for {}", slug);
        return Err(Error::MissingData {
            slug: slug.to_string(),
        });
    };

    let reviews = extract_reviews(&document);
    let page_summary = html_summary(&document)?;

    match jsonld::decode_cdata_block(&raw) {
        Ok(data) => {
            info!("Movie data successfully parsed for {}", slug);
            let summary = page_summary
                .or_else(|| data.description.clone())
                .unwrap_or_default();

            let mut detail = build_detail(config, slug, data);
            detail.summary = summary;
            detail.reviews = reviews;
            Ok(DetailOutcome::Complete(detail))
        }
        Err(e) => {
            warn!("Error decoding movie data for {}: {}", slug, e);
            debug!("Invalid movie data: {}", raw);

            let mut placeholder = FilmDetail::placeholder(config, slug);
            placeholder.summary = page_summary.unwrap_or_default();
            placeholder.reviews = reviews;
            Ok(DetailOutcome::DecodeFailed {
                placeholder,
                reason: e.to_string(),
            })
        }
    }
}

/// Page description from the meta tags
fn html_summary(document: &Html) -> Result<Option<String>> {
    if let Some(summary) = dom::meta_content(document, r#"meta[property="og:description"]"#)? {
        return Ok(Some(summary));
    }
    dom::meta_content(document, r#"meta[name="description"]"#)
}

fn build_detail(config: &ScraperConfig, slug: &str, data: FilmJsonLd) -> FilmDetail {
    let actors = data
        .actor_names()
        .into_iter()
        .map(|name| Actor {
            wiki_url: config.actor_wiki_url(&name),
            name,
        })
        .collect();

    FilmDetail {
        slug: slug.to_string(),
        title: data.name.clone().unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        year: data.year().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        genres: data.genres(),
        director: data
            .director_name()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        rating: data.rating().unwrap_or(0.0),
        poster_url: data
            .image
            .clone()
            .unwrap_or_else(|| config.placeholder_poster.clone()),
        actors,
        summary: String::new(),
        reviews: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::film::PLACEHOLDER_GENRE;
    use crate::film::jsonld::fixtures::{DUNE_JSON, film_page, wrapped};
    use crate::http::testing::StaticFetcher;

    const OG_HEAD: &str =
        r#"<meta property="og:description" content="Paul Atreides travels to Arrakis.">"#;
    const REVIEW_BODY: &str = r#"<ul><li class="film-detail">
        <strong class="name">Ada</strong>
        <div class="collapsible-text"><p>Sand.</p></div>
        <p class="like-link-target" data-count="3"></p>
    </li></ul>"#;

    #[test]
    fn test_complete_detail() {
        let config = ScraperConfig::default();
        let html = film_page(Some(wrapped(DUNE_JSON).as_str()), OG_HEAD, REVIEW_BODY);

        let outcome = extract_detail_from_html(&config, "dune-2021", &html).unwrap();
        assert!(!outcome.is_degraded());

        let detail = outcome.into_detail();
        assert_eq!(detail.title, "Dune");
        assert_eq!(detail.year, "2021");
        assert_eq!(detail.director, "Denis Villeneuve");
        assert_eq!(detail.rating, 3.92);
        assert_eq!(detail.poster_url, "https://a.ltrbxd.com/resized/dune.jpg");
        assert_eq!(detail.genres, vec!["Science Fiction", "Adventure"]);
        assert_eq!(detail.summary, "Paul Atreides travels to Arrakis.");
        assert_eq!(
            detail.actors[1],
            Actor {
                name: "Rebecca Ferguson".to_string(),
                wiki_url: "https://en.wikipedia.org/wiki/Rebecca_Ferguson".to_string(),
            }
        );
        assert_eq!(detail.reviews.len(), 1);
        assert_eq!(detail.reviews[0].likes, "3");
    }

    #[test]
    fn test_absent_fields_get_defaults() {
        let config = ScraperConfig::default();
        let html = film_page(Some(wrapped(r#"{"@type": "Movie"}"#).as_str()), "", "");

        let detail = extract_detail_from_html(&config, "mystery", &html)
            .unwrap()
            .into_detail();
        assert_eq!(detail.title, UNKNOWN_TITLE);
        assert_eq!(detail.year, NOT_AVAILABLE);
        assert_eq!(detail.director, NOT_AVAILABLE);
        assert_eq!(detail.rating, 0.0);
        assert_eq!(detail.poster_url, config.placeholder_poster);
        assert!(detail.genres.is_empty());
        assert!(detail.actors.is_empty());
        assert_eq!(detail.summary, "");
    }

    #[test]
    fn test_empty_date_is_not_available() {
        let config = ScraperConfig::default();
        let html = film_page(Some(r#"{"datePublished": ""}"#), "", "");
        let detail = extract_detail_from_html(&config, "x", &html)
            .unwrap()
            .into_detail();
        assert_eq!(detail.year, NOT_AVAILABLE);
    }

    #[test]
    fn test_summary_falls_back_to_jsonld_description() {
        let config = ScraperConfig::default();
        let html = film_page(
            Some(r#"{"name": "Heat", "description": "Cops and robbers."}"#),
            "",
            "",
        );
        let detail = extract_detail_from_html(&config, "heat", &html)
            .unwrap()
            .into_detail();
        assert_eq!(detail.summary, "Cops and robbers.");
    }

    #[test]
    fn test_decode_failure_gives_placeholder() {
        let config = ScraperConfig::default();
        let html = film_page(Some(wrapped(r#"{"name": "Dune""#).as_str()), OG_HEAD, REVIEW_BODY);

        let outcome = extract_detail_from_html(&config, "dune-2021", &html).unwrap();
        assert!(outcome.is_degraded());

        let detail = outcome.detail();
        assert_eq!(detail.title, UNKNOWN_TITLE);
        assert_eq!(detail.year, NOT_AVAILABLE);
        assert_eq!(detail.genres, vec![PLACEHOLDER_GENRE]);
        assert_eq!(detail.rating, 0.0);
        assert_eq!(detail.poster_url, "https://via.placeholder.com/150");
        assert_eq!(detail.reviews.len(), 1);
    }

    #[test]
    fn test_image_object_is_not_degraded() {
        let config = ScraperConfig::default();
        let json = r#"{"name": "Dune", "datePublished": "2021",
            "image": {"@type": "ImageObject", "url": "https://img/dune.jpg"},
            "genre": ["Science Fiction", {"name": "Epic"}]}"#;
        let html = film_page(Some(wrapped(json).as_str()), "", "");

        let outcome = extract_detail_from_html(&config, "dune-2021", &html).unwrap();
        assert!(!outcome.is_degraded());

        let detail = outcome.into_detail();
        assert_eq!(detail.title, "Dune");
        assert_eq!(detail.poster_url, "https://img/dune.jpg");
        assert_eq!(detail.genres, vec!["Science Fiction"]);
    }

    #[test]
    fn test_missing_block_is_missing_data() {
        let config = ScraperConfig::default();
        let html = film_page(None, OG_HEAD, "");
        let err = extract_detail_from_html(&config, "dune-2021", &html).unwrap_err();
        assert!(matches!(err, Error::MissingData { slug } if slug == "dune-2021"));
    }

    #[tokio::test]
    async fn test_non_success_is_not_found() {
        let config = ScraperConfig::default();
        let fetcher = StaticFetcher::new();

        let err = extract_detail(&fetcher, &config, "no-such-film").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { status_code: 404, .. }));
    }

    #[tokio::test]
    async fn test_extract_detail_trims_slug() {
        let config = ScraperConfig::default();
        let fetcher = StaticFetcher::new().page(
            config.film_url("dune-2021"),
            film_page(Some(wrapped(DUNE_JSON).as_str()), "", ""),
        );

        let outcome = extract_detail(&fetcher, &config, "  dune-2021 ").await.unwrap();
        assert_eq!(outcome.detail().slug, "dune-2021");
        assert_eq!(outcome.detail().title, "Dune");
    }
}
