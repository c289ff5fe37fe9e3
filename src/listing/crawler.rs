//! Pagination over a user's films listing

use tracing::{debug, info, instrument, warn};

use super::RatedFilms;
use super::parse::parse_listing;
use crate::config::{Pagination, ScraperConfig};
use crate::error::{Error, Result};
use crate::http::Fetcher;

/// Crawl a user's films listing page by page until the first empty page.
///
/// With [`Pagination::LastPage`] each non-empty page replaces the lists gathered
/// so far, so the result holds the last non-empty page only. Every page is
/// still requested until the empty one. [`Pagination::Accumulate`] appends
/// instead.
///
/// A non-success status on the first page is an error. On later pages it ends
/// pagination the same way an empty page does.
#[instrument(skip(fetcher, config))]
pub async fn crawl<F: Fetcher>(
    fetcher: &F,
    config: &ScraperConfig,
    username: &str,
) -> Result<RatedFilms> {
    info!("Crawling films listing for {}", username.trim());

    let mut films = RatedFilms::default();
    let mut page_number: u32 = 1;

    loop {
        if config.max_pages.is_some_and(|max| page_number > max) {
            info!("Stopping at page cap of {:?}", config.max_pages);
            break;
        }

        let url = config.listing_url(username, page_number);
        let page = fetcher.fetch(&url).await?;
        films.pages_fetched += 1;

        if !page.is_success() {
            if page_number == 1 {
                return Err(Error::Status {
                    status_code: page.status,
                    url,
                });
            }
            warn!(
                "Listing page {} returned status {}, treating as end of listing",
                page_number, page.status
            );
            break;
        }

        let listing = parse_listing(&page.body)?;
        if listing.is_empty() {
            debug!("Page {} is empty, done", page_number);
            break;
        }

        debug!(
            "Page {}: {} films, {} rated",
            page_number,
            listing.entries.len(),
            listing.ratings().len()
        );

        match config.pagination {
            Pagination::LastPage => {
                films.names = listing.names();
                films.slugs = listing.slugs();
                films.ratings = listing.ratings();
            }
            Pagination::Accumulate => {
                films.names.extend(listing.names());
                films.slugs.extend(listing.slugs());
                films.ratings.extend(listing.ratings());
            }
        }

        page_number += 1;
    }

    info!(
        "Listing crawl finished after {} pages with {} films",
        films.pages_fetched,
        films.slugs.len()
    );
    Ok(films)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::StaticFetcher;
    use crate::listing::parse::fixtures::listing_html;

    fn config() -> ScraperConfig {
        ScraperConfig::default()
    }

    fn three_page_fetcher() -> StaticFetcher {
        let config = config();
        StaticFetcher::new()
            .page(
                config.listing_url("bob", 1),
                listing_html(&[("Dune", "dune-2021", Some(8)), ("Heat", "heat", Some(9))]),
            )
            .page(
                config.listing_url("bob", 2),
                listing_html(&[("Alien", "alien", Some(10))]),
            )
            .page(config.listing_url("bob", 3), listing_html(&[]))
    }

    #[tokio::test]
    async fn test_last_page_overwrites() {
        let fetcher = three_page_fetcher();
        let films = crawl(&fetcher, &config(), "bob").await.unwrap();

        assert_eq!(films.names, vec!["Alien"]);
        assert_eq!(films.slugs, vec!["alien"]);
        assert_eq!(films.ratings, vec![10]);
        assert_eq!(films.pages_fetched, 3);
    }

    #[tokio::test]
    async fn test_page_count_is_one_plus_non_empty_pages() {
        let fetcher = three_page_fetcher();
        crawl(&fetcher, &config(), "bob").await.unwrap();

        let config = config();
        assert_eq!(
            fetcher.requests(),
            vec![
                config.listing_url("bob", 1),
                config.listing_url("bob", 2),
                config.listing_url("bob", 3),
            ]
        );
    }

    #[tokio::test]
    async fn test_accumulate_appends() {
        let fetcher = three_page_fetcher();
        let config = ScraperConfig::builder()
            .pagination(Pagination::Accumulate)
            .build()
            .unwrap();

        let films = crawl(&fetcher, &config, "bob").await.unwrap();
        assert_eq!(films.slugs, vec!["dune-2021", "heat", "alien"]);
        assert_eq!(films.ratings, vec![8, 9, 10]);
    }

    #[tokio::test]
    async fn test_max_pages_cap() {
        let fetcher = three_page_fetcher();
        let config = ScraperConfig::builder().max_pages(Some(1)).build().unwrap();

        let films = crawl(&fetcher, &config, "bob").await.unwrap();
        assert_eq!(films.slugs, vec!["dune-2021", "heat"]);
        assert_eq!(films.pages_fetched, 1);
    }

    #[tokio::test]
    async fn test_first_page_failure_is_error() {
        let fetcher = StaticFetcher::new().status(config().listing_url("ghost", 1), 404);
        let err = crawl(&fetcher, &config(), "ghost").await.unwrap_err();
        assert!(matches!(err, Error::Status { status_code: 404, .. }));
    }

    #[tokio::test]
    async fn test_later_page_failure_ends_listing() {
        let config = config();
        let fetcher = StaticFetcher::new()
            .page(
                config.listing_url("bob", 1),
                listing_html(&[("Dune", "dune-2021", Some(8))]),
            )
            .status(config.listing_url("bob", 2), 500);

        let films = crawl(&fetcher, &config, "bob").await.unwrap();
        assert_eq!(films.slugs, vec!["dune-2021"]);
        assert_eq!(films.pages_fetched, 2);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let config = config();
        let fetcher = StaticFetcher::new().failing(config.listing_url("bob", 1));
        let err = crawl(&fetcher, &config, "bob").await.unwrap_err();
        assert!(err.is_transport());
    }
}
