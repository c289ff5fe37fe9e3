//! Removal of unrated films from the rated set

use std::collections::HashSet;

use tracing::{debug, info, instrument};

use super::UnratedFilmEntry;
use super::parse::parse_listing;
use crate::config::ScraperConfig;
use crate::error::{Error, Result};
use crate::http::Fetcher;

/// Name/slug pairs from a "rated: none" listing page
pub fn parse_unrated(html: &str) -> Result<Vec<UnratedFilmEntry>> {
    Ok(parse_listing(html)?
        .entries
        .into_iter()
        .map(|entry| UnratedFilmEntry {
            name: entry.name,
            slug: entry.slug,
        })
        .collect())
}

/// Fetch the user's "rated: none" listing once and drop those films.
///
/// Names are filtered against unrated names and slugs against unrated slugs,
/// each list on its own. Two different films sharing a display name can
/// therefore leave `names` and `slugs` with different lengths.
#[instrument(skip(fetcher, config, names, slugs))]
pub async fn filter_unrated<F: Fetcher>(
    fetcher: &F,
    config: &ScraperConfig,
    username: &str,
    names: Vec<String>,
    slugs: Vec<String>,
) -> Result<(Vec<String>, Vec<String>)> {
    let url = config.unrated_url(username);
    let page = fetcher.fetch(&url).await?;
    if !page.is_success() {
        return Err(Error::Status {
            status_code: page.status,
            url,
        });
    }

    let unrated = parse_unrated(&page.body)?;
    debug!("{} films on the unrated listing", unrated.len());

    let (names, slugs) = remove_unrated(&unrated, names, slugs);
    info!("{} names and {} slugs left after removing unrated films", names.len(), slugs.len());

    Ok((names, slugs))
}

/// Drop unrated names from `names` and unrated slugs from `slugs`
pub fn remove_unrated(
    unrated: &[UnratedFilmEntry],
    names: Vec<String>,
    slugs: Vec<String>,
) -> (Vec<String>, Vec<String>) {
    let unrated_names: HashSet<&str> = unrated.iter().map(|e| e.name.as_str()).collect();
    let unrated_slugs: HashSet<&str> = unrated.iter().map(|e| e.slug.as_str()).collect();

    let names = names
        .into_iter()
        .filter(|name| !unrated_names.contains(name.as_str()))
        .collect();
    let slugs = slugs
        .into_iter()
        .filter(|slug| !unrated_slugs.contains(slug.as_str()))
        .collect();

    (names, slugs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::StaticFetcher;
    use crate::listing::parse::fixtures::listing_html;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn unrated(name: &str, slug: &str) -> UnratedFilmEntry {
        UnratedFilmEntry {
            name: name.to_string(),
            slug: slug.to_string(),
        }
    }

    #[test]
    fn test_disjoint_sets_are_noop() {
        let names = strings(&["Dune", "Heat"]);
        let slugs = strings(&["dune-2021", "heat"]);
        let (n, s) = remove_unrated(&[unrated("Cats", "cats-2019")], names.clone(), slugs.clone());
        assert_eq!(n, names);
        assert_eq!(s, slugs);
    }

    #[test]
    fn test_removes_matches() {
        let (n, s) = remove_unrated(
            &[unrated("Cats", "cats-2019")],
            strings(&["Dune", "Cats"]),
            strings(&["dune-2021", "cats-2019"]),
        );
        assert_eq!(n, strings(&["Dune"]));
        assert_eq!(s, strings(&["dune-2021"]));
    }

    #[test]
    fn test_shared_name_diverges_lists() {
        // Two films called "Solaris"; only the 2002 one is unrated.
        let (n, s) = remove_unrated(
            &[unrated("Solaris", "solaris-2002")],
            strings(&["Solaris", "Solaris"]),
            strings(&["solaris", "solaris-2002"]),
        );
        assert!(n.is_empty());
        assert_eq!(s, strings(&["solaris"]));
    }

    #[tokio::test]
    async fn test_filter_unrated_fetches_once() {
        let config = ScraperConfig::default();
        let fetcher = StaticFetcher::new().page(
            config.unrated_url("alice"),
            listing_html(&[("Cats", "cats-2019", None)]),
        );

        let (names, slugs) = filter_unrated(
            &fetcher,
            &config,
            "alice",
            strings(&["Dune", "Cats"]),
            strings(&["dune-2021", "cats-2019"]),
        )
        .await
        .unwrap();

        assert_eq!(names, strings(&["Dune"]));
        assert_eq!(slugs, strings(&["dune-2021"]));
        assert_eq!(fetcher.requests(), vec![config.unrated_url("alice")]);
    }

    #[tokio::test]
    async fn test_filter_unrated_status_error() {
        let config = ScraperConfig::default();
        let fetcher = StaticFetcher::new().status(config.unrated_url("alice"), 503);
        let result = filter_unrated(&fetcher, &config, "alice", vec![], vec![]).await;
        assert!(matches!(result, Err(Error::Status { status_code: 503, .. })));
    }
}
