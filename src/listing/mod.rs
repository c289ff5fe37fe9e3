//! User film listings
//!
//! This module walks a user's paginated films listing to build the rated set,
//! and removes the films that show up on the user's "rated: none" listing.

mod crawler;
pub(crate) mod parse;
mod unrated;

pub use crawler::crawl;
pub use parse::{ListingPage, parse_listing};
pub use unrated::{filter_unrated, parse_unrated, remove_unrated};

use serde::{Deserialize, Serialize};

/// A film as it appears on a listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilmEntry {
    /// Display name (not unique)
    pub name: String,

    /// Site identifier, unique per film
    pub slug: String,

    /// Rating in half-stars (0-10), absent when unrated
    pub rating: Option<u8>,
}

/// A film from the "rated: none" listing, used only as a removal filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnratedFilmEntry {
    /// Display name
    pub name: String,

    /// Site identifier
    pub slug: String,
}

/// The rated set as three parallel lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatedFilms {
    /// Film display names
    pub names: Vec<String>,

    /// Film slugs
    pub slugs: Vec<String>,

    /// Ratings in half-stars
    pub ratings: Vec<u8>,

    /// Listing pages requested, including the terminating empty page
    pub pages_fetched: u32,
}

impl RatedFilms {
    /// Whether names, slugs and ratings line up index by index
    pub fn is_aligned(&self) -> bool {
        self.names.len() == self.slugs.len() && self.slugs.len() == self.ratings.len()
    }

    /// Number of films, counted on the slug list
    pub fn len(&self) -> usize {
        self.slugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }

    /// Zip the lists back into entries, truncating to the shortest list
    pub fn entries(&self) -> Vec<FilmEntry> {
        self.names
            .iter()
            .zip(&self.slugs)
            .zip(&self.ratings)
            .map(|((name, slug), rating)| FilmEntry {
                name: name.clone(),
                slug: slug.clone(),
                rating: Some(*rating),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_zip() {
        let films = RatedFilms {
            names: vec!["Dune".into(), "Heat".into()],
            slugs: vec!["dune-2021".into(), "heat".into()],
            ratings: vec![8, 9],
            pages_fetched: 2,
        };

        assert!(films.is_aligned());
        assert_eq!(films.len(), 2);
        assert_eq!(
            films.entries()[1],
            FilmEntry {
                name: "Heat".into(),
                slug: "heat".into(),
                rating: Some(9),
            }
        );
    }

    #[test]
    fn test_misaligned() {
        let films = RatedFilms {
            names: vec!["Dune".into(), "Cats".into()],
            slugs: vec!["dune-2021".into()],
            ratings: vec![8],
            pages_fetched: 2,
        };
        assert!(!films.is_aligned());
        assert_eq!(films.entries().len(), 1);
    }
}
