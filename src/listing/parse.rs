//! Extraction of film entries from a listing page

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};

use super::FilmEntry;
use crate::dom;
use crate::error::Result;

static POSTER_CONTAINER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"poster-container").unwrap());
static RATED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^rated-(\d+)$").unwrap());

/// Highest rating a film can carry, five stars in half-star steps
const MAX_RATING: u8 = 10;

/// The films found on one listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// One entry per matched poster container, in page order
    pub entries: Vec<FilmEntry>,
}

impl ListingPage {
    /// An empty page ends pagination
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    pub fn slugs(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.slug.clone()).collect()
    }

    /// Ratings of the rated entries only; unrated films contribute nothing
    pub fn ratings(&self) -> Vec<u8> {
        self.entries.iter().filter_map(|e| e.rating).collect()
    }
}

/// Parse every poster container on a listing page.
///
/// Containers lacking a name or a slug are skipped.
pub fn parse_listing(html: &str) -> Result<ListingPage> {
    let document = Html::parse_document(html);
    let containers = dom::find_all_by_class(&document, "li", &POSTER_CONTAINER_RE)?;

    let entries = containers.iter().filter_map(parse_entry).collect();

    Ok(ListingPage { entries })
}

fn parse_entry(container: &ElementRef<'_>) -> Option<FilmEntry> {
    let name = dom::first_attr(container, "alt")?;
    let slug = dom::first_attr(container, "data-film-slug")?;

    Some(FilmEntry {
        name,
        slug,
        rating: rating_of(container),
    })
}

/// The `rated-N` class token anywhere inside the container
fn rating_of(container: &ElementRef<'_>) -> Option<u8> {
    container
        .descendants()
        .filter_map(ElementRef::wrap)
        .flat_map(|element| element.value().classes())
        .find_map(|class| {
            RATED_RE
                .captures(class)
                .and_then(|caps| caps[1].parse::<u8>().ok())
        })
        .filter(|rating| *rating <= MAX_RATING)
}
