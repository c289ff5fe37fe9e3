//! Review extraction from a film page

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::ReviewRecord;
use crate::dom;

static REVIEW_ITEM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li.film-detail").unwrap());
static REVIEWER: LazyLock<Selector> = LazyLock::new(|| Selector::parse("strong.name").unwrap());
static SPOILER_BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".hidden-spoilers.expanded-text").unwrap());
static COLLAPSIBLE_BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".collapsible-text").unwrap());
static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static LIKE_TARGET: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".like-link-target").unwrap());

pub const UNKNOWN_REVIEWER: &str = "Unknown";
pub const NO_CONTENT: &str = "No content available";
pub const NO_LIKES: &str = "0";

/// Extract every review on the page. Never fails; missing parts get defaults.
pub fn extract_reviews(document: &Html) -> Vec<ReviewRecord> {
    document.select(&REVIEW_ITEM).map(|item| parse_review(&item)).collect()
}

fn parse_review(item: &ElementRef<'_>) -> ReviewRecord {
    let reviewer = item
        .select(&REVIEWER)
        .next()
        .map(|node| dom::text_of(&node))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_REVIEWER.to_string());

    // Spoiler body first, then the regular one.
    let content = [&*SPOILER_BODY, &*COLLAPSIBLE_BODY]
        .into_iter()
        .filter_map(|selector| item.select(selector).next())
        .map(|container| paragraphs_text(&container))
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| NO_CONTENT.to_string());

    // Kept as text; the count is not always numeric on the site.
    let likes = item
        .select(&LIKE_TARGET)
        .next()
        .and_then(|node| node.value().attr("data-count"))
        .map(|count| count.trim().to_string())
        .filter(|count| !count.is_empty())
        .unwrap_or_else(|| NO_LIKES.to_string());

    ReviewRecord {
        reviewer,
        content,
        likes,
    }
}

/// Space-joined text of every paragraph in the container
fn paragraphs_text(container: &ElementRef<'_>) -> String {
    container
        .select(&PARAGRAPH)
        .map(|p| dom::text_of(&p))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
