//! Small query helpers over `scraper` documents

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Error, Result};

/// Parse a CSS selector, mapping failures into the crate error
pub fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Selector(format!("'{}': {}", css, e)))
}

/// All `tag` elements having a class token (or class attribute) matching `class_re`
pub fn find_all_by_class<'a>(
    document: &'a Html,
    tag: &str,
    class_re: &Regex,
) -> Result<Vec<ElementRef<'a>>> {
    let selector = parse_selector(tag)?;

    Ok(document
        .select(&selector)
        .filter(|element| has_class_matching(element, class_re))
        .collect())
}

fn has_class_matching(element: &ElementRef<'_>, class_re: &Regex) -> bool {
    let value = element.value();
    value.classes().any(|class| class_re.is_match(class))
        || value.attr("class").is_some_and(|all| class_re.is_match(all))
}

/// First element matching `css` in the document
pub fn select_one<'a>(document: &'a Html, css: &str) -> Result<Option<ElementRef<'a>>> {
    let selector = parse_selector(css)?;
    Ok(document.select(&selector).next())
}

/// `content` attribute of the first `meta` element matching `css`, if non-empty
pub fn meta_content(document: &Html, css: &str) -> Result<Option<String>> {
    Ok(select_one(document, css)?
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty()))
}

/// First value of `attr` on `element` or any of its descendants
pub fn first_attr(element: &ElementRef<'_>, attr: &str) -> Option<String> {
    if let Some(value) = element.value().attr(attr) {
        return Some(value.to_string());
    }

    element
        .descendants()
        .filter_map(ElementRef::wrap)
        .find_map(|child| child.value().attr(attr).map(str::to_string))
}

/// Text content of an element with whitespace collapsed
pub fn text_of(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
