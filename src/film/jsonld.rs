//! Decoding of the JSON-LD block embedded in film pages
//!
//! Film pages carry a `<script type="application/ld+json">` whose text is wrapped
//! in `/* <![CDATA[ */ ... /* ]]> */` comment markers. Two unwrapping variants
//! exist: [`decode_cdata_block`] strips the markers when present, while
//! [`decode_comment_split`] splits on the literal comment delimiters and fails
//! when they are missing.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};
use serde_json::Value;

use crate::error::{Error, Result};

static JSONLD_SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

const CDATA_OPEN: &str = "/* <![CDATA[ */";
const CDATA_CLOSE: &str = "/* ]]> */";

/// A person reference (director, actor)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Person {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
}

/// Ratings sometimes come through as strings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RatingValue {
    Number(f64),
    Text(String),
}

impl RatingValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RatingValue::Number(n) => Some(*n),
            RatingValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AggregateRating {
    #[serde(deserialize_with = "lenient")]
    pub rating_value: Option<RatingValue>,
}

/// The film fields we read from the JSON-LD block.
///
/// Every field is optional, and a field of an unexpected shape reads as
/// absent. List fields accept a single value and keep only the items of the
/// expected shape. Only malformed JSON fails the decode.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilmJsonLd {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub date_published: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub genre: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_list")]
    pub director: Option<Vec<Person>>,
    #[serde(alias = "actor", deserialize_with = "lenient_list")]
    pub actors: Option<Vec<Person>>,
    #[serde(deserialize_with = "lenient")]
    pub aggregate_rating: Option<AggregateRating>,
    /// Poster URL, given either as a string or as an `ImageObject`
    #[serde(deserialize_with = "image_url")]
    pub image: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
}

impl FilmJsonLd {
    /// Leading segment of the publication date, `None` when empty
    pub fn year(&self) -> Option<String> {
        self.date_published
            .as_deref()
            .and_then(|date| date.split('-').next())
            .map(str::trim)
            .filter(|year| !year.is_empty())
            .map(str::to_string)
    }

    /// First named director
    pub fn director_name(&self) -> Option<String> {
        self.director
            .as_ref()
            .and_then(|directors| directors.first())
            .and_then(|person| person.name.clone())
    }

    pub fn genres(&self) -> Vec<String> {
        self.genre.clone().unwrap_or_default()
    }

    /// Named actors in page order
    pub fn actor_names(&self) -> Vec<String> {
        self.actors
            .iter()
            .flatten()
            .filter_map(|person| person.name.clone())
            .collect()
    }

    pub fn rating(&self) -> Option<f64> {
        self.aggregate_rating
            .as_ref()
            .and_then(|rating| rating.rating_value.as_ref())
            .and_then(RatingValue::as_f64)
    }
}

fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(None),
        Value::Array(items) => items,
        single => vec![single],
    };

    Ok(Some(
        items
            .into_iter()
            .filter_map(|item| T::deserialize(item).ok())
            .collect(),
    ))
}

fn image_url<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(image_from(Value::deserialize(deserializer)?))
}

fn image_from(value: Value) -> Option<String> {
    match value {
        Value::String(url) => Some(url),
        Value::Object(mut object) => match object.remove("url") {
            Some(Value::String(url)) => Some(url),
            _ => None,
        },
        Value::Array(items) => items.into_iter().find_map(image_from),
        _ => None,
    }
}

/// Raw text of the JSON-LD script, if the page has one
pub fn find_block(document: &Html) -> Option<String> {
    document
        .select(&JSONLD_SCRIPT)
        .next()
        .map(|script| script.text().collect::<String>())
}

/// Same as [`find_block`] for an unparsed page
pub fn find_block_in(html: &str) -> Option<String> {
    find_block(&Html::parse_document(html))
}

/// Strip the CDATA markers when the block opens with them, then decode
pub fn decode_cdata_block(raw: &str) -> Result<FilmJsonLd> {
    let mut data = raw.trim();
    let stripped;
    if data.starts_with(CDATA_OPEN) {
        stripped = data.replace(CDATA_OPEN, "").replace(CDATA_CLOSE, "");
        data = stripped.trim();
    }

    decode(data)
}

/// Take the text between the first `" */"` and `"/* ]]>"`, then decode
pub fn decode_comment_split(raw: &str) -> Result<FilmJsonLd> {
    let inner = raw
        .split(" */")
        .nth(1)
        .ok_or_else(|| Error::Decode("structured data has no comment delimiter".to_string()))?;
    let body = inner.split("/* ]]>").next().unwrap_or(inner);

    decode(body)
}

fn decode(data: &str) -> Result<FilmJsonLd> {
    serde_json::from_str(data).map_err(|e| Error::Decode(e.to_string()))
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Wrap a JSON body the way film pages do
    pub fn wrapped(json: &str) -> String {
        format!("\n/* <![CDATA[ */\n{}\n/* ]]> */\n", json)
    }

    /// A film page with the given JSON-LD text (unwrapped) and extra body HTML
    pub fn film_page(script: Option<&str>, head: &str, body: &str) -> String {
        let script = script
            .map(|s| format!(r#"<script type="application/ld+json">{}</script>"#, s))
            .unwrap_or_default();
        format!(
            "<html><head>{}{}</head><body>{}</body></html>",
            head, script, body
        )
    }

    pub const DUNE_JSON: &str = r#"{
        "@context": "http://schema.org",
        "@type": "Movie",
        "name": "Dune",
        "datePublished": "2021-09-15",
        "genre": ["Science Fiction", "Adventure"],
        "director": [{"@type": "Person", "name": "Denis Villeneuve"}],
        "actors": [
            {"@type": "Person", "name": "Timothée Chalamet"},
            {"@type": "Person", "name": "Rebecca Ferguson"}
        ],
        "aggregateRating": {"@type": "AggregateRating", "ratingValue": 3.92},
        "image": "https://a.ltrbxd.com/resized/dune.jpg"
    }"#;
}
