//! Core data structures for bookmarks.
//!
//! `Bookmark` is the stored record, `BookmarkPayload` is the loosely shaped
//! input coming from the command line, an import file or an HTTP handler.
use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::canonicalize;

/// Category assigned when none is given, and the target of a category delete.
pub const DEFAULT_CATEGORY: &str = "other";

/// Keys that are owned by the store and never copied from a payload's extras.
const RESERVED_KEYS: &[&str] = &[
    "id",
    "url",
    "title",
    "description",
    "category",
    "tags",
    "source",
    "favicon",
    "chromeBookmarkId",
    "createdAt",
    "updatedAt",
    "lastModified",
    "lastVisited",
    "visitCount",
    "canonicalUrl",
];

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Represents a single stored bookmark
///
/// Reading goes through [`BookmarkRecord`], so files written by older
/// servers (no `updatedAt`, timestamps as epoch milliseconds) still load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    /// Unique identifier, assigned at creation
    pub id: String,
    /// URL exactly as the user supplied it
    pub url: String,
    /// Display title
    pub title: String,
    pub description: String,
    pub category: String,
    /// Tags in display order, without duplicates
    pub tags: Vec<String>,
    /// Provenance, e.g. "manual" or "extension"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    /// Correlation id from a browser bookmark tree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_bookmark_id: Option<String>,
    /// When the bookmark was created
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    pub last_visited: DateTime<Utc>,
    pub visit_count: u64,
    /// Fields we do not model, kept as they arrived
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A stored bookmark as found on disk, before the timestamp fallbacks apply.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookmarkRecord {
    id: String,
    url: String,
    title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    category: Option<String>,
    #[serde(default, deserialize_with = "lenient_tags")]
    tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_string")]
    source: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    favicon: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    chrome_bookmark_id: Option<String>,
    #[serde(deserialize_with = "required_timestamp")]
    created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    last_modified: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    last_visited: Option<DateTime<Utc>>,
    #[serde(default)]
    visit_count: u64,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for Bookmark {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        BookmarkRecord::deserialize(deserializer).map(BookmarkRecord::into_bookmark)
    }
}

impl BookmarkRecord {
    /// `updated_at` falls back to `lastModified`, then `lastVisited`, then
    /// `createdAt`; `last_visited` falls back to `createdAt`.
    fn into_bookmark(self) -> Bookmark {
        let updated_at = self
            .updated_at
            .or(self.last_modified)
            .or(self.last_visited)
            .unwrap_or(self.created_at);

        Bookmark {
            id: self.id,
            url: self.url,
            title: self.title,
            description: self.description.unwrap_or_default(),
            category: self
                .category
                .filter(|c| !c.is_empty())
                .unwrap_or_else(default_category),
            tags: dedup_tags(self.tags.unwrap_or_default()),
            source: self.source,
            favicon: self.favicon,
            chrome_bookmark_id: self.chrome_bookmark_id,
            created_at: self.created_at,
            updated_at,
            last_visited: self.last_visited.unwrap_or(self.created_at),
            visit_count: self.visit_count,
            extra: self.extra,
        }
    }
}

/// Reads a timestamp the way a browser `Date` would: an RFC 3339 string, a
/// zoneless date-time or plain date (taken as UTC), or epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            DateTime::parse_from_rfc3339(text)
                .map(|at| at.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                        .ok()
                        .map(|at| at.and_utc())
                })
                .or_else(|| {
                    NaiveDate::parse_from_str(text, "%Y-%m-%d")
                        .ok()
                        .and_then(|day| day.and_hms_opt(0, 0, 0))
                        .map(|at| at.and_utc())
                })
        }
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|millis| millis as i64))
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_timestamp))
}

fn required_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_timestamp(&value)
        .ok_or_else(|| de::Error::custom(format!("unrecognized timestamp: {}", value)))
}

/// Strings pass through; any other JSON type reads as absent.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Ok(Some(text)),
        _ => Ok(None),
    }
}

/// An array keeps its string elements; anything else reads as absent.
fn lenient_tags<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(tag) => Some(tag),
                    _ => None,
                })
                .collect(),
        )),
        _ => Ok(None),
    }
}

impl Bookmark {
    /// Creates a new bookmark from a payload whose URL has already been validated.
    ///
    /// The id is a fresh UUID and every timestamp is set to `now`.
    pub fn from_payload(url: String, payload: BookmarkPayload, now: DateTime<Utc>) -> Self {
        let extra = payload.extra_fields();
        let title = payload
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| url.clone());

        Bookmark {
            id: Uuid::new_v4().to_string(),
            url,
            title,
            description: payload.description.unwrap_or_default(),
            category: payload
                .category
                .filter(|c| !c.is_empty())
                .unwrap_or_else(default_category),
            tags: dedup_tags(payload.tags.unwrap_or_default()),
            source: payload.source,
            favicon: payload.favicon,
            chrome_bookmark_id: payload.chrome_bookmark_id,
            created_at: now,
            updated_at: now,
            last_visited: now,
            visit_count: 1,
            extra,
        }
    }

    /// Returns the comparison key for this bookmark's URL.
    pub fn canonical_url(&self) -> String {
        canonicalize(&self.url)
    }
}

/// Incoming bookmark fields. Everything is optional; absent means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkPayload {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_tags",
        skip_serializing_if = "Option::is_none"
    )]
    pub tags: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub source: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub favicon: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub chrome_bookmark_id: Option<String>,
    /// Modification time reported by the source of an import
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_visited: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BookmarkPayload {
    /// Payload carrying only a URL.
    pub fn with_url(url: impl Into<String>) -> Self {
        BookmarkPayload {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// The URL if one is present and not blank.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// Extra fields with store-owned keys removed.
    pub fn extra_fields(&self) -> Map<String, Value> {
        self.extra
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

/// Removes repeated tags, keeping the first occurrence. Comparison is case-sensitive.
pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// Set union of two tag lists, existing tags first.
pub fn union_tags(existing: &[String], incoming: &[String]) -> Vec<String> {
    dedup_tags(existing.iter().chain(incoming.iter()).cloned().collect())
}
