//! Single-bookmark upsert and the other in-place mutations.
//!
//! Every function here works on a collection handed in by the caller and
//! never touches storage. Order is storage order: updates replace a bookmark
//! at its index and never move it.
use chrono::{DateTime, Utc};

use crate::{
    canonicalize, dedup_tags, position_by_canonical_url, position_by_id, BmError, Bookmark,
    BookmarkPayload, Result, UpdateOutcome, UpsertOutcome,
};

/// Creates a bookmark for a new URL or updates the one already stored under it.
///
/// When the canonical URL matches an existing bookmark, every field present
/// in the payload replaces the stored one, `url` takes the incoming spelling,
/// `visit_count` goes up by one and `updated_at`/`last_visited` move to
/// `now`. The id and `created_at` never change.
///
/// # Errors
///
/// `BmError::MissingUrl` if the payload has no usable URL.
pub fn upsert_one(
    collection: &mut Vec<Bookmark>,
    payload: BookmarkPayload,
    now: DateTime<Utc>,
) -> Result<UpsertOutcome> {
    let url = payload.url().ok_or(BmError::MissingUrl)?.to_string();
    let canonical = canonicalize(&url);

    match position_by_canonical_url(collection, &canonical) {
        Some(index) => {
            let existing = &mut collection[index];
            overlay(existing, payload);
            existing.updated_at = now;
            existing.last_visited = now;
            existing.visit_count += 1;

            Ok(UpsertOutcome {
                bookmark: existing.clone(),
                was_duplicate: true,
            })
        }
        None => {
            let bookmark = Bookmark::from_payload(url, payload, now);
            collection.push(bookmark.clone());

            Ok(UpsertOutcome {
                bookmark,
                was_duplicate: false,
            })
        }
    }
}

/// Applies a payload to the bookmark with the given id.
///
/// If the payload changes the URL to one that already belongs to a different
/// bookmark, the collection is left untouched and the other bookmark is
/// reported back as a conflict. Visit data is not touched by an edit.
///
/// # Errors
///
/// `BmError::BookmarkNotFound` if no bookmark has this id.
pub fn update_by_id(
    collection: &mut [Bookmark],
    id: &str,
    payload: BookmarkPayload,
    now: DateTime<Utc>,
) -> Result<UpdateOutcome> {
    let index = position_by_id(collection, id).ok_or_else(|| BmError::BookmarkNotFound {
        id: id.to_string(),
    })?;

    if let Some(url) = payload.url() {
        let canonical = canonicalize(url);
        let clash = collection
            .iter()
            .enumerate()
            .find(|(i, other)| *i != index && other.canonical_url() == canonical);
        if let Some((_, other)) = clash {
            return Ok(UpdateOutcome::Conflict {
                conflicting: other.clone(),
            });
        }
    }

    let bookmark = &mut collection[index];
    overlay(bookmark, payload);
    bookmark.updated_at = now;

    Ok(UpdateOutcome::Updated {
        bookmark: bookmark.clone(),
    })
}

/// Removes the bookmark with the given id and returns it.
pub fn remove_by_id(collection: &mut Vec<Bookmark>, id: &str) -> Option<Bookmark> {
    position_by_id(collection, id).map(|index| collection.remove(index))
}

/// Removes the bookmark whose canonical URL matches `raw_url` and returns it.
pub fn remove_by_url(collection: &mut Vec<Bookmark>, raw_url: &str) -> Option<Bookmark> {
    let canonical = canonicalize(raw_url);
    position_by_canonical_url(collection, &canonical).map(|index| collection.remove(index))
}

/// Copies every present payload field onto the bookmark.
fn overlay(bookmark: &mut Bookmark, payload: BookmarkPayload) {
    let extra = payload.extra_fields();
    let url = payload.url().map(str::to_string);

    if let Some(url) = url {
        bookmark.url = url;
    }
    if let Some(title) = payload.title.filter(|t| !t.is_empty()) {
        bookmark.title = title;
    }
    if let Some(description) = payload.description {
        bookmark.description = description;
    }
    if let Some(category) = payload.category {
        bookmark.category = category;
    }
    if let Some(tags) = payload.tags {
        bookmark.tags = dedup_tags(tags);
    }
    if payload.source.is_some() {
        bookmark.source = payload.source;
    }
    if payload.favicon.is_some() {
        bookmark.favicon = payload.favicon;
    }
    if payload.chrome_bookmark_id.is_some() {
        bookmark.chrome_bookmark_id = payload.chrome_bookmark_id;
    }
    bookmark.extra.extend(extra);
}
