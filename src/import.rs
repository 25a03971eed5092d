//! Bulk import merge policy.
//!
//! Items are applied strictly in order, so a later item sees the bookmark an
//! earlier item in the same batch created or changed.
use chrono::{DateTime, Utc};

use crate::{
    canonicalize, position_by_canonical_url, union_tags, Bookmark, BookmarkPayload,
    ImportSummary, SkipReason, SkippedItem, DEFAULT_CATEGORY,
};

/// Merges a batch of incoming bookmarks into the collection.
///
/// * items without a URL are skipped with [`SkipReason::MissingUrl`];
/// * an item matching a bookmark that is at least as fresh and already has
///   tags and a description is skipped with [`SkipReason::ExistingIsNewer`];
/// * any other match is merged field by field (see [`merge_import`]);
/// * everything else becomes a new bookmark.
///
/// The whole resulting collection is what callers should persist.
pub fn upsert_batch(
    collection: &mut Vec<Bookmark>,
    payloads: Vec<BookmarkPayload>,
    now: DateTime<Utc>,
) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for payload in payloads {
        let Some(url) = payload.url().map(str::to_string) else {
            summary.skipped.push(SkippedItem {
                payload,
                reason: SkipReason::MissingUrl,
            });
            continue;
        };

        let canonical = canonicalize(&url);
        match position_by_canonical_url(collection, &canonical) {
            Some(index) => {
                let existing = &mut collection[index];
                if existing_is_newer(existing, &payload, now) {
                    summary.skipped.push(SkippedItem {
                        payload,
                        reason: SkipReason::ExistingIsNewer,
                    });
                    continue;
                }
                merge_import(existing, payload, now);
                summary.updated.push(existing.clone());
            }
            None => {
                let bookmark = Bookmark::from_payload(url, payload, now);
                collection.push(bookmark.clone());
                summary.added.push(bookmark);
            }
        }
    }

    summary
}

/// True when the stored bookmark should not be overwritten by this item.
///
/// The item's timestamp is its `last_modified`, then `last_visited`, then
/// `now`. The stored side is `updated_at`, which for records written without
/// one was filled from `lastModified`, `lastVisited` or `createdAt` on load.
/// Only a bookmark that already carries tags and a description is
/// protected; a sparse one always takes the import.
pub fn existing_is_newer(existing: &Bookmark, incoming: &BookmarkPayload, now: DateTime<Utc>) -> bool {
    let incoming_at = incoming
        .last_modified
        .or(incoming.last_visited)
        .unwrap_or(now);

    existing.updated_at >= incoming_at
        && !existing.tags.is_empty()
        && !existing.description.is_empty()
}

/// Merges an import item into an existing bookmark.
///
/// Title, description and favicon are replaced only by non-empty values,
/// tags are unioned, and a specific category beats the generic default.
pub fn merge_import(existing: &mut Bookmark, incoming: BookmarkPayload, now: DateTime<Utc>) {
    if let Some(title) = incoming.title.filter(|t| !t.is_empty()) {
        existing.title = title;
    }
    if let Some(description) = incoming.description.filter(|d| !d.is_empty()) {
        existing.description = description;
    }
    if let Some(tags) = incoming.tags {
        existing.tags = union_tags(&existing.tags, &tags);
    }
    if existing.category == DEFAULT_CATEGORY {
        existing.category = incoming
            .category
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    }
    if let Some(favicon) = incoming.favicon.filter(|f| !f.is_empty()) {
        existing.favicon = Some(favicon);
    }

    existing.last_visited = now;
    existing.updated_at = now;
    existing.visit_count += 1;
}
