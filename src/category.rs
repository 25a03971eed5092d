//! Category bulk operations.
//!
//! Categories are not stored on their own; they are the distinct values
//! currently found on bookmarks.
use std::collections::BTreeMap;

use crate::{Bookmark, CategoryCount, DEFAULT_CATEGORY};

/// Rewrites `old` to `new` on every bookmark that has exactly `old`.
///
/// Returns how many bookmarks changed. Zero is not an error.
pub fn rename_category(collection: &mut [Bookmark], old: &str, new: &str) -> usize {
    let mut changed = 0;
    for bookmark in collection.iter_mut().filter(|b| b.category == old) {
        bookmark.category = new.to_string();
        changed += 1;
    }
    changed
}

/// Deletes a category by moving its bookmarks to the default category.
pub fn clear_category(collection: &mut [Bookmark], name: &str) -> usize {
    rename_category(collection, name, DEFAULT_CATEGORY)
}

/// Distinct categories with their bookmark counts, sorted by name.
pub fn list_categories(collection: &[Bookmark]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for bookmark in collection {
        *counts.entry(bookmark.category.as_str()).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(name, count)| CategoryCount {
            name: name.to_string(),
            count,
        })
        .collect()
}
