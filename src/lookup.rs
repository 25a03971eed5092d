//! Lookups over a bookmark collection.
//!
//! Collections are small personal sets, so every lookup is a linear scan
//! that recomputes the canonical form of each stored URL.
use std::collections::HashMap;

use crate::{canonicalize, Bookmark};

/// Index of the first bookmark whose canonical URL equals `canonical`.
pub fn position_by_canonical_url(collection: &[Bookmark], canonical: &str) -> Option<usize> {
    collection
        .iter()
        .position(|bookmark| bookmark.canonical_url() == canonical)
}

/// First bookmark whose canonical URL equals `canonical`.
pub fn find_by_canonical_url<'a>(collection: &'a [Bookmark], canonical: &str) -> Option<&'a Bookmark> {
    position_by_canonical_url(collection, canonical).map(|index| &collection[index])
}

/// Canonicalizes `raw_url` and looks it up.
pub fn find_by_url<'a>(collection: &'a [Bookmark], raw_url: &str) -> Option<&'a Bookmark> {
    find_by_canonical_url(collection, &canonicalize(raw_url))
}

/// Lookup by browser correlation id. Exact match, no normalization.
pub fn find_by_external_id<'a>(collection: &'a [Bookmark], chrome_bookmark_id: &str) -> Option<&'a Bookmark> {
    collection
        .iter()
        .find(|bookmark| bookmark.chrome_bookmark_id.as_deref() == Some(chrome_bookmark_id))
}

pub fn position_by_id(collection: &[Bookmark], id: &str) -> Option<usize> {
    collection.iter().position(|bookmark| bookmark.id == id)
}

pub fn find_by_id<'a>(collection: &'a [Bookmark], id: &str) -> Option<&'a Bookmark> {
    collection.iter().find(|bookmark| bookmark.id == id)
}

/// Canonical URLs shared by more than one bookmark, with the ids involved.
///
/// A well-formed collection returns nothing; files written by older tools
/// may not be.
pub fn duplicate_groups(collection: &[Bookmark]) -> Vec<(String, Vec<String>)> {
    let mut order = Vec::new();
    let mut groups: HashMap<String, Vec<String>> = HashMap::new();

    for bookmark in collection {
        let key = bookmark.canonical_url();
        let ids = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            Vec::new()
        });
        ids.push(bookmark.id.clone());
    }

    order
        .into_iter()
        .filter_map(|key| {
            let ids = groups.remove(&key)?;
            (ids.len() > 1).then_some((key, ids))
        })
        .collect()
}
