//! Filtering bookmarks for display.
use crate::Bookmark;

/// Category value that matches every bookmark.
pub const ALL_CATEGORIES: &str = "all";

/// Options for [`search`]
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Exact category to keep; `None` or `"all"` keeps everything
    pub category: Option<String>,
    /// Case-insensitive text matched against title, description, URL and tags
    pub query: Option<String>,
    /// Maximum number of results
    pub limit: Option<usize>,
}

impl SearchFilter {
    fn matches(&self, bookmark: &Bookmark, needle: Option<&str>) -> bool {
        if let Some(category) = self.category.as_deref() {
            if category != ALL_CATEGORIES && bookmark.category != category {
                return false;
            }
        }

        match needle {
            Some(needle) => {
                bookmark.title.to_lowercase().contains(needle)
                    || bookmark.description.to_lowercase().contains(needle)
                    || bookmark.url.to_lowercase().contains(needle)
                    || bookmark
                        .tags
                        .iter()
                        .any(|tag| tag.to_lowercase().contains(needle))
            }
            None => true,
        }
    }
}

/// Bookmarks matching the filter, newest first.
pub fn search(collection: &[Bookmark], filter: &SearchFilter) -> Vec<Bookmark> {
    let needle = filter
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    let mut results: Vec<Bookmark> = collection
        .iter()
        .filter(|bookmark| filter.matches(bookmark, needle.as_deref()))
        .cloned()
        .collect();

    results.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    if let Some(limit) = filter.limit {
        results.truncate(limit);
    }
    results
}
