use std::{fs, path::Path};

use log::{debug, error, trace, warn};
use serde_json::Value;

use crate::{BmError, BookmarkPayload, Result};

// Helper method for parsing tags
pub fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Reads an import file: a JSON array of bookmark objects.
pub fn load_import_file(path: &Path) -> Result<Vec<BookmarkPayload>> {
    debug!("Loading import file: {}", path.display());
    if !path.exists() {
        return Err(BmError::InvalidFormat {
            message: format!("import file not found: {}", path.display()),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| {
        error!("Failed to open import file {}: {}", path.display(), e);
        BmError::Io(e)
    })?;

    parse_import(&content)
}

/// Parses import content, which must be a JSON array.
///
/// Elements are never rejected one by one: an element that is not an object,
/// or whose fields cannot be read, becomes an empty payload and is later
/// skipped as missing its URL.
pub fn parse_import(content: &str) -> Result<Vec<BookmarkPayload>> {
    let value: Value = serde_json::from_str(content)?;
    let Value::Array(items) = value else {
        return Err(BmError::InvalidFormat {
            message: "import must be a JSON array of bookmarks".to_string(),
        });
    };

    let payloads: Vec<BookmarkPayload> = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                warn!("Import item {} is not an object", index);
                return BookmarkPayload::default();
            }
            serde_json::from_value(item).unwrap_or_else(|e| {
                warn!("Import item {} could not be read: {}", index, e);
                BookmarkPayload::default()
            })
        })
        .collect();

    trace!("Parsed {} import items", payloads.len());
    Ok(payloads)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_tags() {
        assert_eq!(
            parse_tags(Some(" rust, ,cli ,".to_string())),
            vec!["rust", "cli"]
        );
        assert!(parse_tags(None).is_empty());
    }

    #[test]
    fn parses_import_array() {
        let payloads = parse_import(
            r#"[
                {"url": "https://a.com", "tags": ["x"], "lastModified": "2024-01-02T03:04:05Z"},
                {"title": "no url"}
            ]"#,
        )
        .unwrap();

        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].url.as_deref(), Some("https://a.com"));
        assert!(payloads[0].last_modified.is_some());
        assert!(payloads[1].url().is_none());
    }

    #[test]
    fn rejects_non_array() {
        assert!(matches!(
            parse_import(r#"{"url": "https://a.com"}"#),
            Err(BmError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn odd_items_do_not_sink_the_file() {
        let payloads = parse_import(
            r#"[
                {"url": "https://a.com"},
                {"url": "https://b.com", "lastModified": 1700000000000},
                {"url": "https://c.com", "lastModified": "2024-01-02"},
                {"url": 42, "title": "numeric url"},
                "https://d.com"
            ]"#,
        )
        .unwrap();

        assert_eq!(payloads.len(), 5);
        assert_eq!(payloads[0].url(), Some("https://a.com"));
        assert_eq!(
            payloads[1].last_modified.map(|at| at.timestamp_millis()),
            Some(1700000000000)
        );
        assert_eq!(
            payloads[2].last_modified.map(|at| at.to_rfc3339()),
            Some("2024-01-02T00:00:00+00:00".to_string())
        );
        assert!(payloads[3].url().is_none());
        assert_eq!(payloads[3].title.as_deref(), Some("numeric url"));
        assert_eq!(payloads[4], BookmarkPayload::default());
    }
}
