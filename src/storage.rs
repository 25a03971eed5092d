use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::Utc;
use log::{debug, error, info, trace, warn};
use tempfile::NamedTempFile;

use crate::{
    clear_category, duplicate_groups, find_by_external_id, find_by_id, find_by_url,
    list_categories, remove_by_id, remove_by_url, rename_category, search, update_by_id,
    upsert_batch, upsert_one, BmError, Bookmark, BookmarkPayload, CategoryCount, Config,
    DuplicateCheck, ImportSummary, Result, SearchFilter, UpdateOutcome, UpsertOutcome,
};

/// Loads and saves a whole bookmark collection at once.
///
/// `save` must replace the stored collection as a unit: a reader never sees
/// a half-written collection.
pub trait Persistence {
    fn load(&self) -> Result<Vec<Bookmark>>;
    fn save(&self, bookmarks: &[Bookmark]) -> Result<()>;
}

/// Stores the collection as a pretty-printed JSON array in a single file.
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location taken from the configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.data_file_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for JsonFilePersistence {
    /// Reads the collection. A missing file is created holding an empty array.
    fn load(&self) -> Result<Vec<Bookmark>> {
        debug!("Loading bookmarks from file: {}", self.path.display());

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "Bookmark file does not exist, creating: {}",
                    self.path.display()
                );
                self.save(&[])?;
                return Ok(Vec::new());
            }
            Err(e) => {
                error!("Failed to open bookmark file {}: {}", self.path.display(), e);
                return Err(BmError::Io(e));
            }
        };

        if content.trim().is_empty() {
            debug!("Bookmark file is empty");
            return Ok(Vec::new());
        }

        let bookmarks: Vec<Bookmark> = serde_json::from_str(&content).map_err(|e| {
            error!("Failed to parse bookmark file {}: {}", self.path.display(), e);
            BmError::InvalidFormat {
                message: format!("{}: {}", self.path.display(), e),
            }
        })?;

        trace!("Successfully loaded {} bookmarks", bookmarks.len());
        Ok(bookmarks)
    }

    /// Writes the collection using atomic operations to prevent data corruption
    fn save(&self, bookmarks: &[Bookmark]) -> Result<()> {
        debug!(
            "Saving {} bookmarks to {}",
            bookmarks.len(),
            self.path.display()
        );

        // Ensure the parent directory exists
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.exists() {
            debug!("Creating parent directory: {}", dir.display());
            fs::create_dir_all(&dir).map_err(|e| {
                error!("Failed to create directory {}: {}", dir.display(), e);
                BmError::DirectoryError { path: dir.clone() }
            })?;
        }

        // Create a temporary file in the same directory (for atomic operation)
        let mut temp_file = NamedTempFile::new_in(&dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            BmError::Io(e)
        })?;

        trace!("Serializing bookmarks to JSON");
        let json = serde_json::to_string_pretty(bookmarks).map_err(|e| {
            error!("Failed to serialize bookmarks: {}", e);
            BmError::Serialization(e)
        })?;

        trace!("Writing to temporary file");
        temp_file.write_all(json.as_bytes()).map_err(|e| {
            error!("Failed to write to temporary file: {}", e);
            BmError::Io(e)
        })?;

        temp_file.flush().map_err(|e| {
            error!("Failed to flush temporary file: {}", e);
            BmError::Io(e)
        })?;

        // Atomically move the temporary file to the target location
        debug!("Performing atomic move of temporary file to final location");
        temp_file.persist(&self.path).map_err(|e| {
            error!(
                "Failed to persist file {}: {}",
                self.path.display(),
                e.error
            );
            BmError::Io(e.error)
        })?;

        Ok(())
    }
}

/// Keeps the collection in process memory only.
#[derive(Default)]
pub struct MemoryPersistence {
    snapshot: Mutex<Vec<Bookmark>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing collection
    pub fn with_bookmarks(bookmarks: Vec<Bookmark>) -> Self {
        Self {
            snapshot: Mutex::new(bookmarks),
        }
    }
}

impl Persistence for MemoryPersistence {
    fn load(&self) -> Result<Vec<Bookmark>> {
        self.snapshot
            .lock()
            .map(|snapshot| snapshot.clone())
            .map_err(|_| BmError::LockAcquisitionFailed {
                message: "Failed to acquire lock on in-memory bookmarks".to_string(),
            })
    }

    fn save(&self, bookmarks: &[Bookmark]) -> Result<()> {
        let mut snapshot = self
            .snapshot
            .lock()
            .map_err(|_| BmError::LockAcquisitionFailed {
                message: "Failed to acquire lock on in-memory bookmarks".to_string(),
            })?;
        *snapshot = bookmarks.to_vec();
        Ok(())
    }
}

/// Owns the single mutable bookmark collection and its persistence.
///
/// Every mutation works on a copy of the collection, saves the copy, and
/// only then replaces the in-memory collection. A failed save leaves the
/// store exactly as it was.
pub struct BookmarkStore<P: Persistence = JsonFilePersistence> {
    /// Where the collection is loaded from and saved to
    persistence: P,

    /// The collection as last saved, in storage order
    bookmarks: Vec<Bookmark>,
}

impl<P: Persistence> BookmarkStore<P> {
    /// Creates a store and loads the collection.
    ///
    /// # Arguments
    ///
    /// * `persistence` - Where bookmarks are read from and written to
    ///
    /// # Returns
    ///
    /// The store in case of success or the load error
    pub fn open(persistence: P) -> Result<Self> {
        let mut store = Self {
            persistence,
            bookmarks: Vec::new(),
        };
        store.reload()?;
        Ok(store)
    }

    /// Replaces the in-memory collection with what persistence holds.
    ///
    /// # Returns
    ///
    /// The number of bookmarks loaded in case of success or an error
    pub fn reload(&mut self) -> Result<usize> {
        let bookmarks = self.persistence.load()?;

        for (canonical, ids) in duplicate_groups(&bookmarks) {
            warn!(
                "{} bookmarks share the URL {}: {}",
                ids.len(),
                canonical,
                ids.join(", ")
            );
        }

        info!("Loaded {} bookmarks", bookmarks.len());
        self.bookmarks = bookmarks;
        Ok(self.bookmarks.len())
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// All bookmarks in storage order
    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Bookmark> {
        find_by_id(&self.bookmarks, id)
    }

    /// Looks a bookmark up by the canonical form of `url`
    pub fn find_by_url(&self, url: &str) -> Option<&Bookmark> {
        find_by_url(&self.bookmarks, url)
    }

    pub fn find_by_chrome_id(&self, chrome_bookmark_id: &str) -> Option<&Bookmark> {
        find_by_external_id(&self.bookmarks, chrome_bookmark_id)
    }

    pub fn check_duplicate(&self, url: &str) -> DuplicateCheck {
        let existing = self.find_by_url(url).cloned();
        DuplicateCheck {
            is_duplicate: existing.is_some(),
            existing_bookmark: existing,
        }
    }

    pub fn search(&self, filter: &SearchFilter) -> Vec<Bookmark> {
        search(&self.bookmarks, filter)
    }

    pub fn categories(&self) -> Vec<CategoryCount> {
        list_categories(&self.bookmarks)
    }

    /// Creates a bookmark or updates the one with the same canonical URL
    pub fn upsert(&mut self, payload: BookmarkPayload) -> Result<UpsertOutcome> {
        let outcome = self.commit(|bookmarks| upsert_one(bookmarks, payload, Utc::now()))?;

        if outcome.was_duplicate {
            info!(
                "Updated existing bookmark {} (visit {})",
                outcome.bookmark.id, outcome.bookmark.visit_count
            );
        } else {
            info!("Created bookmark {}", outcome.bookmark.id);
        }
        Ok(outcome)
    }

    /// Applies a batch import and saves the resulting collection once
    pub fn import(&mut self, payloads: Vec<BookmarkPayload>) -> Result<ImportSummary> {
        info!("Importing {} bookmarks", payloads.len());
        let summary = self.commit(|bookmarks| Ok(upsert_batch(bookmarks, payloads, Utc::now())))?;

        for skipped in &summary.skipped {
            debug!(
                "Skipped import item {:?}: {}",
                skipped.payload.url, skipped.reason
            );
        }
        info!(
            "Import finished: {} added, {} updated, {} skipped",
            summary.added_count(),
            summary.updated_count(),
            summary.skipped_count()
        );
        Ok(summary)
    }

    /// Edits a bookmark by id. A URL conflict is returned without saving.
    pub fn update(&mut self, id: &str, payload: BookmarkPayload) -> Result<UpdateOutcome> {
        let mut next = self.bookmarks.clone();
        let outcome = update_by_id(&mut next, id, payload, Utc::now())?;

        match &outcome {
            UpdateOutcome::Updated { bookmark } => {
                self.persistence.save(&next)?;
                self.bookmarks = next;
                info!("Updated bookmark {}", bookmark.id);
            }
            UpdateOutcome::Conflict { conflicting } => {
                warn!(
                    "Update of {} rejected: URL already used by {}",
                    id, conflicting.id
                );
            }
        }
        Ok(outcome)
    }

    pub fn delete(&mut self, id: &str) -> Result<Bookmark> {
        let removed = self.commit(|bookmarks| {
            remove_by_id(bookmarks, id).ok_or_else(|| BmError::BookmarkNotFound { id: id.to_string() })
        })?;
        info!("Deleted bookmark {}", removed.id);
        Ok(removed)
    }

    /// Deletes the bookmark whose canonical URL matches `url`
    pub fn delete_by_url(&mut self, url: &str) -> Result<Bookmark> {
        let removed = self.commit(|bookmarks| {
            remove_by_url(bookmarks, url).ok_or_else(|| BmError::UrlNotFound { url: url.to_string() })
        })?;
        info!("Deleted bookmark {} by URL", removed.id);
        Ok(removed)
    }

    /// Removes every bookmark, returning how many there were
    pub fn clear(&mut self) -> Result<usize> {
        let count = self.commit(|bookmarks| {
            let count = bookmarks.len();
            bookmarks.clear();
            Ok(count)
        })?;
        info!("Deleted all {} bookmarks", count);
        Ok(count)
    }

    pub fn rename_category(&mut self, old: &str, new: &str) -> Result<usize> {
        let changed = self.commit_if_changed(|bookmarks| rename_category(bookmarks, old, new))?;
        info!("Renamed category '{}' to '{}' on {} bookmarks", old, new, changed);
        Ok(changed)
    }

    /// Moves every bookmark of `name` to the default category
    pub fn delete_category(&mut self, name: &str) -> Result<usize> {
        let changed = self.commit_if_changed(|bookmarks| clear_category(bookmarks, name))?;
        info!("Deleted category '{}' from {} bookmarks", name, changed);
        Ok(changed)
    }

    /// Runs a mutation on a copy of the collection, saves it, then swaps it in.
    fn commit<T>(&mut self, mutate: impl FnOnce(&mut Vec<Bookmark>) -> Result<T>) -> Result<T> {
        let mut next = self.bookmarks.clone();
        let out = mutate(&mut next)?;
        self.persistence.save(&next)?;
        self.bookmarks = next;
        Ok(out)
    }

    /// Like `commit`, but skips the save when nothing changed.
    fn commit_if_changed(&mut self, mutate: impl FnOnce(&mut Vec<Bookmark>) -> usize) -> Result<usize> {
        let mut next = self.bookmarks.clone();
        let changed = mutate(&mut next);
        if changed == 0 {
            debug!("No bookmarks changed, skipping save");
            return Ok(0);
        }
        self.persistence.save(&next)?;
        self.bookmarks = next;
        Ok(changed)
    }
}

impl BookmarkStore<JsonFilePersistence> {
    /// Opens the JSON file named by the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        info!(
            "Opening bookmark store: data_dir={}",
            config.data_dir.display()
        );
        Self::open(JsonFilePersistence::from_config(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_created_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("bookmarks.json");

        let store = BookmarkStore::open(JsonFilePersistence::new(&path)).unwrap();

        assert!(store.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn blank_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bookmarks.json");
        fs::write(&path, "  \n").unwrap();

        let store = BookmarkStore::open(JsonFilePersistence::new(&path)).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_file_is_invalid_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bookmarks.json");
        fs::write(&path, "{not json").unwrap();

        let result = BookmarkStore::open(JsonFilePersistence::new(&path));
        assert!(matches!(result, Err(BmError::InvalidFormat { .. })));
    }

    #[test]
    fn mutations_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bookmarks.json");

        let id = {
            let mut store = BookmarkStore::open(JsonFilePersistence::new(&path)).unwrap();
            store.upsert(BookmarkPayload::with_url("https://a.com/x")).unwrap();
            store.upsert(BookmarkPayload::with_url("https://b.com")).unwrap().bookmark.id
        };

        let mut store = BookmarkStore::open(JsonFilePersistence::new(&path)).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.bookmarks()[0].url, "https://a.com/x");

        store.delete(&id).unwrap();
        let reopened = BookmarkStore::open(JsonFilePersistence::new(&path)).unwrap();
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn memory_store_round_trips() {
        let mut store = BookmarkStore::open(MemoryPersistence::new()).unwrap();
        store.upsert(BookmarkPayload::with_url("https://a.com")).unwrap();

        assert_eq!(store.persistence().load().unwrap().len(), 1);
        assert!(store.check_duplicate("HTTPS://A.com/").is_duplicate);
    }

    #[test]
    fn rename_without_match_skips_save() {
        let mut store = BookmarkStore::open(MemoryPersistence::new()).unwrap();
        assert_eq!(store.rename_category("nothing", "else").unwrap(), 0);
    }

    #[test]
    fn loads_file_without_updated_at_and_rewrites_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bookmarks.json");
        fs::write(
            &path,
            r#"[{"id":"1","url":"https://a.com","title":"A","createdAt":"2024-01-01T00:00:00.000Z","lastVisited":"2024-02-01T00:00:00.000Z","lastModified":"2024-03-01T00:00:00.000Z","visitCount":1,"tags":[],"category":"other"}]"#,
        )
        .unwrap();

        let mut store = BookmarkStore::open(JsonFilePersistence::new(&path)).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.bookmarks()[0].updated_at.to_rfc3339(),
            "2024-03-01T00:00:00+00:00"
        );

        store.upsert(BookmarkPayload::with_url("https://A.com/")).unwrap();
        let reopened = BookmarkStore::open(JsonFilePersistence::new(&path)).unwrap();
        assert_eq!(reopened.bookmarks()[0].id, "1");
        assert_eq!(reopened.bookmarks()[0].visit_count, 2);
    }
}
