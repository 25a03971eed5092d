//! CLI module for the bookmarkhub application
//!
//! This module handles the command-line interface for interacting with the
//! bookmark store.
use std::{
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, info};
use tokio::sync::Mutex;

use crate::{
    canonicalize, load_import_file, parse_tags, BmError, Bookmark, BookmarkPayload,
    BookmarkStore, CategoryCount, Commands, Config, Result, SearchFilter, UpdateOutcome,
};

/// CLI Application handler - processes CLI commands and interfaces with BookmarkStore
pub struct App {
    /// The bookmark store backend
    store: Arc<Mutex<BookmarkStore>>,

    /// Application configuration
    config: Config,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Create a new CLI application with the given store and config
    pub fn new(store: Arc<Mutex<BookmarkStore>>, config: Config, verbose: bool) -> Self {
        Self {
            store,
            config,
            verbose,
        }
    }

    /// Run the CLI application with the given command
    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Add {
                url,
                title,
                description,
                category,
                tags,
                source,
                chrome_id,
                json,
            } => {
                let payload = BookmarkPayload {
                    url: Some(url),
                    title,
                    description,
                    category,
                    tags: tags.map(|t| parse_tags(Some(t))),
                    source: Some(source),
                    chrome_bookmark_id: chrome_id,
                    ..Default::default()
                };
                self.handle_add(payload, json).await?
            }

            Commands::Update {
                id,
                url,
                title,
                description,
                category,
                tags,
            } => {
                let payload = BookmarkPayload {
                    url,
                    title,
                    description,
                    category,
                    tags: tags.map(|t| parse_tags(Some(t))),
                    ..Default::default()
                };
                self.handle_update(id, payload).await?
            }

            Commands::Show { id, json } => self.handle_show(id, json).await?,

            Commands::Find {
                url,
                chrome_id,
                json,
            } => self.handle_find(url, chrome_id, json).await?,

            Commands::Check { url } => self.handle_check(url).await?,

            Commands::List {
                category,
                search,
                limit,
                json,
            } => {
                let filter = SearchFilter {
                    category,
                    query: search,
                    limit: Some(limit.unwrap_or(self.config.list_limit)),
                };
                self.handle_list(filter, json).await?
            }

            Commands::Delete { target, url, force } => {
                self.handle_delete(target, url, force).await?
            }

            Commands::Clear { force } => self.handle_clear(force).await?,

            Commands::Import { source, json } => self.handle_import(&source, json).await?,

            Commands::Categories { json } => self.handle_categories(json).await?,

            Commands::RenameCategory { old, new } => {
                let changed = self.store.lock().await.rename_category(&old, &new)?;
                println!(
                    "Renamed category '{}' to '{}' on {} bookmark{}",
                    old,
                    new,
                    changed,
                    plural(changed)
                );
            }

            Commands::DeleteCategory { name } => {
                let changed = self.store.lock().await.delete_category(&name)?;
                println!(
                    "Moved {} bookmark{} from '{}' to 'other'",
                    changed,
                    plural(changed),
                    name
                );
            }

            Commands::Canonicalize { url } => println!("{}", canonicalize(&url)),

            Commands::Config { .. } => {
                return Err(BmError::ApplicationError {
                    message: "configuration commands are handled before the store is opened"
                        .to_string(),
                })
            }
        }

        Ok(())
    }

    /// Shows, updates or resets the configuration file
    pub fn configure(
        config: &Config,
        config_path: Option<&Path>,
        show: bool,
        set: Option<String>,
        reset: bool,
    ) -> Result<()> {
        let path: PathBuf = match config_path {
            Some(path) => path.to_path_buf(),
            None => Config::default_path().ok_or_else(|| BmError::ConfigError {
                message: "could not determine the configuration directory".to_string(),
            })?,
        };

        if reset {
            Config::default().save(&path)?;
            println!("Configuration reset to defaults: {}", path.display());
            return Ok(());
        }

        if let Some(assignment) = set {
            let mut updated = config.clone();
            updated.set(&assignment)?;
            updated.save(&path)?;
            println!("Configuration updated: {}", assignment.trim());
            return Ok(());
        }

        if show {
            println!("Config file: {}", path.display());
        }
        println!("{}", serde_json::to_string_pretty(config)?);
        Ok(())
    }

    async fn handle_add(&self, payload: BookmarkPayload, json: bool) -> Result<()> {
        let outcome = self.store.lock().await.upsert(payload)?;

        if json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        } else if outcome.was_duplicate {
            println!(
                "Bookmark already existed, updated: {} (visits: {})",
                outcome.bookmark.id, outcome.bookmark.visit_count
            );
        } else {
            println!("Bookmark created with ID: {}", outcome.bookmark.id);
        }
        Ok(())
    }

    async fn handle_update(&self, id: String, payload: BookmarkPayload) -> Result<()> {
        match self.store.lock().await.update(&id, payload)? {
            UpdateOutcome::Updated { bookmark } => {
                println!("Bookmark updated: {}", bookmark.id);
                Ok(())
            }
            UpdateOutcome::Conflict { conflicting } => Err(BmError::ApplicationError {
                message: format!(
                    "URL is already bookmarked as {} ({})",
                    conflicting.id, conflicting.url
                ),
            }),
        }
    }

    async fn handle_show(&self, id: String, json: bool) -> Result<()> {
        let bookmark = self
            .store
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(BmError::BookmarkNotFound { id })?;

        self.display_bookmarks(&[bookmark], json, true)
    }

    async fn handle_find(
        &self,
        url: Option<String>,
        chrome_id: Option<String>,
        json: bool,
    ) -> Result<()> {
        let store = self.store.lock().await;
        let bookmark = match (url, chrome_id) {
            (_, Some(chrome_id)) => store.find_by_chrome_id(&chrome_id).cloned().ok_or_else(|| {
                BmError::ApplicationError {
                    message: format!("No bookmark found with browser id: {}", chrome_id),
                }
            })?,
            (Some(url), None) => store
                .find_by_url(&url)
                .cloned()
                .ok_or(BmError::UrlNotFound { url })?,
            (None, None) => {
                return Err(BmError::ApplicationError {
                    message: "Provide a URL or --chrome-id".to_string(),
                })
            }
        };
        drop(store);

        self.display_bookmarks(&[bookmark], json, true)
    }

    async fn handle_check(&self, url: String) -> Result<()> {
        let check = self.store.lock().await.check_duplicate(&url);
        match check.existing_bookmark {
            Some(existing) => println!(
                "Already bookmarked: {} | {} | {}",
                existing.id, existing.title, existing.url
            ),
            None => println!("Not bookmarked: {}", canonicalize(&url)),
        }
        Ok(())
    }

    /// List bookmarks according to provided filters and options
    async fn handle_list(&self, filter: SearchFilter, json: bool) -> Result<()> {
        debug!("Listing bookmarks with filter: {:?}", filter);
        let bookmarks = self.store.lock().await.search(&filter);

        if bookmarks.is_empty() && !json {
            println!("No bookmarks found matching the criteria.");
            return Ok(());
        }

        self.display_bookmarks(&bookmarks, json, self.verbose)?;
        if !json {
            println!(
                "\nFound {} bookmark{}",
                bookmarks.len(),
                plural(bookmarks.len())
            );
        }
        Ok(())
    }

    async fn handle_delete(&self, target: String, by_url: bool, force: bool) -> Result<()> {
        let mut store = self.store.lock().await;

        // Step 1: Fetch the bookmark to be deleted (to verify it exists and show details in the prompt)
        let bookmark = if by_url {
            store
                .find_by_url(&target)
                .cloned()
                .ok_or_else(|| BmError::UrlNotFound { url: target.clone() })?
        } else {
            store
                .get(&target)
                .cloned()
                .ok_or_else(|| BmError::BookmarkNotFound { id: target.clone() })?
        };

        // Step 2: Prompt for confirmation (unless force flag is set)
        if !force && self.config.confirm_deletes {
            println!("You are about to delete the following bookmark:");
            println!("ID:    {}", bookmark.id);
            println!("Title: {}", bookmark.title);
            println!("URL:   {}", bookmark.url);
            if !confirm("Are you sure you want to delete this bookmark?")? {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        // Step 3: Delete the bookmark
        store.delete(&bookmark.id)?;
        println!(
            "Bookmark '{}' ({}) has been permanently deleted.",
            bookmark.title, bookmark.id
        );
        Ok(())
    }

    async fn handle_clear(&self, force: bool) -> Result<()> {
        let mut store = self.store.lock().await;

        if !force && self.config.confirm_deletes {
            println!("You are about to delete all {} bookmarks.", store.len());
            if !confirm("Are you sure?")? {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        let count = store.clear()?;
        println!("Deleted {} bookmark{}.", count, plural(count));
        Ok(())
    }

    /// Handle importing bookmarks from a JSON file
    async fn handle_import(&self, source: &Path, json: bool) -> Result<()> {
        let payloads = load_import_file(source)?;
        info!(
            "Read {} import items from {}",
            payloads.len(),
            source.display()
        );

        let mut store = self.store.lock().await;
        let summary = store.import(payloads)?;

        if json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }

        println!(
            "Import complete: {} added, {} updated, {} skipped ({} total bookmarks)",
            summary.added_count(),
            summary.updated_count(),
            summary.skipped_count(),
            store.len()
        );
        for skipped in &summary.skipped {
            println!(
                "  skipped {}: {}",
                skipped
                    .payload
                    .url
                    .as_deref()
                    .or(skipped.payload.title.as_deref())
                    .unwrap_or("<untitled>"),
                skipped.reason
            );
        }
        Ok(())
    }

    async fn handle_categories(&self, json: bool) -> Result<()> {
        let categories: Vec<CategoryCount> = self.store.lock().await.categories();

        if json {
            println!("{}", serde_json::to_string_pretty(&categories)?);
            return Ok(());
        }
        if categories.is_empty() {
            println!("No categories yet.");
        }
        for category in categories {
            println!("{:<24} {}", category.name, category.count);
        }
        Ok(())
    }

    /// Display bookmarks in the requested format
    fn display_bookmarks(&self, bookmarks: &[Bookmark], json: bool, detailed: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(bookmarks)?);
            return Ok(());
        }

        // Use terminal width for formatting if available
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        for (i, bookmark) in bookmarks.iter().enumerate() {
            if i > 0 {
                println!("{}", "-".repeat(term_width.min(50)));
            }

            println!(
                "ID: {} | Created: {}",
                bookmark.id,
                bookmark.created_at.format("%Y-%m-%d %H:%M")
            );
            println!("Title: {}", console::style(&bookmark.title).bold());
            println!("URL: {}", bookmark.url);
            println!("Category: {}", bookmark.category);
            if !bookmark.tags.is_empty() {
                println!("Tags: {}", bookmark.tags.join(", "));
            }

            if detailed {
                if !bookmark.description.is_empty() {
                    println!("Description: {}", bookmark.description);
                }
                println!(
                    "Visits: {} | Last visited: {} | Updated: {}",
                    bookmark.visit_count,
                    bookmark.last_visited.format("%Y-%m-%d %H:%M"),
                    bookmark.updated_at.format("%Y-%m-%d %H:%M")
                );
                if let Some(source) = &bookmark.source {
                    println!("Source: {}", source);
                }
            }
        }
        Ok(())
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Asks a yes/no question on stdin; anything but y/yes is a no.
fn confirm(question: &str) -> Result<bool> {
    println!("\nThis action cannot be undone!");
    print!("{} [y/N]: ", question);
    stdout().flush().map_err(BmError::Io)?;

    let mut input = String::new();
    stdin().read_line(&mut input).map_err(BmError::Io)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}
