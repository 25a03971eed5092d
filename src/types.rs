//! Shared result types for the bookmarkhub application.
//!
//! This module contains the structured outcomes returned by the bookmark
//! core and the subcommands understood by the command-line front end.
use std::path::PathBuf;

use clap::Subcommand;
use serde::Serialize;

use crate::{BmError, Bookmark, BookmarkPayload};

/// A specialized Result type for bookmarkhub operations.
pub type Result<T> = std::result::Result<T, BmError>;

/// Result of a single upsert.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertOutcome {
    /// The bookmark as stored after the operation
    pub bookmark: Bookmark,
    /// True when an existing bookmark was updated instead of a new one created
    pub was_duplicate: bool,
}

/// Result of an update by id.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum UpdateOutcome {
    /// The bookmark was changed
    Updated { bookmark: Bookmark },
    /// The new URL already belongs to another bookmark; nothing was changed
    Conflict { conflicting: Bookmark },
}

/// Why an import item was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    #[serde(rename = "Missing URL")]
    MissingUrl,
    #[serde(rename = "Existing bookmark has newer data")]
    ExistingIsNewer,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingUrl => write!(f, "Missing URL"),
            SkipReason::ExistingIsNewer => write!(f, "Existing bookmark has newer data"),
        }
    }
}

/// An import item that was left out, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedItem {
    pub payload: BookmarkPayload,
    pub reason: SkipReason,
}

/// Summary of a bulk import
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    /// Bookmarks created by the import
    pub added: Vec<Bookmark>,
    /// Existing bookmarks the import merged into
    pub updated: Vec<Bookmark>,
    /// Items that were not applied
    pub skipped: Vec<SkippedItem>,
}

impl ImportSummary {
    pub fn added_count(&self) -> usize {
        self.added.len()
    }

    pub fn updated_count(&self) -> usize {
        self.updated.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Answer to "is this URL already bookmarked?"
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCheck {
    pub is_duplicate: bool,
    pub existing_bookmark: Option<Bookmark>,
}

/// A category and how many bookmarks carry it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Available subcommands for the bookmarkhub application
#[derive(Subcommand)]
pub enum Commands {
    /// Add a bookmark, or update the existing one with the same URL
    Add {
        /// URL to bookmark
        url: String,

        /// Title of the bookmark (defaults to the URL)
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// Short description
        #[clap(short, long)]
        description: Option<String>,

        /// Category label
        #[clap(short, long)]
        category: Option<String>,

        /// Tags to associate with the bookmark (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,

        /// Provenance tag, e.g. "manual" or "extension"
        #[clap(short, long, default_value = "manual")]
        source: String,

        /// Browser bookmark id to correlate with
        #[clap(long)]
        chrome_id: Option<String>,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Update fields of a bookmark by ID
    Update {
        /// ID of the bookmark to update
        id: String,

        /// New URL
        #[clap(short, long)]
        url: Option<String>,

        /// New title
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New description
        #[clap(short, long)]
        description: Option<String>,

        /// New category
        #[clap(short, long)]
        category: Option<String>,

        /// Replacement tags (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,
    },

    /// Show a bookmark by ID
    Show {
        /// ID of the bookmark to show
        id: String,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Find a bookmark by URL or browser bookmark id
    Find {
        /// URL to look up (compared in canonical form)
        url: Option<String>,

        /// Look up by browser bookmark id instead
        #[clap(long, conflicts_with = "url")]
        chrome_id: Option<String>,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Check whether a URL is already bookmarked
    Check {
        /// URL to check
        url: String,
    },

    /// List bookmarks with optional filtering
    List {
        /// Only show this category ("all" shows every category)
        #[clap(short, long)]
        category: Option<String>,

        /// Case-insensitive text to look for in title, description, URL and tags
        #[clap(short, long)]
        search: Option<String>,

        /// Limit the number of bookmarks returned
        #[clap(short = 'n', long)]
        limit: Option<usize>,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Delete a bookmark by ID or URL
    Delete {
        /// ID of the bookmark, or its URL with --url
        target: String,

        /// Treat the target as a URL
        #[clap(short, long)]
        url: bool,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Delete every bookmark
    Clear {
        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Import bookmarks from a JSON file
    Import {
        /// Path to a JSON array of bookmark objects
        source: PathBuf,

        /// Print the full import report as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// List categories in use
    Categories {
        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Rename a category on every bookmark that has it
    RenameCategory {
        /// Current category name
        old: String,

        /// New category name
        new: String,
    },

    /// Move every bookmark of a category back to "other"
    DeleteCategory {
        /// Category to delete
        name: String,
    },

    /// Print the canonical comparison form of a URL
    Canonicalize {
        /// URL to canonicalize
        url: String,
    },

    /// Configuration management
    Config {
        /// Show current configuration
        #[clap(short = 'S', long)]
        show: bool,

        /// Update a configuration setting (key=value)
        #[clap(short, long)]
        set: Option<String>,

        /// Reset configuration to defaults
        #[clap(short, long)]
        reset: bool,
    },
}
