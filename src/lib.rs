//! Personal bookmark manager library
//!
//! This library canonicalizes bookmark URLs, detects duplicates, merges
//! single and bulk imports into a collection, manages categories, and keeps
//! the collection in a flat JSON file.

mod bookmark;
mod canonical;
mod category;
mod cli;
mod config;
mod errors;
mod helper;
mod import;
mod lookup;
mod merge;
mod search;
mod storage;
mod types;

// Re-export key components
pub use bookmark::*;
pub use canonical::*;
pub use category::*;
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use helper::*;
pub use import::*;
pub use lookup::*;
pub use merge::*;
pub use search::*;
pub use storage::*;
pub use types::*;
