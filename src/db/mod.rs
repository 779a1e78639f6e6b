//! Application state and directory access
//!
//! - `directory` - the directory collaborator and its in-memory implementation
//! - `listing` - cached listing reads used by the HTTP handlers

pub mod directory;
mod listing;

use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::employee::model::Employee;

pub use directory::{DirectoryError, DirectorySource, InMemoryDirectory};

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn DirectorySource + Send + Sync>,
    /// Full employee listing per organization id.
    pub listing_cache: Cache<String, Vec<Employee>>,
}

impl AppState {
    pub async fn new_with_config(config: &AppConfig) -> anyhow::Result<Self> {
        let directory = InMemoryDirectory::from_seed_file(&config.seed_path).await?;
        Ok(Self::new_with_directory(
            Arc::new(directory),
            config.listing_cache_ttl,
        ))
    }

    pub fn new_with_directory(
        directory: Arc<dyn DirectorySource + Send + Sync>,
        listing_ttl: Duration,
    ) -> Self {
        let listing_cache = Cache::builder()
            .time_to_live(listing_ttl)
            .max_capacity(100)
            .build();

        AppState {
            directory,
            listing_cache,
        }
    }
}
