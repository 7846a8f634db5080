//! Time-boxed on-disk cache for provider response bodies.
//!
//! One JSON file per request URL, named by the SHA-256 of the URL. Entries
//! older than the TTL are ignored and overwritten on the next store.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    url: String,
    stored_at: DateTime<Utc>,
    body: String,
}

#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self { dir: dir.into(), ttl }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        self.dir.join(format!("{digest:x}.json"))
    }

    /// Fresh body for `url` as of `now`, if any. Unreadable entries count as misses.
    pub fn get(&self, url: &str, now: DateTime<Utc>) -> Option<String> {
        let path = self.entry_path(url);
        let contents = fs::read_to_string(&path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&contents) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("ignoring corrupt cache entry {}: {e}", path.display());
                return None;
            }
        };

        if entry.url != url {
            return None;
        }

        let age = now.signed_duration_since(entry.stored_at).to_std().ok()?;
        if age > self.ttl {
            tracing::debug!("cache entry for {url} expired ({age:?} old)");
            return None;
        }

        Some(entry.body)
    }

    pub fn put(&self, url: &str, body: &str, now: DateTime<Utc>) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create cache directory: {}", self.dir.display()))?;

        let entry = CacheEntry {
            url: url.to_string(),
            stored_at: now,
            body: body.to_string(),
        };
        let path = self.entry_path(url);
        let json = serde_json::to_string(&entry).context("Failed to serialize cache entry")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write cache entry: {}", path.display()))?;

        Ok(())
    }
}
