//! Mutex-guarded essay record store
//!
//! The persisted collection is one JSON array document on disk, shared by
//! every background enrichment task and every supervisory caller in the
//! process. A single lock serializes all three operations (read, append,
//! locate-and-mutate), so each read-modify-write cycle is atomic with
//! respect to the others: no interleaving can drop a concurrently appended
//! record or write back state read before another writer's update.
//!
//! Every write re-reads the on-disk document inside its critical section and
//! replaces it whole; there is no in-place editing, so readers observe
//! either the complete old document or the complete new one. The lock is
//! process-local: pointing two processes at the same file is not supported.

pub mod location;

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::EssayRecord;

/// The shared record store
pub struct EssayStore {
    preferred_path: PathBuf,
    lock: Mutex<()>,
}

impl EssayStore {
    /// Create a store around a preferred on-disk location.
    ///
    /// The path is only a preference: each operation re-resolves it, falling
    /// back to the temp directory when the preferred location is unwritable.
    pub fn new(preferred_path: impl Into<PathBuf>) -> Self {
        Self {
            preferred_path: preferred_path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Return the full persisted collection.
    ///
    /// A missing, unreadable, or corrupt document reads as empty; storage
    /// faults never surface here.
    pub async fn read_all(&self) -> Vec<EssayRecord> {
        let _guard = self.lock.lock().await;
        let path = location::resolve(&self.preferred_path);
        read_collection(&path).await
    }

    /// Append one record, re-reading the current document under the lock.
    pub async fn append(&self, record: EssayRecord) -> Result<()> {
        let _guard = self.lock.lock().await;
        let path = location::resolve(&self.preferred_path);

        let mut records = read_collection(&path).await;
        records.push(record);
        write_collection(&path, &records).await?;

        debug!(path = %path.display(), total = records.len(), "Record appended");
        Ok(())
    }

    /// Locate a record by process id and mutate it in place.
    ///
    /// Refreshes `metadata.updated_at` after the mutation. If no record
    /// matches, nothing is written and [`Error::NotFound`] is returned.
    pub async fn locate_and_mutate<F>(&self, process_id: &str, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut EssayRecord) + Send,
    {
        let _guard = self.lock.lock().await;
        let path = location::resolve(&self.preferred_path);

        let mut records = read_collection(&path).await;
        let record = records
            .iter_mut()
            .find(|r| r.process.process_id == process_id)
            .ok_or_else(|| Error::NotFound(format!("no record with process_id {}", process_id)))?;

        mutate(record);
        record.metadata.updated_at = chrono::Utc::now();

        write_collection(&path, &records).await
    }
}

async fn read_collection(path: &Path) -> Vec<EssayRecord> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Store unreadable, treating as empty");
            return Vec::new();
        }
    };

    // The writability probe leaves an empty file behind on a fresh store.
    if raw.trim().is_empty() {
        return Vec::new();
    }

    match parse_collection(&raw) {
        Ok(records) => records,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Store document corrupt, treating as empty");
            Vec::new()
        }
    }
}

/// Parse the persisted document; a single-object document is folded into a
/// one-element collection.
fn parse_collection(raw: &str) -> serde_json::Result<Vec<EssayRecord>> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    match value {
        serde_json::Value::Array(_) => serde_json::from_value(value),
        other => Ok(vec![serde_json::from_value(other)?]),
    }
}

async fn write_collection(path: &Path, records: &[EssayRecord]) -> Result<()> {
    let body = serde_json::to_string_pretty(records)?;
    tokio::fs::write(path, body).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collection_rejects_garbage() {
        assert!(parse_collection("{not json").is_err());
        assert!(parse_collection("[{\"metadata\": 3}]").is_err());
    }

    #[test]
    fn test_parse_collection_empty_array() {
        assert!(parse_collection("[]").unwrap().is_empty());
    }
}
