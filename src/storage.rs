// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The storage seam: how crashes and dumps are fetched and how
//! processed crashes are saved. No concrete implementation lives here;
//! whatever backs production (S3, GCS, a local filesystem for tests)
//! is wired in by the binary that embeds this crate.

use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::Result;

/// Read/write access to raw crashes, their dumps, and processed
/// crashes. Implementations decide their own retry and backend
/// details; this crate only needs the three operations below.
pub trait ObjectStore {
    /// Fetches the raw crash JSON for `crash_id`. Not-found is a hard
    /// error here (unlike `get_processed`): a worker should never be
    /// handed a `WorkItem` for a crash that doesn't exist.
    fn get_raw(&self, crash_id: &str) -> Result<Map<String, Value>>;

    /// Fetches every dump associated with `crash_id`, as a map from
    /// dump name (`"upload_file_minidump"` for the primary dump) to a
    /// local filesystem path.
    fn get_dumps(&self, crash_id: &str) -> Result<HashMap<String, PathBuf>>;

    /// Fetches a previously processed crash, if one exists.
    /// `Ok(None)` means "not found" and is not an error: several rules
    /// (e.g. `UUIDCorrectionRule`) look up prior processed crashes
    /// opportunistically and treat absence as "nothing to correct".
    fn get_processed(&self, crash_id: &str) -> Result<Option<Value>>;

    /// Persists `processed_crash` for `crash_id`.
    fn save(&self, crash_id: &str, processed_crash: &Map<String, Value>) -> Result<()>;
}


#[cfg(test)]
mod tests {
    use super::test_support::MemoryStore;
    use super::*;

    #[test]
    fn test_memory_store_round_trips_raw_and_processed() {
        let mut raw = HashMap::new();
        let mut crash = Map::new();
        crash.insert("uuid".to_string(), Value::String("abc".to_string()));
        raw.insert("abc".to_string(), crash.clone());

        let store = MemoryStore {
            raw,
            ..Default::default()
        };

        assert_eq!(store.get_raw("abc").unwrap(), crash);
        assert!(store.get_processed("abc").unwrap().is_none());

        store.save("abc", &crash).unwrap();
        assert_eq!(
            store.get_processed("abc").unwrap(),
            Some(Value::Object(crash))
        );
    }

    #[test]
    fn test_memory_store_missing_raw_is_an_error() {
        let store = MemoryStore::default();
        assert!(store.get_raw("missing").is_err());
    }
}
