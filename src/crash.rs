// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The in-memory crash report: raw input, the processed output being
//! built up by the pipeline, any minidumps fetched alongside it, and
//! the bookkeeping (`processor_notes`, `errors`) rules accumulate as
//! they run.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::rule::Rule;
use crate::storage::ObjectStore;
use crate::Result;

/// Owns a path to a fetched dump file and removes it on drop, but only
/// when the path looks like one of our own scratch files (contains
/// `"TEMPORARY"`) so a store that hands back a path it still owns is
/// never deleted out from under it.
#[derive(Debug)]
pub struct DumpHandle {
    path: PathBuf,
}

impl DumpHandle {
    pub fn new(path: PathBuf) -> Self {
        DumpHandle { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DumpHandle {
    fn drop(&mut self) {
        if self.path.to_string_lossy().contains("TEMPORARY") {
            if let Err(err) = fs::remove_file(&self.path) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("failed to clean up temporary dump {:?}: {}", self.path, err);
                }
            }
        }
    }
}

/// A crash report in flight through the pipeline.
pub struct Crash {
    pub crash_id: String,
    pub raw_crash: Map<String, Value>,
    pub processed_crash: Map<String, Value>,
    pub dumps: HashMap<String, DumpHandle>,
    /// Free-text notes accumulated by rules, `"; "`-joined into
    /// `processed_crash.metadata.processor_notes` by `SaveMetadataRule`.
    pub processor_notes: Vec<String>,
    /// Failures from rules that chose to suppress rather than abort the
    /// pipeline. Non-empty means the crash still saves, but
    /// `metadata.success` reads `false`.
    pub errors: Vec<String>,
}

impl Crash {
    pub fn new(crash_id: String, raw_crash: Map<String, Value>) -> Self {
        Crash {
            crash_id,
            raw_crash,
            processed_crash: Map::new(),
            dumps: HashMap::new(),
            processor_notes: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Loads the raw crash and its dumps from `store`, replacing
    /// whatever `raw_crash`/`dumps` this instance started with. The
    /// first step of the worker's per-item handling.
    pub fn fetch(crash_id: &str, store: &impl ObjectStore) -> Result<Crash> {
        let raw_crash = store.get_raw(crash_id)?;
        let dumps = store
            .get_dumps(crash_id)?
            .into_iter()
            .map(|(name, path)| (name, DumpHandle::new(path)))
            .collect();
        Ok(Crash {
            crash_id: crash_id.to_string(),
            raw_crash,
            processed_crash: Map::new(),
            dumps,
            processor_notes: Vec::new(),
            errors: Vec::new(),
        })
    }

    /// Applies a single rule, honoring its predicate. When `suppress`
    /// is `true`, a failing action is recorded in `errors` and treated
    /// as non-fatal; otherwise the error propagates and the pipeline
    /// must stop.
    pub fn apply(&mut self, rule: &dyn Rule, suppress: bool) -> Result<()> {
        match rule.apply(self) {
            Ok(_) => Ok(()),
            Err(err) if suppress => {
                self.errors.push(format!("{}: {}", rule.name(), err));
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Runs `rules` against this crash in order, each under its own
    /// suppression policy (see `Rule`-set construction in `pipeline`).
    /// `suppress` here is the pipeline-wide default for rules that
    /// don't specify their own.
    pub fn transform(&mut self, rules: &[Box<dyn Rule + Send + Sync>], suppress: bool) -> Result<()> {
        for rule in rules {
            self.apply(rule.as_ref(), suppress)?;
        }
        Ok(())
    }

    /// Persists `processed_crash` via `store`. The last step of the
    /// worker's per-item handling, after the pipeline has run.
    pub fn save(&self, store: &impl ObjectStore) -> Result<()> {
        store.save(&self.crash_id, &self.processed_crash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::push_note;
    use crate::Error;
    use tempfile::NamedTempFile;

    fn sample() -> Crash {
        let mut raw = Map::new();
        raw.insert("uuid".to_string(), Value::String("abc".to_string()));
        Crash::new("abc".to_string(), raw)
    }

    struct Boom;
    impl Rule for Boom {
        fn name(&self) -> &str {
            "Boom"
        }
        fn action(&self, _crash: &mut Crash) -> Result<bool> {
            Err(Error::Rule {
                rule: "Boom".to_string(),
                message: "kaboom".to_string(),
            })
        }
    }

    struct NotesOnly;
    impl Rule for NotesOnly {
        fn name(&self) -> &str {
            "NotesOnly"
        }
        fn action(&self, crash: &mut Crash) -> Result<bool> {
            push_note(crash, "ran");
            Ok(true)
        }
    }

    #[test]
    fn test_apply_unsuppressed_propagates_error() {
        let mut crash = sample();
        let err = crash.apply(&Boom, false).unwrap_err();
        assert!(matches!(err, Error::Rule { .. }));
        assert!(crash.errors.is_empty());
    }

    #[test]
    fn test_apply_suppressed_records_error_and_continues() {
        let mut crash = sample();
        crash.apply(&Boom, true).unwrap();
        assert_eq!(crash.errors.len(), 1);
        assert!(crash.errors[0].contains("kaboom"));
    }

    #[test]
    fn test_apply_success_leaves_errors_empty() {
        let mut crash = sample();
        crash.apply(&NotesOnly, false).unwrap();
        assert!(crash.errors.is_empty());
        assert_eq!(crash.processor_notes, vec!["ran".to_string()]);
    }

    #[test]
    fn test_dump_handle_removes_temporary_files() {
        let tmp = NamedTempFile::new().unwrap();
        let dir = tmp.path().parent().unwrap();
        let path = dir.join("abc-TEMPORARY.dmp");
        fs::write(&path, b"dump bytes").unwrap();
        assert!(path.exists());
        {
            let _handle = DumpHandle::new(path.clone());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_dump_handle_preserves_non_temporary_files() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_path_buf();
        {
            let _handle = DumpHandle::new(path.clone());
        }
        assert!(path.exists());
    }
}
