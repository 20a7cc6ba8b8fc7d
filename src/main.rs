// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The worker binary: wires [`crash_processor::Worker`] to concrete
//! adapters and runs it to completion or exhaustion.
//!
//! Per spec §1, a real message-broker client, a real object-store
//! client, and the native minidump stack-walker are all external
//! collaborators this crate does not implement. The adapters below are
//! a filesystem-backed stand-in good enough to run the worker loop
//! locally (pointed at a directory of work), not a production backend;
//! an operator wiring this crate into an actual deployment replaces
//! all three with real clients.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crash_processor::storage::ObjectStore;
use crash_processor::stackwalker::Stackwalker;
use crash_processor::worklist::{AckContext, Source, WorkItem};
use crash_processor::{rules, Config, Error, Result, Worker, Worklist};

const QUEUE_DIR_ENV_VAR: &str = "CRASH_PROCESSOR_QUEUE_DIR";
const STORE_DIR_ENV_VAR: &str = "CRASH_PROCESSOR_STORE_DIR";

/// A [`Source`] backed by a directory of `<crash_id>.json` marker
/// files. Polling lists the directory and claims the first file it
/// finds; acking deletes the marker, leaving it in place on a nack so
/// the next poll redelivers it, matching spec §6's "no-ack implies
/// redelivery" contract.
struct FilesystemQueue {
    queue_dir: PathBuf,
}

struct FileAck {
    path: PathBuf,
}

impl AckContext for FileAck {
    fn ack(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::Ack(format!("{}: {}", self.path.display(), err))),
        }
    }

    fn nack(&self) -> Result<()> {
        log::warn!("leaving {} in queue for redelivery", self.path.display());
        Ok(())
    }
}

impl Source for FilesystemQueue {
    fn poll(&mut self) -> Result<Option<WorkItem>> {
        let mut entries: Vec<PathBuf> = fs::read_dir(&self.queue_dir)
            .map_err(|err| Error::Fetch(format!("reading {}: {}", self.queue_dir.display(), err)))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
            .collect();
        entries.sort();

        let Some(path) = entries.into_iter().next() else {
            return Ok(None);
        };

        let crash_id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        Ok(Some(WorkItem::new(crash_id, Box::new(FileAck { path }))))
    }
}

/// An [`ObjectStore`] backed by three subdirectories of a base
/// directory: `raw/<crash_id>.json`, `dumps/<crash_id>/<dump_name>`,
/// and `processed/<crash_id>.json`.
struct FilesystemStore {
    base_dir: PathBuf,
}

impl FilesystemStore {
    fn raw_path(&self, crash_id: &str) -> PathBuf {
        self.base_dir.join("raw").join(format!("{}.json", crash_id))
    }

    fn dumps_dir(&self, crash_id: &str) -> PathBuf {
        self.base_dir.join("dumps").join(crash_id)
    }

    fn processed_path(&self, crash_id: &str) -> PathBuf {
        self.base_dir.join("processed").join(format!("{}.json", crash_id))
    }
}

impl ObjectStore for FilesystemStore {
    fn get_raw(&self, crash_id: &str) -> Result<Map<String, Value>> {
        let path = self.raw_path(crash_id);
        let bytes = fs::read(&path)
            .map_err(|err| Error::Fetch(format!("{}: {}", path.display(), err)))?;
        match serde_json::from_slice(&bytes)? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::Fetch(format!("{} is not a JSON object", path.display()))),
        }
    }

    fn get_dumps(&self, crash_id: &str) -> Result<HashMap<String, PathBuf>> {
        let dir = self.dumps_dir(crash_id);
        if !dir.exists() {
            return Ok(HashMap::new());
        }
        let mut dumps = HashMap::new();
        for entry in fs::read_dir(&dir)
            .map_err(|err| Error::Fetch(format!("{}: {}", dir.display(), err)))?
        {
            let entry = entry.map_err(|err| Error::Fetch(err.to_string()))?;
            let path = entry.path();
            if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
                dumps.insert(name.to_string(), path);
            }
        }
        Ok(dumps)
    }

    fn get_processed(&self, crash_id: &str) -> Result<Option<Value>> {
        let path = self.processed_path(crash_id);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).map_err(|err| Error::Fetch(err.to_string()))?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save(&self, crash_id: &str, processed_crash: &Map<String, Value>) -> Result<()> {
        let path = self.processed_path(crash_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| Error::Save(err.to_string()))?;
        }
        let bytes = serde_json::to_vec_pretty(processed_crash)?;
        fs::write(&path, bytes).map_err(|err| Error::Save(format!("{}: {}", path.display(), err)))
    }
}

/// Stands in for the native minidump stack-walker (spec §6): always
/// succeeds with an empty `json_dump` rather than actually walking the
/// dump. A real deployment links against Breakpad's or Crashpad's
/// `minidump-stackwalk` here instead.
struct PassthroughStackwalker;

impl Stackwalker for PassthroughStackwalker {
    fn walk(&self, dump_path: &Path) -> Result<Value> {
        log::warn!(
            "PassthroughStackwalker: not actually walking {}, returning an empty json_dump",
            dump_path.display()
        );
        Ok(Value::Object(Map::new()))
    }
}

fn main() -> Result<()> {
    let config = Config::from_env();
    env_logger::Builder::new()
        .filter_level(config.logging_level.as_log_level_filter())
        .init();

    let queue_dir = std::env::var(QUEUE_DIR_ENV_VAR)
        .unwrap_or_else(|_| "./crash-queue".to_string());
    let store_dir =
        std::env::var(STORE_DIR_ENV_VAR).unwrap_or_else(|_| "./crash-store".to_string());

    for dir in [&queue_dir, &store_dir] {
        fs::create_dir_all(dir)
            .map_err(|err| Error::Fetch(format!("creating {}: {}", dir, err)))?;
    }

    log::info!(
        "starting crash-processor worker: queue={} store={} sleep_when_exhausted={}s",
        queue_dir,
        store_dir,
        config.sleep_when_exhausted
    );

    let worklist = Worklist::new(
        FilesystemQueue {
            queue_dir: PathBuf::from(queue_dir),
        },
        config.sleep_when_exhausted,
    );
    let store = FilesystemStore {
        base_dir: PathBuf::from(store_dir),
    };
    let rule_sequence = rules::default_rules(PassthroughStackwalker);

    let mut worker = Worker::new(worklist, store, rule_sequence, false);
    worker.run()
}
