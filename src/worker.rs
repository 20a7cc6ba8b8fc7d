// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The top-level loop: pull a work item, fetch its crash, run it
//! through the pipeline, save it, acknowledge it. Mirrors
//! `jansky.app.Processor.run`/`run_one`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::crash::Crash;
use crate::rule::Rule;
use crate::storage::ObjectStore;
use crate::worklist::{Source, WorkItem, Worklist};
use crate::Error;
use crate::Result;

pub struct Worker<S: Source, O: ObjectStore> {
    worklist: Worklist<S>,
    store: O,
    rules: Vec<Box<dyn Rule + Send + Sync>>,
    /// Suppression policy applied to every rule in `rules`. `true`
    /// matches production: one bad rule shouldn't sink the whole
    /// crash. Tests typically run with `false` to surface failures.
    suppress: bool,
    cancelled: Arc<AtomicBool>,
    /// Upper bound on how long the pipeline may run for a single
    /// crash, checked between rules rather than preemptively — a rule
    /// already in progress always finishes.
    per_crash_deadline: Option<Duration>,
}

impl<S: Source, O: ObjectStore> Worker<S, O> {
    pub fn new(
        worklist: Worklist<S>,
        store: O,
        rules: Vec<Box<dyn Rule + Send + Sync>>,
        suppress: bool,
    ) -> Self {
        Worker {
            worklist,
            store,
            rules,
            suppress,
            cancelled: Arc::new(AtomicBool::new(false)),
            per_crash_deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.per_crash_deadline = Some(deadline);
        self
    }

    /// A handle callers can use to request a clean shutdown. Checked
    /// only between work items, never in the middle of processing one,
    /// so a crash already being processed always finishes.
    pub fn cancellation_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Runs until the worklist is exhausted (and configured not to
    /// retry) or cancellation is requested.
    pub fn run(&mut self) -> Result<()> {
        while !self.cancelled.load(Ordering::Relaxed) {
            let item = match self.worklist.next_item()? {
                Some(item) => item,
                None => break,
            };
            self.run_one(item);
        }
        Ok(())
    }

    /// Processes a single work item end to end. Errors are logged
    /// rather than propagated: one bad crash must never take down the
    /// worker loop.
    fn run_one(&self, item: WorkItem) {
        let crash_id = item.crash_id.clone();
        match self.process(&crash_id) {
            Ok(()) => {
                if let Err(err) = item.ack.ack() {
                    log::warn!("failed to ack {}: {}", crash_id, err);
                }
            }
            Err(err) => {
                log::error!("failed to process {}: {}", crash_id, err);
                if let Err(ack_err) = item.ack.nack() {
                    log::warn!("failed to nack {}: {}", crash_id, ack_err);
                }
            }
        }
    }

    /// Runs `fetch` → `pipeline` → `save` for a single crash id, with
    /// suppression off (spec §4.5 mandates the canonical worklist
    /// sequence always runs unsuppressed). The per-crash deadline, when
    /// set, is checked between rules rather than preemptively: a rule
    /// already running always finishes (spec §5).
    fn process(&self, crash_id: &str) -> Result<()> {
        let mut crash = Crash::fetch(crash_id, &self.store)?;
        let deadline = self.per_crash_deadline.map(|d| Instant::now() + d);

        for rule in &self.rules {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(Error::Rule {
                        rule: "deadline".to_string(),
                        message: format!("per-crash deadline exceeded for {}", crash_id),
                    });
                }
            }
            crash.apply(rule.as_ref(), self.suppress)?;
        }

        crash.save(&self.store)
    }
}
