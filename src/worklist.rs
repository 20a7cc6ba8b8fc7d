// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pulls work items from a queue, sleeping and retrying when the queue
//! is temporarily empty instead of treating exhaustion as an error.
//! Mirrors `jansky.app.Worklist`.

use std::thread;
use std::time::Duration;

use crate::Result;

/// Acknowledges or rejects a [`WorkItem`] once the worker has decided
/// its outcome. Exactly one of `ack`/`nack` is called per item.
pub trait AckContext {
    /// Confirms the item was processed; the queue may delete/advance it.
    fn ack(&self) -> Result<()>;

    /// Signals the item was not processed; the queue may redeliver it.
    fn nack(&self) -> Result<()>;
}

/// One unit of work: a crash id to process, plus the means to
/// acknowledge it once processing finishes.
pub struct WorkItem {
    pub crash_id: String,
    pub ack: Box<dyn AckContext + Send>,
}

impl WorkItem {
    pub fn new(crash_id: impl Into<String>, ack: Box<dyn AckContext + Send>) -> Self {
        WorkItem {
            crash_id: crash_id.into(),
            ack,
        }
    }
}

/// A queue-like source of work items. Implementations decide their own
/// polling protocol (long-poll, short-poll-and-sleep, etc.); `poll`
/// just needs to return `Ok(None)` rather than block forever when
/// nothing is available, so [`Worklist`] can own the backoff policy.
pub trait Source {
    fn poll(&mut self) -> Result<Option<WorkItem>>;
}

/// Wraps a [`Source`], turning "nothing available right now" into a
/// sleep-and-retry instead of exhausting the iterator. Set
/// `sleep_when_exhausted <= 0` to make exhaustion terminal instead,
/// which is useful for run-until-empty batch jobs and for tests.
pub struct Worklist<S: Source> {
    source: S,
    sleep_when_exhausted: i64,
}

impl<S: Source> Worklist<S> {
    pub fn new(source: S, sleep_when_exhausted: i64) -> Self {
        Worklist {
            source,
            sleep_when_exhausted,
        }
    }

    /// Pulls the next item, sleeping and retrying while the source is
    /// exhausted. Returns `Ok(None)` only when `sleep_when_exhausted <=
    /// 0` and the source is empty, signaling the caller should stop.
    pub fn next_item(&mut self) -> Result<Option<WorkItem>> {
        loop {
            match self.source.poll()? {
                Some(item) => return Ok(Some(item)),
                None if self.sleep_when_exhausted > 0 => {
                    log::debug!(
                        "worklist exhausted, sleeping {}s",
                        self.sleep_when_exhausted
                    );
                    thread::sleep(Duration::from_secs(self.sleep_when_exhausted as u64));
                }
                None => return Ok(None),
            }
        }
    }
}
