// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

pub mod config;
pub mod crash;
pub mod crash_id;
pub mod pipeline;
pub mod rule;
pub mod rules;
pub mod stackwalker;
pub mod storage;
pub mod time_util;
pub mod worker;
pub mod worklist;

pub use config::Config;
pub use crash::Crash;
pub use pipeline::Pipeline;
pub use rule::Rule;
pub use storage::ObjectStore;
pub use worker::Worker;
pub use worklist::{AckContext, Source, WorkItem, Worklist};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("fetch failed for crash {0}")]
    Fetch(String),

    #[error("stack-walker failed: {0}")]
    Stackwalker(String),

    #[error("rule {rule} failed: {message}")]
    Rule { rule: String, message: String },

    #[error("save failed for crash {0}")]
    Save(String),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("invalid crash id: {0}")]
    InvalidCrashId(String),

    #[error("acknowledgement failed: {0}")]
    Ack(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
