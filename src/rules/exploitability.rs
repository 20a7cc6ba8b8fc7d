// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! [`ExploitabilityRule`] (spec §4.6).

use serde_json::Value;

use crate::crash::Crash;
use crate::rule::{push_note, Rule};
use crate::Result;

/// Sets `processed_crash.exploitability` from
/// `json_dump.sensitive.exploitability`. Absence is an expected data
/// gap (the stack-walker only computes this when it can): falls back
/// to `"unknown"` and records a processor note rather than failing.
/// Mutates `processed_crash` only.
#[derive(Debug, Default)]
pub struct ExploitabilityRule;

impl Rule for ExploitabilityRule {
    fn name(&self) -> &str {
        "ExploitabilityRule"
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let exploitability = crash
            .processed_crash
            .get("json_dump")
            .and_then(|d| d.get("sensitive"))
            .and_then(|s| s.get("exploitability"))
            .and_then(Value::as_str)
            .map(str::to_string);

        match exploitability {
            Some(value) => {
                crash
                    .processed_crash
                    .insert("exploitability".to_string(), Value::String(value));
            }
            None => {
                push_note(crash, "exploitability unavailable from json_dump");
                crash.processed_crash.insert(
                    "exploitability".to_string(),
                    Value::String("unknown".to_string()),
                );
            }
        }

        Ok(true)
    }
}
