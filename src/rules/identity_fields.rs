// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The two rules spec §4.3 groups under "Initialisation" that deal
//! with the crash's identifier: [`UuidCorrectionRule`] fixes up
//! `raw_crash`, [`IdentifierRule`] then projects it into
//! `processed_crash`.

use serde_json::Value;

use crate::crash::Crash;
use crate::rule::Rule;
use crate::Result;

/// Writes `raw_crash.uuid = crash_id` when `uuid` is absent from the
/// raw crash. Mutates `raw_crash` (per spec §9's open question on write
/// destination: this rule's whole purpose is repairing raw input before
/// anything downstream reads `raw.uuid`, so raw is the only sensible
/// target). Idempotent: once `uuid` is present, the predicate is false
/// and a second application is a no-op, per spec §8.
#[derive(Debug, Default)]
pub struct UuidCorrectionRule;

impl Rule for UuidCorrectionRule {
    fn name(&self) -> &str {
        "UuidCorrectionRule"
    }

    fn predicate(&self, crash: &Crash) -> bool {
        !crash.raw_crash.contains_key("uuid")
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let crash_id = crash.crash_id.clone();
        crash
            .raw_crash
            .insert("uuid".to_string(), Value::String(crash_id));
        Ok(true)
    }
}

/// Copies `raw_crash.uuid` into `processed_crash.crash_id` and
/// `processed_crash.uuid`. Mutates `processed_crash` only; must run
/// after [`UuidCorrectionRule`] so `raw.uuid` is always present by the
/// time this reads it (spec §4.3 ordering dependency).
#[derive(Debug, Default)]
pub struct IdentifierRule;

impl Rule for IdentifierRule {
    fn name(&self) -> &str {
        "IdentifierRule"
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let uuid = crash
            .raw_crash
            .get("uuid")
            .cloned()
            .unwrap_or(Value::String(crash.crash_id.clone()));
        crash
            .processed_crash
            .insert("crash_id".to_string(), uuid.clone());
        crash.processed_crash.insert("uuid".to_string(), uuid);
        Ok(true)
    }
}
