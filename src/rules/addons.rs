// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! [`AddonsRule`]: parses the submitter-supplied `Add-ons` string into
//! a structured list (spec §4.6).

use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::crash::Crash;
use crate::rule::{push_note, Rule};
use crate::Result;

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Parses `raw_crash."Add-ons"` as a comma-separated list of
/// `name:version` pairs (URL-encoded, as the submitting client
/// percent-encodes arbitrary add-on ids/versions), storing the result
/// under `processed_crash.addons` as a list of `[name, version]` pairs.
/// A pair with no colon gets an empty-string version and a processor
/// note rather than failing the whole rule — malformed individual
/// add-on entries are an expected data gap (spec §7 kind 5), not a
/// pipeline error.
///
/// Also sets `processed_crash.addons_checked` from
/// `raw_crash.EMCheckCompatibility` (case-insensitive `"true"`).
/// Mutates `processed_crash` only.
///
/// Per spec §9's open question, the original Python assigns a local
/// `addons_checked_txt` that is never read; that dead code has no
/// counterpart here.
#[derive(Debug, Default)]
pub struct AddonsRule;

impl Rule for AddonsRule {
    fn name(&self) -> &str {
        "AddonsRule"
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let add_ons = crash
            .raw_crash
            .get("Add-ons")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let mut notes = Vec::new();
        let mut pairs = Vec::new();

        if !add_ons.is_empty() {
            for entry in add_ons.split(',') {
                let entry = entry.trim();
                if entry.is_empty() {
                    continue;
                }
                match entry.split_once(':') {
                    Some((name, version)) => {
                        pairs.push(Value::Array(vec![
                            Value::String(decode(name)),
                            Value::String(decode(version)),
                        ]));
                    }
                    None => {
                        notes.push(format!("add-on \"{}\" is missing a version", entry));
                        pairs.push(Value::Array(vec![
                            Value::String(decode(entry)),
                            Value::String(String::new()),
                        ]));
                    }
                }
            }
        }

        let addons_checked = crash
            .raw_crash
            .get("EMCheckCompatibility")
            .and_then(Value::as_str)
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        crash
            .processed_crash
            .insert("addons".to_string(), Value::Array(pairs));
        crash
            .processed_crash
            .insert("addons_checked".to_string(), Value::Bool(addons_checked));

        for note in notes {
            push_note(crash, note);
        }

        Ok(true)
    }
}
