// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Raw→processed projections of submitter-facing metadata (spec §4.6):
//! [`UserDataRule`] (URL/comments/email) and [`EnvironmentRule`]
//! (submitter-supplied notes).

use serde_json::Value;

use crate::crash::Crash;
use crate::rule::Rule;
use crate::Result;

/// Copies `URL`, `Comments`, `Email` from `raw_crash` to
/// `processed_crash.{url, user_comments, email}` and sets
/// `processed_crash.user_id = ""` (Socorro never accepted a real user
/// id from the submitter; this field exists only so the schema matches
/// what other authenticated-user-tracking systems expect). Mutates
/// `processed_crash` only.
#[derive(Debug, Default)]
pub struct UserDataRule;

impl Rule for UserDataRule {
    fn name(&self) -> &str {
        "UserDataRule"
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let url = crash.raw_crash.get("URL").cloned().unwrap_or(Value::Null);
        let comments = crash.raw_crash.get("Comments").cloned().unwrap_or(Value::Null);
        let email = crash.raw_crash.get("Email").cloned().unwrap_or(Value::Null);

        crash.processed_crash.insert("url".to_string(), url);
        crash.processed_crash.insert("user_comments".to_string(), comments);
        crash.processed_crash.insert("email".to_string(), email);
        crash
            .processed_crash
            .insert("user_id".to_string(), Value::String(String::new()));

        Ok(true)
    }
}

/// Copies `raw_crash.Notes` (default `""`) to
/// `processed_crash.app_notes`. Mutates `processed_crash` only.
#[derive(Debug, Default)]
pub struct EnvironmentRule;

impl Rule for EnvironmentRule {
    fn name(&self) -> &str {
        "EnvironmentRule"
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let notes = crash
            .raw_crash
            .get("Notes")
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()));
        crash.processed_crash.insert("app_notes".to_string(), notes);
        Ok(true)
    }
}
