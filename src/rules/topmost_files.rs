// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! [`TopMostFilesRule`] (spec §4.6).

use serde_json::Value;

use crate::crash::Crash;
use crate::rule::{push_note, Rule};
use crate::Result;

/// Sets `processed_crash.topmost_filenames` to the `file` field of the
/// first frame (walking outward from the top of the stack) in the
/// crashing thread that actually carries one, by reading
/// `json_dump.crash_info.crashing_thread` as an index into
/// `json_dump.threads[].frames[]`. `null` (with a processor note) on
/// any lookup failure: a missing symbol file is an expected data gap,
/// not a pipeline error. Mutates `processed_crash` only.
#[derive(Debug, Default)]
pub struct TopMostFilesRule;

impl Rule for TopMostFilesRule {
    fn name(&self) -> &str {
        "TopMostFilesRule"
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        crash
            .processed_crash
            .insert("topmost_filenames".to_string(), Value::Null);

        let Some(json_dump) = crash.processed_crash.get("json_dump") else {
            push_note(crash, "no json_dump available for topmost_filenames");
            return Ok(true);
        };

        let Some(crashing_thread) = json_dump
            .get("crash_info")
            .and_then(|c| c.get("crashing_thread"))
            .and_then(Value::as_u64)
        else {
            push_note(crash, "crashing_thread unavailable for topmost_filenames");
            return Ok(true);
        };

        let Some(frames) = json_dump
            .get("threads")
            .and_then(Value::as_array)
            .and_then(|threads| threads.get(crashing_thread as usize))
            .and_then(|thread| thread.get("frames"))
            .and_then(Value::as_array)
        else {
            push_note(crash, "crashing thread has no frames for topmost_filenames");
            return Ok(true);
        };

        let filename = frames
            .iter()
            .find_map(|frame| frame.get("file").and_then(Value::as_str));

        match filename {
            Some(file) => {
                crash
                    .processed_crash
                    .insert("topmost_filenames".to_string(), Value::String(file.to_string()));
            }
            None => push_note(crash, "no frame in crashing thread carries a file"),
        }

        Ok(true)
    }
}
