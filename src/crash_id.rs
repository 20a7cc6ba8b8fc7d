// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Encodes and decodes the date and throttle flag carried inside a crash id.
//!
//! A crash id is 36 characters, shaped like a UUID, with the date and
//! throttle instruction packed into its final 7 characters:
//!
//! ```text
//! de1bb258-cbbf-4589-a673-34f800160918
//!                              ^^^^^^^
//!                              ||____|
//!                              |  yymmdd
//!                              |
//!                              throttle flag
//! ```

use chrono::NaiveDate;

use crate::{Error, Result};

const CRASH_ID_LEN: usize = 36;
const CENTURY: &str = "20";

fn check_len(crash_id: &str) -> Result<()> {
    if crash_id.chars().count() != CRASH_ID_LEN {
        return Err(Error::InvalidCrashId(format!(
            "expected a 36-character crash id, got {} characters: {}",
            crash_id.chars().count(),
            crash_id
        )));
    }
    Ok(())
}

/// Returns the throttle flag (0 = accept, 1 = defer) encoded at offset
/// `length - 7`.
pub fn throttle_flag(crash_id: &str) -> Result<u8> {
    check_len(crash_id)?;
    let digit = crash_id
        .chars()
        .nth(crash_id.len() - 7)
        .ok_or_else(|| Error::InvalidCrashId(crash_id.to_string()))?;
    digit
        .to_digit(10)
        .map(|d| d as u8)
        .ok_or_else(|| Error::InvalidCrashId(crash_id.to_string()))
}

/// Returns the date encoded in the last 6 characters (`yymmdd`), with the
/// century fixed to `"20"` as spec'd.
pub fn date_from_crash_id(crash_id: &str) -> Result<NaiveDate> {
    check_len(crash_id)?;
    let yymmdd = &crash_id[crash_id.len() - 6..];
    let full = format!("{}{}", CENTURY, yymmdd);

    let year: i32 = full[0..4]
        .parse()
        .map_err(|_| Error::InvalidCrashId(crash_id.to_string()))?;
    let month: u32 = full[4..6]
        .parse()
        .map_err(|_| Error::InvalidCrashId(crash_id.to_string()))?;
    let day: u32 = full[6..8]
        .parse()
        .map_err(|_| Error::InvalidCrashId(crash_id.to_string()))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| Error::InvalidCrashId(crash_id.to_string()))
}

/// Builds a crash id from a 29-character prefix (the UUID-shaped part minus
/// the throttle/date suffix), a throttle flag, and a date. Mirrors
/// `processor.util.create_crash_id`, minus random UUID generation: callers
/// supply the prefix (e.g. from a real UUID) since this crate does not
/// mint new crash ids in production, only in tests.
pub fn build_crash_id(prefix: &str, throttle: u8, date: NaiveDate) -> String {
    format!(
        "{}{}{:02}{:02}{:02}",
        prefix,
        throttle,
        date.format("%y").to_string().parse::<u32>().unwrap_or(0),
        date.format("%m").to_string().parse::<u32>().unwrap_or(0),
        date.format("%d").to_string().parse::<u32>().unwrap_or(0)
    )
}
