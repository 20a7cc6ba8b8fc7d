// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! ISO-8601 parsing/formatting helpers shared by several rules, with UTC
//! coercion for naive inputs and a weekly-partition key used by storage
//! adapters that shard processed crashes by week.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};

use crate::{Error, Result};

/// Parses an ISO-8601 date or datetime string, coercing naive (no offset)
/// values to UTC rather than local time. Accepts bare dates (`2012-01-10`)
/// as midnight UTC, matching `processor.util.string_to_datetime`.
pub fn parse_iso8601(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|ndt| Utc.from_utc_datetime(&ndt))
            .ok_or_else(|| Error::InvalidCrashId(s.to_string()));
    }

    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(Error::InvalidCrashId(format!(
        "not a parsable ISO-8601 date/datetime: {}",
        s
    )))
}

/// Returns the UTC "now", isolated behind a function so rules never call
/// `Utc::now()` directly (keeps `started_datetime`/`completed_datetime`
/// mockable in tests without a clock-injection framework).
pub fn utc_now() -> DateTime<Utc> {
    Utc::now()
}

/// Returns the Monday that starts the week containing `date`, formatted
/// `YYYYMMDD`, matching `processor.util.datestring_to_weekly_partition`.
pub fn weekly_partition_key(date: NaiveDate) -> String {
    let days_since_monday = date.weekday().num_days_from_monday() as i64;
    let monday = date - chrono::Duration::days(days_since_monday);
    monday.format("%Y%m%d").to_string()
}

/// As [`weekly_partition_key`] but parses the date from a `YYYY-MM-DD` string.
pub fn weekly_partition_key_from_str(date_str: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| Error::InvalidCrashId(date_str.to_string()))?;
    Ok(weekly_partition_key(date))
}

#[allow(dead_code)]
fn is_monday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Mon
}
