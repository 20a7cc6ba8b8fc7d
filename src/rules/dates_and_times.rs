// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! [`DatesAndTimesRule`]: the densest rule in the library (spec §4.6),
//! deriving every timestamp `processed_crash` carries from whatever
//! subset of the raw submission actually parses.

use chrono::TimeZone;
use serde_json::Value;

use crate::crash::Crash;
use crate::crash_id;
use crate::rule::{push_note, Rule};
use crate::time_util;
use crate::Result;

fn parse_epoch_seconds(s: &str) -> Option<i64> {
    s.parse::<i64>().ok()
}

/// Derives `processed_crash.{submitted_timestamp, date_processed,
/// crash_time, startupTime, installTime, install_age, uptime,
/// last_crash}` from whatever subset of `raw_crash` is present,
/// recording a processor note at each fallback step so a reviewer can
/// tell which source actually supplied a given timestamp. Mutates
/// `processed_crash` only.
#[derive(Debug, Default)]
pub struct DatesAndTimesRule;

impl Rule for DatesAndTimesRule {
    fn name(&self) -> &str {
        "DatesAndTimesRule"
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let submitted_timestamp = crash
            .raw_crash
            .get("submitted_timestamp")
            .and_then(Value::as_str)
            .and_then(|s| time_util::parse_iso8601(s).ok())
            .or_else(|| {
                crash
                    .raw_crash
                    .get("timestamp")
                    .and_then(Value::as_str)
                    .and_then(|s| time_util::parse_iso8601(s).ok())
            })
            .unwrap_or_else(|| {
                crash_id::date_from_crash_id(&crash.crash_id)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|ndt| chrono::Utc.from_utc_datetime(&ndt))
                    .unwrap_or_else(time_util::utc_now)
            });

        crash.processed_crash.insert(
            "submitted_timestamp".to_string(),
            Value::String(submitted_timestamp.to_rfc3339()),
        );
        crash.processed_crash.insert(
            "date_processed".to_string(),
            Value::String(submitted_timestamp.to_rfc3339()),
        );

        let crash_time = if let Some(raw) = crash.raw_crash.get("CrashTime").and_then(Value::as_str) {
            let head = raw.chars().take(10).collect::<String>();
            match parse_epoch_seconds(&head) {
                Some(v) => Some(v),
                None => {
                    push_note(crash, "unable to parse CrashTime, falling back to timestamp");
                    fallback_timestamp(crash)
                }
            }
        } else {
            push_note(crash, "CrashTime missing, falling back to timestamp");
            fallback_timestamp(crash)
        };
        let crash_time = crash_time.unwrap_or_else(|| {
            push_note(crash, "timestamp also unavailable, defaulting crash_time to 0");
            0
        });
        crash
            .processed_crash
            .insert("crash_time".to_string(), Value::from(crash_time));

        let startup_time = crash
            .raw_crash
            .get("StartupTime")
            .and_then(Value::as_str)
            .and_then(parse_epoch_seconds)
            .unwrap_or(crash_time);
        crash
            .processed_crash
            .insert("startupTime".to_string(), Value::from(startup_time));

        let install_time = crash
            .raw_crash
            .get("InstallTime")
            .and_then(Value::as_str)
            .and_then(parse_epoch_seconds)
            .unwrap_or(startup_time);
        crash
            .processed_crash
            .insert("installTime".to_string(), Value::from(install_time));

        crash.processed_crash.insert(
            "install_age".to_string(),
            Value::from(crash_time - install_time),
        );
        crash.processed_crash.insert(
            "uptime".to_string(),
            Value::from((crash_time - startup_time).max(0)),
        );

        let last_crash = match crash.raw_crash.get("SecondsSinceLastCrash").and_then(Value::as_str) {
            Some(raw) => match raw.parse::<i128>() {
                Ok(value) if value > i64::MAX as i128 => {
                    push_note(crash, "SecondsSinceLastCrash exceeds the platform's max integer");
                    None
                }
                Ok(value) => Some(value as i64),
                Err(_) => {
                    push_note(crash, "unable to parse SecondsSinceLastCrash");
                    None
                }
            },
            None => None,
        };
        crash.processed_crash.insert(
            "last_crash".to_string(),
            last_crash.map(Value::from).unwrap_or(Value::Null),
        );

        Ok(true)
    }
}

fn fallback_timestamp(crash: &Crash) -> Option<i64> {
    crash
        .raw_crash
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|s| time_util::parse_iso8601(s).ok())
        .map(|dt| dt.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn raw_s1() -> Map<String, Value> {
        let mut raw = Map::new();
        raw.insert(
            "submitted_timestamp".to_string(),
            json!("2012-05-08T23:26:33.454482+00:00"),
        );
        raw.insert("CrashTime".to_string(), json!("1336519554"));
        raw.insert("StartupTime".to_string(), json!("1336499438"));
        raw.insert("InstallTime".to_string(), json!("1335439892"));
        raw.insert("SecondsSinceLastCrash".to_string(), json!("86985"));
        raw
    }

    #[test]
    fn test_scenario_s1_dates_and_times() {
        let mut crash = Crash::new("abc".to_string(), raw_s1());
        DatesAndTimesRule.apply(&mut crash).unwrap();

        assert_eq!(crash.processed_crash.get("crash_time").unwrap(), &json!(1336519554));
        assert_eq!(crash.processed_crash.get("install_age").unwrap(), &json!(1079662));
        assert_eq!(crash.processed_crash.get("uptime").unwrap(), &json!(20116));
        assert_eq!(crash.processed_crash.get("last_crash").unwrap(), &json!(86985));
        assert!(crash.processor_notes.is_empty());
    }

    #[test]
    fn test_crash_time_falls_back_to_crash_id_date_when_missing() {
        // 2014-05-04 encoded in the crash id.
        let crash_id = "00000000-0000-0000-0000-000002140504";
        let mut crash = Crash::new(crash_id.to_string(), Map::new());
        DatesAndTimesRule.apply(&mut crash).unwrap();
        // No CrashTime/timestamp at all: falls all the way to 0.
        assert_eq!(crash.processed_crash.get("crash_time").unwrap(), &json!(0));
        assert!(!crash.processor_notes.is_empty());
    }

    #[test]
    fn test_startup_and_install_time_default_chain() {
        let mut raw = Map::new();
        raw.insert("CrashTime".to_string(), json!("1000"));
        let mut crash = Crash::new("abc".to_string(), raw);
        DatesAndTimesRule.apply(&mut crash).unwrap();
        assert_eq!(crash.processed_crash.get("startupTime").unwrap(), &json!(1000));
        assert_eq!(crash.processed_crash.get("installTime").unwrap(), &json!(1000));
        assert_eq!(crash.processed_crash.get("uptime").unwrap(), &json!(0));
    }

    #[test]
    fn test_seconds_since_last_crash_above_ceiling_becomes_null_with_note() {
        let mut raw = Map::new();
        raw.insert(
            "SecondsSinceLastCrash".to_string(),
            json!("999999999999999999999999"),
        );
        let mut crash = Crash::new("abc".to_string(), raw);
        DatesAndTimesRule.apply(&mut crash).unwrap();
        assert_eq!(crash.processed_crash.get("last_crash").unwrap(), &Value::Null);
        assert!(crash
            .processor_notes
            .iter()
            .any(|n| n.contains("SecondsSinceLastCrash")));
    }
}
