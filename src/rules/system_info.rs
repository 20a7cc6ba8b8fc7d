// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! [`CpuInfoRule`] and [`OsInfoRule`]: post-processing rules that read
//! the native stack-walker's `json_dump.system_info` (spec §4.6).

use serde_json::Value;

use crate::crash::Crash;
use crate::rule::Rule;
use crate::Result;

fn system_info(crash: &Crash) -> Option<&serde_json::Map<String, Value>> {
    crash
        .processed_crash
        .get("json_dump")?
        .get("system_info")?
        .as_object()
}

/// Sets `processed_crash.cpu_info` to `"<cpu_info> | <cpu_count>"`,
/// falling back to just `<cpu_info>` when `cpu_count` is absent, and
/// `processed_crash.cpu_name` to `system_info.cpu_arch`. Reads from
/// `json_dump`, written earlier in the pipeline by the stack-walker
/// stage; mutates `processed_crash` only.
#[derive(Debug, Default)]
pub struct CpuInfoRule;

impl Rule for CpuInfoRule {
    fn name(&self) -> &str {
        "CpuInfoRule"
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let info = system_info(crash);
        let cpu_info = info.and_then(|m| m.get("cpu_info")).and_then(Value::as_str);
        let cpu_count = info.and_then(|m| m.get("cpu_count"));
        let cpu_arch = info.and_then(|m| m.get("cpu_arch")).cloned().unwrap_or(Value::Null);

        let cpu_info_value = match (cpu_info, cpu_count) {
            (Some(info), Some(count)) => format!("{} | {}", info, count),
            (Some(info), None) => info.to_string(),
            (None, _) => String::new(),
        };

        crash
            .processed_crash
            .insert("cpu_info".to_string(), Value::String(cpu_info_value));
        crash.processed_crash.insert("cpu_name".to_string(), cpu_arch);

        Ok(true)
    }
}

/// Sets `processed_crash.{os_name, os_version}` from
/// `system_info.{os, os_ver}`, trimmed of surrounding whitespace.
/// Mutates `processed_crash` only.
#[derive(Debug, Default)]
pub struct OsInfoRule;

impl Rule for OsInfoRule {
    fn name(&self) -> &str {
        "OsInfoRule"
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let info = system_info(crash);
        let os_name = info
            .and_then(|m| m.get("os"))
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        let os_version = info
            .and_then(|m| m.get("os_ver"))
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        crash
            .processed_crash
            .insert("os_name".to_string(), Value::String(os_name));
        crash
            .processed_crash
            .insert("os_version".to_string(), Value::String(os_version));

        Ok(true)
    }
}
