// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! [`ThemePrettyNameRule`] (spec §4.6). Must run after
//! [`crate::rules::AddonsRule`], which populates
//! `processed_crash.addons` (spec §4.3 ordering dependency).

use serde_json::Value;

use crate::crash::Crash;
use crate::rule::Rule;
use crate::Result;

/// Known built-in theme add-on ids mapped to their human-readable
/// names, so a signature report reads "Default" rather than a raw
/// extension GUID. A reduced excerpt of Socorro's production
/// conversions table (see DESIGN.md).
const CONVERSIONS: &[(&str, &str)] = &[
    ("{972ce4c6-7e08-4474-a285-3208198ce6fd}", "Default"),
    ("{e0204bb3-9da8-42d3-9424-c7d717759513}", "Fennec Theme"),
    ("{3db00f40-de78-4cc3-af2c-6f0162f8e03e}", "classic/1.0"),
];

fn pretty_name(addon_id: &str) -> Option<&'static str> {
    CONVERSIONS
        .iter()
        .find(|(id, _)| *id == addon_id)
        .map(|(_, name)| *name)
}

/// Rewrites the name half of every `processed_crash.addons` pair whose
/// id is in [`CONVERSIONS`] to its pretty form. Runs only when at least
/// one such pair exists. Mutates `processed_crash` only.
#[derive(Debug, Default)]
pub struct ThemePrettyNameRule;

impl Rule for ThemePrettyNameRule {
    fn name(&self) -> &str {
        "ThemePrettyNameRule"
    }

    fn predicate(&self, crash: &Crash) -> bool {
        addons(crash).iter().any(|pair| {
            pair.get(0)
                .and_then(Value::as_str)
                .map(|id| pretty_name(id).is_some())
                .unwrap_or(false)
        })
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let Some(addons) = crash
            .processed_crash
            .get_mut("addons")
            .and_then(Value::as_array_mut)
        else {
            return Ok(true);
        };

        for pair in addons.iter_mut() {
            let Some(array) = pair.as_array_mut() else {
                continue;
            };
            let Some(id) = array.first().and_then(Value::as_str).map(str::to_string) else {
                continue;
            };
            if let Some(pretty) = pretty_name(&id) {
                array[0] = Value::String(pretty.to_string());
            }
        }

        Ok(true)
    }
}

fn addons(crash: &Crash) -> Vec<Value> {
    crash
        .processed_crash
        .get("addons")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn crash_with_addons(addons: Value) -> Crash {
        let mut crash = Crash::new("abc".to_string(), serde_json::Map::new());
        crash.processed_crash.insert("addons".to_string(), addons);
        crash
    }

    #[test]
    fn test_rewrites_known_theme_to_pretty_name() {
        let mut crash = crash_with_addons(json!([
            ["{972ce4c6-7e08-4474-a285-3208198ce6fd}", "12.0"],
            ["unrelated-addon@example.com", "1.0"]
        ]));
        assert!(ThemePrettyNameRule.apply(&mut crash).unwrap());
        let addons = crash.processed_crash.get("addons").unwrap().as_array().unwrap();
        assert_eq!(addons[0], json!(["Default", "12.0"]));
        assert_eq!(addons[1], json!(["unrelated-addon@example.com", "1.0"]));
    }

    #[test]
    fn test_predicate_false_when_no_known_theme_present() {
        let mut crash = crash_with_addons(json!([["unrelated-addon@example.com", "1.0"]]));
        let before = crash.processed_crash.clone();
        let ran = ThemePrettyNameRule.apply(&mut crash).unwrap();
        assert!(!ran);
        assert_eq!(crash.processed_crash, before);
    }

    #[test]
    fn test_no_addons_key_is_a_no_op() {
        let mut crash = Crash::new("abc".to_string(), serde_json::Map::new());
        let ran = ThemePrettyNameRule.apply(&mut crash).unwrap();
        assert!(!ran);
    }
}
