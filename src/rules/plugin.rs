// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! [`PluginRule`]: plugin-hang classification (spec §4.6).

use serde_json::Value;

use crate::crash::Crash;
use crate::rule::Rule;
use crate::Result;

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty() && s != "0",
        Some(_) => true,
    }
}

/// Derives `processed_crash.{hangid, hang_type, process_type}` and, for
/// plugin-process crashes, copies the plugin's own identity fields.
/// Mutates `processed_crash` only.
///
/// `hang_type` follows the precedence spec §4.6 describes: `Hang` (if
/// truthy, this is a browser-side hang, `1`) takes priority over a
/// present `HangID`/derived `hangid` (a plugin-side hang, `-1`), which
/// in turn takes priority over `0` (not a hang).
///
/// Per spec §9's open question, the original Python compares
/// `process_type` against the literal `"plugin"` with `is not` (an
/// identity comparison the spec source itself flags as likely a bug).
/// This implementation uses string equality instead.
#[derive(Debug, Default)]
pub struct PluginRule;

impl Rule for PluginRule {
    fn name(&self) -> &str {
        "PluginRule"
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let raw_hangid = crash.raw_crash.get("HangID").cloned();
        let plugin_hang = is_truthy(crash.raw_crash.get("PluginHang"));
        let uuid = crash
            .raw_crash
            .get("uuid")
            .and_then(Value::as_str)
            .unwrap_or(&crash.crash_id)
            .to_string();

        let hangid = if plugin_hang {
            Some(Value::String(format!("fake-{}", uuid)))
        } else {
            raw_hangid.clone()
        };

        let hang = is_truthy(crash.raw_crash.get("Hang"));
        let hang_type = if hang {
            1
        } else if hangid.is_some() {
            -1
        } else {
            0
        };

        crash
            .processed_crash
            .insert("hangid".to_string(), hangid.unwrap_or(Value::Null));
        crash
            .processed_crash
            .insert("hang_type".to_string(), Value::from(hang_type));

        let process_type = crash
            .raw_crash
            .get("ProcessType")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        crash
            .processed_crash
            .insert("process_type".to_string(), Value::String(process_type.clone()));

        if process_type == "plugin" {
            for (raw_key, processed_key) in [
                ("PluginFilename", "plugin_filename"),
                ("PluginName", "plugin_name"),
                ("PluginVersion", "plugin_version"),
            ] {
                let value = crash.raw_crash.get(raw_key).cloned().unwrap_or(Value::Null);
                crash.processed_crash.insert(processed_key.to_string(), value);
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    #[test]
    fn test_plugin_hang_scenario_s3() {
        let mut raw = Map::new();
        raw.insert("PluginHang".to_string(), json!(1));
        raw.insert("Hang".to_string(), json!(0));
        raw.insert("ProcessType".to_string(), json!("plugin"));
        raw.insert(
            "uuid".to_string(),
            json!("00000000-0000-0000-0000-000002140504"),
        );
        raw.insert("PluginFilename".to_string(), json!("npswf32.dll"));
        raw.insert("PluginName".to_string(), json!("Shockwave Flash"));
        raw.insert("PluginVersion".to_string(), json!("11.2.1.1"));
        let mut crash = Crash::new("00000000-0000-0000-0000-000002140504".to_string(), raw);

        PluginRule.apply(&mut crash).unwrap();

        assert_eq!(
            crash.processed_crash.get("hangid").unwrap(),
            "fake-00000000-0000-0000-0000-000002140504"
        );
        assert_eq!(crash.processed_crash.get("hang_type").unwrap(), &json!(-1));
        assert_eq!(crash.processed_crash.get("process_type").unwrap(), "plugin");
        assert_eq!(crash.processed_crash.get("plugin_filename").unwrap(), "npswf32.dll");
        assert_eq!(crash.processed_crash.get("plugin_name").unwrap(), "Shockwave Flash");
        assert_eq!(crash.processed_crash.get("plugin_version").unwrap(), "11.2.1.1");
    }

    #[test]
    fn test_browser_hang_wins_over_hangid() {
        let mut raw = Map::new();
        raw.insert("Hang".to_string(), json!(1));
        raw.insert("HangID".to_string(), json!("some-hang-id"));
        let mut crash = Crash::new("abc".to_string(), raw);
        PluginRule.apply(&mut crash).unwrap();
        assert_eq!(crash.processed_crash.get("hang_type").unwrap(), &json!(1));
    }

    #[test]
    fn test_no_hang_signals_at_all_is_normal() {
        let mut crash = Crash::new("abc".to_string(), Map::new());
        PluginRule.apply(&mut crash).unwrap();
        assert_eq!(crash.processed_crash.get("hang_type").unwrap(), &json!(0));
        assert_eq!(crash.processed_crash.get("hangid").unwrap(), &Value::Null);
    }

    #[test]
    fn test_non_plugin_process_type_does_not_copy_plugin_fields() {
        let mut raw = Map::new();
        raw.insert("ProcessType".to_string(), json!("content"));
        raw.insert("PluginName".to_string(), json!("should not appear"));
        let mut crash = Crash::new("abc".to_string(), raw);
        PluginRule.apply(&mut crash).unwrap();
        assert_eq!(crash.processed_crash.get("process_type").unwrap(), "content");
        assert!(!crash.processed_crash.contains_key("plugin_name"));
    }
}
