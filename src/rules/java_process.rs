// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Two small raw→processed copy rules from spec §4.6 that share the
//! same shape: default to `null`, note nothing, never fail.

use serde_json::Value;

use crate::crash::Crash;
use crate::rule::Rule;
use crate::Result;

/// Copies `raw_crash.JavaStackTrace` (default `null`) to
/// `processed_crash.java_stack_trace`. Also writes the default back
/// into `raw_crash` when absent, so a later reprocessing pass and any
/// code that inspects `raw_crash` directly see a consistent key,
/// matching `processor.rules.general.JavaProcessRule`. Mutates both
/// `raw_crash` and `processed_crash`.
#[derive(Debug, Default)]
pub struct JavaProcessRule;

impl Rule for JavaProcessRule {
    fn name(&self) -> &str {
        "JavaProcessRule"
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let trace = crash.raw_crash.get("JavaStackTrace").cloned();
        match trace {
            Some(value) => {
                crash
                    .processed_crash
                    .insert("java_stack_trace".to_string(), value);
            }
            None => {
                crash
                    .raw_crash
                    .insert("JavaStackTrace".to_string(), Value::Null);
                crash
                    .processed_crash
                    .insert("java_stack_trace".to_string(), Value::Null);
            }
        }
        Ok(true)
    }
}

/// Copies `raw_crash.Winsock_LSP` (default `null`) to
/// `processed_crash.winsock_lsp`. Mutates `processed_crash` only.
#[derive(Debug, Default)]
pub struct WinsockLspRule;

impl Rule for WinsockLspRule {
    fn name(&self) -> &str {
        "WinsockLspRule"
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let lsp = crash.raw_crash.get("Winsock_LSP").cloned().unwrap_or(Value::Null);
        crash.processed_crash.insert("winsock_lsp".to_string(), lsp);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    #[test]
    fn test_java_process_rule_copies_present_trace() {
        let mut raw = Map::new();
        raw.insert("JavaStackTrace".to_string(), json!("at com.example.Foo"));
        let mut crash = Crash::new("abc".to_string(), raw);
        JavaProcessRule.apply(&mut crash).unwrap();
        assert_eq!(
            crash.processed_crash.get("java_stack_trace").unwrap(),
            "at com.example.Foo"
        );
    }

    #[test]
    fn test_java_process_rule_defaults_and_backfills_raw() {
        let mut crash = Crash::new("abc".to_string(), Map::new());
        JavaProcessRule.apply(&mut crash).unwrap();
        assert_eq!(crash.processed_crash.get("java_stack_trace").unwrap(), &Value::Null);
        assert_eq!(crash.raw_crash.get("JavaStackTrace").unwrap(), &Value::Null);
    }

    #[test]
    fn test_winsock_lsp_rule_copies_present_value() {
        let mut raw = Map::new();
        raw.insert("Winsock_LSP".to_string(), json!("MSAFD Tcpip"));
        let mut crash = Crash::new("abc".to_string(), raw);
        WinsockLspRule.apply(&mut crash).unwrap();
        assert_eq!(crash.processed_crash.get("winsock_lsp").unwrap(), "MSAFD Tcpip");
    }

    #[test]
    fn test_winsock_lsp_rule_defaults_to_null() {
        let mut crash = Crash::new("abc".to_string(), Map::new());
        WinsockLspRule.apply(&mut crash).unwrap();
        assert_eq!(crash.processed_crash.get("winsock_lsp").unwrap(), &Value::Null);
    }
}
