// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The "raw rewrites" stage (spec §4.3 step 2): rules that correct or
//! overwrite `raw_crash` fields before anything reads them downstream.
//! All five rules here write to `raw_crash`, never `processed_crash`
//! (spec §9's open question on write destination).

use serde_json::Value;

use crate::crash::Crash;
use crate::rule::Rule;
use crate::{Error, Result};

/// Known product ids that Socorro rewrites to a different
/// `ProductName`. The historical entry below reflects a real quirk in
/// Mozilla's crash-ingestion pipeline: early Firefox-for-Android
/// ("Fennec") builds reported the desktop Firefox product id, and
/// `ProductRewrite` corrected the name so downstream aggregation didn't
/// lump mobile and desktop crashes together.
const PRODUCT_ID_TO_NAME: &[(&str, &str)] = &[
    ("{ec8030f7-c20a-464f-9b0e-13a3a9e97384}", "FennecAndroid"),
    ("{3550f703-e582-4d05-9a08-453d09bdfdc6}", "Thunderbird"),
    ("{92650c4d-4b8e-4d2a-b7eb-24ecf4f6b63a}", "SeaMonkey"),
];

fn rewritten_name(product_id: &str) -> Option<&'static str> {
    PRODUCT_ID_TO_NAME
        .iter()
        .find(|(id, _)| *id == product_id)
        .map(|(_, name)| *name)
}

/// Overwrites `raw_crash.ProductName` when `raw_crash.ProductID` is one
/// of the known ids that map to a different canonical product name.
/// Must run before [`crate::rules::ProductRule`], which reads
/// `ProductName` afterwards.
#[derive(Debug, Default)]
pub struct ProductRewriteRule;

impl Rule for ProductRewriteRule {
    fn name(&self) -> &str {
        "ProductRewriteRule"
    }

    fn predicate(&self, crash: &Crash) -> bool {
        crash
            .raw_crash
            .get("ProductID")
            .and_then(Value::as_str)
            .map(rewritten_name)
            .map(|mapped| mapped.is_some())
            .unwrap_or(false)
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let product_id = crash
            .raw_crash
            .get("ProductID")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if let Some(name) = rewritten_name(product_id) {
            crash
                .raw_crash
                .insert("ProductName".to_string(), Value::String(name.to_string()));
        }
        Ok(true)
    }
}

/// Appends `"esr"` to `raw_crash.Version` when
/// `raw_crash.ReleaseChannel == "esr"`. Must run before anything
/// reading `Version` (spec §4.3 ordering dependency). Fails with
/// [`Error::MissingField`] if `Version` is absent on an esr release,
/// per spec §8 scenario S2.
#[derive(Debug, Default)]
pub struct EsrVersionRewriteRule;

impl Rule for EsrVersionRewriteRule {
    fn name(&self) -> &str {
        "EsrVersionRewriteRule"
    }

    fn predicate(&self, crash: &Crash) -> bool {
        crash.raw_crash.get("ReleaseChannel").and_then(Value::as_str) == Some("esr")
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let version = crash
            .raw_crash
            .get("Version")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                Error::MissingField("\"Version\" missing from esr release raw_crash".to_string())
            })?;
        crash
            .raw_crash
            .insert("Version".to_string(), Value::String(format!("{}esr", version)));
        Ok(true)
    }
}

/// Overwrites `raw_crash.URL` with `raw_crash.PluginContentURL` when
/// present, so plugin-hang crashes report the content page the plugin
/// was embedded in rather than whatever `URL` the submitter sent.
#[derive(Debug, Default)]
pub struct PluginContentUrlRule;

impl Rule for PluginContentUrlRule {
    fn name(&self) -> &str {
        "PluginContentUrlRule"
    }

    fn predicate(&self, crash: &Crash) -> bool {
        crash.raw_crash.contains_key("PluginContentURL")
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let url = crash.raw_crash.get("PluginContentURL").cloned().unwrap();
        crash.raw_crash.insert("URL".to_string(), url);
        Ok(true)
    }
}

/// Overwrites `raw_crash.Comments` with `raw_crash.PluginUserComment`
/// when present, the plugin-hang analogue of [`PluginContentUrlRule`].
#[derive(Debug, Default)]
pub struct PluginUserCommentRule;

impl Rule for PluginUserCommentRule {
    fn name(&self) -> &str {
        "PluginUserCommentRule"
    }

    fn predicate(&self, crash: &Crash) -> bool {
        crash.raw_crash.contains_key("PluginUserComment")
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let comment = crash.raw_crash.get("PluginUserComment").cloned().unwrap();
        crash.raw_crash.insert("Comments".to_string(), comment);
        Ok(true)
    }
}

/// Works around a known bad Fennec beta build that mis-reported its
/// release channel as `"release"`: `ProductName` starting with
/// `"Fennec"`, `BuildID == "20150427090529"`, and
/// `ReleaseChannel == "release"` together mean the crash actually came
/// from the beta channel, so this rewrites `ReleaseChannel` to
/// `"beta"`. Named for the date the workaround shipped.
#[derive(Debug, Default)]
pub struct FennecBetaError20150430Rule;

impl Rule for FennecBetaError20150430Rule {
    fn name(&self) -> &str {
        "FennecBetaError20150430Rule"
    }

    fn predicate(&self, crash: &Crash) -> bool {
        let product_name = crash
            .raw_crash
            .get("ProductName")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let build_id = crash.raw_crash.get("BuildID").and_then(Value::as_str);
        let release_channel = crash.raw_crash.get("ReleaseChannel").and_then(Value::as_str);

        product_name.starts_with("Fennec")
            && build_id == Some("20150427090529")
            && release_channel == Some("release")
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        crash
            .raw_crash
            .insert("ReleaseChannel".to_string(), Value::String("beta".to_string()));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn raw(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    #[test]
    fn test_product_rewrite_maps_known_product_id() {
        let mut crash = Crash::new(
            "abc".to_string(),
            raw(&[("ProductID", "{ec8030f7-c20a-464f-9b0e-13a3a9e97384}")]),
        );
        assert!(ProductRewriteRule.apply(&mut crash).unwrap());
        assert_eq!(crash.raw_crash.get("ProductName").unwrap(), "FennecAndroid");
    }

    #[test]
    fn test_product_rewrite_skips_unknown_product_id() {
        let mut crash = Crash::new("abc".to_string(), raw(&[("ProductID", "{unknown}")]));
        assert!(!ProductRewriteRule.apply(&mut crash).unwrap());
        assert!(!crash.raw_crash.contains_key("ProductName"));
    }

    #[test]
    fn test_esr_version_rewrite_appends_suffix() {
        let mut crash = Crash::new(
            "abc".to_string(),
            raw(&[("ReleaseChannel", "esr"), ("Version", "12.0")]),
        );
        assert!(EsrVersionRewriteRule.apply(&mut crash).unwrap());
        assert_eq!(crash.raw_crash.get("Version").unwrap(), "12.0esr");
    }

    #[test]
    fn test_esr_version_rewrite_fails_without_version() {
        let mut crash = Crash::new("abc".to_string(), raw(&[("ReleaseChannel", "esr")]));
        let err = EsrVersionRewriteRule.apply(&mut crash).unwrap_err();
        match err {
            Error::MissingField(msg) => {
                assert!(msg.contains("\"Version\" missing from esr release raw_crash"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_esr_version_rewrite_skips_non_esr_channel() {
        let mut crash = Crash::new(
            "abc".to_string(),
            raw(&[("ReleaseChannel", "release"), ("Version", "12.0")]),
        );
        assert!(!EsrVersionRewriteRule.apply(&mut crash).unwrap());
        assert_eq!(crash.raw_crash.get("Version").unwrap(), "12.0");
    }

    #[test]
    fn test_plugin_content_url_overwrites_url() {
        let mut crash = Crash::new(
            "abc".to_string(),
            raw(&[("URL", "http://a"), ("PluginContentURL", "http://b")]),
        );
        assert!(PluginContentUrlRule.apply(&mut crash).unwrap());
        assert_eq!(crash.raw_crash.get("URL").unwrap(), "http://b");
    }

    #[test]
    fn test_plugin_user_comment_overwrites_comments() {
        let mut crash = Crash::new(
            "abc".to_string(),
            raw(&[("Comments", "a"), ("PluginUserComment", "b")]),
        );
        assert!(PluginUserCommentRule.apply(&mut crash).unwrap());
        assert_eq!(crash.raw_crash.get("Comments").unwrap(), "b");
    }

    #[test]
    fn test_fennec_beta_error_rewrites_channel() {
        let mut crash = Crash::new(
            "abc".to_string(),
            raw(&[
                ("ProductName", "Fennec"),
                ("BuildID", "20150427090529"),
                ("ReleaseChannel", "release"),
            ]),
        );
        assert!(FennecBetaError20150430Rule.apply(&mut crash).unwrap());
        assert_eq!(crash.raw_crash.get("ReleaseChannel").unwrap(), "beta");
    }

    #[test]
    fn test_fennec_beta_error_skips_other_builds() {
        let mut crash = Crash::new(
            "abc".to_string(),
            raw(&[
                ("ProductName", "Fennec"),
                ("BuildID", "20150101000000"),
                ("ReleaseChannel", "release"),
            ]),
        );
        assert!(!FennecBetaError20150430Rule.apply(&mut crash).unwrap());
        assert_eq!(crash.raw_crash.get("ReleaseChannel").unwrap(), "release");
    }
}
