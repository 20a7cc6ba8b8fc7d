// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! [`ProductRule`]: the raw→processed projection of product identity
//! fields (spec §4.6).

use serde_json::Value;

use crate::crash::Crash;
use crate::rule::Rule;
use crate::Result;

fn string_default(crash: &Crash, key: &str) -> Value {
    crash
        .raw_crash
        .get(key)
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()))
}

fn null_default(crash: &Crash, key: &str) -> Value {
    crash.raw_crash.get(key).cloned().unwrap_or(Value::Null)
}

/// Copies 8 product-identity fields from `raw_crash` to
/// `processed_crash`, each with an explicit default
/// (`""` for strings Socorro always expects present, `null` for the
/// ones that aren't), then separately mirrors `ReleaseChannel` verbatim
/// into `processed_crash.ReleaseChannel` — an intentional duplicate of
/// `release_channel` that downstream consumers of the legacy key still
/// expect (spec §4.6). Mutates `processed_crash` only.
#[derive(Debug, Default)]
pub struct ProductRule;

impl Rule for ProductRule {
    fn name(&self) -> &str {
        "ProductRule"
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let product = string_default(crash, "ProductName");
        let version = string_default(crash, "Version");
        let build = string_default(crash, "BuildID");
        let release_channel = string_default(crash, "ReleaseChannel");
        let productid = null_default(crash, "ProductID");
        let distributor = null_default(crash, "Distributor");
        let distributor_version = null_default(crash, "DistributorVersion");
        let useragent_locale = null_default(crash, "useragent_locale");

        let raw_release_channel = crash
            .raw_crash
            .get("ReleaseChannel")
            .cloned()
            .unwrap_or(Value::Null);

        crash.processed_crash.insert("product".to_string(), product);
        crash.processed_crash.insert("version".to_string(), version);
        crash.processed_crash.insert("build".to_string(), build);
        crash
            .processed_crash
            .insert("release_channel".to_string(), release_channel);
        crash.processed_crash.insert("productid".to_string(), productid);
        crash.processed_crash.insert("distributor".to_string(), distributor);
        crash
            .processed_crash
            .insert("distributor_version".to_string(), distributor_version);
        crash
            .processed_crash
            .insert("useragent_locale".to_string(), useragent_locale);
        // Intentional duplicate of release_channel under the raw field's
        // own casing, per spec §4.6.
        crash
            .processed_crash
            .insert("ReleaseChannel".to_string(), raw_release_channel);

        Ok(true)
    }
}
