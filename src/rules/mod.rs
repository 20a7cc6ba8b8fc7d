// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The concrete rule library (spec §4.6): every Mozilla-specific
//! transform plus the canonical order they run in (spec §4.3).
//!
//! Each submodule groups rules the spec's pipeline table puts in the
//! same stage. `default_rules` is the only thing callers outside this
//! module normally need.

mod addons;
mod dates_and_times;
mod exploitability;
mod flash_version;
mod identity_fields;
mod java_process;
mod plugin;
mod product;
mod raw_rewrites;
mod system_info;
mod theme_pretty_name;
mod topmost_files;
mod user_data;

pub use addons::AddonsRule;
pub use dates_and_times::DatesAndTimesRule;
pub use exploitability::ExploitabilityRule;
pub use flash_version::FlashVersionRule;
pub use identity_fields::{IdentifierRule, UuidCorrectionRule};
pub use java_process::{JavaProcessRule, WinsockLspRule};
pub use plugin::PluginRule;
pub use product::ProductRule;
pub use raw_rewrites::{
    EsrVersionRewriteRule, FennecBetaError20150430Rule, PluginContentUrlRule,
    PluginUserCommentRule, ProductRewriteRule,
};
pub use system_info::{CpuInfoRule, OsInfoRule};
pub use theme_pretty_name::ThemePrettyNameRule;
pub use topmost_files::TopMostFilesRule;
pub use user_data::{EnvironmentRule, UserDataRule};

use crate::rule::{CreateMetadataRule, ReservedStage, Rule, SaveMetadataRule};
use crate::stackwalker::{Stackwalker, StackwalkerStage};

/// Assembles the canonical rule sequence from spec §4.3, in order.
/// Positions the spec reserves for Mozilla-internal or external rules
/// this crate does not implement (the out-of-memory-binary rule, the
/// crashing-thread rule, beta-version, OS-pretty-version,
/// missing-symbols, signature generation, and the support/JIT/skunk
/// classifiers) are held by a named [`ReservedStage`] so the sequence's
/// length and order match the spec exactly.
///
/// `walker` plugs in the real native stack-walker implementation
/// (spec §6); this crate has none of its own.
pub fn default_rules<W: Stackwalker + Send + Sync + 'static>(
    walker: W,
) -> Vec<Box<dyn Rule + Send + Sync>> {
    vec![
        // 1. Initialisation
        Box::new(UuidCorrectionRule),
        Box::new(CreateMetadataRule),
        // 2. Raw rewrites
        Box::new(ProductRewriteRule),
        Box::new(EsrVersionRewriteRule),
        Box::new(PluginContentUrlRule),
        Box::new(PluginUserCommentRule),
        Box::new(FennecBetaError20150430Rule),
        // 3. Raw -> processed
        Box::new(IdentifierRule),
        Box::new(StackwalkerStage::new(walker, "upload_file_minidump")),
        Box::new(ProductRule),
        Box::new(UserDataRule),
        Box::new(EnvironmentRule),
        Box::new(PluginRule),
        Box::new(AddonsRule),
        Box::new(DatesAndTimesRule),
        Box::new(ReservedStage::new("OutOfMemoryBinaryRule")),
        Box::new(JavaProcessRule),
        Box::new(WinsockLspRule),
        // 4. Post-processing
        Box::new(ReservedStage::new("CrashingThreadInfoRule")),
        Box::new(CpuInfoRule),
        Box::new(OsInfoRule),
        Box::new(ReservedStage::new("BetaVersionRule")),
        Box::new(ExploitabilityRule),
        Box::new(FlashVersionRule),
        Box::new(ReservedStage::new("OSPrettyVersionRule")),
        Box::new(TopMostFilesRule),
        Box::new(ReservedStage::new("MissingSymbolsRule")),
        Box::new(ThemePrettyNameRule),
        Box::new(ReservedStage::new("SignatureGenerationRule")),
        // 5. Classifiers
        Box::new(ReservedStage::new("SupportClassifier")),
        Box::new(ReservedStage::new("JitClassifier")),
        Box::new(ReservedStage::new("SkunkClassifier")),
        // 6. Finalisation
        Box::new(SaveMetadataRule),
    ]
}
