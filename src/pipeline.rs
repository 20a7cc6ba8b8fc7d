// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The pipeline runner (spec §4.3/C5): an ordered rule sequence plus
//! the suppression policy it runs under, bound together so callers
//! don't have to re-derive "which rules, in what order, suppressed or
//! not" at every call site. [`crate::rules::default_rules`] supplies
//! the canonical Mozilla sequence; [`Pipeline`] just runs it.

use crate::crash::Crash;
use crate::rule::Rule;
use crate::Result;

/// An ordered rule sequence bound to a suppression policy (spec §4.2:
/// `suppress = false` aborts the whole pipeline on the first failing
/// rule; `suppress = true` records the failure in `errors` and keeps
/// going). The canonical Mozilla sequence (spec §4.3) always runs
/// unsuppressed — see spec §7's "none of the canonical rule sequence is
/// invoked with suppression on".
pub struct Pipeline {
    rules: Vec<Box<dyn Rule + Send + Sync>>,
    suppress: bool,
}

impl Pipeline {
    pub fn new(rules: Vec<Box<dyn Rule + Send + Sync>>, suppress: bool) -> Self {
        Pipeline { rules, suppress }
    }

    /// Runs every rule against `crash` in order, honoring the bound
    /// suppression policy. Equivalent to spec §4.2's
    /// `crash.pipeline(rule_1, ..., rule_n, suppress)`.
    pub fn run(&self, crash: &mut Crash) -> Result<()> {
        crash.transform(&self.rules, self.suppress)
    }

    pub fn rules(&self) -> &[Box<dyn Rule + Send + Sync>] {
        &self.rules
    }
}
