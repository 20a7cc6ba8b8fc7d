// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The native stack-walker seam. Unlike most pipeline steps, walking a
//! minidump is not business logic this crate owns: it shells out to
//! (or links against) a separate native tool. This module defines the
//! trait boundary and the `Rule` adapter that plugs a `Stackwalker`
//! into the pipeline; no implementation of the trait lives here.

use serde_json::Value;

use crate::crash::Crash;
use crate::rule::Rule;
use crate::Error;
use crate::Result;

/// Turns a minidump into the JSON shape `jansky` expects under
/// `processed_crash.json_dump` (crashing thread, module list, per-frame
/// symbolication). Implementations typically shell out to Breakpad's or
/// Google Crashpad's `minidump-stackwalk`.
pub trait Stackwalker {
    fn walk(&self, dump_path: &std::path::Path) -> Result<Value>;
}

/// Adapts a [`Stackwalker`] into a pipeline [`Rule`]. Unlike most rules,
/// a stack-walk failure is always fatal and never suppressed: a crash
/// report without a symbolicated stack is not worth saving, so this
/// stage's own action always returns `Err` on failure regardless of the
/// pipeline's ambient suppression policy.
pub struct StackwalkerStage<W: Stackwalker> {
    walker: W,
    dump_name: String,
}

impl<W: Stackwalker> StackwalkerStage<W> {
    pub fn new(walker: W, dump_name: impl Into<String>) -> Self {
        StackwalkerStage {
            walker,
            dump_name: dump_name.into(),
        }
    }
}

impl<W: Stackwalker> Rule for StackwalkerStage<W> {
    fn name(&self) -> &str {
        "StackwalkerStage"
    }

    fn predicate(&self, crash: &Crash) -> bool {
        crash.dumps.contains_key(&self.dump_name)
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let path = crash
            .dumps
            .get(&self.dump_name)
            .map(|handle| handle.path().to_path_buf())
            .ok_or_else(|| Error::MissingField(self.dump_name.clone()))?;

        let json_dump = self
            .walker
            .walk(&path)
            .map_err(|err| Error::Stackwalker(err.to_string()))?;

        crash
            .processed_crash
            .insert("json_dump".to_string(), json_dump);
        Ok(true)
    }
}
