// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The `Rule` protocol: a predicate/action pair applied to a crash in
//! sequence by the pipeline, plus a handful of rules generic enough to
//! live here instead of under `rules/`.

use serde_json::{Map, Value};

use crate::crash::Crash;
use crate::time_util;
use crate::Result;

/// One step of the processing pipeline.
///
/// `predicate` decides whether `action` should run at all; skipping a
/// rule via its predicate is not a failure and leaves no trace in
/// `processor_notes`. `action` does the work and returns whether it
/// completed successfully. The default `name` is the type name, used in
/// error messages and processor notes.
pub trait Rule {
    fn name(&self) -> &str;

    fn predicate(&self, _crash: &Crash) -> bool {
        true
    }

    fn action(&self, crash: &mut Crash) -> Result<bool>;

    /// Runs the rule against `crash`, honoring the predicate. Returns
    /// `Ok(true)` if the action ran and succeeded, `Ok(false)` if the
    /// predicate skipped it, propagating any error from `action`
    /// unsuppressed — suppression is the caller's concern (see
    /// [`crate::crash::Crash::apply`]).
    fn apply(&self, crash: &mut Crash) -> Result<bool> {
        if !self.predicate(crash) {
            return Ok(false);
        }
        self.action(crash)
    }
}

/// Appends a note to `processor_notes`, joined with `"; "` on save,
/// matching `jansky`'s convention of accumulating free-text notes rather
/// than structured log records inside the crash report itself.
pub fn push_note(crash: &mut Crash, note: impl Into<String>) {
    crash.processor_notes.push(note.into());
}

/// The distinguished identity rule from spec §4.1: predicate always
/// true, action a pure no-op. Exists so callers that need "a `Rule`
/// that does nothing" (tests, a no-op slot in a rule set) don't each
/// invent their own.
#[derive(Debug, Default)]
pub struct Identity;

impl Rule for Identity {
    fn name(&self) -> &str {
        "Identity"
    }

    fn action(&self, _crash: &mut Crash) -> Result<bool> {
        Ok(true)
    }
}

/// The distinguished introspector rule from spec §4.1: logs the crash's
/// current state at `INFO` and never mutates it. Useful dropped into a
/// rule sequence while debugging why a later rule isn't seeing the
/// field it expects. Mirrors `processor.rule.Introspector`.
#[derive(Debug, Default)]
pub struct Introspector;

impl Rule for Introspector {
    fn name(&self) -> &str {
        "Introspector"
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        log::info!(
            "introspect {}: raw_crash={:?} processed_crash={:?}",
            crash.crash_id,
            crash.raw_crash,
            crash.processed_crash
        );
        Ok(true)
    }
}

/// Placeholder for a pipeline position whose real behavior (native
/// stack-walking post-processing, JIT/skunkworks classification, and
/// similar Mozilla-internal business rules) is out of scope here. Never
/// fails, never touches the crash; exists purely so the pipeline's
/// length and ordering match the canonical sequence.
pub struct ReservedStage {
    name: String,
}

impl ReservedStage {
    pub fn new(name: impl Into<String>) -> Self {
        ReservedStage { name: name.into() }
    }
}

impl Rule for ReservedStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn action(&self, _crash: &mut Crash) -> Result<bool> {
        log::debug!("skipping reserved stage {}", self.name);
        Ok(false)
    }
}

/// Runs its member rules in order and stops at the first one whose
/// action reports success (`Ok(true)`), the way classifier rule-sets
/// try each candidate classification until one applies. A member whose
/// predicate returns false is skipped without counting as a try.
pub struct FirstSuccessGroup {
    name: String,
    rules: Vec<Box<dyn Rule + Send + Sync>>,
}

impl FirstSuccessGroup {
    pub fn new(name: impl Into<String>, rules: Vec<Box<dyn Rule + Send + Sync>>) -> Self {
        FirstSuccessGroup {
            name: name.into(),
            rules,
        }
    }
}

impl Rule for FirstSuccessGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        for rule in &self.rules {
            if rule.apply(crash)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// First rule of the pipeline in practice: stamps `started_datetime`
/// and the metadata scaffolding later rules and `SaveMetadataRule`
/// expect. Mirrors the `TestCreateMetadata` fixture's expectations.
///
/// A crash being reprocessed carries its prior run's notes at the
/// top-level `processed_crash.processor_notes` (a `"; "`-joined
/// string, the shape `SaveMetadataRule` leaves behind). That string is
/// split back into a list and stashed under `metadata.original_processor_notes`
/// for `SaveMetadataRule` to fold back in after this run's own notes,
/// and a marker note citing the prior run's `started_datetime` (or
/// `"Unknown Date"` when none survived) is added to this run's notes.
#[derive(Debug, Default)]
pub struct CreateMetadataRule;

impl Rule for CreateMetadataRule {
    fn name(&self) -> &str {
        "CreateMetadataRule"
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let earlier_started_datetime = crash
            .processed_crash
            .get("started_datetime")
            .and_then(Value::as_str)
            .map(str::to_string);

        let original_processor_notes = crash
            .processed_crash
            .get("processor_notes")
            .and_then(Value::as_str)
            .map(|notes| {
                notes
                    .split(';')
                    .map(str::trim)
                    .filter(|note| !note.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            });

        let mut metadata = Map::new();
        metadata.insert(
            "started_datetime".to_string(),
            Value::String(time_util::utc_now().to_rfc3339()),
        );
        if let Some(original_processor_notes) = original_processor_notes {
            push_note(
                crash,
                format!(
                    "earlier processing: {}",
                    earlier_started_datetime.as_deref().unwrap_or("Unknown Date")
                ),
            );
            metadata.insert(
                "original_processor_notes".to_string(),
                Value::Array(original_processor_notes.into_iter().map(Value::String).collect()),
            );
        }
        crash
            .processed_crash
            .insert("metadata".to_string(), Value::Object(metadata));
        Ok(true)
    }
}

/// Last rule of the pipeline in practice: folds the note list, a
/// completion timestamp, and the overall success flag into top-level
/// keys of `processed_crash` (`started_datetime`, `completed_datetime`,
/// `processor_notes`, `success`), deleting the scratch `metadata` key
/// entry that `CreateMetadataRule` seeded rather than re-creating it.
/// Matches `TestSaveMetadata`'s expectation that notes accumulated
/// elsewhere end up `"; "`-joined at the top level with no `metadata`
/// key left behind, and that an unset `started_datetime` reads back as
/// `"earlier processing: Unknown Date"`.
///
/// If `CreateMetadataRule` stashed `metadata.original_processor_notes`
/// (a reprocessing run), those notes are appended after this run's own
/// so no history is lost across reprocessing.
#[derive(Debug, Default)]
pub struct SaveMetadataRule;

impl Rule for SaveMetadataRule {
    fn name(&self) -> &str {
        "SaveMetadataRule"
    }

    fn action(&self, crash: &mut Crash) -> Result<bool> {
        let metadata_in = crash.processed_crash.get("metadata");
        let started_datetime = metadata_in
            .and_then(|m| m.get("started_datetime"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| "earlier processing: Unknown Date".to_string());
        let original_processor_notes: Vec<String> = metadata_in
            .and_then(|m| m.get("original_processor_notes"))
            .and_then(Value::as_array)
            .map(|notes| {
                notes
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        crash.processed_crash.remove("metadata");

        let mut notes = crash.processor_notes.clone();
        if !crash.errors.is_empty() {
            notes.extend(crash.errors.iter().cloned());
        }
        notes.extend(original_processor_notes);
        let processor_notes = notes.join("; ");

        crash
            .processed_crash
            .insert("started_datetime".to_string(), Value::String(started_datetime));
        crash.processed_crash.insert(
            "completed_datetime".to_string(),
            Value::String(time_util::utc_now().to_rfc3339()),
        );
        crash
            .processed_crash
            .insert("processor_notes".to_string(), Value::String(processor_notes));
        crash
            .processed_crash
            .insert("success".to_string(), Value::Bool(crash.errors.is_empty()));

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crash::Crash;

    fn sample_crash() -> Crash {
        let mut raw = Map::new();
        raw.insert("uuid".to_string(), Value::String("abc".to_string()));
        Crash::new("abc".to_string(), raw)
    }

    #[test]
    fn test_identity_leaves_crash_unchanged() {
        let mut crash = sample_crash();
        let before = crash.processed_crash.clone();
        assert!(Identity.apply(&mut crash).unwrap());
        assert_eq!(crash.processed_crash, before);
    }

    #[test]
    fn test_introspector_leaves_crash_unchanged() {
        let mut crash = sample_crash();
        let before = crash.processed_crash.clone();
        assert!(Introspector.apply(&mut crash).unwrap());
        assert_eq!(crash.processed_crash, before);
    }

    #[test]
    fn test_reserved_stage_is_a_no_op() {
        let mut crash = sample_crash();
        let before = crash.processed_crash.clone();
        let ran = ReservedStage::new("NativeStackwalkPostprocessing")
            .apply(&mut crash)
            .unwrap();
        assert!(!ran);
        assert_eq!(crash.processed_crash, before);
    }

    #[test]
    fn test_first_success_group_stops_at_first_hit() {
        struct Fails;
        impl Rule for Fails {
            fn name(&self) -> &str {
                "Fails"
            }
            fn action(&self, _crash: &mut Crash) -> Result<bool> {
                Ok(false)
            }
        }
        struct Hits;
        impl Rule for Hits {
            fn name(&self) -> &str {
                "Hits"
            }
            fn action(&self, crash: &mut Crash) -> Result<bool> {
                push_note(crash, "hit");
                Ok(true)
            }
        }
        struct NeverReached;
        impl Rule for NeverReached {
            fn name(&self) -> &str {
                "NeverReached"
            }
            fn action(&self, crash: &mut Crash) -> Result<bool> {
                push_note(crash, "should not run");
                Ok(true)
            }
        }

        let group = FirstSuccessGroup::new(
            "classifiers",
            vec![Box::new(Fails), Box::new(Hits), Box::new(NeverReached)],
        );
        let mut crash = sample_crash();
        assert!(group.apply(&mut crash).unwrap());
        assert_eq!(crash.processor_notes, vec!["hit".to_string()]);
    }

    #[test]
    fn test_create_then_save_metadata_round_trip() {
        let mut crash = sample_crash();
        CreateMetadataRule.apply(&mut crash).unwrap();
        push_note(&mut crash, "a note");
        SaveMetadataRule.apply(&mut crash).unwrap();

        assert!(!crash.processed_crash.contains_key("metadata"));
        assert_eq!(crash.processed_crash.get("processor_notes").unwrap(), "a note");
        assert_eq!(crash.processed_crash.get("success").unwrap(), &Value::Bool(true));
        assert!(crash
            .processed_crash
            .get("started_datetime")
            .unwrap()
            .as_str()
            .unwrap()
            .len()
            > 0);
    }

    #[test]
    fn test_save_metadata_without_create_reports_unknown_date() {
        let mut crash = sample_crash();
        SaveMetadataRule.apply(&mut crash).unwrap();
        assert!(!crash.processed_crash.contains_key("metadata"));
        assert_eq!(
            crash.processed_crash.get("started_datetime").unwrap(),
            "earlier processing: Unknown Date"
        );
    }

    #[test]
    fn test_create_then_save_metadata_preserves_earlier_reprocessing_notes() {
        let mut crash = sample_crash();
        crash.processed_crash.insert(
            "processor_notes".to_string(),
            Value::String("Processor2015; earlier processing: Unknown Date".to_string()),
        );

        CreateMetadataRule.apply(&mut crash).unwrap();
        push_note(&mut crash, "a new note");
        SaveMetadataRule.apply(&mut crash).unwrap();

        assert!(!crash.processed_crash.contains_key("metadata"));
        assert_eq!(
            crash.processed_crash.get("processor_notes").unwrap(),
            "earlier processing: Unknown Date; a new note; Processor2015; earlier processing: Unknown Date"
        );
    }

    #[test]
    fn test_save_metadata_reports_failure_when_errors_present() {
        let mut crash = sample_crash();
        crash.errors.push("boom".to_string());
        SaveMetadataRule.apply(&mut crash).unwrap();
        assert!(!crash.processed_crash.contains_key("metadata"));
        assert_eq!(crash.processed_crash.get("success").unwrap(), &Value::Bool(false));
        assert!(crash
            .processed_crash
            .get("processor_notes")
            .unwrap()
            .as_str()
            .unwrap()
            .contains("boom"));
    }
}
