//! Contact reconciliation pipeline.
//!
//! Five stages run in a fixed order: decode both exports, repair corrupted
//! records (done inside decode, per record), filter out junk, fold
//! duplicates, and encode one document per destination. The whole pipeline
//! is pure with respect to its inputs; all I/O lives in the binary crate.

use std::collections::BTreeMap;

use cardfold_core::CoreError;
use cardfold_core::record::{ContactRecord, Destination, Source};
use thiserror::Error;

pub mod decode;
pub mod dedupe;
pub mod encode;
pub mod filter;
pub mod repair;

/// Pipeline-level failure.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Neither export produced a single record.
    #[error("no contact records found in any input")]
    NoInput,

    /// A stage broke one of the pipeline's accounting invariants.
    #[error(transparent)]
    Invariant(#[from] CoreError),
}

/// Per-run counters, for the end-of-run summary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// Records decoded from the Google export.
    pub read_google: usize,
    /// Records decoded from the Apple export.
    pub read_apple: usize,
    /// Total records entering the filter.
    pub combined: usize,
    /// Records that survived the filter.
    pub kept: usize,
    /// Records the filter discarded.
    pub discarded: usize,
    /// Discard counts keyed by reason, sorted for stable output.
    pub discard_reasons: BTreeMap<&'static str, usize>,
    /// Merge operations performed during consolidation.
    pub merged: usize,
    /// Records in each output document.
    pub final_count: usize,
}

/// Everything a run produces.
#[derive(Debug)]
pub struct RunOutput {
    /// vCard document formatted for Google Contacts import.
    pub google_export: String,
    /// vCard document formatted for Apple Contacts import.
    pub apple_export: String,
    /// Discarded records with the reason each one was dropped.
    pub discarded: Vec<(ContactRecord, &'static str)>,
    /// Run counters.
    pub stats: RunStats,
}

/// Runs the full pipeline over up to two exports.
///
/// An absent input (`None`) contributes nothing; the run only fails when
/// both inputs together yield zero records.
///
/// ## Errors
///
/// Returns [`PipelineError::NoInput`] when no records could be decoded,
/// and [`PipelineError::Invariant`] if the stage counters fail to
/// reconcile.
pub fn run(google: Option<&str>, apple: Option<&str>) -> Result<RunOutput, PipelineError> {
    let mut stats = RunStats::default();

    let mut records = Vec::new();
    if let Some(input) = google {
        let decoded = decode::decode_source(input, Source::Google);
        stats.read_google = decoded.len();
        records.extend(decoded);
    }
    if let Some(input) = apple {
        let decoded = decode::decode_source(input, Source::Apple);
        stats.read_apple = decoded.len();
        records.extend(decoded);
    }

    stats.combined = records.len();
    if records.is_empty() {
        return Err(PipelineError::NoInput);
    }
    tracing::info!(
        google = stats.read_google,
        apple = stats.read_apple,
        "decoded contact records"
    );

    let mut kept = Vec::new();
    let mut discarded = Vec::new();
    for record in records {
        let verdict = filter::classify(&record);
        if verdict.keep {
            kept.push(record);
        } else {
            tracing::debug!(
                uid = %record.uid,
                name = %record.full_name,
                reason = verdict.reason,
                "discarded record"
            );
            *stats.discard_reasons.entry(verdict.reason).or_insert(0) += 1;
            discarded.push((record, verdict.reason));
        }
    }
    stats.kept = kept.len();
    stats.discarded = discarded.len();
    tracing::info!(
        kept = stats.kept,
        discarded = stats.discarded,
        "filtered records"
    );

    let (survivors, merged) = dedupe::consolidate(kept);
    stats.merged = merged;
    stats.final_count = survivors.len();
    if stats.kept != stats.final_count + stats.merged {
        return Err(CoreError::InvariantViolation(
            "every kept record must be either emitted or merged",
        )
        .into());
    }
    tracing::info!(
        merged = stats.merged,
        final_count = stats.final_count,
        "consolidated duplicates"
    );

    let google_export = encode::encode(&survivors, Destination::Google);
    let apple_export = encode::encode(&survivors, Destination::Apple);

    Ok(RunOutput {
        google_export,
        apple_export,
        discarded,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_inputs_absent_is_no_input() {
        assert!(matches!(run(None, None), Err(PipelineError::NoInput)));
    }

    #[test]
    fn empty_inputs_are_no_input() {
        let result = run(Some(""), Some("no cards in here\n"));
        assert!(matches!(result, Err(PipelineError::NoInput)));
    }

    #[test]
    fn single_input_is_enough() {
        let input = "\
BEGIN:VCARD\r\n\
FN:Jane Doe\r\n\
EMAIL:jane@example.org\r\n\
TEL:555-123-4567\r\n\
END:VCARD\r\n";
        let output = run(Some(input), None).unwrap();
        assert_eq!(output.stats.read_google, 1);
        assert_eq!(output.stats.read_apple, 0);
        assert_eq!(output.stats.final_count, 1);
        assert!(output.google_export.contains("FN:Jane Doe"));
        assert!(output.apple_export.contains("FN:Jane Doe"));
    }

    #[test]
    fn counters_reconcile() {
        let google = "\
BEGIN:VCARD\r\n\
FN:Jane Doe\r\n\
EMAIL:jane@example.org\r\n\
TEL:555-123-4567\r\n\
END:VCARD\r\n\
BEGIN:VCARD\r\n\
FN:D7k5wt3q46\r\n\
END:VCARD\r\n";
        let apple = "\
BEGIN:VCARD\r\n\
FN:Jane Doe\r\n\
EMAIL:jane@example.org\r\n\
END:VCARD\r\n";
        let output = run(Some(google), Some(apple)).unwrap();
        let stats = &output.stats;

        assert_eq!(stats.combined, stats.read_google + stats.read_apple);
        assert_eq!(stats.combined, stats.kept + stats.discarded);
        assert_eq!(stats.kept, stats.final_count + stats.merged);
        assert_eq!(stats.merged, 1);
        assert_eq!(stats.final_count, 1);
        assert_eq!(output.discarded.len(), 1);
        assert_eq!(stats.discard_reasons.get("gibberish name"), Some(&1));
    }
}
