use crate::error::{CheckError, WalkError};
use crate::evaluator::{Crossing, CrossingDetail, Severity};
use crate::model::MetadataRecord;
use crate::verdict::Verdict;
use colored::*;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// Observer for evaluation progress and findings.
///
/// The engine reports through this handle instead of global log state. The
/// binary uses [`LogReporter`]; tests substitute their own.
/// All methods have default no-op implementations.
pub trait EvaluationReporter: Send + Sync {
    fn on_root_start(&self, _root: &Path) {}
    fn on_record(&self, _record: &MetadataRecord) {}
    fn on_tolerated(&self, _condition: &WalkError) {}
    fn on_root_complete(&self, _root: &Path, _records: usize, _total_bytes: u64) {}
    fn on_threshold_crossed(&self, _root: &Path, _crossing: &Crossing) {}
    fn on_fatal(&self, _root: Option<&Path>, _cause: &CheckError) {}
    fn on_complete(&self, _verdict: &Verdict, _duration: Duration) {}
}

/// No-op reporter for silent operation.
pub struct SilentReporter;

impl EvaluationReporter for SilentReporter {}

/// Emits structured `tracing` events.
pub struct LogReporter;

impl EvaluationReporter for LogReporter {
    fn on_root_start(&self, root: &Path) {
        debug!(path = %root.display(), "evaluating path");
    }

    fn on_record(&self, record: &MetadataRecord) {
        trace!(
            path = %record.path.display(),
            is_dir = record.is_dir,
            size_bytes = record.size,
            modified = %record.modified,
            mode = %format!("{:o}", record.permission_bits),
            "entry received"
        );
    }

    fn on_tolerated(&self, condition: &WalkError) {
        match condition {
            WalkError::NotFound(path) => {
                info!(path = %path.display(), "path not found; ignoring as requested")
            }
            WalkError::Ignored(path) => debug!(path = %path.display(), "path ignored by request"),
            other => debug!(error = %other, "walk condition tolerated"),
        }
    }

    fn on_root_complete(&self, root: &Path, records: usize, total_bytes: u64) {
        debug!(
            path = %root.display(),
            records,
            total_bytes,
            "finished collecting entries"
        );
    }

    fn on_threshold_crossed(&self, root: &Path, crossing: &Crossing) {
        let entry = crossing
            .record
            .as_ref()
            .map(|record| record.path.display().to_string())
            .unwrap_or_default();

        match (&crossing.detail, crossing.severity) {
            (CrossingDetail::Age { age_days, threshold_days }, Severity::Critical) => error!(
                path = %root.display(),
                entry = %entry,
                critical_age_days = *threshold_days,
                actual_age_days = %format!("{:.2}", age_days),
                "file age threshold crossed"
            ),
            (CrossingDetail::Age { age_days, threshold_days }, Severity::Warning) => warn!(
                path = %root.display(),
                entry = %entry,
                warning_age_days = *threshold_days,
                actual_age_days = %format!("{:.2}", age_days),
                "file age threshold crossed"
            ),
            (CrossingDetail::Size { total_bytes, threshold_bytes }, Severity::Critical) => error!(
                path = %root.display(),
                kind = %crossing.kind,
                critical_size_bytes = *threshold_bytes,
                actual_size_bytes = *total_bytes,
                "file size threshold crossed"
            ),
            (CrossingDetail::Size { total_bytes, threshold_bytes }, Severity::Warning) => warn!(
                path = %root.display(),
                kind = %crossing.kind,
                warning_size_bytes = *threshold_bytes,
                actual_size_bytes = *total_bytes,
                "file size threshold crossed"
            ),
            (CrossingDetail::Identity { found, expected }, severity) => warn!(
                path = %root.display(),
                entry = %entry,
                kind = %crossing.kind,
                severity = %severity,
                found = %found,
                expected = %expected,
                "identity mismatch"
            ),
            (CrossingDetail::Exists, severity) => warn!(
                path = %entry,
                severity = %severity,
                "unwanted path exists"
            ),
        }
    }

    fn on_fatal(&self, root: Option<&Path>, cause: &CheckError) {
        match root {
            Some(root) => error!(path = %root.display(), error = %cause, "check aborted"),
            None => error!(error = %cause, "check aborted"),
        }
    }

    fn on_complete(&self, verdict: &Verdict, duration: Duration) {
        info!(
            "Check finished with {} in {}s",
            verdict.state,
            format!("{:.2}", duration.as_secs_f64()).green()
        );
    }
}
