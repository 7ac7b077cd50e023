use super::{AgeThreshold, CheckKind, Crossing, CrossingDetail, Outcome, Severity};
use crate::model::RecordSet;
use chrono::{DateTime, Days, Local};

/// True when `modified` is strictly earlier than `now` minus `days` calendar
/// days. An entry exactly `days` old has not exceeded the threshold.
pub fn age_exceeded(modified: DateTime<Local>, days: u64, now: DateTime<Local>) -> bool {
    match now.checked_sub_days(Days::new(days)) {
        Some(cutoff) => modified < cutoff,
        None => false,
    }
}

/// Returns the first file in `records` that crosses either age threshold.
///
/// Callers order `records` oldest first, which makes the reported entry the
/// oldest one and its severity the highest present. Directories are skipped.
pub fn age_verdict(
    records: &RecordSet,
    threshold: &AgeThreshold,
    now: DateTime<Local>,
) -> Outcome {
    for record in records.iter().filter(|record| !record.is_dir) {
        let severity = if age_exceeded(record.modified, threshold.critical_days, now) {
            Severity::Critical
        } else if age_exceeded(record.modified, threshold.warning_days, now) {
            Severity::Warning
        } else {
            continue;
        };

        return Outcome::Crossed(Crossing {
            kind: CheckKind::Age,
            severity,
            record: Some(record.clone()),
            detail: CrossingDetail::Age {
                age_days: record.age_days(now),
                threshold_days: threshold.days_for(severity),
            },
        });
    }

    Outcome::Ok
}
