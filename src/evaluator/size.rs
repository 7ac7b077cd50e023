use super::{Crossing, CrossingDetail, Outcome, Severity, SizeThreshold};

/// Judges an aggregate size against the optional min and max thresholds.
///
/// Max is checked before min, so a batch crossing both reports the max-size
/// violation. Within one threshold, crossing critical beats crossing warning.
/// The returned crossing carries no record; callers attach one if relevant.
pub fn size_verdict(
    total_bytes: u64,
    min: Option<&SizeThreshold>,
    max: Option<&SizeThreshold>,
) -> Outcome {
    if let Some(max) = max {
        let severity = if total_bytes > max.critical_bytes {
            Some(Severity::Critical)
        } else if total_bytes > max.warning_bytes {
            Some(Severity::Warning)
        } else {
            None
        };
        if let Some(severity) = severity {
            return crossed(max, severity, total_bytes);
        }
    }

    if let Some(min) = min {
        let severity = if total_bytes < min.critical_bytes {
            Some(Severity::Critical)
        } else if total_bytes < min.warning_bytes {
            Some(Severity::Warning)
        } else {
            None
        };
        if let Some(severity) = severity {
            return crossed(min, severity, total_bytes);
        }
    }

    Outcome::Ok
}

fn crossed(threshold: &SizeThreshold, severity: Severity, total_bytes: u64) -> Outcome {
    Outcome::Crossed(Crossing {
        kind: threshold.role.kind(),
        severity,
        record: None,
        detail: CrossingDetail::Size {
            total_bytes,
            threshold_bytes: threshold.bytes_for(severity),
        },
    })
}
