use super::{Crossing, CrossingDetail, IdentityField, IdentityThreshold, Outcome};
use crate::model::MetadataRecord;

/// Compares a resolved record against the expected username and group name.
/// Username is checked first; the first mismatch wins.
pub fn identity_verdict(
    record: &MetadataRecord,
    username: Option<&IdentityThreshold>,
    group_name: Option<&IdentityThreshold>,
) -> Outcome {
    for threshold in [username, group_name].into_iter().flatten() {
        let found = match threshold.field {
            IdentityField::Username => &record.identity.username,
            IdentityField::GroupName => &record.identity.group_name,
        };
        if *found != threshold.expected {
            return Outcome::Crossed(Crossing {
                kind: threshold.field.kind(),
                severity: threshold.severity,
                record: Some(record.clone()),
                detail: CrossingDetail::Identity {
                    found: found.clone(),
                    expected: threshold.expected.clone(),
                },
            });
        }
    }

    Outcome::Ok
}
