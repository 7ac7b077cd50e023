//! Threshold decisions.
//!
//! The submodules hold side-effect free decision functions; [`evaluate`]
//! applies them to a batch of one or more records in the fixed priority
//! Age > Size > Identity. Existence is evaluated on its own by
//! [`existence::existence_verdict`] and never mixed with the others.

pub mod age;
pub mod existence;
pub mod identity;
pub mod size;
pub mod thresholds;

pub use thresholds::{
    AgeThreshold, IdentityField, IdentityThreshold, SizeRole, SizeThreshold, ThresholdSet,
};

use crate::error::CheckError;
use crate::model::{MetadataRecord, RecordSet};
use crate::platform::IdentityResolver;
use chrono::{DateTime, Local};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Critical,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    Exists,
    Age,
    SizeMax,
    SizeMin,
    Username,
    GroupName,
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckKind::Exists => "exists",
            CheckKind::Age => "age",
            CheckKind::SizeMax => "max size",
            CheckKind::SizeMin => "min size",
            CheckKind::Username => "username",
            CheckKind::GroupName => "group name",
        };
        f.write_str(name)
    }
}

/// Measurement behind a crossing, kept for reporting.
#[derive(Debug, Clone, PartialEq)]
pub enum CrossingDetail {
    Exists,
    Age { age_days: f64, threshold_days: u64 },
    Size { total_bytes: u64, threshold_bytes: u64 },
    Identity { found: String, expected: String },
}

#[derive(Debug, Clone)]
pub struct Crossing {
    pub kind: CheckKind,
    pub severity: Severity,
    /// The entry most relevant to the crossing, if one applies.
    pub record: Option<MetadataRecord>,
    pub detail: CrossingDetail,
}

#[derive(Debug)]
pub enum Outcome {
    Ok,
    Crossed(Crossing),
    Fatal(CheckError),
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok)
    }
}

/// Applies age, size and identity checks to `records`.
///
/// `total_bytes` is the size figure to judge; `None` skips the size checks
/// for this batch. Each phase orders `records` for its own purposes, so the
/// result does not depend on discovery order. Identity names are resolved
/// lazily and written back into the records.
pub fn evaluate(
    records: &mut RecordSet,
    total_bytes: Option<u64>,
    thresholds: &ThresholdSet,
    resolver: &dyn IdentityResolver,
    now: DateTime<Local>,
) -> Outcome {
    if let Some(age) = &thresholds.age {
        records.sort_by_age_ascending();
        let outcome = age::age_verdict(records, age, now);
        if !outcome.is_ok() {
            return outcome;
        }
    }

    if let Some(total) = total_bytes {
        let outcome = size::size_verdict(
            total,
            thresholds.size_min.as_ref(),
            thresholds.size_max.as_ref(),
        );
        if let Outcome::Crossed(mut crossing) = outcome {
            records.sort_by_size_ascending();
            crossing.record = records.iter().rev().find(|record| !record.is_dir).cloned();
            return Outcome::Crossed(crossing);
        }
    }

    if thresholds.identity_enabled() {
        records.sort_by_path();
        for record in records.iter_mut() {
            if !record.identity.is_resolved() {
                match resolver.resolve(record) {
                    Ok(identity) => record.identity = identity,
                    Err(err) => return Outcome::Fatal(CheckError::Identity(err)),
                }
            }
            let outcome = identity::identity_verdict(
                record,
                thresholds.username.as_ref(),
                thresholds.group_name.as_ref(),
            );
            if !outcome.is_ok() {
                return outcome;
            }
        }
    }

    Outcome::Ok
}
