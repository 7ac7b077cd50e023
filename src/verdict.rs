//! The single terminal result of a run and its monitoring-plugin rendering.

use crate::error::{CheckError, ConfigError};
use crate::evaluator::{CheckKind, Crossing, CrossingDetail, Severity};
use indicatif::HumanBytes;
use std::fmt;
use std::path::Path;

const NOT_APPLICABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Ok,
    Warning,
    Critical,
    /// A failure of the check itself. Rendered and exited like `Critical`.
    Fatal,
}

impl State {
    pub fn label(self) -> &'static str {
        match self {
            State::Ok => "OK",
            State::Warning => "WARNING",
            State::Critical | State::Fatal => "CRITICAL",
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            State::Ok => 0,
            State::Warning => 1,
            State::Critical | State::Fatal => 2,
        }
    }
}

impl From<Severity> for State {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Warning => State::Warning,
            Severity::Critical => State::Critical,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Counts behind an OK summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub evaluated: usize,
    pub total: usize,
    pub missing: usize,
    pub ignored: usize,
    pub checks: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub state: State,
    pub summary: String,
    pub detail_lines: Vec<String>,
    pub last_error: Option<String>,
    pub critical_threshold: String,
    pub warning_threshold: String,
}

impl Verdict {
    pub fn new(state: State, summary: impl Into<String>) -> Self {
        Self {
            state,
            summary: summary.into(),
            detail_lines: Vec::new(),
            last_error: None,
            critical_threshold: NOT_APPLICABLE.to_string(),
            warning_threshold: NOT_APPLICABLE.to_string(),
        }
    }

    pub fn passed(summary: &PassSummary) -> Self {
        let checks = if summary.checks.is_empty() {
            "no".to_string()
        } else {
            summary.checks.join(", ")
        };
        Self::new(
            State::Ok,
            format!(
                "{}/{} specified paths pass {} validation checks ({} missing, {} ignored by request)",
                summary.evaluated, summary.total, checks, summary.missing, summary.ignored
            ),
        )
    }

    pub fn existence_ok() -> Self {
        Self::new(State::Ok, "Specified (unwanted) paths do not exist")
    }

    /// Verdict for a threshold crossing found while checking `root`.
    ///
    /// `evaluated` is the number of entries examined before the crossing was
    /// decided; `fail_fast` marks that count as partial.
    pub fn crossed(crossing: &Crossing, root: &Path, evaluated: usize, fail_fast: bool) -> Self {
        let scope = if fail_fast {
            format!("{} entries evaluated thus far", evaluated)
        } else {
            format!("{} entries evaluated", evaluated)
        };
        let mut details = Vec::new();

        let (summary, last_error) = match &crossing.detail {
            CrossingDetail::Exists => {
                let (kind, path) = match &crossing.record {
                    Some(record) => {
                        details.push(format!("* Path: {}", record.path.display()));
                        details.push(format!(
                            "* Last modified: {}",
                            record.modified.format("%Y-%m-%d %H:%M:%S %z")
                        ));
                        let kind = if record.is_dir { "directory" } else { "file" };
                        (kind, record.path.display().to_string())
                    }
                    None => ("path", root.display().to_string()),
                };
                (
                    format!("{} {:?}: path exists", kind, path),
                    "unwanted path exists".to_string(),
                )
            }
            CrossingDetail::Age {
                age_days,
                threshold_days,
            } => {
                if let Some(record) = &crossing.record {
                    details.push(format!("* Parent dir: {}", record.parent_dir.display()));
                    details.push(format!("* File name: {}", record.name()));
                    details.push(format!("* Age in days: {:.2}", age_days));
                }
                (
                    format!(
                        "file older than {} days ({:.2}) found [path: {:?}]",
                        threshold_days,
                        age_days,
                        root.display().to_string()
                    ),
                    format!("old files found in path ({})", scope),
                )
            }
            CrossingDetail::Size {
                total_bytes,
                threshold_bytes,
            } => {
                let role = match crossing.kind {
                    CheckKind::SizeMin => "minimum",
                    _ => "maximum",
                };
                details.push(format!(
                    "* Evaluated size: bytes: {}, Human: {}",
                    total_bytes,
                    HumanBytes(*total_bytes)
                ));
                details.push(format!(
                    "* Crossed threshold: bytes: {}, Human: {}",
                    threshold_bytes,
                    HumanBytes(*threshold_bytes)
                ));
                if let Some(record) = &crossing.record {
                    details.push(format!(
                        "* Largest file: {} (bytes: {}, Human: {})",
                        record.path.display(),
                        record.size,
                        record.human_size()
                    ));
                }
                let condition = match crossing.kind {
                    CheckKind::SizeMin => "too small",
                    _ => "too large",
                };
                (
                    format!(
                        "{} size threshold crossed; {} found in path {:?}",
                        role,
                        HumanBytes(*total_bytes),
                        root.display().to_string()
                    ),
                    format!("evaluated files in specified path {} ({})", condition, scope),
                )
            }
            CrossingDetail::Identity { found, expected } => {
                let label = match crossing.kind {
                    CheckKind::GroupName => "group name",
                    _ => "username",
                };
                let entry = crossing
                    .record
                    .as_ref()
                    .map(|record| record.path.display().to_string())
                    .unwrap_or_else(|| root.display().to_string());
                details.push(format!("* Path: {}", entry));
                (
                    format!(
                        "found {} {:?}; expected {:?} [path: {:?}]",
                        label, found, expected, entry
                    ),
                    format!("unexpected {} found in path ({})", label, scope),
                )
            }
        };

        let mut verdict = Self::new(crossing.severity.into(), summary);
        verdict.last_error = Some(last_error);
        verdict.detail_lines = details;
        verdict
    }

    /// Verdict for a failure that stopped the run. `root` is absent when the
    /// failure is not tied to a single configured path.
    pub fn fatal(root: Option<&Path>, cause: &CheckError) -> Self {
        let summary = match root {
            Some(root) => format!("Error processing path {}: {}", root.display(), cause),
            None => format!("Error processing specified paths: {}", cause),
        };
        let mut verdict = Self::new(State::Fatal, summary);
        verdict.last_error = Some(cause.to_string());
        verdict
    }

    pub fn config_failure(cause: &ConfigError) -> Self {
        let mut verdict = Self::new(
            State::Fatal,
            format!("Failed to load configuration: {}", cause),
        );
        verdict.last_error = Some(cause.to_string());
        verdict
    }

    pub fn with_thresholds(
        mut self,
        critical: impl Into<String>,
        warning: impl Into<String>,
    ) -> Self {
        self.critical_threshold = critical.into();
        self.warning_threshold = warning.into();
        self
    }

    /// Places `lines` ahead of the existing detail lines.
    pub fn with_leading_details(mut self, mut lines: Vec<String>) -> Self {
        lines.append(&mut self.detail_lines);
        self.detail_lines = lines;
        self
    }

    pub fn exit_code(&self) -> i32 {
        self.state.exit_code()
    }

    pub fn render(&self, branding: Option<&str>) -> String {
        let mut out = format!("{}: {}\n\n", self.state.label(), self.summary);

        out.push_str("**ERRORS**\n");
        out.push_str(&format!(
            "* {}\n\n",
            self.last_error.as_deref().unwrap_or("None")
        ));

        out.push_str("**THRESHOLDS**\n");
        out.push_str(&format!("* CRITICAL: {}\n", self.critical_threshold));
        out.push_str(&format!("* WARNING: {}\n\n", self.warning_threshold));

        out.push_str("**DETAILED INFO**\n");
        for line in &self.detail_lines {
            out.push_str(line);
            out.push('\n');
        }

        if let Some(branding) = branding {
            out.push_str(&format!("\n[Notification generated by {}]\n", branding));
        }

        out
    }
}
