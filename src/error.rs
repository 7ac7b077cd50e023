use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Conditions reported by a [`crate::scanner::PathWalker`] in place of a record.
///
/// `NotFound` and `Ignored` are tolerable (see [`WalkError::is_tolerable`]),
/// `Canceled` is the expected tail of a walk the orchestrator stopped early.
/// Anything else aborts the walk.
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("path ignored by request: {}", .0.display())]
    Ignored(PathBuf),

    #[error("path check canceled")]
    Canceled,

    #[error("unable to resolve absolute path for {}: {source}", path.display())]
    InvalidRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error examining path {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("path walker stopped unexpectedly")]
    Aborted,
}

impl WalkError {
    /// Whether the run may continue past this condition.
    pub fn is_tolerable(&self, missing_ok: bool) -> bool {
        match self {
            WalkError::Ignored(_) => true,
            WalkError::NotFound(_) => missing_ok,
            _ => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("username and group name resolution unavailable; unsupported operating system")]
    Unsupported,

    #[error("no ownership information recorded for {}", .0.display())]
    MissingOwnership(PathBuf),

    #[error("failed to resolve uid {0} to username")]
    UnknownUser(u32),

    #[error("failed to resolve gid {0} to group name")]
    UnknownGroup(u32),

    #[error("failed to look up {kind} {id}: {source}")]
    Lookup {
        kind: &'static str,
        id: u32,
        #[source]
        source: io::Error,
    },
}

/// Configuration loading and validation failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("one or more paths not provided")]
    NoPaths,

    #[error("invalid log level provided: {0}")]
    InvalidLogLevel(String),

    #[error("'{0}' incompatible with other options")]
    ExistsIncompatible(&'static str),

    #[error("'exists-critical' and 'exists-warning' specified; only one is permitted")]
    ExistsConflict,

    #[error("minimum age in days not specified for {0} threshold; both values required if checking file age")]
    AgeMissing(&'static str),

    #[error("provided age in days ({value}) not valid for {label} threshold")]
    AgeTooSmall { value: i64, label: &'static str },

    #[error("provided WARNING age in days ({warning}) greater than CRITICAL age in days ({critical})")]
    AgeWarningGreater { warning: u64, critical: u64 },

    #[error("provided WARNING age in days ({warning}) equal to CRITICAL age in days ({critical})")]
    AgeWarningEqual { warning: u64, critical: u64 },

    #[error("{role} size in bytes not specified for {label} threshold; both values required if checking {role} file size")]
    SizeMissing {
        role: &'static str,
        label: &'static str,
    },

    #[error("provided {role} size in bytes ({value}) not valid for {label} threshold")]
    SizeTooSmall {
        role: &'static str,
        value: i64,
        label: &'static str,
    },

    #[error("provided {role} WARNING size in bytes ({warning}) greater than {role} CRITICAL size in bytes ({critical})")]
    SizeWarningGreater {
        role: &'static str,
        warning: u64,
        critical: u64,
    },

    #[error("provided {role} WARNING size in bytes ({warning}) less than {role} CRITICAL size in bytes ({critical})")]
    SizeWarningLess {
        role: &'static str,
        warning: u64,
        critical: u64,
    },

    #[error("provided {role} WARNING size in bytes ({warning}) equal to {role} CRITICAL size in bytes ({critical})")]
    SizeWarningEqual {
        role: &'static str,
        warning: u64,
        critical: u64,
    },

    #[error("'{0}-missing-critical' and '{0}-missing-warning' specified; only one is permitted")]
    IdentityConflict(&'static str),

    #[error("'{0}' specified; not currently supported on this platform")]
    IdentityUnsupported(&'static str),

    #[error("invalid value {value:?} specified for {flag}: {reason}")]
    InvalidName {
        flag: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("no values specified for age, minimum size, maximum size, username, group name or existence")]
    NoChecks,
}

/// Fatal causes. Any of these stops the whole run with no retry.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error("failed to resolve IDs: {0}")]
    Identity(#[from] IdentityError),

    #[error("unable to assert non-existence of {}: {source}", path.display())]
    Existence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("specified path is empty string")]
    EmptyPath,

    #[error("failed to start path walker: {0}")]
    Spawn(#[source] io::Error),
}
