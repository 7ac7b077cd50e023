use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Default, Parser)] // requires `derive` feature
#[command(name = "check_path", version)]
#[command(
    about = "Nagios plugin used to monitor the age, size, existence and ownership of files",
    long_about = None
)]
#[command(allow_negative_numbers = true)]
pub struct Cli {
    /// Comma or space separated list of paths to check
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub paths: Vec<String>,

    /// Comma or space separated list of paths to skip
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub ignore: Vec<String>,

    /// Descend into subdirectories of each path
    #[arg(long)]
    pub recurse: bool,

    /// Treat a missing path as OK instead of CRITICAL
    #[arg(long)]
    pub missing_ok: bool,

    /// Stop at the first entry that crosses a threshold
    #[arg(long)]
    pub fail_fast: bool,

    /// File age in days at which CRITICAL is reported
    #[arg(long)]
    pub age_critical: Option<i64>,

    /// File age in days at which WARNING is reported
    #[arg(long)]
    pub age_warning: Option<i64>,

    /// Total size in bytes below which CRITICAL is reported
    #[arg(long)]
    pub size_min_critical: Option<i64>,

    /// Total size in bytes below which WARNING is reported
    #[arg(long)]
    pub size_min_warning: Option<i64>,

    /// Total size in bytes above which CRITICAL is reported
    #[arg(long)]
    pub size_max_critical: Option<i64>,

    /// Total size in bytes above which WARNING is reported
    #[arg(long)]
    pub size_max_warning: Option<i64>,

    /// Report CRITICAL if any specified path exists
    #[arg(long)]
    pub exists_critical: bool,

    /// Report WARNING if any specified path exists
    #[arg(long)]
    pub exists_warning: bool,

    /// Report CRITICAL if an entry is not owned by this username
    #[arg(long)]
    pub username_missing_critical: Option<String>,

    /// Report WARNING if an entry is not owned by this username
    #[arg(long)]
    pub username_missing_warning: Option<String>,

    /// Report CRITICAL if an entry does not belong to this group
    #[arg(long)]
    pub group_name_missing_critical: Option<String>,

    /// Report WARNING if an entry does not belong to this group
    #[arg(long)]
    pub group_name_missing_warning: Option<String>,

    /// One of disabled, panic, fatal, error, warn, info, debug or trace
    #[arg(long)]
    pub log_level: Option<String>,

    /// Append plugin name and version to the output
    #[arg(long)]
    pub emit_branding: bool,

    /// Settings file; defaults to an optional check-path.{toml,yaml,json} in the working directory
    #[arg(long)]
    pub config_file: Option<PathBuf>,
}
