use crate::cli::Cli;
use crate::error::ConfigError;
use crate::evaluator::{
    AgeThreshold, IdentityField, IdentityThreshold, Severity, SizeRole, SizeThreshold,
    ThresholdSet,
};
use crate::utils::path::split_path_list;
use config::{Config, Environment, File as ConfigFile};
use indicatif::HumanBytes;
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

const ENV_PREFIX: &str = "CHECK_PATH";
const DEFAULT_FILE_NAME: &str = "check-path";

/// Raw settings as merged from file, environment and command line. Nothing
/// here has been validated yet; see [`Settings::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub paths_include: Option<Vec<String>>,
    pub paths_ignore: Option<Vec<String>>,
    pub recurse: Option<bool>,
    pub missing_ok: Option<bool>,
    pub fail_fast: Option<bool>,
    pub age_critical: Option<i64>,
    pub age_warning: Option<i64>,
    pub size_min_critical: Option<i64>,
    pub size_min_warning: Option<i64>,
    pub size_max_critical: Option<i64>,
    pub size_max_warning: Option<i64>,
    pub exists_critical: Option<bool>,
    pub exists_warning: Option<bool>,
    pub username_missing_critical: Option<String>,
    pub username_missing_warning: Option<String>,
    pub group_name_missing_critical: Option<String>,
    pub group_name_missing_warning: Option<String>,
    pub log_level: Option<String>,
    pub emit_branding: Option<bool>,
}

impl Settings {
    /// Layers an optional settings file, `CHECK_PATH_*` environment variables
    /// and the command line, in increasing order of precedence.
    pub fn load(cli: &Cli) -> Result<Settings, ConfigError> {
        let file = match &cli.config_file {
            Some(path) => ConfigFile::from(path.clone()),
            None => ConfigFile::with_name(DEFAULT_FILE_NAME).required(false),
        };

        let builder = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("paths_include")
                    .with_list_parse_key("paths_ignore"),
            )
            .set_override_option("paths_include", non_empty(&cli.paths))?
            .set_override_option("paths_ignore", non_empty(&cli.ignore))?
            .set_override_option("recurse", cli.recurse.then_some(true))?
            .set_override_option("missing_ok", cli.missing_ok.then_some(true))?
            .set_override_option("fail_fast", cli.fail_fast.then_some(true))?
            .set_override_option("age_critical", cli.age_critical)?
            .set_override_option("age_warning", cli.age_warning)?
            .set_override_option("size_min_critical", cli.size_min_critical)?
            .set_override_option("size_min_warning", cli.size_min_warning)?
            .set_override_option("size_max_critical", cli.size_max_critical)?
            .set_override_option("size_max_warning", cli.size_max_warning)?
            .set_override_option("exists_critical", cli.exists_critical.then_some(true))?
            .set_override_option("exists_warning", cli.exists_warning.then_some(true))?
            .set_override_option(
                "username_missing_critical",
                cli.username_missing_critical.clone(),
            )?
            .set_override_option("username_missing_warning", cli.username_missing_warning.clone())?
            .set_override_option(
                "group_name_missing_critical",
                cli.group_name_missing_critical.clone(),
            )?
            .set_override_option(
                "group_name_missing_warning",
                cli.group_name_missing_warning.clone(),
            )?
            .set_override_option("log_level", cli.log_level.clone())?
            .set_override_option("emit_branding", cli.emit_branding.then_some(true))?
            .build()?;

        Ok(builder.try_deserialize::<Settings>()?)
    }

    fn non_existence_thresholds_given(&self) -> bool {
        [
            self.age_critical,
            self.age_warning,
            self.size_min_critical,
            self.size_min_warning,
            self.size_max_critical,
            self.size_max_warning,
        ]
        .iter()
        .any(Option::is_some)
            || [
                &self.username_missing_critical,
                &self.username_missing_warning,
                &self.group_name_missing_critical,
                &self.group_name_missing_warning,
            ]
            .iter()
            .any(|name| name.is_some())
    }

    /// Applies every validation rule and produces the immutable run config.
    pub fn validate(self) -> Result<CheckConfig, ConfigError> {
        let paths = split_path_list(self.paths_include.as_deref().unwrap_or_default());
        if paths.is_empty() {
            return Err(ConfigError::NoPaths);
        }
        let exclusions = split_path_list(self.paths_ignore.as_deref().unwrap_or_default());

        let log_level = match self.log_level.as_deref() {
            Some(raw) => raw.parse::<LogLevel>()?,
            None => LogLevel::default(),
        };

        let exists_critical = self.exists_critical.unwrap_or(false);
        let exists_warning = self.exists_warning.unwrap_or(false);
        if self.non_existence_thresholds_given() {
            if exists_critical {
                return Err(ConfigError::ExistsIncompatible("exists-critical"));
            }
            if exists_warning {
                return Err(ConfigError::ExistsIncompatible("exists-warning"));
            }
        }
        let existence = match (exists_critical, exists_warning) {
            (true, true) => return Err(ConfigError::ExistsConflict),
            (true, false) => Some(Severity::Critical),
            (false, true) => Some(Severity::Warning),
            (false, false) => None,
        };

        let thresholds = ThresholdSet {
            age: AgeThreshold::from_pair(self.age_critical, self.age_warning)?,
            size_max: SizeThreshold::from_pair(
                SizeRole::Max,
                self.size_max_critical,
                self.size_max_warning,
            )?,
            size_min: SizeThreshold::from_pair(
                SizeRole::Min,
                self.size_min_critical,
                self.size_min_warning,
            )?,
            username: IdentityThreshold::from_modes(
                IdentityField::Username,
                self.username_missing_critical,
                self.username_missing_warning,
            )?,
            group_name: IdentityThreshold::from_modes(
                IdentityField::GroupName,
                self.group_name_missing_critical,
                self.group_name_missing_warning,
            )?,
        };

        if existence.is_none() && thresholds.is_empty() {
            return Err(ConfigError::NoChecks);
        }

        Ok(CheckConfig {
            paths: paths.into_iter().map(PathBuf::from).collect(),
            exclusions: exclusions.into_iter().map(PathBuf::from).collect(),
            recursive: self.recurse.unwrap_or(false),
            missing_ok: self.missing_ok.unwrap_or(false),
            fail_fast: self.fail_fast.unwrap_or(false),
            thresholds,
            existence,
            log_level,
            emit_branding: self.emit_branding.unwrap_or(false),
        })
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Disabled,
    Panic,
    Fatal,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Disabled => LevelFilter::OFF,
            LogLevel::Panic | LogLevel::Fatal | LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" => Ok(LogLevel::Disabled),
            "panic" => Ok(LogLevel::Panic),
            "fatal" => Ok(LogLevel::Fatal),
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

/// Validated, immutable settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    pub paths: Vec<PathBuf>,
    pub exclusions: Vec<PathBuf>,
    pub recursive: bool,
    pub missing_ok: bool,
    pub fail_fast: bool,
    pub thresholds: ThresholdSet,
    /// Set when running in existence mode; no other threshold is then active.
    pub existence: Option<Severity>,
    pub log_level: LogLevel,
    pub emit_branding: bool,
}

impl CheckConfig {
    /// Leading detail lines describing what was asked for.
    pub fn overview_lines(&self) -> Vec<String> {
        let join = |paths: &[PathBuf]| {
            if paths.is_empty() {
                "None".to_string()
            } else {
                paths
                    .iter()
                    .map(|path| format!("{:?}", path.display().to_string()))
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        };

        vec![
            format!("* Paths to check: {}", join(&self.paths)),
            format!("* Paths to ignore: {}", join(&self.exclusions)),
            format!("* Recursive: {}", self.recursive),
            format!("* Missing OK: {}", self.missing_ok),
            format!("* Fail fast: {}", self.fail_fast),
            format!("* Plugin: {}", crate::branding()),
        ]
    }

    pub fn threshold_description(&self, severity: Severity) -> String {
        let mut parts = Vec::new();

        if self.existence == Some(severity) {
            parts.push("[Paths exist]".to_string());
        }
        if let Some(age) = &self.thresholds.age {
            parts.push(format!("[File age in days: {}]", age.days_for(severity)));
        }
        for size in [&self.thresholds.size_min, &self.thresholds.size_max]
            .into_iter()
            .flatten()
        {
            let label = match size.role {
                SizeRole::Min => "Minimum",
                SizeRole::Max => "Maximum",
            };
            let bytes = size.bytes_for(severity);
            parts.push(format!(
                "[{} file size (bytes: {}, Human: {})]",
                label,
                bytes,
                HumanBytes(bytes)
            ));
        }
        for identity in [&self.thresholds.username, &self.thresholds.group_name]
            .into_iter()
            .flatten()
            .filter(|identity| identity.severity == severity)
        {
            let label = match identity.field {
                IdentityField::Username => "Username",
                IdentityField::GroupName => "Group name",
            };
            parts.push(format!("[{}: {:?}]", label, identity.expected));
        }

        if parts.is_empty() {
            "N/A".to_string()
        } else {
            parts.join(", ")
        }
    }

    pub fn branding(&self) -> Option<String> {
        self.emit_branding.then(crate::branding)
    }
}
