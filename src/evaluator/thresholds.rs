//! Threshold definitions and the rules that make a threshold pair valid.

use super::{CheckKind, Severity};
use crate::error::ConfigError;
use crate::platform;

const CRITICAL: &str = "CRITICAL";
const WARNING: &str = "WARNING";

/// File age limits in days. Warning is the looser (smaller) bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeThreshold {
    pub critical_days: u64,
    pub warning_days: u64,
}

impl AgeThreshold {
    /// Validates a critical/warning pair. `Ok(None)` when neither is given.
    pub fn from_pair(
        critical: Option<i64>,
        warning: Option<i64>,
    ) -> Result<Option<Self>, ConfigError> {
        let (critical, warning) = match (critical, warning) {
            (None, None) => return Ok(None),
            (None, Some(_)) => return Err(ConfigError::AgeMissing(CRITICAL)),
            (Some(_), None) => return Err(ConfigError::AgeMissing(WARNING)),
            (Some(critical), Some(warning)) => (critical, warning),
        };

        if critical <= 0 {
            return Err(ConfigError::AgeTooSmall {
                value: critical,
                label: CRITICAL,
            });
        }
        if warning <= 0 {
            return Err(ConfigError::AgeTooSmall {
                value: warning,
                label: WARNING,
            });
        }

        let (critical, warning) = (critical as u64, warning as u64);
        if warning > critical {
            return Err(ConfigError::AgeWarningGreater { warning, critical });
        }
        if warning == critical {
            return Err(ConfigError::AgeWarningEqual { warning, critical });
        }

        Ok(Some(Self {
            critical_days: critical,
            warning_days: warning,
        }))
    }

    pub fn days_for(&self, severity: Severity) -> u64 {
        match severity {
            Severity::Critical => self.critical_days,
            Severity::Warning => self.warning_days,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeRole {
    Min,
    Max,
}

impl SizeRole {
    pub fn description(self) -> &'static str {
        match self {
            SizeRole::Min => "minimum",
            SizeRole::Max => "maximum",
        }
    }

    pub fn kind(self) -> CheckKind {
        match self {
            SizeRole::Min => CheckKind::SizeMin,
            SizeRole::Max => CheckKind::SizeMax,
        }
    }
}

/// Aggregate size limits in bytes. Min and max are configured independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeThreshold {
    pub role: SizeRole,
    pub critical_bytes: u64,
    pub warning_bytes: u64,
}

impl SizeThreshold {
    pub fn from_pair(
        role: SizeRole,
        critical: Option<i64>,
        warning: Option<i64>,
    ) -> Result<Option<Self>, ConfigError> {
        let desc = role.description();
        let (critical, warning) = match (critical, warning) {
            (None, None) => return Ok(None),
            (None, Some(_)) => {
                return Err(ConfigError::SizeMissing {
                    role: desc,
                    label: CRITICAL,
                })
            }
            (Some(_), None) => {
                return Err(ConfigError::SizeMissing {
                    role: desc,
                    label: WARNING,
                })
            }
            (Some(critical), Some(warning)) => (critical, warning),
        };

        if critical <= 0 {
            return Err(ConfigError::SizeTooSmall {
                role: desc,
                value: critical,
                label: CRITICAL,
            });
        }
        if warning <= 0 {
            return Err(ConfigError::SizeTooSmall {
                role: desc,
                value: warning,
                label: WARNING,
            });
        }

        let (critical, warning) = (critical as u64, warning as u64);
        match role {
            SizeRole::Max if warning > critical => {
                return Err(ConfigError::SizeWarningGreater {
                    role: desc,
                    warning,
                    critical,
                })
            }
            SizeRole::Min if warning < critical => {
                return Err(ConfigError::SizeWarningLess {
                    role: desc,
                    warning,
                    critical,
                })
            }
            _ => {}
        }
        if warning == critical {
            return Err(ConfigError::SizeWarningEqual {
                role: desc,
                warning,
                critical,
            });
        }

        Ok(Some(Self {
            role,
            critical_bytes: critical,
            warning_bytes: warning,
        }))
    }

    pub fn bytes_for(&self, severity: Severity) -> u64 {
        match severity {
            Severity::Critical => self.critical_bytes,
            Severity::Warning => self.warning_bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Username,
    GroupName,
}

impl IdentityField {
    fn flag_prefix(self) -> &'static str {
        match self {
            IdentityField::Username => "username",
            IdentityField::GroupName => "group-name",
        }
    }

    pub fn kind(self) -> CheckKind {
        match self {
            IdentityField::Username => CheckKind::Username,
            IdentityField::GroupName => CheckKind::GroupName,
        }
    }
}

/// Expected owner or group for every evaluated entry, at one severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityThreshold {
    pub field: IdentityField,
    pub expected: String,
    pub severity: Severity,
}

impl IdentityThreshold {
    pub fn from_modes(
        field: IdentityField,
        critical: Option<String>,
        warning: Option<String>,
    ) -> Result<Option<Self>, ConfigError> {
        let (expected, severity) = match (critical, warning) {
            (None, None) => return Ok(None),
            (Some(_), Some(_)) => return Err(ConfigError::IdentityConflict(field.flag_prefix())),
            (Some(name), None) => (name, Severity::Critical),
            (None, Some(name)) => (name, Severity::Warning),
        };

        let flag = match (field, severity) {
            (IdentityField::Username, Severity::Critical) => "username-missing-critical",
            (IdentityField::Username, Severity::Warning) => "username-missing-warning",
            (IdentityField::GroupName, Severity::Critical) => "group-name-missing-critical",
            (IdentityField::GroupName, Severity::Warning) => "group-name-missing-warning",
        };

        if !platform::identity_supported() {
            return Err(ConfigError::IdentityUnsupported(flag));
        }

        let reason = if expected.is_empty() {
            Some(match field {
                IdentityField::Username => "username is empty string",
                IdentityField::GroupName => "group name is empty string",
            })
        } else if expected.contains(' ') {
            Some(match field {
                IdentityField::Username => "username contains spaces",
                IdentityField::GroupName => "group name contains spaces",
            })
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(ConfigError::InvalidName {
                flag,
                value: expected,
                reason,
            });
        }

        Ok(Some(Self {
            field,
            expected,
            severity,
        }))
    }
}

/// Every non-existence threshold configured for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThresholdSet {
    pub age: Option<AgeThreshold>,
    pub size_min: Option<SizeThreshold>,
    pub size_max: Option<SizeThreshold>,
    pub username: Option<IdentityThreshold>,
    pub group_name: Option<IdentityThreshold>,
}

impl ThresholdSet {
    pub fn is_empty(&self) -> bool {
        self.age.is_none() && !self.size_enabled() && !self.identity_enabled()
    }

    pub fn size_enabled(&self) -> bool {
        self.size_min.is_some() || self.size_max.is_some()
    }

    pub fn identity_enabled(&self) -> bool {
        self.username.is_some() || self.group_name.is_some()
    }

    /// Names of the active check kinds, for summaries.
    pub fn active_checks(&self) -> Vec<&'static str> {
        let mut checks = Vec::new();
        if self.size_min.is_some() {
            checks.push("min size");
        }
        if self.size_max.is_some() {
            checks.push("max size");
        }
        if self.age.is_some() {
            checks.push("age");
        }
        if self.username.is_some() {
            checks.push("username");
        }
        if self.group_name.is_some() {
            checks.push("group name");
        }
        checks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_pair_requires_both_values() {
        assert!(matches!(
            AgeThreshold::from_pair(Some(30), None),
            Err(ConfigError::AgeMissing("WARNING"))
        ));
        assert!(matches!(
            AgeThreshold::from_pair(None, Some(20)),
            Err(ConfigError::AgeMissing("CRITICAL"))
        ));
        assert_eq!(AgeThreshold::from_pair(None, None).unwrap(), None);
    }

    #[test]
    fn test_age_warning_must_be_looser() {
        assert!(matches!(
            AgeThreshold::from_pair(Some(20), Some(30)),
            Err(ConfigError::AgeWarningGreater { .. })
        ));
        assert!(matches!(
            AgeThreshold::from_pair(Some(20), Some(20)),
            Err(ConfigError::AgeWarningEqual { .. })
        ));
        assert!(matches!(
            AgeThreshold::from_pair(Some(0), Some(20)),
            Err(ConfigError::AgeTooSmall { value: 0, .. })
        ));
        let ths = AgeThreshold::from_pair(Some(30), Some(20)).unwrap().unwrap();
        assert_eq!(ths.critical_days, 30);
        assert_eq!(ths.warning_days, 20);
    }

    #[test]
    fn test_size_max_warning_must_not_exceed_critical() {
        assert!(matches!(
            SizeThreshold::from_pair(SizeRole::Max, Some(100), Some(200)),
            Err(ConfigError::SizeWarningGreater { .. })
        ));
        assert!(SizeThreshold::from_pair(SizeRole::Max, Some(200), Some(100))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_size_min_warning_must_not_undercut_critical() {
        assert!(matches!(
            SizeThreshold::from_pair(SizeRole::Min, Some(200), Some(100)),
            Err(ConfigError::SizeWarningLess { .. })
        ));
        assert!(matches!(
            SizeThreshold::from_pair(SizeRole::Min, Some(100), Some(100)),
            Err(ConfigError::SizeWarningEqual { .. })
        ));
        let ths = SizeThreshold::from_pair(SizeRole::Min, Some(100), Some(200))
            .unwrap()
            .unwrap();
        assert_eq!(ths.bytes_for(Severity::Warning), 200);
    }

    #[test]
    fn test_size_rejects_negative_values() {
        let err = SizeThreshold::from_pair(SizeRole::Max, Some(-5), Some(1)).unwrap_err();
        assert!(err.to_string().contains("(-5)"));
    }

    #[cfg(unix)]
    #[test]
    fn test_identity_modes_are_exclusive_and_validated() {
        assert!(matches!(
            IdentityThreshold::from_modes(
                IdentityField::Username,
                Some("root".into()),
                Some("svc".into())
            ),
            Err(ConfigError::IdentityConflict("username"))
        ));
        assert!(matches!(
            IdentityThreshold::from_modes(
                IdentityField::GroupName,
                None,
                Some("wheel users".into()),
            ),
            Err(ConfigError::InvalidName { reason: "group name contains spaces", .. })
        ));
        let ths = IdentityThreshold::from_modes(IdentityField::Username, None, Some("svc".into()))
            .unwrap()
            .unwrap();
        assert_eq!(ths.severity, Severity::Warning);
        assert_eq!(ths.expected, "svc");
    }

    #[test]
    fn test_active_checks_order() {
        let set = ThresholdSet {
            age: Some(AgeThreshold {
                critical_days: 2,
                warning_days: 1,
            }),
            size_max: Some(SizeThreshold {
                role: SizeRole::Max,
                critical_bytes: 2,
                warning_bytes: 1,
            }),
            ..ThresholdSet::default()
        };
        assert_eq!(set.active_checks(), vec!["max size", "age"]);
        assert!(!set.is_empty());
        assert!(ThresholdSet::default().is_empty());
    }
}
