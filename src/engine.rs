//! Drives one walker per configured path and reduces everything to a single
//! [`Verdict`].
//!
//! Paths are processed strictly in order. Each gets a fresh [`PathWalker`]
//! and [`CancelToken`]; the engine consumes the walk either record by record
//! (fail-fast) or after collecting the whole tree (batch), and stops at the
//! first outcome that is not OK.

use crate::config::CheckConfig;
use crate::error::{CheckError, WalkError};
use crate::evaluator::{self, existence, Crossing, Outcome, Severity};
use crate::model::RecordSet;
use crate::platform::IdentityResolver;
use crate::progress::EvaluationReporter;
use crate::scanner::{CancelToken, PathWalker, WalkItem};
use crate::verdict::{PassSummary, Verdict};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// A crossing and where it was found.
#[derive(Debug)]
pub struct Finding {
    pub root: PathBuf,
    pub crossing: Crossing,
    /// Entries examined for `root` when the crossing was decided.
    pub evaluated: usize,
}

#[derive(Debug)]
pub enum RunState {
    Running,
    Ok,
    Warning(Finding),
    Critical(Finding),
    Fatal {
        root: Option<PathBuf>,
        cause: CheckError,
    },
}

impl RunState {
    fn crossed(finding: Finding) -> Self {
        match finding.crossing.severity {
            Severity::Warning => RunState::Warning(finding),
            Severity::Critical => RunState::Critical(finding),
        }
    }

    fn fatal(root: &Path, cause: CheckError) -> Self {
        RunState::Fatal {
            root: Some(root.to_path_buf()),
            cause,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunState::Running)
    }
}

/// Counters for conditions absorbed instead of failing the run.
#[derive(Debug, Default)]
pub struct RunTally {
    pub evaluated_roots: usize,
    pub missing: Vec<PathBuf>,
    pub ignored: Vec<PathBuf>,
}

pub struct CheckEngine<'a> {
    config: &'a CheckConfig,
    resolver: &'a dyn IdentityResolver,
    reporter: &'a dyn EvaluationReporter,
    now: DateTime<Local>,
}

impl<'a> CheckEngine<'a> {
    pub fn new(
        config: &'a CheckConfig,
        resolver: &'a dyn IdentityResolver,
        reporter: &'a dyn EvaluationReporter,
    ) -> Self {
        Self {
            config,
            resolver,
            reporter,
            now: Local::now(),
        }
    }

    /// Fixes the reference time used for age checks.
    pub fn with_now(mut self, now: DateTime<Local>) -> Self {
        self.now = now;
        self
    }

    pub fn run(&self) -> Verdict {
        let started = Instant::now();
        let mut tally = RunTally::default();

        let state = match self.config.existence {
            Some(severity) => self.run_existence(severity),
            None => self.run_roots(&mut tally),
        };
        let verdict = self.conclude(state, &tally);

        self.reporter.on_complete(&verdict, started.elapsed());
        verdict
    }

    fn run_existence(&self, severity: Severity) -> RunState {
        match existence::existence_verdict(&self.config.paths, severity) {
            Outcome::Ok => RunState::Ok,
            Outcome::Crossed(crossing) => {
                let root = crossing
                    .record
                    .as_ref()
                    .map(|record| record.path.clone())
                    .unwrap_or_default();
                self.reporter.on_threshold_crossed(&root, &crossing);
                RunState::crossed(Finding {
                    root,
                    crossing,
                    evaluated: 0,
                })
            }
            Outcome::Fatal(cause) => {
                self.reporter.on_fatal(None, &cause);
                RunState::Fatal { root: None, cause }
            }
        }
    }

    fn run_roots(&self, tally: &mut RunTally) -> RunState {
        for root in &self.config.paths {
            self.reporter.on_root_start(root);

            let state = if self.config.fail_fast {
                self.stream_root(root, tally)
            } else {
                self.batch_root(root, tally)
            };

            match &state {
                RunState::Running => continue,
                RunState::Warning(finding) | RunState::Critical(finding) => {
                    self.reporter.on_threshold_crossed(root, &finding.crossing)
                }
                RunState::Fatal { cause, .. } => self.reporter.on_fatal(Some(root), cause),
                RunState::Ok => {}
            }
            return state;
        }

        RunState::Ok
    }

    fn walker(&self, root: &Path, cancel: &CancelToken) -> PathWalker {
        PathWalker::new(root, cancel.clone())
            .exclusions(&self.config.exclusions)
            .recursive(self.config.recursive)
    }

    /// Records a tolerable walk condition, or hands back the fatal cause.
    fn absorb(&self, condition: WalkError, tally: &mut RunTally) -> Result<(), CheckError> {
        if !condition.is_tolerable(self.config.missing_ok) {
            return Err(condition.into());
        }
        self.reporter.on_tolerated(&condition);
        match condition {
            WalkError::NotFound(path) => tally.missing.push(path),
            WalkError::Ignored(path) => tally.ignored.push(path),
            _ => {}
        }
        Ok(())
    }

    /// Evaluates each record as it arrives. Size is judged against the total
    /// of the files seen so far for this root.
    fn stream_root(&self, root: &Path, tally: &mut RunTally) -> RunState {
        let cancel = CancelToken::new();
        let stream = match self.walker(root, &cancel).spawn() {
            Ok(stream) => stream,
            Err(err) => return RunState::fatal(root, CheckError::Spawn(err)),
        };

        let mut running_total = 0u64;
        let mut seen = 0usize;
        let mut state = RunState::Running;

        for item in stream {
            let record = match item {
                Ok(record) => record,
                Err(condition) => match self.absorb(condition, tally) {
                    Ok(()) => continue,
                    Err(cause) => {
                        cancel.cancel();
                        state = RunState::fatal(root, cause);
                        break;
                    }
                },
            };

            self.reporter.on_record(&record);
            seen += 1;
            let total = if record.is_dir {
                None
            } else {
                running_total += record.size;
                Some(running_total)
            };

            let mut single = RecordSet::from(vec![record]);
            match evaluator::evaluate(
                &mut single,
                total,
                &self.config.thresholds,
                self.resolver,
                self.now,
            ) {
                Outcome::Ok => {}
                Outcome::Crossed(crossing) => {
                    cancel.cancel();
                    state = RunState::crossed(Finding {
                        root: root.to_path_buf(),
                        crossing,
                        evaluated: seen,
                    });
                    break;
                }
                Outcome::Fatal(cause) => {
                    cancel.cancel();
                    state = RunState::fatal(root, cause);
                    break;
                }
            }
        }

        if seen > 0 {
            tally.evaluated_roots += 1;
            if !state.is_terminal() {
                self.reporter.on_root_complete(root, seen, running_total);
            }
        }
        debug!(path = %root.display(), seen, running_total, "streamed path");
        state
    }

    /// Collects the whole tree, then evaluates it as one batch.
    fn batch_root(&self, root: &Path, tally: &mut RunTally) -> RunState {
        let cancel = CancelToken::new();
        let stream = match self.walker(root, &cancel).spawn() {
            Ok(stream) => stream,
            Err(err) => return RunState::fatal(root, CheckError::Spawn(err)),
        };

        let mut records = match self.collect(stream, &cancel, tally) {
            Ok(records) => records,
            Err(cause) => return RunState::fatal(root, cause),
        };
        if records.is_empty() {
            return RunState::Running;
        }

        tally.evaluated_roots += 1;
        let total = records.total_size();
        self.reporter.on_root_complete(root, records.len(), total);

        match evaluator::evaluate(
            &mut records,
            Some(total),
            &self.config.thresholds,
            self.resolver,
            self.now,
        ) {
            Outcome::Ok => RunState::Running,
            Outcome::Crossed(crossing) => RunState::crossed(Finding {
                root: root.to_path_buf(),
                crossing,
                evaluated: records.len(),
            }),
            Outcome::Fatal(cause) => RunState::fatal(root, cause),
        }
    }

    fn collect(
        &self,
        stream: impl Iterator<Item = WalkItem>,
        cancel: &CancelToken,
        tally: &mut RunTally,
    ) -> Result<RecordSet, CheckError> {
        let mut records = RecordSet::new();
        for item in stream {
            match item {
                Ok(record) => {
                    self.reporter.on_record(&record);
                    records.push(record);
                }
                Err(condition) => {
                    if let Err(cause) = self.absorb(condition, tally) {
                        cancel.cancel();
                        return Err(cause);
                    }
                }
            }
        }
        Ok(records)
    }

    fn conclude(&self, state: RunState, tally: &RunTally) -> Verdict {
        let verdict = match state {
            RunState::Running | RunState::Ok => {
                if self.config.existence.is_some() {
                    Verdict::existence_ok()
                } else {
                    Verdict::passed(&PassSummary {
                        evaluated: tally.evaluated_roots,
                        total: self.config.paths.len(),
                        missing: tally.missing.len(),
                        ignored: tally.ignored.len(),
                        checks: self.config.thresholds.active_checks(),
                    })
                    .with_leading_details(tolerated_lines(tally))
                }
            }
            RunState::Warning(finding) | RunState::Critical(finding) => Verdict::crossed(
                &finding.crossing,
                &finding.root,
                finding.evaluated,
                self.config.fail_fast,
            ),
            RunState::Fatal { root, cause } => Verdict::fatal(root.as_deref(), &cause),
        };

        verdict
            .with_thresholds(
                self.config.threshold_description(Severity::Critical),
                self.config.threshold_description(Severity::Warning),
            )
            .with_leading_details(self.config.overview_lines())
    }
}

fn tolerated_lines(tally: &RunTally) -> Vec<String> {
    let list = |paths: &[PathBuf]| {
        paths
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut lines = Vec::new();
    if !tally.missing.is_empty() {
        lines.push(format!("* Missing paths: {}", list(&tally.missing)));
    }
    if !tally.ignored.is_empty() {
        lines.push(format!("* Ignored paths: {}", list(&tally.ignored)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::platform::UnsupportedIdentityResolver;
    use crate::progress::SilentReporter;
    use crate::verdict::State;
    use std::fs;

    fn config_for(root: &Path, fail_fast: bool) -> CheckConfig {
        Settings {
            paths_include: Some(vec![root.display().to_string()]),
            size_max_critical: Some(1000),
            size_max_warning: Some(800),
            fail_fast: Some(fail_fast),
            ..Settings::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_missing_root_is_fatal_without_missing_ok() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(&dir.path().join("absent"), false);
        let verdict =
            CheckEngine::new(&config, &UnsupportedIdentityResolver, &SilentReporter).run();

        assert_eq!(verdict.state, State::Fatal);
        assert!(verdict.summary.starts_with("Error processing path "));
        assert!(verdict.last_error.unwrap().contains("path does not exist"));
    }

    #[test]
    fn test_modes_agree_on_clean_tree() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), vec![0u8; 100]).unwrap();
        fs::write(dir.path().join("b"), vec![0u8; 200]).unwrap();

        let batch = config_for(dir.path(), false);
        let stream = config_for(dir.path(), true);
        let batch_verdict =
            CheckEngine::new(&batch, &UnsupportedIdentityResolver, &SilentReporter).run();
        let stream_verdict =
            CheckEngine::new(&stream, &UnsupportedIdentityResolver, &SilentReporter).run();

        assert_eq!(batch_verdict.state, State::Ok);
        assert_eq!(stream_verdict.state, State::Ok);
        assert_eq!(batch_verdict.summary, stream_verdict.summary);
        assert_eq!(
            batch_verdict.summary,
            "1/1 specified paths pass max size validation checks (0 missing, 0 ignored by request)"
        );
    }

    #[test]
    fn test_conclusion_starts_with_overview() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), false);
        let verdict =
            CheckEngine::new(&config, &UnsupportedIdentityResolver, &SilentReporter).run();
        assert_eq!(verdict.detail_lines, config.overview_lines());
        assert_eq!(verdict.critical_threshold, config.threshold_description(Severity::Critical));
    }
}
