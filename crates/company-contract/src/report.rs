// crates/company-contract/src/report.rs
// ============================================================================
// Module: Suite Reporting
// Description: Reporter hooks plus console and on-disk artifact reporters.
// Purpose: Surface per-case results while running and persist run summaries.
// Dependencies: serde, serde_jcs, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`SuiteReporter`] receives three hooks: once before the first case,
//! once per finished case, and once after the last case. Reporters are
//! synchronous; the runner calls them between requests.
//!
//! [`ArtifactReporter`] writes `summary.json` (canonical JSON),
//! `summary.md`, and `transcript.json` under a run root. When a run ends
//! without its finish hook firing, the reporter still writes an
//! `incomplete` summary on drop.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::client::TranscriptEntry;
use crate::config::ReportConfig;
use crate::runner::CaseOutcome;
use crate::runner::CleanupSummary;
use crate::runner::SuiteStart;
use crate::runner::SuiteSummary;
use crate::runner::now_millis;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Parent directory of default run roots.
const DEFAULT_ARTIFACT_DIR: &str = "target/company-contract";
/// Canonical JSON summary file.
pub const SUMMARY_JSON: &str = "summary.json";
/// Markdown summary file.
pub const SUMMARY_MARKDOWN: &str = "summary.md";
/// Request/response transcript file.
pub const TRANSCRIPT_JSON: &str = "transcript.json";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Reporter failures.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Writing report output failed.
    #[error("report io error: {0}")]
    Io(String),
    /// Report data could not be serialized.
    #[error("report serialization error: {0}")]
    Serialize(String),
    /// The run root already holds files and overwrite is not allowed.
    #[error("run root {} is not empty (allow overwrite to reuse it)", .0.display())]
    RunRootNotEmpty(PathBuf),
}

impl From<io::Error> for ReportError {
    fn from(err: io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// ============================================================================
// SECTION: Reporter Trait
// ============================================================================

/// Receives suite lifecycle events from the runner.
pub trait SuiteReporter: Send {
    /// Called once before the first case.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the reporter cannot record the event.
    fn suite_started(&mut self, start: &SuiteStart) -> Result<(), ReportError>;

    /// Called after each case.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the reporter cannot record the event.
    fn case_finished(&mut self, outcome: &CaseOutcome) -> Result<(), ReportError>;

    /// Called once after the last case.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the reporter cannot record the event.
    fn suite_finished(
        &mut self,
        summary: &SuiteSummary,
        transcript: &[TranscriptEntry],
    ) -> Result<(), ReportError>;
}

// ============================================================================
// SECTION: Console Reporter
// ============================================================================

/// Line-oriented reporter for terminals and logs.
pub struct ConsoleReporter<W> {
    /// Output sink.
    out: W,
}

impl<W: Write + Send> ConsoleReporter<W> {
    /// Creates a reporter writing to `out`.
    pub const fn new(out: W) -> Self {
        Self {
            out,
        }
    }

    /// Returns the output sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> SuiteReporter for ConsoleReporter<W> {
    fn suite_started(&mut self, start: &SuiteStart) -> Result<(), ReportError> {
        writeln!(
            self.out,
            "running {} scenarios against {}",
            start.scenarios.len(),
            start.base_url
        )?;
        Ok(())
    }

    fn case_finished(&mut self, outcome: &CaseOutcome) -> Result<(), ReportError> {
        let marker = if outcome.passed() { "PASS" } else { "FAIL" };
        write!(
            self.out,
            "[{marker}] {} ({} ms) {}",
            outcome.id, outcome.duration_ms, outcome.title
        )?;
        if let Some(failure) = &outcome.failure {
            write!(self.out, ": {failure}")?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn suite_finished(
        &mut self,
        summary: &SuiteSummary,
        _transcript: &[TranscriptEntry],
    ) -> Result<(), ReportError> {
        if let Some(cleanup) = &summary.cleanup {
            writeln!(
                self.out,
                "cleanup: {} deleted, {} failed",
                cleanup.deleted,
                cleanup.failed.len()
            )?;
        }
        writeln!(
            self.out,
            "{} passed, {} failed in {} ms",
            summary.passed, summary.failed, summary.duration_ms
        )?;
        self.out.flush()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Artifact Reporter
// ============================================================================

/// Persisted summary shape.
#[derive(Debug, Serialize)]
struct ArtifactSummary<'a> {
    /// `passed`, `failed`, or `incomplete`.
    status: &'static str,
    /// Base URL under test.
    base_url: &'a str,
    /// Run start in milliseconds since the Unix epoch.
    started_at_ms: u64,
    /// Run end in milliseconds since the Unix epoch.
    ended_at_ms: u64,
    /// Wall-clock duration in milliseconds.
    duration_ms: u64,
    /// Passed case count.
    passed: usize,
    /// Failed case count.
    failed: usize,
    /// Per-case outcomes.
    cases: &'a [CaseOutcome],
    /// Cleanup result, when cleanup ran.
    cleanup: Option<&'a CleanupSummary>,
    /// Free-form notes.
    notes: Vec<String>,
}

/// Writes run artifacts under a run root.
pub struct ArtifactReporter {
    /// Directory receiving the artifacts.
    root: PathBuf,
    /// Start event, once received.
    start: Option<SuiteStart>,
    /// Outcomes received so far.
    cases: Vec<CaseOutcome>,
    /// Whether the final summary was written.
    finalized: bool,
}

impl ArtifactReporter {
    /// Creates the run root and a reporter writing into it.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::RunRootNotEmpty`] when `root` holds entries and
    /// `allow_overwrite` is false, or [`ReportError::Io`] when it cannot be
    /// created.
    pub fn create(root: &Path, allow_overwrite: bool) -> Result<Self, ReportError> {
        if !allow_overwrite && root.exists() && fs::read_dir(root)?.next().is_some() {
            return Err(ReportError::RunRootNotEmpty(root.to_path_buf()));
        }
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            start: None,
            cases: Vec::new(),
            finalized: false,
        })
    }

    /// Creates a reporter from `[report]` settings, defaulting the run root
    /// to `target/company-contract/run_<ms>`.
    ///
    /// # Errors
    ///
    /// See [`ArtifactReporter::create`].
    pub fn from_config(config: &ReportConfig) -> Result<Self, ReportError> {
        let root = config.run_root.clone().unwrap_or_else(|| default_run_root(now_millis()));
        Self::create(&root, config.allow_overwrite)
    }

    /// Returns the run root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a JSON artifact using canonical JCS serialization.
    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<(), ReportError> {
        let bytes =
            serde_jcs::to_vec(value).map_err(|err| ReportError::Serialize(err.to_string()))?;
        fs::write(self.root.join(name), bytes)?;
        Ok(())
    }

    /// Writes both summary files.
    fn write_summary(&self, summary: &ArtifactSummary<'_>) -> Result<(), ReportError> {
        self.write_json(SUMMARY_JSON, summary)?;
        fs::write(self.root.join(SUMMARY_MARKDOWN), summary_markdown(summary))?;
        Ok(())
    }
}

impl SuiteReporter for ArtifactReporter {
    fn suite_started(&mut self, start: &SuiteStart) -> Result<(), ReportError> {
        self.start = Some(start.clone());
        Ok(())
    }

    fn case_finished(&mut self, outcome: &CaseOutcome) -> Result<(), ReportError> {
        self.cases.push(outcome.clone());
        Ok(())
    }

    fn suite_finished(
        &mut self,
        summary: &SuiteSummary,
        transcript: &[TranscriptEntry],
    ) -> Result<(), ReportError> {
        self.write_json(TRANSCRIPT_JSON, &transcript)?;
        self.write_summary(&ArtifactSummary {
            status: if summary.all_passed() { "passed" } else { "failed" },
            base_url: &summary.base_url,
            started_at_ms: summary.started_at_ms,
            ended_at_ms: summary.finished_at_ms,
            duration_ms: summary.duration_ms,
            passed: summary.passed,
            failed: summary.failed,
            cases: &summary.cases,
            cleanup: summary.cleanup.as_ref(),
            notes: Vec::new(),
        })?;
        self.finalized = true;
        Ok(())
    }
}

impl Drop for ArtifactReporter {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        let ended_at_ms = now_millis();
        let (base_url, started_at_ms) = self
            .start
            .as_ref()
            .map_or(("", ended_at_ms), |start| (start.base_url.as_str(), start.started_at_ms));
        let passed = self.cases.iter().filter(|case| case.passed()).count();
        let summary = ArtifactSummary {
            status: "incomplete",
            base_url,
            started_at_ms,
            ended_at_ms,
            duration_ms: ended_at_ms.saturating_sub(started_at_ms),
            passed,
            failed: self.cases.len() - passed,
            cases: &self.cases,
            cleanup: None,
            notes: vec!["suite terminated without a final summary".to_string()],
        };
        let _ = self.write_summary(&summary);
    }
}

// ============================================================================
// SECTION: Composite Reporter
// ============================================================================

/// Forwards every event to each inner reporter, in insertion order.
#[derive(Default)]
pub struct CompositeReporter {
    /// Inner reporters.
    reporters: Vec<Box<dyn SuiteReporter>>,
}

impl CompositeReporter {
    /// Creates an empty composite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a reporter.
    #[must_use]
    pub fn with(mut self, reporter: Box<dyn SuiteReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    /// Returns the number of inner reporters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    /// Returns true when no reporter is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }
}

impl SuiteReporter for CompositeReporter {
    fn suite_started(&mut self, start: &SuiteStart) -> Result<(), ReportError> {
        self.reporters.iter_mut().try_for_each(|reporter| reporter.suite_started(start))
    }

    fn case_finished(&mut self, outcome: &CaseOutcome) -> Result<(), ReportError> {
        self.reporters.iter_mut().try_for_each(|reporter| reporter.case_finished(outcome))
    }

    fn suite_finished(
        &mut self,
        summary: &SuiteSummary,
        transcript: &[TranscriptEntry],
    ) -> Result<(), ReportError> {
        self.reporters
            .iter_mut()
            .try_for_each(|reporter| reporter.suite_finished(summary, transcript))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the default run root for a run starting at `started_at_ms`.
#[must_use]
pub fn default_run_root(started_at_ms: u64) -> PathBuf {
    PathBuf::from(DEFAULT_ARTIFACT_DIR).join(format!("run_{started_at_ms}"))
}

/// Renders the Markdown summary.
fn summary_markdown(summary: &ArtifactSummary<'_>) -> String {
    let mut out = String::new();
    out.push_str("# Company Contract Summary\n\n");
    out.push_str("## Status\n\n");
    let _ = writeln!(out, "- Base URL: {}", summary.base_url);
    let _ = writeln!(out, "- Status: {}", summary.status);
    let _ = writeln!(out, "- Passed: {}", summary.passed);
    let _ = writeln!(out, "- Failed: {}", summary.failed);
    let _ = writeln!(out, "- Duration (ms): {}", summary.duration_ms);
    out.push_str("\n## Cases\n\n");
    if summary.cases.is_empty() {
        out.push_str("- None\n");
    } else {
        out.push_str("| Scenario | Group | Status | Duration (ms) | Detail |\n");
        out.push_str("|---|---|---|---|---|\n");
        for case in summary.cases {
            let detail = case.failure.clone().unwrap_or_else(|| case.notes.join("; "));
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                case.id,
                case.group,
                case.status.as_str(),
                case.duration_ms,
                detail.replace('|', "\\|")
            );
        }
    }
    if let Some(cleanup) = summary.cleanup {
        out.push_str("\n## Cleanup\n\n");
        let _ = writeln!(out, "- Deleted: {}", cleanup.deleted);
        let _ = writeln!(out, "- Failed: {}", cleanup.failed.len());
    }
    out.push_str("\n## Notes\n\n");
    if summary.notes.is_empty() {
        out.push_str("- None\n");
    } else {
        for note in &summary.notes {
            let _ = writeln!(out, "- {note}");
        }
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
