//! Run reporting: the overridable hooks and the built-in reporters

use bevy::prelude::*;
use chrono::Local;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use super::case::TestError;

/// Aggregate results of one suite run
#[derive(Debug, Clone, Serialize)]
pub struct RunTotals {
    pub passed: u32,
    pub failed: u32,
    pub elapsed_secs: f32,
}

impl RunTotals {
    /// Number of test methods that produced an outcome
    pub fn total(&self) -> u32 {
        self.passed + self.failed
    }
}

/// Observer hooks for run progress.
///
/// The runner calls `failure` the moment a failure is recorded (a method
/// can produce more than one, e.g. a failing body followed by a failing
/// teardown), `success` once when a method completes clean, and `total`
/// exactly once at the end of the run. These hooks are the only output
/// channel a run has.
pub trait Reporter: Send + Sync {
    /// A method passed. Default: nothing; passes only show up in the totals.
    fn success(&mut self, _case: &str, _method: &str) {}

    /// A failure was recorded against a method
    fn failure(&mut self, case: &str, method: &str, error: &TestError) {
        error!("Error while running test {}::{}\n{}", case, method, error);
    }

    /// The run finished
    fn total(&mut self, totals: &RunTotals) {
        let text = format!("Ran {} tests in {:.3}s", totals.total(), totals.elapsed_secs);
        if totals.failed == 0 {
            info!("{}\nOK", text);
        } else {
            error!(
                "{}\nSuccessful: {}    Failed: {}",
                text, totals.passed, totals.failed
            );
        }
    }
}

/// Default reporter: log-only output through the host's logging channel
#[derive(Debug, Default)]
pub struct LogReporter {
    /// Also log an info line per passing test
    pub verbose: bool,
}

impl Reporter for LogReporter {
    fn success(&mut self, case: &str, method: &str) {
        if self.verbose {
            info!("Test {}::{} passed", case, method);
        }
    }
}

/// One entry of the JSON run report
#[derive(Debug, Clone, Serialize)]
pub struct TestRecord {
    pub case: String,
    pub method: String,
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
struct RunReport<'a> {
    finished_at: String,
    passed: u32,
    failed: u32,
    elapsed_secs: f32,
    tests: &'a [TestRecord],
}

/// Reporter that writes a JSON summary file when the run finishes
pub struct JsonReporter {
    path: PathBuf,
    records: Vec<TestRecord>,
}

impl JsonReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    /// Records collected so far, one per method that reached an outcome
    pub fn records(&self) -> &[TestRecord] {
        &self.records
    }
}

impl Reporter for JsonReporter {
    fn success(&mut self, case: &str, method: &str) {
        self.records.push(TestRecord {
            case: case.to_string(),
            method: method.to_string(),
            outcome: "pass".to_string(),
            error: None,
        });
    }

    fn failure(&mut self, case: &str, method: &str, error: &TestError) {
        let text = error.to_string();
        // A method may fail more than once (body, then teardown); keep one
        // record and accumulate the messages
        if let Some(record) = self
            .records
            .iter_mut()
            .find(|r| r.case == case && r.method == method)
        {
            match record.error.as_mut() {
                Some(existing) => {
                    existing.push_str("; ");
                    existing.push_str(&text);
                }
                None => record.error = Some(text),
            }
            return;
        }
        self.records.push(TestRecord {
            case: case.to_string(),
            method: method.to_string(),
            outcome: "fail".to_string(),
            error: Some(text),
        });
    }

    fn total(&mut self, totals: &RunTotals) {
        let report = RunReport {
            finished_at: Local::now().to_rfc3339(),
            passed: totals.passed,
            failed: totals.failed,
            elapsed_secs: totals.elapsed_secs,
            tests: &self.records,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                let written =
                    File::create(&self.path).and_then(|mut file| file.write_all(json.as_bytes()));
                if let Err(err) = written {
                    warn!("Failed to write test report to {}: {}", self.path.display(), err);
                }
            }
            Err(err) => warn!("Failed to serialize test report: {}", err),
        }
    }
}
