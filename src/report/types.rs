use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::state::{ExecutionResult, RunStatus};

/// Aggregated outcome of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub summary: RunSummary,
    pub results: Vec<ExecutionResult>,
}

impl RunReport {
    /// Process exit code: 0 only when every scenario passed
    pub fn exit_code(&self) -> i32 {
        if self.summary.all_passed() {
            0
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn from_results(results: &[ExecutionResult], duration_ms: u64) -> Self {
        let (mut passed, mut failed, mut errored) = (0, 0, 0);
        for result in results {
            match result.status {
                RunStatus::Passed => passed += 1,
                RunStatus::Failed => failed += 1,
                _ => errored += 1,
            }
        }
        Self {
            total: results.len(),
            passed,
            failed,
            errored,
            duration_ms,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.total > 0 && self.failed == 0 && self.errored == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: RunStatus) -> ExecutionResult {
        ExecutionResult {
            scenario: "s".to_string(),
            status,
            failed_step: None,
            message: None,
            duration_ms: 10,
            budget_ms: None,
            soft_errors: Vec::new(),
            steps: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    fn report(results: Vec<ExecutionResult>) -> RunReport {
        let summary = RunSummary::from_results(&results, 42);
        RunReport {
            run_id: "r".to_string(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            summary,
            results,
        }
    }

    #[test]
    fn test_exit_code_zero_only_when_all_passed() {
        let all_green = report(vec![result(RunStatus::Passed), result(RunStatus::Passed)]);
        assert_eq!(all_green.exit_code(), 0);

        let one_red = report(vec![result(RunStatus::Passed), result(RunStatus::Failed)]);
        assert_eq!(one_red.exit_code(), 1);

        let one_errored = report(vec![result(RunStatus::Passed), result(RunStatus::Errored)]);
        assert_eq!(one_errored.exit_code(), 1);

        let empty = report(Vec::new());
        assert_eq!(empty.exit_code(), 1);
    }

    #[test]
    fn test_summary_counts() {
        let summary = RunSummary::from_results(
            &[
                result(RunStatus::Passed),
                result(RunStatus::Failed),
                result(RunStatus::Errored),
                result(RunStatus::Passed),
            ],
            100,
        );
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errored, 1);
        assert!(!summary.all_passed());
    }
}
