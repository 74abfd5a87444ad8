use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::parser::types::Scenario;

/// Status of a single step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Running,
    Passed,
    Failed { error: String },
    Skipped,
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepStatus::Passed | StepStatus::Failed { .. } | StepStatus::Skipped
        )
    }
}

/// Execution state of one step
#[derive(Debug, Clone)]
pub struct StepState {
    pub index: usize,
    pub label: String,
    pub status: StepStatus,
    pub started_at: Option<Instant>,
    pub duration_ms: Option<u64>,
}

impl StepState {
    fn new(index: usize, label: String) -> Self {
        Self {
            index,
            label,
            status: StepStatus::Pending,
            started_at: None,
            duration_ms: None,
        }
    }

    pub fn start(&mut self) {
        self.status = StepStatus::Running;
        self.started_at = Some(Instant::now());
    }

    pub fn pass(&mut self) {
        self.finish(StepStatus::Passed);
    }

    pub fn fail(&mut self, error: String) {
        self.finish(StepStatus::Failed { error });
    }

    pub fn skip(&mut self) {
        self.status = StepStatus::Skipped;
    }

    fn finish(&mut self, status: StepStatus) {
        self.status = status;
        if let Some(start) = self.started_at {
            self.duration_ms = Some(start.elapsed().as_millis() as u64);
        }
    }

    fn to_report(&self) -> StepReport {
        StepReport {
            index: self.index,
            label: self.label.clone(),
            status: self.status.clone(),
            duration_ms: self.duration_ms,
        }
    }
}

/// Verdict of a scenario run. Failed means the scenario's expectations
/// did not hold; Errored means the harness itself broke.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Passed,
    Failed,
    Errored,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Passed | RunStatus::Failed | RunStatus::Errored
        )
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Passed => "passed",
            RunStatus::Failed => "failed",
            RunStatus::Errored => "errored",
        };
        write!(f, "{}", s)
    }
}

/// Mutable state for one scenario run. Owned by a single runner; steps
/// advance strictly in order.
#[derive(Debug, Clone)]
pub struct RunState {
    pub scenario_name: String,
    pub status: RunStatus,
    pub steps: Vec<StepState>,
    pub soft_errors: Vec<String>,
    pub failed_step: Option<usize>,
    pub message: Option<String>,
    budget_ms: Option<u64>,
    started_at: Option<Instant>,
    started_wall: Option<DateTime<Utc>>,
    finished_wall: Option<DateTime<Utc>>,
    duration_ms: Option<u64>,
}

impl RunState {
    pub fn new(scenario: &Scenario) -> Self {
        let steps = scenario
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| StepState::new(i, step.label()))
            .collect();
        Self {
            scenario_name: scenario.name.clone(),
            status: RunStatus::Pending,
            steps,
            soft_errors: Vec::new(),
            failed_step: None,
            message: None,
            budget_ms: scenario.timeout_ms,
            started_at: None,
            started_wall: None,
            finished_wall: None,
            duration_ms: None,
        }
    }

    pub fn start(&mut self) {
        self.status = RunStatus::Running;
        self.started_at = Some(Instant::now());
        self.started_wall = Some(Utc::now());
    }

    pub fn step_running(&mut self, index: usize) {
        if let Some(step) = self.steps.get_mut(index) {
            step.start();
        }
    }

    pub fn step_passed(&mut self, index: usize) {
        if let Some(step) = self.steps.get_mut(index) {
            step.pass();
        }
    }

    pub fn step_failed(&mut self, index: usize, error: String) {
        if let Some(step) = self.steps.get_mut(index) {
            step.fail(error.clone());
        }
        self.failed_step = Some(index);
        self.message = Some(error);
    }

    /// Mark every step still pending as skipped
    pub fn skip_remaining(&mut self) {
        for step in &mut self.steps {
            if matches!(step.status, StepStatus::Pending) {
                step.skip();
            }
        }
    }

    pub fn record_soft(&mut self, message: String) {
        self.soft_errors.push(message);
    }

    pub fn finish(&mut self, status: RunStatus) {
        self.status = status;
        self.finished_wall = Some(Utc::now());
        if let Some(start) = self.started_at {
            self.duration_ms = Some(start.elapsed().as_millis() as u64);
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.duration_ms
            .or_else(|| self.started_at.map(|s| s.elapsed().as_millis() as u64))
            .unwrap_or(0)
    }

    pub fn into_result(self) -> ExecutionResult {
        ExecutionResult {
            scenario: self.scenario_name.clone(),
            status: self.status,
            failed_step: self.failed_step,
            message: self.message.clone(),
            duration_ms: self.duration_ms.unwrap_or(0),
            budget_ms: self.budget_ms,
            soft_errors: self.soft_errors.clone(),
            steps: self.steps.iter().map(|s| s.to_report()).collect(),
            started_at: self.started_wall,
            finished_at: self.finished_wall,
        }
    }
}

/// Immutable outcome of one scenario run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub scenario: String,
    pub status: RunStatus,
    pub failed_step: Option<usize>,
    pub message: Option<String>,
    pub duration_ms: u64,
    /// Scenario time budget. Informational, never enforced mid-run.
    pub budget_ms: Option<u64>,
    pub soft_errors: Vec<String>,
    pub steps: Vec<StepReport>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub index: usize,
    pub label: String,
    pub status: StepStatus,
    pub duration_ms: Option<u64>,
}
