use std::{fmt, path::Path};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum StepStatus {
    Passed,
    /// Passed, but something non-fatal went wrong along the way.
    Warned(String),
    Skipped(String),
    Failed(String),
}

impl StepStatus {
    pub fn passed(&self) -> bool {
        !matches!(self, StepStatus::Failed(_))
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Passed => f.write_str("PASS"),
            StepStatus::Warned(detail) => write!(f, "WARN ({})", detail),
            StepStatus::Skipped(detail) => write!(f, "SKIP ({})", detail),
            StepStatus::Failed(detail) => write!(f, "FAIL ({})", detail),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub name: String,
    #[serde(flatten)]
    pub status: StepStatus,
}

impl StepOutcome {
    pub fn passed(&self) -> bool {
        self.status.passed()
    }
}

/// Ordered outcomes of one automated run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReport {
    pub run_id: Uuid,
    pub device: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub steps: Vec<StepOutcome>,
}

impl TestReport {
    pub fn new(device: String) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            device,
            started_at: Utc::now(),
            finished_at: None,
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, name: &str, status: StepStatus) {
        self.steps.push(StepOutcome {
            name: name.to_string(),
            status,
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// True when no step failed. An empty report has not passed anything.
    pub fn all_passed(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(StepOutcome::passed)
    }

    pub fn step(&self, name: &str) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// `(name, passed)` pairs in execution order.
    pub fn outcomes(&self) -> Vec<(&str, bool)> {
        self.steps
            .iter()
            .map(|s| (s.name.as_str(), s.passed()))
            .collect()
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))
    }
}
