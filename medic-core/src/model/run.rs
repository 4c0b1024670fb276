//! Run status snapshot as reported by the agent backend
//!
//! A [`RunStatus`] is always handled as a whole: each successful poll
//! replaces the previous snapshot entirely, and nothing in the dashboard
//! edits one in place.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder shown while the agent has not created its branch yet
pub const NO_BRANCH: &str = "---";

/// Lifecycle phase of the automation job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    Error,
}

impl RunPhase {
    /// Get the wire name of this phase
    pub fn name(&self) -> &'static str {
        match self {
            RunPhase::Idle => "IDLE",
            RunPhase::Running => "RUNNING",
            RunPhase::Completed => "COMPLETED",
            RunPhase::Failed => "FAILED",
            RunPhase::Error => "ERROR",
        }
    }

    /// Whether the job has stopped and will not change on its own
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Completed | RunPhase::Failed | RunPhase::Error)
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Outcome badge of a run, independent of [`RunPhase`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalStatus {
    #[default]
    Pending,
    Running,
    Passed,
    Failed,
    Error,
}

impl FinalStatus {
    /// Get the badge label
    pub fn name(&self) -> &'static str {
        match self {
            FinalStatus::Pending => "PENDING",
            FinalStatus::Running => "RUNNING",
            FinalStatus::Passed => "PASSED",
            FinalStatus::Failed => "FAILED",
            FinalStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Which credential path a run uses to reach the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Clone and push over HTTPS with a GitHub token
    #[default]
    Https,
    /// Clone and push over SSH with a private key
    Ssh,
}

impl AuthMode {
    /// Get the wire name of this mode
    pub fn name(&self) -> &'static str {
        match self {
            AuthMode::Https => "https",
            AuthMode::Ssh => "ssh",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "https" | "http" | "token" => Ok(AuthMode::Https),
            "ssh" | "key" => Ok(AuthMode::Ssh),
            _ => Err(format!("Unknown auth mode: {}", s)),
        }
    }
}

/// How far a single remediation got
///
/// The backend reports free text; anything mentioning "Fixed" is a
/// confirmed fix, everything else was applied but not yet confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum FixOutcome {
    Fixed,
    #[default]
    Applied,
}

impl FixOutcome {
    /// Get the display label
    pub fn label(&self) -> &'static str {
        match self {
            FixOutcome::Fixed => "FIXED",
            FixOutcome::Applied => "APPLIED",
        }
    }
}

impl From<String> for FixOutcome {
    fn from(text: String) -> Self {
        if text.contains("Fixed") {
            FixOutcome::Fixed
        } else {
            FixOutcome::Applied
        }
    }
}

impl From<FixOutcome> for String {
    fn from(outcome: FixOutcome) -> Self {
        match outcome {
            FixOutcome::Fixed => "Fixed".to_string(),
            FixOutcome::Applied => "Applied".to_string(),
        }
    }
}

/// One remediation the agent applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Fix {
    /// Category tag, e.g. "LINTING" or "SYNTAX"
    #[serde(default)]
    pub bug_type: String,

    /// Path of the patched file
    #[serde(default)]
    pub file: String,

    /// 1-based line, `None` when the agent could not tell
    #[serde(default, deserialize_with = "deserialize_line_number")]
    pub line_number: Option<u32>,

    #[serde(default)]
    pub status: FixOutcome,
}

/// Accepts numbers, numeric strings and null; anything below 1 is unknown
fn deserialize_line_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let line = match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    Ok(line.filter(|&n| n >= 1))
}

/// Snapshot of one automation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunStatus {
    pub status: RunPhase,
    pub final_status: FinalStatus,
    pub logs: Vec<String>,
    /// Score as reported; see [`crate::scoring::reported_score`] for the bounded value
    pub score: i64,
    /// Human-readable duration such as "3m 12s"
    pub time_taken: String,
    pub iteration: u32,
    pub max_iterations: u32,
    pub fixes_applied: Vec<Fix>,
    pub total_failures: u32,
    pub branch_name: String,
    pub auth_mode: AuthMode,
}

impl Default for RunStatus {
    fn default() -> Self {
        Self {
            status: RunPhase::Idle,
            final_status: FinalStatus::Pending,
            logs: Vec::new(),
            score: 100,
            time_taken: "0s".to_string(),
            iteration: 0,
            max_iterations: 5,
            fixes_applied: Vec::new(),
            total_failures: 0,
            branch_name: NO_BRANCH.to_string(),
            auth_mode: AuthMode::Https,
        }
    }
}

impl RunStatus {
    /// Whether the agent is currently working on a run
    pub fn is_running(&self) -> bool {
        self.status == RunPhase::Running
    }

    /// Number of fixes confirmed as fixed
    pub fn confirmed_fixes(&self) -> usize {
        self.fixes_applied
            .iter()
            .filter(|f| f.status == FixOutcome::Fixed)
            .count()
    }
}
