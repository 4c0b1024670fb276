//! Plain-text rendering of dashboard state

use std::fmt::Write;

use chrono::{DateTime, Utc};
use medic_core::scoring::{
    attempt_penalty_score, branch_label, progress_percent, reported_score, time_bonus, LogTone,
};
use medic_core::{DashboardSnapshot, DeploymentLogState, DeploymentPanel, RunStatus};

/// Full dashboard frame: run summary, score, fixes, timeline and deployment
pub fn frame(snapshot: &DashboardSnapshot) -> String {
    let mut out = run_summary(&snapshot.run, snapshot.run_updated_at);
    out.push('\n');
    out.push_str(&score_panel(&snapshot.run));
    out.push('\n');
    out.push_str(&fixes_table(&snapshot.run));
    out.push('\n');
    out.push_str(&timeline(&snapshot.run.logs));

    if snapshot.submitting {
        out.push_str("\nSubmitting run...\n");
    }

    if let Some(panel) = deployment_panel(&snapshot.deployment) {
        out.push('\n');
        out.push_str(&panel);
    }

    out
}

/// Status, progress and branch tiles
pub fn run_summary(run: &RunStatus, updated_at: Option<DateTime<Utc>>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Run Summary");
    let _ = writeln!(out, "===========");
    let _ = writeln!(out, "  Status:       {}", run.status);
    let _ = writeln!(out, "  CI/CD:        {}", run.final_status);
    let _ = writeln!(
        out,
        "  Progress:     {}/{} ({}%)",
        run.iteration,
        run.max_iterations,
        progress_percent(run.iteration, run.max_iterations)
    );
    let _ = writeln!(out, "  Failures:     {}", run.total_failures);
    let _ = writeln!(out, "  Time taken:   {}", run.time_taken);
    let _ = writeln!(out, "  Branch:       {}", branch_label(&run.branch_name));
    let _ = writeln!(out, "  Auth mode:    {}", run.auth_mode);
    match updated_at {
        Some(at) => {
            let _ = writeln!(out, "  Last update:  {}", at.format("%H:%M:%S"));
        }
        None => {
            let _ = writeln!(out, "  Last update:  (waiting for first status)");
        }
    }
    out
}

/// Reported score plus the derived bonus and attempt-penalty figures
pub fn score_panel(run: &RunStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Score");
    let _ = writeln!(out, "=====");
    let _ = writeln!(out, "  Reported:         {}/100", reported_score(run));
    let _ = writeln!(out, "  Speed bonus:      +{}", time_bonus(&run.time_taken));
    let _ = writeln!(
        out,
        "  Attempt penalty:  {}/100",
        attempt_penalty_score(run.iteration)
    );
    out
}

/// Table of remediations
pub fn fixes_table(run: &RunStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Fixes ({} applied, {} confirmed)",
        run.fixes_applied.len(),
        run.confirmed_fixes()
    );

    if run.fixes_applied.is_empty() {
        let _ = writeln!(out, "  No fixes yet.");
        return out;
    }

    for fix in &run.fixes_applied {
        let location = match fix.line_number {
            Some(line) => format!("{}:{}", fix.file, line),
            None => fix.file.clone(),
        };
        let _ = writeln!(
            out,
            "  [{:<7}] {:<16} {}",
            fix.status.label(),
            fix.bug_type,
            location
        );
    }
    out
}

/// Log lines with their highlight markers
pub fn timeline(logs: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Timeline");

    if logs.is_empty() {
        let _ = writeln!(out, "  (no activity)");
        return out;
    }

    for line in logs {
        let _ = writeln!(out, "  {} {}", tone_marker(LogTone::classify(line)), line);
    }
    out
}

/// Deployment panel, or `None` when it is hidden
pub fn deployment_panel(state: &DeploymentLogState) -> Option<String> {
    let mut out = String::new();
    let _ = writeln!(out, "Deployment");
    match state.panel()? {
        DeploymentPanel::Fetching => {
            let _ = writeln!(out, "  Fetching deployment logs...");
        }
        DeploymentPanel::Ready { deployment, logs } => {
            let _ = writeln!(out, "  Project: {}", deployment.project_name);
            let _ = writeln!(out, "  State:   {}", deployment.state);
            if logs.is_empty() {
                let _ = writeln!(out, "    No build logs available");
            }
            for line in logs {
                let _ = writeln!(out, "    {}", line);
            }
        }
    }
    Some(out)
}

fn tone_marker(tone: LogTone) -> &'static str {
    match tone {
        LogTone::Failure => "x",
        LogTone::Success => "+",
        LogTone::Neutral => "-",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medic_core::{Deployment, Fix, FixOutcome, RunPhase};

    fn sample_run() -> RunStatus {
        RunStatus {
            status: RunPhase::Running,
            iteration: 2,
            max_iterations: 5,
            time_taken: "1m 30s".to_string(),
            branch_name: "ALPHA_JO_AI_Fix_lint_and_types".to_string(),
            logs: vec![
                "Running tests".to_string(),
                "Tests FAILED".to_string(),
                "PASS after fix".to_string(),
            ],
            fixes_applied: vec![
                Fix {
                    bug_type: "SYNTAX".to_string(),
                    file: "src/app.py".to_string(),
                    line_number: Some(12),
                    status: FixOutcome::Fixed,
                },
                Fix {
                    bug_type: "LINTING".to_string(),
                    file: "src/util.py".to_string(),
                    line_number: None,
                    status: FixOutcome::Applied,
                },
            ],
            ..RunStatus::default()
        }
    }

    #[test]
    fn test_summary_shows_progress_and_short_branch() {
        let text = run_summary(&sample_run(), None);
        assert!(text.contains("RUNNING"));
        assert!(text.contains("2/5 (40%)"));
        assert!(text.contains("ALPHA_JO_AI_Fix_li..."));
        assert!(text.contains("waiting for first status"));
    }

    #[test]
    fn test_score_panel() {
        let text = score_panel(&sample_run());
        assert!(text.contains("Reported:         100/100"));
        assert!(text.contains("Speed bonus:      +10"));
        assert!(text.contains("Attempt penalty:  90/100"));
    }

    #[test]
    fn test_fixes_table() {
        let text = fixes_table(&sample_run());
        assert!(text.contains("2 applied, 1 confirmed"));
        assert!(text.contains("src/app.py:12"));
        assert!(text.contains("[FIXED  ]"));
        assert!(text.contains("[APPLIED]"));

        let empty = fixes_table(&RunStatus::default());
        assert!(empty.contains("No fixes yet."));
    }

    #[test]
    fn test_timeline_markers() {
        let text = timeline(&sample_run().logs);
        assert!(text.contains("- Running tests"));
        assert!(text.contains("x Tests FAILED"));
        assert!(text.contains("+ PASS after fix"));
    }

    #[test]
    fn test_deployment_panel_visibility() {
        assert_eq!(deployment_panel(&DeploymentLogState::Idle), None);
        assert_eq!(deployment_panel(&DeploymentLogState::NotFound), None);

        let loading = deployment_panel(&DeploymentLogState::Loading).unwrap();
        assert!(loading.contains("Fetching"));

        let found = DeploymentLogState::Found {
            deployment: Deployment {
                project_name: "widgets".to_string(),
                state: "READY".to_string(),
            },
            logs: vec!["Build completed".to_string()],
        };
        let text = deployment_panel(&found).unwrap();
        assert!(text.contains("Project: widgets"));
        assert!(text.contains("State:   READY"));
        assert!(text.contains("Build completed"));

        let no_logs = DeploymentLogState::Found {
            deployment: Deployment {
                project_name: "widgets".to_string(),
                state: "BUILDING".to_string(),
            },
            logs: vec![],
        };
        let text = deployment_panel(&no_logs).unwrap();
        assert!(text.contains("No build logs available"));
    }

    #[test]
    fn test_frame_includes_submitting_banner() {
        let snapshot = DashboardSnapshot {
            submitting: true,
            ..DashboardSnapshot::default()
        };
        let text = frame(&snapshot);
        assert!(text.contains("Submitting run..."));
        assert!(!text.contains("Deployment"));
    }
}
