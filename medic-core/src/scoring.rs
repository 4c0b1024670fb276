//! Derived display values
//!
//! Two score formulas are observable in the field and they disagree: the
//! backend reports its own `score`, while older dashboard views computed a
//! flat per-attempt penalty. Until one is confirmed as authoritative both
//! stay here as separate functions.

use std::time::Duration;

use humantime_serde::re::humantime;

use crate::model::{RunStatus, NO_BRANCH};

/// Starting score before penalties
pub const BASE_SCORE: i64 = 100;

/// Points deducted per retry attempt in the client-side formula
pub const ATTEMPT_PENALTY: i64 = 5;

/// Bonus for runs that finish quickly
pub const TIME_BONUS: u32 = 10;

/// Runs faster than this earn [`TIME_BONUS`]
pub const TIME_BONUS_LIMIT: Duration = Duration::from_secs(5 * 60);

/// Branch names longer than this are shortened for display
const BRANCH_LABEL_MAX: usize = 20;
const BRANCH_LABEL_KEEP: usize = 18;

/// Iteration progress as a percentage in [0, 100]
pub fn progress_percent(iteration: u32, max_iterations: u32) -> u8 {
    if max_iterations == 0 {
        return 0;
    }
    let pct = u64::from(iteration) * 100 / u64::from(max_iterations);
    pct.min(100) as u8
}

/// The job-reported score, bounded to [0, 100]
pub fn reported_score(run: &RunStatus) -> u8 {
    run.score.clamp(0, 100) as u8
}

/// Client-side score: base minus a flat penalty per attempt, floored at 0
pub fn attempt_penalty_score(attempts: u32) -> u8 {
    let penalty = i64::from(attempts).saturating_mul(ATTEMPT_PENALTY);
    (BASE_SCORE - penalty).clamp(0, 100) as u8
}

/// Bonus for a reported duration such as "3m 12s"
///
/// Durations that cannot be parsed earn nothing.
pub fn time_bonus(time_taken: &str) -> u32 {
    match humantime::parse_duration(time_taken.trim()) {
        Ok(taken) if taken < TIME_BONUS_LIMIT => TIME_BONUS,
        _ => 0,
    }
}

/// Branch name as shown in the summary tile
pub fn branch_label(branch_name: &str) -> String {
    let name = branch_name.trim();
    if name.is_empty() {
        return NO_BRANCH.to_string();
    }
    if name.chars().count() > BRANCH_LABEL_MAX {
        let head: String = name.chars().take(BRANCH_LABEL_KEEP).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}

/// Highlight class of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTone {
    Failure,
    Success,
    Neutral,
}

impl LogTone {
    pub fn classify(line: &str) -> Self {
        if line.contains("FAIL") {
            LogTone::Failure
        } else if line.contains("PASS") || line.contains("success") {
            LogTone::Success
        } else {
            LogTone::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_clamps() {
        assert_eq!(progress_percent(0, 5), 0);
        assert_eq!(progress_percent(2, 5), 40);
        assert_eq!(progress_percent(5, 5), 100);
        assert_eq!(progress_percent(9, 5), 100);
        assert_eq!(progress_percent(3, 0), 0);
        assert_eq!(progress_percent(u32::MAX, 1), 100);
    }

    #[test]
    fn test_reported_score_bounds() {
        let mut run = RunStatus::default();
        assert_eq!(reported_score(&run), 100);
        run.score = 110;
        assert_eq!(reported_score(&run), 100);
        run.score = -20;
        assert_eq!(reported_score(&run), 0);
        run.score = 64;
        assert_eq!(reported_score(&run), 64);
    }

    #[test]
    fn test_attempt_penalty_score() {
        assert_eq!(attempt_penalty_score(0), 100);
        assert_eq!(attempt_penalty_score(3), 85);
        assert_eq!(attempt_penalty_score(20), 0);
        assert_eq!(attempt_penalty_score(50), 0);
        assert_eq!(attempt_penalty_score(u32::MAX), 0);
    }

    #[test]
    fn test_formulas_disagree() {
        // Same run, two answers: keep them apart
        let mut run = RunStatus::default();
        run.score = 110;
        run.iteration = 2;
        assert_ne!(
            reported_score(&run),
            attempt_penalty_score(run.iteration)
        );
    }

    #[test]
    fn test_time_bonus() {
        assert_eq!(time_bonus("0s"), TIME_BONUS);
        assert_eq!(time_bonus("3m 12s"), TIME_BONUS);
        assert_eq!(time_bonus("4m 59s"), TIME_BONUS);
        assert_eq!(time_bonus("5m 0s"), 0);
        assert_eq!(time_bonus("12m 3s"), 0);
        assert_eq!(time_bonus("soon"), 0);
        assert_eq!(time_bonus(""), 0);
    }

    #[test]
    fn test_branch_label() {
        assert_eq!(branch_label(""), NO_BRANCH);
        assert_eq!(branch_label("---"), "---");
        assert_eq!(branch_label("fix/short"), "fix/short");
        assert_eq!(
            branch_label("TEAM_ALPHA_JOHN_DOE_AI_Fix"),
            "TEAM_ALPHA_JOHN_DO..."
        );
        assert_eq!(branch_label("exactly_twenty_chars").len(), 20);
    }

    #[test]
    fn test_log_tone() {
        assert_eq!(LogTone::classify("Tests FAILED"), LogTone::Failure);
        assert_eq!(LogTone::classify("All tests PASSED"), LogTone::Success);
        assert_eq!(LogTone::classify("Push success"), LogTone::Success);
        assert_eq!(LogTone::classify("Cloning repository"), LogTone::Neutral);
    }
}
