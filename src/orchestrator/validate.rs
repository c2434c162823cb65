//!
//! orchestrator/validate.rs
//! Cross-checks the collected REPORT set against agreement, validity and
//! completeness.
//!
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub n: usize,
    pub expected_uids: Vec<i64>,
    pub reports_received: usize,
    pub winner: Option<i64>,
    pub rounds: u32,
    pub total_messages: u64,
    pub all_exited_cleanly: bool,
    pub pass: bool,
}

use crate::orchestrator::listener::ReportRecord;

pub fn validate(
    expected_uids: &[i64],
    reports: &[ReportRecord],
    all_exited_cleanly: bool,
) -> ScenarioResult {
    let n = expected_uids.len();
    let got_all_reports = reports.len() == n;

    let same_winner = !reports.is_empty()
        && reports
            .iter()
            .all(|report| report.winner == reports[0].winner);

    let expected_max_uid = expected_uids.iter().copied().max();
    let winner = if same_winner {
        reports.first().map(|report| report.winner)
    } else {
        None
    };
    let winner_is_valid = winner.is_some() && winner == expected_max_uid;

    let total_messages = reports.iter().map(|report| report.messages).sum();
    // Prefer the winning node's own reported round count; fall back to the
    // maximum across reports only if that node's REPORT never arrived.
    let rounds = winner
        .and_then(|w| reports.iter().find(|report| report.uid == w))
        .map(|report| report.rounds)
        .or_else(|| reports.iter().map(|report| report.rounds).max())
        .unwrap_or(0);

    let pass = got_all_reports && all_exited_cleanly && same_winner && winner_is_valid;

    ScenarioResult {
        n,
        expected_uids: expected_uids.to_vec(),
        reports_received: reports.len(),
        winner,
        rounds,
        total_messages,
        all_exited_cleanly,
        pass,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(uid: i64, winner: i64, rounds: u32, messages: u64) -> ReportRecord {
        ReportRecord {
            uid,
            winner,
            rounds,
            messages,
        }
    }

    #[test]
    fn passes_when_all_agree_on_the_max_uid() {
        let expected = vec![10, 20, 30];
        let reports = vec![
            report(10, 30, 2, 4),
            report(20, 30, 2, 4),
            report(30, 30, 2, 4),
        ];
        let result = validate(&expected, &reports, true);
        assert!(result.pass);
        assert_eq!(result.winner, Some(30));
    }

    #[test]
    fn fails_when_a_report_is_missing() {
        let expected = vec![10, 20, 30];
        let reports = vec![report(10, 30, 2, 4), report(20, 30, 2, 4)];
        let result = validate(&expected, &reports, true);
        assert!(!result.pass);
        assert_eq!(result.reports_received, 2);
    }

    #[test]
    fn fails_when_reports_disagree_on_winner() {
        let expected = vec![10, 20, 30];
        let reports = vec![
            report(10, 30, 2, 4),
            report(20, 20, 2, 4),
            report(30, 30, 2, 4),
        ];
        let result = validate(&expected, &reports, true);
        assert!(!result.pass);
        assert_eq!(result.winner, None);
    }

    #[test]
    fn fails_when_winner_is_not_the_max_uid() {
        let expected = vec![10, 20, 30];
        let reports = vec![
            report(10, 20, 2, 4),
            report(20, 20, 2, 4),
            report(30, 20, 2, 4),
        ];
        let result = validate(&expected, &reports, true);
        assert!(!result.pass);
    }

    #[test]
    fn fails_when_a_node_did_not_exit_cleanly() {
        let expected = vec![10, 20, 30];
        let reports = vec![
            report(10, 30, 2, 4),
            report(20, 30, 2, 4),
            report(30, 30, 2, 4),
        ];
        let result = validate(&expected, &reports, false);
        assert!(!result.pass);
    }
}
