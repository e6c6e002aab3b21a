use std::collections::HashMap;

use chrono::Utc;

use crate::fingerprint::{fingerprint, fuzzy_key};
use crate::types::{
    Baseline, BaselineRef, ComparisonResult, ComparisonSummary, CurrentRef, Issue, Severity,
    SeverityCounts,
};

/// Maximum line drift a baseline issue may undergo and still count as the
/// same finding when its exact fingerprint no longer matches.
pub const FUZZY_LINE_TOLERANCE: u32 = 3;

/// Reconcile `current` against `baseline`: every current issue is classified
/// as unchanged (exact or fuzzy match against exactly one baseline entry) or
/// new; every unconsumed baseline entry is resolved. Deterministic for a
/// given input order, never panics, never double-matches.
pub fn compare_with_baseline(
    current: &[Issue],
    baseline: &Baseline,
    baseline_name: &str,
) -> ComparisonResult {
    let mut matched = vec![false; baseline.issues.len()];

    // Exact index: fingerprint -> baseline positions, in baseline order.
    let mut by_fingerprint: HashMap<&str, Vec<usize>> = HashMap::new();
    // Fuzzy index: (file, rule-or-message) -> baseline positions.
    let mut by_bucket: HashMap<(String, String), Vec<usize>> = HashMap::new();
    for (idx, entry) in baseline.issues.iter().enumerate() {
        by_fingerprint
            .entry(entry.fingerprint.as_str())
            .or_default()
            .push(idx);
        by_bucket.entry(fuzzy_key(&entry.issue)).or_default().push(idx);
    }

    let mut new_issues: Vec<Issue> = Vec::new();
    let mut unchanged = 0usize;

    for issue in current {
        let fp = fingerprint(issue);

        if let Some(idx) = by_fingerprint
            .get(fp.as_str())
            .and_then(|indices| indices.iter().copied().find(|&i| !matched[i]))
        {
            matched[idx] = true;
            unchanged += 1;
            continue;
        }

        if let Some(idx) = fuzzy_match(issue, baseline, &by_bucket, &matched) {
            matched[idx] = true;
            unchanged += 1;
            continue;
        }

        new_issues.push(issue.clone());
    }

    let resolved_issues: Vec<Issue> = baseline
        .issues
        .iter()
        .zip(&matched)
        .filter(|(_, &m)| !m)
        .map(|(entry, _)| entry.issue.clone())
        .collect();

    let summary = ComparisonSummary {
        new: new_issues.len(),
        resolved: resolved_issues.len(),
        unchanged,
        total: new_issues.len() + unchanged,
    };

    ComparisonResult {
        baseline: BaselineRef {
            name: baseline_name.to_string(),
            timestamp: baseline.metadata.created_at,
            total_issues: baseline.issues.len(),
        },
        current: CurrentRef {
            timestamp: Utc::now(),
            total_issues: current.len(),
        },
        summary,
        new_issues,
        resolved_issues,
    }
}

/// Nearest-line candidate within tolerance, restricted to the same file and
/// rule-or-message bucket. Ties go to the lowest baseline index: bucket
/// positions are in baseline order and only a strictly smaller delta
/// displaces the current best.
fn fuzzy_match(
    issue: &Issue,
    baseline: &Baseline,
    by_bucket: &HashMap<(String, String), Vec<usize>>,
    matched: &[bool],
) -> Option<usize> {
    let candidates = by_bucket.get(&fuzzy_key(issue))?;

    let mut best: Option<(u32, usize)> = None;
    for &idx in candidates {
        if matched[idx] {
            continue;
        }
        let delta = issue.line.abs_diff(baseline.issues[idx].issue.line);
        if delta > FUZZY_LINE_TOLERANCE {
            continue;
        }
        if best.is_none_or(|(best_delta, _)| delta < best_delta) {
            best = Some((delta, idx));
        }
    }

    best.map(|(_, idx)| idx)
}

/// Tally issues per severity level.
pub fn count_by_severity(issues: &[Issue]) -> SeverityCounts {
    let mut counts = SeverityCounts::default();
    for issue in issues {
        match issue.severity {
            Severity::Critical => counts.critical += 1,
            Severity::High => counts.high += 1,
            Severity::Medium => counts.medium += 1,
            Severity::Low => counts.low += 1,
            Severity::Info => counts.info += 1,
        }
    }
    counts
}
