use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

/// A single finding as produced by a detector. Never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub severity: Severity,
    pub message: String,
    pub detector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
}

/// An issue stamped with its identity at baseline-creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintedIssue {
    #[serde(flatten)]
    pub issue: Issue,
    pub fingerprint: String,
}

pub const BASELINE_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Baseline {
    pub version: String,
    pub metadata: BaselineMetadata,
    pub config: BaselineConfig,
    pub issues: Vec<FingerprintedIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineMetadata {
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub total_issues: usize,
    pub total_files: usize,
    #[serde(default)]
    pub auto_created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineConfig {
    pub detectors: Vec<String>,
}

/// Listing entry: the name plus the metadata block, without the issue body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineSummary {
    pub name: String,
    pub metadata: BaselineMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub baseline: BaselineRef,
    pub current: CurrentRef,
    pub summary: ComparisonSummary,
    pub new_issues: Vec<Issue>,
    pub resolved_issues: Vec<Issue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineRef {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub total_issues: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentRef {
    pub timestamp: DateTime<Utc>,
    pub total_issues: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComparisonSummary {
    pub new: usize,
    pub resolved: usize,
    pub unchanged: usize,
    /// Current issue count: `new + unchanged`.
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}
