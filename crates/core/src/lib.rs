pub mod baseline;
pub mod compare;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod types;
pub mod validate;

pub use baseline::{
    baseline_exists, baselines_dir, create_baseline, delete_baseline, list_baselines,
    load_baseline, CreateOptions,
};
pub use compare::{compare_with_baseline, count_by_severity, FUZZY_LINE_TOLERANCE};
pub use error::BaselineError;
pub use fingerprint::{
    content_fingerprint, fingerprint, location_fingerprint, message_fingerprint,
    normalize_file_path,
};
pub use types::{
    Baseline, BaselineConfig, BaselineMetadata, BaselineSummary, ComparisonResult,
    ComparisonSummary, FingerprintedIssue, Issue, Severity, SeverityCounts,
};
pub use validate::validate_baseline;
