use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use walkdir::WalkDir;

use crate::error::BaselineError;
use crate::fingerprint::{fingerprint, normalize_file_path};
use crate::types::{
    Baseline, BaselineConfig, BaselineMetadata, BaselineSummary, FingerprintedIssue, Issue,
    BASELINE_VERSION,
};
use crate::validate::validate_baseline;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap());

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub detectors: Vec<String>,
    pub auto_created: bool,
}

/// `<root>/.lintbase/baselines` — one JSON document per baseline name.
pub fn baselines_dir(root: &Path) -> PathBuf {
    root.join(".lintbase").join("baselines")
}

fn baseline_path(root: &Path, name: &str) -> PathBuf {
    baselines_dir(root).join(format!("{name}.json"))
}

fn check_name(name: &str) -> anyhow::Result<()> {
    if NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(BaselineError::InvalidName {
            name: name.to_string(),
        }
        .into())
    }
}

fn current_actor() -> String {
    ["LINTBASE_USER", "USER", "USERNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Snapshot `issues` under `name`, stamping each with its fingerprint.
/// Whole-document replace: any prior baseline of the same name is
/// overwritten. The write goes through a temp file and rename so a reader
/// never observes a half-written document.
pub fn create_baseline(
    root: &Path,
    name: &str,
    issues: &[Issue],
    options: CreateOptions,
) -> anyhow::Result<Baseline> {
    check_name(name)?;

    let stamped: Vec<FingerprintedIssue> = issues
        .iter()
        .map(|issue| FingerprintedIssue {
            issue: issue.clone(),
            fingerprint: fingerprint(issue),
        })
        .collect();

    let total_files = issues
        .iter()
        .map(|i| normalize_file_path(&i.file))
        .collect::<HashSet<_>>()
        .len();

    let baseline = Baseline {
        version: BASELINE_VERSION.to_string(),
        metadata: BaselineMetadata {
            created_at: Utc::now(),
            created_by: current_actor(),
            total_issues: issues.len(),
            total_files,
            auto_created: options.auto_created,
        },
        config: BaselineConfig {
            detectors: options.detectors,
        },
        issues: stamped,
    };

    let dir = baselines_dir(root);
    std::fs::create_dir_all(&dir).with_context(|| format!("create dir {}", dir.display()))?;

    let path = baseline_path(root, name);
    let tmp = dir.join(format!(".{name}.json.tmp"));
    let json = serde_json::to_vec_pretty(&baseline).context("serialize baseline")?;
    std::fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    std::fs::rename(&tmp, &path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;

    Ok(baseline)
}

/// Load the named baseline. A missing document is `BaselineError::NotFound`;
/// an unparseable or structurally invalid one is `BaselineError::Validation`.
pub fn load_baseline(root: &Path, name: &str) -> anyhow::Result<Baseline> {
    check_name(name)?;

    let path = baseline_path(root, name);
    let bytes = match std::fs::read(&path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(BaselineError::NotFound {
                name: name.to_string(),
            }
            .into());
        }
        Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
    };

    parse_baseline(&bytes, name)
}

fn parse_baseline(bytes: &[u8], name: &str) -> anyhow::Result<Baseline> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| BaselineError::Validation {
            name: name.to_string(),
            reason: format!("not valid JSON: {e}"),
        })?;

    if !validate_baseline(&value) {
        return Err(BaselineError::Validation {
            name: name.to_string(),
            reason: "document structure does not match the baseline schema".to_string(),
        }
        .into());
    }

    let baseline: Baseline =
        serde_json::from_value(value).map_err(|e| BaselineError::Validation {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

    Ok(baseline)
}

/// Enumerate all baselines under the project. Documents that fail
/// validation are skipped so a corrupt neighbour cannot hide healthy
/// entries; loading that name directly still reports the corruption.
pub fn list_baselines(root: &Path) -> anyhow::Result<Vec<BaselineSummary>> {
    let dir = baselines_dir(root);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut summaries = Vec::new();
    for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        match parse_baseline(&bytes, name) {
            Ok(baseline) => summaries.push(BaselineSummary {
                name: name.to_string(),
                metadata: baseline.metadata,
            }),
            Err(_) => continue,
        }
    }

    Ok(summaries)
}

/// Remove the named baseline. Idempotent: a missing document is Ok.
pub fn delete_baseline(root: &Path, name: &str) -> anyhow::Result<()> {
    check_name(name)?;

    let path = baseline_path(root, name);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
    }
}

/// Existence check without loading or parsing.
pub fn baseline_exists(root: &Path, name: &str) -> bool {
    NAME_RE.is_match(name) && baseline_path(root, name).is_file()
}
