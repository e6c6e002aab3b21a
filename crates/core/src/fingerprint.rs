use sha2::{Digest, Sha256};

use crate::types::Issue;

/// Normalize a file path so equivalent spellings hash identically:
/// backslashes become forward slashes, a leading `./` and any leading
/// absolute root (`/` or a `C:/`-style drive prefix) are stripped.
/// Idempotent.
pub fn normalize_file_path(path: &str) -> String {
    let mut p = path.replace('\\', "/");

    // Strip prefixes to a fixpoint so the result is stable however the
    // relative and absolute forms were stacked.
    loop {
        let before = p.len();
        while let Some(rest) = p.strip_prefix("./") {
            p = rest.to_string();
        }
        if let Some(rest) = drive_prefix_stripped(&p) {
            p = rest.to_string();
        }
        while p.starts_with('/') {
            p.remove(0);
        }
        if p.len() == before {
            break;
        }
    }

    p
}

fn drive_prefix_stripped(p: &str) -> Option<&str> {
    let bytes = p.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        Some(&p[2..])
    } else {
        None
    }
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn rule_or_message(issue: &Issue) -> &str {
    match issue.rule_id.as_deref() {
        Some(rule) if !rule.is_empty() => rule,
        _ => issue.message.as_str(),
    }
}

fn normalize_message(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Identity of an issue with the line removed: the normalized file plus its
/// rule-or-message. Two issues sharing this key are "the same finding,
/// possibly drifted" — the matcher's fuzzy candidate set.
pub(crate) fn fuzzy_key(issue: &Issue) -> (String, String) {
    let identity = match issue.rule_id.as_deref() {
        Some(rule) if !rule.is_empty() => format!("rule:{rule}"),
        _ => format!("msg:{}", normalize_message(&issue.message)),
    };
    (normalize_file_path(&issue.file), identity)
}

/// Strongest identity tier: hashes the surrounding code snippet along with
/// the path and rule, so the identity survives the issue moving anywhere in
/// the file as long as the offending code is unchanged.
pub fn content_fingerprint(issue: &Issue, snippet: &str) -> String {
    let input = format!(
        "{}:{}:{}",
        normalize_file_path(&issue.file),
        rule_or_message(issue),
        snippet
    );
    format!("sha256:{}", sha256_hex(&input))
}

/// Location identity: path + rule + line. Deliberately line-sensitive;
/// tolerating line drift is the matcher's job, not the fingerprint's.
pub fn location_fingerprint(issue: &Issue) -> String {
    let input = format!(
        "{}:{}:{}",
        normalize_file_path(&issue.file),
        issue.rule_id.as_deref().unwrap_or(""),
        issue.line
    );
    format!("loc:{}", sha256_hex(&input))
}

/// Fallback identity for detectors that emit no rule id: path + normalized
/// message text.
pub fn message_fingerprint(issue: &Issue) -> String {
    let input = format!(
        "{}:{}",
        normalize_file_path(&issue.file),
        normalize_message(&issue.message)
    );
    format!("msg:{}", sha256_hex(&input))
}

/// Dispatch: rule identity is more stable across refactors than free-text
/// messages, so a present rule id selects the location fingerprint.
pub fn fingerprint(issue: &Issue) -> String {
    match issue.rule_id.as_deref() {
        Some(rule) if !rule.is_empty() => location_fingerprint(issue),
        _ => message_fingerprint(issue),
    }
}
