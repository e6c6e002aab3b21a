use serde_json::Value;

const REQUIRED_METADATA: [&str; 4] = ["createdAt", "createdBy", "totalIssues", "totalFiles"];

/// Structural check of an untyped baseline document. Returns `false` on any
/// mismatch, never panics. `load_baseline` escalates a `false` here to
/// `BaselineError::Validation`; tooling can call it standalone for a
/// non-throwing probe.
pub fn validate_baseline(candidate: &Value) -> bool {
    let Some(obj) = candidate.as_object() else {
        return false;
    };

    if !obj.get("version").is_some_and(Value::is_string) {
        return false;
    }

    let Some(metadata) = obj.get("metadata").and_then(Value::as_object) else {
        return false;
    };
    if REQUIRED_METADATA.iter().any(|k| !metadata.contains_key(*k)) {
        return false;
    }

    let detectors = obj.get("config").and_then(|c| c.get("detectors"));
    if !detectors.is_some_and(Value::is_array) {
        return false;
    }

    obj.get("issues").is_some_and(Value::is_array)
}
