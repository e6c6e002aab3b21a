use std::fs;

use lintbase_core::{
    baseline_exists, baselines_dir, create_baseline, delete_baseline, list_baselines,
    load_baseline, BaselineError, CreateOptions, Issue, Severity,
};

fn issue(file: &str, line: u32, rule: &str) -> Issue {
    Issue {
        file: file.to_string(),
        line,
        column: 3,
        severity: Severity::Medium,
        message: format!("violation of {rule}"),
        detector: "eslint".to_string(),
        rule_id: Some(rule.to_string()),
    }
}

#[test]
fn create_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let issues = vec![issue("src/a.ts", 10, "no-any"), issue("src/b.ts", 5, "no-eval")];

    let created = create_baseline(
        dir.path(),
        "main",
        &issues,
        CreateOptions {
            detectors: vec!["eslint".to_string()],
            auto_created: false,
        },
    )
    .unwrap();

    assert_eq!(created.version, "1.0.0");
    assert_eq!(created.metadata.total_issues, 2);
    assert_eq!(created.metadata.total_files, 2);
    assert!(!created.metadata.created_by.is_empty());

    let loaded = load_baseline(dir.path(), "main").unwrap();
    assert_eq!(loaded.issues.len(), 2);
    assert_eq!(loaded.issues[0].fingerprint, created.issues[0].fingerprint);
    assert_eq!(loaded.config.detectors, vec!["eslint".to_string()]);
}

#[test]
fn total_files_counts_distinct_normalized_paths() {
    let dir = tempfile::tempdir().unwrap();
    // Same file spelled three ways.
    let issues = vec![
        issue("src/a.ts", 1, "r"),
        issue("./src/a.ts", 2, "r"),
        issue("src\\a.ts", 3, "r"),
    ];
    let created = create_baseline(dir.path(), "main", &issues, CreateOptions::default()).unwrap();
    assert_eq!(created.metadata.total_issues, 3);
    assert_eq!(created.metadata.total_files, 1);
}

#[test]
fn create_overwrites_previous_baseline_of_same_name() {
    let dir = tempfile::tempdir().unwrap();
    create_baseline(
        dir.path(),
        "main",
        &[issue("a.ts", 1, "r1"), issue("b.ts", 2, "r2")],
        CreateOptions::default(),
    )
    .unwrap();
    create_baseline(
        dir.path(),
        "main",
        &[issue("c.ts", 3, "r3")],
        CreateOptions::default(),
    )
    .unwrap();

    let loaded = load_baseline(dir.path(), "main").unwrap();
    assert_eq!(loaded.issues.len(), 1);
    assert_eq!(loaded.issues[0].issue.file, "c.ts");
}

#[test]
fn load_missing_baseline_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_baseline(dir.path(), "nonexistent").unwrap_err();
    match err.downcast_ref::<BaselineError>() {
        Some(BaselineError::NotFound { name }) => assert_eq!(name, "nonexistent"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn load_corrupt_baseline_is_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let baselines = baselines_dir(dir.path());
    fs::create_dir_all(&baselines).unwrap();
    fs::write(baselines.join("main.json"), b"{\"version\": 42}").unwrap();

    let err = load_baseline(dir.path(), "main").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BaselineError>(),
        Some(BaselineError::Validation { .. })
    ));
}

#[test]
fn missing_and_corrupt_are_distinct_error_kinds() {
    let dir = tempfile::tempdir().unwrap();
    let baselines = baselines_dir(dir.path());
    fs::create_dir_all(&baselines).unwrap();
    fs::write(baselines.join("corrupt.json"), b"not json at all").unwrap();

    let missing = load_baseline(dir.path(), "missing").unwrap_err();
    let corrupt = load_baseline(dir.path(), "corrupt").unwrap_err();
    assert!(matches!(
        missing.downcast_ref::<BaselineError>(),
        Some(BaselineError::NotFound { .. })
    ));
    assert!(matches!(
        corrupt.downcast_ref::<BaselineError>(),
        Some(BaselineError::Validation { .. })
    ));
}

#[test]
fn list_returns_all_valid_baselines_and_skips_corrupt_ones() {
    let dir = tempfile::tempdir().unwrap();
    create_baseline(dir.path(), "main", &[issue("a.ts", 1, "r")], CreateOptions::default())
        .unwrap();
    create_baseline(dir.path(), "develop", &[], CreateOptions::default()).unwrap();
    fs::write(baselines_dir(dir.path()).join("broken.json"), b"{}").unwrap();

    let mut names: Vec<String> = list_baselines(dir.path())
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["develop".to_string(), "main".to_string()]);
}

#[test]
fn list_of_empty_project_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    assert!(list_baselines(dir.path()).unwrap().is_empty());
}

#[test]
fn delete_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    create_baseline(dir.path(), "main", &[], CreateOptions::default()).unwrap();

    assert!(baseline_exists(dir.path(), "main"));
    delete_baseline(dir.path(), "main").unwrap();
    assert!(!baseline_exists(dir.path(), "main"));
    // Second delete of the same name is still Ok.
    delete_baseline(dir.path(), "main").unwrap();
}

#[test]
fn exists_does_not_create_anything() {
    let dir = tempfile::tempdir().unwrap();
    assert!(!baseline_exists(dir.path(), "main"));
    assert!(!baselines_dir(dir.path()).exists());
}

#[test]
fn invalid_name_is_rejected_before_touching_disk() {
    let dir = tempfile::tempdir().unwrap();
    let err = create_baseline(dir.path(), "../escape", &[], CreateOptions::default()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BaselineError>(),
        Some(BaselineError::InvalidName { .. })
    ));
    assert!(!dir.path().join(".lintbase").exists());
}

#[test]
fn no_temp_file_left_behind_after_create() {
    let dir = tempfile::tempdir().unwrap();
    create_baseline(dir.path(), "main", &[issue("a.ts", 1, "r")], CreateOptions::default())
        .unwrap();

    let leftovers: Vec<_> = fs::read_dir(baselines_dir(dir.path()))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn persisted_document_uses_contract_field_names() {
    let dir = tempfile::tempdir().unwrap();
    create_baseline(
        dir.path(),
        "main",
        &[issue("src/a.ts", 10, "no-any")],
        CreateOptions {
            detectors: vec!["eslint".to_string()],
            auto_created: true,
        },
    )
    .unwrap();

    let raw = fs::read(baselines_dir(dir.path()).join("main.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(doc["version"], "1.0.0");
    assert!(doc["metadata"]["createdAt"].is_string());
    assert!(doc["metadata"]["totalIssues"].is_number());
    assert!(doc["metadata"]["totalFiles"].is_number());
    assert_eq!(doc["metadata"]["autoCreated"], true);
    assert!(doc["config"]["detectors"].is_array());
    assert!(doc["issues"][0]["fingerprint"].is_string());
    assert_eq!(doc["issues"][0]["ruleId"], "no-any");
}
