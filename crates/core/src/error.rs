/// Errors with a remediation path the caller can act on. Plain I/O failures
/// propagate as `anyhow` context chains instead.
#[derive(Debug, thiserror::Error)]
pub enum BaselineError {
    #[error("baseline '{name}' not found; create it with `lintbase create --name {name}`")]
    NotFound { name: String },

    #[error("baseline '{name}' is corrupted ({reason}); delete and recreate it")]
    Validation { name: String, reason: String },

    #[error("invalid baseline name '{name}': use letters, digits, '.', '_' or '-'")]
    InvalidName { name: String },
}
