use validator::ValidationErrors;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    /// A run's duration text did not match `PREFIX[h]H[m]M[s[.ms]]S`.
    #[error("failed to normalize duration: {0}")]
    DurationParse(String),

    /// The caller omitted a game, or supplied an unusable competitor.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        CoreError::Validation(errors.to_string())
    }
}
