use thiserror::Error;

/// Failure of a single exchange with the completion endpoint.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompletionError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("API request failed with status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Unexpected response from API: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("A request is already in progress for this session")]
    Busy,

    #[error("Please enter a sport")]
    EmptySport,

    #[error("Duration must be between 1 and 30 days, got {0}")]
    InvalidDuration(u32),

    #[error("No plan has been generated yet")]
    NoPlan,

    #[error("The plan is already shown in this language")]
    SameLanguage,

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

impl SessionError {
    /// True for errors caused by the caller's input rather than the remote call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SessionError::EmptySport
                | SessionError::InvalidDuration(_)
                | SessionError::NoPlan
                | SessionError::SameLanguage
        )
    }
}
