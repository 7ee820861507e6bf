use thiserror::Error;

/// All errors generated in `tradedesk-core`.
///
/// Synthesis and calculation errors are handled at the component boundary (inputs are
/// clamped or rejected and the previous state kept). Only [`TerminalError::SessionExpired`]
/// is meant to reach the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TerminalError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("rejected value for {field}: {reason}")]
    ValidationRejected { field: &'static str, reason: String },

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("session expired, redirect to {login_path}")]
    SessionExpired { login_path: String },

    #[error("round {order_number} is locked for new entries")]
    RoundLocked { order_number: u64 },
}

impl TerminalError {
    pub(crate) fn rejected(field: &'static str, reason: impl Into<String>) -> Self {
        Self::ValidationRejected {
            field,
            reason: reason.into(),
        }
    }

    /// Determine if an error should be shown to the user rather than recovered locally.
    #[allow(clippy::match_like_matches_macro)]
    pub fn is_user_visible(&self) -> bool {
        match self {
            TerminalError::SessionExpired { .. } => true,
            _ => false,
        }
    }

    /// Login path the caller should redirect to, if this error requires it.
    pub fn login_redirect(&self) -> Option<&str> {
        match self {
            TerminalError::SessionExpired { login_path } => Some(login_path),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TerminalError {
    fn from(value: reqwest::Error) -> Self {
        Self::UpstreamUnavailable(value.to_string())
    }
}

impl From<url::ParseError> for TerminalError {
    fn from(value: url::ParseError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}
