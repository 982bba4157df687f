//! Errors surfaced by the engine.
//!
//! - [`ValidationError`]: local checks that run before any request is made.
//! - [`ApiError`]: failures reported by (or while talking to) the server.
//! - [`FormError`]: why a form refused to start a submission.
use thiserror::Error;

use crate::Money;

/// Local validation failures. These never reach the server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required")]
    MissingUserName,
    #[error("Group name is required")]
    MissingGroupName,
    #[error("Please select at least one member")]
    NoGroupMembers,
    #[error("Users are still loading")]
    UsersLoading,
    #[error("Please fill all required fields")]
    MissingFields,
    #[error("Amount must be greater than zero")]
    InvalidAmount,
    #[error("Please select at least one member to split the expense with")]
    NoSplitMembers,
    #[error("Please set valid custom amounts")]
    InvalidCustomAmounts,
    #[error("The sum of custom amounts ({total}) does not match the total expense ({amount})")]
    CustomSumMismatch { total: Money, amount: Money },
}

/// Failures of a call to the remote API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Not found")]
    NotFound { message: Option<String> },
    #[error("Request failed with status code {status}")]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    #[error("network error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// The `error` string the server put in its response body, if any.
    pub fn server_message(&self) -> Option<&str> {
        let message = match self {
            Self::NotFound { message } | Self::Rejected { message, .. } => message.as_deref(),
            Self::Transport(_) | Self::Malformed(_) => None,
        };
        message.map(str::trim).filter(|m| !m.is_empty())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Picks the message shown to the user.
    ///
    /// Order: the server's structured `error` string, then this error's own
    /// message for HTTP-level failures, then `fallback`. Network and decoding
    /// details are logged, never shown.
    pub fn user_message(&self, fallback: &str) -> String {
        if let Some(message) = self.server_message() {
            return message.to_string();
        }
        match self {
            Self::NotFound { .. } | Self::Rejected { .. } => self.to_string(),
            Self::Transport(_) | Self::Malformed(_) => {
                tracing::warn!("{fallback}: {self}");
                fallback.to_string()
            }
        }
    }
}

/// Why a form refused to begin a submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("A submission is already in progress")]
    AlreadySubmitting,
    #[error("Form was already submitted")]
    AlreadySubmitted,
}
