//! Error types and handling for the `WanderWise` backend

use serde_json::Value;
use thiserror::Error;

/// Main error type for the `WanderWise` backend
#[derive(Error, Debug)]
pub enum WanderError {
    /// Missing or invalid request fields
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Transport mode outside of own/public/agency
    #[error("Unknown transport mode: '{mode}'")]
    UnknownMode { mode: String },

    /// Upstream provider call failed or reported an error
    #[error("{provider} API error: {message}")]
    Upstream {
        provider: &'static str,
        message: String,
        /// HTTP status returned by the provider, if any response arrived
        status: Option<u16>,
        /// Provider error body, kept for logging only
        payload: Option<Value>,
    },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl WanderError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new unknown transport mode error
    pub fn unknown_mode<S: Into<String>>(mode: S) -> Self {
        Self::UnknownMode { mode: mode.into() }
    }

    /// Create a new upstream error without a response
    pub fn upstream<S: Into<String>>(provider: &'static str, message: S) -> Self {
        Self::Upstream {
            provider,
            message: message.into(),
            status: None,
            payload: None,
        }
    }

    /// Create a new upstream error from a provider response
    pub fn upstream_response<S: Into<String>>(
        provider: &'static str,
        message: S,
        status: u16,
        payload: Option<Value>,
    ) -> Self {
        Self::Upstream {
            provider,
            message: message.into(),
            status: Some(status),
            payload,
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True when the caller sent a bad request
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::UnknownMode { .. })
    }

    /// Provider error body, if one was captured
    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Upstream { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    /// Get a message that is safe to return to a client.
    ///
    /// Upstream and configuration details stay server side.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WanderError::Validation { message } => message.clone(),
            WanderError::UnknownMode { .. } => "unknown transportMode".to_string(),
            WanderError::Upstream { .. } => {
                "Unable to reach an external service. Please try again later.".to_string()
            }
            WanderError::Config { .. } => "Server is not configured correctly.".to_string(),
        }
    }
}
