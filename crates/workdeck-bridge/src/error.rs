use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("command is unavailable outside the native shell")]
    Unsupported,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("backend rejected '{command}': {message}")]
    Backend { command: String, message: String },
    #[error("could not decode response of '{command}': {message}")]
    Decode { command: String, message: String },
    #[error("authentication required: {0}")]
    AuthRequired(String),
    #[error("rate limited{}", .reset_at.map(|ts| format!(", retry after timestamp {ts}")).unwrap_or_default())]
    RateLimited { reset_at: Option<u64> },
}

impl BridgeError {
    pub fn backend(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            command: command.into(),
            message: message.into(),
        }
    }

    pub fn decode(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Errors worth a bounded automatic retry. Auth and capability failures
    /// never resolve on their own, and rate limits must not be hammered.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Backend { .. })
    }
}
