//! Failure taxonomy shared by the upstream data sources

use serde::Serialize;
use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;

/// Identifies which upstream a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Exchange,
    Countries,
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SourceKind::Exchange => "exchange",
                SourceKind::Countries => "countries",
            }
        )
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{origin} API timeout after {}ms - service unavailable", .after.as_millis())]
    Timeout { origin: SourceKind, after: Duration },

    #[error("{origin} API error: {detail}")]
    Transport { origin: SourceKind, detail: String },

    #[error("{origin} API returned an invalid payload: {detail}")]
    Format { origin: SourceKind, detail: String },
}

impl SourceError {
    pub fn origin(&self) -> SourceKind {
        match self {
            SourceError::Timeout { origin, .. }
            | SourceError::Transport { origin, .. }
            | SourceError::Format { origin, .. } => *origin,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SourceError::Timeout { .. })
    }

    /// Classifies a transport level failure raised by `reqwest`.
    pub(crate) fn from_reqwest(origin: SourceKind, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout {
                origin,
                after: timeout,
            }
        } else if err.is_decode() {
            SourceError::Format {
                origin,
                detail: err.to_string(),
            }
        } else {
            SourceError::Transport {
                origin,
                detail: err.to_string(),
            }
        }
    }
}
