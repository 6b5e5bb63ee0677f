//! Error types for the library layer.

use std::fmt;

use chrono::NaiveDate;

/// The stage of a report query that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Session setup or token handshake.
    Token,
    /// A per-day request or its HTTP status.
    Transport,
    /// Reading a report page.
    Parse,
    /// Settings or client construction.
    Config,
    /// User-provided input.
    Input,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Token => "token",
            Self::Transport => "transport",
            Self::Parse => "parse",
            Self::Config => "config",
            Self::Input => "input",
        };
        f.write_str(s)
    }
}

/// Fatal conditions for a report query. Each names the phase and, where
/// known, the court and day that failed.
#[derive(Debug)]
pub enum FreeDocumentsError {
    /// An error from the underlying report client.
    Api {
        phase: Phase,
        court_id: String,
        source: pacer_api::Error,
    },
    /// A day's report page came back with a non-success status.
    HttpStatus {
        court_id: String,
        day: NaiveDate,
        status: u16,
    },
    /// A report page could not be read.
    Parse {
        court_id: String,
        day: NaiveDate,
        message: String,
    },
    /// Settings could not be loaded.
    Config(String),
    /// User-provided input failed validation.
    InvalidInput(String),
}

impl FreeDocumentsError {
    /// Wraps a client error, classifying it by phase.
    pub fn api(court_id: &str, source: pacer_api::Error) -> Self {
        let phase = match &source {
            e if e.is_token_failure() => Phase::Token,
            pacer_api::Error::Transport { .. } => Phase::Transport,
            pacer_api::Error::InvalidQuery(_) => Phase::Input,
            _ => Phase::Config,
        };
        Self::Api {
            phase,
            court_id: court_id.to_string(),
            source,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Self::Api { phase, .. } => *phase,
            Self::HttpStatus { .. } => Phase::Transport,
            Self::Parse { .. } => Phase::Parse,
            Self::Config(_) => Phase::Config,
            Self::InvalidInput(_) => Phase::Input,
        }
    }

    pub fn court_id(&self) -> Option<&str> {
        match self {
            Self::Api { court_id, .. }
            | Self::HttpStatus { court_id, .. }
            | Self::Parse { court_id, .. } => Some(court_id),
            _ => None,
        }
    }

    /// The filing day the failure is attached to, if any.
    pub fn day(&self) -> Option<NaiveDate> {
        match self {
            Self::Api {
                source: pacer_api::Error::Transport { day, .. },
                ..
            } => Some(*day),
            Self::HttpStatus { day, .. } | Self::Parse { day, .. } => Some(*day),
            _ => None,
        }
    }

    /// Token and transport failures may succeed on a fresh session.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api {
                source: pacer_api::Error::HttpStatus { status, .. },
                ..
            } => *status == 429 || *status >= 500,
            Self::Api { phase, .. } => matches!(phase, Phase::Token | Phase::Transport),
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl fmt::Display for FreeDocumentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api {
                phase,
                court_id,
                source,
            } => write!(f, "{} error for {}: {}", phase, court_id, source),
            Self::HttpStatus {
                court_id,
                day,
                status,
            } => write!(
                f,
                "transport error for {} on {}: status {}",
                court_id, day, status
            ),
            Self::Parse {
                court_id,
                day,
                message,
            } => write!(f, "parse error for {} on {}: {}", court_id, day, message),
            Self::Config(msg) => write!(f, "Config error: {}", msg),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for FreeDocumentsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api { source, .. } => Some(source),
            _ => None,
        }
    }
}
