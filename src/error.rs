//! Pipeline error taxonomy.
//!
//! One typed enum covers every failure class the build-and-publish
//! pipeline can produce. Structural problems (malformed trees, bad
//! input) fail fast; build and publish steps capture errors into
//! results so the CLI can present a single consolidated failure.

use thiserror::Error;

/// Errors produced by the build-and-publish pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed structure or site input (duplicate keys, missing root).
    #[error("invalid structure: {0}")]
    Validation(String),

    /// Absent theme, template, manifest, site or content record.
    #[error("missing resource: {0}")]
    MissingResource(String),

    /// Non-success response from the remote wire protocol.
    #[error("remote returned {status}: {body}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// A same-named remote repository already exists; reuse needs
    /// explicit confirmation.
    #[error("repository `{0}` already exists; confirm reuse to publish into it")]
    Conflict(String),

    /// Non-zero exit from an external tool (the version-control CLI).
    #[error("`{name}` exited with status {code}\n{stderr}")]
    Process {
        /// Tool name as invoked.
        name: String,
        /// Exit code (-1 when the process was killed by a signal).
        code: i32,
        /// Captured stderr, trimmed.
        stderr: String,
    },

    /// The selected hosting provider cannot publish; the caller should
    /// redirect the user to manual deployment or hosting configuration.
    #[error("hosting not configured: {0}")]
    NotConfigured(String),

    /// The cancellation token fired mid-operation.
    #[error("operation cancelled")]
    Cancelled,

    /// I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// HTTP transport failure (network error, timeout, etc).
    #[error("HTTP request failed")]
    Http(#[from] Box<ureq::Error>),
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        Self::Http(Box::new(err))
    }
}

impl Error {
    /// Whether the failure is a remote-side rejection (as opposed to a
    /// local/structural one). Used by the CLI to phrase the alert.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. } | Self::Conflict(_) | Self::Http(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_status_and_body() {
        let err = Error::Remote {
            status: 422,
            body: "name already exists".into(),
        };
        let display = format!("{err}");
        assert!(display.contains("422"));
        assert!(display.contains("name already exists"));
    }

    #[test]
    fn test_process_error_display() {
        let err = Error::Process {
            name: "git".into(),
            code: 128,
            stderr: "fatal: not a git repository".into(),
        };
        let display = format!("{err}");
        assert!(display.contains("git"));
        assert!(display.contains("128"));
        assert!(display.contains("fatal"));
    }

    #[test]
    fn test_is_remote_classification() {
        assert!(
            Error::Remote {
                status: 500,
                body: String::new()
            }
            .is_remote()
        );
        assert!(Error::Conflict("user/repo".into()).is_remote());
        assert!(!Error::Validation("dup key".into()).is_remote());
        assert!(!Error::Cancelled.is_remote());
    }
}
