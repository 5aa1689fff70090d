//! Error types for streaming executions.

use thiserror::Error;

/// The main error type for streaming operations.
///
/// Store-level failures carry the cursor or caller-supplied resource name so
/// the failing statement can be identified from logs alone.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The handle cannot be used to obtain a transaction.
    #[error("invalid database handle: {0}")]
    InvalidHandle(String),

    /// Beginning a new transaction from the pool failed.
    #[error("failed to begin transaction: {0}")]
    Begin(#[source] sqlx::Error),

    /// The DECLARE CURSOR statement failed.
    #[error("error declaring cursor {cursor}: {source}")]
    DeclareCursor {
        cursor: String,
        #[source]
        source: sqlx::Error,
    },

    /// A FETCH against the cursor failed.
    #[error("error fetching from cursor {cursor}: {source}")]
    Fetch {
        cursor: String,
        #[source]
        source: sqlx::Error,
    },

    /// The cancel token was triggered between two fetches.
    ///
    /// The display output is the cancellation reason, verbatim.
    #[error("{reason}")]
    Cancelled { reason: String },

    /// COMMIT failed. The transaction was rolled back afterwards; if that
    /// rollback also failed the error surfaces as [`StreamError::Rollback`]
    /// with this variant as the prior error.
    #[error("error committing {resource}: {source}")]
    Commit {
        resource: String,
        #[source]
        source: sqlx::Error,
    },

    /// ROLLBACK failed while unwinding a prior error. Both failures are
    /// reported; nothing is discarded.
    #[error("{prior}; rollback of {resource} also failed: {source}")]
    Rollback {
        resource: String,
        #[source]
        source: sqlx::Error,
        prior: Box<StreamError>,
    },

    /// The stream configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StreamError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type alias for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn config_display() {
        let err = StreamError::config("batch size must be greater than zero");
        assert_eq!(
            err.to_string(),
            "configuration error: batch size must be greater than zero"
        );
    }

    #[test]
    fn cancelled_propagates_reason_verbatim() {
        let err = StreamError::Cancelled {
            reason: "deadline exceeded".into(),
        };
        assert_eq!(err.to_string(), "deadline exceeded");
    }

    #[test]
    fn rollback_failure_keeps_both_errors() {
        let commit = StreamError::Commit {
            resource: "users".into(),
            source: sqlx::Error::Protocol("commit refused".into()),
        };
        let composed = StreamError::Rollback {
            resource: "users".into(),
            source: sqlx::Error::PoolClosed,
            prior: Box::new(commit),
        };
        let display = composed.to_string();
        assert!(display.contains("commit refused"), "{display}");
        assert!(display.contains("rollback of users also failed"), "{display}");
    }
}
