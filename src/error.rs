//! Errors raised by the chat endpoint call.
//!
//! Every variant is a transport or parse failure. The distinction only
//! matters for the diagnostic log; the conversation always shows the same
//! fixed reply.

/// Failure of a single outbound chat request.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Connection refused, reset, DNS failure, or an unreadable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("chat endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The body was not a JSON object with a string `response` field.
    #[error("malformed reply: {0}")]
    Decode(#[from] serde_json::Error),
}
