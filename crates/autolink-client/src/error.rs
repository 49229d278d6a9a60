use std::{fmt, io};

use http::StatusCode;
use thiserror::Error;

/// Link operation a request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Delete,
    Get,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Delete => "delete",
            Operation::Get => "get",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`crate::Client`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The host returned no response for the request.
    #[error("failed to make interplugin request")]
    Dispatch,

    /// The autolink plugin answered with a status other than 200.
    #[error("unable to {operation} autolink. Error: {status}, {body}")]
    Remote {
        operation: Operation,
        status: StatusCode,
        /// Raw response text, kept for diagnostics.
        body: String,
    },

    #[error("failed to read interplugin response body")]
    Read(#[source] io::Error),

    #[error("failed to encode autolink")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode autolinks from response")]
    Decode(#[source] serde_json::Error),

    #[error("failed to build interplugin request")]
    InvalidRequest(#[from] http::Error),

    #[error("failed to encode query parameters")]
    QueryEncode(#[from] serde_urlencoded::ser::Error),
}

impl ClientError {
    /// Status code of a [`ClientError::Remote`] failure.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}
