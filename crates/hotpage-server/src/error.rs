//! Server error types.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hotpage_templates::TemplateError;

use crate::live_reload::{FatalError, WatchError};

/// Errors from starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Template root does not exist or cannot be resolved.
    #[error("Template root {} is not accessible: {source}", path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Templates could not be compiled or rendered.
    #[error(transparent)]
    Templates(#[from] TemplateError),

    /// Live reload could not start watching the template root.
    #[error("Could not start live reload: {0}")]
    Watch(#[from] WatchError),

    /// Live reload failed while running.
    #[error("Live reload failed: {0}")]
    Fatal(#[from] FatalError),

    /// Listener or connection I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
