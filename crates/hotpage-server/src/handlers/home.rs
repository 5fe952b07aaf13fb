//! Home page endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;

use crate::error::ServerError;
use crate::state::AppState;

/// Render the index template from the current snapshot.
pub(crate) async fn get_home(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, ServerError> {
    let html = state.templates.get().render(&state.index)?;
    Ok(Html(html))
}
