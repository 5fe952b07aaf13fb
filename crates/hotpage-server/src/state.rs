//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use hotpage_templates::TemplateSet;

use crate::live_reload::LiveReload;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Live template set; handlers render from its current snapshot.
    pub(crate) templates: Arc<TemplateSet>,
    /// Template rendered at `/`.
    pub(crate) index: String,
    /// Live reload subsystem (if enabled).
    pub(crate) live_reload: Option<LiveReload>,
    /// Path the live reload WebSocket is served on.
    pub(crate) live_reload_endpoint: String,
}
