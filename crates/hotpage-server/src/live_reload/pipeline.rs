//! Recompile-and-deliver step run for every qualifying file change.

use std::sync::Arc;
use std::time::Instant;

use hotpage_source::TemplateSource;
use hotpage_templates::{TemplatePatterns, TemplateSet};

use super::error::FatalError;
use super::registry::ConnectionRegistry;

/// What a single reload did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// Nobody is listening; nothing was compiled.
    NoConnection,
    /// Compilation failed; the previous templates are still live.
    CompileFailed,
    /// Templates were swapped but the named template could not be rendered.
    RenderFailed,
    /// The rendered frame could not be handed to the connection.
    SendFailed,
    /// One frame with the rendered template was sent.
    Delivered,
}

/// Recompiles the full template set and pushes one rendered template.
#[derive(Clone)]
pub struct ReloadPipeline {
    source: Arc<dyn TemplateSource>,
    patterns: TemplatePatterns,
    templates: Arc<TemplateSet>,
    registry: ConnectionRegistry,
}

impl ReloadPipeline {
    /// Create a pipeline.
    ///
    /// # Arguments
    ///
    /// * `source` - Template source to recompile from
    /// * `patterns` - Patterns selecting template files
    /// * `templates` - Live template set to swap on success
    /// * `registry` - Where the active connection is looked up
    #[must_use]
    pub fn new(
        source: Arc<dyn TemplateSource>,
        patterns: TemplatePatterns,
        templates: Arc<TemplateSet>,
        registry: ConnectionRegistry,
    ) -> Self {
        Self {
            source,
            patterns,
            templates,
            registry,
        }
    }

    /// Registry the pipeline delivers through.
    #[must_use]
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Recompile all templates and send `file_name` rendered to the active
    /// connection.
    ///
    /// Holds the registry lock for the whole call, so concurrent reloads and
    /// connection replacement are serialized with it. Content problems are
    /// logged and reported through the returned [`ReloadOutcome`].
    ///
    /// # Errors
    ///
    /// Returns [`FatalError::WriterUnavailable`] if no frame can be opened on
    /// the active connection.
    pub async fn reload(&self, file_name: &str) -> Result<ReloadOutcome, FatalError> {
        let start = Instant::now();
        let active = self.registry.lock().await;

        let Some(channel) = active.as_ref() else {
            tracing::warn!(
                template = %file_name,
                "Skipping hot reload: no live reload connection"
            );
            return Ok(ReloadOutcome::NoConnection);
        };

        let templates = match self.templates.reload(self.source.as_ref(), &self.patterns) {
            Ok(templates) => templates,
            Err(e) => {
                tracing::error!(template = %file_name, error = %e, "Failed to recompile templates");
                return Ok(ReloadOutcome::CompileFailed);
            }
        };

        let mut writer = channel
            .next_text_writer()
            .map_err(FatalError::WriterUnavailable)?;

        if let Err(e) = templates.render_to(file_name, &mut writer) {
            tracing::warn!(template = %file_name, error = %e, "Failed to render changed template");
            return Ok(ReloadOutcome::RenderFailed);
        }

        if let Err(e) = writer.finish().await {
            tracing::error!(template = %file_name, error = %e, "Failed to send live reload frame");
            return Ok(ReloadOutcome::SendFailed);
        }

        tracing::info!(
            template = %file_name,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Hot reload delivered"
        );

        Ok(ReloadOutcome::Delivered)
    }
}
