//! Compiled template set.

use std::collections::BTreeMap;
use std::io;
use std::time::Instant;

use hotpage_source::TemplateSource;
use minijinja::Environment;

use crate::error::TemplateError;
use crate::patterns::TemplatePatterns;

/// All templates from a source, parsed into one environment.
///
/// Templates can include and extend one another by base file name. A set is
/// immutable once built; reloading produces a new set.
pub struct CompiledTemplates {
    env: Environment<'static>,
    names: Vec<String>,
}

impl CompiledTemplates {
    /// Create a set containing no templates.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            env: Environment::new(),
            names: Vec::new(),
        }
    }

    /// Compile every file matching `patterns` under the source root.
    ///
    /// The whole tree is read in one pass. Any failure aborts compilation and
    /// nothing is returned, so callers never see a partially compiled set.
    /// When two files share a base name, the one listed last wins.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if the source cannot be listed or read, if a
    /// template fails to parse, or if no file matches the patterns.
    pub fn compile(
        source: &dyn TemplateSource,
        patterns: &TemplatePatterns,
    ) -> Result<Self, TemplateError> {
        let start = Instant::now();

        let mut files = BTreeMap::new();
        for entry in source.list()? {
            if entry.is_dir || !patterns.matches(&entry.path) {
                continue;
            }
            let Some(name) = entry.path.file_name() else {
                continue;
            };
            let name = name.to_string_lossy().into_owned();
            let content = source.read(&entry.path)?;
            if files.insert(name.clone(), content).is_some() {
                tracing::warn!(
                    name = %name,
                    path = %entry.path.display(),
                    "Duplicate template name, later file wins"
                );
            }
        }

        if files.is_empty() {
            return Err(TemplateError::NoTemplates(patterns.as_strings()));
        }

        let mut env = Environment::new();
        let mut names = Vec::with_capacity(files.len());
        for (name, content) in files {
            env.add_template_owned(name.clone(), content)
                .map_err(|source| TemplateError::Compile {
                    name: name.clone(),
                    source,
                })?;
            names.push(name);
        }

        tracing::debug!(
            count = names.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Templates compiled"
        );

        Ok(Self { env, names })
    }

    /// Names of all compiled templates, sorted.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Render a template with an empty context into a writer.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Render`] if the template doesn't exist or
    /// evaluation fails. Output written before the failure stays in `writer`.
    pub fn render_to<W: io::Write>(&self, name: &str, writer: W) -> Result<(), TemplateError> {
        let render_error = |source| TemplateError::Render {
            name: name.to_owned(),
            source,
        };
        let template = self.env.get_template(name).map_err(render_error)?;
        template
            .render_to_write(minijinja::context! {}, writer)
            .map_err(render_error)?;
        Ok(())
    }

    /// Render a template with an empty context into a string.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Render`] if the template doesn't exist or
    /// evaluation fails.
    pub fn render(&self, name: &str) -> Result<String, TemplateError> {
        let render_error = |source| TemplateError::Render {
            name: name.to_owned(),
            source,
        };
        let template = self.env.get_template(name).map_err(render_error)?;
        template
            .render(minijinja::context! {})
            .map_err(render_error)
    }
}

impl std::fmt::Debug for CompiledTemplates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledTemplates")
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use hotpage_source::{FsSource, MockSource};
    use pretty_assertions::assert_eq;

    use super::*;

    fn site() -> MockSource {
        MockSource::new()
            .with_file("index.html", "<main>home</main>{% include \"footer.html\" %}")
            .with_file("partials/footer.html", "<footer>v1</footer>")
            .with_file("style.css", "body {}")
    }

    #[test]
    fn test_compile_includes_nested_templates() {
        let compiled = CompiledTemplates::compile(&site(), &TemplatePatterns::default()).unwrap();

        assert_eq!(compiled.names(), ["footer.html", "index.html"]);
    }

    #[test]
    fn test_render_resolves_includes_by_base_name() {
        let compiled = CompiledTemplates::compile(&site(), &TemplatePatterns::default()).unwrap();

        assert_eq!(
            compiled.render("index.html").unwrap(),
            "<main>home</main><footer>v1</footer>"
        );
    }

    #[test]
    fn test_render_to_writer() {
        let compiled = CompiledTemplates::compile(&site(), &TemplatePatterns::default()).unwrap();
        let mut buf = Vec::new();

        compiled.render_to("footer.html", &mut buf).unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), "<footer>v1</footer>");
    }

    #[test]
    fn test_render_missing_template() {
        let compiled = CompiledTemplates::compile(&site(), &TemplatePatterns::default()).unwrap();

        let err = compiled.render("deleted.html").unwrap_err();

        assert!(matches!(err, TemplateError::Render { ref name, .. } if name == "deleted.html"));
    }

    #[test]
    fn test_compile_syntax_error() {
        let source = site().with_file("broken.html", "{% if %}");

        let err = CompiledTemplates::compile(&source, &TemplatePatterns::default()).unwrap_err();

        assert!(matches!(err, TemplateError::Compile { ref name, .. } if name == "broken.html"));
    }

    #[test]
    fn test_compile_no_templates() {
        let source = MockSource::new().with_file("style.css", "body {}");

        let err = CompiledTemplates::compile(&source, &TemplatePatterns::default()).unwrap_err();

        assert!(matches!(err, TemplateError::NoTemplates(_)));
    }

    #[test]
    fn test_compile_reflects_current_content() {
        let source = site();
        let patterns = TemplatePatterns::default();
        let before = CompiledTemplates::compile(&source, &patterns).unwrap();

        source.write_file("partials/footer.html", "<footer>v2</footer>");
        let after = CompiledTemplates::compile(&source, &patterns).unwrap();

        assert_eq!(before.render("footer.html").unwrap(), "<footer>v1</footer>");
        assert_eq!(after.render("footer.html").unwrap(), "<footer>v2</footer>");
    }

    #[test]
    fn test_empty_set() {
        let compiled = CompiledTemplates::empty();

        assert!(compiled.names().is_empty());
        assert!(compiled.render("index.html").is_err());
    }

    #[test]
    fn test_compile_from_directory_tree() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("partials/deep")).unwrap();
        fs::write(
            dir.path().join("index.html"),
            "{% include \"footer.html\" %}{% include \"badge.html\" %}",
        )
        .unwrap();
        fs::write(dir.path().join("partials/footer.html"), "<footer></footer>").unwrap();
        fs::write(dir.path().join("partials/deep/badge.html"), "<b>new</b>").unwrap();
        fs::write(dir.path().join("partials/notes.txt"), "ignored").unwrap();

        let source = FsSource::new(dir.path().to_path_buf());
        let compiled = CompiledTemplates::compile(&source, &TemplatePatterns::default()).unwrap();

        assert_eq!(compiled.names(), ["badge.html", "footer.html", "index.html"]);
        assert_eq!(
            compiled.render("index.html").unwrap(),
            "<footer></footer><b>new</b>"
        );
    }
}
