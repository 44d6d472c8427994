//! Gradle build script generation
//!
//! Renders `app/build.gradle.kts` for a white-label app from the built-in
//! template or a project-supplied one.

use crate::app::WhiteLabelApp;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use whitelabel_core::config::RenderConfig;
use whitelabel_core::error::{Error, Result, ResultExt};
use whitelabel_template::{ParseOptions, RenderOptions, Template};

/// Built-in Flutter `app/build.gradle.kts` template
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/build.gradle.kts.mustache");

/// Renders build scripts from one parsed template
#[derive(Debug, Clone)]
pub struct GradleGenerator {
    template: Template,
    options: RenderOptions,
}

impl GradleGenerator {
    /// Generator using the built-in template, strict, with standalone lines stripped
    pub fn new() -> Result<Self> {
        Self::with_template(
            DEFAULT_TEMPLATE,
            ParseOptions::default().standalone_lines(true),
            RenderOptions::strict(),
        )
    }

    /// Generator using `source` as the template
    pub fn with_template(source: &str, parse: ParseOptions, options: RenderOptions) -> Result<Self> {
        let template = Template::parse_with(source, parse)
            .map_err(whitelabel_template::TemplateError::from)?;
        Ok(Self { template, options })
    }

    /// Generator configured from `[render]`, optionally overriding the template
    pub fn from_config(render: &RenderConfig, template: Option<&str>) -> Result<Self> {
        Self::with_template(
            template.unwrap_or(DEFAULT_TEMPLATE),
            render.parse_options(),
            render.render_options(),
        )
    }

    /// The parsed template
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Validate `app` and render its build script.
    ///
    /// Validation warnings are logged; validation errors abort before rendering.
    pub fn generate(&self, app: &WhiteLabelApp) -> Result<String> {
        let validation = app.validate();
        for warning in validation.warnings() {
            tracing::warn!(namespace = %app.namespace, "{}", warning);
        }
        validation
            .to_result()
            .context(format!("Invalid app description for {}", app.namespace))?;

        let context = app.to_context()?;
        let script = self
            .template
            .render_with(&context, &self.options)
            .map_err(Error::from)
            .context(format!("While rendering build script for {}", app.namespace))?;

        tracing::info!(
            namespace = %app.namespace,
            bytes = script.len(),
            "Build script generated"
        );
        Ok(script)
    }

    /// Generate scripts for many apps in parallel, keeping input order
    pub fn generate_all(&self, apps: &[WhiteLabelApp]) -> Vec<Result<String>> {
        apps.par_iter().map(|app| self.generate(app)).collect()
    }
}

/// Write a generated script to `project_dir/output`, creating parent directories.
///
/// Returns the path written.
pub fn write_build_script(project_dir: &Path, output: &Path, contents: &str) -> Result<PathBuf> {
    if !project_dir.is_dir() {
        return Err(Error::project_not_found(project_dir));
    }

    let path = project_dir.join(output);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(Error::from)
            .context(format!("While creating {}", parent.display()))?;
    }
    std::fs::write(&path, contents)
        .map_err(Error::from)
        .context(format!("While writing {}", path.display()))?;

    tracing::debug!(path = %path.display(), "Build script written");
    Ok(path)
}
