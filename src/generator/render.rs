use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::Serialize;
use std::fmt;

/// Values available to a template.
///
/// Serialized with the token names templates use: `modelName`,
/// `modelImportPath`, `projectName`, `models`, `sourceProjectRoot`. The two
/// model fields are only present when rendering a per-model template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_import_path: Option<String>,
    pub project_name: String,
    #[serde(rename = "models")]
    pub model_names: Vec<String>,
    pub source_project_root: String,
}

impl TemplateContext {
    /// Project-level context for auxiliary templates.
    pub fn project(
        project_name: impl Into<String>,
        model_names: &[String],
        source_project_root: impl Into<String>,
    ) -> Self {
        Self {
            model_name: None,
            model_import_path: None,
            project_name: project_name.into(),
            model_names: model_names.to_vec(),
            source_project_root: source_project_root.into(),
        }
    }

    /// Copy of this context scoped to one model.
    pub fn for_model(&self, model_name: &str, model_import_path: String) -> Self {
        Self {
            model_name: Some(model_name.to_string()),
            model_import_path: Some(model_import_path),
            ..self.clone()
        }
    }
}

/// A template failed to parse or evaluate.
#[derive(Debug)]
pub struct RenderError {
    /// Template identity (its path relative to the template root)
    pub template: String,
    pub source: minijinja::Error,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to render template '{}': {}", self.template, self.source)
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Named substitution into template text.
///
/// Stateless apart from engine settings: output escaping is off (templates
/// produce JavaScript and JSON, not HTML), unknown variables render as empty
/// and trailing newlines are kept so rendered files match their templates.
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_undefined_behavior(UndefinedBehavior::Lenient);
        env.set_keep_trailing_newline(true);
        Self { env }
    }

    /// Render `template` (identified as `name` in errors) with `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] on syntax errors or evaluation failures.
    pub fn render(
        &self,
        name: &str,
        template: &str,
        ctx: &TemplateContext,
    ) -> Result<String, RenderError> {
        self.env
            .render_named_str(name, template, ctx)
            .map_err(|source| RenderError {
                template: name.to_string(),
                source,
            })
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}
