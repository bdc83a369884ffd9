use askama::Template;

/// Globs Tailwind scans for class names in a generated panel
pub const TAILWIND_CONTENT_GLOBS: &[&str] = &[
    "./app/**/*.{js,ts,jsx,tsx,mdx}",
    "./pages/**/*.{js,ts,jsx,tsx,mdx}",
    "./components/**/*.{js,ts,jsx,tsx,mdx}",
];

/// PostCSS plugins, in load order
pub const POSTCSS_PLUGINS: &[&str] = &["@tailwindcss/postcss", "autoprefixer"];

/// Template data for generating tailwind.config.js
#[derive(Template)]
#[template(path = "tailwind.config.js.txt", escape = "none")]
pub struct TailwindConfigTemplate {
    /// Paths Tailwind scans for class names
    pub content_globs: Vec<String>,
}

impl Default for TailwindConfigTemplate {
    fn default() -> Self {
        Self {
            content_globs: TAILWIND_CONTENT_GLOBS.iter().map(|g| g.to_string()).collect(),
        }
    }
}

/// Template data for generating postcss.config.js
#[derive(Template)]
#[template(path = "postcss.config.js.txt", escape = "none")]
pub struct PostcssConfigTemplate {
    pub plugins: Vec<String>,
}

impl Default for PostcssConfigTemplate {
    fn default() -> Self {
        Self {
            plugins: POSTCSS_PLUGINS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Render an askama template, ending the output with exactly one newline.
pub fn render_config<T: Template>(template: &T) -> askama::Result<String> {
    let mut out = template.render()?;
    while out.ends_with('\n') {
        out.pop();
    }
    out.push('\n');
    Ok(out)
}
