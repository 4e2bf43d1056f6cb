//! Tera rendering engine for job config files.
//!
//! One embedded template, `job_config.xml.tera`, produces the `config.xml`
//! written into every job directory. An optional user template directory can
//! override it (and add partials) without rebuilding; overrides are matched
//! by normalised relative path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use jobyard_core::Job;

use crate::context::JobContext;
use crate::error::RenderError;

/// Template rendered into each job's `config.xml`.
pub const JOB_CONFIG_TEMPLATE: &str = "job_config.xml.tera";

// ---------------------------------------------------------------------------
// Embedded templates — baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] =
    &[(JOB_CONFIG_TEMPLATE, include_str!("templates/job_config.xml.tera"))];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

/// Escape the five XML special characters. Tera's stock escaper also rewrites
/// `/`, which corrupts script paths inside the shell step.
fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(normalize_template_name(Path::new(name)), (*content).to_string());
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    // values land inside XML element content
    tera.autoescape_on(vec![".xml.tera"]);
    tera.set_escape_fn(escape_xml);
    let items: Vec<(String, String)> = templates.into_iter().collect();
    tera.add_raw_templates(items)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine with optional user overrides.
///
/// `user_template_dir` may contain `.tera` files that override embedded
/// defaults. Template names are normalised to lowercase relative paths.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Construct a new [`TemplateEngine`], loading embedded templates plus any
    /// overrides found in `user_template_dir`.
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(user_template_dir)?;
        Ok(TemplateEngine { tera })
    }

    /// Render the job config body for the supplied context.
    pub fn render(&self, ctx: &JobContext) -> Result<String, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        Ok(self.tera.render(JOB_CONFIG_TEMPLATE, &tera_ctx)?)
    }
}

// ---------------------------------------------------------------------------
// JobRenderer
// ---------------------------------------------------------------------------

/// Renderer for job config bodies. Create once and reuse.
pub struct JobRenderer {
    engine: TemplateEngine,
}

impl JobRenderer {
    /// Construct a renderer with embedded templates only.
    pub fn new() -> Result<Self, RenderError> {
        Ok(JobRenderer { engine: TemplateEngine::new(None)? })
    }

    /// Construct a renderer whose templates may be overridden from `dir`.
    pub fn with_template_dir(dir: &Path) -> Result<Self, RenderError> {
        Ok(JobRenderer { engine: TemplateEngine::new(Some(dir))? })
    }

    /// Render the `config.xml` body for a job.
    pub fn render(&self, job: &Job) -> Result<String, RenderError> {
        self.engine.render(&JobContext::from_job(job))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
