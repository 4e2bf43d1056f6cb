//! # jobyard-renderer
//!
//! Tera-based template engine that renders the `config.xml` body written
//! into every generated job directory.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use jobyard_renderer::JobRenderer;
//! use jobyard_core::Job;
//!
//! fn render_one(job: &Job) {
//!     if let Ok(renderer) = JobRenderer::new() {
//!         if let Ok(body) = renderer.render(job) {
//!             println!("{} bytes", body.len());
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::{ExportedVariable, JobContext};
pub use engine::{JobRenderer, TemplateEngine, JOB_CONFIG_TEMPLATE};
pub use error::RenderError;
