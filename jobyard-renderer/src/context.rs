//! Render context — serializable payload built from a [`Job`].

use serde::{Deserialize, Serialize};

use jobyard_core::Job;

use crate::error::RenderError;

/// One environment variable exported to the job's shell step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedVariable {
    pub name: String,
    pub value: String,
}

/// Everything the job config template can reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobContext {
    /// Canonical job name; also the directory the config lands in.
    pub name: String,
    pub project: String,
    pub product_package: String,
    /// Script the generated shell step executes.
    pub script: String,
    /// Worker label expression, e.g. `el7.x86_64 && vm`.
    pub node_label: String,
    /// Cron spec for the SCM poll trigger; `None` renders no trigger.
    pub scm_poll_schedule: Option<String>,
    /// Exported in declaration order: fixed variables first, then one per
    /// variant axis.
    pub variables: Vec<ExportedVariable>,
}

impl JobContext {
    /// Build a [`JobContext`] from a [`Job`].
    pub fn from_job(job: &Job) -> Self {
        let platform = job.platform();
        let task = job.task();
        let product = job.product();

        let mut variables = vec![
            var("JDK_VERSION", &product.jdk_version),
            var("OJDK", &format!("o{}", product.id)),
            var("PACKAGE_NAME", &product.package_name),
            var("PROJECT_NAME", job.project()),
            var("PLATFORM", &platform.id()),
            var("PLATFORM_PROVIDER", &platform.provider),
        ];
        for (axis, value) in job.variants() {
            variables.push(var(&axis.to_uppercase(), value));
        }

        JobContext {
            name: job.canonical_name().to_string(),
            project: job.project().to_owned(),
            product_package: product.package_name.clone(),
            script: task.script.display().to_string(),
            node_label: format!("{} && {}", platform.id(), task.machine_preference),
            scm_poll_schedule: task.scm_poll_schedule.clone(),
            variables,
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

fn var(name: &str, value: &str) -> ExportedVariable {
    ExportedVariable { name: name.to_owned(), value: value.to_owned() }
}
