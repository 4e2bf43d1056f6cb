//! Remote job-runner client.
//!
//! The runner (a Jenkins-style controller) keeps its own registry of jobs,
//! fed from the same on-disk tree this crate writes. [`Executor`] is the
//! seam the actions call through; [`SshExecutor`] drives the controller's
//! CLI over `ssh`. Tests substitute a recording fake.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use thiserror::Error;

use jobyard_core::settings::JOB_CONFIG_FILE;
use jobyard_core::JobName;

/// ssh reserves this status for its own failures; anything the remote
/// command exits with stays below it.
const SSH_TRANSPORT_STATUS: i32 = 255;

/// A failed remote call, split by whether the endpoint was reached.
///
/// `Transport` means the controller never processed the request (spawn
/// failure, unreachable host, killed connection). `Command` means it did
/// and refused.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("job runner unreachable: {detail}")]
    Transport { detail: String },

    #[error("remote `{program}` exited with status {status}: {stderr}")]
    Command {
        program: String,
        status: i32,
        stderr: String,
    },
}

/// Remote side of every job action.
pub trait Executor: Send + Sync {
    /// Make the runner pick up the on-disk definition of `name`, whether
    /// it already knows the job or not.
    fn register_or_reload(&self, name: &JobName) -> Result<(), ExecutorError>;

    /// Remove `name` from the runner's registry.
    fn delete(&self, name: &JobName) -> Result<(), ExecutorError>;
}

/// Drives the controller CLI over `ssh`.
///
/// `register_or_reload` tries `reload-job` first and falls back to
/// `create-job` with the on-disk config streamed on stdin when the runner
/// does not know the job yet.
pub struct SshExecutor {
    host: String,
    port: u16,
    user: Option<String>,
    jobs_root: PathBuf,
}

impl SshExecutor {
    pub fn new(host: impl Into<String>, port: u16, jobs_root: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            port,
            user: None,
            jobs_root: jobs_root.into(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    fn run_cli(
        &self,
        program: &str,
        name: &JobName,
        stdin_payload: Option<&str>,
    ) -> Result<(), ExecutorError> {
        tracing::debug!("ssh {}:{} {} {}", self.host, self.port, program, name);

        let mut command = Command::new("ssh");
        command.arg("-p").arg(self.port.to_string());
        if let Some(user) = &self.user {
            command.arg("-l").arg(user);
        }
        command
            .arg(&self.host)
            .arg(program)
            .arg(name.as_str())
            .stdin(if stdin_payload.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|e| ExecutorError::Transport {
            detail: format!("cannot spawn ssh: {e}"),
        })?;
        if let Some(payload) = stdin_payload {
            let mut stdin = child.stdin.take().ok_or_else(|| ExecutorError::Transport {
                detail: "ssh stdin not captured".to_string(),
            })?;
            stdin
                .write_all(payload.as_bytes())
                .map_err(|e| ExecutorError::Transport {
                    detail: format!("cannot stream config to ssh: {e}"),
                })?;
            // dropping the handle closes the pipe
        }
        let output = child.wait_with_output().map_err(|e| ExecutorError::Transport {
            detail: format!("cannot collect ssh output: {e}"),
        })?;

        interpret_output(program, &output)
    }

    fn read_config(&self, name: &JobName) -> Result<String, ExecutorError> {
        let path = self.jobs_root.join(name.as_str()).join(JOB_CONFIG_FILE);
        fs::read_to_string(&path).map_err(|e| ExecutorError::Transport {
            detail: format!("cannot read {}: {e}", path.display()),
        })
    }
}

impl Executor for SshExecutor {
    fn register_or_reload(&self, name: &JobName) -> Result<(), ExecutorError> {
        match self.run_cli("reload-job", name, None) {
            Ok(()) => Ok(()),
            Err(ExecutorError::Command { .. }) => {
                tracing::debug!("reload-job {name} refused, falling back to create-job");
                let config = self.read_config(name)?;
                self.run_cli("create-job", name, Some(&config))
            }
            Err(transport) => Err(transport),
        }
    }

    fn delete(&self, name: &JobName) -> Result<(), ExecutorError> {
        self.run_cli("delete-job", name, None)
    }
}

/// Executor that skips every remote call.
///
/// For offline runs that only manipulate the local tree, e.g. seeding a
/// jobs root before the controller exists.
pub struct NoopExecutor;

impl Executor for NoopExecutor {
    fn register_or_reload(&self, name: &JobName) -> Result<(), ExecutorError> {
        tracing::debug!("offline: skipping registration of {name}");
        Ok(())
    }

    fn delete(&self, name: &JobName) -> Result<(), ExecutorError> {
        tracing::debug!("offline: skipping deletion of {name}");
        Ok(())
    }
}

/// Map an ssh exit into the transport/command split.
fn interpret_output(program: &str, output: &Output) -> Result<(), ExecutorError> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    match output.status.code() {
        Some(SSH_TRANSPORT_STATUS) => Err(ExecutorError::Transport {
            detail: if stderr.is_empty() {
                format!("ssh exited with status {SSH_TRANSPORT_STATUS}")
            } else {
                stderr
            },
        }),
        Some(status) => Err(ExecutorError::Command {
            program: program.to_string(),
            status,
            stderr,
        }),
        None => Err(ExecutorError::Transport {
            detail: format!("ssh terminated by signal: {stderr}"),
        }),
    }
}
