use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tempfile::TempDir;

use jobyard_core::{
    Job, JobName, JobSet, MachinePreference, Platform, Product, Project, Settings, Task,
};
use jobyard_renderer::JobRenderer;
use jobyard_sync::{Executor, ExecutorError, JobUpdater};

// ---------------------------------------------------------------------------
// Recording fake executor
// ---------------------------------------------------------------------------

/// Records every remote call; configurable per-name failures.
#[derive(Clone, Default)]
struct FakeExecutor {
    calls: Arc<Mutex<Vec<String>>>,
    fail_register: HashSet<String>,
    fail_delete: HashSet<String>,
}

impl FakeExecutor {
    fn fail_register_for(mut self, name: &str) -> Self {
        self.fail_register.insert(name.to_string());
        self
    }

    fn fail_delete_for(mut self, name: &str) -> Self {
        self.fail_delete.insert(name.to_string());
        self
    }

    fn recorded(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl Executor for FakeExecutor {
    fn register_or_reload(&self, name: &JobName) -> Result<(), ExecutorError> {
        self.calls.lock().expect("calls lock").push(format!("register {name}"));
        if self.fail_register.contains(name.as_str()) {
            return Err(ExecutorError::Command {
                program: "reload-job".to_string(),
                status: 4,
                stderr: format!("No such job {name}"),
            });
        }
        Ok(())
    }

    fn delete(&self, name: &JobName) -> Result<(), ExecutorError> {
        self.calls.lock().expect("calls lock").push(format!("delete {name}"));
        if self.fail_delete.contains(name.as_str()) {
            return Err(ExecutorError::Transport { detail: "connection refused".to_string() });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    _root: TempDir,
    settings: Settings,
    executor: FakeExecutor,
    updater: JobUpdater,
}

fn harness() -> Harness {
    harness_with(FakeExecutor::default())
}

fn harness_with(executor: FakeExecutor) -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();
    let root = TempDir::new().expect("tempdir");
    let settings = Settings::under_root(root.path());
    settings.ensure_layout().expect("layout");
    let updater = JobUpdater::new(
        settings.clone(),
        JobRenderer::new().expect("renderer"),
        Box::new(executor.clone()),
    );
    Harness { _root: root, settings, executor, updater }
}

fn job(task_id: &str) -> Job {
    job_on(task_id, ("el", "7", "x86_64"), None)
}

fn job_on(task_id: &str, (os, version, arch): (&str, &str, &str), poll: Option<&str>) -> Job {
    Job::new(
        "wheat",
        Product {
            id: "jdk8".into(),
            jdk_version: "8".into(),
            package_name: "java-1.8.0-openjdk".into(),
        },
        Task {
            id: task_id.into(),
            script: format!("/scripts/{task_id}.sh").into(),
            machine_preference: MachinePreference::Vm,
            scm_poll_schedule: poll.map(str::to_owned),
        },
        Platform {
            os: os.into(),
            version: version.into(),
            architecture: arch.into(),
            provider: "vagrant".into(),
        },
        BTreeMap::new(),
    )
    .expect("job")
}

fn set(jobs: Vec<Job>) -> JobSet {
    JobSet::from_jobs(jobs).expect("set")
}

fn seed_job_dir(settings: &Settings, name: &JobName, content: &str) {
    let dir = settings.job_dir(name);
    fs::create_dir_all(&dir).expect("job dir");
    fs::write(dir.join("config.xml"), content).expect("config");
}

fn seed_archived_dir(settings: &Settings, name: &JobName, content: &str) {
    let dir = settings.archived_job_dir(name);
    fs::create_dir_all(&dir).expect("archived dir");
    fs::write(dir.join("config.xml"), content).expect("config");
}

fn read_config(settings: &Settings, name: &JobName) -> String {
    fs::read_to_string(settings.job_config_path(name)).expect("read config")
}

fn seed_store(settings: &Settings) {
    let store = settings.store();
    store
        .save_product(&Product {
            id: "jdk8".into(),
            jdk_version: "8".into(),
            package_name: "java-1.8.0-openjdk".into(),
        })
        .expect("product");
    for (os, version, arch) in [("el", "7", "x86_64"), ("f", "36", "aarch64")] {
        store
            .save_platform(&Platform {
                os: os.into(),
                version: version.into(),
                architecture: arch.into(),
                provider: "vagrant".into(),
            })
            .expect("platform");
    }
    for id in ["build", "tck"] {
        store
            .save_task(&Task {
                id: id.into(),
                script: format!("/scripts/{id}.sh").into(),
                machine_preference: MachinePreference::Vm,
                scm_poll_schedule: None,
            })
            .expect("task");
    }
}

fn stored_project(settings: &Settings, id: &str, tasks: &[&str], platforms: &[&str]) -> Project {
    let project = Project {
        id: id.into(),
        product: "jdk8".into(),
        platforms: platforms.iter().map(|p| p.to_string()).collect(),
        tasks: tasks.iter().map(|t| t.to_string()).collect(),
        variants: BTreeMap::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    settings.store().save_project(&project).expect("save project");
    project
}

// ---------------------------------------------------------------------------
// Create / archive / revive / rewrite flows
// ---------------------------------------------------------------------------

#[test]
fn create_writes_dir_and_config_and_registers() {
    let h = harness();
    let tck = job("tck");
    let name = tck.canonical_name();

    let results = h.updater.update(&JobSet::empty(), &set(vec![tck])).expect("update");

    assert_eq!(results.created.len(), 1);
    assert!(results.created[0].success, "got: {:?}", results.created[0]);
    assert!(results.archived.is_empty() && results.revived.is_empty());

    assert!(h.settings.job_dir(&name).is_dir());
    let config = read_config(&h.settings, &name);
    assert!(config.contains(name.as_str()), "config should embed the job name");
    assert!(config.contains("/scripts/tck.sh"));
    assert_eq!(h.executor.recorded(), vec![format!("register {name}")]);
}

#[test]
fn reapplying_the_same_set_is_a_no_op() {
    let h = harness();
    let desired = set(vec![job("tck"), job("build")]);
    h.updater.update(&JobSet::empty(), &desired).expect("first");
    let calls_after_first = h.executor.recorded().len();

    let results = h.updater.update(&desired, &desired).expect("second");

    assert!(results.is_empty(), "converged run must produce no results");
    assert_eq!(h.executor.recorded().len(), calls_after_first, "no further remote calls");
}

#[test]
fn archive_moves_dir_and_deletes_remotely() {
    let h = harness();
    let tck = job("tck");
    let name = tck.canonical_name();
    seed_job_dir(&h.settings, &name, "<project/>");

    let results = h.updater.update(&set(vec![tck]), &JobSet::empty()).expect("update");

    assert_eq!(results.archived.len(), 1);
    assert!(results.archived[0].success);
    assert!(!h.settings.job_dir(&name).exists(), "active dir must be gone");
    let archived_config = h.settings.archived_job_dir(&name).join("config.xml");
    assert_eq!(fs::read_to_string(archived_config).expect("read"), "<project/>");
    assert_eq!(h.executor.recorded(), vec![format!("delete {name}")]);
}

#[test]
fn removed_then_reintroduced_job_revives_instead_of_creating() {
    let h = harness();
    let tck = job("tck");
    let name = tck.canonical_name();
    seed_job_dir(&h.settings, &name, "stale body");

    h.updater.update(&set(vec![tck.clone()]), &JobSet::empty()).expect("remove");
    assert!(h.settings.archived_job_dir(&name).is_dir());

    let results = h.updater.update(&JobSet::empty(), &set(vec![tck.clone()])).expect("revive");

    assert_eq!(results.revived.len(), 1, "must revive, not create: {results:?}");
    assert!(results.created.is_empty());
    assert!(h.settings.job_dir(&name).is_dir());
    assert!(!h.settings.archived_job_dir(&name).exists());
    // the config is regenerated on revival, not restored from the archive
    let config = read_config(&h.settings, &name);
    assert_ne!(config, "stale body");
    assert!(config.contains("/scripts/tck.sh"));
    assert_eq!(
        h.executor.recorded(),
        vec![format!("delete {name}"), format!("register {name}")]
    );

    // the archive entry is consumed: a third run with the same set is a no-op
    let third = h.updater.update(&set(vec![tck.clone()]), &set(vec![tck])).expect("third");
    assert!(third.is_empty());
}

#[test]
fn archive_presence_wins_even_when_active_copy_matches() {
    let h = harness();
    let tck = job("tck");
    let name = tck.canonical_name();
    seed_job_dir(&h.settings, &name, "active copy");
    seed_archived_dir(&h.settings, &name, "archived copy");

    let results =
        h.updater.update(&set(vec![tck.clone()]), &set(vec![tck])).expect("update");

    assert_eq!(results.revived.len(), 1, "identical content must still revive: {results:?}");
    assert!(results.rewritten.is_empty());
}

#[test]
fn content_change_rewrites_in_place() {
    let h = harness();
    let before = job_on("tck", ("el", "7", "x86_64"), None);
    let after = job_on("tck", ("el", "7", "x86_64"), Some("H/15 * * * *"));
    let name = before.canonical_name();
    assert_eq!(name, after.canonical_name());
    seed_job_dir(&h.settings, &name, "out of date");

    let results =
        h.updater.update(&set(vec![before]), &set(vec![after])).expect("update");

    assert_eq!(results.rewritten.len(), 1);
    assert!(results.rewritten[0].success);
    let config = read_config(&h.settings, &name);
    assert!(config.contains("H/15 * * * *"), "rewritten config carries the new trigger");
    assert_eq!(h.executor.recorded(), vec![format!("register {name}")]);
}

#[test]
fn rename_is_archival_plus_creation() {
    let h = harness();
    let old_job = job("tck");
    let new_job = job("jtreg");
    let old_name = old_job.canonical_name();
    let new_name = new_job.canonical_name();
    seed_job_dir(&h.settings, &old_name, "<project/>");

    let results =
        h.updater.update(&set(vec![old_job]), &set(vec![new_job])).expect("update");

    assert_eq!(results.archived.len(), 1);
    assert_eq!(results.created.len(), 1);
    assert!(results.rewritten.is_empty());
    assert!(h.settings.archived_job_dir(&old_name).is_dir());
    assert!(h.settings.job_dir(&new_name).is_dir());
    // archival runs before creation
    assert_eq!(
        h.executor.recorded(),
        vec![format!("delete {old_name}"), format!("register {new_name}")]
    );
}

#[test]
fn mixed_run_archives_from_the_snapshot_taken_up_front() {
    let h = harness();
    let leaving = job("tck");
    let returning = job("jtreg");
    let leaving_name = leaving.canonical_name();
    let returning_name = returning.canonical_name();
    seed_job_dir(&h.settings, &leaving_name, "<project/>");
    seed_archived_dir(&h.settings, &returning_name, "<project/>");

    let results =
        h.updater.update(&set(vec![leaving]), &set(vec![returning])).expect("update");

    assert_eq!(results.archived.len(), 1);
    assert_eq!(results.revived.len(), 1);
    assert!(h.settings.archived_job_dir(&leaving_name).is_dir());
    assert!(h.settings.job_dir(&returning_name).is_dir());
}

// ---------------------------------------------------------------------------
// Failure capture and compensation
// ---------------------------------------------------------------------------

#[test]
fn failing_sibling_does_not_abort_the_batch() {
    let h = harness();
    let tck = job("tck");
    let build = job("build");
    let tck_name = tck.canonical_name();
    let build_name = build.canonical_name();
    // leftover directory makes the tck creation fail
    fs::create_dir_all(h.settings.job_dir(&tck_name)).expect("leftover dir");

    let results =
        h.updater.update(&JobSet::empty(), &set(vec![tck, build])).expect("update");

    assert_eq!(results.created.len(), 2);
    let by_name = |name: &JobName| {
        results.created.iter().find(|r| &r.name == name).expect("result present")
    };
    assert!(!by_name(&tck_name).success);
    assert!(by_name(&build_name).success);
    assert!(h.settings.job_config_path(&build_name).is_file(), "sibling still created");
}

#[test]
fn local_failure_still_drives_the_remote_phase() {
    let h = harness();
    let tck = job("tck");
    let name = tck.canonical_name();
    fs::create_dir_all(h.settings.job_dir(&name)).expect("leftover dir");

    let results = h.updater.update(&JobSet::empty(), &set(vec![tck])).expect("update");

    let result = &results.created[0];
    assert!(!result.success);
    let message = result.message.as_deref().expect("message");
    assert!(message.contains(name.as_str()), "local cause names the path: {message}");
    // the registration call happened despite the local failure
    assert_eq!(h.executor.recorded(), vec![format!("register {name}")]);
}

#[test]
fn remote_failure_surfaces_when_local_phase_succeeded() {
    let tck = job("tck");
    let name = tck.canonical_name();
    let h = harness_with(FakeExecutor::default().fail_register_for(name.as_str()));

    let results = h.updater.update(&JobSet::empty(), &set(vec![tck])).expect("update");

    let result = &results.created[0];
    assert!(!result.success);
    let message = result.message.as_deref().expect("message");
    assert!(message.contains("reload-job"), "remote cause surfaces: {message}");
    assert!(h.settings.job_config_path(&name).is_file(), "local write already happened");
}

#[test]
fn local_cause_wins_when_both_phases_fail() {
    let tck = job("tck");
    let name = tck.canonical_name();
    let h = harness_with(FakeExecutor::default().fail_register_for(name.as_str()));
    fs::create_dir_all(h.settings.job_dir(&name)).expect("leftover dir");

    let results = h.updater.update(&JobSet::empty(), &set(vec![tck])).expect("update");

    let message = results.created[0].message.as_deref().expect("message");
    assert!(message.contains(name.as_str()));
    assert!(!message.contains("No such job"), "remote cause must stay out of the message");
}

#[test]
fn failed_archive_move_still_calls_remote_delete() {
    let h = harness();
    let tck = job("tck");
    let name = tck.canonical_name();
    // no directory on disk: the move fails

    let results = h.updater.update(&set(vec![tck]), &JobSet::empty()).expect("update");

    assert!(!results.archived[0].success);
    assert_eq!(h.executor.recorded(), vec![format!("delete {name}")]);
}

#[test]
fn failed_remote_delete_marks_the_archival_failed() {
    let tck = job("tck");
    let name = tck.canonical_name();
    let h = harness_with(FakeExecutor::default().fail_delete_for(name.as_str()));
    seed_job_dir(&h.settings, &name, "<project/>");

    let results = h.updater.update(&set(vec![tck]), &JobSet::empty()).expect("update");

    let result = &results.archived[0];
    assert!(!result.success);
    assert!(result.message.as_deref().expect("message").contains("connection refused"));
    // the local move happened regardless
    assert!(h.settings.archived_job_dir(&name).is_dir());
}

// ---------------------------------------------------------------------------
// Project-level drivers
// ---------------------------------------------------------------------------

#[test]
fn update_projects_creates_a_whole_universe() {
    let h = harness();
    seed_store(&h.settings);
    let wheat = stored_project(&h.settings, "wheat", &["build", "tck"], &["el7.x86_64"]);

    let results = h.updater.update_projects(None, Some(&wheat)).expect("update");

    assert_eq!(results.created.len(), 2);
    assert!(results.created.iter().all(|r| r.success));
    for task in ["build", "tck"] {
        let name = JobName::from(format!("{task}-jdk8-wheat-el7.x86_64"));
        assert!(h.settings.job_config_path(&name).is_file());
    }
}

#[test]
fn update_projects_with_unknown_reference_aborts_untouched() {
    let h = harness();
    seed_store(&h.settings);
    let broken =
        stored_project(&h.settings, "wheat", &["missing_task"], &["el7.x86_64"]);

    let err = h.updater.update_projects(None, Some(&broken)).expect_err("must abort");

    assert!(err.to_string().contains("missing_task"), "got: {err}");
    assert!(h.executor.recorded().is_empty());
}

#[test]
fn selective_rewrite_touches_only_matching_platform() {
    let h = harness();
    seed_store(&h.settings);
    stored_project(&h.settings, "wheat", &["build"], &["el7.x86_64", "f36.aarch64"]);
    let el7 = JobName::from("build-jdk8-wheat-el7.x86_64");
    let f36 = JobName::from("build-jdk8-wheat-f36.aarch64");
    seed_job_dir(&h.settings, &el7, "stale el7");
    seed_job_dir(&h.settings, &f36, "stale f36");

    let results = h.updater.rewrite_platform("el7.x86_64").expect("rewrite");

    assert_eq!(results.rewritten.len(), 1);
    assert_eq!(results.rewritten[0].name, el7);
    assert!(results.created.is_empty() && results.archived.is_empty());
    assert_ne!(read_config(&h.settings, &el7), "stale el7");
    assert_eq!(read_config(&h.settings, &f36), "stale f36", "non-matching job untouched");
}

#[test]
fn selective_rewrite_by_task_spans_projects() {
    let h = harness();
    seed_store(&h.settings);
    stored_project(&h.settings, "wheat", &["build", "tck"], &["el7.x86_64"]);
    stored_project(&h.settings, "rye", &["build"], &["f36.aarch64"]);
    for name in ["build-jdk8-wheat-el7.x86_64", "tck-jdk8-wheat-el7.x86_64", "build-jdk8-rye-f36.aarch64"] {
        seed_job_dir(&h.settings, &JobName::from(name), "stale");
    }

    let results = h.updater.rewrite_task("build").expect("rewrite");

    let rewritten: Vec<&str> =
        results.rewritten.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(rewritten.len(), 2);
    assert!(rewritten.contains(&"build-jdk8-wheat-el7.x86_64"));
    assert!(rewritten.contains(&"build-jdk8-rye-f36.aarch64"));
    assert_eq!(
        read_config(&h.settings, &JobName::from("tck-jdk8-wheat-el7.x86_64")),
        "stale",
        "other tasks untouched"
    );
}

#[test]
fn selective_rewrite_by_project_covers_all_its_jobs() {
    let h = harness();
    seed_store(&h.settings);
    stored_project(&h.settings, "wheat", &["build", "tck"], &["el7.x86_64"]);
    stored_project(&h.settings, "rye", &["build"], &["el7.x86_64"]);
    for name in
        ["build-jdk8-wheat-el7.x86_64", "tck-jdk8-wheat-el7.x86_64", "build-jdk8-rye-el7.x86_64"]
    {
        seed_job_dir(&h.settings, &JobName::from(name), "stale");
    }

    let results = h.updater.rewrite_project("wheat").expect("rewrite");

    let rewritten: Vec<&str> =
        results.rewritten.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(rewritten.len(), 2);
    assert!(rewritten.contains(&"build-jdk8-wheat-el7.x86_64"));
    assert!(rewritten.contains(&"tck-jdk8-wheat-el7.x86_64"));
    assert_eq!(
        read_config(&h.settings, &JobName::from("build-jdk8-rye-el7.x86_64")),
        "stale",
        "other projects untouched"
    );
}

#[test]
fn broken_project_is_skipped_without_failing_the_batch() {
    let h = harness();
    seed_store(&h.settings);
    stored_project(&h.settings, "barley", &["nonexistent"], &["el7.x86_64"]);
    stored_project(&h.settings, "wheat", &["build"], &["el7.x86_64"]);
    let wheat_build = JobName::from("build-jdk8-wheat-el7.x86_64");
    seed_job_dir(&h.settings, &wheat_build, "stale");

    let results = h.updater.rewrite_task("build").expect("batch must survive");

    assert_eq!(results.rewritten.len(), 1);
    assert_eq!(results.rewritten[0].name, wheat_build);
}
