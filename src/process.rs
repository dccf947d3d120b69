//! Process launching.
//!
//! Sound players, desktop notifications, tracking commands and shell hooks
//! all run as child processes that the timer never waits on.
//! [`DetachedLauncher`] spawns each child at once and reaps it on a named
//! thread. [`SequentialLauncher`] queues commands for one worker thread that
//! runs them strictly in issue order, which tracking needs: a clock-out must
//! finish before the next clock-in starts.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{debug, warn};

// ============================================================================
// Launcher
// ============================================================================

/// Starts a program without waiting for it to finish.
pub trait Launcher: Send + Sync {
    /// Spawns `program` with `args` and extra environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the process could not be spawned.
    fn launch(
        &self,
        program: &Path,
        args: &[String],
        envs: &[(String, String)],
    ) -> std::io::Result<()>;
}

/// Launches real processes with null stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedLauncher;

impl Launcher for DetachedLauncher {
    fn launch(
        &self,
        program: &Path,
        args: &[String],
        envs: &[(String, String)],
    ) -> std::io::Result<()> {
        let mut child = Command::new(program)
            .args(args)
            .envs(envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        debug!("Launched {} (pid {})", program.display(), child.id());

        let name = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let reaper = thread::Builder::new()
            .name(format!("reap-{}", name))
            .spawn(move || match child.wait() {
                Ok(status) if !status.success() => {
                    debug!("Child process exited with {}", status);
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to wait for child process: {}", e),
            });

        if let Err(e) = reaper {
            warn!("Failed to spawn reaper thread: {}", e);
        }

        Ok(())
    }
}

// ============================================================================
// SequentialLauncher
// ============================================================================

/// Runs a program and waits for it to exit.
pub trait Runner: Send + 'static {
    /// # Errors
    ///
    /// Returns an error if the process could not be spawned or waited on.
    fn run(
        &self,
        program: &Path,
        args: &[String],
        envs: &[(String, String)],
    ) -> std::io::Result<()>;
}

/// Runs real processes with null stdio and waits for each one.
#[derive(Debug, Default, Clone, Copy)]
pub struct WaitingRunner;

impl Runner for WaitingRunner {
    fn run(
        &self,
        program: &Path,
        args: &[String],
        envs: &[(String, String)],
    ) -> std::io::Result<()> {
        let status = Command::new(program)
            .args(args)
            .envs(envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if !status.success() {
            debug!("{} exited with {}", program.display(), status);
        }
        Ok(())
    }
}

enum Job {
    Run(LaunchRecord),
    Flush(mpsc::Sender<()>),
}

/// Launcher that runs commands one at a time on a worker thread.
///
/// `launch` returns as soon as the command is queued. Commands run in the
/// order they were launched and each exits before the next one starts.
#[derive(Debug)]
pub struct SequentialLauncher {
    queue: mpsc::Sender<Job>,
}

impl SequentialLauncher {
    /// Starts a worker thread called `name` that runs real processes.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread cannot be spawned.
    pub fn new(name: &str) -> std::io::Result<Self> {
        Self::with_runner(name, WaitingRunner)
    }

    /// Starts a worker thread that hands every queued command to `runner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread cannot be spawned.
    pub fn with_runner(name: &str, runner: impl Runner) -> std::io::Result<Self> {
        let (queue, jobs) = mpsc::channel::<Job>();

        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                for job in jobs {
                    match job {
                        Job::Run(record) => {
                            if let Err(e) = runner.run(&record.program, &record.args, &record.envs)
                            {
                                warn!("Failed to run {}: {}", record.program.display(), e);
                            }
                        }
                        Job::Flush(done) => {
                            let _ = done.send(());
                        }
                    }
                }
            })?;

        Ok(Self { queue })
    }

    /// Blocks until every command queued so far has finished.
    pub fn flush(&self) {
        let (done, finished) = mpsc::channel();
        if self.queue.send(Job::Flush(done)).is_ok() {
            let _ = finished.recv();
        }
    }
}

impl Launcher for SequentialLauncher {
    fn launch(
        &self,
        program: &Path,
        args: &[String],
        envs: &[(String, String)],
    ) -> std::io::Result<()> {
        let program = resolve_program(program)?;
        self.queue
            .send(Job::Run(LaunchRecord {
                program,
                args: args.to_vec(),
                envs: envs.to_vec(),
            }))
            .map_err(|_| {
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "command worker has stopped")
            })
    }
}

/// Resolves `program` up front so a missing binary fails at launch time
/// instead of on the worker.
fn resolve_program(program: &Path) -> std::io::Result<PathBuf> {
    let resolved = if program.components().count() > 1 {
        program.is_file().then(|| program.to_path_buf())
    } else {
        program.to_str().and_then(find_executable)
    };

    resolved.ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", program.display()),
        )
    })
}

// ============================================================================
// MockLauncher
// ============================================================================

/// One recorded launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRecord {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
}

impl LaunchRecord {
    /// Returns the value of an environment variable passed to the launch.
    pub fn env(&self, key: &str) -> Option<&str> {
        self.envs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Mock launcher for testing. Clones share their records.
#[derive(Debug, Clone, Default)]
pub struct MockLauncher {
    records: Arc<Mutex<Vec<LaunchRecord>>>,
    should_fail: Arc<AtomicBool>,
}

impl MockLauncher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn launches(&self) -> Vec<LaunchRecord> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    #[must_use]
    pub fn launch_count(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn clear(&self) {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl Launcher for MockLauncher {
    fn launch(
        &self,
        program: &Path,
        args: &[String],
        envs: &[(String, String)],
    ) -> std::io::Result<()> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("mock launch failure: {}", program.display()),
            ));
        }
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(LaunchRecord {
                program: program.to_path_buf(),
                args: args.to_vec(),
                envs: envs.to_vec(),
            });
        Ok(())
    }
}

// ============================================================================
// Environment probing
// ============================================================================

/// Searches `PATH` for an executable file named `name`.
#[must_use]
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Returns true when running inside Windows Subsystem for Linux.
#[must_use]
pub fn is_wsl() -> bool {
    if std::env::var_os("WSL_DISTRO_NAME").is_some() {
        return true;
    }
    std::fs::read_to_string("/proc/sys/kernel/osrelease")
        .map(|release| release.to_lowercase().contains("microsoft"))
        .unwrap_or(false)
}

// ============================================================================
// Tests
// ============================================================================
