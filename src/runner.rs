use crate::config::SliceConfig;
use crate::console::RunObserver;
use crate::error::{Error, Result};
use crate::grid::{self, SliceRect};
use crate::im::RGBAIm;
use crate::job::ImageJob;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Identity of one run. A run is canceled by dropping its token from the
/// runner's active slot; the worker compares against it between every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunToken(u64);

impl RunToken {
    fn fresh() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Canceled,
}

/// Final tally of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Images that were finished, successfully or not. An image cut short by
    /// cancellation is not counted.
    pub images_attempted: usize,
    pub images_failed: usize,
    pub outcome: RunOutcome,
    pub log: Vec<String>,
}

// Shared run slot
// -----------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Slot {
    active: Option<RunToken>,
    /// Stays set after a cancel until the worker has exited.
    running: bool,
}

#[derive(Debug, Default, Clone)]
struct Shared(Arc<Mutex<Slot>>);

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_active(&self, token: RunToken) -> bool {
        self.lock().active == Some(token)
    }

    fn cancel_any(&self) {
        self.lock().active = None;
    }

    fn cancel(&self, token: RunToken) {
        let mut slot = self.lock();
        if slot.active == Some(token) {
            slot.active = None;
        }
    }

    fn finish(&self, token: RunToken) {
        let mut slot = self.lock();
        if slot.active == Some(token) {
            slot.active = None;
        }
        slot.running = false;
    }
}

/// Releases the run slot when the worker exits, panicking or not.
struct FinishGuard {
    shared: Shared,
    token: RunToken,
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.shared.finish(self.token);
    }
}

// Runner
// -----------------------------------------------------------------------------

/// Runs slicing batches on a background thread, one batch at a time.
#[derive(Debug, Default, Clone)]
pub struct SliceRunner {
    shared: Shared,
}

/// Cancels whatever run is active on the runner it came from.
#[derive(Debug, Clone)]
pub struct RunCanceler {
    shared: Shared,
}

impl RunCanceler {
    pub fn cancel(&self) {
        self.shared.cancel_any();
    }
}

impl SliceRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunnerState {
        if self.shared.lock().running {
            RunnerState::Running
        } else {
            RunnerState::Idle
        }
    }

    pub fn canceler(&self) -> RunCanceler {
        RunCanceler {
            shared: self.shared.clone(),
        }
    }

    /// Cancel the active run, if any. Safe to call at any time.
    pub fn cancel(&self) {
        self.shared.cancel_any();
    }

    /// Validate `config` and start slicing `paths` in order on a new thread.
    ///
    /// Fails with `InvalidConfig` before anything is touched, and with `Busy`
    /// while a previous worker has not yet exited.
    pub fn start(
        &self,
        paths: Vec<PathBuf>,
        config: SliceConfig,
        observer: Arc<dyn RunObserver>,
    ) -> Result<RunHandle> {
        config.validate()?;

        let token = RunToken::fresh();
        {
            let mut slot = self.shared.lock();
            if slot.running {
                return Err(Error::Busy);
            }
            slot.running = true;
            slot.active = Some(token);
        }

        let guard = FinishGuard {
            shared: self.shared.clone(),
            token,
        };
        let spawned = thread::Builder::new()
            .name("tilecut-run".to_string())
            .spawn(move || {
                let guard = guard;
                let result = run_batch(&paths, &config, token, &guard.shared, observer.as_ref());
                observer.on_finished(&result);
                result
            });

        match spawned {
            Ok(join) => Ok(RunHandle {
                token,
                shared: self.shared.clone(),
                join,
            }),
            // The closure, and the guard inside it, were dropped with the failed spawn.
            Err(e) => Err(Error::Spawn(e)),
        }
    }
}

/// The caller's side of a started run.
#[derive(Debug)]
pub struct RunHandle {
    token: RunToken,
    shared: Shared,
    join: JoinHandle<RunResult>,
}

impl RunHandle {
    pub fn token(&self) -> RunToken {
        self.token
    }

    /// Cancel this run. A no-op once it has ended or if it was already canceled.
    pub fn cancel(&self) {
        self.shared.cancel(self.token);
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Block until the worker exits. The runner is `Idle` once this returns.
    pub fn wait(self) -> Result<RunResult> {
        self.join.join().map_err(|_| Error::WorkerPanicked)
    }
}

// Worker
// -----------------------------------------------------------------------------

enum ImageStatus {
    Done,
    Canceled,
}

struct RunLog<'a> {
    observer: &'a dyn RunObserver,
    lines: Vec<String>,
}

impl RunLog<'_> {
    fn line(&mut self, line: String) {
        self.observer.on_log(&line);
        self.lines.push(line);
    }
}

fn run_batch(
    paths: &[PathBuf],
    config: &SliceConfig,
    token: RunToken,
    shared: &Shared,
    observer: &dyn RunObserver,
) -> RunResult {
    let mut run_log = RunLog {
        observer,
        lines: Vec::new(),
    };
    let mut attempted = 0;
    let mut failed = 0;
    let mut outcome = RunOutcome::Completed;

    run_log.line("Slicing images:".to_string());
    info!("run {} started with {} images", token.id(), paths.len());

    for path in paths {
        match slice_image(path, config, token, shared, observer) {
            Ok(ImageStatus::Done) => {
                attempted += 1;
                run_log.line(format!("Slicing \"{}\" ok", path.display()));
            }
            Ok(ImageStatus::Canceled) => {
                outcome = RunOutcome::Canceled;
                break;
            }
            Err(err) => {
                attempted += 1;
                failed += 1;
                warn!("{}: {err}", path.display());
                run_log.line(format!("Slicing \"{}\" fail ({err})", path.display()));
            }
        }

        if !shared.is_active(token) {
            outcome = RunOutcome::Canceled;
            break;
        }
    }

    if outcome == RunOutcome::Canceled {
        run_log.line("Canceled...".to_string());
    }
    run_log.line(format!("Summary: images={attempted} errors={failed}"));
    info!("run {} ended {outcome:?}: {attempted} images, {failed} failed", token.id());

    RunResult {
        images_attempted: attempted,
        images_failed: failed,
        outcome,
        log: run_log.lines,
    }
}

fn slice_image(
    path: &Path,
    config: &SliceConfig,
    token: RunToken,
    shared: &Shared,
    observer: &dyn RunObserver,
) -> Result<ImageStatus> {
    if !shared.is_active(token) {
        return Ok(ImageStatus::Canceled);
    }

    let job = ImageJob::new(path, config);
    if config.per_image_subdir {
        std::fs::create_dir_all(&job.output_directory).map_err(|source| Error::CreateDir {
            path: job.output_directory.clone(),
            source,
        })?;
    }

    let im = RGBAIm::load(path).map_err(|source| Error::ImageDecode {
        path: path.to_path_buf(),
        source,
    })?;

    let plan = grid::plan(im.w as u32, im.h as u32, config)?;
    info!(
        "{}: {}x{} into {} slices ({} columns, {} rows)",
        path.display(),
        im.w,
        im.h,
        plan.len(),
        plan.columns,
        plan.rows
    );

    for rect in &plan {
        if !shared.is_active(token) {
            return Ok(ImageStatus::Canceled);
        }
        write_slice(&im, &rect, &job)?;
        observer.on_slice(path, &rect);
    }

    Ok(ImageStatus::Done)
}

fn write_slice(im: &RGBAIm, rect: &SliceRect, job: &ImageJob) -> Result<()> {
    if rect.roi.is_empty() {
        return Err(Error::EmptySlice { index: rect.index });
    }

    let path = job.slice_path(rect.index);
    debug!("slice {} {:?} -> {}", rect.index, rect.bounds(), path.display());

    im.crop(&rect.roi)
        .save_png(&path)
        .map_err(|source| Error::SliceWrite { path, source })
}
