use super::types::*;
use super::utils::{for_each_record, validate_input, DiagnosticTail};
use crate::denoiser::{
    estimate_remaining, extract_time_field, progress_percent, DenoiseJob, Toolchain, Worker,
};
use crate::error::{BatchError, JobError};
use bd_core::{JobId, JobStatus};
use crossbeam_channel::{never, select, unbounded, Receiver, Sender};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Instant,
};
use tracing::{debug, info, warn};

type Callback = Box<dyn Fn(BatchEvent) + Send>;

enum Control {
    Cancel,
}

/// Messages from job threads to the coordinator.
enum WorkerMsg {
    Launched { id: JobId, worker: Arc<dyn Worker> },
    Progress(ProgressUpdate),
    Finished { id: JobId, outcome: JobOutcome },
}

/// Runs batches of denoise jobs with at most `concurrency_limit` in flight.
///
/// `start` hands the job list to a coordinator thread that owns all batch
/// state; the caller only sees the events passed to its callback. A runner
/// whose batch has finished can be started again.
pub struct BatchRunner {
    toolchain: Arc<dyn Toolchain>,
    options: RunnerOptions,
    active: Option<ActiveBatch>,
}

struct ActiveBatch {
    control: Sender<Control>,
    coordinator: JoinHandle<BatchSummary>,
}

/// Cloneable, non-blocking way to cancel the running batch from another thread.
#[derive(Clone)]
pub struct CancelHandle {
    control: Sender<Control>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.control.send(Control::Cancel);
    }
}

impl BatchRunner {
    pub fn new<T: Toolchain>(toolchain: T, options: RunnerOptions) -> Self {
        Self::with_shared(Arc::new(toolchain), options)
    }

    pub fn with_shared(toolchain: Arc<dyn Toolchain>, options: RunnerOptions) -> Self {
        Self {
            toolchain,
            options,
            active: None,
        }
    }

    /// `true` while any job of the current batch is pending or processing.
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .map_or(false, |a| !a.coordinator.is_finished())
    }

    pub fn start<F>(
        &mut self,
        jobs: Vec<Job>,
        concurrency_limit: usize,
        callback: F,
    ) -> Result<(), BatchError>
    where
        F: Fn(BatchEvent) + Send + 'static,
    {
        if self.is_running() {
            return Err(BatchError::AlreadyRunning);
        }
        if jobs.is_empty() {
            return Err(BatchError::EmptyBatch);
        }
        if concurrency_limit == 0 {
            return Err(BatchError::InvalidConcurrency);
        }
        // Reap the previous, already finished batch.
        self.wait();

        info!(
            total_jobs = jobs.len(),
            concurrency_limit, "Starting batch"
        );

        let (control_tx, control_rx) = unbounded();
        let state = RunnerState::new(jobs, concurrency_limit);
        let toolchain = self.toolchain.clone();
        let options = self.options.clone();
        let callback: Callback = Box::new(callback);

        let coordinator = thread::Builder::new()
            .name("bd-coordinator".into())
            .spawn(move || state.run(toolchain, options, control_rx, callback))?;

        self.active = Some(ActiveBatch {
            control: control_tx,
            coordinator,
        });
        Ok(())
    }

    pub fn canceller(&self) -> Option<CancelHandle> {
        self.active.as_ref().map(|a| CancelHandle {
            control: a.control.clone(),
        })
    }

    /// Blocks until the current batch is done. `None` if no batch was started.
    pub fn wait(&mut self) -> Option<BatchSummary> {
        let active = self.active.take()?;
        match active.coordinator.join() {
            Ok(summary) => Some(summary),
            Err(_) => {
                warn!("Batch coordinator panicked");
                None
            }
        }
    }

    /// Terminates every active worker, waits for them to exit and returns the summary.
    pub fn cancel(&mut self) -> Option<BatchSummary> {
        if let Some(active) = &self.active {
            let _ = active.control.send(Control::Cancel);
        }
        self.wait()
    }
}

impl Drop for BatchRunner {
    fn drop(&mut self) {
        if self.is_running() {
            self.cancel();
        }
    }
}

struct Slot {
    thread: JoinHandle<()>,
    worker: Option<Arc<dyn Worker>>,
}

/// Owned by the coordinator thread only.
struct RunnerState {
    jobs: Vec<Job>,
    cursor: usize,
    limit: usize,
    active: HashMap<JobId, Slot>,
    started: Instant,
    cancelled: Arc<AtomicBool>,
    kill_deadline: Option<Instant>,
}

impl RunnerState {
    fn new(jobs: Vec<Job>, limit: usize) -> Self {
        Self {
            jobs,
            cursor: 0,
            limit,
            active: HashMap::new(),
            started: Instant::now(),
            cancelled: Arc::new(AtomicBool::new(false)),
            kill_deadline: None,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn is_idle(&self) -> bool {
        self.active.is_empty() && (self.cursor >= self.jobs.len() || self.is_cancelled())
    }

    fn run(
        mut self,
        toolchain: Arc<dyn Toolchain>,
        options: RunnerOptions,
        control_rx: Receiver<Control>,
        callback: Callback,
    ) -> BatchSummary {
        let (tx, rx) = unbounded::<WorkerMsg>();
        let mut control_rx = control_rx;
        let mut control_closed = false;

        self.reject_invalid(&callback);
        self.fill(&toolchain, &options, &tx, &callback);

        while !self.is_idle() {
            let deadline = self
                .kill_deadline
                .map(crossbeam_channel::at)
                .unwrap_or_else(never);

            select! {
                recv(rx) -> msg => {
                    // We hold a sender ourselves, so this never disconnects.
                    if let Ok(msg) = msg {
                        self.handle(msg, &callback);
                    }
                }
                recv(control_rx) -> msg => match msg {
                    Ok(Control::Cancel) => self.begin_cancel(&options),
                    Err(_) => control_closed = true,
                },
                recv(deadline) -> _ => self.kill_all(),
            }

            // Runner handle is gone; keep going until the batch drains.
            if control_closed {
                control_rx = never();
                control_closed = false;
            }

            if !self.is_cancelled() {
                self.fill(&toolchain, &options, &tx, &callback);
            }
        }

        let summary = self.summary();
        info!(
            completed = summary.completed,
            failed = summary.failed,
            skipped = summary.skipped,
            cancelled = summary.cancelled,
            "Batch finished"
        );
        callback(BatchEvent::BatchDone(summary.clone()));
        summary
    }

    /// Fails every unreadable input up front so it never waits behind running jobs.
    fn reject_invalid(&mut self, callback: &Callback) {
        for (index, job) in self.jobs.iter_mut().enumerate() {
            if let Err(e) = validate_input(&job.input_path) {
                let id = JobId(index);
                warn!(job = %id, error = %e, "Rejecting job");
                job.status = JobStatus::Failed;
                callback(BatchEvent::JobDone {
                    id,
                    outcome: JobOutcome::Failed(e),
                });
            }
        }
    }

    /// Claims pending jobs until the in-flight set is back at the cap.
    fn fill(
        &mut self,
        toolchain: &Arc<dyn Toolchain>,
        options: &RunnerOptions,
        tx: &Sender<WorkerMsg>,
        callback: &Callback,
    ) {
        while self.active.len() < self.limit && self.cursor < self.jobs.len() {
            let id = JobId(self.cursor);
            self.cursor += 1;

            let job = &mut self.jobs[id.index()];
            if job.status != JobStatus::Pending {
                continue;
            }

            let started = Instant::now();
            job.status = JobStatus::Processing;
            job.started_at = Some(started);
            callback(BatchEvent::JobStarted {
                id,
                input: job.input_path.clone(),
            });

            let ctx = JobContext {
                id,
                job: job.to_denoise_job(),
                started,
                toolchain: toolchain.clone(),
                options: options.clone(),
                tx: tx.clone(),
                cancelled: self.cancelled.clone(),
            };

            match thread::Builder::new()
                .name(format!("bd-job-{}", id.index()))
                .spawn(move || ctx.run())
            {
                Ok(thread) => {
                    self.active.insert(id, Slot { thread, worker: None });
                }
                Err(e) => {
                    let outcome = JobOutcome::Failed(JobError::LaunchError {
                        program: "job thread".into(),
                        reason: e.to_string(),
                    });
                    self.finish(id, outcome, callback);
                }
            }
        }
    }

    fn handle(&mut self, msg: WorkerMsg, callback: &Callback) {
        match msg {
            WorkerMsg::Launched { id, worker } => {
                if self.is_cancelled() {
                    let _ = worker.terminate();
                    // Launched after the grace period already ran out.
                    if self.kill_deadline.is_none() {
                        let _ = worker.kill();
                    }
                }
                if let Some(slot) = self.active.get_mut(&id) {
                    slot.worker = Some(worker);
                }
            }
            WorkerMsg::Progress(update) => {
                let job = &mut self.jobs[update.id.index()];
                // Keep each job's percent sequence monotonic.
                if job.status != JobStatus::Processing || update.percent < job.progress {
                    return;
                }
                job.progress = update.percent;
                callback(BatchEvent::Progress(update));
            }
            WorkerMsg::Finished { id, outcome } => {
                if let Some(slot) = self.active.remove(&id) {
                    let _ = slot.thread.join();
                }
                self.finish(id, outcome, callback);
            }
        }
    }

    fn finish(&mut self, id: JobId, outcome: JobOutcome, callback: &Callback) {
        let job = &mut self.jobs[id.index()];
        job.status = outcome.status();
        match &outcome {
            JobOutcome::Completed { elapsed, .. } => {
                job.progress = 100;
                info!(job = %id, elapsed = ?elapsed, "Job completed");
            }
            JobOutcome::Failed(e) => warn!(job = %id, error = %e, "Job failed"),
        }
        callback(BatchEvent::JobDone { id, outcome });
    }

    fn begin_cancel(&mut self, options: &RunnerOptions) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        info!(active = self.active.len(), "Cancelling batch");
        for (id, slot) in &self.active {
            if let Some(worker) = &slot.worker {
                if let Err(e) = worker.terminate() {
                    warn!(job = %id, error = %e, "Failed to signal worker");
                }
            }
        }
        self.kill_deadline = Some(Instant::now() + options.grace_period);
    }

    fn kill_all(&mut self) {
        self.kill_deadline = None;
        for (id, slot) in &self.active {
            if let Some(worker) = &slot.worker {
                warn!(job = %id, "Grace period over, killing worker");
                if let Err(e) = worker.kill() {
                    warn!(job = %id, error = %e, "Failed to kill worker");
                }
            }
        }
    }

    fn summary(&self) -> BatchSummary {
        let count = |s: JobStatus| self.jobs.iter().filter(|j| j.status == s).count();
        BatchSummary {
            total: self.jobs.len(),
            completed: count(JobStatus::Completed),
            failed: count(JobStatus::Failed),
            skipped: count(JobStatus::Pending),
            cancelled: self.is_cancelled(),
            elapsed: self.started.elapsed(),
        }
    }
}

/// Everything one job thread needs: probe, launch, drain diagnostics, report exit.
struct JobContext {
    id: JobId,
    job: DenoiseJob,
    started: Instant,
    toolchain: Arc<dyn Toolchain>,
    options: RunnerOptions,
    tx: Sender<WorkerMsg>,
    cancelled: Arc<AtomicBool>,
}

impl JobContext {
    fn run(self) {
        let outcome = self.execute();
        let _ = self.tx.send(WorkerMsg::Finished {
            id: self.id,
            outcome,
        });
    }

    fn execute(&self) -> JobOutcome {
        // 1. Probe
        let total_duration = match self.toolchain.probe_duration(&self.job.input_path) {
            Ok(d) => d,
            Err(e) => return JobOutcome::Failed(e),
        };
        debug!(job = %self.id, total_duration, "Probed duration");

        if self.cancelled.load(Ordering::SeqCst) {
            return JobOutcome::Failed(JobError::Cancelled);
        }

        // 2. Launch
        let worker = match self.toolchain.launch(&self.job) {
            Ok(w) => w,
            Err(e) => return JobOutcome::Failed(e),
        };
        let _ = self.tx.send(WorkerMsg::Launched {
            id: self.id,
            worker: worker.clone(),
        });

        // 3. Drain diagnostics
        let mut tail = DiagnosticTail::new(self.options.tail_lines);
        if let Some(stream) = worker.take_diagnostics() {
            let result = for_each_record(stream, |record| {
                tail.push(record);
                if let Some(media_seconds) = extract_time_field(record) {
                    let percent = progress_percent(media_seconds, total_duration);
                    let elapsed = self.started.elapsed();
                    let _ = self.tx.send(WorkerMsg::Progress(ProgressUpdate {
                        id: self.id,
                        percent,
                        elapsed,
                        remaining: estimate_remaining(elapsed, percent),
                    }));
                }
            });
            if let Err(e) = result {
                warn!(job = %self.id, error = %e, "Diagnostic stream read failed");
            }
        }

        // 4. Exit status
        let exit = loop {
            match worker.try_wait() {
                Ok(Some(exit)) => break Some(exit),
                Ok(None) => thread::sleep(self.options.poll_interval),
                Err(e) => {
                    warn!(job = %self.id, error = %e, "Failed to query worker exit");
                    break None;
                }
            }
        };

        match exit {
            Some(exit) if exit.success() => JobOutcome::Completed {
                output: self.job.output_path.clone(),
                elapsed: self.started.elapsed(),
            },
            _ if self.cancelled.load(Ordering::SeqCst) => JobOutcome::Failed(JobError::Cancelled),
            exit => JobOutcome::Failed(JobError::WorkerFailure {
                code: exit.and_then(|e| e.code),
                tail: tail.into_lines(),
            }),
        }
    }
}
