use crate::{panels, rows::StatusTable, theme};
use bd_core::{format_hms, PreferenceStore};
use bd_factory::batch::{run_async, BatchEvent, BatchRunner, Job, RunnerOptions};
use bd_factory::denoiser::{check_dependencies, parse_strength, FfmpegToolchain};
use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;
use tracing::{info, warn};

pub struct DenoiseApp {
    pub table: StatusTable,
    pub strength_text: String,
    pub concurrency: usize,

    pub runner: BatchRunner,
    pub events: Receiver<BatchEvent>,
    pub is_busy: bool,
    pub notice: String,
    pub notice_is_error: bool,

    pub prefs: Option<PreferenceStore>,
}

impl Default for DenoiseApp {
    fn default() -> Self {
        let toolchain = FfmpegToolchain::default();

        let (notice, notice_is_error) = match check_dependencies(&toolchain.paths) {
            Ok(()) => ("Ready.".to_string(), false),
            Err(e) => (format!("{:#}", e), true),
        };

        let prefs = PreferenceStore::open_default()
            .map_err(|e| warn!(error = %e, "Preferences unavailable"))
            .ok();

        // Placeholder until the first batch swaps in its own channel.
        let (_tx, rx) = channel();

        Self {
            table: StatusTable::default(),
            strength_text: String::new(),
            concurrency: 1,

            runner: BatchRunner::new(toolchain, RunnerOptions::default()),
            events: rx,
            is_busy: false,
            notice,
            notice_is_error,

            prefs,
        }
    }
}

impl eframe::App for DenoiseApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        let is_dark = !matches!(frame.info().system_theme, Some(eframe::Theme::Light));
        theme::apply_settings(ctx, is_dark);

        self.handle_events();

        // Top -> Bottom -> Central (fill)
        panels::title_bar::show(self, ctx);
        panels::controls::show(self, ctx);
        panels::table::show(self, ctx);

        if self.is_busy {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl DenoiseApp {
    fn handle_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.table.apply(&event);

            if let BatchEvent::BatchDone(summary) = event {
                self.is_busy = false;
                self.notice_is_error = !summary.all_succeeded();
                self.notice = if summary.cancelled {
                    format!(
                        "Stopped: {} completed, {} failed, {} not started.",
                        summary.completed, summary.failed, summary.skipped
                    )
                } else {
                    format!(
                        "Done in {}: {} completed, {} failed.",
                        format_hms(summary.elapsed),
                        summary.completed,
                        summary.failed
                    )
                };
            }
        }
    }

    pub fn browse(&mut self) {
        let mut dialog = rfd::FileDialog::new()
            .set_title("Select Videos")
            .add_filter("Video", &bd_core::media::VIDEO_EXTENSIONS);
        if let Some(dir) = self.prefs.as_ref().and_then(|p| p.last_input_dir()) {
            dialog = dialog.set_directory(dir);
        }

        let Some(files) = dialog.pick_files() else {
            return;
        };
        if let (Some(prefs), Some(dir)) = (
            self.prefs.as_mut(),
            files.first().and_then(|f| f.parent()).map(PathBuf::from),
        ) {
            if let Err(e) = prefs.set_last_input_dir(&dir) {
                warn!(error = %e, "Could not store input folder");
            }
        }

        let added = self.table.add_files(files);
        self.set_notice(format!("Added {} file(s).", added), false);
    }

    pub fn start_batch(&mut self) {
        if self.is_busy || self.table.is_empty() {
            return;
        }

        let strength = match parse_strength(&self.strength_text) {
            Ok(s) => s,
            Err(e) => {
                self.set_notice(format!("{:#}", e), true);
                return;
            }
        };

        let jobs: Vec<Job> = self
            .table
            .prepare_batch()
            .into_iter()
            .map(|file| Job::for_input(file, None, strength))
            .collect();
        let total = jobs.len();

        let (tx, rx) = channel();
        match run_async(&mut self.runner, jobs, self.concurrency, tx) {
            Ok(()) => {
                info!(total, concurrency = self.concurrency, strength, "Batch started");
                self.events = rx;
                self.is_busy = true;
                self.set_notice(format!("Denoising {} file(s)...", total), false);
            }
            Err(e) => self.set_notice(e.to_string(), true),
        }
    }

    /// Non-blocking; the table fills in as workers wind down.
    pub fn stop_batch(&mut self) {
        if let Some(handle) = self.runner.canceller() {
            handle.cancel();
            self.set_notice("Stopping...".to_string(), false);
        }
    }

    fn set_notice(&mut self, text: String, is_error: bool) {
        self.notice = text;
        self.notice_is_error = is_error;
    }
}
