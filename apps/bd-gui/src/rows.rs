use bd_core::{display_name, format_optional_hms, JobId, JobStatus};
use bd_factory::batch::{BatchEvent, JobOutcome};
use std::path::PathBuf;
use std::time::Duration;

/// One line of the status table.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRow {
    pub file: PathBuf,
    /// Set once the row is part of a started batch.
    pub job: Option<JobId>,
    pub status: JobStatus,
    pub percent: u8,
    pub elapsed: Option<Duration>,
    pub remaining: Option<Duration>,
    pub error: Option<String>,
}

impl JobRow {
    pub fn new(file: PathBuf) -> Self {
        Self {
            file,
            job: None,
            status: JobStatus::Pending,
            percent: 0,
            elapsed: None,
            remaining: None,
            error: None,
        }
    }

    pub fn name(&self) -> String {
        display_name(&self.file)
    }

    pub fn elapsed_text(&self) -> String {
        format_optional_hms(self.elapsed)
    }

    pub fn remaining_text(&self) -> String {
        format_optional_hms(self.remaining)
    }

    pub fn status_text(&self) -> String {
        match self.status {
            JobStatus::Processing => format!("Processing ({}%)", self.percent),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct StatusTable {
    rows: Vec<JobRow>,
    selected: Option<usize>,
}

impl StatusTable {
    pub fn rows(&self) -> &[JobRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn select(&mut self, index: usize) {
        if index < self.rows.len() {
            self.selected = Some(index);
        }
    }

    /// Appends picked files, skipping ones already listed.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = PathBuf>) -> usize {
        let mut added = 0;
        for file in files {
            if self.rows.iter().all(|r| r.file != file) {
                self.rows.push(JobRow::new(file));
                added += 1;
            }
        }
        added
    }

    /// Resets every row to Pending and binds row `i` to `JobId(i)`.
    pub fn prepare_batch(&mut self) -> Vec<PathBuf> {
        self.rows
            .iter_mut()
            .enumerate()
            .map(|(i, row)| {
                let file = std::mem::take(&mut row.file);
                *row = JobRow::new(file);
                row.job = Some(JobId(i));
                row.file.clone()
            })
            .collect()
    }

    pub fn apply(&mut self, event: &BatchEvent) {
        match event {
            BatchEvent::JobStarted { id, .. } => {
                if let Some(row) = self.row_for(*id) {
                    row.status = JobStatus::Processing;
                    row.elapsed = Some(Duration::ZERO);
                }
            }
            BatchEvent::Progress(p) => {
                if let Some(row) = self.row_for(p.id) {
                    row.percent = p.percent;
                    row.elapsed = Some(p.elapsed);
                    row.remaining = p.remaining;
                }
            }
            BatchEvent::JobDone { id, outcome } => {
                if let Some(row) = self.row_for(*id) {
                    row.status = outcome.status();
                    match outcome {
                        JobOutcome::Completed { elapsed, .. } => {
                            row.percent = 100;
                            row.elapsed = Some(*elapsed);
                            row.remaining = Some(Duration::ZERO);
                        }
                        JobOutcome::Failed(e) => {
                            row.remaining = None;
                            row.error = Some(e.to_string());
                        }
                    }
                }
            }
            BatchEvent::BatchDone(_) => {}
        }
    }

    pub fn clear_selected(&mut self) {
        if let Some(i) = self.selected.take() {
            if i < self.rows.len() {
                self.rows.remove(i);
            }
        }
    }

    pub fn clear_all(&mut self) {
        self.rows.clear();
        self.selected = None;
    }

    // Rows removed mid-batch simply stop receiving updates.
    fn row_for(&mut self, id: JobId) -> Option<&mut JobRow> {
        self.rows.iter_mut().find(|r| r.job == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bd_factory::batch::ProgressUpdate;
    use bd_factory::JobError;

    fn table(names: &[&str]) -> StatusTable {
        let mut t = StatusTable::default();
        t.add_files(names.iter().map(PathBuf::from));
        t
    }

    #[test]
    fn duplicates_are_not_added_twice() {
        let mut t = table(&["/v/a.mp4", "/v/b.mp4"]);
        assert_eq!(t.add_files([PathBuf::from("/v/a.mp4"), PathBuf::from("/v/c.mp4")]), 1);
        assert_eq!(t.rows().len(), 3);
    }

    #[test]
    fn events_drive_row_state() {
        let mut t = table(&["/v/a.mp4", "/v/b.mp4"]);
        let files = t.prepare_batch();
        assert_eq!(files.len(), 2);

        t.apply(&BatchEvent::JobStarted {
            id: JobId(0),
            input: files[0].clone(),
        });
        t.apply(&BatchEvent::Progress(ProgressUpdate {
            id: JobId(0),
            percent: 25,
            elapsed: Duration::from_secs(10),
            remaining: Some(Duration::from_secs(30)),
        }));
        let row = &t.rows()[0];
        assert_eq!(row.status_text(), "Processing (25%)");
        assert_eq!(row.elapsed_text(), "00:00:10");
        assert_eq!(row.remaining_text(), "00:00:30");

        t.apply(&BatchEvent::JobDone {
            id: JobId(1),
            outcome: JobOutcome::Failed(JobError::Cancelled),
        });
        assert_eq!(t.rows()[1].status, JobStatus::Failed);
        assert_eq!(t.rows()[1].remaining_text(), "--:--:--");
        assert_eq!(t.rows()[1].error.as_deref(), Some("Cancelled"));
    }

    #[test]
    fn cleared_rows_ignore_late_events() {
        let mut t = table(&["/v/a.mp4", "/v/b.mp4"]);
        t.prepare_batch();
        t.select(0);
        t.clear_selected();
        assert_eq!(t.rows().len(), 1);
        assert_eq!(t.selected(), None);

        t.apply(&BatchEvent::JobStarted {
            id: JobId(0),
            input: PathBuf::from("/v/a.mp4"),
        });
        assert_eq!(t.rows()[0].status, JobStatus::Pending);

        t.clear_all();
        assert!(t.is_empty());
    }
}
