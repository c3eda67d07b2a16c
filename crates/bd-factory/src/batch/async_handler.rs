use super::core::BatchRunner;
use super::types::{BatchEvent, Job};
use crate::error::BatchError;
use std::sync::mpsc::Sender;

/// Starts the batch and forwards every event into `sender`, so a UI thread can
/// drain them without ever blocking on the runner.
pub fn run_async(
    runner: &mut BatchRunner,
    jobs: Vec<Job>,
    concurrency_limit: usize,
    sender: Sender<BatchEvent>,
) -> Result<(), BatchError> {
    runner.start(jobs, concurrency_limit, move |event| {
        // The receiver goes away when the window closes; the runner's Drop handles the rest.
        let _ = sender.send(event);
    })
}
