pub mod batch;
pub mod denoiser;
pub mod error;

pub use error::{BatchError, JobError};
