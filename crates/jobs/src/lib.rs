//! Batch hygiene and server-side redaction jobs.
//!
//! [`HygieneTriage`] cleans files locally before they leave the machine.
//! [`Orchestrator`] then uploads a selected batch, one file at a time, to a
//! [`RedactionEndpoint`] and collects the redacted artifacts.

mod endpoint;
mod error;
mod hygiene;
mod job;
mod orchestrator;

pub use endpoint::{filename_from_disposition, EndpointReply, HttpEndpoint, RedactionEndpoint};
pub use error::{HygieneError, JobError};
pub use hygiene::{CleanedFile, HygieneTriage};
pub use job::{CancelToken, JobStatus, RedactionJob};
pub use orchestrator::{BatchSummary, JobEvent, Orchestrator, PendingFile};
