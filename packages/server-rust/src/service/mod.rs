//! The request-processing core.
//!
//! 1. **Issuance** (`issuer`): strictly increasing job handles
//! 2. **Processing** (`processor`): delayed digest jobs on tokio tasks
//! 3. **Latency** (`durations`): per-accept samples and their aggregate
//! 4. **Facade** (`hash_service`): the calls the transport makes

pub mod config;
pub mod durations;
pub mod hash_service;
pub mod issuer;
pub mod processor;

pub use config::ServiceConfig;
pub use durations::{AcceptTimer, DurationRecorder, DurationSample, Outcome};
pub use hash_service::{FetchError, HashService, SubmitError};
pub use issuer::HandleIssuer;
pub use processor::{CompletionSink, TracingCompletionSink, WorkProcessor};
