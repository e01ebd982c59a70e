//! Retry and backoff policy for the SDK download.
//!
//! Classifies per-attempt failures (transport, TLS, HTTP status, local
//! storage) and decides whether another attempt is allowed, so the
//! downloader only has to supply a single-attempt closure.

mod classify;
mod error;
mod policy;
mod run;

pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, RetryFailure};
