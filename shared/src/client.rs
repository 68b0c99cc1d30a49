//! Load-Generator Client Adapter contract (C8): a thin interface that
//! performs one benchmark at a given RPS/duration and returns a result.
//! Implementations wrap whatever remote mechanism the load generator
//! exposes; the session driver only ever sees this trait.

use std::time::Duration;

use async_trait::async_trait;

use crate::BenchmarkArtifact;

/// Transport-level failure invoking the load generator (spec §4.8, §7).
/// Mirrors the gRPC status codes the source tree's Nighthawk Service client
/// surfaces (`absl::StatusCode`).
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum LoadGeneratorError {
    #[error("load generator unavailable: {0}")]
    Unavailable(String),
    #[error("internal load generator error: {0}")]
    Internal(String),
    #[error("load generator call exceeded its deadline: {0}")]
    DeadlineExceeded(String),
    #[error("unknown load generator error: {0}")]
    Unknown(String),
}

/// Performs one benchmark at a given RPS/duration and returns its artifact.
///
/// Required behavior (spec §4.8): override `duration` on `base_options`
/// before issuing the call; leave `requests_per_second` untouched (the
/// caller already set it). The call blocks until exactly one artifact is
/// returned or an error is raised — zero or more than one response is a hard
/// error for the implementation to enforce, not the caller.
#[async_trait]
pub trait LoadGeneratorClient: Send + Sync {
    async fn perform_benchmark(
        &self,
        base_options: &crate::BenchmarkOptions,
        duration: Duration,
    ) -> Result<BenchmarkArtifact, LoadGeneratorError>;
}
