//! gRPC implementation of the load-generator client adapter (C8). Speaks the
//! `LoadGeneratorService.ExecutionStream` RPC the same way the source tree's
//! `PerformNighthawkBenchmark` does: open a bidi stream, write exactly one
//! start request, and read exactly one response.

use std::time::Duration;

use async_trait::async_trait;
use shared::{BenchmarkArtifact, BenchmarkOptions, Counter, LoadGeneratorClient, LoadGeneratorError, ResultSection, Statistic};
use tonic::transport::Channel;
use tonic::Status;
use tracing::debug;

pub mod proto {
    tonic::include_proto!("loadgen");
}

use proto::execution_request::RequestType;
use proto::execution_response::Outcome;
use proto::load_generator_service_client::LoadGeneratorServiceClient;

/// Talks to a remote load generator over gRPC. Cheap to clone: `Channel`
/// itself is a cheap handle, and a fresh stub is built per call.
#[derive(Clone)]
pub struct GrpcLoadGeneratorClient {
    channel: Channel,
}

impl GrpcLoadGeneratorClient {
    /// Connects to `endpoint` (e.g. `http://127.0.0.1:50051`) once; every
    /// subsequent call reuses the same underlying connection.
    pub async fn connect(endpoint: impl Into<String>) -> Result<Self, LoadGeneratorError> {
        let endpoint = endpoint.into();
        let channel = Channel::from_shared(endpoint.clone())
            .map_err(|e| LoadGeneratorError::Internal(e.to_string()))?
            .connect()
            .await
            .map_err(|e| LoadGeneratorError::Unavailable(format!("{endpoint}: {e}")))?;
        Ok(Self { channel })
    }
}

#[async_trait]
impl LoadGeneratorClient for GrpcLoadGeneratorClient {
    async fn perform_benchmark(
        &self,
        base_options: &BenchmarkOptions,
        duration: Duration,
    ) -> Result<BenchmarkArtifact, LoadGeneratorError> {
        let mut client = LoadGeneratorServiceClient::new(self.channel.clone());

        let options = proto::BenchmarkOptions {
            requests_per_second: base_options.requests_per_second,
            duration_seconds: duration.as_secs() as u32,
            concurrency: base_options.concurrency,
        };
        let request = proto::ExecutionRequest {
            request_type: Some(RequestType::StartRequest(proto::StartRequest {
                options: Some(options),
            })),
        };
        debug!(rps = base_options.requests_per_second, ?duration, "opening execution stream");

        let outbound = tokio_stream::once(request);
        let response = client
            .execution_stream(outbound)
            .await
            .map_err(map_status)?;
        let mut inbound = response.into_inner();

        let mut artifact: Option<BenchmarkArtifact> = None;
        while let Some(message) = inbound.message().await.map_err(map_status)? {
            if artifact.is_some() {
                return Err(LoadGeneratorError::Unknown(
                    "load generator sent more than one response on the execution stream".to_string(),
                ));
            }
            artifact = Some(convert_response(message)?);
        }
        artifact.ok_or_else(|| {
            LoadGeneratorError::Unknown("load generator did not send a response".to_string())
        })
    }
}

fn map_status(status: Status) -> LoadGeneratorError {
    use tonic::Code;
    match status.code() {
        Code::Unavailable => LoadGeneratorError::Unavailable(status.message().to_string()),
        Code::DeadlineExceeded => LoadGeneratorError::DeadlineExceeded(status.message().to_string()),
        Code::Internal => LoadGeneratorError::Internal(status.message().to_string()),
        _ => LoadGeneratorError::Unknown(status.message().to_string()),
    }
}

fn convert_response(response: proto::ExecutionResponse) -> Result<BenchmarkArtifact, LoadGeneratorError> {
    match response.outcome {
        Some(Outcome::Artifact(artifact)) => Ok(convert_artifact(artifact)),
        Some(Outcome::ErrorDetail(detail)) => Err(LoadGeneratorError::Internal(detail)),
        None => Err(LoadGeneratorError::Unknown(
            "execution response carried neither an artifact nor an error".to_string(),
        )),
    }
}

fn convert_artifact(artifact: proto::BenchmarkArtifact) -> BenchmarkArtifact {
    BenchmarkArtifact {
        options: artifact
            .options
            .map(|o| BenchmarkOptions {
                requests_per_second: o.requests_per_second,
                duration_seconds: o.duration_seconds,
                concurrency: o.concurrency,
            })
            .unwrap_or_default(),
        results: artifact.results.into_iter().map(convert_result_section).collect(),
    }
}

fn convert_result_section(section: proto::ResultSection) -> ResultSection {
    ResultSection {
        name: section.name,
        execution_duration_seconds: section.execution_duration_seconds,
        counters: section
            .counters
            .into_iter()
            .map(|c| Counter {
                name: c.name,
                value: c.value,
            })
            .collect(),
        statistics: section
            .statistics
            .into_iter()
            .map(|s| Statistic {
                id: s.id,
                min_ns: s.min_ns,
                mean_ns: s.mean_ns,
                max_ns: s.max_ns,
                pstdev_ns: s.pstdev_ns,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_artifact_round_trip_through_the_wire_shape() {
        let wire = proto::BenchmarkArtifact {
            options: Some(proto::BenchmarkOptions {
                requests_per_second: 100,
                duration_seconds: 10,
                concurrency: 2,
            }),
            results: vec![proto::ResultSection {
                name: "global".to_string(),
                execution_duration_seconds: 10.0,
                counters: vec![proto::Counter {
                    name: "upstream_rq_total".to_string(),
                    value: 950,
                }],
                statistics: vec![proto::Statistic {
                    id: "benchmark_http_client.request_to_response".to_string(),
                    min_ns: 100.0,
                    mean_ns: 200.0,
                    max_ns: 300.0,
                    pstdev_ns: 10.0,
                }],
            }],
        };

        let artifact = convert_artifact(wire);
        assert_eq!(artifact.options.requests_per_second, 100);
        assert_eq!(artifact.results.len(), 1);
        assert_eq!(artifact.results[0].counters[0].value, 950);
    }

    #[test]
    fn error_detail_outcome_becomes_an_internal_error() {
        let response = proto::ExecutionResponse {
            outcome: Some(Outcome::ErrorDetail("load generator exploded".to_string())),
        };
        let err = convert_response(response).unwrap_err();
        assert!(matches!(err, LoadGeneratorError::Internal(_)));
    }

    #[test]
    fn empty_outcome_is_unknown_error() {
        let response = proto::ExecutionResponse { outcome: None };
        assert!(matches!(
            convert_response(response).unwrap_err(),
            LoadGeneratorError::Unknown(_)
        ));
    }
}
