//! Fixture builders for tests, ported from the source tree's
//! `MakeSimpleNighthawkOutput` (`test/adaptive_load/minimal_output.cc`): build
//! a synthetic `BenchmarkArtifact` without a real load generator.

use crate::{BenchmarkArtifact, BenchmarkOptions, Counter, ResultSection, Statistic};

/// Parameters for a single-worker synthetic benchmark artifact.
#[derive(Debug, Clone, Copy)]
pub struct SimpleArtifactSpec {
    pub requests_per_second: u32,
    pub actual_duration_seconds: f64,
    pub upstream_rq_total: u64,
    pub response_count_2xx: u64,
    pub min_ns: f64,
    pub mean_ns: f64,
    pub max_ns: f64,
    pub pstdev_ns: f64,
}

impl Default for SimpleArtifactSpec {
    fn default() -> Self {
        Self {
            requests_per_second: 100,
            actual_duration_seconds: 10.0,
            upstream_rq_total: 950,
            response_count_2xx: 940,
            min_ns: 500_000.0,
            mean_ns: 1_500_000.0,
            max_ns: 9_000_000.0,
            pstdev_ns: 200_000.0,
        }
    }
}

/// Builds a single-worker `BenchmarkArtifact` with one `"global"` result,
/// mirroring the source tree's fixture helper of the same shape.
pub fn benchmark_artifact_fixture(spec: SimpleArtifactSpec) -> BenchmarkArtifact {
    BenchmarkArtifact {
        options: BenchmarkOptions {
            requests_per_second: spec.requests_per_second,
            duration_seconds: spec.actual_duration_seconds as u32,
            concurrency: 1,
        },
        results: vec![ResultSection {
            name: "global".to_string(),
            execution_duration_seconds: spec.actual_duration_seconds,
            counters: vec![
                Counter {
                    name: "upstream_rq_total".to_string(),
                    value: spec.upstream_rq_total,
                },
                Counter {
                    name: "benchmark.http_2xx".to_string(),
                    value: spec.response_count_2xx,
                },
            ],
            statistics: vec![Statistic {
                id: "benchmark_http_client.request_to_response".to_string(),
                min_ns: spec.min_ns,
                mean_ns: spec.mean_ns,
                max_ns: spec.max_ns,
                pstdev_ns: spec.pstdev_ns,
            }],
        }],
    }
}
