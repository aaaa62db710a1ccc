use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{info, warn};

use crate::kubernetes::{Cluster, FetchError, ListPodsError};
use crate::report::Aggregator;
use crate::scanner::{extract_endpoints, scan_lines};
use crate::types::{ContainerKey, PodRef};

pub struct ScanOptions {
    pub namespace: Option<String>,
    pub since_seconds: i64,
    pub tail_lines: i64,
    pub timeout: Duration,
    pub concurrency: usize,
}

/// Scan every container of every visible pod and aggregate the findings.
///
/// Listing failures abort the run. Per-container fetch failures only skip
/// that container: log fetches are independent and read-only, so they run
/// with bounded concurrency and the aggregator is the single point where
/// results meet. The report output is deterministic regardless of fetch
/// completion order.
pub async fn run<C: Cluster>(cluster: &C, opts: &ScanOptions) -> Result<Aggregator, ListPodsError> {
    let pods = cluster.list_pods(opts.namespace.as_deref()).await?;

    let targets: Vec<(PodRef, String)> = pods
        .iter()
        .flat_map(|pod| {
            pod.containers
                .iter()
                .map(|container| (pod.clone(), container.clone()))
        })
        .collect();

    info!(
        "Scanning {} pods / {} containers (since={}s, tail={})",
        pods.len(),
        targets.len(),
        opts.since_seconds,
        opts.tail_lines
    );

    let results: Vec<Option<(ContainerKey, Vec<String>)>> = stream::iter(targets)
        .map(|(pod, container)| async move {
            let key = ContainerKey::new(&pod, &container);
            match cluster
                .fetch_logs(&pod, &container, opts.since_seconds, opts.tail_lines, opts.timeout)
                .await
            {
                Ok(text) => Some((key, scan_lines(&text))),
                Err(FetchError::Timeout(secs)) => {
                    warn!("Timeout after {}s reading logs from {}", secs, key);
                    None
                }
                Err(err) => {
                    warn!("Could not read logs from {}: {}", key, err);
                    None
                }
            }
        })
        .buffer_unordered(opts.concurrency.max(1))
        .collect()
        .await;

    let mut aggregator = Aggregator::new();
    for (key, hits) in results.into_iter().flatten() {
        let endpoints = extract_endpoints(&hits);
        aggregator.record(key, hits, endpoints);
    }
    Ok(aggregator)
}
