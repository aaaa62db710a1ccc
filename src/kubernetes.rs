use k8s_openapi::api::core::v1::Pod;
use kube::api::{ListParams, LogParams};
use kube::{Api, Client, config};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::types::PodRef;

/// Why the pod enumeration could not produce a usable pod list. Any of these
/// is fatal to the run: the scan cannot proceed without pods.
#[derive(Debug, Error)]
pub enum ListPodsError {
    #[error("failed to list pods: {0}")]
    Api(#[from] kube::Error),
    #[error("pod returned by the API is missing metadata.{0}")]
    MissingField(&'static str),
}

/// Why logs for a single container could not be fetched. Never fatal: the
/// affected container is skipped and the scan moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out after {0}s")]
    Timeout(u64),
    #[error(transparent)]
    Api(#[from] kube::Error),
}

/// The scan pipeline's view of a cluster. Production uses [`KubeCluster`];
/// tests substitute an in-memory fake so no live cluster is needed.
pub trait Cluster {
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<PodRef>, ListPodsError>;

    async fn fetch_logs(
        &self,
        pod: &PodRef,
        container: &str,
        since_seconds: i64,
        tail_lines: i64,
        timeout: Duration,
    ) -> Result<String, FetchError>;
}

/// Cluster access through the Kubernetes API, using the same inferred
/// configuration kubectl would (kubeconfig or in-cluster service account).
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub async fn connect() -> anyhow::Result<Self> {
        let config = config::Config::infer().await?;
        info!("Connecting to cluster at {}", config.cluster_url);
        let client = Client::try_from(config)?;
        Ok(Self { client })
    }
}

fn pod_to_ref(pod: Pod) -> Result<PodRef, ListPodsError> {
    let name = pod
        .metadata
        .name
        .ok_or(ListPodsError::MissingField("name"))?;
    let namespace = pod
        .metadata
        .namespace
        .ok_or(ListPodsError::MissingField("namespace"))?;
    // A pod with no spec (or no containers) simply yields nothing to fetch.
    let containers = pod
        .spec
        .map(|spec| spec.containers.into_iter().map(|c| c.name).collect())
        .unwrap_or_default();
    Ok(PodRef {
        name,
        namespace,
        containers,
    })
}

impl Cluster for KubeCluster {
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<PodRef>, ListPodsError> {
        let api: Api<Pod> = match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        };
        let pods = api.list(&ListParams::default()).await?;
        pods.items.into_iter().map(pod_to_ref).collect()
    }

    async fn fetch_logs(
        &self,
        pod: &PodRef,
        container: &str,
        since_seconds: i64,
        tail_lines: i64,
        timeout: Duration,
    ) -> Result<String, FetchError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), &pod.namespace);
        let params = LogParams {
            container: Some(container.to_string()),
            since_seconds: Some(since_seconds),
            tail_lines: Some(tail_lines),
            ..Default::default()
        };
        debug!(
            "Fetching logs for {}/{}/{}",
            pod.namespace, pod.name, container
        );
        match tokio::time::timeout(timeout, api.logs(&pod.name, &params)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(FetchError::Timeout(timeout.as_secs())),
        }
    }
}
