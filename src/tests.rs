#[cfg(test)]
mod tests {
    use crate::audit::{self, ScanOptions};
    use crate::cli::Cli;
    use crate::kubernetes::{Cluster, FetchError, ListPodsError};
    use crate::types::PodRef;
    use crate::utils;
    use clap::Parser;
    use std::collections::{HashMap, HashSet};
    use std::time::Duration;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["kubectl-connaudit"]).unwrap();
        assert!(cli.namespace.is_none());
        assert_eq!(cli.since, "1h");
        assert_eq!(cli.tail, 500);
        assert_eq!(cli.timeout, 30);
        assert_eq!(cli.concurrency, 4);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parsing_namespace() {
        let cli = Cli::try_parse_from(["kubectl-connaudit", "-n", "monitoring"]).unwrap();
        assert_eq!(cli.namespace, Some("monitoring".to_string()));
    }

    #[test]
    fn test_cli_parsing_since_and_tail() {
        let cli =
            Cli::try_parse_from(["kubectl-connaudit", "--since", "30m", "--tail", "50"]).unwrap();
        assert_eq!(cli.since, "30m");
        assert_eq!(cli.tail, 50);
    }

    #[test]
    fn test_cli_parsing_verbose() {
        let cli = Cli::try_parse_from(["kubectl-connaudit", "-v"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_parse_since_units() {
        assert_eq!(utils::parse_since("90s").unwrap(), 90);
        assert_eq!(utils::parse_since("30m").unwrap(), 1800);
        assert_eq!(utils::parse_since("1h").unwrap(), 3600);
        assert_eq!(utils::parse_since("2d").unwrap(), 172800);
        assert_eq!(utils::parse_since("45").unwrap(), 45);
    }

    #[test]
    fn test_parse_since_rejects_garbage() {
        assert!(utils::parse_since("").is_err());
        assert!(utils::parse_since("1w").is_err());
        assert!(utils::parse_since("h").is_err());
        assert!(utils::parse_since("-5m").is_err());
        assert!(utils::parse_since("0h").is_err());
    }

    /// In-memory cluster for driving the pipeline without a live API server.
    #[derive(Default)]
    struct FakeCluster {
        pods: Vec<PodRef>,
        fail_listing: bool,
        logs: HashMap<String, String>,
        timeouts: HashSet<String>,
    }

    impl FakeCluster {
        fn with_pod(mut self, namespace: &str, name: &str, containers: &[&str]) -> Self {
            self.pods.push(PodRef {
                name: name.to_string(),
                namespace: namespace.to_string(),
                containers: containers.iter().map(|c| c.to_string()).collect(),
            });
            self
        }

        fn with_logs(mut self, key: &str, text: &str) -> Self {
            self.logs.insert(key.to_string(), text.to_string());
            self
        }

        fn with_timeout(mut self, key: &str) -> Self {
            self.timeouts.insert(key.to_string());
            self
        }
    }

    impl Cluster for FakeCluster {
        async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<PodRef>, ListPodsError> {
            if self.fail_listing {
                return Err(ListPodsError::MissingField("name"));
            }
            Ok(self
                .pods
                .iter()
                .filter(|pod| namespace.is_none_or(|ns| pod.namespace == ns))
                .cloned()
                .collect())
        }

        async fn fetch_logs(
            &self,
            pod: &PodRef,
            container: &str,
            _since_seconds: i64,
            _tail_lines: i64,
            timeout: Duration,
        ) -> Result<String, FetchError> {
            let key = format!("{}/{}/{}", pod.namespace, pod.name, container);
            if self.timeouts.contains(&key) {
                return Err(FetchError::Timeout(timeout.as_secs()));
            }
            Ok(self.logs.get(&key).cloned().unwrap_or_default())
        }
    }

    fn options(namespace: Option<&str>, concurrency: usize) -> ScanOptions {
        ScanOptions {
            namespace: namespace.map(String::from),
            since_seconds: 3600,
            tail_lines: 500,
            timeout: Duration::from_secs(30),
            concurrency,
        }
    }

    #[tokio::test]
    async fn test_scan_with_no_hits_reports_nothing_found() {
        let cluster = FakeCluster::default()
            .with_pod("default", "web", &["app"])
            .with_logs("default/web/app", "GET / 200\nGET /healthz 200\n");

        let report = audit::run(&cluster, &options(None, 1)).await.unwrap();
        assert_eq!(report.to_string(), "No connectivity errors found.\n");
    }

    #[tokio::test]
    async fn test_scan_aggregates_across_pods() {
        let cluster = FakeCluster::default()
            .with_pod("default", "web-1", &["app"])
            .with_pod("default", "web-2", &["app"])
            .with_logs(
                "default/web-1/app",
                "dial tcp 10.0.0.5:443: i/o timeout\ndial tcp 10.0.0.5:443: i/o timeout\n",
            )
            .with_logs("default/web-2/app", "dial tcp 10.0.0.5:443: connection refused\n");

        let report = audit::run(&cluster, &options(None, 1)).await.unwrap();
        let rendered = report.to_string();
        assert!(rendered.contains("FAILING ENDPOINTS (aggregated)"));
        assert!(rendered.contains(&format!("  {:<45} {:>5} hits", "10.0.0.5:443", 3)));
        assert!(rendered.contains("AFFECTED PODS (2 containers)"));
        assert!(rendered.contains("  default/web-1/app:"));
        assert!(rendered.contains("  default/web-2/app:"));
    }

    #[tokio::test]
    async fn test_timed_out_container_is_skipped_not_fatal() {
        let cluster = FakeCluster::default()
            .with_pod("default", "web", &["app", "sidecar"])
            .with_timeout("default/web/app")
            .with_logs("default/web/sidecar", "failed to connect to svc.internal:8080\n");

        let report = audit::run(&cluster, &options(None, 1)).await.unwrap();
        let rendered = report.to_string();
        assert!(rendered.contains("  default/web/sidecar:"));
        assert!(!rendered.contains("default/web/app:"));
    }

    #[tokio::test]
    async fn test_listing_failure_aborts_the_scan() {
        let cluster = FakeCluster {
            fail_listing: true,
            ..Default::default()
        };
        assert!(audit::run(&cluster, &options(None, 1)).await.is_err());
    }

    #[tokio::test]
    async fn test_namespace_filter_limits_the_scan() {
        let cluster = FakeCluster::default()
            .with_pod("monitoring", "prom", &["server"])
            .with_pod("default", "web", &["app"])
            .with_logs("monitoring/prom/server", "connection refused\n")
            .with_logs("default/web/app", "connection refused\n");

        let report = audit::run(&cluster, &options(Some("default"), 1))
            .await
            .unwrap();
        let rendered = report.to_string();
        assert!(rendered.contains("  default/web/app:"));
        assert!(!rendered.contains("monitoring"));
    }

    #[tokio::test]
    async fn test_pod_without_containers_is_skipped() {
        let cluster = FakeCluster::default().with_pod("default", "bare", &[]);
        let report = audit::run(&cluster, &options(None, 1)).await.unwrap();
        assert_eq!(report.to_string(), "No connectivity errors found.\n");
    }

    #[tokio::test]
    async fn test_concurrent_scan_matches_sequential_output() {
        let build = || {
            let mut cluster = FakeCluster::default();
            for i in 0..6 {
                let pod = format!("web-{i}");
                cluster = cluster.with_pod("default", &pod, &["app"]);
                cluster = cluster.with_logs(
                    &format!("default/{pod}/app"),
                    &format!("dial tcp 10.0.0.{i}:443: i/o timeout\n"),
                );
            }
            cluster
        };

        let sequential = audit::run(&build(), &options(None, 1)).await.unwrap();
        let concurrent = audit::run(&build(), &options(None, 4)).await.unwrap();
        assert_eq!(sequential.to_string(), concurrent.to_string());
    }
}
