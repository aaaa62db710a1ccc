use clap::Parser;

#[derive(Parser)]
#[command(name = "kubectl-connaudit")]
#[command(about = "Scan pod logs across the cluster for connectivity errors")]
pub struct Cli {
    /// Namespace to scan (default: all namespaces)
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,

    /// Log age to scan, e.g. 90s, 30m, 1h, 2d
    #[arg(long, default_value = "1h")]
    pub since: String,

    /// Maximum log lines fetched per container
    #[arg(long, default_value_t = 500)]
    pub tail: i64,

    /// Per-container log fetch timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Maximum number of log fetches in flight
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
