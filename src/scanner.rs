use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Connectivity failure patterns, tried in order against every log line.
///
/// The list is fixed at compile time and compiled once on first use. Ordering
/// matters only for short-circuiting; a line is a hit if any pattern matches.
static ERROR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // TCP dials that timed out, got refused, or were canceled mid-flight
        r"(?i)dial tcp [^:]+:\d+:.*(?:i/o timeout|connection refused|operation was canceled)",
        r"(?i)connection error.*dial tcp",
        // DNS resolution failures
        r"(?i)(?:NXDOMAIN|no such host)",
        r"(?i)connect(?:ion)? (?:timed out|refused)",
        // Proxy/gateway-level failures (envoy, nginx and friends)
        r"(?i)upstream connect error|503 Service Unavailable",
        r"(?i)failed to connect to",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("built-in pattern must compile"))
    .collect()
});

/// Primary endpoint extraction: the address in a Go-style `dial tcp host:port` error.
static DIAL_ENDPOINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"dial tcp ([^\s:]+:\d+)").expect("built-in pattern must compile"));

/// Fallback extraction: `connect to`/`connecting to` phrasing, or an Addr field
/// (possibly escaped-quoted inside structured logs), followed by host:port.
static ADDR_ENDPOINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:connect to|connecting to|Addr:\s*\\?"?)([a-zA-Z0-9._-]+:\d+)"#)
        .expect("built-in pattern must compile")
});

/// Collect every line of `log_text` that matches a failure pattern, trimmed,
/// in source order. A line is recorded at most once even if several patterns
/// would match it.
pub fn scan_lines(log_text: &str) -> Vec<String> {
    let mut hits = Vec::new();
    for line in log_text.lines() {
        if ERROR_PATTERNS.iter().any(|re| re.is_match(line)) {
            hits.push(line.trim().to_string());
        }
    }
    hits
}

/// Pull the failing `host:port` out of each hit line.
///
/// The `dial tcp` form wins over the looser phrasing when both match. Lines
/// where neither pattern matches contribute no endpoint; they still count as
/// hits for the container, just not toward endpoint aggregation.
pub fn extract_endpoints(hits: &[String]) -> BTreeMap<String, u64> {
    let mut endpoints = BTreeMap::new();
    for line in hits {
        for re in [&*DIAL_ENDPOINT, &*ADDR_ENDPOINT] {
            if let Some(caps) = re.captures(line) {
                *endpoints.entry(caps[1].to_string()).or_insert(0) += 1;
                break;
            }
        }
    }
    endpoints
}
