use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::types::ContainerKey;

/// Distinct sample lines shown per container before eliding the rest.
const MAX_SAMPLE_LINES: usize = 5;

/// Widest line printed in the detail section; longer lines get an ellipsis.
const MAX_LINE_WIDTH: usize = 120;

const BANNER_WIDTH: usize = 70;

/// Accumulates scan results across containers and renders the final report.
///
/// Recording is commutative: the rendered output depends only on the set of
/// recorded findings, never on the order containers were processed in, so
/// concurrent fetches do not perturb the report.
#[derive(Debug, Default)]
pub struct Aggregator {
    endpoints: BTreeMap<String, u64>,
    findings: BTreeMap<ContainerKey, Vec<String>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one scanned container. Containers with no hits are dropped here
    /// so the detail section only ever lists affected containers.
    pub fn record(
        &mut self,
        key: ContainerKey,
        hits: Vec<String>,
        endpoints: BTreeMap<String, u64>,
    ) {
        if hits.is_empty() {
            return;
        }
        for (endpoint, count) in endpoints {
            *self.endpoints.entry(endpoint).or_insert(0) += count;
        }
        self.findings.insert(key, hits);
    }

    /// Endpoints with their total hit counts, most frequent first. Ties break
    /// on ascending endpoint so the ordering is total.
    fn ranked_endpoints(&self) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self
            .endpoints
            .iter()
            .map(|(ep, count)| (ep.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

/// Deduplicate a container's hit lines into (line, count) pairs, most frequent
/// first; ties keep first-seen order.
fn dedup_hits(hits: &[String]) -> Vec<(&str, u64)> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for hit in hits {
        let entry = counts.entry(hit.as_str()).or_insert(0);
        if *entry == 0 {
            order.push(hit);
        }
        *entry += 1;
    }
    let mut pairs: Vec<(&str, u64)> = order.into_iter().map(|line| (line, counts[line])).collect();
    pairs.sort_by_key(|&(_, count)| Reverse(count));
    pairs
}

/// Cut a line down to the display width, marking the cut with an ellipsis.
/// Counts characters, not bytes, so multibyte log lines stay valid UTF-8.
fn clip(line: &str) -> String {
    if line.chars().count() > MAX_LINE_WIDTH {
        let mut clipped: String = line.chars().take(MAX_LINE_WIDTH - 3).collect();
        clipped.push_str("...");
        clipped
    } else {
        line.to_string()
    }
}

impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.findings.is_empty() {
            return writeln!(f, "No connectivity errors found.");
        }

        let banner = "=".repeat(BANNER_WIDTH);

        writeln!(f, "{banner}")?;
        writeln!(f, "FAILING ENDPOINTS (aggregated)")?;
        writeln!(f, "{banner}")?;
        for (endpoint, count) in self.ranked_endpoints() {
            writeln!(f, "  {endpoint:<45} {count:>5} hits")?;
        }

        writeln!(f)?;
        writeln!(f, "{banner}")?;
        writeln!(f, "AFFECTED PODS ({} containers)", self.findings.len())?;
        writeln!(f, "{banner}")?;

        for (key, hits) in &self.findings {
            let pairs = dedup_hits(hits);
            writeln!(f)?;
            writeln!(f, "  {key}:")?;
            for &(line, count) in pairs.iter().take(MAX_SAMPLE_LINES) {
                if count > 1 {
                    writeln!(f, "    [{count}x] {}", clip(line))?;
                } else {
                    writeln!(f, "    {}", clip(line))?;
                }
            }
            if pairs.len() > MAX_SAMPLE_LINES {
                writeln!(
                    f,
                    "    ... and {} more unique error lines",
                    pairs.len() - MAX_SAMPLE_LINES
                )?;
            }
        }

        Ok(())
    }
}
