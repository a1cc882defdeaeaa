//! Run statistics for the command-line summary

use crate::crawler::CrawlReport;
use crate::state::NodeState;
use std::collections::BTreeMap;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// URLs scheduled by the web crawl
    pub pages_discovered: usize,

    /// Final state counts, only states that occurred
    pub pages_by_state: BTreeMap<&'static str, usize>,

    /// Links found on fetched pages
    pub links_discovered: usize,

    /// Links dropped by the URL policy
    pub links_rejected: usize,

    /// Links already scheduled from another page
    pub links_already_visited: usize,

    /// Records extracted from web pages
    pub web_records: usize,

    /// Records collected from repositories
    pub repository_records: usize,

    /// Wall-clock duration of the whole run
    pub elapsed: Duration,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the web crawl's counters
    pub fn record_web(&mut self, report: &CrawlReport, records: usize) {
        self.pages_discovered = report.len();
        self.links_discovered = report.links_discovered;
        self.links_rejected = report.links_rejected;
        self.links_already_visited = report.links_already_visited;
        self.web_records = records;

        self.pages_by_state = NodeState::all()
            .iter()
            .map(|state| (state.as_str(), report.count(*state)))
            .filter(|(_, count)| *count > 0)
            .collect();
    }

    pub fn record_repositories(&mut self, records: usize) {
        self.repository_records = records;
    }

    pub fn total_records(&self) -> usize {
        self.web_records + self.repository_records
    }

    /// Share of discovered pages that were fetched successfully, in percent
    pub fn fetch_success_rate(&self) -> f64 {
        if self.pages_discovered == 0 {
            return 0.0;
        }
        let fetched = self.pages_discovered
            - self
                .pages_by_state
                .get(NodeState::FetchFailed.as_str())
                .copied()
                .unwrap_or(0);
        (fetched as f64 / self.pages_discovered as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Harvest Statistics ===\n");

    if stats.pages_discovered > 0 {
        println!("Web Crawl:");
        println!("  Pages discovered: {}", stats.pages_discovered);
        println!("  Links found: {}", stats.links_discovered);
        println!("  Links rejected by policy: {}", stats.links_rejected);
        println!("  Links already visited: {}", stats.links_already_visited);
        println!();

        println!("Pages by State:");
        let mut state_counts: Vec<_> = stats.pages_by_state.iter().collect();
        state_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (state, count) in state_counts {
            let percentage = (*count as f64 / stats.pages_discovered as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", state, count, percentage);
        }
        println!("  Fetch success rate: {:.1}%", stats.fetch_success_rate());
        println!();
    }

    println!("Records:");
    println!("  From web pages: {}", stats.web_records);
    println!("  From repositories: {}", stats.repository_records);
    println!("  Total: {}", stats.total_records());
    println!();

    println!("Completed in {:.1}s", stats.elapsed.as_secs_f64());
}
