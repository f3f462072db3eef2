//! Filtering, ordering and capping of aggregated snapshots
//!
//! Both views are pure functions of their input. Orderings end with the
//! queue name so the result does not depend on the order in which endpoint
//! results were merged.

use crate::QueueSnapshot;
use crate::config::MonitorConfig;
use crate::util::contains_ignore_case;

/// Case-insensitive substring patterns identifying queues to exclude
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blocklist {
    patterns: Vec<String>,
}

impl Blocklist {
    pub fn new<S: AsRef<str>>(patterns: impl IntoIterator<Item = S>) -> Self {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, queue: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| contains_ignore_case(queue, pattern))
    }
}

#[derive(Debug, Clone)]
pub struct FilterSortPipeline {
    blocklist: Blocklist,
    alert_limit: usize,
}

impl FilterSortPipeline {
    pub fn new(blocklist: Blocklist, alert_limit: usize) -> Self {
        Self {
            blocklist,
            alert_limit,
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(Blocklist::new(&config.alert_blocklist), config.alert_limit)
    }

    /// Cross-fleet view: non-`Ok` queues by endpoint, deepest first, capped
    pub fn alerts(&self, snapshots: &[QueueSnapshot]) -> Vec<QueueSnapshot> {
        let mut alerts: Vec<_> = snapshots
            .iter()
            .filter(|s| s.severity().is_alert())
            .filter(|s| !self.blocklist.matches(&s.queue))
            .cloned()
            .collect();

        alerts.sort_by(|a, b| {
            a.endpoint
                .cmp(&b.endpoint)
                .then_with(|| b.message_count.cmp(&a.message_count))
                .then_with(|| a.queue.cmp(&b.queue))
        });
        alerts.truncate(self.alert_limit);
        alerts
    }

    /// Single-endpoint view: every queue of `endpoint`, deepest first
    pub fn endpoint_queues(
        &self,
        snapshots: &[QueueSnapshot],
        endpoint: &str,
    ) -> Vec<QueueSnapshot> {
        let mut queues: Vec<_> = snapshots
            .iter()
            .filter(|s| s.endpoint == endpoint)
            .filter(|s| !self.blocklist.matches(&s.queue))
            .cloned()
            .collect();

        queues.sort_by(|a, b| {
            b.message_count
                .cmp(&a.message_count)
                .then_with(|| a.queue.cmp(&b.queue))
        });
        queues
    }
}

impl Default for FilterSortPipeline {
    fn default() -> Self {
        Self::from_config(&MonitorConfig::default())
    }
}
