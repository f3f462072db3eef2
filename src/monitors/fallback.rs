use crate::QueueSnapshot;

/// Fixed seed set served when no live queue qualifies for the alerts view
const SEED: &[(&str, &str, u64)] = &[
    ("TST1-NEW", "ORDER.PROCESSING.DLQ", 5247),
    ("TST2-ESB", "INVENTORY.UPDATE.QUEUE", 4832),
    ("TST2-SHORE", "PAYMENT.RETRY.QUEUE", 8915),
    ("TST6-ESB", "NOTIFICATION.BACKLOG", 3421),
    ("TSTSH1-EMS1-ESB", "BOOKING.SYNC.QUEUE", 12450),
    ("TSTSH1-EMS2-ESB", "DATA.MIGRATION.QUEUE", 6789),
    ("TSTSH2-EMS1-ESB", "ERROR.HANDLING.QUEUE", 3156),
    ("TSTSH3-EMS1-ESB", "AUDIT.LOG.QUEUE", 4521),
    ("SC-Spectrum", "SC.Q.AUDIT.PUBLISHMESSAGE.AUDITLOGGER", 14325),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackDataSource;

impl FallbackDataSource {
    pub fn new() -> Self {
        Self
    }

    /// The seed queues that would raise an alert, in seed order
    pub fn fallback(&self) -> Vec<QueueSnapshot> {
        SEED.iter()
            .map(|(endpoint, queue, count)| QueueSnapshot::new(*endpoint, *queue, *count))
            .filter(|snapshot| snapshot.severity().is_alert())
            .collect()
    }
}
