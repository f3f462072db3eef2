use crate::Severity;

/// Queues with more pending messages than this are at least `Warning`
pub const WARNING_THRESHOLD: u64 = 5000;

/// Queues with more pending messages than this are `Critical`
pub const CRITICAL_THRESHOLD: u64 = 10000;

/// Map a queue depth to its severity
pub fn classify(message_count: u64) -> Severity {
    if message_count > CRITICAL_THRESHOLD {
        Severity::Critical
    } else if message_count > WARNING_THRESHOLD {
        Severity::Warning
    } else {
        Severity::Ok
    }
}
