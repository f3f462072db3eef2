//! Aggregation core
//!
//! ```text
//! ServerRegistry ──► FanOutAggregator ──spawns──► QueueMetricsCollector (one per endpoint)
//!                          │                         │  └─► ReachabilityTracker
//!                          ▼                         ▼
//!                   AggregationResult ◄──── QueueSnapshot (severity via classifier)
//!                          │
//!                          ▼
//!                  FilterSortPipeline ──(empty alerts)──► FallbackDataSource
//! ```

pub mod aggregator;
pub mod classifier;
pub mod collector;
pub mod fallback;
pub mod pipeline;
