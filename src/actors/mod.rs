//! Background refresh of the alerts view
//!
//! The refresh actor runs as an independent task and talks to the rest of the
//! hub through channels only.
//!
//! ```text
//!            ┌──────────────┐  RefreshNow / UpdateInterval / Shutdown
//!            │ RefreshHandle│ ───────────────────────────────┐
//!            └──────────────┘                                ▼
//!                                                  ┌──────────────────┐
//!   ticker ──────────────────────────────────────► │   RefreshActor   │ ─► QueueMonitor::alerts()
//!                                                  └────────┬─────────┘
//!                                                           │ CycleEvent
//!                                                           ▼
//!                                                  broadcast channel ─► API status store, logs
//! ```
//!
//! Commands go over mpsc, replies over oneshot, events over broadcast.

pub mod messages;
pub mod refresh;
