pub mod endpoints;
pub mod health;
pub mod queues;
pub mod stats;
