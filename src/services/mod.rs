// Service module exports

pub mod aggregator;
pub mod classifier;
pub mod countdown;
pub mod dashboard;
pub mod filter;
pub mod scheduler;
pub mod search_history;
pub mod settings;
pub mod source;
