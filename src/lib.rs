// Campus Events Library
// Event status, countdown and statistics engine, exported for the CLI and tests

pub mod models;
pub mod services;
pub mod utils;
