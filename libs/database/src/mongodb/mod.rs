//! MongoDB client construction and health checks

mod config;
mod connector;
mod health;

pub use config::MongoConfig;
pub use connector::{connect_from_config, connect_from_config_with_retry, connect_lazy};
pub use health::ping;

// Re-export MongoDB types for convenience
pub use mongodb::{Client, Collection, Database};
