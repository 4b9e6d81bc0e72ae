pub mod catalog;
pub mod config;
pub mod error;
pub mod loader;
pub mod metadata;
pub mod protocol;
pub mod ratings;
pub mod recommendation;
pub mod resolver;
pub mod server;
pub mod transport;
pub mod types;
