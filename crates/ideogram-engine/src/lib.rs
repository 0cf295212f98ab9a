pub mod adapter;
pub mod client;
pub mod config;
pub mod materializer;

pub use client::IdeogramClient;
pub use config::IdeogramConfig;
pub use ideogram_contracts::{IdeogramError, Result};
