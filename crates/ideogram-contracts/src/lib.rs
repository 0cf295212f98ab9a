pub mod error;
pub mod models;
pub mod request;
pub mod response;
pub mod rpc;
pub mod tools;

pub use error::{IdeogramError, Result};
