//! HTTP request handlers.

pub mod health;
pub mod rpc;

pub use health::health_check;
