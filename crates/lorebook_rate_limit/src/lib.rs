//! Retry, pacing and configuration for service calls.
//!
//! The external service imposes a request-rate ceiling. This crate keeps
//! the engine under it in two ways:
//!
//! - [`Pacer`] spaces consecutive requests at a fixed interval
//! - [`RetryPolicy`] backs off exponentially on rate-limited failures and
//!   gives up with a terminal overloaded error after a fixed attempt ceiling
//!
//! [`LorebookConfig`] loads both from layered TOML files.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod pacer;
mod retry;

pub use config::{
    ConsolidationConfig, EnrichmentConfig, GeminiConfig, LorebookConfig, RetryConfig,
};
pub use pacer::Pacer;
pub use retry::RetryPolicy;
