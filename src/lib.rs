//! flagbridge: feature-flag context demo
//!
//! A Context Store service that resolves demo users and organizations into evaluation
//! contexts and proxies three boolean flags to an external provider with explicit
//! fallback semantics, plus an operator console that shows server-side and client-side
//! evaluations side by side.

pub mod audit;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod evaluation;
pub mod flags;
pub mod logging;
pub mod presenter;
pub mod provider;
pub mod server;
