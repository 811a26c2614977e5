//! HTTP intake server and shared log streaming.
//!
//! - [`server`] - axum routes (validate, upload proxy, contracts, SSE)
//! - [`types`] - REST response envelopes
//! - [`logs`] - broadcast log bus shared with the CLI pipeline

pub mod logs;
pub mod server;
pub mod types;
