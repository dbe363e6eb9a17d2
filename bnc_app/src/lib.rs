//! # bnc_app
//!
//! Shared utilities for market-data client applications

pub mod cli;
pub mod config_loader;
pub mod retry;
pub mod shutdown_handler;
pub mod time_utils;
pub mod tracing_setup;
