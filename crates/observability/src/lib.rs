//! Observability infrastructure for OpenMarket
//!
//! This crate provides structured logging via tracing.
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("orders", LogFormat::Pretty)?;
//! tracing::info!("Service started");
//! ```

pub mod logging;

pub use logging::{init_default_logging, init_logging, LogFormat};
