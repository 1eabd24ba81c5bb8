//! Metrics and monitoring for the multiswap settlement engine
//!
//! This crate provides metrics collection and log setup for a running engine.
//!
//! # Features
//!
//! - Prometheus counters fed by a [`SettlementObserver`](multiswap_settlement::SettlementObserver)
//! - HTTP endpoints for scraping, liveness and engine status
//! - Tracing initialisation with a layer counting warnings and errors
//!
//! # Example
//!
//! ```no_run
//! use multiswap_metrics::{MetricsCollector, MetricsServer};
//! use multiswap_settlement::SettlementEngine;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let collector = Arc::new(MetricsCollector::new());
//!     let engine = Arc::new(
//!         SettlementEngine::builder("engine", "controller", "treasury")
//!             .observer(collector.clone())
//!             .build()
//!             .unwrap(),
//!     );
//!
//!     let server = MetricsServer::new(collector, "0.0.0.0:9100".to_string()).with_engine(engine);
//!     server.serve().await.unwrap();
//! }
//! ```

pub mod collector;
pub mod http;
pub mod metrics;
pub mod tracing;

pub use collector::{MetricsCollector, MetricsError};
pub use http::{MetricsServer, MetricsServerError};
pub use crate::tracing::{init_tracing, init_tracing_with_metrics, LogMetricsLayer, TracingError};
