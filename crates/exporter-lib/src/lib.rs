//! Exporter library for Hetzner Cloud resource metrics
//!
//! This crate provides the core functionality for:
//! - Fetching resources from the cloud API
//! - Mapping resource records to Prometheus observations
//! - Per-collector failure and duration instrumentation
//! - Assembling the scrape response

pub mod client;
pub mod collector;
pub mod exporter;
pub mod models;
pub mod observability;

pub use client::{ApiError, CloudApi, HttpClient};
pub use collector::{Collector, CollectorConfig, Observation};
pub use exporter::{Exporter, ExporterBuilder};
pub use observability::{BuildInfo, RequestMetrics};
