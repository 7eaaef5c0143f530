//! OmniLogic Prometheus Exporter
//!
//! A Prometheus metrics exporter for the Hayward OmniLogic pool automation
//! cloud API.
//!
//! # Overview
//!
//! The exporter logs into the OmniLogic XML/HTTP API, enumerates monitored
//! sites ("backyards"), retrieves each site's free-form telemetry snapshot,
//! and converts it into gauge series. The telemetry schema is open-world:
//! new firmware introduces new device elements and attributes without
//! notice, so metrics are synthesized dynamically from whatever the API
//! reports rather than declared up front.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     XML over HTTP     ┌──────────────┐
//! │  OmniLogic  │ ◄───────────────────► │   Exporter   │
//! │  cloud API  │  Login / GetSiteList  │              │
//! └─────────────┘  / GetTelemetryData   │  ┌────────┐  │      HTTP      ┌────────────┐
//!                                       │  │ Scrape │  │ ◄────────────► │ Prometheus │
//!                                       │  └────────┘  │   /metrics     └────────────┘
//!                                       │  ┌────────┐  │
//!                                       │  │ Gauges │  │
//!                                       │  └────────┘  │
//!                                       └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`omnilogic`] - API client, XML envelope codec, telemetry decoder
//! - [`synthesis`] - telemetry-to-gauge classification and the gauge registry
//! - [`scrape`] - the per-pull collection cycle
//! - [`metrics`] - fixed Prometheus metric definitions
//! - [`server`] - HTTP server
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use omnilogic_exporter::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     server::start(config).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod omnilogic;
pub mod scrape;
pub mod server;
pub mod synthesis;
