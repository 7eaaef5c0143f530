//! Prometheus Metrics Definitions
//!
//! Fixed metrics exported on every scrape, regardless of telemetry content:
//!
//! - `omnilogic_up` - Whether the last scrape completed fully (1) or not (0)
//! - `omnilogic_exporter_scrapes_total` - Total scrape attempts
//! - `omnilogic_exporter_login_failures_total` - Failed login exchanges
//! - `omnilogic_exporter_xml_parse_failures_total` - Malformed XML responses
//! - `omnilogic_site_system_status` - Vendor-reported health per site
//!   - Labels: msp_system_id, backyard_name
//!
//! Dynamic telemetry gauges are created at runtime by the synthesis engine
//! (`crate::synthesis`) and registered into the same registry.
//!
//! All metrics use the `omnilogic_` namespace prefix.

use prometheus::{Encoder, Gauge, GaugeVec, IntCounter, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// The Prometheus namespace shared by every exported series.
pub const NAMESPACE: &str = "omnilogic";

#[derive(Clone)]
pub struct ExporterMetrics {
    registry: Arc<Registry>,

    pub up: Gauge,
    pub scrapes_total: IntCounter,
    pub login_failures_total: IntCounter,
    pub xml_parse_failures_total: IntCounter,
    pub site_status: GaugeVec,
}

impl ExporterMetrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let up = Gauge::with_opts(
            Opts::new("up", "Was the last scrape of OmniLogic successful.").namespace(NAMESPACE),
        )?;

        let scrapes_total = IntCounter::with_opts(
            Opts::new("exporter_scrapes_total", "Current total OmniLogic scrapes.")
                .namespace(NAMESPACE),
        )?;

        let login_failures_total = IntCounter::with_opts(
            Opts::new(
                "exporter_login_failures_total",
                "Number of errors while logging into OmniLogic.",
            )
            .namespace(NAMESPACE),
        )?;

        let xml_parse_failures_total = IntCounter::with_opts(
            Opts::new(
                "exporter_xml_parse_failures_total",
                "Number of errors while parsing XML responses.",
            )
            .namespace(NAMESPACE),
        )?;

        let site_status = GaugeVec::new(
            Opts::new("system_status", "OmniLogic site system status.")
                .namespace(NAMESPACE)
                .subsystem("site"),
            &["msp_system_id", "backyard_name"],
        )?;

        registry.register(Box::new(up.clone()))?;
        registry.register(Box::new(scrapes_total.clone()))?;
        registry.register(Box::new(login_failures_total.clone()))?;
        registry.register(Box::new(xml_parse_failures_total.clone()))?;
        registry.register(Box::new(site_status.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            up,
            scrapes_total,
            login_failures_total,
            xml_parse_failures_total,
            site_status,
        })
    }

    /// The registry backing all exported series, shared with the synthesis
    /// engine so dynamic telemetry gauges render alongside the fixed set.
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
