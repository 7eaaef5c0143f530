//! Metric Synthesis Engine
//!
//! Turns decoded telemetry elements into Prometheus gauges. The telemetry
//! schema is open-world, so there is no fixed metric set: each (element,
//! attribute, value) triple is classified heuristically and, when it carries
//! a numeric signal, mapped to a gauge named
//! `omnilogic_<element>_<attribute>` with `system_id` and `msp_system_id`
//! constant labels.
//!
//! # Classification
//!
//! First match wins:
//! 1. Values matching the float lexical pattern (`12`, `12.5`, `.5`) parse
//!    to a 64-bit float. Negative readings are dropped across the board;
//!    the vendor reports bogus negatives for at least air temperature.
//! 2. Case-insensitive `yes`/`no` maps to 1.0/0.0.
//! 3. Everything else (free text, enumerations, timestamps) is dropped.
//!
//! # Gauge registry
//!
//! The identity-to-gauge map lives for the whole process and is append-only:
//! a sensor that disappears leaves its gauge frozen at the last value until
//! restart. Duplicate vendor rows for the same logical sensor resolve to the
//! same gauge, so repeated scrapes update series in place instead of
//! duplicating them.

use crate::error::Result;
use crate::metrics::NAMESPACE;
use crate::omnilogic::TelemetryElement;
use prometheus::{Gauge, Opts, Registry};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Float lexical pattern: optional sign, digits, optional fraction.
/// Exponents are not supported; the vendor never emits them.
const FLOAT_PATTERN: &str = r"^[+-]?([0-9]+([.][0-9]*)?|[.][0-9]+)$";

pub struct MetricSynthesizer {
    registry: Arc<Registry>,
    gauges: Mutex<HashMap<String, Gauge>>,
    float_pattern: Regex,
}

impl MetricSynthesizer {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            gauges: Mutex::new(HashMap::new()),
            float_pattern: Regex::new(FLOAT_PATTERN).expect("float pattern is valid"),
        }
    }

    /// Classify a raw attribute value, returning the gauge value it maps to.
    ///
    /// `None` means the value carries no exportable signal and must not
    /// create or update a series.
    pub fn classify(&self, value: &str) -> Option<f64> {
        if value.is_empty() {
            return None;
        }
        if self.float_pattern.is_match(value) {
            let parsed: f64 = value.parse().ok()?;
            return (parsed.is_finite() && parsed >= 0.0).then_some(parsed);
        }
        if value.eq_ignore_ascii_case("yes") {
            return Some(1.0);
        }
        if value.eq_ignore_ascii_case("no") {
            return Some(0.0);
        }
        None
    }

    /// Synthesize gauges for one site's telemetry snapshot.
    ///
    /// Returns the number of distinct gauges touched in this pass.
    pub fn synthesize(&self, msp_system_id: &str, elements: &[TelemetryElement]) -> Result<usize> {
        let mut touched = HashSet::new();

        for element in elements {
            let system_id = element.system_id.as_deref().unwrap_or_default();
            for (attribute, value) in &element.attributes {
                let Some(gauge_value) = self.classify(value) else {
                    continue;
                };
                let key = gauge_key(&element.name, attribute, msp_system_id, system_id);
                if let Some(gauge) =
                    self.gauge(&key, &element.name, attribute, msp_system_id, system_id)?
                {
                    gauge.set(gauge_value);
                    touched.insert(key);
                }
            }
        }

        Ok(touched.len())
    }

    /// Look up or lazily create the gauge for one metric identity.
    ///
    /// Creation registers the gauge into the shared registry and is
    /// idempotent: the map lock guarantees two triples resolving to the same
    /// identity in the same scrape share one gauge.
    fn gauge(
        &self,
        key: &str,
        subsystem: &str,
        name: &str,
        msp_system_id: &str,
        system_id: &str,
    ) -> Result<Option<Gauge>> {
        let mut gauges = self.gauges.lock().expect("gauge registry lock poisoned");

        if let Some(gauge) = gauges.get(key) {
            return Ok(Some(gauge.clone()));
        }

        let mut opts = Opts::new(name, "OmniLogic telemetry attribute.")
            .namespace(NAMESPACE)
            .subsystem(subsystem);
        if !system_id.is_empty() {
            opts = opts.const_label("system_id", system_id);
        }
        if !msp_system_id.is_empty() {
            opts = opts.const_label("msp_system_id", msp_system_id);
        }

        // A normalized name can still fall outside the Prometheus name
        // alphabet (e.g. a non-ASCII vendor attribute); skip the attribute
        // rather than fail the scrape.
        let gauge = match Gauge::with_opts(opts) {
            Ok(gauge) => gauge,
            Err(e) => {
                warn!(key, error = %e, "cannot create telemetry gauge, skipping");
                return Ok(None);
            }
        };
        if let Err(e) = self.registry.register(Box::new(gauge.clone())) {
            // Label-set conflicts with an existing series (e.g. the same
            // element name appearing with and without a systemId) cannot be
            // exported; skip the attribute rather than fail the scrape.
            warn!(key, error = %e, "cannot register telemetry gauge, skipping");
            return Ok(None);
        }

        gauges.insert(key.to_string(), gauge.clone());
        Ok(Some(gauge))
    }
}

fn gauge_key(subsystem: &str, name: &str, msp_system_id: &str, system_id: &str) -> String {
    format!("{NAMESPACE}_{subsystem}_{name}_{msp_system_id}_{system_id}")
}
