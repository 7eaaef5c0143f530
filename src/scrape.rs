//! Scrape Orchestrator
//!
//! Sequences one full collection cycle against the OmniLogic API:
//!
//! 1. Ensure an authenticated session (login on demand). A login failure
//!    increments the login-failure counter and stops the scrape before any
//!    site or telemetry call.
//! 2. Refresh the site catalog; failure stops the scrape and leaves the
//!    previous catalog untouched.
//! 3. For each site in catalog order, fetch and decode telemetry and run it
//!    through the synthesis engine. Iteration is sequential and fail-fast:
//!    one site's failure aborts the remaining sites in this cycle.
//! 4. Always export `omnilogic_up` plus the fixed counters.
//!
//! # Concurrency
//!
//! Session, catalog, and client sit behind one exclusive lock held for the
//! duration of a cycle, so overlapping pull requests cannot interleave
//! partial state. The gauge registry inside the synthesis engine has its
//! own lock and outlives individual cycles.

use crate::config::OmniLogicConfig;
use crate::error::{ExporterError, Result};
use crate::metrics::ExporterMetrics;
use crate::omnilogic::{telemetry, OmniLogicClient, Session, Site};
use crate::synthesis::MetricSynthesizer;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Outcome of one collection cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeResult {
    pub success: bool,
}

pub struct ScrapeOrchestrator {
    metrics: ExporterMetrics,
    synthesizer: MetricSynthesizer,
    state: Mutex<ScrapeState>,
}

struct ScrapeState {
    client: OmniLogicClient,
    session: Option<Session>,
    sites: Vec<Site>,
}

impl ScrapeOrchestrator {
    pub fn new(config: OmniLogicConfig, metrics: ExporterMetrics) -> Result<Self> {
        let client = OmniLogicClient::new(config)?;
        let synthesizer = MetricSynthesizer::new(metrics.registry());
        Ok(Self {
            metrics,
            synthesizer,
            state: Mutex::new(ScrapeState {
                client,
                session: None,
                sites: Vec::new(),
            }),
        })
    }

    /// Run one collection cycle. Errors degrade `omnilogic_up` to 0 and are
    /// logged; they never propagate out of the scrape.
    pub async fn scrape(&self) -> ScrapeResult {
        let mut state = self.state.lock().await;
        self.metrics.scrapes_total.inc();

        let success = match self.run(&mut state).await {
            Ok(()) => true,
            Err(e) => {
                if matches!(e, ExporterError::MalformedResponse(_)) {
                    self.metrics.xml_parse_failures_total.inc();
                }
                error!(error = %e, "scrape failed");
                false
            }
        };

        self.metrics.up.set(if success { 1.0 } else { 0.0 });
        ScrapeResult { success }
    }

    async fn run(&self, state: &mut ScrapeState) -> Result<()> {
        if !state
            .session
            .as_ref()
            .is_some_and(Session::is_authenticated)
        {
            match state.client.login().await {
                Ok(session) => state.session = Some(session),
                Err(e) => {
                    state.session = None;
                    self.metrics.login_failures_total.inc();
                    return Err(e);
                }
            }
        }

        let session = state.session.clone().ok_or(ExporterError::NotAuthenticated)?;

        // Replace the catalog wholesale; on failure the previous one stays.
        let sites = state.client.fetch_sites(&session).await?;
        // Sites the catalog no longer reports disappear from the export.
        self.metrics.site_status.reset();
        for site in &sites {
            self.metrics
                .site_status
                .with_label_values(&[&site.msp_system_id, &site.backyard_name])
                .set(site.status);
        }
        state.sites = sites;

        for site in &state.sites {
            let body = state
                .client
                .fetch_telemetry(&session, &site.msp_system_id)
                .await?;
            let elements = telemetry::decode_telemetry(&body)?;
            let touched = self
                .synthesizer
                .synthesize(&site.msp_system_id, &elements)?;
            debug!(
                msp_system_id = %site.msp_system_id,
                elements = elements.len(),
                gauges = touched,
                "refreshed telemetry data"
            );
        }

        info!(sites = state.sites.len(), "scrape successful");
        Ok(())
    }
}
