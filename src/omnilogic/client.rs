//! OmniLogic API Client
//!
//! Handles the HTTP transport and the session lifecycle for the OmniLogic
//! cloud API. Every operation is an HTTP POST of an XML envelope to a single
//! endpoint; authenticated calls additionally carry the session token in a
//! `Token` header.
//!
//! # Session lifecycle
//!
//! A session is created by a successful `Login` exchange and stays valid
//! until the vendor reports a non-success status. Exactly one session is
//! live at a time; the scrape orchestrator owns it and re-logs-in when
//! [`Session::is_authenticated`] turns false.

use crate::config::OmniLogicConfig;
use crate::error::{ExporterError, Result};
use crate::omnilogic::protocol::{self, Parameter};
use reqwest::Url;
use secrecy::ExposeSecret;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The vendor's status value meaning "operation succeeded".
pub const STATUS_SUCCESS: &str = "0";

/// The vendor's login status value for bad credentials.
const STATUS_BAD_CREDENTIALS: &str = "4";

/// Authentication state returned by a successful login exchange.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user_id: String,
    pub token: String,
    pub status: String,
    pub status_message: String,
}

impl Session {
    /// True only when the vendor reported success and both identity fields
    /// are present. Requests must never go out with an empty identity.
    pub fn is_authenticated(&self) -> bool {
        self.status == STATUS_SUCCESS && !self.token.is_empty() && !self.user_id.is_empty()
    }
}

/// One monitored installation ("backyard") from the site catalog.
#[derive(Debug, Clone, Default)]
pub struct Site {
    pub msp_system_id: String,
    pub backyard_name: String,
    pub address: String,
    pub status: f64,
}

pub struct OmniLogicClient {
    url: Url,
    config: OmniLogicConfig,
    http: reqwest::Client,
}

impl OmniLogicClient {
    pub fn new(config: OmniLogicConfig) -> Result<Self> {
        let url = Url::parse(&config.url)
            .map_err(|e| ExporterError::Config(format!("invalid OmniLogic URL: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { url, config, http })
    }

    /// POST an encoded request envelope and return the raw response body.
    async fn post(&self, operation: &str, body: String, token: Option<&str>) -> Result<String> {
        debug!(operation, request = %body, "sending OmniLogic request");

        let mut request = self
            .http
            .post(self.url.clone())
            .header("cache-control", "no-cache")
            .header("content-type", "text/xml")
            .body(body);
        if let Some(token) = token {
            request = request.header("Token", token);
        }

        let response = request.send().await?.error_for_status()?;
        let body = response.text().await?;
        debug!(operation, response = %body, "received OmniLogic response");
        Ok(body)
    }

    /// Perform the `Login` exchange.
    ///
    /// Returns a session only when the vendor reports success; any rejection
    /// leaves the caller unauthenticated.
    pub async fn login(&self) -> Result<Session> {
        let request = protocol::encode_request(
            "Login",
            &[
                Parameter::new("string", "UserName", &self.config.username),
                Parameter::new("string", "Password", self.config.password.expose_secret()),
            ],
        );

        let body = self.post("Login", request, None).await?;
        let session = parse_login_response(&body)?;

        match session.status.as_str() {
            STATUS_SUCCESS => {
                info!(user_id = %session.user_id, "login successful");
                Ok(session)
            }
            STATUS_BAD_CREDENTIALS => {
                warn!(status_message = %session.status_message, "login failed, bad credentials");
                Err(ExporterError::AuthenticationFailed(session.status_message))
            }
            _ => {
                warn!(status = %session.status, status_message = %session.status_message, "login rejected");
                Err(ExporterError::LoginRejected(session.status_message))
            }
        }
    }

    /// Fetch the list of monitored sites via `GetSiteList`.
    ///
    /// A top-level non-success status fails the whole call; a malformed
    /// status field on an individual item is tolerated and leaves that
    /// site's status at zero.
    pub async fn fetch_sites(&self, session: &Session) -> Result<Vec<Site>> {
        if !session.is_authenticated() {
            return Err(ExporterError::NotAuthenticated);
        }

        let request = protocol::encode_request(
            "GetSiteList",
            &[Parameter::new("string", "UserID", &session.user_id)],
        );

        let body = self
            .post("GetSiteList", request, Some(&session.token))
            .await?;
        let sites = parse_site_list_response(&body)?;

        info!(sites = sites.len(), "refreshed site list");
        Ok(sites)
    }

    /// Fetch the raw telemetry snapshot for one site via `GetTelemetryData`.
    pub async fn fetch_telemetry(&self, session: &Session, msp_system_id: &str) -> Result<String> {
        if !session.is_authenticated() {
            return Err(ExporterError::NotAuthenticated);
        }

        let request = protocol::encode_request(
            "GetTelemetryData",
            &[Parameter::new("int", "MspSystemID", msp_system_id)],
        );

        self.post("GetTelemetryData", request, Some(&session.token))
            .await
    }
}

/// Extract the session fields from a `Login` response body.
///
/// Does not judge the status code; the caller decides what a non-success
/// status means.
pub fn parse_login_response(body: &str) -> Result<Session> {
    let response = protocol::decode_response(body)?;

    let mut session = Session::default();
    for parameter in &response.parameters {
        match parameter.name.as_str() {
            "Status" => session.status = parameter.value.clone(),
            "StatusMessage" => session.status_message = parameter.value.clone(),
            "UserID" => session.user_id = parameter.value.clone(),
            "Token" => session.token = parameter.value.clone(),
            _ => {}
        }
    }

    Ok(session)
}

/// Map a `GetSiteList` response body to site records.
///
/// A top-level non-success status fails the whole call with
/// [`ExporterError::CatalogUnavailable`]. A malformed status field on an
/// individual item must not lose the rest of the catalog: that site's
/// status stays at zero.
pub fn parse_site_list_response(body: &str) -> Result<Vec<Site>> {
    let response = protocol::decode_response(body)?;

    let status = response.parameter("Status").unwrap_or_default();
    if status != STATUS_SUCCESS {
        let message = response.parameter("StatusMessage").unwrap_or_default();
        return Err(ExporterError::CatalogUnavailable(message.to_string()));
    }

    let mut sites = Vec::new();
    if let Some(list) = response.parameters.iter().find(|p| p.name == "List") {
        for item in &list.items {
            let mut site = Site::default();
            for property in &item.properties {
                match property.name.as_str() {
                    "MspSystemID" => site.msp_system_id = property.value.clone(),
                    "BackyardName" => site.backyard_name = property.value.clone(),
                    "Address" => site.address = property.value.clone(),
                    "Status" => match property.value.parse::<f64>() {
                        Ok(status) => site.status = status,
                        Err(_) => {
                            warn!(value = %property.value, "unparsable site status, defaulting to 0");
                        }
                    },
                    _ => {}
                }
            }
            sites.push(site);
        }
    }

    Ok(sites)
}
