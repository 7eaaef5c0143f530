use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    /// Network failure, timeout, or a non-2xx HTTP status from the API.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be decoded as the expected XML envelope.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// An authenticated request was attempted without a valid session.
    #[error("not authenticated to OmniLogic")]
    NotAuthenticated,

    /// The vendor rejected the credentials (status code 4).
    #[error("login failed, incorrect username or password: {0}")]
    AuthenticationFailed(String),

    /// The vendor rejected the login for any other reason.
    #[error("login rejected: {0}")]
    LoginRejected(String),

    /// The vendor reported a non-success status on the site list.
    #[error("site list unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, ExporterError>;
