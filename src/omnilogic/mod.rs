//! OmniLogic API client, XML envelope codec, and telemetry decoder.

pub mod client;
pub mod protocol;
pub mod telemetry;

pub use client::{OmniLogicClient, Session, Site, STATUS_SUCCESS};
pub use telemetry::TelemetryElement;
