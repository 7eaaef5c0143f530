//! Telemetry Snapshot Decoder
//!
//! `GetTelemetryData` does not answer with the generic response envelope.
//! Instead it returns a `<STATUS>` document whose children are one element
//! per device or sensor node, with all readings carried as XML attributes:
//!
//! ```text
//! <STATUS version="1.11">
//!   <Backyard systemId="1" airTemp="74" state="1" />
//!   <BodyOfWater systemId="2" waterTemp="72" flow="1" />
//! </STATUS>
//! ```
//!
//! The element vocabulary is open-world: new firmware introduces new element
//! kinds and attributes without notice, so everything decodes into a uniform
//! name + attribute-bag shape rather than per-device structs. Nested
//! structure below an element's own attributes is ignored.

use crate::error::{ExporterError, Result};
use std::collections::BTreeMap;

/// One device/sensor node from a telemetry snapshot.
#[derive(Debug, Clone, Default)]
pub struct TelemetryElement {
    /// Element tag, normalized to snake_case.
    pub name: String,
    /// Value of the `systemId` attribute, identifying the physical device.
    pub system_id: Option<String>,
    /// All remaining attributes, names normalized to snake_case.
    pub attributes: BTreeMap<String, String>,
}

/// Decode a telemetry response body into its element list.
///
/// An empty snapshot (a `<STATUS>` element with no children) is valid and
/// yields an empty list.
pub fn decode_telemetry(body: &str) -> Result<Vec<TelemetryElement>> {
    let document = roxmltree::Document::parse(body)
        .map_err(|e| ExporterError::MalformedResponse(e.to_string()))?;

    let root = document.root_element();
    if root.tag_name().name() != "STATUS" {
        return Err(ExporterError::MalformedResponse(format!(
            "expected <STATUS> root element, found <{}>",
            root.tag_name().name()
        )));
    }

    let mut elements = Vec::new();
    for node in root.children().filter(|n| n.is_element()) {
        let mut element = TelemetryElement {
            name: to_snake_case(node.tag_name().name()),
            ..Default::default()
        };

        for attribute in node.attributes() {
            if attribute.name() == "systemId" {
                element.system_id = Some(attribute.value().to_string());
            } else {
                element
                    .attributes
                    .insert(to_snake_case(attribute.name()), attribute.value().to_string());
            }
        }

        elements.push(element);
    }

    Ok(elements)
}

/// Normalize a vendor identifier to lower-case snake_case.
///
/// Handles both camelCase ("airTemp") and PascalCase ("BodyOfWater"), and
/// keeps acronym runs together ("CSADMode" becomes "csad_mode").
pub fn to_snake_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' || c == '-' || c == '.' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1);
            let after_lower = prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit());
            let acronym_end = prev.is_some_and(|p| p.is_ascii_uppercase())
                && next.is_some_and(|n| n.is_ascii_lowercase());
            if !out.is_empty() && !out.ends_with('_') && (after_lower || acronym_end) {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}
