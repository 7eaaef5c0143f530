//! OmniLogic XML Envelope Codec
//!
//! The OmniLogic API wraps every operation in the same envelope: an operation
//! name plus an ordered parameter list. List-shaped responses (such as the
//! site catalog) nest `Item` nodes inside a parameter, each item carrying its
//! own `Property` name/value pairs.
//!
//! ```text
//! <Request>
//!   <Name>Login</Name>
//!   <Parameters>
//!     <Parameter name="UserName" dataType="string">...</Parameter>
//!   </Parameters>
//! </Request>
//! ```
//!
//! The codec only deals with the tree shape. Business-level status codes
//! inside the parameter list are interpreted by the caller.

use crate::error::{ExporterError, Result};

/// A typed name/value pair in a request or response envelope.
///
/// The `data_type` attribute exists purely for wire compatibility; values are
/// carried as strings and never type-checked here.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub data_type: String,
    pub value: String,
    pub items: Vec<Item>,
}

impl Parameter {
    pub fn new(data_type: &str, name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
            value: value.to_string(),
            items: Vec::new(),
        }
    }
}

/// One entry of a list-shaped response parameter.
#[derive(Debug, Clone, Default)]
pub struct Item {
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub value: String,
}

/// A decoded response envelope.
#[derive(Debug, Clone)]
pub struct Response {
    pub name: String,
    pub parameters: Vec<Parameter>,
}

impl Response {
    /// Value of the first top-level parameter with the given name.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}

/// Encode a request envelope for the given operation.
pub fn encode_request(operation: &str, parameters: &[Parameter]) -> String {
    let mut xml = String::with_capacity(256);
    xml.push_str("<Request><Name>");
    push_escaped(&mut xml, operation);
    xml.push_str("</Name><Parameters>");
    for parameter in parameters {
        xml.push_str("<Parameter name=\"");
        push_escaped(&mut xml, &parameter.name);
        xml.push_str("\" dataType=\"");
        push_escaped(&mut xml, &parameter.data_type);
        xml.push_str("\">");
        push_escaped(&mut xml, &parameter.value);
        xml.push_str("</Parameter>");
    }
    xml.push_str("</Parameters></Request>");
    xml
}

fn push_escaped(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
}

/// Decode a response envelope.
///
/// Fails with [`ExporterError::MalformedResponse`] when the body is not
/// well-formed XML or the root element is not `<Response>`.
pub fn decode_response(body: &str) -> Result<Response> {
    let document = roxmltree::Document::parse(body)
        .map_err(|e| ExporterError::MalformedResponse(e.to_string()))?;

    let root = document.root_element();
    if root.tag_name().name() != "Response" {
        return Err(ExporterError::MalformedResponse(format!(
            "expected <Response> root element, found <{}>",
            root.tag_name().name()
        )));
    }

    let name = root
        .children()
        .find(|n| n.has_tag_name("Name"))
        .and_then(|n| n.text())
        .unwrap_or_default()
        .trim()
        .to_string();

    let mut parameters = Vec::new();
    if let Some(list) = root.children().find(|n| n.has_tag_name("Parameters")) {
        for node in list.children().filter(|n| n.has_tag_name("Parameter")) {
            parameters.push(decode_parameter(&node));
        }
    }

    Ok(Response { name, parameters })
}

fn decode_parameter(node: &roxmltree::Node<'_, '_>) -> Parameter {
    let items = node
        .children()
        .filter(|n| n.has_tag_name("Item"))
        .map(|item| Item {
            properties: item
                .children()
                .filter(|n| n.has_tag_name("Property"))
                .map(|property| Property {
                    name: property.attribute("name").unwrap_or_default().to_string(),
                    value: property.text().unwrap_or_default().trim().to_string(),
                })
                .collect(),
        })
        .collect();

    Parameter {
        name: node.attribute("name").unwrap_or_default().to_string(),
        data_type: node.attribute("dataType").unwrap_or_default().to_string(),
        value: node.text().unwrap_or_default().trim().to_string(),
        items,
    }
}
