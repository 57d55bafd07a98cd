//! Final design record produced when a session is finalized.

use serde::{Deserialize, Serialize};

use crate::timestamp::nullable_vec;

/// The structured system design returned by the finalize operation.
///
/// Produced exactly once per session and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalDesign {
    #[serde(default)]
    pub summary: String,

    #[serde(default, deserialize_with = "nullable_vec")]
    pub components: Vec<Component>,

    /// Database schema (usually SQL DDL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_schema: Option<String>,

    /// Mermaid markup for the system diagram.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mermaid: Option<String>,

    #[serde(default, deserialize_with = "nullable_vec")]
    pub tech_stack: Vec<String>,

    #[serde(default, deserialize_with = "nullable_vec")]
    pub integration_steps: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,

    /// Locator of a pre-rendered diagram image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram_url: Option<String>,

    /// Additional diagrams; entries that are not objects are kept verbatim.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub diagrams: Vec<serde_json::Value>,
}

impl FinalDesign {
    /// Additional diagrams that have the `{type, description, content}` shape.
    pub fn extra_diagrams(&self) -> Vec<DiagramSpec> {
        self.diagrams
            .iter()
            .filter_map(|value| serde_json::from_value(value.clone()).ok())
            .collect()
    }
}

/// One building block of the designed system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,

    #[serde(default, alias = "desc")]
    pub description: String,

    #[serde(default)]
    pub details: ComponentDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentDetails {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub technology_stack: Vec<String>,

    #[serde(default, deserialize_with = "nullable_vec")]
    pub responsibilities: Vec<String>,
}

/// A supplementary diagram attached to a final design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramSpec {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub content: Option<String>,
}

impl DiagramSpec {
    /// Heading for the diagram: description, then type, then a generic label.
    pub fn label(&self) -> &str {
        self.description
            .as_deref()
            .or(self.kind.as_deref())
            .unwrap_or("Diagram")
    }
}
