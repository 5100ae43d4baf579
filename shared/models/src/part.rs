//! Part domain models for the Partline BOM report system.
//!
//! This module defines the part catalog data structures: part identity,
//! lifecycle attributes, and the parent-child relationship edges that make
//! up a bill of materials.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Opaque catalog identifier of a part.
///
/// The catalog id is the stable source of truth; the human-facing part
/// number is a search key and is only treated as unique for lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartId(pub String);

impl PartId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PartId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A part as read from the PLM catalog.
///
/// Immutable from the traversal's point of view: the report engine only
/// reads parts, never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct Part {
    pub id: PartId,
    #[validate(custom = "validate_part_number")]
    pub part_number: String,
    #[validate(length(min = 1, max = 500, message = "Name must be between 1 and 500 characters"))]
    pub name: String,
    pub revision: String,
    pub state: String,
    pub classification: String,
}

/// A directed parent-to-child BOM edge.
///
/// The quantity is a decimal-as-string in the catalog and is treated as an
/// opaque display value; it is never combined arithmetically across levels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BomEdge {
    pub child_id: PartId,
    pub quantity: String,
}

impl Part {
    /// Creates a new part with the given identity. Revision defaults to "A",
    /// matching the catalog's behavior for newly created parts.
    pub fn new(id: impl Into<PartId>, part_number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            part_number: part_number.into(),
            name: name.into(),
            revision: "A".to_string(),
            state: String::new(),
            classification: String::new(),
        }
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = classification.into();
        self
    }
}

impl BomEdge {
    pub fn new(child_id: impl Into<PartId>, quantity: impl Into<String>) -> Self {
        Self {
            child_id: child_id.into(),
            quantity: quantity.into(),
        }
    }
}

// Custom validation functions
fn validate_part_number(part_number: &str) -> Result<(), ValidationError> {
    if !is_valid_part_number(part_number) {
        return Err(ValidationError::new("invalid_part_number"));
    }
    Ok(())
}

/// Part numbers are non-blank and limited to alphanumerics plus `.`, `_`
/// and `-` separators, e.g. "MP0101" or "MP0370-004".
pub fn is_valid_part_number(part_number: &str) -> bool {
    let trimmed = part_number.trim();
    if trimmed.is_empty() || trimmed.len() > 100 {
        return false;
    }
    trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
}
