//! BOM report request and response models.
//!
//! These are the wire shapes exchanged with the report frontend, so the
//! serde names are camelCase to match its column accessors.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Report variant selected by the caller.
///
/// `Basic` honors the caller-supplied depth (0 = unbounded). `Relations`
/// additionally carries the parent part number per row and is depth-capped
/// to a small bound because its output feeds interactive display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportMode {
    Basic,
    Relations,
}

/// Request for a basic expanded BOM report.
///
/// `level` of 0 means "expand until no more children"; any positive value
/// bounds the number of edge-hops from the root inclusively.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BomRequest {
    #[validate(length(min = 1, max = 100, message = "Part number must be between 1 and 100 characters"))]
    pub part_number: String,
    #[serde(default)]
    pub level: u32,
}

/// Request for a relations report (rows annotated with parent part number).
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BomRelationsRequest {
    #[validate(length(min = 1, max = 100, message = "Part number must be between 1 and 100 characters"))]
    pub part_number: String,
    #[validate(range(min = 1, max = 3, message = "maxLevels must be between 1 and 3"))]
    pub max_levels: u32,
}

/// One row of the leveled BOM report, in traversal (pre-order) order.
///
/// `parent_part_number` is present in Relations mode only and empty for the
/// root row. Quantity is the opaque display value carried by the edge that
/// discovered the row's part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub level: u32,
    pub name: String,
    pub part_number: String,
    pub quantity: String,
    pub revision: String,
    pub state: String,
    #[serde(rename = "type")]
    pub part_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_part_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_bom_request_level_defaults_to_unbounded() {
        let request: BomRequest = serde_json::from_str(r#"{"partNumber":"MP0101"}"#).unwrap();
        assert_eq!(request.level, 0);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_bom_request_rejects_blank_part_number() {
        let request = BomRequest {
            part_number: String::new(),
            level: 0,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_relations_request_depth_bounds() {
        for max_levels in 1..=3 {
            let request = BomRelationsRequest {
                part_number: "MP0101".to_string(),
                max_levels,
            };
            assert!(request.validate().is_ok());
        }

        for max_levels in [0, 4, 10] {
            let request = BomRelationsRequest {
                part_number: "MP0101".to_string(),
                max_levels,
            };
            assert!(request.validate().is_err(), "maxLevels {} should be rejected", max_levels);
        }
    }

    #[test]
    fn test_report_row_serializes_frontend_field_names() {
        let row = ReportRow {
            level: 1,
            name: "Motor Part".to_string(),
            part_number: "MP2942".to_string(),
            quantity: "2".to_string(),
            revision: "B".to_string(),
            state: "Released".to_string(),
            part_type: "Part".to_string(),
            parent_part_number: None,
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["partNumber"], "MP2942");
        assert_eq!(json["type"], "Part");
        assert_eq!(json["quantity"], "2");
        assert!(json.get("parentPartNumber").is_none());
    }

    #[test]
    fn test_report_row_relations_root_has_empty_parent() {
        let row = ReportRow {
            level: 0,
            name: "Main Assembly".to_string(),
            part_number: "MP0101".to_string(),
            quantity: "1".to_string(),
            revision: "A".to_string(),
            state: "Released".to_string(),
            part_type: "Assembly".to_string(),
            parent_part_number: Some(String::new()),
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["parentPartNumber"], "");
    }
}
