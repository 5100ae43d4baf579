//! # Partline Core Domain Models
//!
//! This module contains the core domain models for the Partline BOM report
//! system. All models implement serialization/deserialization with serde and
//! validation with the validator crate.
//!
//! ## Key Models
//!
//! - **Part**: a part as read from the PLM catalog, keyed by an opaque
//!   catalog id plus a human-facing part number
//! - **BomEdge**: a directed parent-to-child relationship carrying the
//!   edge's quantity as an opaque string
//! - **BomRequest / BomRelationsRequest**: report request payloads with
//!   part-number and depth validation
//! - **ReportRow**: one row of the leveled, pre-order BOM report
//!
//! The report engine treats all of these as read-only values: parts are
//! never mutated, and rows are appended in traversal order and never
//! reordered here (sorting and pagination are presentation concerns).

pub mod part;
pub mod report;


pub use part::*;
pub use report::*;
