//! BOM Report Service
//!
//! Request validation, mode dispatch and error mapping around the traversal
//! engine. Stateless per call: the catalog handle is an explicit parameter
//! so concurrent sessions never share engine state.

use partline_models::{BomRelationsRequest, BomRequest, ReportMode, ReportRow};
use partline_utils::{validate_model, validate_part_number, PartlineResult};
use tracing::info;

use crate::catalog::CatalogSource;
use crate::flatten::flatten;
use crate::traversal;

#[derive(Clone, Default)]
pub struct BomReportService;

impl BomReportService {
    pub fn new() -> Self {
        Self
    }

    /// Basic expanded BOM report. `level` of 0 expands without bound.
    pub async fn expanded_bom(
        &self,
        catalog: &dyn CatalogSource,
        request: &BomRequest,
    ) -> PartlineResult<Vec<ReportRow>> {
        validate_model(request)?;
        validate_part_number(&request.part_number)?;

        let expansion = traversal::expand(catalog, &request.part_number, request.level).await?;
        info!(
            part_number = %request.part_number,
            level = request.level,
            rows = expansion.visits.len(),
            skipped = expansion.skipped.len(),
            "Expanded BOM report generated"
        );

        Ok(flatten(&expansion.visits, ReportMode::Basic))
    }

    /// Relations report: rows annotated with the discovering parent's part
    /// number. Depth is validated to the interactive window [1, 3];
    /// out-of-range values are rejected, not clamped.
    pub async fn relations_bom(
        &self,
        catalog: &dyn CatalogSource,
        request: &BomRelationsRequest,
    ) -> PartlineResult<Vec<ReportRow>> {
        validate_model(request)?;
        validate_part_number(&request.part_number)?;

        let expansion = traversal::expand(catalog, &request.part_number, request.max_levels).await?;
        info!(
            part_number = %request.part_number,
            max_levels = request.max_levels,
            rows = expansion.visits.len(),
            skipped = expansion.skipped.len(),
            "Relations BOM report generated"
        );

        Ok(flatten(&expansion.visits, ReportMode::Relations))
    }
}
