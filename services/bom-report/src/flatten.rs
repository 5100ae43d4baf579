//! Report flattener
//!
//! Converts the traversal's visit records into the leveled report rows the
//! response layer serializes. Rows keep traversal order; sorting, filtering
//! and pagination are presentation concerns applied downstream.

use std::collections::HashMap;

use partline_models::{PartId, ReportMode, ReportRow};

use crate::traversal::Visit;

/// Flattens visits into report rows for the requested mode.
///
/// In `Relations` mode each row carries the part number of the parent that
/// discovered it, resolved from earlier visits (pre-order guarantees the
/// parent row was emitted first); the root row's parent is the empty string.
pub fn flatten(visits: &[Visit], mode: ReportMode) -> Vec<ReportRow> {
    let mut rows = Vec::with_capacity(visits.len());
    let mut numbers_by_id: HashMap<PartId, String> = HashMap::new();

    for visit in visits {
        let parent_part_number = match mode {
            ReportMode::Basic => None,
            ReportMode::Relations => Some(
                visit
                    .parent
                    .as_ref()
                    .and_then(|parent_id| numbers_by_id.get(parent_id))
                    .cloned()
                    .unwrap_or_default(),
            ),
        };

        numbers_by_id.insert(visit.part.id.clone(), visit.part.part_number.clone());

        rows.push(ReportRow {
            level: visit.level,
            name: visit.part.name.clone(),
            part_number: visit.part.part_number.clone(),
            quantity: visit.quantity.clone(),
            revision: visit.part.revision.clone(),
            state: visit.part.state.clone(),
            part_type: visit.part.classification.clone(),
            parent_part_number,
        });
    }

    rows
}
