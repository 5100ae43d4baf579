//! BOM traversal engine
//!
//! Bounded-depth pre-order expansion of a part structure. The walk is
//! driven by an explicit work stack rather than recursion so the cycle
//! guard is visible state and deep structures cannot exhaust the call
//! stack. Each visit carries the quantity of the edge that discovered it;
//! quantities are never accumulated across levels.

use std::collections::HashSet;

use partline_models::{Part, PartId};
use partline_utils::{PartlineError, PartlineResult};
use tracing::{debug, warn};

use crate::catalog::CatalogSource;

/// One traversal step's captured part data.
///
/// Created when the engine visits a node, appended to the output sequence
/// and never mutated afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    pub part: Part,
    /// Distance in edge-hops from the root; the root is 0.
    pub level: u32,
    /// Quantity supplied by the edge that discovered this part. The root
    /// has no incoming edge and defaults to "1".
    pub quantity: String,
    /// Id of the part whose edge discovered this one; None for the root.
    pub parent: Option<PartId>,
    /// True when this part already appears on the active root-to-node path
    /// and the branch was truncated here to guarantee termination.
    pub cycle: bool,
}

/// A child edge dropped from the report because its remote lookup failed.
#[derive(Debug, Clone)]
pub struct SkippedChild {
    pub part_id: PartId,
    pub parent_id: PartId,
    pub reason: String,
}

/// Result of expanding a root part.
#[derive(Debug)]
pub struct BomExpansion {
    /// Visits in pre-order: every part precedes its descendants, and
    /// siblings keep the order the catalog returned their edges in.
    pub visits: Vec<Visit>,
    /// Children skipped due to per-edge remote failures. A skip never
    /// aborts the traversal; siblings still appear.
    pub skipped: Vec<SkippedChild>,
}

enum Work {
    Visit {
        id: PartId,
        level: u32,
        quantity: String,
        parent: Option<PartId>,
    },
    Leave(PartId),
}

/// Expands the BOM of `root_part_number` up to `max_depth` edge-hops.
///
/// `max_depth` of 0 means unbounded: expansion continues until there are no
/// more children or the cycle guard truncates a branch. An unresolvable
/// root fails with a not-found error; all per-child failures degrade to a
/// partial result.
pub async fn expand(
    catalog: &dyn CatalogSource,
    root_part_number: &str,
    max_depth: u32,
) -> PartlineResult<BomExpansion> {
    let root = catalog
        .get_part(root_part_number.trim())
        .await
        .map_err(|e| {
            warn!(part_number = root_part_number, error = %e, "Root part lookup failed");
            PartlineError::not_found(format!("Part {}", root_part_number))
        })?
        .ok_or_else(|| PartlineError::not_found(format!("Part {}", root_part_number)))?;

    let mut visits: Vec<Visit> = Vec::new();
    let mut skipped: Vec<SkippedChild> = Vec::new();
    // Ids on the active root-to-node path. Not a global visited set:
    // diamond re-visits from different parents are legitimate output.
    let mut path: HashSet<PartId> = HashSet::new();
    let mut stack: Vec<Work> = vec![Work::Visit {
        id: root.id.clone(),
        level: 0,
        quantity: "1".to_string(),
        parent: None,
    }];

    while let Some(work) = stack.pop() {
        let (id, level, quantity, parent) = match work {
            Work::Leave(id) => {
                path.remove(&id);
                continue;
            }
            Work::Visit {
                id,
                level,
                quantity,
                parent,
            } => (id, level, quantity, parent),
        };

        let part = match catalog.get_part_by_id(&id).await {
            Ok(part) => part,
            Err(e) => match parent {
                // Skip-and-continue applies to child edges only; without a
                // root there is no partial report to return.
                None => return Err(e),
                Some(parent_id) => {
                    warn!(part_id = %id, parent_id = %parent_id, error = %e, "Skipping child: detail fetch failed");
                    skipped.push(SkippedChild {
                        part_id: id,
                        parent_id,
                        reason: e.to_string(),
                    });
                    continue;
                }
            },
        };

        let on_path = path.contains(&id);
        visits.push(Visit {
            part,
            level,
            quantity,
            parent,
            cycle: on_path,
        });

        if on_path {
            debug!(part_id = %id, level, "Cycle detected, truncating branch");
            continue;
        }
        if max_depth != 0 && level >= max_depth {
            continue;
        }

        let edges = match catalog.get_child_relationships(&id).await {
            Ok(edges) => edges,
            Err(e) => {
                warn!(part_id = %id, error = %e, "Skipping children: relationship fetch failed");
                skipped.push(SkippedChild {
                    part_id: id.clone(),
                    parent_id: id,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        if edges.is_empty() {
            continue;
        }

        path.insert(id.clone());
        stack.push(Work::Leave(id.clone()));
        // Reversed so the stack pops children in catalog order.
        for edge in edges.into_iter().rev() {
            stack.push(Work::Visit {
                id: edge.child_id,
                level: level + 1,
                quantity: edge.quantity,
                parent: Some(id.clone()),
            });
        }
    }

    debug!(
        root = root_part_number,
        visits = visits.len(),
        skipped = skipped.len(),
        "BOM expansion complete"
    );

    Ok(BomExpansion { visits, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::MockCatalog;
    use partline_models::Part;
    use proptest::prelude::*;

    fn part(id: &str, number: &str, name: &str) -> Part {
        Part::new(id, number, name)
            .with_state("Released")
            .with_classification("Part")
    }

    /// Root MP0101 -> MP2942 (qty 2) -> MP2667 (qty 1)
    ///             -> MP2941 (qty 1)
    fn sample_catalog() -> MockCatalog {
        let mut catalog = MockCatalog::new();
        catalog
            .add_part(part("id-0101", "MP0101", "Main Part MP0101").with_classification("Assembly"))
            .add_part(part("id-2942", "MP2942", "Motor Part"))
            .add_part(part("id-2941", "MP2941", "Control Unit"))
            .add_part(part("id-2667", "MP2667", "Motor Housing"));
        catalog
            .link("id-0101", "id-2942", "2")
            .link("id-0101", "id-2941", "1")
            .link("id-2942", "id-2667", "1");
        catalog
    }

    fn numbers(expansion: &BomExpansion) -> Vec<(u32, String, String)> {
        expansion
            .visits
            .iter()
            .map(|v| (v.level, v.part.part_number.clone(), v.quantity.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_root_not_found() {
        let catalog = MockCatalog::new();
        let result = expand(&catalog, "MP9999", 0).await;
        assert!(matches!(result, Err(PartlineError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_root_without_children_yields_single_visit() {
        let mut catalog = MockCatalog::new();
        catalog.add_part(part("id-1", "MP0001", "Lone Part"));

        let expansion = expand(&catalog, "MP0001", 0).await.unwrap();
        assert_eq!(expansion.visits.len(), 1);
        let root = &expansion.visits[0];
        assert_eq!(root.level, 0);
        assert_eq!(root.quantity, "1");
        assert_eq!(root.parent, None);
        assert!(!root.cycle);
    }

    #[tokio::test]
    async fn test_worked_example_depth_two() {
        let catalog = sample_catalog();
        let expansion = expand(&catalog, "MP0101", 2).await.unwrap();

        assert_eq!(
            numbers(&expansion),
            vec![
                (0, "MP0101".to_string(), "1".to_string()),
                (1, "MP2942".to_string(), "2".to_string()),
                (2, "MP2667".to_string(), "1".to_string()),
                (1, "MP2941".to_string(), "1".to_string()),
            ]
        );
        assert!(expansion.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_worked_example_depth_one_omits_grandchild() {
        let catalog = sample_catalog();
        let expansion = expand(&catalog, "MP0101", 1).await.unwrap();

        assert_eq!(
            numbers(&expansion),
            vec![
                (0, "MP0101".to_string(), "1".to_string()),
                (1, "MP2942".to_string(), "2".to_string()),
                (1, "MP2941".to_string(), "1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_depth_zero_is_unbounded() {
        let catalog = sample_catalog();
        let expansion = expand(&catalog, "MP0101", 0).await.unwrap();
        assert_eq!(expansion.visits.len(), 4);
        assert_eq!(expansion.visits[2].part.part_number, "MP2667");
    }

    #[tokio::test]
    async fn test_child_levels_are_parent_level_plus_one() {
        let catalog = sample_catalog();
        let expansion = expand(&catalog, "MP0101", 0).await.unwrap();

        for (i, visit) in expansion.visits.iter().enumerate() {
            match &visit.parent {
                None => assert_eq!(visit.level, 0),
                Some(parent_id) => {
                    // Pre-order: the discovering parent appears earlier.
                    let parent = expansion.visits[..i]
                        .iter()
                        .rfind(|v| &v.part.id == parent_id)
                        .expect("parent visit precedes child");
                    assert_eq!(visit.level, parent.level + 1);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_diamond_child_appears_once_per_parent() {
        let mut catalog = MockCatalog::new();
        catalog
            .add_part(part("id-root", "AS0001", "Assembly").with_classification("Assembly"))
            .add_part(part("id-l", "SA0001", "Left Subassembly"))
            .add_part(part("id-r", "SA0002", "Right Subassembly"))
            .add_part(part("id-shared", "HW0001", "Shared Screw"));
        catalog
            .link("id-root", "id-l", "1")
            .link("id-root", "id-r", "1")
            .link("id-l", "id-shared", "4")
            .link("id-r", "id-shared", "8");

        let expansion = expand(&catalog, "AS0001", 0).await.unwrap();
        let shared: Vec<&Visit> = expansion
            .visits
            .iter()
            .filter(|v| v.part.part_number == "HW0001")
            .collect();

        assert_eq!(shared.len(), 2);
        // Each occurrence keeps its own edge's quantity; nothing overwrites.
        assert_eq!(shared[0].quantity, "4");
        assert_eq!(shared[0].parent, Some(PartId::new("id-l")));
        assert_eq!(shared[1].quantity, "8");
        assert_eq!(shared[1].parent, Some(PartId::new("id-r")));
    }

    #[tokio::test]
    async fn test_cycle_terminates_and_flags_leaf() {
        let mut catalog = MockCatalog::new();
        catalog
            .add_part(part("id-a", "CY0001", "Part A"))
            .add_part(part("id-b", "CY0002", "Part B"));
        catalog.link("id-a", "id-b", "1").link("id-b", "id-a", "1");

        let expansion = expand(&catalog, "CY0001", 0).await.unwrap();

        // A, B, then A again as a flagged terminal leaf.
        assert_eq!(expansion.visits.len(), 3);
        assert_eq!(expansion.visits[2].part.part_number, "CY0001");
        assert!(expansion.visits[2].cycle);
        assert!(!expansion.visits[0].cycle);
        assert!(!expansion.visits[1].cycle);
    }

    #[tokio::test]
    async fn test_self_referencing_part_terminates() {
        let mut catalog = MockCatalog::new();
        catalog.add_part(part("id-a", "CY0003", "Self Part"));
        catalog.link("id-a", "id-a", "1");

        let expansion = expand(&catalog, "CY0003", 0).await.unwrap();
        assert_eq!(expansion.visits.len(), 2);
        assert!(expansion.visits[1].cycle);
    }

    #[tokio::test]
    async fn test_failed_child_is_skipped_but_siblings_survive() {
        let mut catalog = sample_catalog();
        catalog.fail_part("id-2942");

        let expansion = expand(&catalog, "MP0101", 0).await.unwrap();

        let visited: Vec<&str> = expansion
            .visits
            .iter()
            .map(|v| v.part.part_number.as_str())
            .collect();
        assert_eq!(visited, vec!["MP0101", "MP2941"]);
        assert_eq!(expansion.skipped.len(), 1);
        assert_eq!(expansion.skipped[0].part_id, PartId::new("id-2942"));
        assert_eq!(expansion.skipped[0].parent_id, PartId::new("id-0101"));
    }

    #[tokio::test]
    async fn test_failed_relationship_fetch_keeps_node_as_leaf() {
        let mut catalog = sample_catalog();
        catalog.fail_relationships("id-2942");

        let expansion = expand(&catalog, "MP0101", 0).await.unwrap();

        let visited: Vec<&str> = expansion
            .visits
            .iter()
            .map(|v| v.part.part_number.as_str())
            .collect();
        // MP2942 still appears; only its subtree is lost.
        assert_eq!(visited, vec!["MP0101", "MP2942", "MP2941"]);
        assert_eq!(expansion.skipped.len(), 1);
    }

    #[tokio::test]
    async fn test_root_detail_failure_aborts() {
        let mut catalog = sample_catalog();
        catalog.fail_part("id-0101");

        let result = expand(&catalog, "MP0101", 0).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_part_number_is_trimmed_for_lookup() {
        let catalog = sample_catalog();
        let expansion = expand(&catalog, "  MP0101  ", 1).await.unwrap();
        assert_eq!(expansion.visits[0].part.part_number, "MP0101");
    }

    // Property-based checks over randomly shaped part forests.

    /// A forest description: node i's children are given by edges (i, j)
    /// with j > i, which guarantees an acyclic structure.
    fn arb_tree() -> impl Strategy<Value = Vec<(usize, usize)>> {
        prop::collection::vec((0usize..12, 1usize..13), 0..24).prop_map(|pairs| {
            pairs
                .into_iter()
                .filter(|(parent, child)| child > parent)
                .collect()
        })
    }

    fn build_catalog(edges: &[(usize, usize)]) -> MockCatalog {
        let mut catalog = MockCatalog::new();
        for i in 0..13 {
            catalog.add_part(part(
                &format!("id-{}", i),
                &format!("PN{:04}", i),
                &format!("Part {}", i),
            ));
        }
        for (parent, child) in edges {
            catalog.link(
                &format!("id-{}", parent),
                &format!("id-{}", child),
                &format!("{}", (parent + child) % 9 + 1),
            );
        }
        catalog
    }

    proptest! {
        /// No visit ever exceeds a positive depth bound.
        #[test]
        fn prop_depth_bound_holds(edges in arb_tree(), max_depth in 1u32..5) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let catalog = build_catalog(&edges);
            let expansion = rt.block_on(expand(&catalog, "PN0000", max_depth)).unwrap();
            for visit in &expansion.visits {
                prop_assert!(visit.level <= max_depth);
            }
        }

        /// Pre-order: every non-root visit's discovering parent appears
        /// earlier with level exactly one less.
        #[test]
        fn prop_pre_order(edges in arb_tree()) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let catalog = build_catalog(&edges);
            let expansion = rt.block_on(expand(&catalog, "PN0000", 0)).unwrap();
            for (i, visit) in expansion.visits.iter().enumerate() {
                if let Some(parent_id) = &visit.parent {
                    let found = expansion.visits[..i]
                        .iter()
                        .any(|v| &v.part.id == parent_id && v.level + 1 == visit.level);
                    prop_assert!(found);
                }
            }
        }

        /// Unbounded expansion terminates even when extra back-edges are
        /// layered on top of the forest.
        #[test]
        fn prop_cycles_terminate(
            edges in arb_tree(),
            back_edges in prop::collection::vec((0usize..13, 0usize..13), 0..6)
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let mut catalog = build_catalog(&edges);
            for (from, to) in &back_edges {
                catalog.link(&format!("id-{}", from), &format!("id-{}", to), "1");
            }
            let expansion = rt.block_on(expand(&catalog, "PN0000", 0)).unwrap();
            // Any single root-to-visit path stays duplicate-free: a flagged
            // revisit is never descended into.
            for visit in &expansion.visits {
                if visit.cycle {
                    prop_assert!(visit.level > 0);
                }
            }
        }
    }
}
