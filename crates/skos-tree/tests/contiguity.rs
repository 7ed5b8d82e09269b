//! Structural invariants of the row sequence under random toggling

use proptest::prelude::*;
use skos_index::NodeIndex;
use skos_model::ChildOrder;
use skos_test_utils::deep_repository;
use skos_tree::{FlatRow, TreeDataSource};
use std::sync::Arc;

/// Every row deeper than its predecessor must be a direct child of an
/// expanded predecessor, and every expanded row must be followed by exactly
/// its known children at the next level.
fn check_contiguous(tree: &TreeDataSource) -> Result<(), TestCaseError> {
    let rows: Vec<FlatRow> = tree.rows();
    let index = tree.index();

    if let Some(first) = rows.first() {
        prop_assert_eq!(first.level, 0);
    }

    for (i, pair) in rows.windows(2).enumerate() {
        let (row, next) = (&pair[0], &pair[1]);
        prop_assert!(next.level <= row.level + 1, "level jump after row {}", i);
        if next.level == row.level + 1 {
            prop_assert!(row.is_expanded(), "child under non-expanded row {}", i);
        }
    }

    for (i, row) in rows.iter().enumerate() {
        if !row.is_expanded() {
            continue;
        }
        let children: Vec<_> = rows[i + 1..]
            .iter()
            .take_while(|r| r.level > row.level)
            .filter(|r| r.level == row.level + 1)
            .map(|r| r.item.clone())
            .collect();

        let mut expected = index.child_list(&row.item).unwrap_or_default();
        expected.sort();
        prop_assert_eq!(children, expected);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn rows_stay_contiguous(ops in prop::collection::vec((any::<prop::sample::Index>(), any::<bool>()), 1..40)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let index = Arc::new(NodeIndex::new(Arc::new(deep_repository(3, 3))));
            let roots = index.load_roots().await.unwrap();
            let tree = TreeDataSource::with_order(index, ChildOrder::UriAscending);
            tree.set_roots(roots);

            for (pick, expand) in ops {
                let rows = tree.rows();
                let row = &rows[pick.index(rows.len())];
                tree.toggle(row.id, expand).await.unwrap();
                check_contiguous(&tree)?;
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn expand_only_sequences_stay_contiguous(picks in prop::collection::vec(any::<prop::sample::Index>(), 1..30)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let index = Arc::new(NodeIndex::new(Arc::new(deep_repository(2, 4))));
            let roots = index.load_roots().await.unwrap();
            let tree = TreeDataSource::new(index);
            tree.set_roots(roots);

            for pick in picks {
                let rows = tree.rows();
                let row = &rows[pick.index(rows.len())];
                tree.toggle(row.id, true).await.unwrap();
                check_contiguous(&tree)?;
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}
