//! Assertion helpers for inspecting a [`TestRoot`](crate::TestRoot).

use crate::TestRoot;
use sprig_core::MutationRecord;

/// Assert that the root's whole text content equals `expected`.
pub fn assert_text(root: &TestRoot, expected: &str) {
    let actual = root.text();
    assert_eq!(
        actual,
        expected,
        "text mismatch, tree:\n{}",
        root.dump_tree()
    );
}

/// Assert that a list contains a specific text fragment.
pub fn assert_contains_text(texts: &[String], fragment: &str, msg: &str) {
    assert!(
        texts.iter().any(|t| t.contains(fragment)),
        "{}: text '{}' not found in {:?}",
        msg,
        fragment,
        texts
    );
}

/// Assert that nothing was written to the live tree since the mutation log
/// was last drained.
pub fn assert_no_mutations(root: &mut TestRoot, msg: &str) {
    let records = root.take_mutations();
    assert!(records.is_empty(), "{}: unexpected mutations {:?}", msg, records);
}

/// Counts structural (`childList`) records among `records`.
pub fn child_list_count(records: &[MutationRecord]) -> usize {
    records
        .iter()
        .filter(|record| matches!(record, MutationRecord::ChildList { .. }))
        .count()
}
