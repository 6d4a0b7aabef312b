//! Descendant discovery.
//!
//! Operating systems do not keep ancestry reliably once a parent exits, so the
//! tree is rebuilt from a flat (pid, parent pid) snapshot each time it is
//! needed. The result is stale the moment it is returned; callers accept that.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::domain::ProcessRecord;
use crate::error::SnapshotError;
use crate::ports::ProcessTable;

/// Take one snapshot and return every descendant of `root`.
///
/// The result is in breadth-first order (children before grandchildren) and
/// never contains `root` itself.
pub fn descendants_of<T>(table: &T, root: u32) -> Result<Vec<u32>, SnapshotError>
where
    T: ProcessTable + ?Sized,
{
    let records = table.snapshot()?.collect::<Result<Vec<_>, _>>()?;
    Ok(resolve_descendants(records, root))
}

/// Compute the descendants of `root` from an in-memory set of records.
///
/// A record is included when its parent chain reaches `root`, whether or not
/// the intermediate parents (or `root`) appear as records themselves. Each pid
/// is visited at most once, so cycles and self-parenting entries terminate.
pub fn resolve_descendants<I>(records: I, root: u32) -> Vec<u32>
where
    I: IntoIterator<Item = ProcessRecord>,
{
    let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
    for record in records {
        // Windows reports the idle process as its own parent
        if record.pid == record.parent_pid {
            continue;
        }
        children.entry(record.parent_pid).or_default().push(record.pid);
    }

    let mut visited = HashSet::from([root]);
    let mut descendants = Vec::new();
    let mut queue = VecDeque::from([root]);

    while let Some(parent) = queue.pop_front() {
        let Some(kids) = children.get(&parent) else {
            continue;
        };
        for &child in kids {
            if visited.insert(child) {
                descendants.push(child);
                queue.push_back(child);
            }
        }
    }

    descendants
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeProcessTable;

    fn records(pairs: &[(u32, u32)]) -> Vec<ProcessRecord> {
        pairs
            .iter()
            .map(|&(pid, parent)| ProcessRecord::new(pid, parent))
            .collect()
    }

    #[test]
    fn test_three_level_tree() {
        let snapshot = records(&[(100, 1), (101, 100), (102, 100), (103, 102), (200, 1)]);
        assert_eq!(resolve_descendants(snapshot, 100), vec![101, 102, 103]);
    }

    #[test]
    fn test_root_is_never_included() {
        // 100 -> 101 -> 100 would put the root back into its own tree
        let snapshot = records(&[(100, 101), (101, 100)]);
        assert_eq!(resolve_descendants(snapshot, 100), vec![101]);
    }

    #[test]
    fn test_missing_parent_records_still_chain_to_root() {
        // Neither 100 nor 102 is in the snapshot (exited), but 103's chain reaches 100
        let snapshot = records(&[(102, 100), (103, 102), (300, 299)]);
        assert_eq!(resolve_descendants(snapshot, 100), vec![102, 103]);

        let snapshot = records(&[(103, 102)]);
        assert!(resolve_descendants(snapshot, 100).is_empty());
    }

    #[test]
    fn test_cycle_terminates() {
        let snapshot = records(&[(101, 100), (102, 101), (103, 102), (101, 103), (0, 0)]);
        assert_eq!(resolve_descendants(snapshot, 100), vec![101, 102, 103]);
        assert!(resolve_descendants(records(&[(0, 0)]), 0).is_empty());
    }

    #[test]
    fn test_duplicate_records_reported_once() {
        let snapshot = records(&[(101, 100), (101, 100), (102, 101)]);
        assert_eq!(resolve_descendants(snapshot, 100), vec![101, 102]);
    }

    #[test]
    fn test_deep_chain() {
        let snapshot: Vec<_> = (1..=10_000u32)
            .map(|pid| ProcessRecord::new(pid, pid - 1))
            .collect();
        let descendants = resolve_descendants(snapshot, 0);
        assert_eq!(descendants.len(), 10_000);
        assert_eq!(descendants.first(), Some(&1));
        assert_eq!(descendants.last(), Some(&10_000));
    }

    #[test]
    fn test_descendants_of_uses_table_snapshot() {
        let table = FakeProcessTable::with_tree(&[(100, 1), (101, 100), (102, 100), (103, 102)]);
        assert_eq!(descendants_of(&table, 100).unwrap(), vec![101, 102, 103]);
        assert_eq!(table.snapshots_taken(), 1);
    }

    #[test]
    fn test_descendants_of_surfaces_snapshot_errors() {
        let table = FakeProcessTable::with_tree(&[(101, 100)]);
        table.fail_snapshot();
        assert!(descendants_of(&table, 100).is_err());

        let table = FakeProcessTable::with_tree(&[(101, 100), (102, 100)]);
        table.fail_snapshot_after(1);
        assert!(descendants_of(&table, 100).is_err());
    }
}
