//! Ordered, id-deduplicated record collection.

use std::collections::HashMap;

use super::record::SyncRecord;

/// Counts produced by [`RecordSet::merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Records whose id was not present before.
    pub inserted: usize,
    /// Records that overwrote an existing entry with the same id.
    pub replaced: usize,
}

impl MergeStats {
    /// `true` if the merge changed nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inserted == 0 && self.replaced == 0
    }
}

/// Collection holding at most one record per id.
///
/// Arrival order is preserved: a record keeps the position where its id
/// was first seen, and a later record with the same id replaces it in
/// place (last write wins).
#[derive(Debug, Clone)]
pub struct RecordSet<R> {
    records: Vec<R>,
    index: HashMap<i64, usize>,
}

impl<R> Default for RecordSet<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<R: SyncRecord> RecordSet<R> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from a full snapshot, collapsing duplicate ids.
    #[must_use]
    pub fn from_batch(batch: Vec<R>) -> Self {
        let mut set = Self::new();
        let _ = set.merge(batch);
        set
    }

    /// Merges `batch` into the set.
    pub fn merge(&mut self, batch: Vec<R>) -> MergeStats {
        let mut stats = MergeStats::default();
        for record in batch {
            let id = record.id();
            match self.index.get(&id).copied() {
                Some(pos) => {
                    if let Some(slot) = self.records.get_mut(pos) {
                        *slot = record;
                        stats.replaced += 1;
                    }
                }
                None => {
                    self.index.insert(id, self.records.len());
                    self.records.push(record);
                    stats.inserted += 1;
                }
            }
        }
        stats
    }

    /// Looks a record up by id.
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&R> {
        self.index.get(&id).and_then(|&pos| self.records.get(pos))
    }

    /// `true` if a record with `id` is present.
    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` if the set holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in arrival order.
    #[must_use]
    pub fn as_slice(&self) -> &[R] {
        &self.records
    }

    /// Iterates records in arrival order.
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    /// Consumes the set, returning the records in arrival order.
    #[must_use]
    pub fn into_vec(self) -> Vec<R> {
        self.records
    }
}

impl<R: PartialEq> PartialEq for RecordSet<R> {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl<'a, R: SyncRecord> IntoIterator for &'a RecordSet<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::record::AttendanceRecord;

    fn rec(id: i64, name: &str) -> AttendanceRecord {
        AttendanceRecord {
            id,
            fullname: Some(name.to_string()),
            bsguid: None,
            carduid: None,
            event: None,
            location: None,
            date_time: None,
            exit_status: None,
            exit_time: None,
        }
    }

    fn ids(set: &RecordSet<AttendanceRecord>) -> Vec<i64> {
        set.iter().map(|r| r.id).collect()
    }

    #[test]
    fn from_batch_collapses_duplicates() {
        let set = RecordSet::from_batch(vec![rec(1, "a"), rec(2, "b"), rec(1, "a2")]);
        assert_eq!(ids(&set), vec![1, 2]);
        assert_eq!(set.get(1).and_then(|r| r.fullname.as_deref()), Some("a2"));
    }

    #[test]
    fn merge_inserts_and_replaces() {
        let mut set = RecordSet::from_batch(vec![rec(1, "a"), rec(2, "b"), rec(3, "c")]);
        let stats = set.merge(vec![rec(3, "c2"), rec(4, "d")]);
        assert_eq!(stats, MergeStats { inserted: 1, replaced: 1 });
        assert_eq!(ids(&set), vec![1, 2, 3, 4]);
        assert_eq!(set.get(3).and_then(|r| r.fullname.as_deref()), Some("c2"));
    }

    #[test]
    fn repeated_merges_keep_one_record_per_id() {
        let mut set = RecordSet::new();
        for round in 0..5 {
            let _ = set.merge(vec![rec(1, "x"), rec(2, "y"), rec(round, "z")]);
        }
        assert_eq!(set.len(), 5);
        let mut seen = ids(&set);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), set.len());
    }

    #[test]
    fn empty_merge_is_noop() {
        let mut set = RecordSet::from_batch(vec![rec(1, "a")]);
        let before = set.clone();
        let stats = set.merge(Vec::new());
        assert!(stats.is_empty());
        assert_eq!(set, before);
    }

    #[test]
    fn contains_and_len() {
        let set = RecordSet::from_batch(vec![rec(9, "a")]);
        assert!(set.contains(9));
        assert!(!set.contains(10));
        assert_eq!(set.len(), 1);
        assert!(!set.is_empty());
        assert!(RecordSet::<AttendanceRecord>::new().is_empty());
    }
}
