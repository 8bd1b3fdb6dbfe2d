//! Denied-records view: reason catalogue and search.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::entry::DEFAULT_DENIAL_REASON;
use crate::domain::DenialRecord;

/// Reason value that disables reason filtering.
pub const ALL_REASONS: &str = "ALL";

/// Reason of a denial, with the placeholder for a missing one.
#[must_use]
pub fn reason_of(record: &DenialRecord) -> &str {
    record.denial_reason.as_deref().unwrap_or(DEFAULT_DENIAL_REASON)
}

/// Reason dropdown and counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DenialReasons {
    /// `ALL` followed by the distinct reasons, sorted.
    pub reasons: Vec<String>,
    /// Number of denials.
    pub total: usize,
    /// Denials per reason.
    pub counts: BTreeMap<String, usize>,
}

impl DenialReasons {
    /// Collects the reasons of `records`.
    #[must_use]
    pub fn collect(records: &[DenialRecord]) -> Self {
        let mut counts = BTreeMap::new();
        for record in records {
            *counts.entry(reason_of(record).to_string()).or_insert(0) += 1;
        }
        let reasons = std::iter::once(ALL_REASONS.to_string())
            .chain(counts.keys().cloned())
            .collect();
        Self {
            reasons,
            total: records.len(),
            counts,
        }
    }

    /// Count for `reason`; `ALL` gives the total.
    #[must_use]
    pub fn count_for(&self, reason: &str) -> usize {
        if reason == ALL_REASONS {
            self.total
        } else {
            self.counts.get(reason).copied().unwrap_or_default()
        }
    }
}

/// Search over denials.
#[derive(Debug, Clone, Default)]
pub struct DenialQuery<'a> {
    /// Exact reason; `None` or `ALL` matches every reason.
    pub reason: Option<&'a str>,
    /// Case-insensitive substring of name, uid or location.
    pub text: Option<&'a str>,
}

impl DenialQuery<'_> {
    /// `true` when `record` passes both criteria.
    #[must_use]
    pub fn matches(&self, record: &DenialRecord) -> bool {
        self.matches_reason(record) && self.matches_text(record)
    }

    fn matches_reason(&self, record: &DenialRecord) -> bool {
        match self.reason.map(str::trim) {
            None | Some("" | ALL_REASONS) => true,
            Some(reason) => reason_of(record) == reason,
        }
    }

    fn matches_text(&self, record: &DenialRecord) -> bool {
        let Some(text) = self.text.map(str::trim).filter(|t| !t.is_empty()) else {
            return true;
        };
        let needle = text.to_lowercase();
        [&record.full_name, &record.bsguid, &record.location]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Matching denials, latest arrival first.
    #[must_use]
    pub fn apply(&self, records: &[DenialRecord]) -> Vec<DenialRecord> {
        records
            .iter()
            .rev()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}
