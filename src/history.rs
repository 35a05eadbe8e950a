//! Bounded, newest-first list of successful conversions

use crate::constants::HISTORY_LIMIT;
use chrono::{DateTime, Local};
use std::collections::VecDeque;

/// One successful conversion. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRecord {
    pub timestamp: DateTime<Local>,
    pub output: String,
}

impl ConversionRecord {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            output: output.into(),
        }
    }

    /// Label shown on the version strip, e.g. "14:03:27"
    pub fn label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

/// Version strip state. Index 0 is always the newest record.
#[derive(Debug, Clone)]
pub struct VersionHistory {
    records: VecDeque<ConversionRecord>,
    selected: Option<usize>,
    limit: usize,
}

impl Default for VersionHistory {
    fn default() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }
}

impl VersionHistory {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(limit),
            selected: None,
            limit: limit.max(1),
        }
    }

    /// Prepends a record, evicts the oldest beyond the limit and selects it.
    pub fn push(&mut self, record: ConversionRecord) {
        self.records.push_front(record);
        self.records.truncate(self.limit);
        self.selected = Some(0);
    }

    /// Selects record `index` and returns it; out-of-range leaves selection alone.
    pub fn select(&mut self, index: usize) -> Option<&ConversionRecord> {
        let record = self.records.get(index)?;
        self.selected = Some(index);
        Some(record)
    }

    #[cfg(test)]
    pub fn get(&self, index: usize) -> Option<&ConversionRecord> {
        self.records.get(index)
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversionRecord> {
        self.records.iter()
    }
}
