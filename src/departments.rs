//! Canonical department names.
//!
//! The warehouse and the booking API identify restaurants by numeric id, the
//! sales store by free text that drifts over time ("CS Aarhus", "Aarhus ",
//! "Creative Space Aarhus"). Every adapter funnels its keys through one
//! [`DepartmentDirectory`] so comparison tables line up across sources.

use std::collections::HashMap;

use crate::config::DepartmentEntry;

/// Placeholder name for ids missing from the directory.
pub const UNKNOWN_DEPARTMENT: &str = "Unknown";

#[derive(Debug, Clone, Default)]
pub struct DepartmentDirectory {
    entries: Vec<DepartmentEntry>,
    by_id: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
}

impl DepartmentDirectory {
    pub fn new(entries: &[DepartmentEntry]) -> Self {
        let mut by_id = HashMap::new();
        let mut by_alias = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            by_id.insert(entry.id.trim().to_string(), idx);
            by_alias.insert(fold(&entry.name), idx);
            for alias in &entry.aliases {
                by_alias.insert(fold(alias), idx);
            }
        }
        Self {
            entries: entries.to_vec(),
            by_id,
            by_alias,
        }
    }

    /// Canonical name for a free-text department, or the trimmed input when
    /// no entry claims it.
    pub fn canonical_name(&self, raw: &str) -> String {
        match self.by_alias.get(&fold(raw)) {
            Some(&idx) => self.entries[idx].name.clone(),
            None => raw.trim().to_string(),
        }
    }

    /// Display name for a booking-system id; [`UNKNOWN_DEPARTMENT`] when the
    /// id is not configured.
    pub fn name_for_id(&self, id: &str) -> &str {
        self.by_id
            .get(id.trim())
            .map(|&idx| self.entries[idx].name.as_str())
            .unwrap_or(UNKNOWN_DEPARTMENT)
    }

    /// Booking-system ids in configuration order.
    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.id.trim().to_string()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Case- and whitespace-insensitive lookup key.
fn fold(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
