//! Entrant pools: the primary list and the custom-names overlay.

use std::collections::HashSet;

use crate::state::entrant::Entrant;

/// Ordered, mutable sequence of entrants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntrantPool {
    entries: Vec<Entrant>,
}

impl EntrantPool {
    /// Wrap an existing list, keeping its order.
    pub fn new(entries: Vec<Entrant>) -> Self {
        Self { entries }
    }

    /// Borrow the entrants in pool order.
    pub fn entries(&self) -> &[Entrant] {
        &self.entries
    }

    /// Number of entrants.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool has no entrant.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact-name lookup.
    pub fn find(&self, name: &str) -> Option<&Entrant> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Replace the whole pool (CSV import).
    pub fn replace(&mut self, entries: Vec<Entrant>) {
        self.entries = entries;
    }

    /// Remove the first entrant whose name matches exactly. Returns whether one was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.entries.iter().position(|entry| entry.name == name) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Append fetched entrants whose names are not already present, ignoring case and
    /// surrounding whitespace.
    ///
    /// Cached order is preserved and newcomers keep their feed order. Returns how many
    /// entrants were appended.
    pub fn merge_feed(&mut self, fetched: Vec<Entrant>) -> usize {
        let mut seen: HashSet<String> = self
            .entries
            .iter()
            .map(|entry| merge_key(&entry.name))
            .collect();

        let before = self.entries.len();
        for entrant in fetched {
            if seen.insert(merge_key(&entrant.name)) {
                self.entries.push(entrant);
            }
        }
        self.entries.len() - before
    }

    /// Consume the pool into its entries.
    pub fn into_entries(self) -> Vec<Entrant> {
        self.entries
    }
}

fn merge_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Custom-names overlay recomputed from the raw operator text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomOverlay {
    raw: String,
    pool: EntrantPool,
}

impl CustomOverlay {
    /// Build the overlay from newline-separated text.
    pub fn from_text(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let pool = EntrantPool::new(parse_custom_names(&raw));
        Self { raw, pool }
    }

    /// Rebuild the overlay from stored entrants, regenerating the raw text.
    pub fn from_entrants(entries: Vec<Entrant>) -> Self {
        let raw = entries
            .iter()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            raw,
            pool: EntrantPool::new(entries),
        }
    }

    /// Raw text the overlay was computed from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Overlay entrants.
    pub fn pool(&self) -> &EntrantPool {
        &self.pool
    }

    /// Remove an entrant from the overlay, keeping the raw text in sync.
    pub fn remove(&mut self, name: &str) -> bool {
        if !self.pool.remove(name) {
            return false;
        }
        *self = Self::from_entrants(std::mem::take(&mut self.pool).into_entries());
        true
    }
}

/// Parse newline-separated names into custom entrants, trimming each line and dropping blanks.
pub fn parse_custom_names(raw: &str) -> Vec<Entrant> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Entrant::custom)
        .collect()
}
