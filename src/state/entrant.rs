use std::time::SystemTime;

use crate::dao::models::{EntrantEntity, WinnerEntity};

/// Flag value written for entrants coming from the custom-names overlay.
pub const CUSTOM_FLAG: &str = "custom";

/// Origin of an entrant record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceTag {
    /// Entrant from the remote feed or a CSV import.
    #[default]
    Normal,
    /// Entrant typed into the custom-names overlay.
    Custom,
}

impl SourceTag {
    /// Parse the textual flag used by the persisted and CSV formats.
    pub fn from_flag(flag: &str) -> Self {
        if flag.trim().eq_ignore_ascii_case(CUSTOM_FLAG) {
            SourceTag::Custom
        } else {
            SourceTag::Normal
        }
    }

    /// Textual flag used by the persisted and CSV formats.
    pub fn as_flag(&self) -> &'static str {
        match self {
            SourceTag::Normal => "",
            SourceTag::Custom => CUSTOM_FLAG,
        }
    }
}

/// A participant that can be drawn as a winner. Identity is the `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entrant {
    /// Display name, unique within a pool.
    pub name: String,
    /// City used by the region filters; empty for custom entrants.
    pub city: String,
    /// Opaque identifier from the remote feed, reported back on a win.
    pub external_id: Option<String>,
    /// Where the entrant came from.
    pub source: SourceTag,
}

impl Entrant {
    /// Build a regular entrant.
    pub fn new(name: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            city: city.into(),
            external_id: None,
            source: SourceTag::Normal,
        }
    }

    /// Build an overlay entrant with no city.
    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            city: String::new(),
            external_id: None,
            source: SourceTag::Custom,
        }
    }

    /// Attach the remote feed identifier.
    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }
}

/// An entry of the append-only winner history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinnerRecord {
    /// The entrant that won.
    pub entrant: Entrant,
    /// Completion time of the draw. Legacy records carry none; order is given by position.
    pub drawn_at: Option<SystemTime>,
}

impl WinnerRecord {
    /// Record a win completed now.
    pub fn now(entrant: Entrant) -> Self {
        Self {
            entrant,
            drawn_at: Some(SystemTime::now()),
        }
    }

    /// Name of the winning entrant.
    pub fn name(&self) -> &str {
        &self.entrant.name
    }
}

impl From<EntrantEntity> for Entrant {
    fn from(value: EntrantEntity) -> Self {
        Self {
            name: value.name,
            city: value.city,
            external_id: value.emp_id.filter(|id| !id.is_empty()),
            source: SourceTag::from_flag(&value.flag),
        }
    }
}

impl From<Entrant> for EntrantEntity {
    fn from(value: Entrant) -> Self {
        Self {
            name: value.name,
            city: value.city,
            flag: value.source.as_flag().to_string(),
            emp_id: value.external_id,
        }
    }
}

impl From<WinnerEntity> for WinnerRecord {
    fn from(value: WinnerEntity) -> Self {
        Self {
            entrant: value.entrant.into(),
            drawn_at: value.drawn_at,
        }
    }
}

impl From<WinnerRecord> for WinnerEntity {
    fn from(value: WinnerRecord) -> Self {
        Self {
            entrant: value.entrant.into(),
            drawn_at: value.drawn_at,
        }
    }
}
