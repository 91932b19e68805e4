//! DTO definitions for pools, winners, CSV import and operator actions.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dto::{format_system_time, validation::validate_forced_names},
    state::{
        entrant::{Entrant, WinnerRecord},
        session::SessionSettings,
        state_machine::PoolKind,
    },
};

/// Entrant as exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct EntrantDto {
    pub name: String,
    pub city: String,
    /// `"custom"` for overlay entrants, empty otherwise.
    pub flag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl From<&Entrant> for EntrantDto {
    fn from(entrant: &Entrant) -> Self {
        Self {
            name: entrant.name.clone(),
            city: entrant.city.clone(),
            flag: entrant.source.as_flag().to_string(),
            external_id: entrant.external_id.clone(),
        }
    }
}

/// Winner history entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WinnerDto {
    #[serde(flatten)]
    pub entrant: EntrantDto,
    /// RFC 3339 completion time, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawn_at: Option<String>,
}

impl From<&WinnerRecord> for WinnerDto {
    fn from(record: &WinnerRecord) -> Self {
        Self {
            entrant: EntrantDto::from(&record.entrant),
            drawn_at: record.drawn_at.map(format_system_time),
        }
    }
}

/// Pool a draw is taken from, or an import is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PoolKindDto {
    /// Remote feed / CSV pool.
    #[default]
    Primary,
    /// Custom-names overlay.
    Custom,
}

impl From<PoolKind> for PoolKindDto {
    fn from(kind: PoolKind) -> Self {
        match kind {
            PoolKind::Primary => PoolKindDto::Primary,
            PoolKind::Custom => PoolKindDto::Custom,
        }
    }
}

impl From<PoolKindDto> for PoolKind {
    fn from(kind: PoolKindDto) -> Self {
        match kind {
            PoolKindDto::Primary => PoolKind::Primary,
            PoolKindDto::Custom => PoolKind::Custom,
        }
    }
}

/// Both pools plus which one the next draw uses.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolResponse {
    pub active: PoolKindDto,
    pub primary: Vec<EntrantDto>,
    pub custom: Vec<EntrantDto>,
    /// Raw operator text behind the overlay.
    pub custom_text: String,
}

/// Query of `POST /pool/import`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ImportQuery {
    /// Pool to replace; primary when omitted.
    #[serde(default)]
    pub target: Option<PoolKindDto>,
}

/// Result of a CSV import.
#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResponse {
    pub target: PoolKindDto,
    /// Rows kept after skipping malformed ones.
    pub imported: usize,
}

/// Raw newline-separated custom names.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CustomNamesRequest {
    pub text: String,
}

/// Overlay after a custom-names update.
#[derive(Debug, Serialize, ToSchema)]
pub struct CustomNamesResponse {
    pub count: usize,
    pub names: Vec<String>,
}

/// Names to queue as forced winners, in order.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ForcedWinnersRequest {
    #[validate(length(min = 1), custom(function = "validate_forced_names"))]
    pub names: Vec<String>,
}

/// Current forced-winner queue.
#[derive(Debug, Serialize, ToSchema)]
pub struct ForcedWinnersResponse {
    /// Names added by the request; zero on reads.
    pub queued: usize,
    pub queue: Vec<String>,
}

/// Partial settings update; omitted toggles keep their value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    #[serde(default)]
    pub remove_winner: Option<bool>,
    #[serde(default)]
    pub use_custom_names: Option<bool>,
    #[serde(default)]
    pub enable_sound: Option<bool>,
}

impl UpdateSettingsRequest {
    /// Apply the provided toggles on top of `current`.
    pub fn apply(&self, current: SessionSettings) -> SessionSettings {
        SessionSettings {
            remove_winner: self.remove_winner.unwrap_or(current.remove_winner),
            use_custom_names: self.use_custom_names.unwrap_or(current.use_custom_names),
            enable_sound: self.enable_sound.unwrap_or(current.enable_sound),
        }
    }
}

/// Operator toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct SettingsDto {
    pub remove_winner: bool,
    pub use_custom_names: bool,
    pub enable_sound: bool,
}

impl From<SessionSettings> for SettingsDto {
    fn from(settings: SessionSettings) -> Self {
        Self {
            remove_winner: settings.remove_winner,
            use_custom_names: settings.use_custom_names,
            enable_sound: settings.enable_sound,
        }
    }
}

/// Result of clearing the winner history.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResetHistoryResponse {
    pub cleared: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::entrant::SourceTag;

    #[test]
    fn partial_settings_keep_untouched_toggles() {
        let current = SessionSettings {
            remove_winner: true,
            use_custom_names: false,
            enable_sound: true,
        };
        let request: UpdateSettingsRequest =
            serde_json::from_str(r#"{"use_custom_names": true}"#).unwrap();

        let updated = request.apply(current);
        assert!(updated.remove_winner);
        assert!(updated.use_custom_names);
        assert!(updated.enable_sound);
    }

    #[test]
    fn custom_entrant_is_flagged() {
        let dto = EntrantDto::from(&Entrant::custom("Guest"));
        assert_eq!(dto.flag, "custom");
        assert_eq!(dto.city, "");
        assert_eq!(SourceTag::from_flag(&dto.flag), SourceTag::Custom);
    }

    #[test]
    fn forced_request_rejects_blank_names() {
        let ok = ForcedWinnersRequest {
            names: vec!["Asha".into()],
        };
        let blank = ForcedWinnersRequest {
            names: vec!["Asha".into(), "   ".into()],
        };
        let empty = ForcedWinnersRequest { names: vec![] };

        assert!(ok.validate().is_ok());
        assert!(blank.validate().is_err());
        assert!(empty.validate().is_err());
    }
}
