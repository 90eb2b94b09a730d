//! Per-group game settings.

use serde::{Deserialize, Serialize};

use crate::SessionError;

// ---------------------------------------------------------------------------
// GameSettings
// ---------------------------------------------------------------------------

/// Settings a group plays with.
///
/// Owned by the configuration collaborator and handed to the engine per
/// call. Fields are private: the only ways to obtain a value are
/// [`GameSettings::new`], [`Default`], and deserialization, all of which
/// validate. The engine therefore never sees out-of-range values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SettingsDraft")]
pub struct GameSettings {
    min_players: usize,
    max_players: usize,
    spy_percentage: u8,
    language: String,
}

impl GameSettings {
    /// Lowest allowed `min_players`.
    pub const MIN_PLAYERS_FLOOR: usize = 2;

    /// Highest allowed `max_players`.
    pub const MAX_PLAYERS_CEILING: usize = 20;

    /// Highest allowed spy percentage. Must also be > 0.
    pub const MAX_SPY_PERCENTAGE: u8 = 50;

    /// Languages location names and bot texts exist in.
    pub const SUPPORTED_LANGUAGES: &'static [&'static str] = &["ru", "en", "az"];

    /// Validates and builds settings.
    ///
    /// # Errors
    /// [`SessionError::InvalidSettings`] unless
    /// `2 <= min_players <= max_players <= 20`, `0 < spy_percentage <= 50`,
    /// and `language` is supported.
    pub fn new(
        min_players: usize,
        max_players: usize,
        spy_percentage: u8,
        language: impl Into<String>,
    ) -> Result<Self, SessionError> {
        let language = language.into();

        if !(Self::MIN_PLAYERS_FLOOR <= min_players
            && min_players <= max_players
            && max_players <= Self::MAX_PLAYERS_CEILING)
        {
            return Err(SessionError::InvalidSettings(format!(
                "player limits must satisfy {} <= min ({min_players}) <= max ({max_players}) <= {}",
                Self::MIN_PLAYERS_FLOOR,
                Self::MAX_PLAYERS_CEILING,
            )));
        }
        if spy_percentage == 0 || spy_percentage > Self::MAX_SPY_PERCENTAGE {
            return Err(SessionError::InvalidSettings(format!(
                "spy percentage {spy_percentage} outside 1..={}",
                Self::MAX_SPY_PERCENTAGE
            )));
        }
        if !Self::SUPPORTED_LANGUAGES.contains(&language.as_str()) {
            return Err(SessionError::InvalidSettings(format!(
                "unsupported language {language:?}"
            )));
        }

        Ok(Self {
            min_players,
            max_players,
            spy_percentage,
            language,
        })
    }

    pub fn min_players(&self) -> usize {
        self.min_players
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    pub fn spy_percentage(&self) -> u8 {
        self.spy_percentage
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            min_players: 4,
            max_players: 10,
            spy_percentage: 20,
            language: "ru".to_string(),
        }
    }
}

/// Unvalidated wire shape of [`GameSettings`].
#[derive(Deserialize)]
struct SettingsDraft {
    min_players: usize,
    max_players: usize,
    spy_percentage: u8,
    language: String,
}

impl TryFrom<SettingsDraft> for GameSettings {
    type Error = SessionError;

    fn try_from(draft: SettingsDraft) -> Result<Self, Self::Error> {
        Self::new(
            draft.min_players,
            draft.max_players,
            draft.spy_percentage,
            draft.language,
        )
    }
}
