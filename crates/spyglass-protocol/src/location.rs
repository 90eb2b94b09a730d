//! Location candidates: the pool a round's secret location is drawn from.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{GroupId, LocationId};

/// Language used when a location has no name in the requested one.
pub const DEFAULT_LANGUAGE: &str = "ru";

/// Placeholder returned when a location has no names at all.
const UNKNOWN_NAME: &str = "Unknown";

/// Where a location is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "group_id", rename_all = "snake_case")]
pub enum LocationScope {
    /// Offered to every group.
    Global,
    /// Added by one group for its own games.
    Group(GroupId),
}

impl LocationScope {
    /// Returns `true` if a game in `group` may draw this location.
    pub fn visible_to(self, group: GroupId) -> bool {
        match self {
            Self::Global => true,
            Self::Group(owner) => owner == group,
        }
    }
}

/// A location that can be picked as a round's secret.
///
/// Names are keyed by language code (`"ru"`, `"en"`, `"az"`). A
/// `BTreeMap` keeps serialization and the last-resort fallback stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub id: LocationId,
    pub scope: LocationScope,
    pub names: BTreeMap<String, String>,
}

impl LocationCandidate {
    /// Builds a candidate from `(language, name)` pairs.
    pub fn new<'a>(
        id: LocationId,
        scope: LocationScope,
        names: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        Self {
            id,
            scope,
            names: names
                .into_iter()
                .map(|(lang, name)| (lang.to_owned(), name.to_owned()))
                .collect(),
        }
    }

    /// Returns the name in `language`.
    ///
    /// Falls back to [`DEFAULT_LANGUAGE`], then to any translation, then to
    /// `"Unknown"`.
    pub fn name(&self, language: &str) -> &str {
        self.names
            .get(language)
            .or_else(|| self.names.get(DEFAULT_LANGUAGE))
            .or_else(|| self.names.values().next())
            .map(String::as_str)
            .unwrap_or(UNKNOWN_NAME)
    }
}
