//! Story items as supplied by a feed.

use serde::{Deserialize, Serialize};

/// Unique identifier of a story within a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(pub u64);

impl std::fmt::Display for StoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Symbolic accent color attached to a story owner.
///
/// Hosts decide how a token is painted; [`AccentColor::hex`] is the default
/// palette and doubles as the fallback backdrop when media fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccentColor {
    #[default]
    Teal,
    Purple,
    Blue,
    Yellow,
    Red,
    Gray,
}

impl AccentColor {
    /// Stable token name, matching the serialized form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Teal => "teal",
            Self::Purple => "purple",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Gray => "gray",
        }
    }

    /// Default palette value as `#RRGGBB`.
    #[must_use]
    pub const fn hex(&self) -> &'static str {
        match self {
            Self::Teal => "#14B8A6",
            Self::Purple => "#A855F7",
            Self::Blue => "#3B82F6",
            Self::Yellow => "#EAB308",
            Self::Red => "#EF4444",
            Self::Gray => "#6B7280",
        }
    }
}

impl std::fmt::Display for AccentColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ephemeral, timed content unit. Immutable once handed to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryItem {
    pub id: StoryId,
    /// Opaque content locator; never decoded by the playback engine
    pub media_ref: String,
    pub owner_name: String,
    /// Relative posting time as shown to the viewer (e.g. "2h")
    pub posted_label: String,
    #[serde(default)]
    pub accent: AccentColor,
    #[serde(default)]
    pub is_live: bool,
}

impl StoryItem {
    #[must_use]
    pub fn new(
        id: u64,
        media_ref: impl Into<String>,
        owner_name: impl Into<String>,
        posted_label: impl Into<String>,
        accent: AccentColor,
    ) -> Self {
        Self {
            id: StoryId(id),
            media_ref: media_ref.into(),
            owner_name: owner_name.into(),
            posted_label: posted_label.into(),
            accent,
            is_live: false,
        }
    }

    /// Mark the story as a live broadcast
    #[must_use]
    pub const fn live(mut self) -> Self {
        self.is_live = true;
        self
    }

    /// First character of the owner name, used for the avatar badge.
    #[must_use]
    pub fn initial(&self) -> Option<char> {
        self.owner_name.chars().next()
    }

    #[must_use]
    pub fn age_label(&self) -> String {
        format!("{} ago", self.posted_label)
    }
}
