//! Story feeds: where a session's stories come from.

use crate::error::{GlimpseError, Result};
use crate::item::{AccentColor, StoryItem};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{info, warn};

const LOG_TARGET: &str = "glimpse::feed";

/// Trait for story sources
#[async_trait]
pub trait StoryFeed: Send + Sync {
    /// Get the feed name
    fn name(&self) -> &'static str;

    /// Fetch the ordered stories to play. An empty list is a valid answer.
    async fn fetch(&self) -> Result<Vec<StoryItem>>;
}

/// Feed backed by an in-memory list.
#[derive(Debug, Clone, Default)]
pub struct StaticStoryFeed {
    stories: Vec<StoryItem>,
}

impl StaticStoryFeed {
    #[must_use]
    pub const fn new(stories: Vec<StoryItem>) -> Self {
        Self { stories }
    }

    /// Three sample stories, the first one live.
    #[must_use]
    pub fn demo() -> Self {
        Self::new(vec![
            StoryItem::new(
                1,
                "https://placehold.co/1080x1920/222/FFF?text=DEV+STORY+1",
                "Ronin",
                "1h",
                AccentColor::Teal,
            )
            .live(),
            StoryItem::new(
                2,
                "https://placehold.co/1080x1920/4B0082/FFF?text=NEW+CODE+SNIPPET",
                "Aura",
                "2h",
                AccentColor::Purple,
            ),
            StoryItem::new(
                3,
                "https://placehold.co/1080x1920/004080/FFF?text=DASHBOARD+ANALYTICS",
                "Nexus",
                "4h",
                AccentColor::Blue,
            ),
        ])
    }
}

#[async_trait]
impl StoryFeed for StaticStoryFeed {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch(&self) -> Result<Vec<StoryItem>> {
        Ok(self.stories.clone())
    }
}

/// Feed read from a JSON array of stories on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStoryFeed {
    path: PathBuf,
}

impl JsonFileStoryFeed {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StoryFeed for JsonFileStoryFeed {
    fn name(&self) -> &'static str {
        "json_file"
    }

    async fn fetch(&self) -> Result<Vec<StoryItem>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| GlimpseError::Feed {
                feed: self.name().to_string(),
                reason: format!("{}: {e}", self.path.display()),
            })?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Try each feed in order; the first one returning stories wins.
///
/// Failing and empty feeds are logged and skipped. Returns an empty list when
/// no feed has anything to show.
pub async fn load_stories(feeds: &[Box<dyn StoryFeed>]) -> Vec<StoryItem> {
    for feed in feeds {
        match feed.fetch().await {
            Ok(stories) if !stories.is_empty() => {
                info!(
                    target: LOG_TARGET,
                    "Loaded {} stories from {} feed",
                    stories.len(),
                    feed.name()
                );
                return stories;
            }
            Ok(_) => {
                info!(target: LOG_TARGET, "Feed {} has no stories", feed.name());
            }
            Err(e) => {
                warn!(target: LOG_TARGET, "Feed {} failed: {}", feed.name(), e);
            }
        }
    }
    Vec::new()
}
