//! Render contract for the story viewer.

use crate::item::{AccentColor, StoryId};
use crate::navigation;
use crate::progress;
use crate::session::PlaybackSession;
use serde::Serialize;

/// Load state of the current story's media, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaStatus {
    #[default]
    Loading,
    Loaded,
    Failed,
}

/// What fills the viewer behind the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Backdrop {
    Media(String),
    /// Solid accent color, used when the media could not be loaded
    Fallback(AccentColor),
}

/// Everything the host may show for the current state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerFrame {
    pub index: usize,
    pub story_count: usize,
    /// One fill percentage per story, see [`progress::render_state`]
    pub fills: Vec<f64>,
    pub story_id: StoryId,
    pub owner_name: String,
    pub owner_initial: Option<char>,
    pub age_label: String,
    pub is_live: bool,
    pub accent: AccentColor,
    pub backdrop: Backdrop,
    pub can_retreat: bool,
    pub can_advance: bool,
}

impl ViewerFrame {
    /// Build a frame for the session's current story.
    ///
    /// A media failure only swaps the backdrop; playback keeps its schedule.
    #[must_use]
    pub fn from_session(session: &PlaybackSession, media: MediaStatus) -> Self {
        let story = session.current_item();
        let backdrop = match media {
            MediaStatus::Failed => Backdrop::Fallback(story.accent),
            MediaStatus::Loading | MediaStatus::Loaded => Backdrop::Media(story.media_ref.clone()),
        };

        Self {
            index: session.current_index(),
            story_count: session.len(),
            fills: progress::session_fills(session),
            story_id: story.id,
            owner_name: story.owner_name.clone(),
            owner_initial: story.initial(),
            age_label: story.age_label(),
            is_live: story.is_live,
            accent: story.accent,
            backdrop,
            can_retreat: navigation::has_previous(session),
            can_advance: navigation::has_next(session),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::StoryItem;
    use crate::session::PlaybackTiming;

    fn session() -> PlaybackSession {
        let items = vec![
            StoryItem::new(1, "media://ronin", "Ronin", "1h", AccentColor::Teal).live(),
            StoryItem::new(2, "media://aura", "Aura", "2h", AccentColor::Purple),
        ];
        PlaybackSession::new(items, PlaybackTiming::default()).unwrap()
    }

    #[test]
    fn test_frame_for_first_story() {
        let frame = ViewerFrame::from_session(&session(), MediaStatus::Loaded);

        assert_eq!(frame.index, 0);
        assert_eq!(frame.story_count, 2);
        assert_eq!(frame.fills, vec![0.0, 0.0]);
        assert_eq!(frame.owner_name, "Ronin");
        assert_eq!(frame.owner_initial, Some('R'));
        assert_eq!(frame.age_label, "1h ago");
        assert!(frame.is_live);
        assert_eq!(frame.backdrop, Backdrop::Media("media://ronin".to_string()));
        assert!(!frame.can_retreat);
        assert!(frame.can_advance);
    }

    #[test]
    fn test_failed_media_uses_accent_fallback() {
        let frame = ViewerFrame::from_session(&session(), MediaStatus::Failed);
        assert_eq!(frame.backdrop, Backdrop::Fallback(AccentColor::Teal));
    }

    #[test]
    fn test_frame_at_last_story() {
        let mut session = session();
        session.jump_to(1);
        session.advance_progress();

        let frame = ViewerFrame::from_session(&session, MediaStatus::Loading);
        assert_eq!(frame.fills[0], 100.0);
        assert!(frame.fills[1] > 0.0);
        assert!(frame.can_retreat);
        assert!(!frame.can_advance);
        assert_eq!(frame.accent, AccentColor::Purple);
    }

    #[test]
    fn test_frame_serializes_backdrop_tagged() {
        let frame = ViewerFrame::from_session(&session(), MediaStatus::Failed);
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["backdrop"]["kind"], "fallback");
        assert_eq!(json["backdrop"]["value"], "teal");
        assert_eq!(json["story_id"], 1);
    }
}
