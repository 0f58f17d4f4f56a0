//! Per-story fill percentages for the segmented progress bar.

use crate::item::StoryItem;
use crate::session::{FULL_PROGRESS, PlaybackSession};

/// Fill percentage of every segment, in story order.
///
/// Stories before `current_index` are full, the current one shows `progress`
/// (clamped to `[0, 100]`) and later ones are empty. Display only; nothing
/// here feeds back into playback.
#[must_use]
pub fn render_state(items: &[StoryItem], current_index: usize, progress: f64) -> Vec<f64> {
    let current = progress.clamp(0.0, FULL_PROGRESS);
    items
        .iter()
        .enumerate()
        .map(|(index, _)| match index.cmp(&current_index) {
            std::cmp::Ordering::Less => FULL_PROGRESS,
            std::cmp::Ordering::Equal => current,
            std::cmp::Ordering::Greater => 0.0,
        })
        .collect()
}

/// [`render_state`] for a live session.
#[must_use]
pub fn session_fills(session: &PlaybackSession) -> Vec<f64> {
    render_state(session.items(), session.current_index(), session.progress())
}
