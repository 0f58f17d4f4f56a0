//! Bounds checks for moving between stories.
//!
//! Everything here is a pure function of the session; the controller asks
//! these questions before committing any index change.

use crate::session::PlaybackSession;

#[must_use]
pub fn has_next(session: &PlaybackSession) -> bool {
    next_index(session).is_some()
}

#[must_use]
pub fn has_previous(session: &PlaybackSession) -> bool {
    previous_index(session).is_some()
}

/// Index of the following story, or `None` at the last one.
#[must_use]
pub fn next_index(session: &PlaybackSession) -> Option<usize> {
    session
        .current_index()
        .checked_add(1)
        .filter(|&next| next < session.len())
}

/// Index of the preceding story, or `None` at the first one.
#[must_use]
pub fn previous_index(session: &PlaybackSession) -> Option<usize> {
    session.current_index().checked_sub(1)
}

/// Direction of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Target index for `direction`, if one exists.
#[must_use]
pub fn target_index(session: &PlaybackSession, direction: Direction) -> Option<usize> {
    match direction {
        Direction::Forward => next_index(session),
        Direction::Backward => previous_index(session),
    }
}
