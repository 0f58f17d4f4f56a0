//! Playback session state: the stories, the current position and its timing.

use crate::error::PlaybackError;
use crate::item::StoryItem;
use crate::time::DurationExt;
use std::time::Duration;

/// Progress value of a fully elapsed story.
pub const FULL_PROGRESS: f64 = 100.0;

/// Tick cadence and per-story duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackTiming {
    tick_interval: Duration,
    total_duration: Duration,
}

impl PlaybackTiming {
    /// # Errors
    ///
    /// Returns `PlaybackError::InvalidTiming` if either duration is zero.
    /// A tick longer than a whole story is accepted and completes the story in
    /// one tick.
    pub fn new(tick_interval: Duration, total_duration: Duration) -> Result<Self, PlaybackError> {
        if tick_interval.is_zero() {
            return Err(PlaybackError::InvalidTiming {
                reason: "tick interval must be positive".to_string(),
            });
        }
        if total_duration.is_zero() {
            return Err(PlaybackError::InvalidTiming {
                reason: "story duration must be positive".to_string(),
            });
        }
        Ok(Self {
            tick_interval,
            total_duration,
        })
    }

    /// # Errors
    ///
    /// See [`PlaybackTiming::new`].
    pub fn from_millis(tick_interval_ms: u64, total_duration_ms: u64) -> Result<Self, PlaybackError> {
        Self::new(
            Duration::from_millis(tick_interval_ms),
            Duration::from_millis(total_duration_ms),
        )
    }

    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    #[must_use]
    pub const fn total_duration(&self) -> Duration {
        self.total_duration
    }

    /// Progress added by one tick: `100 * tick_interval / total_duration`.
    #[must_use]
    pub fn progress_step(&self) -> f64 {
        self.tick_interval.percent_of(self.total_duration)
    }
}

impl Default for PlaybackTiming {
    /// 5 second stories advanced in 100 ticks of 50ms.
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
            total_duration: Duration::from_millis(5000),
        }
    }
}

/// One playback pass over a fixed, non-empty list of stories.
///
/// Elapsed time is accumulated as a [`Duration`] so completion is an exact
/// comparison; the percentage exposed by [`PlaybackSession::progress`] is
/// derived from it and clamped to `[0, 100]`.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    items: Vec<StoryItem>,
    current_index: usize,
    elapsed: Duration,
    timing: PlaybackTiming,
}

impl PlaybackSession {
    /// # Errors
    ///
    /// Returns `PlaybackError::InvalidSession` if `items` is empty.
    pub fn new(items: Vec<StoryItem>, timing: PlaybackTiming) -> Result<Self, PlaybackError> {
        if items.is_empty() {
            return Err(PlaybackError::InvalidSession);
        }
        Ok(Self {
            items,
            current_index: 0,
            elapsed: Duration::ZERO,
            timing,
        })
    }

    #[must_use]
    pub fn items(&self) -> &[StoryItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for a constructed session.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn current_item(&self) -> &StoryItem {
        // current_index < items.len() is upheld by `new` and `jump_to`
        &self.items[self.current_index]
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.elapsed
            .percent_of(self.timing.total_duration)
            .min(FULL_PROGRESS)
    }

    #[must_use]
    pub const fn timing(&self) -> PlaybackTiming {
        self.timing
    }

    /// Add one tick of elapsed time. Returns `true` once the story is complete.
    pub(crate) fn advance_progress(&mut self) -> bool {
        self.elapsed = self
            .elapsed
            .saturating_add(self.timing.tick_interval)
            .min(self.timing.total_duration);
        self.elapsed >= self.timing.total_duration
    }

    /// Move to `index` and reset progress to zero.
    ///
    /// Out-of-range indices are ignored; callers obtain indices from
    /// [`crate::navigation`], which never yields one.
    pub(crate) fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.current_index = index;
        self.elapsed = Duration::ZERO;
        true
    }
}
