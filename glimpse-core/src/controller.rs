//! The story playback state machine.
//!
//! [`PlaybackController`] is the only writer of a [`PlaybackSession`]. It owns
//! the session's single tick timer and replaces it as one step whenever the
//! current story changes, so a tick can never land on a story it was not
//! scheduled for.

use crate::error::PlaybackError;
use crate::frame::{MediaStatus, ViewerFrame};
use crate::item::StoryItem;
use crate::navigation::{self, Direction};
use crate::session::{PlaybackSession, PlaybackTiming};
use crate::timer::{TickScheduler, TimerId};
use tokio::sync::broadcast;
use tracing::{debug, info, trace};

const LOG_TARGET: &str = "glimpse::controller";

/// Buffered events per subscriber. Holds several stories of progress updates
/// at the default cadence.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Lifecycle phase of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    /// No session has been started yet
    Idle,
    Playing,
    /// Terminal for the current session; `start` opens a new one
    Closed,
}

/// What moved the viewer to another story.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceCause {
    /// The current story ran to completion
    Auto,
    /// The viewer asked to go forward or back
    Manual,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The last story completed
    Exhausted,
    /// `close` was called, or the host shut the viewer down
    Closed,
}

/// Result of feeding one event into the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Same story, progress increased
    Progressed { index: usize, progress: f64 },
    /// A different story is now current and its progress is zero
    Advanced {
        from: usize,
        to: usize,
        cause: AdvanceCause,
    },
    /// The session moved to `Closed`
    Ended { reason: EndReason },
    /// Nothing changed
    Ignored,
}

/// Events published to subscribers of a controller.
#[derive(Debug, Clone)]
pub enum PlaybackEvent {
    /// A session started on its first story
    Started { story_count: usize, story: StoryItem },
    /// The current story changed
    ItemChanged {
        from: usize,
        to: usize,
        cause: AdvanceCause,
        story: StoryItem,
    },
    /// Progress within the current story increased
    ProgressUpdated { index: usize, progress: f64 },
    /// Emitted exactly once per session
    SessionEnded { reason: EndReason },
}

/// Render-ready view of the controller state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSnapshot {
    pub phase: PlaybackPhase,
    pub index: usize,
    pub progress: f64,
    pub story_count: usize,
}

/// Drives a [`PlaybackSession`] from ticks and navigation requests.
///
/// All operations take `&mut self` and run to completion, so ticks, manual
/// navigation and closing are strictly serialized by ownership.
pub struct PlaybackController<S: TickScheduler> {
    scheduler: S,
    timing: PlaybackTiming,
    phase: PlaybackPhase,
    session: Option<PlaybackSession>,
    active_timer: Option<TimerId>,
    event_tx: broadcast::Sender<PlaybackEvent>,
}

impl<S: TickScheduler> PlaybackController<S> {
    #[must_use]
    pub fn new(scheduler: S, timing: PlaybackTiming) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            scheduler,
            timing,
            phase: PlaybackPhase::Idle,
            session: None,
            active_timer: None,
            event_tx,
        }
    }

    /// Subscribe to playback events
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.event_tx.subscribe()
    }

    /// Open a session on `items` at the first story and schedule its timer.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::InvalidSession` if `items` is empty and
    /// `PlaybackError::SessionActive` if a session is already playing. The
    /// controller is left untouched in both cases.
    pub fn start(&mut self, items: Vec<StoryItem>) -> Result<(), PlaybackError> {
        if self.phase == PlaybackPhase::Playing {
            return Err(PlaybackError::SessionActive);
        }

        let session = PlaybackSession::new(items, self.timing)?;
        let story = session.current_item().clone();
        let story_count = session.len();

        self.session = Some(session);
        self.phase = PlaybackPhase::Playing;
        self.reschedule();

        info!(
            target: LOG_TARGET,
            "Story session started with {} stories, first by {}", story_count, story.owner_name
        );
        let _ = self.event_tx.send(PlaybackEvent::Started { story_count, story });
        Ok(())
    }

    /// Entry point for timer sources. Fires from any timer other than the one
    /// currently owned are stale and ignored.
    pub fn on_timer_fired(&mut self, id: TimerId) -> Transition {
        if self.active_timer != Some(id) {
            debug!(target: LOG_TARGET, "Ignoring stale tick from {}", id);
            return Transition::Ignored;
        }
        self.on_tick()
    }

    /// Advance progress by one tick, moving on or ending the session when the
    /// current story completes.
    pub fn on_tick(&mut self) -> Transition {
        if self.phase != PlaybackPhase::Playing {
            return Transition::Ignored;
        }
        let Some(session) = self.session.as_mut() else {
            return Transition::Ignored;
        };

        if !session.advance_progress() {
            let index = session.current_index();
            let progress = session.progress();
            trace!(target: LOG_TARGET, "Story {} at {:.1}%", index, progress);
            let _ = self
                .event_tx
                .send(PlaybackEvent::ProgressUpdated { index, progress });
            return Transition::Progressed { index, progress };
        }

        match navigation::next_index(session) {
            Some(next) => self.commit(next, AdvanceCause::Auto),
            None => self.end(EndReason::Exhausted),
        }
    }

    /// Go to the next story. A no-op at the last story.
    pub fn advance(&mut self) -> Transition {
        self.navigate(Direction::Forward)
    }

    /// Go to the previous story. A no-op at the first story.
    pub fn retreat(&mut self) -> Transition {
        self.navigate(Direction::Backward)
    }

    /// Cancel the timer and end the session. Idempotent.
    pub fn close(&mut self) -> Transition {
        if self.phase != PlaybackPhase::Playing {
            return Transition::Ignored;
        }
        self.end(EndReason::Closed)
    }

    #[must_use]
    pub const fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    /// The live session, if one is playing.
    #[must_use]
    pub const fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    /// The timer currently owned by the session.
    #[must_use]
    pub const fn active_timer(&self) -> Option<TimerId> {
        self.active_timer
    }

    #[must_use]
    pub const fn scheduler(&self) -> &S {
        &self.scheduler
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<PlaybackSnapshot> {
        self.session.as_ref().map(|session| PlaybackSnapshot {
            phase: self.phase,
            index: session.current_index(),
            progress: session.progress(),
            story_count: session.len(),
        })
    }

    /// Everything a host needs to draw the viewer, or `None` once closed.
    #[must_use]
    pub fn frame(&self, media: MediaStatus) -> Option<ViewerFrame> {
        self.session
            .as_ref()
            .map(|session| ViewerFrame::from_session(session, media))
    }

    fn navigate(&mut self, direction: Direction) -> Transition {
        if self.phase != PlaybackPhase::Playing {
            return Transition::Ignored;
        }
        let Some(target) = self
            .session
            .as_ref()
            .and_then(|session| navigation::target_index(session, direction))
        else {
            debug!(target: LOG_TARGET, "Ignoring {:?} navigation at sequence boundary", direction);
            return Transition::Ignored;
        };
        self.commit(target, AdvanceCause::Manual)
    }

    /// Cancel the pending timer, switch stories, then schedule a fresh timer.
    fn commit(&mut self, to: usize, cause: AdvanceCause) -> Transition {
        self.cancel_timer();

        let Some(session) = self.session.as_mut() else {
            return Transition::Ignored;
        };
        let from = session.current_index();
        if !session.jump_to(to) {
            self.reschedule();
            return Transition::Ignored;
        }
        let story = session.current_item().clone();

        self.reschedule();

        info!(
            target: LOG_TARGET,
            "Story {} -> {} ({:?}), now showing {}", from, to, cause, story.owner_name
        );
        let _ = self.event_tx.send(PlaybackEvent::ItemChanged {
            from,
            to,
            cause,
            story,
        });
        Transition::Advanced { from, to, cause }
    }

    fn end(&mut self, reason: EndReason) -> Transition {
        self.cancel_timer();
        self.session = None;
        self.phase = PlaybackPhase::Closed;

        info!(target: LOG_TARGET, "Story session ended ({:?})", reason);
        let _ = self.event_tx.send(PlaybackEvent::SessionEnded { reason });
        Transition::Ended { reason }
    }

    fn reschedule(&mut self) {
        self.cancel_timer();
        self.active_timer = Some(self.scheduler.schedule(self.timing.tick_interval()));
    }

    fn cancel_timer(&mut self) {
        if let Some(id) = self.active_timer.take() {
            self.scheduler.cancel(id);
        }
    }
}

impl<S: TickScheduler> Drop for PlaybackController<S> {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::AccentColor;
    use crate::timer::ManualTickScheduler;
    use tokio::sync::broadcast::error::TryRecvError;

    fn stories(n: u64) -> Vec<StoryItem> {
        (1..=n)
            .map(|id| {
                StoryItem::new(id, format!("media://{id}"), format!("Owner{id}"), "1h", AccentColor::Teal)
            })
            .collect()
    }

    /// 100 ticks per story
    fn controller() -> PlaybackController<ManualTickScheduler> {
        PlaybackController::new(
            ManualTickScheduler::new(),
            PlaybackTiming::from_millis(50, 5000).unwrap(),
        )
    }

    fn tick_n(controller: &mut PlaybackController<ManualTickScheduler>, n: usize) -> Transition {
        let mut last = Transition::Ignored;
        for _ in 0..n {
            last = controller.on_tick();
        }
        last
    }

    fn ended_count(rx: &mut broadcast::Receiver<PlaybackEvent>) -> usize {
        let mut count = 0;
        loop {
            match rx.try_recv() {
                Ok(PlaybackEvent::SessionEnded { .. }) => count += 1,
                Ok(_) | Err(TryRecvError::Lagged(_)) => {}
                Err(_) => break,
            }
        }
        count
    }

    #[test]
    fn test_start_initializes_session() {
        let mut controller = controller();
        controller.start(stories(3)).unwrap();

        let snapshot = controller.snapshot().unwrap();
        assert_eq!(snapshot.phase, PlaybackPhase::Playing);
        assert_eq!(snapshot.index, 0);
        assert!(snapshot.progress.abs() < f64::EPSILON);
        assert_eq!(snapshot.story_count, 3);
        assert_eq!(controller.scheduler().active().len(), 1);
        assert_eq!(controller.active_timer(), controller.scheduler().active_timer());
    }

    #[test]
    fn test_start_empty_fails_without_session() {
        let mut controller = controller();
        assert_eq!(controller.start(Vec::new()), Err(PlaybackError::InvalidSession));
        assert_eq!(controller.phase(), PlaybackPhase::Idle);
        assert!(controller.snapshot().is_none());
        assert_eq!(controller.scheduler().schedule_count(), 0);
    }

    #[test]
    fn test_start_while_playing_rejected() {
        let mut controller = controller();
        controller.start(stories(2)).unwrap();
        assert_eq!(controller.start(stories(1)), Err(PlaybackError::SessionActive));
        assert_eq!(controller.session().unwrap().len(), 2);
    }

    #[test]
    fn test_tick_increments_progress() {
        let mut controller = controller();
        controller.start(stories(3)).unwrap();
        let timer = controller.active_timer();

        let transition = tick_n(&mut controller, 40);
        match transition {
            Transition::Progressed { index, progress } => {
                assert_eq!(index, 0);
                assert!((progress - 40.0).abs() < 1e-9);
            }
            other => panic!("unexpected transition {other:?}"),
        }
        assert_eq!(controller.active_timer(), timer);
    }

    #[test]
    fn test_hundred_ticks_advance_to_next_story() {
        let mut controller = controller();
        controller.start(stories(3)).unwrap();
        let first_timer = controller.active_timer();

        let transition = tick_n(&mut controller, 100);
        assert_eq!(
            transition,
            Transition::Advanced {
                from: 0,
                to: 1,
                cause: AdvanceCause::Auto
            }
        );
        let snapshot = controller.snapshot().unwrap();
        assert_eq!(snapshot.index, 1);
        assert!(snapshot.progress.abs() < f64::EPSILON);
        assert_ne!(controller.active_timer(), first_timer);
        assert_eq!(controller.scheduler().active().len(), 1);
    }

    #[test]
    fn test_retreat_at_first_story_is_noop() {
        let mut controller = controller();
        controller.start(stories(3)).unwrap();
        tick_n(&mut controller, 10);
        let before = controller.snapshot();
        let timer = controller.active_timer();

        assert_eq!(controller.retreat(), Transition::Ignored);
        assert_eq!(controller.snapshot(), before);
        assert_eq!(controller.active_timer(), timer);
        assert_eq!(controller.scheduler().cancel_count(), 0);
    }

    #[test]
    fn test_manual_advance_at_last_story_is_noop() {
        let mut controller = controller();
        controller.start(stories(2)).unwrap();
        controller.advance();

        assert_eq!(controller.advance(), Transition::Ignored);
        assert_eq!(controller.phase(), PlaybackPhase::Playing);
        assert_eq!(controller.snapshot().unwrap().index, 1);
    }

    #[test]
    fn test_manual_advance_replaces_timer() {
        let mut controller = controller();
        controller.start(stories(3)).unwrap();
        tick_n(&mut controller, 100);
        tick_n(&mut controller, 40);
        let pending = controller.active_timer().unwrap();
        let scheduled_before = controller.scheduler().schedule_count();

        assert_eq!(
            controller.advance(),
            Transition::Advanced {
                from: 1,
                to: 2,
                cause: AdvanceCause::Manual
            }
        );
        let snapshot = controller.snapshot().unwrap();
        assert_eq!(snapshot.index, 2);
        assert!(snapshot.progress.abs() < f64::EPSILON);

        let scheduler = controller.scheduler();
        assert!(!scheduler.active().contains(&pending));
        assert_eq!(scheduler.active().len(), 1);
        assert_eq!(scheduler.schedule_count(), scheduled_before + 1);
        assert_eq!(scheduler.last_interval(), Some(std::time::Duration::from_millis(50)));
    }

    #[test]
    fn test_retreat_resets_progress() {
        let mut controller = controller();
        controller.start(stories(3)).unwrap();
        controller.advance();
        tick_n(&mut controller, 30);

        assert_eq!(
            controller.retreat(),
            Transition::Advanced {
                from: 1,
                to: 0,
                cause: AdvanceCause::Manual
            }
        );
        assert!(controller.snapshot().unwrap().progress.abs() < f64::EPSILON);
    }

    #[test]
    fn test_stale_timer_fire_ignored() {
        let mut controller = controller();
        controller.start(stories(3)).unwrap();
        let stale = controller.active_timer().unwrap();
        controller.advance();

        assert_eq!(controller.on_timer_fired(stale), Transition::Ignored);
        assert!(controller.snapshot().unwrap().progress.abs() < f64::EPSILON);

        let live = controller.active_timer().unwrap();
        assert!(matches!(
            controller.on_timer_fired(live),
            Transition::Progressed { index: 1, .. }
        ));
    }

    #[test]
    fn test_exhausting_last_story_closes_once() {
        let mut controller = controller();
        let mut rx = controller.subscribe();
        controller.start(stories(1)).unwrap();

        let transition = tick_n(&mut controller, 100);
        assert_eq!(
            transition,
            Transition::Ended {
                reason: EndReason::Exhausted
            }
        );
        assert_eq!(controller.phase(), PlaybackPhase::Closed);
        assert!(controller.scheduler().active().is_empty());

        assert_eq!(controller.on_tick(), Transition::Ignored);
        assert_eq!(controller.close(), Transition::Ignored);
        assert_eq!(ended_count(&mut rx), 1);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut controller = controller();
        let mut rx = controller.subscribe();
        controller.start(stories(3)).unwrap();

        assert_eq!(
            controller.close(),
            Transition::Ended {
                reason: EndReason::Closed
            }
        );
        assert_eq!(controller.close(), Transition::Ignored);
        assert_eq!(controller.advance(), Transition::Ignored);
        assert!(controller.snapshot().is_none());
        assert!(controller.scheduler().active().is_empty());
        assert_eq!(ended_count(&mut rx), 1);
    }

    #[test]
    fn test_close_before_start_is_noop() {
        let mut controller = controller();
        let mut rx = controller.subscribe();
        assert_eq!(controller.close(), Transition::Ignored);
        assert_eq!(controller.phase(), PlaybackPhase::Idle);
        assert_eq!(ended_count(&mut rx), 0);
    }

    #[test]
    fn test_restart_after_close() {
        let mut controller = controller();
        controller.start(stories(2)).unwrap();
        controller.close();

        controller.start(stories(3)).unwrap();
        assert_eq!(controller.phase(), PlaybackPhase::Playing);
        assert_eq!(controller.snapshot().unwrap().story_count, 3);
        assert_eq!(controller.scheduler().active().len(), 1);
    }

    #[test]
    fn test_events_published() {
        let mut controller = controller();
        let mut rx = controller.subscribe();
        controller.start(stories(2)).unwrap();
        controller.on_tick();
        controller.advance();

        assert!(matches!(
            rx.try_recv().unwrap(),
            PlaybackEvent::Started { story_count: 2, .. }
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            PlaybackEvent::ProgressUpdated { index: 0, .. }
        ));
        match rx.try_recv().unwrap() {
            PlaybackEvent::ItemChanged {
                from,
                to,
                cause,
                story,
            } => {
                assert_eq!((from, to, cause), (0, 1, AdvanceCause::Manual));
                assert_eq!(story.owner_name, "Owner2");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_progress_stays_in_bounds() {
        let mut controller = PlaybackController::new(
            ManualTickScheduler::new(),
            PlaybackTiming::from_millis(70, 200).unwrap(),
        );
        controller.start(stories(4)).unwrap();
        let mut previous: Option<PlaybackSnapshot> = None;

        while controller.phase() == PlaybackPhase::Playing {
            let snapshot = controller.snapshot().unwrap();
            assert!(snapshot.index < snapshot.story_count);
            assert!((0.0..=100.0).contains(&snapshot.progress));
            if let Some(previous) = previous {
                if previous.index == snapshot.index {
                    assert!(snapshot.progress >= previous.progress);
                } else {
                    assert!(snapshot.progress.abs() < f64::EPSILON);
                }
            }
            previous = Some(snapshot);
            controller.on_tick();
        }
        assert!(controller.scheduler().active().is_empty());
    }

    #[test]
    fn test_progress_monotonic_across_manual_navigation() {
        let mut controller = controller();
        controller.start(stories(3)).unwrap();
        let mut previous = controller.snapshot().unwrap();

        for step in 0..400 {
            match step % 97 {
                30 => {
                    controller.advance();
                }
                60 => {
                    controller.retreat();
                }
                _ => {
                    controller.on_tick();
                }
            }
            let Some(snapshot) = controller.snapshot() else {
                break;
            };
            if snapshot.index == previous.index {
                assert!(snapshot.progress >= previous.progress);
            } else {
                assert!(snapshot.progress.abs() < f64::EPSILON);
            }
            previous = snapshot;
        }
    }

    #[test]
    fn test_idle_subscriber_keeps_whole_session() {
        let mut controller = controller();
        let mut rx = controller.subscribe();
        controller.start(stories(3)).unwrap();
        tick_n(&mut controller, 300);
        assert_eq!(controller.phase(), PlaybackPhase::Closed);

        let mut received = 0;
        loop {
            match rx.try_recv() {
                Ok(_) => received += 1,
                Err(TryRecvError::Empty) => break,
                Err(e) => panic!("unexpected receive error {e:?}"),
            }
        }
        // started, 3 x 99 progress updates, 2 item changes, ended
        assert_eq!(received, 1 + 3 * 99 + 2 + 1);
        assert!(received <= EVENT_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_drop_cancels_timer() {
        let shared = SharedScheduler::default();
        let mut controller = PlaybackController::new(shared.clone(), PlaybackTiming::default());
        controller.start(stories(2)).unwrap();
        assert_eq!(shared.active_len(), 1);

        drop(controller);
        assert_eq!(shared.active_len(), 0);
    }

    #[derive(Clone, Default)]
    struct SharedScheduler(std::rc::Rc<std::cell::RefCell<ManualTickScheduler>>);

    impl SharedScheduler {
        fn active_len(&self) -> usize {
            self.0.borrow().active().len()
        }
    }

    impl TickScheduler for SharedScheduler {
        fn schedule(&mut self, interval: std::time::Duration) -> TimerId {
            self.0.borrow_mut().schedule(interval)
        }

        fn cancel(&mut self, id: TimerId) {
            self.0.borrow_mut().cancel(id);
        }
    }
}
