//! Async host loop for a story viewer.
//!
//! [`StoryViewer`] pairs a [`PlaybackController`] with a tokio-backed tick
//! scheduler and serializes timer fires, user commands and shutdown through a
//! single `select!`, so no two controller operations ever overlap.

use crate::controller::{EndReason, PlaybackController, Transition};
use crate::error::PlaybackError;
use crate::frame::{MediaStatus, ViewerFrame};
use crate::item::{StoryId, StoryItem};
use crate::session::PlaybackTiming;
use crate::timer::{TimerId, TokioTickScheduler};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "glimpse::viewer";

/// Input from the viewer's user or host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerCommand {
    Next,
    Previous,
    Close,
    /// Media for the given story finished loading
    MediaLoaded(StoryId),
    /// Media for the given story could not be loaded
    MediaFailed(StoryId),
}

/// Story viewer driven by real time. [`StoryViewer::run`] spawns its timers
/// and must be polled within a tokio runtime.
pub struct StoryViewer {
    controller: PlaybackController<TokioTickScheduler>,
    fired_rx: mpsc::UnboundedReceiver<TimerId>,
    media: MediaStatus,
}

impl StoryViewer {
    #[must_use]
    pub fn new(timing: PlaybackTiming) -> Self {
        let (scheduler, fired_rx) = TokioTickScheduler::new();
        Self {
            controller: PlaybackController::new(scheduler, timing),
            fired_rx,
            media: MediaStatus::Loading,
        }
    }

    #[must_use]
    pub const fn controller(&self) -> &PlaybackController<TokioTickScheduler> {
        &self.controller
    }

    /// Play `items` until the session ends, calling `on_frame` after every
    /// visible change.
    ///
    /// The session is closed when `cancel` fires or when every command sender
    /// has been dropped.
    ///
    /// # Errors
    ///
    /// Returns the `PlaybackError` from starting the session (for example an
    /// empty `items`); no frame is rendered in that case.
    pub async fn run<F>(
        &mut self,
        items: Vec<StoryItem>,
        commands: &mut mpsc::Receiver<ViewerCommand>,
        cancel: CancellationToken,
        mut on_frame: F,
    ) -> Result<EndReason, PlaybackError>
    where
        F: FnMut(&ViewerFrame),
    {
        self.controller.start(items)?;
        self.media = MediaStatus::Loading;
        self.render(&mut on_frame);

        loop {
            let media_before = self.media;

            let transition = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!(target: LOG_TARGET, "Viewer cancelled, closing session");
                    self.controller.close()
                }
                command = commands.recv() => match command {
                    Some(command) => self.apply(command),
                    None => {
                        debug!(target: LOG_TARGET, "Command channel closed, closing session");
                        self.controller.close()
                    }
                },
                Some(id) = self.fired_rx.recv() => self.controller.on_timer_fired(id),
            };

            match transition {
                Transition::Ended { reason } => return Ok(reason),
                Transition::Advanced { .. } => {
                    self.media = MediaStatus::Loading;
                    self.render(&mut on_frame);
                }
                Transition::Progressed { .. } => self.render(&mut on_frame),
                Transition::Ignored => {
                    if self.media != media_before {
                        self.render(&mut on_frame);
                    }
                }
            }
        }
    }

    fn apply(&mut self, command: ViewerCommand) -> Transition {
        match command {
            ViewerCommand::Next => self.controller.advance(),
            ViewerCommand::Previous => self.controller.retreat(),
            ViewerCommand::Close => self.controller.close(),
            ViewerCommand::MediaLoaded(id) => {
                if self.is_current(id) {
                    self.media = MediaStatus::Loaded;
                }
                Transition::Ignored
            }
            ViewerCommand::MediaFailed(id) => {
                if self.is_current(id) {
                    warn!(target: LOG_TARGET, "Media for story {} failed, using fallback backdrop", id);
                    self.media = MediaStatus::Failed;
                }
                Transition::Ignored
            }
        }
    }

    fn is_current(&self, id: StoryId) -> bool {
        self.controller
            .session()
            .is_some_and(|session| session.current_item().id == id)
    }

    fn render<F>(&self, on_frame: &mut F)
    where
        F: FnMut(&ViewerFrame),
    {
        if let Some(frame) = self.controller.frame(self.media) {
            on_frame(&frame);
        }
    }
}
