pub mod config;
pub mod controller;
pub mod error;
pub mod feed;
pub mod frame;
pub mod item;
pub mod layout;
pub mod navigation;
pub mod paths;
pub mod progress;
pub mod session;
pub mod time;
pub mod timer;
pub mod viewer;

pub use config::{
    CONFIG_TEMPLATE, FeedConfig, GlimpseConfig, LoggingConfig, PlaybackConfig, ViewerConfig,
};

pub use controller::{
    AdvanceCause, EVENT_CHANNEL_CAPACITY, EndReason, PlaybackController, PlaybackEvent, PlaybackPhase, PlaybackSnapshot,
    Transition,
};
pub use error::{GlimpseError, PlaybackError};
pub use feed::{JsonFileStoryFeed, StaticStoryFeed, StoryFeed, load_stories};
pub use frame::{Backdrop, MediaStatus, ViewerFrame};
pub use item::{AccentColor, StoryId, StoryItem};
pub use layout::{PaneVisibility, ViewportClass};
pub use navigation::Direction;
pub use paths::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, LOG_FILE_NAME, config_dir, log_file_path};
pub use progress::render_state;
pub use session::{PlaybackSession, PlaybackTiming};
pub use time::DurationExt;
pub use timer::{ManualTickScheduler, TickScheduler, TimerId, TokioTickScheduler};
pub use viewer::{StoryViewer, ViewerCommand};
