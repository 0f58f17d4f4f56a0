mod input;
mod render;

use crate::render::FrameRenderer;
use glimpse_core::{
    EndReason, GlimpseConfig, GlimpseError, JsonFileStoryFeed, PaneVisibility, PlaybackEvent,
    StaticStoryFeed, StoryFeed, StoryViewer, load_stories,
};
use std::fs::File;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let file_logging_enabled = check_file_logging_enabled();
    init_tracing(file_logging_enabled);

    let json_output = std::env::args().skip(1).any(|arg| arg == "--json");

    let config = match GlimpseConfig::load_or_create() {
        Ok(config) => config,
        Err(GlimpseError::ConfigNotFound { path }) => {
            info!(
                "Created config template at {}; using defaults for this run",
                path.display()
            );
            GlimpseConfig::default()
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let timing = match config.playback_timing() {
        Ok(timing) => timing,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let viewport = config.viewport();
    info!(
        "Viewport {:?} at {}px, conversation panes with a selection: {:?}",
        viewport,
        config.viewer.width_px,
        PaneVisibility::resolve(viewport, true)
    );

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    // Create shared cancellation token for graceful shutdown
    let cancel_token = CancellationToken::new();

    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, closing viewer...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {}", e);
    }

    let exit_code = runtime.block_on(async move {
        let stories = load_stories(&create_feeds(&config)).await;
        if stories.is_empty() {
            warn!("No stories to show");
            return 0;
        }

        let mut viewer = StoryViewer::new(timing);
        let (command_tx, mut command_rx) = mpsc::channel(16);
        tokio::spawn(input::forward_stdin_commands(command_tx, cancel_token.clone()));
        tokio::spawn(log_playback_events(viewer.controller().subscribe()));

        let mut renderer = FrameRenderer::new(json_output, config.viewer.show_fills);
        let outcome = viewer
            .run(stories, &mut command_rx, cancel_token.clone(), |frame| {
                renderer.draw(frame);
            })
            .await;

        match outcome {
            Ok(reason) => {
                renderer.finish();
                info!(
                    "Viewer dismissed: {}",
                    match reason {
                        EndReason::Exhausted => "all stories watched",
                        EndReason::Closed => "closed",
                    }
                );
                cancel_token.cancel();
                0
            }
            Err(e) => {
                error!("{e}");
                1
            }
        }
    });

    runtime.shutdown_background();
    std::process::exit(exit_code);
}

/// Stories come from the configured JSON file when present, falling back to the demo set.
fn create_feeds(config: &GlimpseConfig) -> Vec<Box<dyn StoryFeed>> {
    let mut feeds: Vec<Box<dyn StoryFeed>> = Vec::new();
    if let Some(path) = &config.feed.path {
        feeds.push(Box::new(JsonFileStoryFeed::new(path)));
    }
    feeds.push(Box::new(StaticStoryFeed::demo()));
    feeds
}

async fn log_playback_events(mut rx: broadcast::Receiver<PlaybackEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => match &event {
                PlaybackEvent::Started { story_count, story } => {
                    info!(
                        "Showing {} stories, starting with {} ({})",
                        story_count,
                        story.owner_name,
                        story.age_label()
                    );
                }
                PlaybackEvent::ItemChanged {
                    to, cause, story, ..
                } => {
                    info!("Story {} by {} ({:?})", to + 1, story.owner_name, cause);
                }
                PlaybackEvent::ProgressUpdated { .. } => {
                    // Rendered by the frame renderer
                }
                PlaybackEvent::SessionEnded { reason } => {
                    info!("Story session ended: {:?}", reason);
                }
            },
            Err(broadcast::error::RecvError::Closed) => break,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("Missed {} playback events", n);
            }
        }
    }
}

/// Check whether file logging is enabled without a full config load
fn check_file_logging_enabled() -> bool {
    // Minimal structs to parse just the logging.enabled field
    #[derive(serde::Deserialize)]
    struct PartialConfig {
        #[serde(default)]
        logging: PartialLoggingConfig,
    }
    #[derive(serde::Deserialize, Default)]
    struct PartialLoggingConfig {
        #[serde(default)]
        enabled: bool,
    }

    let config_path = GlimpseConfig::config_path();
    let Ok(content) = std::fs::read_to_string(&config_path) else {
        return false;
    };

    toml::from_str::<PartialConfig>(&content)
        .map(|c| c.logging.enabled)
        .unwrap_or(false)
}

/// Initialize tracing with console output and optional file logging
fn init_tracing(file_logging_enabled: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if file_logging_enabled {
        let log_path = glimpse_core::log_file_path();

        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match File::create(&log_path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .with(file_layer)
                    .init();

                return;
            }
            Err(e) => {
                eprintln!("Failed to create log file at {}: {e}", log_path.display());
            }
        }
    }

    // Fallback: console only
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
