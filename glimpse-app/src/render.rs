//! Terminal rendering of viewer frames.

use glimpse_core::{Backdrop, ViewerFrame};
use std::io::Write;
use tracing::warn;

/// Characters per progress segment
const SEGMENT_WIDTH: u8 = 12;

pub struct FrameRenderer {
    json: bool,
    show_fills: bool,
    drawn: bool,
}

impl FrameRenderer {
    pub const fn new(json: bool, show_fills: bool) -> Self {
        Self {
            json,
            show_fills,
            drawn: false,
        }
    }

    pub fn draw(&mut self, frame: &ViewerFrame) {
        let mut stdout = std::io::stdout().lock();
        let result = if self.json {
            match serde_json::to_string(frame) {
                Ok(line) => writeln!(stdout, "{line}"),
                Err(e) => {
                    warn!("Failed to serialize frame: {e}");
                    return;
                }
            }
        } else {
            write!(stdout, "\r\x1b[2K{}", format_frame(frame, self.show_fills))
        };
        if result.and_then(|()| stdout.flush()).is_err() {
            return;
        }
        self.drawn = true;
    }

    /// End the status line so later log output starts on a fresh line.
    pub fn finish(&mut self) {
        if self.drawn && !self.json {
            println!();
        }
        self.drawn = false;
    }
}

/// One status line: segmented bar, owner badge, age and live marker.
pub fn format_frame(frame: &ViewerFrame, show_fills: bool) -> String {
    let mut line = String::new();

    if show_fills {
        let bars: Vec<String> = frame.fills.iter().map(|fill| segment(*fill)).collect();
        line.push('[');
        line.push_str(&bars.join("|"));
        line.push_str("] ");
    }

    let initial = frame.owner_initial.unwrap_or('?');
    line.push_str(&format!(
        "({initial}) {} · {}",
        frame.owner_name, frame.age_label
    ));
    if frame.is_live {
        line.push_str(" • LIVE");
    }
    if let Backdrop::Fallback(accent) = frame.backdrop {
        line.push_str(&format!(" [{}]", accent.hex()));
    }

    let back = if frame.can_retreat { '<' } else { ' ' };
    let forward = if frame.can_advance { '>' } else { ' ' };
    line.push_str(&format!("  {back} {}/{} {forward}", frame.index + 1, frame.story_count));
    line
}

fn segment(fill: f64) -> String {
    // fill is clamped to [0, 100] and SEGMENT_WIDTH is small
    let width = usize::from(SEGMENT_WIDTH);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = ((fill.clamp(0.0, 100.0) / 100.0) * f64::from(SEGMENT_WIDTH)).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}
