//! Viewport classification for the two-pane conversation layout.
//!
//! The viewport width is always passed in by the host; nothing here reads
//! global window state.

use serde::{Deserialize, Serialize};

/// Default width, in logical pixels, at which both panes fit side by side.
pub const DEFAULT_BREAKPOINT_PX: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportClass {
    /// Narrower than the breakpoint: one pane at a time
    Compact,
    Wide,
}

impl ViewportClass {
    #[must_use]
    pub const fn from_width(width_px: u32, breakpoint_px: u32) -> Self {
        if width_px < breakpoint_px {
            Self::Compact
        } else {
            Self::Wide
        }
    }
}

/// Which panes of the conversation screen are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneVisibility {
    pub list: bool,
    pub detail: bool,
}

impl PaneVisibility {
    /// On wide viewports both panes are shown. On compact ones a selection
    /// swaps the list out for the detail pane.
    #[must_use]
    pub const fn resolve(viewport: ViewportClass, has_selection: bool) -> Self {
        match viewport {
            ViewportClass::Wide => Self {
                list: true,
                detail: true,
            },
            ViewportClass::Compact => Self {
                list: !has_selection,
                detail: has_selection,
            },
        }
    }
}
