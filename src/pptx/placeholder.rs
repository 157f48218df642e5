//! Layout defaults for placeholder shapes.
//!
//! A slide placeholder normally inherits its frame and text style from the
//! slide layout. When the slide carries no `a:xfrm` for it, these canonical
//! values stand in for the layout.

use crate::model::{PlaceholderRole, TextAlignment, VerticalAnchor};
use crate::units::EmuRect;

/// Canonical frame and text style of one placeholder role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceholderDefaults {
    /// Frame as fractions of the slide size: x, y, width, height
    pub frame: [f64; 4],
    /// Default font size in points
    pub font_size: f64,
    pub alignment: TextAlignment,
    pub anchor: VerticalAnchor,
}

impl PlaceholderDefaults {
    /// Defaults for a role; `None` for roles without canonical defaults
    /// (dates, footers, slide numbers, ...).
    pub fn for_role(role: &PlaceholderRole) -> Option<Self> {
        let defaults = match role {
            PlaceholderRole::CenterTitle => PlaceholderDefaults {
                frame: [0.125, 0.164, 0.75, 0.348],
                font_size: 60.0,
                alignment: TextAlignment::Center,
                anchor: VerticalAnchor::Bottom,
            },
            PlaceholderRole::Subtitle => PlaceholderDefaults {
                frame: [0.125, 0.525, 0.75, 0.241],
                font_size: 24.0,
                alignment: TextAlignment::Center,
                anchor: VerticalAnchor::Top,
            },
            PlaceholderRole::Title => PlaceholderDefaults {
                frame: [0.069, 0.053, 0.8625, 0.193],
                font_size: 44.0,
                alignment: TextAlignment::Center,
                anchor: VerticalAnchor::Middle,
            },
            PlaceholderRole::Body => PlaceholderDefaults {
                frame: [0.069, 0.266, 0.8625, 0.634],
                font_size: 28.0,
                alignment: TextAlignment::Left,
                anchor: VerticalAnchor::Top,
            },
            PlaceholderRole::Other(_) => return None,
        };
        Some(defaults)
    }

    /// Frame scaled to a slide of `slide_cx` x `slide_cy` EMUs.
    pub fn frame_for_slide(&self, slide_cx: i64, slide_cy: i64) -> EmuRect {
        let [fx, fy, fw, fh] = self.frame;
        let scale = |f: f64, total: i64| (f * total as f64).round() as i64;
        EmuRect::new(
            scale(fx, slide_cx),
            scale(fy, slide_cy),
            scale(fw, slide_cx),
            scale(fh, slide_cy),
        )
    }
}
