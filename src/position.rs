//! Floating positioner: where a panel goes relative to its trigger.
//!
//! Pure arithmetic over rectangles supplied by the host. The panel sits
//! `gap` pixels above or below the trigger, aligned to its start, center or
//! end, then is clamped so no edge comes closer than `padding` pixels to the
//! viewport edge. Clamping wins over the requested alignment.

use crate::geometry::{Offset, Region, Size};

/// Default distance between trigger and panel.
pub const DEFAULT_GAP: i32 = 8;

/// Minimum distance between a panel and any viewport edge.
pub const VIEWPORT_PADDING: i32 = 8;

// ---------------------------------------------------------------------------
// Side / Align / Placement
// ---------------------------------------------------------------------------

/// Which side of the trigger the panel opens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
}

impl Side {
    /// Parse a `data-side` value.
    pub fn parse(value: &str) -> Option<Side> {
        match value.trim() {
            "top" => Some(Side::Top),
            "bottom" => Some(Side::Bottom),
            _ => None,
        }
    }
}

/// Horizontal alignment of the panel against the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Align {
    Start,
    Center,
    End,
}

impl Align {
    /// Parse a `data-align` value.
    pub fn parse(value: &str) -> Option<Align> {
        match value.trim() {
            "start" => Some(Align::Start),
            "center" => Some(Align::Center),
            "end" => Some(Align::End),
            _ => None,
        }
    }
}

/// Requested side and alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub side: Side,
    pub align: Align,
}

impl Placement {
    /// Create a placement.
    pub const fn new(side: Side, align: Align) -> Self {
        Self { side, align }
    }

    /// Resolve `data-side` / `data-align` values, falling back to `self` for
    /// missing or unrecognized values.
    pub fn with_overrides(self, side: Option<&str>, align: Option<&str>) -> Self {
        Self {
            side: side.and_then(Side::parse).unwrap_or(self.side),
            align: align.and_then(Align::parse).unwrap_or(self.align),
        }
    }
}

// ---------------------------------------------------------------------------
// compute_position
// ---------------------------------------------------------------------------

/// Top-left corner for a panel of size `content` anchored to `trigger`.
pub fn compute_position(
    trigger: Region,
    content: Size,
    viewport: Size,
    placement: Placement,
    gap: i32,
    padding: i32,
) -> Offset {
    let top = match placement.side {
        Side::Top => trigger.y - gap - content.height,
        Side::Bottom => trigger.bottom() + gap,
    };
    let left = match placement.align {
        Align::Start => trigger.x,
        Align::Center => trigger.x + (trigger.width - content.width).div_euclid(2),
        Align::End => trigger.right() - content.width,
    };
    Offset::new(
        clamp_axis(left, content.width, viewport.width, padding),
        clamp_axis(top, content.height, viewport.height, padding),
    )
}

/// Keep `[value, value + size)` inside `[padding, extent - padding]`.
///
/// When the panel is larger than the available space the leading edge wins.
fn clamp_axis(value: i32, size: i32, extent: i32, padding: i32) -> i32 {
    let max = extent - size - padding;
    value.min(max).max(padding)
}

// ===========================================================================
// Tests
// ===========================================================================
