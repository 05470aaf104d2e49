//! Runtime configuration: timing and placement constants.

use std::time::Duration;

use crate::position::{DEFAULT_GAP, VIEWPORT_PADDING};

/// Tunables shared by every controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Delay between pointer-enter/focus and a tooltip opening.
    pub tooltip_open_delay: Duration,
    /// Delay between pointer-leave/blur and a tooltip closing.
    pub tooltip_close_delay: Duration,
    /// Distance between a tooltip and its trigger.
    pub tooltip_gap: i32,
    /// Distance between a dropdown/select/popover panel and its trigger.
    pub floating_gap: i32,
    /// Minimum distance between a floating panel and the viewport edge.
    pub viewport_padding: i32,
    /// Auto-dismiss delay for toasts that don't specify one.
    pub toast_duration: Duration,
    /// Maximum number of toasts kept in the viewport.
    pub toast_limit: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tooltip_open_delay: Duration::from_millis(250),
            tooltip_close_delay: Duration::from_millis(80),
            tooltip_gap: 10,
            floating_gap: DEFAULT_GAP,
            viewport_padding: VIEWPORT_PADDING,
            toast_duration: Duration::from_millis(3500),
            toast_limit: 5,
        }
    }
}

impl RuntimeConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tooltip open delay (builder).
    pub fn with_tooltip_open_delay(mut self, delay: Duration) -> Self {
        self.tooltip_open_delay = delay;
        self
    }

    /// Set the tooltip close delay (builder).
    pub fn with_tooltip_close_delay(mut self, delay: Duration) -> Self {
        self.tooltip_close_delay = delay;
        self
    }

    /// Set the tooltip gap (builder).
    pub fn with_tooltip_gap(mut self, gap: i32) -> Self {
        self.tooltip_gap = gap;
        self
    }

    /// Set the floating panel gap (builder).
    pub fn with_floating_gap(mut self, gap: i32) -> Self {
        self.floating_gap = gap;
        self
    }

    /// Set the viewport padding (builder).
    pub fn with_viewport_padding(mut self, padding: i32) -> Self {
        self.viewport_padding = padding;
        self
    }

    /// Set the default toast duration (builder).
    pub fn with_toast_duration(mut self, duration: Duration) -> Self {
        self.toast_duration = duration;
        self
    }

    /// Set the toast queue limit (builder). A limit of zero is raised to one.
    pub fn with_toast_limit(mut self, limit: usize) -> Self {
        self.toast_limit = limit.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RuntimeConfig::new();
        assert_eq!(config.tooltip_open_delay, Duration::from_millis(250));
        assert_eq!(config.tooltip_close_delay, Duration::from_millis(80));
        assert_eq!(config.tooltip_gap, 10);
        assert_eq!(config.floating_gap, 8);
        assert_eq!(config.viewport_padding, 8);
        assert_eq!(config.toast_duration, Duration::from_millis(3500));
        assert_eq!(config.toast_limit, 5);
    }

    #[test]
    fn builder_chain() {
        let config = RuntimeConfig::new()
            .with_tooltip_open_delay(Duration::from_millis(100))
            .with_floating_gap(4)
            .with_toast_limit(0);
        assert_eq!(config.tooltip_open_delay, Duration::from_millis(100));
        assert_eq!(config.floating_gap, 4);
        assert_eq!(config.toast_limit, 1);
    }
}
