//! Wall-clock phase timing.

use log::info;
use std::time::Instant;

/// Logs the elapsed wall time of a build phase when dropped.
pub(crate) struct Timer {
    label: &'static str,
    enabled: bool,
    start: Instant,
}

impl Timer {
    pub(crate) fn new(label: &'static str, enabled: bool) -> Self {
        Self {
            label,
            enabled,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if self.enabled {
            info!("{} time: {:?}", self.label, self.start.elapsed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_is_quiet_when_disabled() {
        // Drop must not panic either way
        let _t = Timer::new("noop", false);
    }
}
