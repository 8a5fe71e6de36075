use log::{debug, warn};

/// Thin wrapper so engine components log under one target.
pub struct LogManager {
    target: &'static str,
}

impl LogManager {
    pub fn new() -> Self {
        Self::for_target("waveviewcore")
    }

    pub fn for_target(target: &'static str) -> Self {
        Self { target }
    }

    pub fn trace_pass(&self, message: &str) {
        debug!(target: self.target, "{}", message);
    }

    pub fn warn(&self, message: &str) {
        warn!(target: self.target, "{}", message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
