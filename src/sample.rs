use std::time::Duration;

use serde::Serialize;

// ─── Status codes ────────────────────────────────────────────────

/// Status code of a shot whose backend call succeeded.
pub const STATUS_OK: u16 = 200;

/// Status code of a shot whose backend call returned an error.
pub const STATUS_ERR: u16 = 500;

// ─── Sample ──────────────────────────────────────────────────────

/// The outcome record for one shot.
///
/// A sample is created fresh at the start of every `shoot` call, tagged
/// with the ammo's label, and mutated only by that call: the gun sets the
/// latency once the backend call returns, classifies the outcome into a
/// status code, and appends the backend's protocol tag. It is then handed
/// to the aggregator exactly once and never touched again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sample {
    tags: Vec<String>,
    status_code: u16,
    latency: Duration,
}

impl Sample {
    /// A fresh, unclassified sample carrying the ammo tag.
    ///
    /// The status code starts at 0, meaning "not yet classified". Every
    /// shot classifies before reporting, so an aggregator never sees 0.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tags: vec![tag.into()],
            status_code: 0,
            latency: Duration::ZERO,
        }
    }

    /// Append a classification label, e.g. the backend protocol tag.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.push(tag.into());
    }

    pub fn set_status(&mut self, code: u16) {
        self.status_code = code;
    }

    pub fn set_latency(&mut self, latency: Duration) {
        self.latency = latency;
    }

    /// All labels attached so far, in attachment order: the ammo tag
    /// first, then any protocol tags.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Wall-clock time of the backend call, excluding classification
    /// and reporting.
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Convenience for sinks that only split on success/failure.
    pub fn is_ok(&self) -> bool {
        self.status_code == STATUS_OK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_keep_attachment_order() {
        let mut sample = Sample::new("ping");
        sample.add_tag("SQL");
        assert_eq!(sample.tags(), ["ping", "SQL"]);
    }

    #[test]
    fn starts_unclassified() {
        let sample = Sample::new("ping");
        assert_eq!(sample.status_code(), 0);
        assert!(!sample.is_ok());
        assert_eq!(sample.latency(), Duration::ZERO);
    }

    #[test]
    fn classification_is_visible() {
        let mut sample = Sample::new("ping");
        sample.set_status(STATUS_OK);
        sample.set_latency(Duration::from_micros(250));
        assert!(sample.is_ok());
        assert_eq!(sample.latency(), Duration::from_micros(250));
    }
}
