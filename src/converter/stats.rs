use log::{info, warn};

/// Per-run conversion counters, reset for every request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversionStats {
    pub documents_converted: usize,
    pub documents_skipped: usize,
    pub attachments_saved: usize,
    pub image_fetch_failures: usize,
}

impl ConversionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs the end-of-run summary.
    pub fn log_summary(&self) {
        info!(
            "Conversion finished: {} document(s) converted, {} attachment(s) saved",
            self.documents_converted, self.attachments_saved
        );
        if self.documents_skipped > 0 {
            warn!("{} document(s) skipped", self.documents_skipped);
        }
        if self.image_fetch_failures > 0 {
            warn!("{} image fetch(es) failed", self.image_fetch_failures);
        }
    }
}
