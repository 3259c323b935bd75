use std::{fmt, sync::Mutex};

/// Progress of one export run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportStatus {
    /// Run accepted; nothing exported yet.
    Started {
        /// Number of lines to export.
        total: usize,
    },
    /// One more image was handed to the sink.
    Progress {
        /// Images exported so far.
        completed: usize,
        /// Number of lines to export.
        total: usize,
    },
    /// Every line was exported.
    Finished {
        /// Images exported.
        exported: usize,
    },
    /// The run stopped on an error.
    Failed {
        /// Images exported before the failure.
        completed: usize,
        /// Number of lines to export.
        total: usize,
        /// Error text.
        reason: String,
    },
    /// The run was superseded or cancelled.
    Cancelled {
        /// Images exported before cancellation.
        completed: usize,
        /// Number of lines to export.
        total: usize,
    },
}

impl ExportStatus {
    /// `true` for the last status a run publishes.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Finished { .. } | Self::Failed { .. } | Self::Cancelled { .. }
        )
    }
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { total } => write!(f, "0 / {total}"),
            Self::Progress { completed, total } => write!(f, "{completed} / {total}"),
            Self::Finished { exported } => write!(f, "Done: exported {exported} images."),
            Self::Failed {
                completed,
                total,
                reason,
            } => write!(f, "Failed after {completed} / {total}: {reason}"),
            Self::Cancelled { completed, total } => {
                write!(f, "Cancelled after {completed} / {total}")
            }
        }
    }
}

/// Output channel an export run writes its status to.
pub trait StatusSink {
    /// Receive the next status. Calls arrive in order and never regress.
    fn publish(&mut self, status: &ExportStatus);
}

impl<F: FnMut(&ExportStatus)> StatusSink for F {
    fn publish(&mut self, status: &ExportStatus) {
        self(status)
    }
}

/// Discards every status.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStatus;

impl StatusSink for NullStatus {
    fn publish(&mut self, _status: &ExportStatus) {}
}

/// Records every status; the latest one is the current status line.
#[derive(Debug, Default)]
pub struct StatusLog {
    entries: Mutex<Vec<ExportStatus>>,
}

impl StatusLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every status published so far.
    pub fn entries(&self) -> Vec<ExportStatus> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Current status line text.
    pub fn current_text(&self) -> Option<String> {
        self.entries().last().map(ToString::to_string)
    }

    fn push(&self, status: &ExportStatus) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.push(status.clone());
    }
}

impl StatusSink for StatusLog {
    fn publish(&mut self, status: &ExportStatus) {
        self.push(status);
    }
}

impl StatusSink for &StatusLog {
    fn publish(&mut self, status: &ExportStatus) {
        self.push(status);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/status.rs"]
mod tests;
