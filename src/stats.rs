//! Per-run counters shared by both tools

/// What happened to a single file during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Encrypted, decrypted, or (in a dry run) would have been encrypted.
    Processed,
    /// Already in the target state, or unreadable.
    Skipped,
    Failed,
}

/// Per-run counters shared by both tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub total_files: usize,
    pub processed_files: usize,
    pub skipped_files: usize,
    pub error_files: usize,
}

impl RunStats {
    /// Starts a run over `total_files` located files.
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Processed => self.processed_files += 1,
            Outcome::Skipped => self.skipped_files += 1,
            Outcome::Failed => self.error_files += 1,
        }
    }

    /// Every located file has been accounted for exactly once.
    pub fn is_complete(&self) -> bool {
        self.processed_files + self.skipped_files + self.error_files == self.total_files
    }

    pub fn is_success(&self) -> bool {
        self.error_files == 0
    }
}
