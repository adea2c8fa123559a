//! Progress reporting for the copy walk.
//!
//! The walker reports through [`ProgressCallback`] so the engine never
//! depends on how (or whether) progress is rendered.

use std::io::Write;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    /// Not started
    Idle,
    /// Counting files to size the progress display
    Scanning,
    /// Copying files, or recording them in a dry run
    Copying,
    /// Walk finished without error
    Completed,
    /// Walk aborted on an error
    Failed,
}

/// Snapshot handed to a [`ProgressCallback`]
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    pub state: ProgressState,
    /// Path of the file currently being processed
    pub current_file: String,
    pub files_done: u64,
    /// Total number of files to process (0 if not scanned)
    pub files_total: u64,
    pub bytes_done: u64,
    /// Total bytes to copy (0 if not scanned)
    pub bytes_total: u64,
    pub current_file_bytes_done: u64,
    pub current_file_bytes_total: u64,
}

impl Default for ProgressInfo {
    fn default() -> Self {
        Self {
            state: ProgressState::Idle,
            current_file: String::new(),
            files_done: 0,
            files_total: 0,
            bytes_done: 0,
            bytes_total: 0,
            current_file_bytes_done: 0,
            current_file_bytes_total: 0,
        }
    }
}

impl ProgressInfo {
    /// Overall progress as a percentage (0-100)
    pub fn percentage(&self) -> f32 {
        if self.bytes_total == 0 {
            if self.files_total == 0 {
                0.0
            } else {
                (self.files_done as f32 / self.files_total as f32) * 100.0
            }
        } else {
            (self.bytes_done as f32 / self.bytes_total as f32) * 100.0
        }
    }
}

/// Observer for walk progress. Purely observational: implementations
/// cannot influence the walk.
pub trait ProgressCallback {
    fn on_progress(&self, info: &ProgressInfo);
}

/// Progress observer that does nothing.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Renders a single updating line on stdout.
pub struct CliProgress {
    show_progress: bool,
}

impl CliProgress {
    pub fn new(show_progress: bool) -> Self {
        Self { show_progress }
    }
}

impl ProgressCallback for CliProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if !self.show_progress {
            return;
        }

        match info.state {
            ProgressState::Scanning => {
                print!("\rScanning...");
                let _ = std::io::stdout().flush();
            }
            ProgressState::Copying if info.files_total == 0 => {
                print!("\r{} files", info.files_done);
                let _ = std::io::stdout().flush();
            }
            ProgressState::Copying => {
                print!(
                    "\r{:.0}% - {} of {} files",
                    info.percentage(),
                    info.files_done,
                    info.files_total
                );
                let _ = std::io::stdout().flush();
            }
            ProgressState::Completed => println!("\nCompleted!"),
            ProgressState::Failed => println!(),
            ProgressState::Idle => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_prefers_bytes() {
        let info = ProgressInfo {
            bytes_done: 25,
            bytes_total: 100,
            files_done: 9,
            files_total: 10,
            ..Default::default()
        };
        assert_eq!(info.percentage(), 25.0);
    }

    #[test]
    fn percentage_falls_back_to_file_count() {
        let info = ProgressInfo {
            files_done: 1,
            files_total: 4,
            ..Default::default()
        };
        assert_eq!(info.percentage(), 25.0);
        assert_eq!(ProgressInfo::default().percentage(), 0.0);
    }
}
