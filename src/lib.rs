//! USBCP - copy a project tree to a removable drive
//!
//! Walks a source directory, leaves behind build output, caches and other
//! clutter matched by [`IgnoreRules`], and either copies the rest to the
//! first removable drive or, in a dry run, reports what would be copied.

pub mod args;
pub mod config;
pub mod drive;
pub mod error;
pub mod filter;
pub mod report;
pub mod stats;
pub mod utils;

mod copy;
mod engine;
mod progress;

use std::fs;
use std::path::{Path, PathBuf};

pub use args::CopyOptions;
pub use drive::{SystemVolumes, Volume, VolumeKind, VolumeSource, first_removable_drive};
pub use engine::{CopyEngine, CopyTask, validate_source};
pub use error::{CopyError, Result};
pub use filter::IgnoreRules;
pub use progress::{CliProgress, NullProgress, ProgressCallback, ProgressInfo, ProgressState};
pub use stats::{ExtStats, PlannedCopy, Summary, WalkStats};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "USBCP";

/// Destination root used by dry runs in place of a real drive.
pub const SIMULATED_DRIVE: &str = "SIMULATED_USB";

/// Copies `source` to `<first removable drive>/<source name>`.
///
/// A `None` ignore set keeps its default. With `dry_run` nothing is written
/// and no drive is looked up; the would-be copies are only logged.
pub fn smart_copy_to_pendrive(
    source: impl AsRef<Path>,
    dry_run: bool,
    ignore_dirs: Option<Vec<String>>,
    ignore_exts: Option<Vec<String>>,
    ignore_files: Option<Vec<String>>,
) -> Result<()> {
    let rules = IgnoreRules::with_overrides(ignore_dirs, ignore_exts, ignore_files);
    copy_to_removable(source.as_ref(), dry_run, rules, &SystemVolumes, Box::new(NullProgress))?;
    Ok(())
}

/// [`smart_copy_to_pendrive`] with explicit collaborators.
///
/// The source is checked before any volume is enumerated.
pub fn copy_to_removable(
    source: &Path,
    dry_run: bool,
    rules: IgnoreRules,
    volumes: &dyn VolumeSource,
    progress: Box<dyn ProgressCallback>,
) -> Result<Option<WalkStats>> {
    let source = resolve_source(source)?;
    let destination = if dry_run {
        drive::destination_on(Path::new(SIMULATED_DRIVE), &source)?
    } else {
        let drive = first_removable_drive(volumes)?;
        drive::destination_on(&drive, &source)?
    };

    CopyEngine::new(CopyTask::new(source, destination, dry_run, rules), progress).run()
}

/// Dry-runs a copy of `source` and writes the text report to `report_path`.
pub fn simulate_copy(source: &Path, rules: IgnoreRules, report_path: &Path) -> Result<WalkStats> {
    let source = resolve_source(source)?;
    let destination = drive::destination_on(Path::new(SIMULATED_DRIVE), &source)?;
    let task = CopyTask::new(source, destination, true, rules.clone());

    let stats = CopyEngine::new(task, Box::new(NullProgress))
        .run()?
        .unwrap_or_default();
    report::write_to(report_path, &stats, &rules)?;
    Ok(stats)
}

/// Validates `source` and resolves it to an absolute path so its folder name
/// is known even for inputs like `.`.
pub fn resolve_source(source: &Path) -> Result<PathBuf> {
    validate_source(source)?;
    fs::canonicalize(source).map_err(|_| CopyError::InvalidSource(source.to_path_buf()))
}
