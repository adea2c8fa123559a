use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{error, info};

use crate::copy::TreeWalker;
use crate::error::{CopyError, Result};
use crate::filter::IgnoreRules;
use crate::progress::{ProgressCallback, ProgressInfo, ProgressState};
use crate::stats::WalkStats;
use crate::utils::{format_mb, format_time};

/// Everything one run needs. Built once and never changed during the walk.
#[derive(Debug, Clone)]
pub struct CopyTask {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub dry_run: bool,
    pub rules: IgnoreRules,
    /// Log every copied (or would-be copied) file
    pub log_file_names: bool,
}

impl CopyTask {
    pub fn new(source: PathBuf, destination: PathBuf, dry_run: bool, rules: IgnoreRules) -> Self {
        Self {
            source,
            destination,
            dry_run,
            rules,
            log_file_names: true,
        }
    }
}

pub struct CopyEngine {
    task: CopyTask,
    progress: Box<dyn ProgressCallback>,
}

impl CopyEngine {
    pub fn new(task: CopyTask, progress: Box<dyn ProgressCallback>) -> Self {
        Self { task, progress }
    }

    pub fn task(&self) -> &CopyTask {
        &self.task
    }

    /// Runs the walk. Statistics are returned for dry runs only.
    pub fn run(&self) -> Result<Option<WalkStats>> {
        let source = &self.task.source;
        let destination = &self.task.destination;

        validate_source(source)?;
        if !self.task.dry_run {
            check_destination(source, destination)?;
        }

        let start_time = SystemTime::now();
        info!(
            "USBCP - Started: {}\n    Source: {}\n    Destination: {}\n    Mode: {}",
            format_time(start_time),
            source.display(),
            destination.display(),
            if self.task.dry_run { "dry run" } else { "copy" }
        );

        let mut info = ProgressInfo {
            state: ProgressState::Scanning,
            ..Default::default()
        };
        self.progress.on_progress(&info);

        let stats = match self.walk() {
            Ok(stats) => stats,
            Err(e) => {
                error!("Walk aborted: {}", e);
                info.state = ProgressState::Failed;
                self.progress.on_progress(&info);
                return Err(e);
            }
        };

        let end_time = SystemTime::now();
        let elapsed = end_time
            .duration_since(start_time)
            .unwrap_or(Duration::from_secs(0));

        info!(
            "USBCP - Finished: {}\n{}\n    Size copied: {} MB\n    Elapsed time: {} seconds",
            format_time(end_time),
            stats.summary(self.task.dry_run),
            format_mb(stats.bytes_copied),
            elapsed.as_secs()
        );

        info = ProgressInfo {
            state: ProgressState::Completed,
            files_done: stats.files_copied,
            files_total: stats.files_copied,
            bytes_done: stats.bytes_copied,
            bytes_total: stats.bytes_copied,
            ..Default::default()
        };
        self.progress.on_progress(&info);

        Ok(self.task.dry_run.then_some(stats))
    }

    fn walk(&self) -> Result<WalkStats> {
        // Totals only size the progress of a real copy.
        let (files_total, bytes_total) = if self.task.dry_run {
            (0, 0)
        } else {
            TreeWalker::new(&self.task, self.progress.as_ref()).scan()?
        };
        TreeWalker::new(&self.task, self.progress.as_ref()).walk(files_total, bytes_total)
    }
}

/// Fails with [`CopyError::InvalidSource`] unless `source` is an existing
/// directory.
pub fn validate_source(source: &Path) -> Result<()> {
    if source.is_dir() {
        Ok(())
    } else {
        Err(CopyError::InvalidSource(source.to_path_buf()))
    }
}

fn check_destination(source: &Path, destination: &Path) -> Result<()> {
    let Ok(can_source) = fs::canonicalize(source) else {
        return Ok(());
    };
    let can_dest = fs::canonicalize(destination)
        .or_else(|_| std::path::absolute(destination))
        .unwrap_or_else(|_| destination.to_path_buf());

    if can_dest.starts_with(&can_source) {
        return Err(CopyError::DestinationInsideSource {
            source_dir: source.to_path_buf(),
            destination: destination.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct Recorder(Rc<RefCell<Vec<ProgressInfo>>>);

    impl ProgressCallback for Recorder {
        fn on_progress(&self, info: &ProgressInfo) {
            self.0.borrow_mut().push(info.clone());
        }
    }

    #[test]
    fn missing_source_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let task = CopyTask::new(
            tmp.path().join("nope"),
            tmp.path().join("dst"),
            false,
            IgnoreRules::default(),
        );
        let err = CopyEngine::new(task, Box::new(NullProgress)).run().unwrap_err();
        assert!(matches!(err, CopyError::InvalidSource(_)));
    }

    #[test]
    fn file_source_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.txt");
        fs::write(&file, b"a").unwrap();
        let task = CopyTask::new(file, tmp.path().join("dst"), true, IgnoreRules::default());
        let err = CopyEngine::new(task, Box::new(NullProgress)).run().unwrap_err();
        assert!(matches!(err, CopyError::InvalidSource(_)));
    }

    #[test]
    fn refuses_destination_inside_source() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a.txt"), b"a").unwrap();

        let task = CopyTask::new(src.clone(), src.join("backup"), false, IgnoreRules::default());
        let err = CopyEngine::new(task, Box::new(NullProgress)).run().unwrap_err();
        assert!(matches!(err, CopyError::DestinationInsideSource { .. }));
        assert!(!src.join("backup").exists());
    }

    #[test]
    fn real_run_returns_no_stats_and_reports_progress() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("docs")).unwrap();
        fs::write(src.join("a.txt"), b"0123456789").unwrap();
        fs::write(src.join("docs").join("b.md"), b"01234").unwrap();

        let events = Rc::new(RefCell::new(Vec::new()));
        let task = CopyTask::new(src, tmp.path().join("dst"), false, IgnoreRules::default());
        let result = CopyEngine::new(task, Box::new(Recorder(events.clone()))).run().unwrap();
        assert!(result.is_none());

        let events = events.borrow();
        assert_eq!(events.first().unwrap().state, ProgressState::Scanning);
        let last = events.last().unwrap();
        assert_eq!(last.state, ProgressState::Completed);
        assert_eq!((last.files_done, last.bytes_done), (2, 15));
        assert!(events
            .iter()
            .any(|e| e.state == ProgressState::Copying && e.files_total == 2 && e.bytes_total == 15));
    }
}
