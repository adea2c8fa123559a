use std::ffi::{OsStr, OsString};
use std::fs::{self, File, Metadata};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use filetime::FileTime;
use tracing::{debug, info, warn};

use crate::engine::CopyTask;
use crate::error::{CopyError, IoResultExt, Result};
use crate::filter::extension_of;
use crate::progress::{ProgressCallback, ProgressInfo, ProgressState};
use crate::stats::WalkStats;

const BUFFER_SIZE: usize = 64 * 1024;

/// Depth-first walk of one [`CopyTask`].
///
/// Keeps the canonical path of every directory on the current descent so a
/// symlinked directory pointing back up the tree is reported instead of
/// recursing forever.
pub(crate) struct TreeWalker<'a> {
    task: &'a CopyTask,
    progress: &'a dyn ProgressCallback,
    stats: WalkStats,
    info: ProgressInfo,
    ancestors: Vec<PathBuf>,
}

impl<'a> TreeWalker<'a> {
    pub(crate) fn new(task: &'a CopyTask, progress: &'a dyn ProgressCallback) -> Self {
        Self {
            task,
            progress,
            stats: WalkStats::new(),
            info: ProgressInfo::default(),
            ancestors: Vec::new(),
        }
    }

    /// Counts the files and bytes the walk would copy.
    pub(crate) fn scan(&mut self) -> Result<(u64, u64)> {
        let root = fs::canonicalize(&self.task.source).at(&self.task.source)?;
        self.ancestors = vec![root];
        let source = self.task.source.clone();
        let totals = self.scan_directory(&source);
        self.ancestors.clear();
        totals
    }

    pub(crate) fn walk(mut self, files_total: u64, bytes_total: u64) -> Result<WalkStats> {
        let source = self.task.source.clone();
        let destination = self.task.destination.clone();

        let root = fs::canonicalize(&source).at(&source)?;
        self.ancestors = vec![root];
        self.info = ProgressInfo {
            state: ProgressState::Copying,
            files_total,
            bytes_total,
            ..Default::default()
        };
        self.progress.on_progress(&self.info);

        if !self.task.dry_run {
            self.create_dir(&destination)?;
        }
        self.copy_directory(&source, &destination)?;
        Ok(self.stats)
    }

    fn copy_directory(&mut self, src_dir: &Path, dst_dir: &Path) -> Result<()> {
        for Child { path, name, lossy } in read_dir_sorted(src_dir)? {
            let meta = fs::metadata(&path).at(&path)?;

            if meta.is_dir() {
                if self.task.rules.should_ignore(&lossy, true) {
                    debug!("Skipping ignored directory: {}", path.display());
                    self.stats.add_dir_ignored();
                    if self.task.dry_run {
                        self.enter(&path, &name)?;
                        self.record_ignored_tree(&path)?;
                        self.ancestors.pop();
                    }
                    continue;
                }

                let dst_subdir = dst_dir.join(&name);
                self.enter(&path, &name)?;
                if !self.task.dry_run {
                    self.create_dir(&dst_subdir)?;
                }
                self.copy_directory(&path, &dst_subdir)?;
                self.ancestors.pop();
                continue;
            }

            let ext = extension_of(&lossy);
            let size = meta.len();
            if self.task.rules.should_ignore(&lossy, false) {
                debug!("Skipping ignored file: {}", path.display());
                if self.task.dry_run {
                    self.stats.add_file_ignored(&ext, size);
                }
                continue;
            }

            let dst_path = dst_dir.join(&name);
            self.info.current_file = path.to_string_lossy().to_string();
            self.info.current_file_bytes_total = size;
            self.info.current_file_bytes_done = 0;

            if self.task.dry_run {
                if !meta.is_file() {
                    warn!("Not a regular file, a real copy would fail: {}", path.display());
                }
                if self.task.log_file_names {
                    info!("Would copy: {} -> {}", path.display(), dst_path.display());
                }
                self.stats.add_planned(path.clone(), dst_path);
            } else {
                if self.task.log_file_names {
                    info!("Copying: {} -> {}", path.display(), dst_path.display());
                }
                self.copy_file(&path, &dst_path, &meta)?;
            }

            self.stats.add_file_copied(&ext, size);
            self.info.files_done += 1;
            self.info.bytes_done += size;
            self.info.current_file_bytes_done = size;
            self.progress.on_progress(&self.info);
        }
        Ok(())
    }

    /// Adds every file below an ignored directory to the ignored buckets.
    fn record_ignored_tree(&mut self, dir: &Path) -> Result<()> {
        for Child { path, name, lossy } in read_dir_sorted(dir)? {
            let meta = fs::metadata(&path).at(&path)?;
            if meta.is_dir() {
                self.enter(&path, &name)?;
                self.record_ignored_tree(&path)?;
                self.ancestors.pop();
            } else {
                self.stats.add_file_ignored(&extension_of(&lossy), meta.len());
            }
        }
        Ok(())
    }

    fn scan_directory(&mut self, dir: &Path) -> Result<(u64, u64)> {
        let mut files = 0;
        let mut bytes = 0;
        for Child { path, name, lossy } in read_dir_sorted(dir)? {
            let meta = fs::metadata(&path).at(&path)?;
            if meta.is_dir() {
                if self.task.rules.should_ignore(&lossy, true) {
                    continue;
                }
                self.enter(&path, &name)?;
                let (f, b) = self.scan_directory(&path)?;
                self.ancestors.pop();
                files += f;
                bytes += b;
            } else if !self.task.rules.should_ignore(&lossy, false) {
                files += 1;
                bytes += meta.len();
            }
        }
        Ok((files, bytes))
    }

    /// Pushes the canonical path of `path` onto the descent stack, failing if
    /// it is already there.
    fn enter(&mut self, path: &Path, name: &OsStr) -> Result<()> {
        let is_link = fs::symlink_metadata(path).at(path)?.file_type().is_symlink();
        let canonical = match (is_link, self.ancestors.last()) {
            (false, Some(parent)) => parent.join(name),
            _ => fs::canonicalize(path).at(path)?,
        };
        if self.ancestors.contains(&canonical) {
            return Err(CopyError::SymlinkCycle(path.to_path_buf()));
        }
        self.ancestors.push(canonical);
        Ok(())
    }

    fn create_dir(&mut self, dir: &Path) -> Result<()> {
        if !dir.is_dir() {
            debug!("Creating directory: {}", dir.display());
            fs::create_dir_all(dir).at(dir)?;
            self.stats.add_dir_created();
        }
        Ok(())
    }

    fn copy_file(&mut self, src_path: &Path, dst_path: &Path, src_meta: &Metadata) -> Result<()> {
        // Opening a FIFO blocks until a writer appears.
        if !src_meta.is_file() {
            return Err(CopyError::CopyFailure {
                path: src_path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::Unsupported, "not a regular file"),
            });
        }
        make_writable(dst_path)?;

        let mut src_file = File::open(src_path).at(src_path)?;
        let mut dst_file = File::create(dst_path).at(dst_path)?;
        let mut buffer = vec![0; BUFFER_SIZE];

        loop {
            let bytes_read = src_file.read(&mut buffer).at(src_path)?;
            if bytes_read == 0 {
                break;
            }
            dst_file.write_all(&buffer[..bytes_read]).at(dst_path)?;

            self.info.current_file_bytes_done += bytes_read as u64;
            self.progress.on_progress(&self.info);
        }
        dst_file.flush().at(dst_path)?;
        drop(dst_file);

        fs::set_permissions(dst_path, src_meta.permissions()).at(dst_path)?;
        filetime::set_file_times(
            dst_path,
            FileTime::from_last_access_time(src_meta),
            FileTime::from_last_modification_time(src_meta),
        )
        .at(dst_path)?;
        Ok(())
    }
}

/// One directory entry. `name` is the exact on-disk name used for paths;
/// `lossy` is only for matching ignore rules.
struct Child {
    path: PathBuf,
    name: OsString,
    lossy: String,
}

/// Children of `dir`, ordered by name.
fn read_dir_sorted(dir: &Path) -> Result<Vec<Child>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).at(dir)? {
        let entry = entry.at(dir)?;
        let name = entry.file_name();
        let lossy = name.to_string_lossy().to_string();
        entries.push(Child {
            path: entry.path(),
            name,
            lossy,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Clears the read-only flag on an existing destination file so it can be
/// overwritten.
#[allow(clippy::permissions_set_readonly_false)]
fn make_writable(path: &Path) -> Result<()> {
    if let Ok(meta) = fs::metadata(path) {
        let mut perms = meta.permissions();
        if meta.is_file() && perms.readonly() {
            perms.set_readonly(false);
            fs::set_permissions(path, perms).at(path)?;
        }
    }
    Ok(())
}
