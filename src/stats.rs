use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Count and byte total of one extension bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtStats {
    pub count: u64,
    pub bytes: u64,
}

impl ExtStats {
    fn add(&mut self, bytes: u64) {
        self.count += 1;
        self.bytes += bytes;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCopy {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Totals gathered by one walk, split into copied and ignored files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub files_copied: u64,
    pub bytes_copied: u64,
    pub files_ignored: u64,
    pub bytes_ignored: u64,
    pub dirs_created: u64,
    pub dirs_ignored: u64,
    pub copied_by_ext: BTreeMap<String, ExtStats>,
    pub ignored_by_ext: BTreeMap<String, ExtStats>,
    pub planned: Vec<PlannedCopy>,
}

impl WalkStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file_copied(&mut self, ext: &str, bytes: u64) {
        self.files_copied += 1;
        self.bytes_copied += bytes;
        self.copied_by_ext.entry(ext.to_string()).or_default().add(bytes);
    }

    pub fn add_file_ignored(&mut self, ext: &str, bytes: u64) {
        self.files_ignored += 1;
        self.bytes_ignored += bytes;
        self.ignored_by_ext.entry(ext.to_string()).or_default().add(bytes);
    }

    pub fn add_planned(&mut self, source: PathBuf, destination: PathBuf) {
        self.planned.push(PlannedCopy { source, destination });
    }

    pub fn add_dir_created(&mut self) {
        self.dirs_created += 1;
    }

    pub fn add_dir_ignored(&mut self) {
        self.dirs_ignored += 1;
    }

    /// Copied buckets, largest byte total first, ties broken by extension.
    pub fn copied_sorted(&self) -> Vec<(&str, ExtStats)> {
        sorted_by_bytes(&self.copied_by_ext)
    }

    /// Ignored buckets, largest byte total first, ties broken by extension.
    pub fn ignored_sorted(&self) -> Vec<(&str, ExtStats)> {
        sorted_by_bytes(&self.ignored_by_ext)
    }

    pub fn total_bytes(&self) -> u64 {
        self.bytes_copied + self.bytes_ignored
    }

    pub fn summary(&self, dry_run: bool) -> Summary<'_> {
        Summary {
            stats: self,
            with_ignored_files: dry_run,
        }
    }
}

fn sorted_by_bytes(buckets: &BTreeMap<String, ExtStats>) -> Vec<(&str, ExtStats)> {
    let mut rows: Vec<_> = buckets.iter().map(|(ext, s)| (ext.as_str(), *s)).collect();
    rows.sort_by(|a, b| b.1.bytes.cmp(&a.1.bytes).then_with(|| a.0.cmp(b.0)));
    rows
}

impl fmt::Display for WalkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary(true))
    }
}

/// Finish-banner view of [`WalkStats`].
///
/// A real copy never descends into ignored directories, so its ignored-file
/// counters are incomplete and are left out.
pub struct Summary<'a> {
    stats: &'a WalkStats,
    with_ignored_files: bool,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.stats;
        writeln!(f, "Statistics:")?;
        writeln!(f, "    Directories created: {}", s.dirs_created)?;
        writeln!(f, "    Files copied:        {}", s.files_copied)?;
        writeln!(f, "    Bytes copied:        {}", s.bytes_copied)?;
        write!(f, "    Directories ignored: {}", s.dirs_ignored)?;
        if self.with_ignored_files {
            writeln!(f)?;
            writeln!(f, "    Files ignored:       {}", s.files_ignored)?;
            write!(f, "    Bytes ignored:       {}", s.bytes_ignored)?;
        }
        Ok(())
    }
}
