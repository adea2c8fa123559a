//! Plain-text dry-run report.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{CopyError, Result};
use crate::filter::IgnoreRules;
use crate::stats::{ExtStats, WalkStats};
use crate::utils::format_mb;

pub const REPORT_FILE_NAME: &str = "simulated_copy_log.txt";

pub fn render(stats: &WalkStats, rules: &IgnoreRules) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, stats, rules);
    out
}

pub fn write_to(path: &Path, stats: &WalkStats, rules: &IgnoreRules) -> Result<()> {
    fs::write(path, render(stats, rules)).map_err(|source| CopyError::Report {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Report written to {}", path.display());
    Ok(())
}

fn write_report(out: &mut String, stats: &WalkStats, rules: &IgnoreRules) -> std::fmt::Result {
    writeln!(out, "# Simulated Copy Log\n")?;

    writeln!(out, "## Ignored Directories")?;
    for d in rules.dirs() {
        writeln!(out, "- {}", d)?;
    }
    writeln!(out, "\n## Ignored Extensions")?;
    for e in rules.exts() {
        writeln!(out, "- {}", e)?;
    }
    writeln!(out, "\n## Ignored Files")?;
    for f in rules.files() {
        writeln!(out, "- {}", f)?;
    }

    writeln!(out, "\n## Files That Would Be Copied\n")?;
    for planned in &stats.planned {
        writeln!(
            out,
            "Would copy: {} -> {}",
            planned.source.display(),
            planned.destination.display()
        )?;
    }

    writeln!(out, "\n## Summary")?;
    writeln!(
        out,
        "Files to copy: {} ({} bytes, {} MB)",
        stats.files_copied,
        stats.bytes_copied,
        format_mb(stats.bytes_copied)
    )?;
    writeln!(
        out,
        "Files ignored: {} ({} bytes, {} MB)",
        stats.files_ignored,
        stats.bytes_ignored,
        format_mb(stats.bytes_ignored)
    )?;

    write_ext_table(out, "Copied Extensions", &stats.copied_sorted())?;
    write_ext_table(out, "Ignored Extensions", &stats.ignored_sorted())
}

fn write_ext_table(out: &mut String, title: &str, rows: &[(&str, ExtStats)]) -> std::fmt::Result {
    writeln!(out, "\n### {}", title)?;
    writeln!(out, "{:<12}{:>10}{:>15}{:>12}", "Extension", "Count", "Bytes", "Size (MB)")?;
    writeln!(out, "{}", "-".repeat(49))?;
    for (ext, s) in rows {
        let label = if ext.is_empty() { "[no ext]" } else { *ext };
        writeln!(
            out,
            "{:<12}{:>10}{:>15}{:>12}",
            label,
            s.count,
            s.bytes,
            format_mb(s.bytes)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample() -> WalkStats {
        let mut stats = WalkStats::new();
        stats.add_file_copied(".txt", 10);
        stats.add_planned(PathBuf::from("proj/a.txt"), PathBuf::from("SIMULATED_USB/proj/a.txt"));
        stats.add_file_ignored(".js", 5);
        stats.add_file_ignored(".bin", 3);
        stats.add_file_ignored("", 1);
        stats
    }

    #[test]
    fn report_lists_rules_plan_and_totals() {
        let text = render(&sample(), &IgnoreRules::default());

        assert!(text.starts_with("# Simulated Copy Log"));
        assert!(text.contains("- node_modules\n"));
        assert!(text.contains("- .pyc\n"));
        assert!(text.contains("- Thumbs.db\n"));
        assert!(text.contains("Would copy: proj/a.txt -> SIMULATED_USB/proj/a.txt"));
        assert!(text.contains("Files to copy: 1 (10 bytes, 0.00 MB)"));
        assert!(text.contains("Files ignored: 3 (9 bytes, 0.00 MB)"));
    }

    #[test]
    fn ignored_table_is_sorted_by_bytes() {
        let text = render(&sample(), &IgnoreRules::default());
        let table = &text[text.find("### Ignored Extensions").unwrap()..];
        let js = table.find(".js").unwrap();
        let bin = table.find(".bin").unwrap();
        let none = table.find("[no ext]").unwrap();
        assert!(js < bin && bin < none);
    }

    #[test]
    fn write_to_missing_directory_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("missing").join(REPORT_FILE_NAME);
        let err = write_to(&path, &sample(), &IgnoreRules::default()).unwrap_err();
        assert!(matches!(err, CopyError::Report { .. }));
    }
}
