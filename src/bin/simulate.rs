//! Dry-runs a copy and writes `simulated_copy_log.txt` in the working
//! directory.
//!
//! The source is the first argument, else `USBCP_SIMULATE_SOURCE`, else the
//! current directory.

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::{error, info};
use usbcp::report::REPORT_FILE_NAME;
use usbcp::utils::{format_mb, init_logging};
use usbcp::{IgnoreRules, simulate_copy};

const SOURCE_ENV: &str = "USBCP_SIMULATE_SOURCE";

fn main() -> ExitCode {
    if let Err(e) = init_logging(None) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let source = env::args()
        .nth(1)
        .or_else(|| env::var(SOURCE_ENV).ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    match simulate_copy(&source, IgnoreRules::default(), Path::new(REPORT_FILE_NAME)) {
        Ok(stats) => {
            info!(
                "Would copy {} files ({} MB), ignoring {} files ({} MB)",
                stats.files_copied,
                format_mb(stats.bytes_copied),
                stats.files_ignored,
                format_mb(stats.bytes_ignored)
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
