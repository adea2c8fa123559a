use std::fs::File;
use std::io;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

pub fn format_time(time: SystemTime) -> String {
    let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::from_secs(0));
    let secs = duration.as_secs();

    let (hour, remainder) = (secs / 3600, secs % 3600);
    let (min, sec) = (remainder / 60, remainder % 60);

    format!("{:02}:{:02}:{:02}", hour % 24, min, sec)
}

/// Bytes as mebibytes with two decimals.
pub fn format_mb(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / (1024.0 * 1024.0))
}

/// Installs the global subscriber. Output goes to stdout, and also to
/// `log_file` when one is given. `RUST_LOG` overrides the `info` default.
pub fn init_logging(log_file: Option<&str>) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(io::stdout.and(Mutex::new(file)))
                .init();
        }
        None => builder.init(),
    }
    Ok(())
}
