use std::path::Path;
use std::process::ExitCode;

use tracing::error;
use usbcp::args::print_usage;
use usbcp::report::{self, REPORT_FILE_NAME};
use usbcp::utils::init_logging;
use usbcp::{
    CliProgress, CopyEngine, CopyOptions, CopyTask, Result, SIMULATED_DRIVE, SystemVolumes, drive,
    first_removable_drive, resolve_source,
};

fn main() -> ExitCode {
    let options = match CopyOptions::parse() {
        Ok(opts) => opts,
        Err(e) => {
            let program = std::env::args().next().unwrap_or_else(|| "usbcp".to_string());
            eprintln!("Error: {}", e);
            print_usage(&program);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(options.log_file.as_deref()) {
        eprintln!("Error: cannot open log file: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(options: &CopyOptions) -> Result<()> {
    let rules = options.rules()?;
    let source = resolve_source(Path::new(&options.source))?;

    let root = match (&options.destination, options.dry_run) {
        (Some(dest), _) => dest.into(),
        (None, true) => SIMULATED_DRIVE.into(),
        (None, false) => first_removable_drive(&SystemVolumes)?,
    };
    let destination = drive::destination_on(&root, &source)?;

    tracing::info!("{} {} - Options: {}", usbcp::APP_NAME, usbcp::VERSION, options.to_string_flags());

    let mut task = CopyTask::new(source, destination, options.dry_run, rules.clone());
    task.log_file_names = options.log_file_names;

    let progress = Box::new(CliProgress::new(options.show_progress));
    let stats = CopyEngine::new(task, progress).run()?;

    if let Some(stats) = stats {
        let report_path = options.report_file.as_deref().unwrap_or(REPORT_FILE_NAME);
        report::write_to(Path::new(report_path), &stats, &rules)?;
    }
    Ok(())
}
