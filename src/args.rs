use std::env;
use std::path::Path;

use crate::config::IgnoreConfig;
use crate::error::Result;
use crate::filter::IgnoreRules;

#[derive(Debug, Clone)]
pub struct CopyOptions {
    pub source: String,
    /// Explicit destination root; the removable drive is detected when unset
    pub destination: Option<String>,
    pub dry_run: bool,
    pub ignore_dirs: Option<Vec<String>>,
    pub ignore_exts: Option<Vec<String>>,
    pub ignore_files: Option<Vec<String>>,
    pub config_file: Option<String>,
    pub report_file: Option<String>,
    pub log_file: Option<String>,
    pub show_progress: bool,
    pub log_file_names: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        CopyOptions {
            source: String::new(),
            destination: None,
            dry_run: false,
            ignore_dirs: None,
            ignore_exts: None,
            ignore_files: None,
            config_file: None,
            report_file: None,
            log_file: None,
            show_progress: true,
            log_file_names: true,
        }
    }
}

impl CopyOptions {
    pub fn parse() -> std::result::Result<Self, String> {
        let args: Vec<String> = env::args().skip(1).collect();
        Self::parse_from(&args)
    }

    /// Parses arguments without the program name.
    pub fn parse_from(args: &[String]) -> std::result::Result<Self, String> {
        if args.is_empty() {
            return Err("Not enough arguments".to_string());
        }

        let mut options = CopyOptions::default();
        let mut positional_args = Vec::new();

        for arg in args {
            // Unknown flags are paths
            if !(arg.starts_with('/') && options.apply_flag(arg)) {
                positional_args.push(arg.clone());
            }
        }

        match positional_args.as_slice() {
            [source] => options.source = source.clone(),
            [] => return Err("Missing source directory".to_string()),
            [_, extra, ..] => return Err(format!("Unexpected argument: {}", extra)),
        }

        Ok(options)
    }

    fn apply_flag(&mut self, arg: &str) -> bool {
        let upper_arg = arg.to_uppercase();
        match upper_arg.as_str() {
            "/L" => self.dry_run = true,
            "/NP" => self.show_progress = false,
            "/NFL" => self.log_file_names = false,
            _ => {
                let Some((_, value)) = arg.split_once(':') else {
                    return false;
                };
                let value = value.to_string(); // Use original case
                match upper_arg.split(':').next() {
                    Some("/XD") => self.ignore_dirs = Some(split_list(&value)),
                    Some("/XE") => self.ignore_exts = Some(split_list(&value)),
                    Some("/XF") => self.ignore_files = Some(split_list(&value)),
                    Some("/DEST") => self.destination = Some(value),
                    Some("/CONFIG") => self.config_file = Some(value),
                    Some("/REPORT") => self.report_file = Some(value),
                    Some("/LOG") => self.log_file = Some(value),
                    _ => return false,
                }
            }
        }
        true
    }

    /// Ignore rules from built-in defaults, then the config file, then the
    /// command line.
    pub fn rules(&self) -> Result<IgnoreRules> {
        let from_file = match &self.config_file {
            Some(path) => IgnoreConfig::load(Path::new(path))?,
            None => IgnoreConfig::default(),
        };
        let from_cli = IgnoreConfig {
            dirs: self.ignore_dirs.clone(),
            extensions: self.ignore_exts.clone(),
            files: self.ignore_files.clone(),
        };
        Ok(from_file.merge(from_cli).into_rules())
    }

    pub fn to_string_flags(&self) -> String {
        let mut result = Vec::new();

        if self.dry_run {
            result.push("/L".to_string());
        }

        if let Some(dirs) = &self.ignore_dirs {
            result.push(format!("/XD:{}", dirs.join(",")));
        }

        if let Some(exts) = &self.ignore_exts {
            result.push(format!("/XE:{}", exts.join(",")));
        }

        if let Some(files) = &self.ignore_files {
            result.push(format!("/XF:{}", files.join(",")));
        }

        if let Some(dest) = &self.destination {
            result.push(format!("/DEST:{}", dest));
        }

        if let Some(config) = &self.config_file {
            result.push(format!("/CONFIG:{}", config));
        }

        if let Some(report) = &self.report_file {
            result.push(format!("/REPORT:{}", report));
        }

        if let Some(log) = &self.log_file {
            result.push(format!("/LOG:{}", log));
        }

        if !self.show_progress {
            result.push("/NP".to_string());
        }

        if !self.log_file_names {
            result.push("/NFL".to_string());
        }

        result.join(" ")
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn print_usage(program_name: &str) {
    println!("Usage: {} <source> [options]", program_name);
    println!("Copies <source> to the first removable drive as <drive>/<source name>.");
    println!("Options:");
    println!("  /L             - List only: simulate the copy and report what would be copied");
    println!("  /XD:a,b        - Directory names to ignore (replaces the defaults)");
    println!("  /XE:.a,.b      - File extensions to ignore (replaces the defaults)");
    println!("  /XF:a,b        - File names to ignore (replaces the defaults)");
    println!("  /CONFIG:file   - Read ignore rules from a TOML file");
    println!("  /DEST:path     - Copy under this directory instead of a detected drive");
    println!("  /REPORT:file   - Report file written by /L (default simulated_copy_log.txt)");
    println!("  /LOG:file      - Also write log output to a file");
    println!("  /NP            - No progress - don't display % copied");
    println!("  /NFL           - No file list - don't log file names");
}
