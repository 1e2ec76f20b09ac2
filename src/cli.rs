use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::db::location::{default_data_path, default_log_path};

/// Terminal student records manager.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Records file to load and save. Defaults to ~/.student-records-manager/students.db.
    #[arg(long, env = "STUDENT_RECORDS_FILE")]
    pub data_file: Option<PathBuf>,

    /// Where diagnostic logs are written; the terminal itself belongs to the UI.
    #[arg(long, env = "STUDENT_RECORDS_LOG")]
    pub log_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "student_records_manager=info")]
    pub log_filter: String,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_file: PathBuf,
    pub log_file: PathBuf,
    pub log_filter: String,
}

impl Cli {
    /// Fill in home-directory defaults for anything not given explicitly.
    pub fn into_settings(self) -> Result<Settings> {
        let data_file = match self.data_file {
            Some(path) => path,
            None => default_data_path()?,
        };
        let log_file = match self.log_file {
            Some(path) => path,
            None => default_log_path()?,
        };
        Ok(Settings {
            data_file,
            log_file,
            log_filter: self.log_filter,
        })
    }
}
