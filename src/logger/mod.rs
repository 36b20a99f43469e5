use crate::app_error::AppError;
use chrono::Utc;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};


/// Writes one directory of artifacts per run under `logs/`.
pub struct Logger {
    log_dir: PathBuf,
}

impl Logger {
    pub fn new(suffix: &str) -> Result<Self, AppError> {
        let timestamp = Utc::now().format("%Y-%m-%d-%H-%M-%S").to_string();
        let dir_name = if suffix.is_empty() {
            timestamp
        } else {
            format!("{timestamp}-{suffix}")
        };
        let log_dir = PathBuf::from("logs").join(dir_name);
        fs::create_dir_all(&log_dir)?;
        Ok(Self { log_dir })
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn log_text(&self, file_name: &str, content: &str) -> Result<(), AppError> {
        fs::write(self.log_dir.join(file_name), content)?;
        Ok(())
    }

    pub fn log_json(&self, file_name: &str, content: &Value) -> Result<(), AppError> {
        let pretty_json = serde_json::to_string_pretty(content)?;
        fs::write(self.log_dir.join(file_name), pretty_json)?;
        Ok(())
    }
}
