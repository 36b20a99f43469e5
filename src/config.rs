use crate::app_error::AppError;
use crate::cli::CliArgs;
use std::fs;
use std::path::Path;

pub const DEFAULT_REGION: &str = "us-west-2";

/// Service endpoints for the two remote collaborators. Derived from the
/// region unless overridden on the command line.
pub struct Config {
    pub prompt_endpoint: String,
    pub parameter_endpoint: String,
}

impl Config {
    pub fn resolve(args: &CliArgs) -> Self {
        let region = &args.region;
        Self {
            prompt_endpoint: args
                .prompt_endpoint
                .clone()
                .unwrap_or_else(|| format!("https://bedrock-agent.{region}.amazonaws.com")),
            parameter_endpoint: args
                .parameter_endpoint
                .clone()
                .unwrap_or_else(|| format!("https://ssm.{region}.amazonaws.com")),
        }
    }
}

pub fn load_model_api_key() -> Result<String, AppError> {
    let key = read_file_to_string("agent-config/gemini-key.txt")?;
    Ok(key.trim().to_string())
}

fn read_file_to_string(path: impl AsRef<Path>) -> Result<String, AppError> {
    let path = path.as_ref();
    fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("Failed to read file '{}': {}", path.display(), e)))
}
