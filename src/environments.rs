use crate::app_error::AppError;
use crate::tags::{tags_from, TagSet};

pub const DEFAULT_APP: &str = "text2sql";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Dev,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Result<Self, AppError> {
        match s.to_ascii_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(AppError::Config(format!(
                "Unsupported environment: {s}. Supported: dev, prod"
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Environment::Dev => "DEV",
            Environment::Prod => "PROD",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub parameter_path: String,
    pub description: String,
    pub default_tags: TagSet,
}

/// The closed environment table. Built once at startup and passed into the
/// components that need it; never ambient global state.
#[derive(Debug, Clone)]
pub struct Environments {
    dev: EnvironmentConfig,
    prod: EnvironmentConfig,
}

impl Environments {
    pub fn builtin(app: &str) -> Self {
        Self {
            dev: EnvironmentConfig {
                parameter_path: format!("/prompts/{app}/dev/current"),
                description: "Development Environment".to_string(),
                default_tags: tags_from(&[("Environment", "DEV"), ("Status", "TESTING")]),
            },
            prod: EnvironmentConfig {
                parameter_path: format!("/prompts/{app}/prod/current"),
                description: "Production Environment".to_string(),
                default_tags: tags_from(&[("Environment", "PROD"), ("Status", "ACTIVE")]),
            },
        }
    }

    pub fn get(&self, environment: Environment) -> &EnvironmentConfig {
        match environment {
            Environment::Dev => &self.dev,
            Environment::Prod => &self.prod,
        }
    }
}
