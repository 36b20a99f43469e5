use crate::app_error::AppError;
use crate::config::DEFAULT_REGION;
use crate::environments::Environment;
use crate::versions::RollbackTarget;
use std::fs;

pub const DEFAULT_PROBE_LIMIT: u32 = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ListVersions,
    CreateVersion {
        content: String,
        version_tag: Option<String>,
        description: Option<String>,
    },
    Rollback {
        target: RollbackTarget,
        reason: String,
    },
    Promote {
        to_environment: Environment,
        version_tag: String,
    },
    Translate {
        image_path: String,
        html_path: String,
        source_lang: String,
        target_lang: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub environment: Environment,
    pub region: String,
    pub prompt_endpoint: Option<String>,
    pub parameter_endpoint: Option<String>,
    pub prompt_id: Option<String>,
    pub probe_limit: u32,
    pub command: Command,
}

pub fn parse_cli_args() -> Result<CliArgs, AppError> {
    parse_args(std::env::args().skip(1))
}

pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs, AppError> {
    let mut args = args.into_iter();

    let mut environment = Environment::Dev;
    let mut region = DEFAULT_REGION.to_string();
    let mut prompt_endpoint = None;
    let mut parameter_endpoint = None;
    let mut prompt_id = None;
    let mut probe_limit = DEFAULT_PROBE_LIMIT;
    let mut command = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--env" => {
                let value = next_value(&mut args, "--env")?;
                environment = Environment::from_str(&value)?;
            }
            "--region" => region = next_value(&mut args, "--region")?,
            "--endpoint" => prompt_endpoint = Some(next_value(&mut args, "--endpoint")?),
            "--parameter-endpoint" => {
                parameter_endpoint = Some(next_value(&mut args, "--parameter-endpoint")?)
            }
            "--prompt-id" => prompt_id = Some(next_value(&mut args, "--prompt-id")?),
            "--probe-limit" => {
                let value = next_value(&mut args, "--probe-limit")?;
                probe_limit = value.parse::<u32>().map_err(|_| {
                    AppError::Config(format!("--probe-limit expects a number, got '{value}'"))
                })?;
                if probe_limit == 0 {
                    return Err(AppError::Config(
                        "--probe-limit must be at least 1".to_string(),
                    ));
                }
            }
            "list" => set_command(&mut command, Command::ListVersions)?,
            "create" => {
                let parsed = parse_create(&mut args)?;
                set_command(&mut command, parsed)?;
            }
            "rollback" => {
                let parsed = parse_rollback(&mut args)?;
                set_command(&mut command, parsed)?;
            }
            "promote" => {
                let parsed = parse_promote(&mut args)?;
                set_command(&mut command, parsed)?;
            }
            "translate" => {
                let parsed = parse_translate(&mut args)?;
                set_command(&mut command, parsed)?;
            }
            other => {
                return Err(AppError::Config(format!("Unknown argument: {other}")));
            }
        }
    }

    let command = command.ok_or_else(|| {
        AppError::Config(
            "No command given. Expected one of: list, create, rollback, promote, translate"
                .to_string(),
        )
    })?;

    Ok(CliArgs {
        environment,
        region,
        prompt_endpoint,
        parameter_endpoint,
        prompt_id,
        probe_limit,
        command,
    })
}

fn parse_create(args: &mut impl Iterator<Item = String>) -> Result<Command, AppError> {
    let mut content = None;
    let mut content_file = None;
    let mut version_tag = None;
    let mut description = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--content" => content = Some(next_value(args, "--content")?),
            "--content-file" => content_file = Some(next_value(args, "--content-file")?),
            "--tag" => version_tag = Some(next_value(args, "--tag")?),
            "--description" => description = Some(next_value(args, "--description")?),
            other => {
                return Err(AppError::Config(format!(
                    "Unknown argument to create: {other}"
                )));
            }
        }
    }

    let content = match (content, content_file) {
        (Some(_), Some(_)) => {
            return Err(AppError::Config(
                "create takes --content or --content-file, not both".to_string(),
            ));
        }
        (Some(inline), None) => inline,
        (None, Some(path)) => fs::read_to_string(&path).map_err(|e| {
            AppError::Config(format!("Failed to read content file '{path}': {e}"))
        })?,
        (None, None) => {
            return Err(AppError::Config(
                "create requires --content or --content-file".to_string(),
            ));
        }
    };

    Ok(Command::CreateVersion {
        content,
        version_tag,
        description,
    })
}

fn parse_rollback(args: &mut impl Iterator<Item = String>) -> Result<Command, AppError> {
    let mut target = None;
    let mut reason = "Manual rollback".to_string();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" => {
                let value = next_value(args, "--version")?;
                target = Some(RollbackTarget::parse(&value)?);
            }
            "--reason" => reason = next_value(args, "--reason")?,
            other => {
                return Err(AppError::Config(format!(
                    "Unknown argument to rollback: {other}"
                )));
            }
        }
    }

    let target = target
        .ok_or_else(|| AppError::Config("rollback requires --version".to_string()))?;
    Ok(Command::Rollback { target, reason })
}

fn parse_promote(args: &mut impl Iterator<Item = String>) -> Result<Command, AppError> {
    let mut to_environment = None;
    let mut version_tag = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--to" => {
                let value = next_value(args, "--to")?;
                to_environment = Some(Environment::from_str(&value)?);
            }
            "--tag" => version_tag = Some(next_value(args, "--tag")?),
            other => {
                return Err(AppError::Config(format!(
                    "Unknown argument to promote: {other}"
                )));
            }
        }
    }

    let to_environment =
        to_environment.ok_or_else(|| AppError::Config("promote requires --to".to_string()))?;
    let version_tag =
        version_tag.ok_or_else(|| AppError::Config("promote requires --tag".to_string()))?;
    Ok(Command::Promote {
        to_environment,
        version_tag,
    })
}

fn parse_translate(args: &mut impl Iterator<Item = String>) -> Result<Command, AppError> {
    let mut image_path = None;
    let mut html_path = None;
    let mut source_lang = "Korean".to_string();
    let mut target_lang = "English".to_string();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--image" => image_path = Some(next_value(args, "--image")?),
            "--html" => html_path = Some(next_value(args, "--html")?),
            "--source-lang" => source_lang = next_value(args, "--source-lang")?,
            "--target-lang" => target_lang = next_value(args, "--target-lang")?,
            other => {
                return Err(AppError::Config(format!(
                    "Unknown argument to translate: {other}"
                )));
            }
        }
    }

    let image_path =
        image_path.ok_or_else(|| AppError::Config("translate requires --image".to_string()))?;
    let html_path =
        html_path.ok_or_else(|| AppError::Config("translate requires --html".to_string()))?;
    Ok(Command::Translate {
        image_path,
        html_path,
        source_lang,
        target_lang,
    })
}

fn next_value(
    args: &mut impl Iterator<Item = String>,
    flag: &str,
) -> Result<String, AppError> {
    args.next()
        .ok_or_else(|| AppError::Config(format!("{flag} requires a value")))
}

fn set_command(slot: &mut Option<Command>, command: Command) -> Result<(), AppError> {
    if slot.is_some() {
        return Err(AppError::Config(
            "Only one command may be given per invocation".to_string(),
        ));
    }
    *slot = Some(command);
    Ok(())
}
