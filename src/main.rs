mod app_error;
mod cli;
mod config;
mod environments;
mod logger;
mod resolver;
mod store;
mod tags;
mod translate;
mod versions;


use crate::app_error::AppError;
use crate::cli::{CliArgs, Command};
use crate::config::Config;
use crate::environments::{Environments, DEFAULT_APP};
use crate::logger::Logger;
use crate::resolver::ParameterResolver;
use crate::store::http::{HttpPromptStore, HttpParameterStore};
use crate::versions::VersionController;
use chrono::Local;
use serde_json::json;
use std::process::exit;

#[tokio::main]
async fn main() {
    let result = run().await;

    match result {
        Ok(_) => {
            println!("Workflow completed successfully.");
            exit(0);
        }
        Err(e) => {
            eprintln!("An error occurred: {e}");
            exit(1);
        }
    }
}

async fn run() -> Result<(), AppError> {
    let cli_args = cli::parse_cli_args()?;

    let logger_suffix = match cli_args.command {
        Command::Translate { .. } => "translate",
        _ => "version-control",
    };
    let logger = Logger::new(logger_suffix)?;

    let result = match &cli_args.command {
        Command::Translate {
            image_path,
            html_path,
            source_lang,
            target_lang,
        } => {
            translate::run(&logger, image_path, html_path, source_lang, target_lang).await
        }
        _ => run_version_control(&logger, &cli_args).await,
    };

    if let Err(e) = &result {
        let _ = logger.log_text("final_error.txt", &e.to_string());
    }

    result
}

async fn run_version_control(logger: &Logger, cli_args: &CliArgs) -> Result<(), AppError> {
    let config = Config::resolve(cli_args);
    let environments = Environments::builtin(DEFAULT_APP);
    let prompt_store = HttpPromptStore::new(config.prompt_endpoint);
    let parameter_store = HttpParameterStore::new(config.parameter_endpoint);
    let resolver = ParameterResolver::new(&parameter_store, &environments);

    // the working prompt id comes from the flag or the indirection record
    let prompt_id = match &cli_args.prompt_id {
        Some(id) => id.clone(),
        None => resolver.resolve(cli_args.environment).await?,
    };

    let controller = VersionController::new(
        &prompt_store,
        &environments,
        cli_args.environment,
        cli_args.probe_limit,
    );

    match &cli_args.command {
        Command::ListVersions => {
            let summaries = controller.list_versions(&prompt_id).await?;
            println!(
                "🔖 {} entries for {prompt_id} in {}:",
                summaries.len(),
                cli_args.environment.label()
            );
            for summary in &summaries {
                let tag_line = if summary.tags.is_empty() {
                    "No tags".to_string()
                } else {
                    summary
                        .tags
                        .iter()
                        .map(|(k, v)| format!("{k}={v}"))
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                println!("🏷️  {} | {} | {}", summary.version, tag_line, summary.content_preview);
            }
        }
        Command::CreateVersion {
            content,
            version_tag,
            description,
        } => {
            let version_tag = match version_tag {
                Some(tag) => tag.clone(),
                None => default_version_tag(cli_args),
            };
            let version = controller
                .create_tagged_version(&prompt_id, content, &version_tag, description.as_deref())
                .await?;
            logger.log_json(
                "created-version.json",
                &json!({
                    "prompt_id": prompt_id,
                    "version": version,
                    "version_tag": version_tag,
                }),
            )?;
        }
        Command::Rollback { target, reason } => {
            let version = controller
                .rollback_to_version(&prompt_id, *target, reason)
                .await?;
            logger.log_json(
                "rollback.json",
                &json!({
                    "prompt_id": prompt_id,
                    "rolled_back_to": target.label(),
                    "new_version": version,
                    "reason": reason,
                }),
            )?;
        }
        Command::Promote {
            to_environment,
            version_tag,
        } => {
            if *to_environment == cli_args.environment {
                return Err(AppError::Config(format!(
                    "Cannot promote {} onto itself",
                    to_environment.label()
                )));
            }
            let version = controller
                .promote_version(&prompt_id, *to_environment, version_tag, &resolver)
                .await?;
            logger.log_json(
                "promotion.json",
                &json!({
                    "source_prompt_id": prompt_id,
                    "from": cli_args.environment.label(),
                    "to": to_environment.label(),
                    "version": version,
                    "version_tag": version_tag,
                }),
            )?;
        }
        Command::Translate { .. } => unreachable!("handled in run"),
    }

    Ok(())
}

fn default_version_tag(cli_args: &CliArgs) -> String {
    format!(
        "v1.0.0-{}-{}",
        cli_args.environment.name(),
        Local::now().format("%Y%m%d-%H%M")
    )
}
