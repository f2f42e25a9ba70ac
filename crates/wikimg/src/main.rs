//! wikimg
//!
//! Rewrites Obsidian image wikilinks in a Markdown tree into standard Markdown
//! image links and copies the referenced images into a static images folder.

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wikimg::cli::Cli;
use wikimg::errors::explain;
use wikimg::output::{format_diff, ErrorCode, OutputContext};
use wikimg::{ExitCode, JsonError, JsonOutput, MigrateError, MigrationReport, Migrator};
use wikimg::{Settings, WikimgConfig};

const COMMAND: &str = "migrate";

/// Helper to determine exit code from an error
fn error_to_exit_code(error: &anyhow::Error) -> ExitCode {
    if let Some(migrate_error) = error.downcast_ref::<MigrateError>() {
        return ExitCode::for_error(migrate_error);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => ExitCode::PermissionDenied,
            _ => ExitCode::ExternalError,
        };
    }

    ExitCode::GenericError
}

fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_env("WIKIMG_LOG")
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);
    let output = OutputContext::new(cli.json);

    let exit_code = match run(&cli, &output) {
        Ok(code) => code,
        Err(e) => {
            report_error(&output, &e);
            error_to_exit_code(&e)
        }
    };

    if exit_code != ExitCode::Success {
        std::process::exit(exit_code.code());
    }
}

fn report_error(output: &OutputContext, error: &anyhow::Error) {
    let migrate_error = error.downcast_ref::<MigrateError>();

    if output.is_json() {
        let json_error = match migrate_error {
            Some(e) => JsonError::from_migrate_error(e, COMMAND),
            None => JsonError::new("ERROR", format!("{:#}", error), COMMAND),
        };
        match json_error.to_json_string() {
            Ok(json) => println!("{}", json),
            Err(_) => eprintln!("Error: {:#}", error),
        }
        return;
    }

    let message = match migrate_error {
        Some(e) => explain(e).to_error_message(),
        None => format!("{:#}", error),
    };
    let _ = output.print_error(message.trim_end());
}

fn run(cli: &Cli, output: &OutputContext) -> Result<ExitCode> {
    if cli.schema {
        let schema = schemars::schema_for!(MigrationReport);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(ExitCode::Success);
    }

    let current_dir = env::current_dir().context("Failed to determine current directory")?;

    let config = match &cli.config {
        Some(path) => WikimgConfig::load(&current_dir.join(path))?,
        None => WikimgConfig::discover(&current_dir)?,
    };
    let settings = Settings::resolve(cli.overrides(), &config, &current_dir);
    settings.validate()?;

    info!(
        "Migrating {} (attachments: {}, images: {})",
        settings.docs_root.display(),
        settings.attachments_root.display(),
        settings.images_dir.display()
    );

    let docs_root = settings.docs_root.clone();
    let migrator = Migrator::new(settings);

    let mut diffs = Vec::new();
    let report = migrator.run_with(|change| {
        if cli.diff {
            let shown = change.path.strip_prefix(&docs_root).unwrap_or(change.path);
            diffs.push(format_diff(shown, change.before, change.after));
        }
    })?;

    if cli.json {
        let json_output = JsonOutput::success(&report, COMMAND);
        println!("{}", json_output.to_json_string()?);
    } else {
        for diff in &diffs {
            output.print_data(diff)?;
        }
        output.print_data(report.render())?;
    }

    if cli.fail_on_missing && report.has_missing() {
        info!(
            "{} unresolved reference(s), exiting with {}",
            report.missing.len(),
            ErrorCode::UNRESOLVED_REFERENCES
        );
        return Ok(ExitCode::UnresolvedReferences);
    }

    Ok(ExitCode::Success)
}
