//! `graphvfs config` - inspect the effective configuration

use anyhow::{Context, Result};
use clap::Subcommand;

use super::AppContext;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,
    /// Check the configuration for invalid values
    Validate,
    /// Print the configuration file location
    Path,
}

impl ConfigCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        match self {
            ConfigCommand::Show => show(ctx, format),
            ConfigCommand::Validate => validate(ctx, format),
            ConfigCommand::Path => path(ctx, format),
        }
    }
}

fn show(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);

    if format.is_json() {
        let json = serde_json::to_value(&ctx.config)
            .context("Failed to serialize configuration to JSON")?;
        formatter.print_json(&json);
        return Ok(());
    }

    let yaml = ctx
        .config
        .to_yaml()
        .context("Failed to serialize configuration to YAML")?;
    formatter.success(&format!("Configuration ({})", ctx.config_path.display()));
    for line in yaml.lines() {
        formatter.info(&format!("  {line}"));
    }
    Ok(())
}

fn validate(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);
    let errors = ctx.config.validate();

    if format.is_json() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        formatter.print_json(&serde_json::json!({
            "valid": errors.is_empty(),
            "config_path": ctx.config_path.display().to_string(),
            "errors": messages,
        }));
    } else if errors.is_empty() {
        formatter.success(&format!("{} is valid", ctx.config_path.display()));
    } else {
        formatter.error(&format!(
            "{} has {} invalid value(s)",
            ctx.config_path.display(),
            errors.len()
        ));
        for error in &errors {
            formatter.info(&format!("  {error}"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("configuration is invalid")
    }
}

fn path(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);
    if format.is_json() {
        formatter.print_json(&serde_json::json!({
            "config_path": ctx.config_path.display().to_string(),
            "exists": ctx.config_path.exists(),
        }));
    } else {
        formatter.info(&ctx.config_path.display().to_string());
    }
    Ok(())
}
