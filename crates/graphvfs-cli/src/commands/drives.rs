//! `graphvfs drives` - list the drives the token can reach

use anyhow::{Context, Result};

use super::AppContext;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, clap::Args)]
pub struct DrivesCommand {}

impl DrivesCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let client = ctx.client()?;
        let drives = client.list_drives().await.context("Failed to list drives")?;

        if format.is_json() {
            formatter.print_json(&serde_json::to_value(&drives)?);
            return Ok(());
        }

        if drives.is_empty() {
            formatter.warn("No drives available");
        }
        for drive in &drives {
            let owner = drive.owner.as_deref().unwrap_or("-");
            formatter.info(&format!(
                "onedrive://{}/  {} ({}, {})",
                drive.id, drive.name, drive.drive_type, owner
            ));
        }
        Ok(())
    }
}
