//! File operations: ls, stat, cat, put, mkdir, rm, mv, cp
//!
//! Each command is a thin wrapper over one [`GraphFileSystem`] call.
//!
//! [`GraphFileSystem`]: graphvfs_vfs::GraphFileSystem

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use graphvfs_vfs::{FileType, GraphFileSystem};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::AppContext;
use crate::output::{get_formatter, OutputFormat};

// ============================================================================
// ls
// ============================================================================

#[derive(Debug, clap::Args)]
pub struct LsCommand {
    /// Directory URI, e.g. onedrive://<drive>/Documents
    pub uri: String,
    /// Show item ids (lists straight from the drive API)
    #[arg(long)]
    pub ids: bool,
}

impl LsCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        if self.ids {
            return self.execute_with_ids(ctx, format).await;
        }

        let formatter = get_formatter(format);
        let fs = ctx.filesystem()?;
        let mut entries = fs
            .list(&self.uri)
            .await
            .with_context(|| format!("Cannot list {}", self.uri))?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        if format.is_json() {
            formatter.print_json(&serde_json::to_value(&entries)?);
            return Ok(());
        }
        for entry in &entries {
            formatter.info(&format!("{}{}", entry.name, kind_suffix(entry.kind)));
        }
        Ok(())
    }

    async fn execute_with_ids(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let path = GraphFileSystem::parse_uri(&self.uri)?;
        let client = ctx.client()?;

        let children = if path.is_root() {
            client.list_root_children(path.drive_id()).await
        } else {
            let folder = client
                .get_item_by_path(&path)
                .await
                .with_context(|| format!("Cannot resolve {}", self.uri))?;
            client.list_children(path.drive_id(), &folder.id).await
        }
        .with_context(|| format!("Cannot list {}", self.uri))?;

        if format.is_json() {
            formatter.print_json(&serde_json::to_value(&children)?);
            return Ok(());
        }
        for child in &children {
            let suffix = if child.is_folder() { "/" } else { "" };
            formatter.info(&format!("{}  {}{}", child.id, child.name, suffix));
        }
        Ok(())
    }
}

// ============================================================================
// stat
// ============================================================================

#[derive(Debug, clap::Args)]
pub struct StatCommand {
    pub uri: String,
}

impl StatCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let fs = ctx.filesystem()?;
        let stat = fs
            .stat(&self.uri)
            .await
            .with_context(|| format!("Cannot stat {}", self.uri))?;

        if format.is_json() {
            formatter.print_json(&serde_json::to_value(&stat)?);
            return Ok(());
        }
        formatter.info(&format!("  Path: {}", self.uri));
        formatter.info(&format!("  Type: {}", kind_name(stat.kind)));
        formatter.info(&format!("  Size: {} bytes", stat.size));
        formatter.info(&format!("Create: {}", local_time(stat.ctime)));
        formatter.info(&format!("Modify: {}", local_time(stat.mtime)));
        Ok(())
    }
}

// ============================================================================
// cat / put
// ============================================================================

#[derive(Debug, clap::Args)]
pub struct CatCommand {
    pub uri: String,
}

impl CatCommand {
    pub async fn execute(&self, ctx: &AppContext, _format: OutputFormat) -> Result<()> {
        let fs = ctx.filesystem()?;
        let content = fs
            .read(&self.uri)
            .await
            .with_context(|| format!("Cannot read {}", self.uri))?;

        let mut stdout = tokio::io::stdout();
        stdout.write_all(&content).await?;
        stdout.flush().await?;
        Ok(())
    }
}

#[derive(Debug, clap::Args)]
pub struct PutCommand {
    /// Target file URI
    pub uri: String,
    /// Local file to upload; stdin when omitted
    pub file: Option<PathBuf>,
}

impl PutCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let content = match &self.file {
            Some(file) => tokio::fs::read(file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?,
            None => {
                let mut buf = Vec::new();
                tokio::io::stdin()
                    .read_to_end(&mut buf)
                    .await
                    .context("Failed to read stdin")?;
                buf
            }
        };
        let size = content.len();

        let fs = ctx.filesystem()?;
        fs.write(&self.uri, content)
            .await
            .with_context(|| format!("Cannot write {}", self.uri))?;

        if format.is_json() {
            formatter.print_json(&serde_json::json!({"uri": self.uri, "size": size}));
        } else {
            formatter.success(&format!("Wrote {size} bytes to {}", self.uri));
        }
        Ok(())
    }
}

// ============================================================================
// mkdir / rm
// ============================================================================

#[derive(Debug, clap::Args)]
pub struct MkdirCommand {
    pub uri: String,
}

impl MkdirCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        let fs = ctx.filesystem()?;
        fs.create_directory(&self.uri)
            .await
            .with_context(|| format!("Cannot create {}", self.uri))?;
        report(format, "created", &self.uri, None);
        Ok(())
    }
}

#[derive(Debug, clap::Args)]
pub struct RmCommand {
    pub uri: String,
}

impl RmCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        let fs = ctx.filesystem()?;
        fs.delete(&self.uri)
            .await
            .with_context(|| format!("Cannot delete {}", self.uri))?;
        report(format, "deleted", &self.uri, None);
        Ok(())
    }
}

// ============================================================================
// mv / cp
// ============================================================================

#[derive(Debug, clap::Args)]
pub struct MvCommand {
    pub source: String,
    pub target: String,
}

impl MvCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        let fs = ctx.filesystem()?;
        fs.rename(&self.source, &self.target)
            .await
            .with_context(|| format!("Cannot move {} to {}", self.source, self.target))?;
        report(format, "moved", &self.source, Some(&self.target));
        Ok(())
    }
}

#[derive(Debug, clap::Args)]
pub struct CpCommand {
    pub source: String,
    pub target: String,
}

impl CpCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        let fs = ctx.filesystem()?;
        fs.copy(&self.source, &self.target)
            .await
            .with_context(|| format!("Cannot copy {} to {}", self.source, self.target))?;
        report(format, "copied", &self.source, Some(&self.target));
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn report(format: OutputFormat, action: &str, uri: &str, target: Option<&str>) {
    let formatter = get_formatter(format);
    if format.is_json() {
        formatter.print_json(&serde_json::json!({
            "action": action,
            "uri": uri,
            "target": target,
        }));
        return;
    }
    match target {
        Some(target) => formatter.success(&format!("{action} {uri} -> {target}")),
        None => formatter.success(&format!("{action} {uri}")),
    }
}

fn kind_name(kind: FileType) -> &'static str {
    match kind {
        FileType::File => "file",
        FileType::Directory => "directory",
    }
}

fn kind_suffix(kind: FileType) -> &'static str {
    match kind {
        FileType::File => "",
        FileType::Directory => "/",
    }
}

fn local_time(time: Option<DateTime<Utc>>) -> String {
    match time {
        Some(time) => time
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S %z")
            .to_string(),
        None => "-".to_string(),
    }
}
