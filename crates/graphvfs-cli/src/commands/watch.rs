//! `graphvfs watch` - print change events until Ctrl-C

use anyhow::Result;
use graphvfs_vfs::{FileChangeEvent, WatchOptions};
use tracing::info;

use super::AppContext;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, clap::Args)]
pub struct WatchCommand {
    /// Any URI on the drive to watch; changes anywhere on the drive are shown
    pub uri: String,
}

impl WatchCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let fs = ctx.filesystem()?;
        let mut watch = fs.watch(&self.uri, WatchOptions::default())?;

        if !format.is_json() {
            formatter.success(&format!(
                "Watching {} (every {}s, Ctrl-C to stop)",
                self.uri, ctx.config.watch.poll_interval_secs
            ));
        }

        let interrupted = loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break true,
                batch = watch.next_events() => match batch {
                    Some(events) => print_events(format, &events),
                    None => break false,
                },
            }
        };
        watch.dispose();

        if interrupted {
            info!("Interrupted, watch released");
            Ok(())
        } else {
            anyhow::bail!("change polling stopped after a remote error (see log)")
        }
    }
}

fn print_events(format: OutputFormat, events: &[FileChangeEvent]) {
    let formatter = get_formatter(format);
    for event in events {
        if format.is_json() {
            formatter.print_json(&serde_json::json!({
                "change_type": event.change_type,
                "uri": event.uri.to_uri(),
            }));
        } else {
            formatter.info(&format!("{:<8} {}", event.change_type.to_string(), event.uri));
        }
    }
}
