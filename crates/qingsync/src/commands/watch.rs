//! Watch command: run the sync loop and stream state changes.

use chrono::Utc;
use owo_colors::OwoColorize as _;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use qingsync_core::{Coordinator, SyncEvent};

use crate::cli::WatchArgs;
use crate::error::CliError;
use crate::output::{Printer, color_enabled};

pub async fn handle(
    coordinator: &Coordinator,
    args: WatchArgs,
    printer: &Printer,
) -> Result<(), CliError> {
    let mut events = coordinator.events();

    // The first refresh must succeed before the loop runs.
    coordinator.start().await?;

    printer.line(&format!(
        "synced {} device(s); polling every {}s (Ctrl-C to stop)",
        coordinator.store().device_count(),
        coordinator.config().effective_poll_interval().as_secs(),
    ));
    // Drain the initial Refreshed event so the stream starts clean.
    let _ = events.try_recv();

    let mut seen: u64 = 0;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(event) => {
                    printer.line(&render_event(&event));
                    seen += 1;
                    if args.count > 0 && seen >= args.count {
                        break;
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    warn!(skipped = n, "event receiver lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    coordinator.shutdown().await;
    Ok(())
}

fn render_event(event: &SyncEvent) -> String {
    let stamp = Utc::now().format("%H:%M:%S");
    let color = color_enabled();
    match event {
        SyncEvent::Refreshed { device_count } => {
            let label = if color {
                "refreshed".green().to_string()
            } else {
                "refreshed".to_owned()
            };
            format!("{stamp} {label} {device_count} device(s)")
        }
        SyncEvent::RefreshFailed { reason } => {
            let label = if color {
                "refresh failed".red().to_string()
            } else {
                "refresh failed".to_owned()
            };
            format!("{stamp} {label}: {reason}")
        }
        SyncEvent::DeviceUpdated { mac, attributes } => {
            let label = if color {
                "push".cyan().to_string()
            } else {
                "push".to_owned()
            };
            format!("{stamp} {label} {}: {}", mac.formatted(), attributes.join(", "))
        }
    }
}
