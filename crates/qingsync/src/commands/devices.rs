//! Device command handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tabled::Tabled;

use qingsync_core::{Coordinator, Device, DeviceMac};

use crate::cli::DevicesArgs;
use crate::error::CliError;
use crate::output::Printer;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Firmware")]
    firmware: String,
    #[tabled(rename = "Cloud")]
    cloud: String,
    #[tabled(rename = "Last Report")]
    last_report: String,
    #[tabled(rename = "Cadence")]
    cadence: String,
}

impl From<&Arc<Device>> for DeviceRow {
    fn from(d: &Arc<Device>) -> Self {
        Self {
            mac: d.mac.formatted(),
            name: d.name.clone(),
            model: d.product_en_name.clone().unwrap_or_default(),
            firmware: d.version.clone().unwrap_or_default(),
            cloud: if d.offline { "offline" } else { "online" }.into(),
            last_report: format_epoch(d.last_report_epoch()),
            cadence: format!("{}s", d.report_interval_secs),
        }
    }
}

fn format_epoch(epoch: Option<i64>) -> String {
    epoch
        .and_then(|e| DateTime::<Utc>::from_timestamp(e, 0))
        .map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string())
}

fn detail(d: &Arc<Device>) -> String {
    [
        format!("MAC:              {}", d.mac.formatted()),
        format!("Name:             {}", d.name),
        format!("Model:            {}", d.product_en_name.as_deref().unwrap_or("-")),
        format!("Firmware:         {}", d.version.as_deref().unwrap_or("-")),
        format!("Cloud status:     {}", if d.offline { "offline" } else { "online" }),
        format!("Report interval:  {}s", d.report_interval_secs),
        format!("Collect interval: {}s", d.collect_interval_secs),
        format!("Last report:      {}", format_epoch(d.last_report_epoch())),
        format!("Attributes:       {}", attribute_list(d)),
    ]
    .join("\n")
}

fn attribute_list(d: &Arc<Device>) -> String {
    let mut names: Vec<&str> = d.data.keys().map(String::as_str).collect();
    names.sort_unstable();
    names.join(", ")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    coordinator: &Coordinator,
    args: DevicesArgs,
    printer: &Printer,
) -> Result<(), CliError> {
    coordinator.refresh().await?;
    let snapshot = coordinator.store().snapshot();

    if let Some(ref raw_mac) = args.mac {
        let mac = DeviceMac::new(raw_mac);
        let device = snapshot
            .find(&mac)
            .ok_or_else(|| CliError::DeviceNotFound {
                mac: mac.to_string(),
            })?;
        printer.one(&device, detail, |d| d.mac.as_str().to_owned());
        return Ok(());
    }

    printer.rows(&snapshot.devices, DeviceRow::from, |d| {
        d.mac.as_str().to_owned()
    });
    Ok(())
}
