//! Reading command handler: per-attribute values with freshness.

use chrono::Utc;
use serde::Serialize;
use tabled::Tabled;

use qingsync_core::{Coordinator, DeviceMac, Property, is_available};

use crate::cli::ReadingsArgs;
use crate::error::CliError;
use crate::output::Printer;

#[derive(Clone, Serialize, Tabled)]
struct ReadingRow {
    #[tabled(rename = "Attribute")]
    attribute: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Status")]
    status: i64,
    #[tabled(rename = "Available")]
    available: bool,
}

fn reading_row(property: &Property, available: bool) -> ReadingRow {
    ReadingRow {
        attribute: property.name.clone(),
        title: property.title().unwrap_or("-").into(),
        value: property
            .display_value()
            .map_or_else(|| "-".into(), |v| v.to_string()),
        unit: property.unit().unwrap_or("").into(),
        status: property.status,
        available,
    }
}

pub async fn handle(
    coordinator: &Coordinator,
    args: ReadingsArgs,
    printer: &Printer,
) -> Result<(), CliError> {
    coordinator.refresh().await?;
    let store = coordinator.store();

    let mac = DeviceMac::new(&args.mac);
    let device = store
        .find_device_by_mac(&mac)
        .ok_or_else(|| CliError::DeviceNotFound {
            mac: mac.to_string(),
        })?;

    let now = Utc::now();
    let poll_ok = store.last_poll_ok();

    let mut rows: Vec<ReadingRow> = device
        .data
        .values()
        .filter(|p| {
            args.attribute
                .as_deref()
                .is_none_or(|wanted| p.name == wanted)
        })
        .map(|p| reading_row(p, is_available(&device, &p.name, now, poll_ok)))
        .collect();
    rows.sort_by(|a, b| a.attribute.cmp(&b.attribute));

    if rows.is_empty() {
        if let Some(wanted) = args.attribute {
            // An attribute the device never reported: a legitimate
            // absence, rendered as an unavailable row rather than an error.
            rows.push(reading_row(&Property::new(wanted, None, 0), false));
        }
    }

    printer.rows(&rows, Clone::clone, |r| {
        format!("{}={}", r.attribute, r.value)
    });
    Ok(())
}
