//! Geolocation commands

use clap::Subcommand;
use dpp_sdk::GeolocationRecord;

use super::{resolve_address, Context};
use crate::{output::Output, CliError};

/// Geolocation subcommands
#[derive(Debug, Subcommand)]
pub enum GeoCommand {
    /// Append a location to a batch's trail
    Add {
        /// Batch ID
        batch_id: u64,
        /// Latitude
        #[arg(long, allow_hyphen_values = true)]
        latitude: String,
        /// Longitude
        #[arg(long, allow_hyphen_values = true)]
        longitude: String,
        /// Free-form note
        #[arg(long, default_value = "")]
        info: String,
        /// Geolocation registry address (default: the saved one)
        #[arg(long)]
        address: Option<String>,
    },
    /// Show a batch's trail
    Get {
        /// Batch ID
        batch_id: u64,
        /// Geolocation registry address (default: the saved one)
        #[arg(long)]
        address: Option<String>,
    },
}

impl GeoCommand {
    pub async fn execute(self, ctx: &Context) -> Result<(), CliError> {
        match self {
            GeoCommand::Add {
                batch_id,
                latitude,
                longitude,
                info,
                address,
            } => {
                let record = GeolocationRecord {
                    latitude,
                    longitude,
                    additional_info: info,
                };
                record.validate()?;
                let contract = resolve_address(
                    address.as_deref(),
                    ctx.config.contracts.geolocation,
                    "Geolocation",
                )?;
                let outcome = ctx
                    .connect()
                    .await?
                    .geolocation()
                    .add_geolocation(contract, batch_id, &record)
                    .await?;
                Output::outcome(ctx.json, "addGeolocation", &outcome).print();
            }
            GeoCommand::Get { batch_id, address } => {
                let contract = resolve_address(
                    address.as_deref(),
                    ctx.config.contracts.geolocation,
                    "Geolocation",
                )?;
                let trail = ctx
                    .connect()
                    .await?
                    .geolocation()
                    .get_geolocation(contract, batch_id)
                    .await?;
                Output::new(ctx.json)
                    .field_u64("batchId", batch_id)
                    .field_value("locations", &trail)
                    .message(&format_trail(batch_id, &trail))
                    .print();
            }
        }
        Ok(())
    }
}

fn format_trail(batch_id: u64, trail: &[GeolocationRecord]) -> String {
    if trail.is_empty() {
        return format!("Batch {batch_id}: no locations recorded");
    }
    let mut out = format!("Batch {batch_id}: {} location(s)", trail.len());
    for (i, stop) in trail.iter().enumerate() {
        out.push_str(&format!("\n  {}. {}, {}", i + 1, stop.latitude, stop.longitude));
        if !stop.additional_info.is_empty() {
            out.push_str(&format!("  ({})", stop.additional_info));
        }
    }
    out
}
