//! Batch commands

use clap::Subcommand;
use dpp_sdk::BatchRecord;

use super::{resolve_address, Context};
use crate::{output::Output, CliError};

/// Batch subcommands
#[derive(Debug, Subcommand)]
pub enum BatchCommand {
    /// Record a production batch
    Create {
        /// Batch ID
        id: u64,
        /// Batch number, e.g. BRG-2023-001
        #[arg(long)]
        batch_number: String,
        /// Production date
        #[arg(long)]
        production_date: String,
        /// Expiry date
        #[arg(long)]
        expiry_date: String,
        /// Units in the batch
        #[arg(long)]
        quantity: u64,
        /// Batch registry address (default: the saved one)
        #[arg(long)]
        address: Option<String>,
    },
    /// Read a production batch
    Get {
        /// Batch ID
        id: u64,
        /// Batch registry address (default: the saved one)
        #[arg(long)]
        address: Option<String>,
    },
}

impl BatchCommand {
    pub async fn execute(self, ctx: &Context) -> Result<(), CliError> {
        match self {
            BatchCommand::Create {
                id,
                batch_number,
                production_date,
                expiry_date,
                quantity,
                address,
            } => {
                let record = BatchRecord {
                    batch_number,
                    production_date,
                    expiry_date,
                    quantity,
                };
                record.validate()?;
                let contract =
                    resolve_address(address.as_deref(), ctx.config.contracts.batch, "Batch")?;
                let outcome = ctx.connect().await?.batch().create_batch(contract, id, &record).await?;
                Output::outcome(ctx.json, "createBatch", &outcome).print();
            }
            BatchCommand::Get { id, address } => {
                let contract =
                    resolve_address(address.as_deref(), ctx.config.contracts.batch, "Batch")?;
                let record = ctx.connect().await?.batch().get_batch(contract, id).await?;
                Output::new(ctx.json)
                    .field_u64("id", id)
                    .field_value("batch", &record)
                    .message(&format!(
                        "Batch {id}\n  Number:   {}\n  Produced: {}\n  Expires:  {}\n  Quantity: {}",
                        record.batch_number, record.production_date, record.expiry_date, record.quantity
                    ))
                    .print();
            }
        }
        Ok(())
    }
}
