//! ProductPassport commands

use std::path::PathBuf;

use clap::{Args, Subcommand};
use dpp_sdk::{ProductData, ProductRecord};

use super::{parse_address, read_json, resolve_address, Context};
use crate::{output::Output, CliError};

/// Which ProductPassport registry to talk to
#[derive(Debug, Args)]
pub struct PassportAddress {
    /// ProductPassport address (default: the saved one)
    #[arg(long)]
    address: Option<String>,
}

impl PassportAddress {
    fn resolve(&self, ctx: &Context) -> Result<dpp_primitives::Address, CliError> {
        resolve_address(
            self.address.as_deref(),
            ctx.config.contracts.passport,
            "ProductPassport",
        )
    }
}

/// Product subcommands
#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// Store a product record
    Set {
        /// Product ID
        id: u64,
        /// JSON file holding the record (`-` for stdin)
        #[arg(short, long)]
        file: PathBuf,
        #[command(flatten)]
        address: PassportAddress,
    },
    /// Read a product record
    Get {
        /// Product ID
        id: u64,
        #[command(flatten)]
        address: PassportAddress,
    },
}

impl ProductCommand {
    pub async fn execute(self, ctx: &Context) -> Result<(), CliError> {
        match self {
            ProductCommand::Set { id, file, address } => {
                let record: ProductRecord = read_json(&file)?;
                record.validate()?;
                let contract = address.resolve(ctx)?;
                let outcome = ctx.connect().await?.passport().set_product(contract, id, &record).await?;
                Output::outcome(ctx.json, "setProduct", &outcome).print();
            }
            ProductCommand::Get { id, address } => {
                let contract = address.resolve(ctx)?;
                let record = ctx.connect().await?.passport().get_product(contract, id).await?;
                Output::new(ctx.json)
                    .field_u64("id", id)
                    .field_value("product", &record)
                    .message(&format!(
                        "Product {id}\n  UID:           {}\n  GTIN:          {}\n  TARIC code:    {}\n  Manufacturer:  {}\n  Consumer info: {}\n  End of life:   {}",
                        record.uid,
                        record.gtin,
                        record.taric_code,
                        record.manufacturer_info,
                        record.consumer_info,
                        record.end_of_life_info,
                    ))
                    .print();
            }
        }
        Ok(())
    }
}

/// Product data subcommands
#[derive(Debug, Subcommand)]
pub enum ProductDataCommand {
    /// Store extended product data
    Set {
        /// Product ID
        id: u64,
        /// JSON file holding the record (`-` for stdin)
        #[arg(short, long)]
        file: PathBuf,
        #[command(flatten)]
        address: PassportAddress,
    },
    /// Read extended product data
    Get {
        /// Product ID
        id: u64,
        #[command(flatten)]
        address: PassportAddress,
    },
}

impl ProductDataCommand {
    pub async fn execute(self, ctx: &Context) -> Result<(), CliError> {
        match self {
            ProductDataCommand::Set { id, file, address } => {
                let data: ProductData = read_json(&file)?;
                data.validate()?;
                let contract = address.resolve(ctx)?;
                let outcome = ctx
                    .connect()
                    .await?
                    .passport()
                    .set_product_data(contract, id, &data)
                    .await?;
                Output::outcome(ctx.json, "setProductData", &outcome).print();
            }
            ProductDataCommand::Get { id, address } => {
                let contract = address.resolve(ctx)?;
                let data = ctx.connect().await?.passport().get_product_data(contract, id).await?;
                Output::new(ctx.json)
                    .field_u64("id", id)
                    .field_value("productData", &data)
                    .message(&format!(
                        "Product data {id}\n  Description:    {}\n  Batch:          {}\n  Produced:       {}\n  Expires:        {}\n  Manuals:        {}\n  Specifications: {}\n  Certifications: {}",
                        data.description,
                        data.batch_number,
                        data.production_date,
                        data.expiry_date,
                        data.manuals.join(", "),
                        data.specifications.join(", "),
                        data.certifications,
                    ))
                    .print();
            }
        }
        Ok(())
    }
}

/// Grant an entity write access to passports
#[derive(Debug, Args)]
pub struct AuthorizeArgs {
    /// Entity address
    entity: String,
    #[command(flatten)]
    address: PassportAddress,
}

impl AuthorizeArgs {
    pub async fn execute(self, ctx: &Context) -> Result<(), CliError> {
        let entity = parse_address(&self.entity)?;
        let contract = self.address.resolve(ctx)?;
        let outcome = ctx
            .connect()
            .await?
            .passport()
            .authorize_entity(contract, entity)
            .await?;
        Output::outcome(ctx.json, "authorizeEntity", &outcome)
            .field("entity", &entity.to_string())
            .print();
        Ok(())
    }
}
