//! Deployment commands

use clap::{Args, Subcommand};
use dpp_primitives::Address;

use super::{parse_address, resolve_address, Context};
use crate::{output::Output, CliError};

/// Deployment subcommands
#[derive(Debug, Subcommand)]
pub enum DeployCommand {
    /// Deploy the ProductPassport registry
    Passport {
        /// Initial owner (default: the signing address)
        #[arg(long)]
        owner: Option<String>,
        #[command(flatten)]
        save: SaveFlag,
    },
    /// Deploy the Batch registry, linked to a ProductPassport registry
    Batch {
        /// ProductPassport address (default: the saved one)
        #[arg(long)]
        passport: Option<String>,
        #[command(flatten)]
        save: SaveFlag,
    },
    /// Deploy the Geolocation registry
    Geolocation {
        #[command(flatten)]
        save: SaveFlag,
    },
}

/// Remember the deployed address in the config file
#[derive(Debug, Args)]
pub struct SaveFlag {
    /// Save the address to the config file
    #[arg(long)]
    save: bool,
}

impl DeployCommand {
    pub async fn execute(self, ctx: &mut Context) -> Result<(), CliError> {
        let sdk = ctx.connect().await?;
        let (name, address, save) = match self {
            DeployCommand::Passport { owner, save } => {
                let owner = owner.as_deref().map(parse_address).transpose()?;
                let address = sdk.passport().deploy(owner).await?;
                if save.save {
                    ctx.config.contracts.passport = Some(address);
                }
                ("ProductPassport", address, save.save)
            }
            DeployCommand::Batch { passport, save } => {
                let passport = resolve_address(
                    passport.as_deref(),
                    ctx.config.contracts.passport,
                    "ProductPassport",
                )?;
                let address = sdk.batch().deploy(passport).await?;
                if save.save {
                    ctx.config.contracts.batch = Some(address);
                }
                ("Batch", address, save.save)
            }
            DeployCommand::Geolocation { save } => {
                let address = sdk.geolocation().deploy().await?;
                if save.save {
                    ctx.config.contracts.geolocation = Some(address);
                }
                ("Geolocation", address, save.save)
            }
        };

        if save {
            ctx.save_config()?;
        }
        report(ctx.json, name, address, save);
        Ok(())
    }
}

fn report(json: bool, name: &str, address: Address, saved: bool) {
    let suffix = if saved { " (saved)" } else { "" };
    Output::new(json)
        .field("contract", name)
        .field("address", &address.to_string())
        .field_value("saved", saved)
        .message(&format!("{name} deployed at {address}{suffix}"))
        .print();
}
