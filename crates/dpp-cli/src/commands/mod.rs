//! Subcommands

pub mod batch;
pub mod deploy;
pub mod geo;
pub mod product;

use std::path::{Path, PathBuf};

use dpp_primitives::Address;
use dpp_sdk::PassportSdk;
use serde::de::DeserializeOwned;

use crate::{config::Config, CliError};

/// Everything a command needs from the command line and config file
#[derive(Debug)]
pub struct Context {
    /// Effective configuration, flags applied
    pub config: Config,
    /// Explicit config file, if one was given
    pub config_path: Option<PathBuf>,
    /// Signing key from `--private-key` or `PRIVATE_KEY`
    pub private_key: Option<String>,
    /// JSON output
    pub json: bool,
}

impl Context {
    /// Connect an SDK instance
    pub async fn connect(&self) -> Result<PassportSdk, CliError> {
        let sdk = PassportSdk::initialize(self.config.sdk_config(self.private_key.as_deref())).await?;
        tracing::debug!(address = %sdk.address(), chain_id = sdk.chain_id(), "connected");
        Ok(sdk)
    }

    /// Write the config back to where it was loaded from
    pub fn save_config(&self) -> Result<PathBuf, CliError> {
        self.config.save(self.config_path.as_deref())
    }
}

/// Contract address from the flag, else the one saved at deployment
pub fn resolve_address(
    flag: Option<&str>,
    saved: Option<Address>,
    contract: &'static str,
) -> Result<Address, CliError> {
    match flag {
        Some(hex) => parse_address(hex),
        None => saved.ok_or(CliError::MissingAddress(contract)),
    }
}

/// Parse a hex address
pub fn parse_address(hex: &str) -> Result<Address, CliError> {
    Address::from_hex(hex).map_err(|e| CliError::InvalidAddress(format!("{hex}: {e}")))
}

/// Read a JSON record from a file, or from stdin when the path is `-`
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let content = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin())?
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&content)?)
}
