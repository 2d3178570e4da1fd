//! CLI configuration management

use std::path::{Path, PathBuf};

use dpp_primitives::Address;
use dpp_sdk::{
    ConfirmationConfig, CredentialSource, GasConfig, InterfaceSourceConfig, SdkConfig,
};
use serde::{Deserialize, Serialize};

use crate::CliError;

/// CLI configuration, stored in `~/.dpp/config.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// RPC endpoint URL
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Expected chain ID; taken from the node when unset
    #[serde(default)]
    pub chain_id: Option<u64>,
    /// Environment variable holding the private key
    #[serde(default = "default_key_env")]
    pub key_env: String,
    /// Directory of compiler artifacts (needed for deployment)
    #[serde(default)]
    pub abi_dir: Option<PathBuf>,
    /// Base URL of compiler artifacts served over HTTP
    #[serde(default)]
    pub abi_url: Option<String>,
    /// Gas defaults
    #[serde(default)]
    pub gas: GasConfig,
    /// Receipt polling
    #[serde(default)]
    pub confirmation: ConfirmationConfig,
    /// Addresses of deployed contracts
    #[serde(default)]
    pub contracts: Deployments,
}

/// Remembered contract addresses, used when a command gets no `--address`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deployments {
    /// ProductPassport registry
    pub passport: Option<Address>,
    /// Batch registry
    pub batch: Option<Address>,
    /// Geolocation registry
    pub geolocation: Option<Address>,
}

fn default_rpc_url() -> String {
    "http://localhost:8545".to_string()
}

fn default_key_env() -> String {
    dpp_sdk::config::PRIVATE_KEY_VAR.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            chain_id: None,
            key_env: default_key_env(),
            abi_dir: None,
            abi_url: None,
            gas: GasConfig::default(),
            confirmation: ConfirmationConfig::default(),
            contracts: Deployments::default(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".dpp"))
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load `path`, or the default file when `None`. A missing file gives
    /// the defaults; an unreadable or malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::config_path) else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        toml::from_str(&content).map_err(|e| CliError::Config(format!("{}: {e}", path.display())))
    }

    /// Save to `path`, or the default file when `None`
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf, CliError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(Self::config_path)
            .ok_or_else(|| CliError::Config("cannot determine config path".to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// SDK configuration signing with `private_key`, or with the key in
    /// `key_env` when no key is given
    pub fn sdk_config(&self, private_key: Option<&str>) -> SdkConfig {
        let credential = match private_key {
            Some(key) => CredentialSource::PrivateKey {
                key: key.to_string(),
            },
            None => CredentialSource::Env {
                var: self.key_env.clone(),
            },
        };
        let interfaces = match (&self.abi_dir, &self.abi_url) {
            (Some(path), _) => InterfaceSourceConfig::Directory { path: path.clone() },
            (None, Some(base_url)) => InterfaceSourceConfig::Remote {
                base_url: base_url.clone(),
            },
            (None, None) => InterfaceSourceConfig::Packaged,
        };

        let mut config = SdkConfig::new(self.rpc_url.clone())
            .with_credential(credential)
            .with_interfaces(interfaces);
        config.chain_id = self.chain_id;
        config.gas = self.gas.clone();
        config.confirmation = self.confirmation.clone();
        config
    }
}
