//! SDK configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use dpp_primitives::units::gwei;
use serde::{Deserialize, Serialize};

use crate::credential::Credential;
use crate::source::{DirectorySource, InterfaceSource, PackagedSource};
use crate::SdkError;

/// Environment variable holding the RPC endpoint
pub const PROVIDER_URL_VAR: &str = "PROVIDER_URL";

/// Environment variable holding the hex private key
pub const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY";

/// SDK configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdkConfig {
    /// JSON-RPC endpoint URL
    pub rpc_url: String,
    /// Expected chain id; fetched from the node when absent
    #[serde(default)]
    pub chain_id: Option<u64>,
    /// Where the signing key comes from
    #[serde(default)]
    pub credential: CredentialSource,
    /// Where contract interfaces come from
    #[serde(default)]
    pub interfaces: InterfaceSourceConfig,
    /// Gas defaults
    #[serde(default)]
    pub gas: GasConfig,
    /// Receipt polling
    #[serde(default)]
    pub confirmation: ConfirmationConfig,
}

impl SdkConfig {
    /// Config for `rpc_url` with every other setting at its default
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            chain_id: None,
            credential: CredentialSource::default(),
            interfaces: InterfaceSourceConfig::default(),
            gas: GasConfig::default(),
            confirmation: ConfirmationConfig::default(),
        }
    }

    /// Set the credential source
    pub fn with_credential(mut self, credential: CredentialSource) -> Self {
        self.credential = credential;
        self
    }

    /// Set the interface source
    pub fn with_interfaces(mut self, interfaces: InterfaceSourceConfig) -> Self {
        self.interfaces = interfaces;
        self
    }

    /// Parse from TOML
    pub fn from_toml_str(content: &str) -> Result<Self, SdkError> {
        let config: Self =
            toml::from_str(content).map_err(|e| SdkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SdkError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Build from `PROVIDER_URL`, taking the key from `PRIVATE_KEY`
    pub fn from_env() -> Result<Self, SdkError> {
        let rpc_url = std::env::var(PROVIDER_URL_VAR)
            .map_err(|_| SdkError::Config(format!("{PROVIDER_URL_VAR} is not set")))?;
        let config = Self::new(rpc_url).with_credential(CredentialSource::Env {
            var: PRIVATE_KEY_VAR.to_string(),
        });
        config.validate()?;
        Ok(config)
    }

    /// Reject values that can never work
    pub fn validate(&self) -> Result<(), SdkError> {
        if self.rpc_url.trim().is_empty() {
            return Err(SdkError::Config("rpc_url is empty".to_string()));
        }
        if self.chain_id == Some(0) {
            return Err(SdkError::Config("chain_id must be non-zero".to_string()));
        }
        if self.gas.deploy_gas_limit == 0 || self.gas.call_gas_limit == 0 {
            return Err(SdkError::Config("gas limits must be non-zero".to_string()));
        }
        if self.confirmation.timeout_secs == 0 || self.confirmation.poll_interval_ms == 0 {
            return Err(SdkError::Config(
                "confirmation timeout and poll interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the signing key comes from
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialSource {
    /// Hex private key given inline
    PrivateKey {
        /// 32-byte key as hex
        key: String,
    },
    /// Hex private key read from an environment variable
    Env {
        /// Variable name
        #[serde(default = "default_key_var")]
        var: String,
    },
    /// No key configured
    #[default]
    None,
}

fn default_key_var() -> String {
    PRIVATE_KEY_VAR.to_string()
}

impl CredentialSource {
    /// Resolve to a usable credential
    pub fn resolve(&self) -> Result<Credential, SdkError> {
        match self {
            CredentialSource::PrivateKey { key } => Credential::from_private_key_hex(key),
            CredentialSource::Env { var } => Credential::from_env(var),
            CredentialSource::None => Err(SdkError::CredentialMissing(
                "no credential configured".to_string(),
            )),
        }
    }
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::PrivateKey { .. } => f.write_str("PrivateKey(<redacted>)"),
            CredentialSource::Env { var } => f.debug_struct("Env").field("var", var).finish(),
            CredentialSource::None => f.write_str("None"),
        }
    }
}

/// Where contract interfaces are loaded from
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InterfaceSourceConfig {
    /// ABIs compiled into the SDK (no bytecode: call-only)
    #[default]
    Packaged,
    /// Compiler artifacts in a local directory
    Directory {
        /// Artifact root
        path: PathBuf,
    },
    /// Compiler artifacts over HTTP
    Remote {
        /// Base URL of the artifact tree
        base_url: String,
    },
}

impl InterfaceSourceConfig {
    /// Instantiate the configured source
    pub fn build(&self) -> Result<Box<dyn InterfaceSource>, SdkError> {
        match self {
            InterfaceSourceConfig::Packaged => Ok(Box::new(PackagedSource)),
            InterfaceSourceConfig::Directory { path } => {
                Ok(Box::new(DirectorySource::new(path.clone())))
            }
            #[cfg(feature = "http")]
            InterfaceSourceConfig::Remote { base_url } => {
                Ok(Box::new(crate::source::RemoteSource::new(base_url.clone())))
            }
            #[cfg(not(feature = "http"))]
            InterfaceSourceConfig::Remote { .. } => Err(SdkError::Config(
                "remote interface source requires the `http` feature".to_string(),
            )),
        }
    }
}

/// Gas defaults applied when a call carries no override
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GasConfig {
    /// Gas limit for contract creation
    #[serde(default = "default_deploy_gas_limit")]
    pub deploy_gas_limit: u64,
    /// Gas limit for method calls
    #[serde(default = "default_call_gas_limit")]
    pub call_gas_limit: u64,
    /// Gas price in wei
    #[serde(default = "default_gas_price_wei")]
    pub gas_price_wei: u64,
    /// Ask the node with `eth_estimateGas` first, falling back to the
    /// fixed limits when estimation fails
    #[serde(default)]
    pub estimate: bool,
}

fn default_deploy_gas_limit() -> u64 {
    3_000_000
}

fn default_call_gas_limit() -> u64 {
    500_000
}

fn default_gas_price_wei() -> u64 {
    gwei(20) as u64
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            deploy_gas_limit: default_deploy_gas_limit(),
            call_gas_limit: default_call_gas_limit(),
            gas_price_wei: default_gas_price_wei(),
            estimate: false,
        }
    }
}

/// Receipt polling settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfirmationConfig {
    /// Give up waiting after this many seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Delay between receipt polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl ConfirmationConfig {
    /// Timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Poll interval as a duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SdkConfig::new("http://localhost:8545");
        assert_eq!(config.gas.deploy_gas_limit, 3_000_000);
        assert_eq!(config.gas.call_gas_limit, 500_000);
        assert_eq!(config.gas.gas_price_wei, 20_000_000_000);
        assert!(!config.gas.estimate);
        assert_eq!(config.confirmation.timeout(), Duration::from_secs(120));
        assert_eq!(config.confirmation.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.credential, CredentialSource::None);
        assert_eq!(config.interfaces, InterfaceSourceConfig::Packaged);
    }

    #[test]
    fn test_from_toml() {
        let config = SdkConfig::from_toml_str(
            r#"
            rpc_url = "https://sepolia.example.org"
            chain_id = 11155111

            [credential]
            type = "env"

            [interfaces]
            type = "directory"
            path = "artifacts/contracts"

            [gas]
            call_gas_limit = 250000
            estimate = true

            [confirmation]
            timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.chain_id, Some(11_155_111));
        assert_eq!(
            config.credential,
            CredentialSource::Env {
                var: "PRIVATE_KEY".to_string()
            }
        );
        assert_eq!(
            config.interfaces,
            InterfaceSourceConfig::Directory {
                path: PathBuf::from("artifacts/contracts")
            }
        );
        assert_eq!(config.gas.call_gas_limit, 250_000);
        assert_eq!(config.gas.deploy_gas_limit, 3_000_000);
        assert!(config.gas.estimate);
        assert_eq!(config.confirmation.timeout_secs, 30);
        assert_eq!(config.confirmation.poll_interval_ms, 1000);
    }

    #[test]
    fn test_rejects_zero_values() {
        assert!(SdkConfig::from_toml_str(r#"rpc_url = """#).is_err());
        assert!(SdkConfig::from_toml_str(
            "rpc_url = \"http://x\"\n[confirmation]\npoll_interval_ms = 0"
        )
        .is_err());
    }

    #[test]
    fn test_credential_source_debug_redacts() {
        let source = CredentialSource::PrivateKey {
            key: "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string(),
        };
        let debug = format!("{source:?}");
        assert!(!debug.contains("ac0974"));
    }

    #[test]
    fn test_none_credential_is_missing() {
        assert!(matches!(
            CredentialSource::None.resolve(),
            Err(SdkError::CredentialMissing(_))
        ));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dpp.toml");
        std::fs::write(&path, "rpc_url = \"http://127.0.0.1:8545\"").unwrap();
        let config = SdkConfig::load(&path).unwrap();
        assert_eq!(config.rpc_url, "http://127.0.0.1:8545");
        assert!(SdkConfig::load(dir.path().join("missing.toml")).is_err());
    }
}
