//! Where contract interfaces come from
//!
//! One trait, several strategies chosen at construction time: ABIs
//! compiled into the crate, compiler artifacts on disk, artifacts fetched
//! over HTTP, or interfaces built in memory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::abi::ContractInterface;
use crate::SdkError;

/// Loads the interface for a logical contract name
#[async_trait]
pub trait InterfaceSource: Send + Sync {
    /// Load one interface. Called once per name at SDK construction.
    async fn load(&self, name: &str) -> Result<ContractInterface, SdkError>;

    /// Human-readable description for logs
    fn describe(&self) -> String;
}

/// ABIs shipped inside the crate. They carry no bytecode, so contracts
/// resolved from here can be called but not deployed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackagedSource;

impl PackagedSource {
    fn abi(name: &str) -> Option<&'static str> {
        match name {
            "ProductPassport" => Some(include_str!("../abi/ProductPassport.json")),
            "Batch" => Some(include_str!("../abi/Batch.json")),
            "Geolocation" => Some(include_str!("../abi/Geolocation.json")),
            _ => None,
        }
    }
}

#[async_trait]
impl InterfaceSource for PackagedSource {
    async fn load(&self, name: &str) -> Result<ContractInterface, SdkError> {
        let json = Self::abi(name)
            .ok_or_else(|| SdkError::Config(format!("no packaged ABI for {name}")))?;
        ContractInterface::from_abi_json(name, json)
    }

    fn describe(&self) -> String {
        "packaged".to_string()
    }
}

/// Compiler artifacts in a directory.
///
/// Looks for `<root>/<Name>.sol/<Name>.json` (Hardhat layout) first, then
/// `<root>/<Name>.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Read artifacts below `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Artifact directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, name: &str) -> [PathBuf; 2] {
        [
            self.root.join(format!("{name}.sol")).join(format!("{name}.json")),
            self.root.join(format!("{name}.json")),
        ]
    }
}

#[async_trait]
impl InterfaceSource for DirectorySource {
    async fn load(&self, name: &str) -> Result<ContractInterface, SdkError> {
        for path in self.candidates(name) {
            match tokio::fs::read_to_string(&path).await {
                Ok(json) => {
                    debug!(contract = name, path = %path.display(), "loading artifact");
                    return ContractInterface::from_artifact(name, &json);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(SdkError::Config(format!("{}: {e}", path.display()))),
            }
        }
        Err(SdkError::Config(format!(
            "no artifact for {name} under {}",
            self.root.display()
        )))
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}

/// Artifacts fetched over HTTP with the same layout as [`DirectorySource`],
/// e.g. a raw GitHub URL of a Hardhat `artifacts/contracts` tree
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct RemoteSource {
    base_url: String,
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl RemoteSource {
    /// Fetch artifacts below `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Option<String>, SdkError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SdkError::Transport(e.to_string()))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|e| SdkError::Transport(e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| SdkError::Transport(e.to_string()))?;
        Ok(Some(body))
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl InterfaceSource for RemoteSource {
    async fn load(&self, name: &str) -> Result<ContractInterface, SdkError> {
        let urls = [
            format!("{}/{name}.sol/{name}.json", self.base_url),
            format!("{}/{name}.json", self.base_url),
        ];
        for url in &urls {
            if let Some(json) = self.fetch(url).await? {
                debug!(contract = name, %url, "fetched artifact");
                return ContractInterface::from_artifact(name, &json);
            }
        }
        Err(SdkError::Config(format!(
            "no artifact for {name} under {}",
            self.base_url
        )))
    }

    fn describe(&self) -> String {
        format!("remote {}", self.base_url)
    }
}

/// Interfaces supplied directly, mostly for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    interfaces: HashMap<String, ContractInterface>,
}

impl StaticSource {
    /// Empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an interface under its own name
    pub fn with(mut self, interface: ContractInterface) -> Self {
        self.interfaces.insert(interface.name().to_string(), interface);
        self
    }
}

#[async_trait]
impl InterfaceSource for StaticSource {
    async fn load(&self, name: &str) -> Result<ContractInterface, SdkError> {
        self.interfaces
            .get(name)
            .cloned()
            .ok_or_else(|| SdkError::Config(format!("{name} not provided")))
    }

    fn describe(&self) -> String {
        format!("static ({} interfaces)", self.interfaces.len())
    }
}
