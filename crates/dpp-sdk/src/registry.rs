//! InterfaceRegistry - logical contract name to interface

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use crate::abi::ContractInterface;
use crate::source::InterfaceSource;
use crate::SdkError;

/// The contracts this SDK knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    /// Product identity and product data registry
    ProductPassport,
    /// Batch/lot registry linked to a passport registry
    Batch,
    /// Geolocation records per batch
    Geolocation,
}

impl ContractKind {
    /// Every kind, in registration order
    pub const ALL: [ContractKind; 3] = [
        ContractKind::ProductPassport,
        ContractKind::Batch,
        ContractKind::Geolocation,
    ];

    /// Logical contract name, also the artifact file stem
    pub fn name(self) -> &'static str {
        match self {
            ContractKind::ProductPassport => "ProductPassport",
            ContractKind::Batch => "Batch",
            ContractKind::Geolocation => "Geolocation",
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContractKind {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContractKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SdkError::UnknownContract(s.to_string()))
    }
}

/// Interfaces loaded once at startup, looked up by name.
///
/// Lookups are pure and return the same `Arc` every time.
#[derive(Debug, Clone, Default)]
pub struct InterfaceRegistry {
    entries: HashMap<String, Arc<ContractInterface>>,
}

impl InterfaceRegistry {
    /// Load every name from `source`. The first failure aborts with
    /// [`SdkError::InterfaceLoad`].
    pub async fn load(
        source: &dyn InterfaceSource,
        names: impl IntoIterator<Item = &str>,
    ) -> Result<Self, SdkError> {
        let mut entries = HashMap::new();
        for name in names {
            let interface = source
                .load(name)
                .await
                .map_err(|e| SdkError::InterfaceLoad {
                    contract: name.to_string(),
                    reason: e.to_string(),
                })?;
            info!(
                contract = name,
                source = %source.describe(),
                methods = interface.methods().len(),
                deployable = interface.bytecode().is_some(),
                "interface loaded"
            );
            entries.insert(name.to_string(), Arc::new(interface));
        }
        Ok(Self { entries })
    }

    /// Load the three passport contracts
    pub async fn load_all(source: &dyn InterfaceSource) -> Result<Self, SdkError> {
        Self::load(source, ContractKind::ALL.iter().map(|k| k.name())).await
    }

    /// Build from already-parsed interfaces
    pub fn from_interfaces(interfaces: impl IntoIterator<Item = ContractInterface>) -> Self {
        let entries = interfaces
            .into_iter()
            .map(|i| (i.name().to_string(), Arc::new(i)))
            .collect();
        Self { entries }
    }

    /// Look up an interface by logical name
    pub fn resolve(&self, name: &str) -> Result<Arc<ContractInterface>, SdkError> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| SdkError::UnknownContract(name.to_string()))
    }

    /// Look up one of the known contracts
    pub fn resolve_kind(&self, kind: ContractKind) -> Result<Arc<ContractInterface>, SdkError> {
        self.resolve(kind.name())
    }

    /// Registered names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
