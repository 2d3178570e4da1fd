//! PassportSdk - one credential, one connection, one registry

use std::sync::Arc;

use dpp_primitives::Address;
use tracing::info;

use crate::builder::TransactionBuilder;
use crate::client::NetworkClient;
use crate::config::SdkConfig;
use crate::credential::Credential;
use crate::facade::{BatchFacade, ContractFacade, GeolocationFacade, Pipeline, ProductPassportFacade};
use crate::registry::{ContractKind, InterfaceRegistry};
use crate::source::InterfaceSource;
use crate::submitter::TransactionSubmitter;
use crate::transport::Transport;
use crate::SdkError;

/// Entry point of the SDK.
///
/// Each instance owns its own connection, credential and registry; there
/// is no global state, so several instances can live side by side.
///
/// Nonces are serialized per sender within one instance and its clones.
/// Two instances built separately for the same key do not coordinate and
/// can race for the same nonce, so share one instance (clone it) per key.
///
/// ```rust,no_run
/// use dpp_sdk::{PassportSdk, ProductRecord, SdkConfig};
///
/// # async fn run() -> Result<(), dpp_sdk::SdkError> {
/// let sdk = PassportSdk::initialize(SdkConfig::from_env()?).await?;
/// let registry = sdk.passport().deploy(None).await?;
/// let record = ProductRecord {
///     uid: "BRG-2023-001".into(),
///     gtin: "7894561230123".into(),
///     taric_code: "1905".into(),
///     manufacturer_info: "Sweet Delights".into(),
///     consumer_info: "Store in a cool, dry place".into(),
///     end_of_life_info: "Recyclable packaging".into(),
/// };
/// sdk.passport().set_product(registry, 1, &record).await?;
/// assert_eq!(sdk.passport().get_product(registry, 1).await?, record);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PassportSdk {
    registry: InterfaceRegistry,
    passport: ProductPassportFacade,
    batch: BatchFacade,
    geolocation: GeolocationFacade,
    address: Address,
    chain_id: u64,
}

impl PassportSdk {
    /// Resolve the credential, connect to `rpc_url` and load the contract
    /// interfaces.
    ///
    /// Fails with [`SdkError::CredentialMissing`] before any network
    /// access when no key can be resolved, with [`SdkError::Connection`]
    /// when the endpoint cannot be reached, and with
    /// [`SdkError::InterfaceLoad`] when an interface cannot be loaded.
    #[cfg(feature = "http")]
    pub async fn initialize(config: SdkConfig) -> Result<Self, SdkError> {
        config.validate()?;
        let credential = config.credential.resolve()?;
        let client = NetworkClient::connect(&config.rpc_url).await?;
        let source = config.interfaces.build()?;
        Self::assemble(config, credential, client, source.as_ref()).await
    }

    /// Like [`PassportSdk::initialize`] over a caller-supplied transport
    /// and interface source
    pub async fn with_transport(
        config: SdkConfig,
        transport: Arc<dyn Transport>,
        source: &dyn InterfaceSource,
    ) -> Result<Self, SdkError> {
        config.validate()?;
        let credential = config.credential.resolve()?;
        let client = NetworkClient::with_transport(transport)
            .await
            .map_err(|e| SdkError::Connection {
                endpoint: config.rpc_url.clone(),
                reason: e.to_string(),
            })?;
        Self::assemble(config, credential, client, source).await
    }

    async fn assemble(
        config: SdkConfig,
        credential: Credential,
        client: NetworkClient,
        source: &dyn InterfaceSource,
    ) -> Result<Self, SdkError> {
        if let Some(expected) = config.chain_id {
            if expected != client.chain_id() {
                return Err(SdkError::Config(format!(
                    "endpoint reports chain id {}, configured {}",
                    client.chain_id(),
                    expected
                )));
            }
        }

        let registry = InterfaceRegistry::load_all(source).await?;
        let address = credential.address();
        let chain_id = client.chain_id();

        let pipeline = Arc::new(Pipeline {
            builder: TransactionBuilder::new(client.clone(), config.gas),
            submitter: TransactionSubmitter::new(client.clone(), config.confirmation),
            client,
            credential: Arc::new(credential),
        });
        let facade = |kind: ContractKind| -> Result<ContractFacade, SdkError> {
            Ok(ContractFacade::new(
                kind,
                registry.resolve_kind(kind)?,
                pipeline.clone(),
            ))
        };

        let sdk = Self {
            passport: ProductPassportFacade::new(facade(ContractKind::ProductPassport)?),
            batch: BatchFacade::new(facade(ContractKind::Batch)?),
            geolocation: GeolocationFacade::new(facade(ContractKind::Geolocation)?),
            registry,
            address,
            chain_id,
        };
        info!(%address, chain_id, endpoint = %config.rpc_url, "sdk initialized");
        Ok(sdk)
    }

    /// ProductPassport operations
    pub fn passport(&self) -> &ProductPassportFacade {
        &self.passport
    }

    /// Batch operations
    pub fn batch(&self) -> &BatchFacade {
        &self.batch
    }

    /// Geolocation operations
    pub fn geolocation(&self) -> &GeolocationFacade {
        &self.geolocation
    }

    /// Untyped facade for any registered contract
    pub fn contract(&self, kind: ContractKind) -> &ContractFacade {
        match kind {
            ContractKind::ProductPassport => self.passport.contract(),
            ContractKind::Batch => self.batch.contract(),
            ContractKind::Geolocation => self.geolocation.contract(),
        }
    }

    /// Interfaces loaded at construction
    pub fn registry(&self) -> &InterfaceRegistry {
        &self.registry
    }

    /// Signing account
    pub fn address(&self) -> Address {
        self.address
    }

    /// Chain id of the connected network
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}
