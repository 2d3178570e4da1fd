//! In-process chain for integration tests
//!
//! `FakeChain` answers the JSON-RPC methods the SDK uses. It decodes each
//! raw transaction, recovers the sender from the EIP-155 signature,
//! enforces nonces and balances, and emulates the registry contracts by
//! storing setter arguments and returning them from the matching getter.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use dpp_crypto::{keccak256, recover_address, Signature};
use dpp_sdk::abi::{decode, encode, ContractInterface, MethodDescriptor, ParamType, Token};
use dpp_sdk::source::StaticSource;
use dpp_sdk::{
    Address, CredentialSource, Eip155Signer, PassportSdk, SdkConfig, SdkError, Transport, TxHash,
    UnsignedTransaction, U256,
};
use rlp::{Rlp, RlpStream};
use serde_json::{json, Value};

/// Hardhat / Anvil account #0
pub const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Hardhat / Anvil account #1
pub const SECOND_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

/// Default chain ID for tests
pub const TEST_CHAIN_ID: u64 = 1337;

/// Initial balance for funded test accounts (100 ETH)
pub const FUNDED_BALANCE: u128 = 100_000_000_000_000_000_000;

/// Gas charged for every mined transaction
pub const GAS_USED: u64 = 21_000;

const BYTECODE: &[u8] = &[0x60, 0x80, 0x60, 0x40, 0x52];

pub fn packaged_abi(name: &str) -> &'static str {
    match name {
        "ProductPassport" => include_str!("../../abi/ProductPassport.json"),
        "Batch" => include_str!("../../abi/Batch.json"),
        "Geolocation" => include_str!("../../abi/Geolocation.json"),
        other => panic!("no packaged ABI for {other}"),
    }
}

/// Packaged interface with creation code attached
pub fn deployable(name: &str) -> ContractInterface {
    let parsed = ContractInterface::from_abi_json(name, packaged_abi(name)).unwrap();
    ContractInterface::new(
        name,
        parsed.constructor().cloned(),
        parsed.methods().to_vec(),
        Some(Bytes::from_static(BYTECODE)),
    )
}

/// All three contracts, deployable
pub fn deployable_source() -> StaticSource {
    StaticSource::new()
        .with(deployable("ProductPassport"))
        .with(deployable("Batch"))
        .with(deployable("Geolocation"))
}

/// Config for the fake chain, signing with `key`
pub fn test_config(key: &str) -> SdkConfig {
    let mut config = SdkConfig::new("http://fake-chain").with_credential(CredentialSource::PrivateKey {
        key: key.to_string(),
    });
    config.confirmation.poll_interval_ms = 10;
    config.confirmation.timeout_secs = 5;
    config
}

/// SDK over `chain` using the dev key and deployable interfaces
pub async fn sdk(chain: &Arc<FakeChain>) -> PassportSdk {
    PassportSdk::with_transport(test_config(DEV_KEY), chain.clone(), &deployable_source())
        .await
        .unwrap()
}

/// `CREATE` address: keccak(rlp([sender, nonce]))[12..]
pub fn create_address(sender: &Address, nonce: u64) -> Address {
    let mut stream = RlpStream::new_list(2);
    stream.append(sender);
    stream.append(&nonce);
    let hash = keccak256(stream.out());
    Address::from_slice(&hash.as_bytes()[12..]).unwrap()
}

type StorageKey = (Address, String, Vec<u8>);

#[derive(Default)]
struct State {
    nonces: HashMap<Address, u64>,
    balances: HashMap<Address, U256>,
    receipts: HashMap<TxHash, Value>,
    contracts: HashMap<Address, u64>,
    storage: HashMap<StorageKey, Vec<Vec<Token>>>,
    used_nonces: Vec<(Address, u64)>,
    calls: Vec<String>,
    block: u64,
    withhold_receipts: bool,
    revert_all: bool,
}

/// Stateful JSON-RPC node for tests
pub struct FakeChain {
    chain_id: u64,
    interfaces: Vec<ContractInterface>,
    state: Mutex<State>,
}

impl FakeChain {
    /// Chain 1337 that knows the packaged contracts
    pub fn new() -> Self {
        let interfaces = ["ProductPassport", "Batch", "Geolocation"]
            .into_iter()
            .map(deployable)
            .collect();
        Self {
            chain_id: TEST_CHAIN_ID,
            interfaces,
            state: Mutex::new(State::default()),
        }
    }

    /// Also recognise the methods of `interface`; checked first
    pub fn with_interface(mut self, interface: ContractInterface) -> Self {
        self.interfaces.insert(0, interface);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_balance(&self, address: Address, wei: U256) {
        self.lock().balances.insert(address, wei);
    }

    pub fn balance(&self, address: &Address) -> U256 {
        self.lock().balance(address)
    }

    pub fn nonce(&self, address: &Address) -> u64 {
        self.lock().nonces.get(address).copied().unwrap_or(0)
    }

    /// Keep every receipt pending
    pub fn withhold_receipts(&self, withhold: bool) {
        self.lock().withhold_receipts = withhold;
    }

    /// Mine every following transaction with status 0
    pub fn revert_all(&self, revert: bool) {
        self.lock().revert_all = revert;
    }

    /// `(sender, nonce)` of every accepted transaction, in order
    pub fn used_nonces(&self) -> Vec<(Address, u64)> {
        self.lock().used_nonces.clone()
    }

    pub fn deployed(&self) -> usize {
        self.lock().contracts.len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.lock().calls.iter().filter(|m| *m == method).count()
    }

    fn method_by_selector(&self, data: &[u8]) -> Option<&MethodDescriptor> {
        let selector = data.get(..4)?;
        self.interfaces
            .iter()
            .flat_map(|i| i.methods())
            .find(|m| m.selector.as_slice() == selector)
    }

    fn send_raw(&self, state: &mut State, raw_hex: &str) -> Result<Value, SdkError> {
        let raw = hex::decode(raw_hex.trim_start_matches("0x")).map_err(invalid)?;
        let rlp = Rlp::new(&raw);
        if rlp.item_count().map_err(invalid)? != 9 {
            return Err(invalid("expected 9 fields"));
        }

        let to_item = rlp.at(3).map_err(invalid)?;
        let to = if to_item.is_empty() {
            None
        } else {
            Some(to_item.as_val::<Address>().map_err(invalid)?)
        };
        let v: u64 = rlp.val_at(6).map_err(invalid)?;
        if v < 35 || (v - 35) / 2 != self.chain_id {
            return Err(rpc(-32000, "invalid chain id"));
        }

        let mut tx = UnsignedTransaction {
            chain_id: self.chain_id,
            sender: Address::ZERO,
            nonce: rlp.val_at(0).map_err(invalid)?,
            gas_price: rlp.val_at::<U256>(1).map_err(invalid)?.as_u128(),
            gas_limit: rlp.val_at(2).map_err(invalid)?,
            to,
            value: rlp.val_at(4).map_err(invalid)?,
            data: Bytes::from(rlp.val_at::<Vec<u8>>(5).map_err(invalid)?),
        };

        let mut signature = Signature {
            r: [0u8; 32],
            s: [0u8; 32],
            v: ((v - 35) % 2) as u8 + 27,
        };
        rlp.val_at::<U256>(7).map_err(invalid)?.to_big_endian(&mut signature.r);
        rlp.val_at::<U256>(8).map_err(invalid)?.to_big_endian(&mut signature.s);
        tx.sender = recover_address(&Eip155Signer::signing_hash(&tx), &signature).map_err(invalid)?;

        let expected = state.nonces.get(&tx.sender).copied().unwrap_or(0);
        if tx.nonce < expected {
            return Err(rpc(-32000, "nonce too low"));
        }
        if tx.nonce > expected {
            return Err(rpc(-32000, "nonce too high"));
        }
        let fee = U256::from(GAS_USED) * U256::from(tx.gas_price);
        if state.balance(&tx.sender) < U256::from(tx.gas_limit) * U256::from(tx.gas_price) {
            return Err(rpc(-32000, "insufficient funds for gas * price + value"));
        }

        state.nonces.insert(tx.sender, expected + 1);
        state.used_nonces.push((tx.sender, tx.nonce));
        let balance = state.balance(&tx.sender).saturating_sub(fee);
        state.balances.insert(tx.sender, balance);
        state.block += 1;

        let hash = keccak256(&raw);
        let mut contract_address = Value::Null;
        let success = if state.revert_all {
            false
        } else {
            match tx.to {
                None => {
                    let address = create_address(&tx.sender, tx.nonce);
                    state.contracts.insert(address, state.block);
                    contract_address = json!(address.to_hex());
                    true
                }
                Some(to) => self.execute(state, to, &tx.data),
            }
        };

        state.receipts.insert(
            hash,
            json!({
                "transactionHash": hash.to_hex(),
                "status": if success { "0x1" } else { "0x0" },
                "blockNumber": format!("0x{:x}", state.block),
                "gasUsed": format!("0x{:x}", GAS_USED),
                "contractAddress": contract_address,
            }),
        );
        Ok(json!(hash.to_hex()))
    }

    /// Apply a call to one of the registry contracts; false reverts
    fn execute(&self, state: &mut State, to: Address, data: &[u8]) -> bool {
        if !state.contracts.contains_key(&to) {
            return false;
        }
        let Some(method) = self.method_by_selector(data) else {
            return false;
        };
        let Ok(mut args) = decode(&method.input_types(), &data[4..]) else {
            return false;
        };
        if args.is_empty() {
            return false;
        }
        let key_arg = args.remove(0);

        let (getter, append) = match method.name.as_str() {
            "authorizeEntity" => {
                let key = (to, "authorizedEntities".to_string(), encode(&[key_arg]));
                state.storage.insert(key, vec![vec![Token::Bool(true)]]);
                return true;
            }
            "createBatch" => ("getBatch".to_string(), false),
            "addGeolocation" => ("getGeolocation".to_string(), true),
            name => match name.strip_prefix("set") {
                Some(rest) => (format!("get{rest}"), false),
                None => return false,
            },
        };

        let entries = state
            .storage
            .entry((to, getter, encode(&[key_arg])))
            .or_default();
        if !append {
            entries.clear();
        }
        entries.push(args);
        true
    }

    fn call(&self, state: &State, request: &Value) -> Result<Value, SdkError> {
        let to = request
            .get("to")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("missing to"))?
            .parse::<Address>()
            .map_err(invalid)?;
        let data = request
            .get("data")
            .and_then(Value::as_str)
            .map(|d| hex::decode(d.trim_start_matches("0x")))
            .transpose()
            .map_err(invalid)?
            .unwrap_or_default();

        if !state.contracts.contains_key(&to) {
            return Ok(json!("0x"));
        }
        let method = self
            .method_by_selector(&data)
            .ok_or_else(|| rpc(3, "execution reverted"))?;
        let args = decode(&method.input_types(), &data[4..]).map_err(|_| rpc(3, "execution reverted"))?;
        let key_arg = args.first().map(|arg| encode(std::slice::from_ref(arg)));
        let key = (to, method.name.clone(), key_arg.unwrap_or_default());

        let Some(entries) = state.storage.get(&key) else {
            return Ok(json!("0x"));
        };
        let outputs = method.output_types();
        let encoded = match outputs.as_slice() {
            [ParamType::Array(_)] => encode(&[Token::Array(
                entries.iter().cloned().map(Token::Tuple).collect(),
            )]),
            _ => encode(entries.last().map(Vec::as_slice).unwrap_or(&[])),
        };
        Ok(json!(format!("0x{}", hex::encode(encoded))))
    }
}

impl Default for FakeChain {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    fn balance(&self, address: &Address) -> U256 {
        self.balances
            .get(address)
            .copied()
            .unwrap_or_else(|| U256::from(FUNDED_BALANCE))
    }
}

fn invalid(e: impl ToString) -> SdkError {
    rpc(-32602, &e.to_string())
}

fn rpc(code: i64, message: &str) -> SdkError {
    SdkError::Rpc {
        code,
        message: message.to_string(),
    }
}

fn address_param(params: &[Value], index: usize) -> Result<Address, SdkError> {
    params
        .get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("missing address"))?
        .parse::<Address>()
        .map_err(invalid)
}

#[async_trait]
impl Transport for FakeChain {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, SdkError> {
        let mut state = self.lock();
        state.calls.push(method.to_string());

        match method {
            "eth_chainId" => Ok(json!(format!("0x{:x}", self.chain_id))),
            "eth_gasPrice" => Ok(json!("0x4a817c800")),
            "eth_blockNumber" => Ok(json!(format!("0x{:x}", state.block))),
            "eth_getBalance" => {
                let address = address_param(&params, 0)?;
                Ok(json!(format!("0x{:x}", state.balance(&address))))
            }
            "eth_getTransactionCount" => {
                let address = address_param(&params, 0)?;
                let nonce = state.nonces.get(&address).copied().unwrap_or(0);
                Ok(json!(format!("0x{:x}", nonce)))
            }
            "eth_estimateGas" => Ok(json!(format!("0x{:x}", GAS_USED))),
            "eth_sendRawTransaction" => {
                let raw = params
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| invalid("missing raw transaction"))?
                    .to_string();
                self.send_raw(&mut state, &raw)
            }
            "eth_getTransactionReceipt" => {
                if state.withhold_receipts {
                    return Ok(Value::Null);
                }
                let hash = params
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| invalid("missing hash"))?
                    .parse::<TxHash>()
                    .map_err(invalid)?;
                Ok(state.receipts.get(&hash).cloned().unwrap_or(Value::Null))
            }
            "eth_call" => {
                let request = params.first().ok_or_else(|| invalid("missing call"))?;
                self.call(&state, request)
            }
            other => Err(rpc(-32601, &format!("Method not found: {other}"))),
        }
    }
}
