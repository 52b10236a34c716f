use anyhow::anyhow;
use ethers::abi::Abi;
use ethers::contract::Contract;
use ethers::core::types::{Address, TransactionReceipt, TransactionRequest, U256};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::command::canonical_symbol;
use crate::domain::error::ChatPayError;
use crate::infrastructure::blockchain::ethereum;
use crate::infrastructure::blockchain::tokens::{TokenIdentity, TokenRegistry};
use crate::infrastructure::config::Config;

/// Outcome of a confirmed transfer. Only built once the transaction is
/// included on-chain, never for a merely submitted one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResult {
    pub tx_hash: String,
    pub from: String,
    pub to: String,
    pub amount: String,
    pub token: String,
    pub block_number: u64,
    pub network: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceInfo {
    pub token: String,
    pub balance: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

pub struct BlockchainManager {
    client: Arc<SignerClient>,
    registry: TokenRegistry,
    erc20_abi: Abi,
    gas_limit: U256,
    network_name: String,
    chain_id: u64,
}

impl BlockchainManager {
    pub fn new(config: &Config) -> Result<Self, ChatPayError> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str()).map_err(|e| {
            ChatPayError::Config(format!(
                "Failed to create HTTP provider for {}: {e}",
                config.rpc_url
            ))
        })?;

        let wallet = config
            .private_key
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| ChatPayError::Config(format!("Invalid signing key: {e}")))?
            .with_chain_id(config.chain_id);

        let client = Arc::new(SignerMiddleware::new(provider.clone(), wallet));
        let registry = TokenRegistry::new(&config.tokens, provider)?;

        Ok(Self {
            client,
            registry,
            erc20_abi: ethereum::erc20_abi()?,
            gas_limit: U256::from(config.gas_limit),
            network_name: config.network_name.clone(),
            chain_id: config.chain_id,
        })
    }

    pub fn signer_address(&self) -> Address {
        self.client.signer().address()
    }

    pub fn network_name(&self) -> &str {
        &self.network_name
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn erc20(&self, token: Address) -> Contract<SignerClient> {
        Contract::new(token, self.erc20_abi.clone(), Arc::clone(&self.client))
    }

    /// Execute a transfer of `amount` (human units) to `to`. Validates the
    /// destination and amount, checks the signing account's balance at full
    /// integer precision, submits on the native or contract path, and
    /// blocks until the transaction is confirmed on-chain.
    pub async fn transfer(
        &self,
        symbol: &str,
        to: &str,
        amount: &str,
    ) -> Result<TransferResult, ChatPayError> {
        let symbol = canonical_symbol(symbol);
        let identity = self.registry.identity(&symbol)?;
        let recipient = ethereum::parse_address(to)?;
        let decimals = self.registry.resolve_decimals(&symbol).await?;
        let units = ethereum::parse_token_amount(amount, decimals)?;
        let sender = self.signer_address();

        let available = match identity {
            TokenIdentity::Native => self.native_balance(sender).await?,
            TokenIdentity::Contract(token) => self.token_balance(token, sender).await?,
        };
        ensure_sufficient_balance(&symbol, available, units, decimals)?;

        log::info!("Submitting {symbol} transfer of {amount} to {to}");
        let receipt = match identity {
            TokenIdentity::Native => self.send_native(recipient, units).await,
            TokenIdentity::Contract(token) => self.send_token(token, recipient, units).await,
        }
        .map_err(|e| ChatPayError::TransferFailed {
            token: symbol.clone(),
            message: e.to_string(),
        })?;

        let tx_hash = format!("{:?}", receipt.transaction_hash);
        let block_number = receipt.block_number.unwrap_or_default().as_u64();
        log::info!("{symbol} transfer confirmed in block {block_number}: {tx_hash}");

        Ok(TransferResult {
            tx_hash,
            from: format!("{sender:?}"),
            to: to.to_string(),
            amount: amount.to_string(),
            token: symbol,
            block_number,
            network: self.network_name.clone(),
        })
    }

    /// Balance of one token. An unsupported symbol or malformed address is
    /// an error; a failed chain read degrades to a zero balance with the
    /// error annotated.
    pub async fn balance_of(
        &self,
        symbol: &str,
        address: Option<&str>,
    ) -> Result<BalanceInfo, ChatPayError> {
        let symbol = canonical_symbol(symbol);
        let identity = self.registry.identity(&symbol)?;
        let owner = match address {
            Some(text) => ethereum::parse_address(text)?,
            None => self.signer_address(),
        };
        Ok(self.read_balance(&symbol, identity, owner).await)
    }

    /// Balances for a set of symbols, queried concurrently. Never fails:
    /// each entry degrades independently, so one bad token cannot take
    /// down the whole summary.
    pub async fn balances_of(&self, symbols: &[String], address: Option<&str>) -> Vec<BalanceInfo> {
        let queries = symbols
            .iter()
            .map(|symbol| self.balance_entry(symbol, address));
        futures::future::join_all(queries).await
    }

    async fn balance_entry(&self, symbol: &str, address: Option<&str>) -> BalanceInfo {
        match self.balance_of(symbol, address).await {
            Ok(info) => info,
            Err(e) => BalanceInfo {
                token: canonical_symbol(symbol),
                balance: "0".to_string(),
                address: address.unwrap_or_default().to_string(),
                error: Some(e.to_string()),
            },
        }
    }

    async fn read_balance(
        &self,
        symbol: &str,
        identity: TokenIdentity,
        owner: Address,
    ) -> BalanceInfo {
        let owner_text = format!("{owner:?}");

        let raw = match identity {
            TokenIdentity::Native => self.native_balance(owner).await,
            TokenIdentity::Contract(token) => self.token_balance(token, owner).await,
        };
        let raw = match raw {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Balance read failed for {symbol}: {e}");
                return BalanceInfo {
                    token: symbol.to_string(),
                    balance: "0".to_string(),
                    address: owner_text,
                    error: Some(e.to_string()),
                };
            }
        };

        match self.registry.resolve_decimals(symbol).await {
            Ok(decimals) => BalanceInfo {
                token: symbol.to_string(),
                balance: ethereum::format_token_amount(raw, decimals),
                address: owner_text,
                error: None,
            },
            Err(e) => BalanceInfo {
                token: symbol.to_string(),
                balance: "0".to_string(),
                address: owner_text,
                error: Some(e.to_string()),
            },
        }
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, ChatPayError> {
        self.client
            .get_balance(owner, None)
            .await
            .map_err(|e| ChatPayError::ChainQuery(e.to_string()))
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, ChatPayError> {
        let contract = self.erc20(token);
        contract
            .method::<_, U256>("balanceOf", owner)
            .map_err(|e| ChatPayError::ChainQuery(e.to_string()))?
            .call()
            .await
            .map_err(|e| ChatPayError::ChainQuery(e.to_string()))
    }

    async fn send_native(
        &self,
        to: Address,
        value: U256,
    ) -> anyhow::Result<TransactionReceipt> {
        let tx = TransactionRequest::new()
            .to(to)
            .value(value)
            .gas(self.gas_limit);
        let pending_tx = self.client.send_transaction(tx, None).await?;
        let receipt = pending_tx
            .await?
            .ok_or_else(|| anyhow!("transaction dropped before confirmation"))?;
        Ok(receipt)
    }

    async fn send_token(
        &self,
        token: Address,
        to: Address,
        value: U256,
    ) -> anyhow::Result<TransactionReceipt> {
        let contract = self.erc20(token);
        let call = contract
            .method::<_, bool>("transfer", (to, value))?
            .gas(self.gas_limit);
        let pending_tx = call.send().await?;
        let receipt = pending_tx
            .await?
            .ok_or_else(|| anyhow!("transaction dropped before confirmation"))?;
        Ok(receipt)
    }
}

/// Compare at full integer precision. A balance strictly below the
/// requested amount fails before any submission is attempted.
fn ensure_sufficient_balance(
    symbol: &str,
    available: U256,
    required: U256,
    decimals: u8,
) -> Result<(), ChatPayError> {
    if available < required {
        return Err(ChatPayError::InsufficientBalance {
            token: symbol.to_string(),
            available: ethereum::format_token_amount(available, decimals),
            required: ethereum::format_token_amount(required, decimals),
        });
    }
    Ok(())
}
