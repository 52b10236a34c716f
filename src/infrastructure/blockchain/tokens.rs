use ethers::abi::Abi;
use ethers::contract::Contract;
use ethers::core::types::Address;
use ethers::providers::{Http, Provider};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::command::canonical_symbol;
use crate::domain::error::ChatPayError;
use crate::infrastructure::blockchain::ethereum;
use crate::infrastructure::config::TokenConfig;

/// Decimal count of the native coin when the static table carries none.
const NATIVE_DECIMALS: u8 = 18;

/// How a token is transferred: directly as chain value, or through its
/// ERC-20 contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenIdentity {
    Native,
    Contract(Address),
}

#[derive(Debug, Clone)]
struct TokenDescriptor {
    identity: TokenIdentity,
    decimals: Option<u8>,
}

/// Symbol → on-chain identity and decimals, built once from configuration
/// and passed by handle to whoever needs it. Decimals resolved on-chain
/// are memoized for the process lifetime.
pub struct TokenRegistry {
    tokens: HashMap<String, TokenDescriptor>,
    decimals_cache: RwLock<HashMap<String, u8>>,
    provider: Provider<Http>,
    erc20_abi: Abi,
}

impl TokenRegistry {
    pub fn new(configs: &[TokenConfig], provider: Provider<Http>) -> Result<Self, ChatPayError> {
        let mut tokens = HashMap::new();
        for config in configs {
            let symbol = canonical_symbol(&config.symbol);
            let identity = if config.is_native {
                TokenIdentity::Native
            } else if config.address.is_empty() {
                log::warn!("No contract address configured for token {symbol}, skipping");
                continue;
            } else {
                TokenIdentity::Contract(ethereum::parse_address(&config.address)?)
            };
            tokens.insert(
                symbol,
                TokenDescriptor {
                    identity,
                    decimals: config.decimals,
                },
            );
        }

        Ok(Self {
            tokens,
            decimals_cache: RwLock::new(HashMap::new()),
            provider,
            erc20_abi: ethereum::erc20_abi()?,
        })
    }

    pub fn is_supported(&self, symbol: &str) -> bool {
        self.tokens.contains_key(&canonical_symbol(symbol))
    }

    pub fn identity(&self, symbol: &str) -> Result<TokenIdentity, ChatPayError> {
        let symbol = canonical_symbol(symbol);
        self.tokens
            .get(&symbol)
            .map(|t| t.identity)
            .ok_or(ChatPayError::UnsupportedToken(symbol))
    }

    /// Resolution order: process-wide cache, static table, on-chain
    /// `decimals()` query. A successful query is memoized; concurrent
    /// first resolutions may race but write the same value. A failed
    /// query falls back to the static default when one exists.
    pub async fn resolve_decimals(&self, symbol: &str) -> Result<u8, ChatPayError> {
        let symbol = canonical_symbol(symbol);

        if let Some(decimals) = self.decimals_cache.read().await.get(&symbol) {
            return Ok(*decimals);
        }

        let descriptor = self
            .tokens
            .get(&symbol)
            .ok_or_else(|| ChatPayError::UnsupportedToken(symbol.clone()))?;
        if let Some(decimals) = descriptor.decimals {
            return Ok(decimals);
        }

        let address = match descriptor.identity {
            TokenIdentity::Native => return Ok(NATIVE_DECIMALS),
            TokenIdentity::Contract(address) => address,
        };

        match self.query_decimals(address).await {
            Ok(decimals) => {
                self.decimals_cache
                    .write()
                    .await
                    .insert(symbol, decimals);
                Ok(decimals)
            }
            Err(e) => {
                log::warn!("On-chain decimals query failed for {symbol}: {e}");
                descriptor
                    .decimals
                    .ok_or(ChatPayError::UnsupportedToken(symbol))
            }
        }
    }

    async fn query_decimals(&self, token: Address) -> Result<u8, ChatPayError> {
        let contract = Contract::new(
            token,
            self.erc20_abi.clone(),
            Arc::new(self.provider.clone()),
        );
        contract
            .method::<_, u8>("decimals", ())
            .map_err(|e| ChatPayError::ChainQuery(e.to_string()))?
            .call()
            .await
            .map_err(|e| ChatPayError::ChainQuery(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::Config;

    const TOKEN_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    fn test_provider() -> Provider<Http> {
        // Unroutable port; tests never reach a live chain through it.
        Provider::<Http>::try_from("http://127.0.0.1:59999").unwrap()
    }

    fn test_configs() -> Vec<TokenConfig> {
        let mut tokens = Config::default().tokens;
        for token in &mut tokens {
            if token.symbol == "USDC" || token.symbol == "MTK" {
                token.address = TOKEN_ADDRESS.to_string();
            }
        }
        tokens
    }

    fn test_registry() -> TokenRegistry {
        TokenRegistry::new(&test_configs(), test_provider()).unwrap()
    }

    #[test]
    fn test_identity_native_and_contract() {
        let registry = test_registry();
        assert_eq!(registry.identity("eth").unwrap(), TokenIdentity::Native);
        match registry.identity("usdc").unwrap() {
            TokenIdentity::Contract(address) => {
                assert_eq!(format!("{address:?}"), TOKEN_ADDRESS.to_lowercase());
            }
            other => panic!("expected contract identity, got {other:?}"),
        }
    }

    #[test]
    fn test_identity_resolves_aliases() {
        let registry = test_registry();
        assert_eq!(
            registry.identity("mytoken").unwrap(),
            registry.identity("MTK").unwrap()
        );
    }

    #[test]
    fn test_identity_unsupported() {
        let registry = test_registry();
        assert!(matches!(
            registry.identity("XYZ"),
            Err(ChatPayError::UnsupportedToken(_))
        ));
    }

    #[test]
    fn test_tokens_without_address_are_skipped() {
        let registry = test_registry();
        // DAI/USDT have no configured address in the test table.
        assert!(!registry.is_supported("DAI"));
        assert!(registry.is_supported("ETH"));
        assert!(registry.is_supported("USDC"));
    }

    #[tokio::test]
    async fn test_resolve_decimals_from_static_table() {
        let registry = test_registry();
        assert_eq!(registry.resolve_decimals("USDC").await.unwrap(), 6);
        assert_eq!(registry.resolve_decimals("ETH").await.unwrap(), 18);
        assert_eq!(registry.resolve_decimals("my_token").await.unwrap(), 18);
    }

    #[tokio::test]
    async fn test_resolve_decimals_unsupported_symbol() {
        let registry = test_registry();
        assert!(matches!(
            registry.resolve_decimals("XYZ").await,
            Err(ChatPayError::UnsupportedToken(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_decimals_failed_query_without_default() {
        let mut configs = test_configs();
        for token in &mut configs {
            if token.symbol == "USDC" {
                token.decimals = None;
            }
        }
        let registry = TokenRegistry::new(&configs, test_provider()).unwrap();
        // The on-chain query cannot succeed and no static default exists.
        assert!(registry.resolve_decimals("USDC").await.is_err());
    }
}
