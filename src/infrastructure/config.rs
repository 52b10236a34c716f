use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::infrastructure::blockchain::ethereum;

/// Hardhat's first pre-funded development account. Never holds real funds;
/// production deployments must set PRIVATE_KEY.
const DEV_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// One entry of the token static table. `address` is empty until the
/// deployment address is configured; `decimals: None` defers resolution
/// to an on-chain query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub symbol: String,
    pub address: String,
    pub decimals: Option<u8>,
    pub is_native: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: String,
    pub rpc_url: String,
    pub chain_id: u64,
    pub network_name: String,
    pub private_key: String,
    pub port: u16,
    pub log_level: String,
    pub gas_limit: u64,
    pub data_dir: String,
    pub default_balance_tokens: Vec<String>,
    pub tokens: Vec<TokenConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            rpc_url: "http://127.0.0.1:8545".to_string(),
            chain_id: 31337,
            network_name: "localhost".to_string(),
            private_key: DEV_PRIVATE_KEY.to_string(),
            port: 4000,
            log_level: "info".to_string(),
            gas_limit: 100_000,
            data_dir: "./data".to_string(),
            default_balance_tokens: default_balance_tokens("ETH,MTK,USDC,DAI,USDT"),
            tokens: default_tokens(),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            environment: env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()),
            rpc_url: env::var("RPC_URL").unwrap_or_else(|_| "http://127.0.0.1:8545".to_string()),
            chain_id: u64::from_str(&env::var("CHAIN_ID").unwrap_or_else(|_| "31337".to_string()))?,
            network_name: env::var("NETWORK_NAME").unwrap_or_else(|_| "localhost".to_string()),
            private_key: env::var("PRIVATE_KEY")
                .unwrap_or_else(|_| DEV_PRIVATE_KEY.to_string()),
            port: u16::from_str(&env::var("PORT").unwrap_or_else(|_| "4000".to_string()))?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            gas_limit: u64::from_str(
                &env::var("GAS_LIMIT").unwrap_or_else(|_| "100000".to_string()),
            )?,
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            default_balance_tokens: default_balance_tokens(
                &env::var("DEFAULT_BALANCE_TOKENS")
                    .unwrap_or_else(|_| "ETH,MTK,USDC,DAI,USDT".to_string()),
            ),
            tokens: default_tokens(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err(anyhow!("RPC_URL must be an http(s) URL: '{}'", self.rpc_url));
        }
        if self.chain_id == 0 {
            return Err(anyhow!("CHAIN_ID must be non-zero"));
        }
        if self.port == 0 {
            return Err(anyhow!("PORT must be non-zero"));
        }
        if self.gas_limit == 0 {
            return Err(anyhow!("GAS_LIMIT must be non-zero"));
        }

        let key = self.private_key.trim_start_matches("0x");
        if key.len() != 64 || !key.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow!(
                "PRIVATE_KEY must be a 32-byte hex string (64 hex characters)"
            ));
        }
        if self.environment == "production" && self.private_key == DEV_PRIVATE_KEY {
            return Err(anyhow!(
                "PRIVATE_KEY must be set explicitly in production"
            ));
        }

        let natives = self.tokens.iter().filter(|t| t.is_native).count();
        if natives != 1 {
            return Err(anyhow!(
                "Exactly one native token must be configured, found {natives}"
            ));
        }
        for token in &self.tokens {
            if !token.is_native
                && !token.address.is_empty()
                && !ethereum::validate_address(&token.address)
            {
                return Err(anyhow!(
                    "Invalid contract address for token {}: '{}'",
                    token.symbol,
                    token.address
                ));
            }
        }

        if self.default_balance_tokens.is_empty() {
            return Err(anyhow!("DEFAULT_BALANCE_TOKENS must not be empty"));
        }

        Ok(())
    }
}

fn default_balance_tokens(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn contract_address_env(key: &str) -> String {
    env::var(key).unwrap_or_default()
}

/// The token static table: well-known symbols, their deployment addresses
/// (from the environment) and decimal counts. Adjusting this table changes
/// which tokens are supported without touching any resolution logic.
fn default_tokens() -> Vec<TokenConfig> {
    vec![
        TokenConfig {
            symbol: "ETH".to_string(),
            address: String::new(),
            decimals: Some(18),
            is_native: true,
        },
        TokenConfig {
            symbol: "MTK".to_string(),
            address: contract_address_env("MTK_CONTRACT_ADDRESS"),
            decimals: Some(18),
            is_native: false,
        },
        TokenConfig {
            symbol: "USDC".to_string(),
            address: contract_address_env("USDC_CONTRACT_ADDRESS"),
            decimals: Some(6),
            is_native: false,
        },
        TokenConfig {
            symbol: "USDT".to_string(),
            address: contract_address_env("USDT_CONTRACT_ADDRESS"),
            decimals: Some(6),
            is_native: false,
        },
        TokenConfig {
            symbol: "DAI".to_string(),
            address: contract_address_env("DAI_CONTRACT_ADDRESS"),
            decimals: Some(18),
            is_native: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_rpc_url() {
        let config = Config {
            rpc_url: "ws://127.0.0.1:8545".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_private_key() {
        let config = Config {
            private_key: "0x1234".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_dev_key_in_production() {
        let config = Config {
            environment: "production".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_single_native_token() {
        let mut config = Config::default();
        config.tokens.retain(|t| !t.is_native);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_tokens_cover_balance_set() {
        let config = Config::default();
        for symbol in &config.default_balance_tokens {
            assert!(
                config.tokens.iter().any(|t| &t.symbol == symbol),
                "{symbol} missing from token table"
            );
        }
    }

    #[test]
    fn test_default_balance_tokens_parsing() {
        assert_eq!(
            default_balance_tokens(" ETH, MTK ,,USDC "),
            vec!["ETH", "MTK", "USDC"]
        );
    }
}
