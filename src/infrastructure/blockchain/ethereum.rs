use ethers::abi::Abi;
use ethers::core::types::{Address, U256};
use ethers::utils::{format_units, parse_units, ParseUnits};
use lazy_static::lazy_static;
use regex::Regex;

use crate::domain::error::ChatPayError;

lazy_static! {
    static ref ADDRESS_RE: Regex = Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap();
}

/// A chain address is the 0x prefix followed by exactly 40 hex digits,
/// case-insensitive. Checksums are not enforced.
pub fn validate_address(address: &str) -> bool {
    ADDRESS_RE.is_match(address)
}

pub fn parse_address(address: &str) -> Result<Address, ChatPayError> {
    if !validate_address(address) {
        return Err(ChatPayError::InvalidAddress(address.to_string()));
    }
    address
        .parse::<Address>()
        .map_err(|_| ChatPayError::InvalidAddress(address.to_string()))
}

/// Convert a human-readable amount to the token's smallest integer unit.
/// Zero and negative amounts are rejected along with anything that does
/// not parse at the given precision.
pub fn parse_token_amount(amount: &str, decimals: u8) -> Result<U256, ChatPayError> {
    let parsed = parse_units(amount, u32::from(decimals))
        .map_err(|_| ChatPayError::InvalidAmount(amount.to_string()))?;
    match parsed {
        ParseUnits::U256(value) if !value.is_zero() => Ok(value),
        _ => Err(ChatPayError::InvalidAmount(amount.to_string())),
    }
}

pub fn format_token_amount(amount: U256, decimals: u8) -> String {
    format_units(amount, u32::from(decimals)).unwrap_or_else(|_| amount.to_string())
}

/// Minimal ERC-20 interface: transfer, balanceOf, decimals, symbol.
pub fn erc20_abi() -> Result<Abi, ChatPayError> {
    let abi_bytes = include_bytes!("../../abi/ERC20.json");
    serde_json::from_slice(abi_bytes)
        .map_err(|e| ChatPayError::Config(format!("Failed to parse ERC-20 ABI: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_address() {
        assert!(validate_address("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6"));
        assert!(validate_address("0x0000000000000000000000000000000000000000"));

        // Too short, missing prefix, invalid character.
        assert!(!validate_address("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b"));
        assert!(!validate_address("742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6"));
        assert!(!validate_address("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8bG"));
        assert!(!validate_address(""));
    }

    #[test]
    fn test_parse_address_rejects_malformed_input() {
        assert!(parse_address("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6").is_ok());
        assert!(matches!(
            parse_address("alice"),
            Err(ChatPayError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_parse_token_amount() {
        assert_eq!(
            parse_token_amount("5", 6).unwrap(),
            U256::from(5_000_000u64)
        );
        assert_eq!(
            parse_token_amount("0.5", 18).unwrap(),
            U256::from(500_000_000_000_000_000u64)
        );
        assert_eq!(parse_token_amount("1.5", 6).unwrap(), U256::from(1_500_000u64));
    }

    #[test]
    fn test_parse_token_amount_rejects_non_positive() {
        assert!(matches!(
            parse_token_amount("0", 18),
            Err(ChatPayError::InvalidAmount(_))
        ));
        assert!(matches!(
            parse_token_amount("-1", 18),
            Err(ChatPayError::InvalidAmount(_))
        ));
        assert!(matches!(
            parse_token_amount("abc", 18),
            Err(ChatPayError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_format_token_amount() {
        assert_eq!(format_token_amount(U256::from(5_000_000u64), 6), "5.000000");
        assert_eq!(
            format_token_amount(U256::from(1_500_000_000_000_000_000u64), 18),
            "1.500000000000000000"
        );
    }

    #[test]
    fn test_erc20_abi_loads() {
        let abi = erc20_abi().unwrap();
        assert!(abi.function("transfer").is_ok());
        assert!(abi.function("balanceOf").is_ok());
        assert!(abi.function("decimals").is_ok());
    }
}
