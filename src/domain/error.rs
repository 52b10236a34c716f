use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for the ChatPay server. Every variant is scoped to a
/// single command or request; nothing here is fatal to the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChatPayError {
    // Command interpretation
    ParseUnrecognized(String),

    // Contact directory
    ContactNotFound(String),
    ContactDuplicate(String),
    InvalidName(String),
    InvalidAddress(String),

    // Token resolution and transfer execution
    UnsupportedToken(String),
    InvalidAmount(String),
    InsufficientBalance {
        token: String,
        available: String,
        required: String,
    },
    TransferFailed {
        token: String,
        message: String,
    },
    ChainQuery(String),

    // Infrastructure
    Storage(String),
    Config(String),
}

impl fmt::Display for ChatPayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatPayError::ParseUnrecognized(text) => {
                write!(f, "Unrecognized command: '{text}'")
            }
            ChatPayError::ContactNotFound(name) => write!(f, "Contact '{name}' not found"),
            ChatPayError::ContactDuplicate(name) => {
                write!(f, "A contact named '{name}' already exists")
            }
            ChatPayError::InvalidName(name) => write!(f, "Invalid contact name: '{name}'"),
            ChatPayError::InvalidAddress(address) => write!(
                f,
                "Invalid address '{address}': expected 0x followed by 40 hex characters"
            ),
            ChatPayError::UnsupportedToken(symbol) => write!(f, "Unsupported token: {symbol}"),
            ChatPayError::InvalidAmount(amount) => write!(
                f,
                "Invalid amount '{amount}': expected a positive decimal number"
            ),
            ChatPayError::InsufficientBalance {
                token,
                available,
                required,
            } => write!(
                f,
                "Insufficient {token} balance: have {available}, need {required}"
            ),
            ChatPayError::TransferFailed { token, message } => {
                write!(f, "{token} transfer failed: {message}")
            }
            ChatPayError::ChainQuery(message) => write!(f, "Chain query failed: {message}"),
            ChatPayError::Storage(message) => write!(f, "Storage error: {message}"),
            ChatPayError::Config(message) => write!(f, "Configuration error: {message}"),
        }
    }
}

impl std::error::Error for ChatPayError {}

impl ChatPayError {
    /// A follow-up hint for errors the user can correct by rephrasing.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            ChatPayError::ParseUnrecognized(_) => Some(
                "Try 'send 5 USDC to alice', 'check my balance', \
                 'add contact alice with address 0x...', or 'list contacts'"
                    .to_string(),
            ),
            ChatPayError::ContactNotFound(name) => Some(format!(
                "Add the contact first: 'add contact {name} with address 0x...'"
            )),
            _ => None,
        }
    }

    pub fn to_http_response(&self) -> (actix_web::http::StatusCode, &'static str) {
        use actix_web::http::StatusCode;
        match self {
            ChatPayError::ParseUnrecognized(_) => (StatusCode::BAD_REQUEST, "UNRECOGNIZED_COMMAND"),
            ChatPayError::ContactNotFound(_) => (StatusCode::NOT_FOUND, "CONTACT_NOT_FOUND"),
            ChatPayError::ContactDuplicate(_) => (StatusCode::CONFLICT, "CONTACT_DUPLICATE"),
            ChatPayError::InvalidName(_) => (StatusCode::BAD_REQUEST, "INVALID_NAME"),
            ChatPayError::InvalidAddress(_) => (StatusCode::BAD_REQUEST, "INVALID_ADDRESS"),
            ChatPayError::UnsupportedToken(_) => (StatusCode::BAD_REQUEST, "UNSUPPORTED_TOKEN"),
            ChatPayError::InvalidAmount(_) => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
            ChatPayError::InsufficientBalance { .. } => {
                (StatusCode::BAD_REQUEST, "INSUFFICIENT_BALANCE")
            }
            ChatPayError::TransferFailed { .. } => (StatusCode::BAD_GATEWAY, "TRANSFER_FAILED"),
            ChatPayError::ChainQuery(_) => (StatusCode::BAD_GATEWAY, "CHAIN_QUERY_FAILED"),
            ChatPayError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            ChatPayError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
        }
    }
}

impl ResponseError for ChatPayError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_type) = self.to_http_response();
        let mut body = serde_json::json!({
            "error": error_type,
            "message": self.to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        if let Some(suggestion) = self.suggestion() {
            body["suggestion"] = serde_json::Value::String(suggestion);
        }
        HttpResponse::build(status_code).json(body)
    }
}

impl From<std::io::Error> for ChatPayError {
    fn from(err: std::io::Error) -> Self {
        ChatPayError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ChatPayError {
    fn from(err: serde_json::Error) -> Self {
        ChatPayError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_status_codes() {
        let (status, code) = ChatPayError::ParseUnrecognized("gibberish".to_string())
            .to_http_response();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "UNRECOGNIZED_COMMAND");

        let (status, _) = ChatPayError::ContactNotFound("alice".to_string()).to_http_response();
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = ChatPayError::ContactDuplicate("alice".to_string()).to_http_response();
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = ChatPayError::TransferFailed {
            token: "USDC".to_string(),
            message: "nonce too low".to_string(),
        }
        .to_http_response();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_suggestions() {
        assert!(ChatPayError::ParseUnrecognized("hm".to_string())
            .suggestion()
            .is_some());
        let suggestion = ChatPayError::ContactNotFound("carol".to_string())
            .suggestion()
            .unwrap();
        assert!(suggestion.contains("add contact carol"));
        assert!(ChatPayError::ChainQuery("timeout".to_string())
            .suggestion()
            .is_none());
    }

    #[test]
    fn test_display_includes_context() {
        let err = ChatPayError::InsufficientBalance {
            token: "USDC".to_string(),
            available: "1.000000".to_string(),
            required: "5.000000".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("USDC"));
        assert!(text.contains("1.000000"));
        assert!(text.contains("5.000000"));

        let err = ChatPayError::TransferFailed {
            token: "MTK".to_string(),
            message: "reverted".to_string(),
        };
        assert_eq!(err.to_string(), "MTK transfer failed: reverted");
    }
}
