use serde::Serialize;
use std::sync::Arc;

use crate::domain::command::{self, ParsedCommand, ALL_TOKENS};
use crate::domain::contact::Contact;
use crate::domain::error::ChatPayError;
use crate::infrastructure::blockchain::manager::{BalanceInfo, BlockchainManager, TransferResult};
use crate::infrastructure::storage::contact_store::ContactStore;

/// Success payload of one executed command. Exactly one of the optional
/// fields is populated, depending on the intent.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<TransferResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balances: Option<Vec<BalanceInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<Contact>>,
}

impl CommandResponse {
    fn message_only(message: String) -> Self {
        Self {
            message,
            transaction: None,
            balances: None,
            contact: None,
            contacts: None,
        }
    }
}

/// Sequences parser → contact directory → token registry → transfer
/// executor for every incoming command.
pub struct CommandService {
    contacts: Arc<ContactStore>,
    blockchain: Arc<BlockchainManager>,
    default_balance_tokens: Vec<String>,
}

impl CommandService {
    pub fn new(
        contacts: Arc<ContactStore>,
        blockchain: Arc<BlockchainManager>,
        default_balance_tokens: Vec<String>,
    ) -> Self {
        Self {
            contacts,
            blockchain,
            default_balance_tokens,
        }
    }

    pub async fn execute(&self, text: &str) -> Result<CommandResponse, ChatPayError> {
        let parsed = command::parse(text);
        log::info!("Interpreted command: {}", command::describe(&parsed));

        match parsed {
            ParsedCommand::Send {
                amount,
                token,
                recipient,
            } => self.handle_send(&amount, &token, &recipient).await,
            ParsedCommand::CheckBalance { token } => self.handle_balance(&token).await,
            ParsedCommand::AddContact { name, address } => {
                self.handle_add_contact(&name, &address)
            }
            ParsedCommand::ListContacts => self.handle_list_contacts(),
            ParsedCommand::Unknown { original } => Err(ChatPayError::ParseUnrecognized(original)),
        }
    }

    async fn handle_send(
        &self,
        amount: &str,
        token: &str,
        recipient: &str,
    ) -> Result<CommandResponse, ChatPayError> {
        let contact = self
            .contacts
            .find_by_name(recipient)
            .ok_or_else(|| ChatPayError::ContactNotFound(recipient.to_string()))?;

        let transfer = self
            .blockchain
            .transfer(token, &contact.address, amount)
            .await?;

        Ok(CommandResponse {
            message: format!(
                "Sent {} {} to {} ({})",
                transfer.amount, transfer.token, contact.name, contact.address
            ),
            transaction: Some(transfer),
            balances: None,
            contact: None,
            contacts: None,
        })
    }

    async fn handle_balance(&self, token: &str) -> Result<CommandResponse, ChatPayError> {
        if token == ALL_TOKENS {
            let balances = self
                .blockchain
                .balances_of(&self.default_balance_tokens, None)
                .await;
            return Ok(CommandResponse {
                message: format!("Balances on {}", self.blockchain.network_name()),
                balances: Some(balances),
                transaction: None,
                contact: None,
                contacts: None,
            });
        }

        let info = self.blockchain.balance_of(token, None).await?;
        Ok(CommandResponse {
            message: format!("{} balance: {}", info.token, info.balance),
            balances: Some(vec![info]),
            transaction: None,
            contact: None,
            contacts: None,
        })
    }

    fn handle_add_contact(
        &self,
        name: &str,
        address: &str,
    ) -> Result<CommandResponse, ChatPayError> {
        let contact = self.contacts.add(name, address)?;
        Ok(CommandResponse {
            message: format!("Added contact {} ({})", contact.name, contact.address),
            contact: Some(contact),
            transaction: None,
            balances: None,
            contacts: None,
        })
    }

    fn handle_list_contacts(&self) -> Result<CommandResponse, ChatPayError> {
        let contacts = self.contacts.list();
        Ok(CommandResponse {
            message: match contacts.len() {
                0 => "No contacts saved yet".to_string(),
                1 => "1 contact".to_string(),
                n => format!("{n} contacts"),
            },
            contacts: Some(contacts),
            transaction: None,
            balances: None,
            contact: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::Config;
    use tempfile::TempDir;

    const ADDRESS: &str = "0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6";
    const TOKEN_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    fn test_service() -> (TempDir, CommandService) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(ContactStore::new(dir.path().to_str().unwrap()).unwrap());

        let mut config = Config {
            // Unroutable port; tests never reach a live chain.
            rpc_url: "http://127.0.0.1:59999".to_string(),
            ..Config::default()
        };
        for token in &mut config.tokens {
            if token.symbol == "USDC" {
                token.address = TOKEN_ADDRESS.to_string();
            }
        }
        let manager = Arc::new(BlockchainManager::new(&config).unwrap());
        let service =
            CommandService::new(store, manager, config.default_balance_tokens.clone());
        (dir, service)
    }

    #[tokio::test]
    async fn test_unknown_command_yields_structured_error() {
        let (_dir, service) = test_service();
        let err = service.execute("make me a sandwich").await.unwrap_err();
        match err {
            ChatPayError::ParseUnrecognized(original) => {
                assert_eq!(original, "make me a sandwich");
            }
            other => panic!("expected ParseUnrecognized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_add_and_list_contacts() {
        let (_dir, service) = test_service();

        let response = service
            .execute(&format!("add contact Alice with address {ADDRESS}"))
            .await
            .unwrap();
        let contact = response.contact.unwrap();
        assert_eq!(contact.name, "alice");
        assert_eq!(contact.address, ADDRESS);

        let response = service.execute("list contacts").await.unwrap();
        let contacts = response.contacts.unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].name, "alice");
    }

    #[tokio::test]
    async fn test_send_to_unknown_recipient() {
        let (_dir, service) = test_service();
        let err = service.execute("send 5 USDC to carol").await.unwrap_err();
        match err {
            ChatPayError::ContactNotFound(name) => assert_eq!(name, "carol"),
            other => panic!("expected ContactNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_unsupported_token_after_contact_resolution() {
        let (_dir, service) = test_service();
        service
            .execute(&format!("add contact alice with address {ADDRESS}"))
            .await
            .unwrap();

        let err = service.execute("send 5 XYZ to alice").await.unwrap_err();
        assert!(matches!(err, ChatPayError::UnsupportedToken(_)));
    }

    #[tokio::test]
    async fn test_balance_summary_covers_default_set() {
        let (_dir, service) = test_service();
        let response = service.execute("check my balance").await.unwrap();
        let balances = response.balances.unwrap();
        // Every configured default symbol gets an entry even though the
        // chain is unreachable here.
        assert_eq!(balances.len(), 5);
        assert!(balances.iter().all(|b| b.error.is_some()));
    }
}
