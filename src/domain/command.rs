use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

/// Sentinel token meaning "every token in the default balance set".
pub const ALL_TOKENS: &str = "ALL";

/// A raw text command interpreted into one of the supported intents.
///
/// Parsing never fails: input that matches no pattern becomes `Unknown`
/// carrying the trimmed original text, so callers can answer with a
/// suggestion instead of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    Send {
        amount: String,
        token: String,
        recipient: String,
    },
    CheckBalance {
        token: String,
    },
    AddContact {
        name: String,
        address: String,
    },
    ListContacts,
    Unknown {
        original: String,
    },
}

lazy_static! {
    static ref SEND_RE: Regex =
        Regex::new(r"(?i)^send\s+(\d+(?:\.\d+)?)\s+([A-Za-z][A-Za-z0-9_-]*)\s+to\s+(.+)$")
            .unwrap();
    static ref BALANCE_RE: Regex = Regex::new(
        r"(?i)^(?:(?:check|show|view)\s+)?(?:my\s+)?balance(?:\s+of\s+([A-Za-z][A-Za-z0-9_-]*))?$"
    )
    .unwrap();
    static ref ADD_CONTACT_RE: Regex = Regex::new(
        r"(?i)^add\s+contact\s+(.+?)\s+(?:with\s+address|as)\s+(0x[0-9a-fA-F]{40})$"
    )
    .unwrap();
    static ref LIST_CONTACTS_RE: Regex =
        Regex::new(r"(?i)^(?:list|show|view)\s+(?:my\s+)?contacts$").unwrap();
    static ref SYMBOL_ALIASES: HashMap<&'static str, &'static str> = {
        let mut aliases = HashMap::new();
        aliases.insert("MYTOKEN", "MTK");
        aliases.insert("MY-TOKEN", "MTK");
        aliases.insert("MY_TOKEN", "MTK");
        aliases
    };
}

/// Uppercase a token symbol and collapse registered synonyms onto their
/// canonical form. Every consumer of symbol text goes through this, so a
/// symbol spells the same wherever it appears.
pub fn canonical_symbol(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    match SYMBOL_ALIASES.get(upper.as_str()) {
        Some(canonical) => canonical.to_string(),
        None => upper,
    }
}

/// Interpret raw command text. Patterns are tried in a fixed priority
/// order (send, balance, add-contact, list-contacts); each requires a
/// distinct keyword, but the order is kept stable for determinism.
pub fn parse(text: &str) -> ParsedCommand {
    let input = text.trim();

    if let Some(caps) = SEND_RE.captures(input) {
        return ParsedCommand::Send {
            amount: caps[1].to_string(),
            token: canonical_symbol(&caps[2]),
            recipient: caps[3].trim().to_string(),
        };
    }

    if let Some(caps) = BALANCE_RE.captures(input) {
        let token = caps
            .get(1)
            .map(|m| canonical_symbol(m.as_str()))
            .unwrap_or_else(|| ALL_TOKENS.to_string());
        return ParsedCommand::CheckBalance { token };
    }

    if let Some(caps) = ADD_CONTACT_RE.captures(input) {
        return ParsedCommand::AddContact {
            name: caps[1].trim().to_string(),
            address: caps[2].to_string(),
        };
    }

    if LIST_CONTACTS_RE.is_match(input) {
        return ParsedCommand::ListContacts;
    }

    ParsedCommand::Unknown {
        original: input.to_string(),
    }
}

/// Human-readable confirmation line for an intent. Used for user-facing
/// confirmations and logging, never fed back into `parse`.
pub fn describe(command: &ParsedCommand) -> String {
    match command {
        ParsedCommand::Send {
            amount,
            token,
            recipient,
        } => format!("Send {amount} {token} to {recipient}"),
        ParsedCommand::CheckBalance { token } if token == ALL_TOKENS => {
            "Check balances for all tokens".to_string()
        }
        ParsedCommand::CheckBalance { token } => format!("Check {token} balance"),
        ParsedCommand::AddContact { name, address } => {
            format!("Add contact {name} with address {address}")
        }
        ParsedCommand::ListContacts => "List all contacts".to_string(),
        ParsedCommand::Unknown { original } => format!("Unrecognized command: {original}"),
    }
}
