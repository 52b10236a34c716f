use std::fs;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;

use crate::domain::contact::{normalize_lookup, normalize_name, Contact};
use crate::domain::error::ChatPayError;
use crate::infrastructure::blockchain::ethereum;

/// File-backed contact directory. The working set lives in memory and is
/// flushed to `<data_dir>/contacts.json` on every mutation. Names are
/// unique after normalization; addresses are validated on every write.
pub struct ContactStore {
    data_dir: String,
    contacts: Mutex<Vec<Contact>>,
}

impl ContactStore {
    pub fn new(data_dir: &str) -> Result<Self, ChatPayError> {
        fs::create_dir_all(data_dir)?;

        let store = ContactStore {
            data_dir: data_dir.to_string(),
            contacts: Mutex::new(Vec::new()),
        };
        store.load()?;
        Ok(store)
    }

    fn contacts_file(&self) -> String {
        format!("{}/contacts.json", self.data_dir)
    }

    fn load(&self) -> Result<(), ChatPayError> {
        let path = self.contacts_file();
        if Path::new(&path).exists() {
            let data = fs::read_to_string(&path)?;
            let contacts: Vec<Contact> = serde_json::from_str(&data)?;
            *self.contacts.lock().unwrap() = contacts;
        }
        Ok(())
    }

    fn persist(&self, contacts: &[Contact]) -> Result<(), ChatPayError> {
        let data = serde_json::to_string_pretty(contacts)?;
        fs::write(self.contacts_file(), data)?;
        Ok(())
    }

    /// Insert a new contact. The stored name is the normalized form; a
    /// second insert that normalizes to an existing name is rejected
    /// rather than overwritten.
    pub fn add(&self, name: &str, address: &str) -> Result<Contact, ChatPayError> {
        let normalized = normalize_name(name);
        if normalized.is_empty() {
            return Err(ChatPayError::InvalidName(name.to_string()));
        }
        if !ethereum::validate_address(address) {
            return Err(ChatPayError::InvalidAddress(address.to_string()));
        }

        let mut contacts = self.contacts.lock().unwrap();
        if contacts.iter().any(|c| c.name == normalized) {
            return Err(ChatPayError::ContactDuplicate(normalized));
        }

        let contact = Contact::new(&normalized, address);
        contacts.push(contact.clone());
        self.persist(&contacts)?;
        Ok(contact)
    }

    /// Resolve free text against stored names: exact match on the cleaned
    /// key first, then an anchored case-insensitive comparison. Uniqueness
    /// is enforced at write time, so at most one record can match.
    pub fn find_by_name(&self, text: &str) -> Option<Contact> {
        let cleaned = normalize_lookup(text);
        if cleaned.is_empty() {
            return None;
        }

        let contacts = self.contacts.lock().unwrap();
        if let Some(contact) = contacts.iter().find(|c| c.name == cleaned) {
            return Some(contact.clone());
        }
        contacts
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(&cleaned))
            .cloned()
    }

    pub fn list(&self) -> Vec<Contact> {
        let mut contacts = self.contacts.lock().unwrap().clone();
        contacts.sort_by(|a, b| a.name.cmp(&b.name));
        contacts
    }

    /// Update name and/or address of an existing contact. Both fields go
    /// through the same validation as `add`.
    pub fn update(
        &self,
        id: &str,
        name: Option<&str>,
        address: Option<&str>,
    ) -> Result<Contact, ChatPayError> {
        if let Some(address) = address {
            if !ethereum::validate_address(address) {
                return Err(ChatPayError::InvalidAddress(address.to_string()));
            }
        }
        let new_name = match name {
            Some(raw) => {
                let normalized = normalize_name(raw);
                if normalized.is_empty() {
                    return Err(ChatPayError::InvalidName(raw.to_string()));
                }
                Some(normalized)
            }
            None => None,
        };

        let mut contacts = self.contacts.lock().unwrap();
        let index = contacts
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| ChatPayError::ContactNotFound(id.to_string()))?;

        if let Some(new_name) = new_name {
            let taken = contacts
                .iter()
                .enumerate()
                .any(|(i, c)| i != index && c.name == new_name);
            if taken {
                return Err(ChatPayError::ContactDuplicate(new_name));
            }
            contacts[index].name = new_name;
        }
        if let Some(address) = address {
            contacts[index].address = address.to_string();
        }
        contacts[index].updated_at = Utc::now();

        let contact = contacts[index].clone();
        self.persist(&contacts)?;
        Ok(contact)
    }

    /// Remove by id. Returns whether a record was actually deleted.
    pub fn remove(&self, id: &str) -> Result<bool, ChatPayError> {
        let mut contacts = self.contacts.lock().unwrap();
        let before = contacts.len();
        contacts.retain(|c| c.id != id);
        if contacts.len() == before {
            return Ok(false);
        }
        self.persist(&contacts)?;
        Ok(true)
    }
}
